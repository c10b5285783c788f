use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use parceltrack_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over a fresh in-memory store, on an ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, sender: &str, recipient: &str, weight: f64, delivery_type: &str) -> Value {
        let res = self
            .client
            .post(self.url("/parcels"))
            .json(&json!({
                "sender": sender,
                "recipient": recipient,
                "weight": weight,
                "deliveryType": delivery_type,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn patch_status(&self, tracking_number: &str, status: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .patch(self.url(&format!("/parcels/{tracking_number}")))
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap();
        let code = res.status();
        (code, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_then_get_by_tracking_number() {
    let srv = TestServer::spawn().await;

    let created = srv.create("William", "Arthur", 10.0, "EXPRESS").await;
    assert_eq!(created["price"], 603.0);
    assert_eq!(created["status"], "CREATED");
    assert_eq!(created["deliveryType"], "EXPRESS");
    let tracking_number = created["trackingNumber"].as_str().unwrap().to_string();
    assert_eq!(tracking_number.len(), 36);

    let (status, fetched) = srv.get_json(&format!("/parcels/{tracking_number}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn prices_follow_delivery_type() {
    let srv = TestServer::spawn().await;
    assert_eq!(srv.create("a", "b", 10.0, "DEFAULT").await["price"], 402.0);
    assert_eq!(srv.create("a", "b", 10.0, "ECONOM").await["price"], 201.0);
    assert_eq!(srv.create("a", "b", 0.0, "EXPRESS").await["price"], 600.0);
}

#[tokio::test]
async fn unknown_tracking_number_is_404_with_message() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get_json("/parcels/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(
        body["message"],
        "Parcel with tracking number does-not-exist not found"
    );
}

#[tokio::test]
async fn patch_updates_status_only() {
    let srv = TestServer::spawn().await;
    let created = srv.create("Emma Brown", "John Doe", 22.0, "ECONOM").await;
    let tracking_number = created["trackingNumber"].as_str().unwrap();

    let (status, updated) = srv.patch_status(tracking_number, "IN_TRANSIT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "IN_TRANSIT");
    assert_eq!(updated["price"], created["price"]);
    assert_eq!(updated["id"], created["id"]);

    let (_, fetched) = srv.get_json(&format!("/parcels/{tracking_number}")).await;
    assert_eq!(fetched["status"], "IN_TRANSIT");
}

#[tokio::test]
async fn patch_unknown_parcel_is_404() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.patch_status("missing", "DELIVERED").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_input_is_400() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/parcels"))
        .json(&json!({ "sender": "a", "recipient": "b", "weight": -1.0, "deliveryType": "DEFAULT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv
        .client
        .post(srv.url("/parcels"))
        .json(&json!({ "sender": "a", "recipient": "b", "weight": 1.0, "deliveryType": "TELEPORT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "malformed_request");

    let (status, body) = srv.get_json("/parcels?statuses=LOST").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = srv.get_json("/parcels?fromWeight=heavy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_and_pages() {
    let srv = TestServer::spawn().await;
    srv.create("Antony Williams", "John Doe", 50.0, "EXPRESS").await;
    srv.create("Lucas Johnson", "Olivia Davis", 30.5, "DEFAULT").await;
    srv.create("Antony Williams", "Olivia Davis", 10.0, "ECONOM").await;
    srv.create("Lucas Johnson", "John Doe", 75.0, "EXPRESS").await;

    let (status, page) = srv.get_json("/parcels?page=0&size=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 4);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
    assert_eq!(page["hasMore"], true);

    let (_, page) = srv.get_json("/parcels?page=1&size=3").await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["hasMore"], false);

    let (_, page) = srv.get_json("/parcels?fromWeight=30&toWeight=40").await;
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["weight"], 30.5);

    let (_, page) = srv
        .get_json("/parcels?sender=Antony%20Williams&deliveryTypes=EXPRESS,ECONOM")
        .await;
    assert_eq!(page["total"], 2);

    let (_, page) = srv
        .get_json("/parcels?recipient=John%20Doe&deliveryTypes=ECONOM")
        .await;
    assert_eq!(page["total"], 0);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn statistic_over_filtered_parcels() {
    let srv = TestServer::spawn().await;
    srv.create("a", "b", 10.0, "EXPRESS").await;
    srv.create("a", "b", 10.0, "DEFAULT").await;
    srv.create("a", "b", 20.0, "ECONOM").await;

    let (status, stat) = srv
        .get_json("/parcels/statistic?deliveryTypes=EXPRESS,DEFAULT")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stat["totalParcels"], 2);
    assert_eq!(stat["averageWeight"], 10.0);
    assert_eq!(stat["averagePrice"], 502.5);
    assert_eq!(stat["parcelsCountByDeliveryType"]["ECONOM"], 0);
    assert_eq!(stat["parcelsCountByStatus"]["CREATED"], 2);
    assert_eq!(stat["mostExpensiveParcel"]["deliveryType"], "EXPRESS");
    assert_eq!(stat["cheapestParcel"]["deliveryType"], "DEFAULT");
}

#[tokio::test]
async fn statistic_of_nothing_is_empty() {
    let srv = TestServer::spawn().await;
    srv.create("a", "b", 10.0, "EXPRESS").await;

    let (status, stat) = srv
        .get_json("/parcels/statistic?trackingNumber=invalidTrackingNumber")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stat["totalParcels"], 0);
    assert_eq!(stat["averageWeight"], 0.0);
    assert!(stat["mostExpensiveParcel"].is_null());
    assert!(stat["lightestParcel"].is_null());
    for status in ["CREATED", "IN_TRANSIT", "DELIVERED"] {
        assert_eq!(stat["parcelsCountByStatus"][status], 0);
    }
}

#[tokio::test]
async fn list_sets_accept_repeated_keys() {
    let srv = TestServer::spawn().await;
    srv.create("a", "b", 10.0, "EXPRESS").await;
    srv.create("a", "b", 10.0, "DEFAULT").await;
    srv.create("a", "b", 10.0, "ECONOM").await;

    let (status, page) = srv
        .get_json("/parcels?deliveryTypes=EXPRESS&deliveryTypes=DEFAULT")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);

    let (status, page) = srv
        .get_json("/parcels?deliveryTypes=EXPRESS,ECONOM&deliveryTypes=DEFAULT")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);

    let (status, stat) = srv
        .get_json("/parcels/statistic?statuses=CREATED&statuses=DELIVERED&deliveryTypes=ECONOM")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stat["totalParcels"], 1);
}

#[tokio::test]
async fn non_finite_bounds_are_400() {
    let srv = TestServer::spawn().await;
    srv.create("a", "b", 10.0, "EXPRESS").await;

    for query in ["fromWeight=NaN", "toPrice=inf"] {
        let (status, body) = srv.get_json(&format!("/parcels?{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}
