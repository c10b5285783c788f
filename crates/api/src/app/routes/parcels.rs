use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};

use parceltrack_core::TrackingNumber;
use parceltrack_parcels::CreateParcelRequest;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_parcels).post(create_parcel))
        .route("/statistic", get(parcel_statistic))
        .route("/:tracking_number", get(get_parcel).patch(update_parcel_status))
}

/// GET /parcels/:tracking_number
pub async fn get_parcel(
    Extension(services): Extension<Arc<AppServices>>,
    Path(tracking_number): Path<String>,
) -> axum::response::Response {
    let tracking_number = match tracking_number.parse::<TrackingNumber>() {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.parcels.get_by_tracking_number(&tracking_number).await {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /parcels?sender=..&statuses=CREATED,DELIVERED&page=0&size=20
///
/// Query parameters:
/// - `trackingNumber`, `sender`, `recipient`: exact match
/// - `fromWeight`, `toWeight`, `fromPrice`, `toPrice`: inclusive bounds
/// - `statuses`, `deliveryTypes`: sets, as repeated keys and/or comma separated
/// - `page` (zero based, default 0), `size` (default 20, max 1000)
pub async fn list_parcels(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ParcelQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::malformed_request(rejection.to_string()),
    };
    let params = match query.search_params() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.parcels.find_all(&params, query.pagination()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /parcels/statistic (same filters as the listing, no paging)
pub async fn parcel_statistic(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ParcelQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::malformed_request(rejection.to_string()),
    };
    let params = match query.search_params() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.parcels.build_statistic(&params).await {
        Ok(stat) => (StatusCode::OK, Json(stat)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /parcels
pub async fn create_parcel(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateParcelRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::malformed_request(rejection.body_text()),
    };

    match services.parcels.create(body).await {
        Ok(parcel) => (StatusCode::CREATED, Json(parcel)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// PATCH /parcels/:tracking_number with `{"status": "IN_TRANSIT"}`
pub async fn update_parcel_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(tracking_number): Path<String>,
    body: Result<Json<dto::UpdateStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let tracking_number = match tracking_number.parse::<TrackingNumber>() {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::malformed_request(rejection.body_text()),
    };

    match services
        .parcels
        .update_status(&tracking_number, body.status)
        .await
    {
        Ok(parcel) => (StatusCode::OK, Json(parcel)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
