//! Postgres-backed parcel store.
//!
//! One table, `parcels`, keyed by a `BIGSERIAL` surrogate identifier with a
//! unique constraint on `tracking_number`. Enumerations are stored as their
//! wire names (`IN_TRANSIT`, `EXPRESS`, ...).
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | ColumnDecode / Decode | N/A | `Corrupt` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::instrument;

use parceltrack_core::TrackingNumber;
use parceltrack_parcels::{NewParcel, Parcel, ParcelId, ParcelPage, ParcelSearchParams, Pagination};

use super::r#trait::{ParcelStore, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS parcels (
    id              BIGSERIAL PRIMARY KEY,
    tracking_number TEXT NOT NULL UNIQUE,
    sender          TEXT NOT NULL,
    recipient       TEXT NOT NULL,
    weight          DOUBLE PRECISION NOT NULL CHECK (weight >= 0),
    price           DOUBLE PRECISION NOT NULL,
    status          TEXT NOT NULL,
    delivery_type   TEXT NOT NULL
)
"#;

const COLUMNS: &str =
    "id, tracking_number, sender, recipient, weight, price, status, delivery_type";

/// Shared WHERE clause; parameters $1..$9 are bound by `bind_filter`.
const FILTER: &str = r#"
WHERE ($1::text IS NULL OR tracking_number = $1)
  AND ($2::text IS NULL OR sender = $2)
  AND ($3::text IS NULL OR recipient = $3)
  AND ($4::float8 IS NULL OR weight >= $4)
  AND ($5::float8 IS NULL OR weight <= $5)
  AND ($6::float8 IS NULL OR price >= $6)
  AND ($7::float8 IS NULL OR price <= $7)
  AND (cardinality($8::text[]) = 0 OR status = ANY($8))
  AND (cardinality($9::text[]) = 0 OR delivery_type = ANY($9))
"#;

/// Postgres-backed parcel store.
///
/// Uses a SQLx connection pool, so the store is `Send + Sync` and cheap to
/// clone. Status updates are plain `UPDATE`s: concurrent writers to the same
/// parcel race and the last write wins.
#[derive(Debug, Clone)]
pub struct PostgresParcelStore {
    pool: Arc<PgPool>,
}

impl PostgresParcelStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the `parcels` table if it does not exist yet.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ParcelStore for PostgresParcelStore {
    #[instrument(skip(self, tracking_number), fields(tracking_number = %tracking_number), err(level = "warn"))]
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Parcel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM parcels WHERE tracking_number = $1");
        let row = sqlx::query(&sql)
            .bind(tracking_number.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_tracking_number", e))?;

        row.map(|r| decode(&r)).transpose()
    }

    #[instrument(skip(self, parcel), fields(tracking_number = %parcel.tracking_number), err(level = "warn"))]
    async fn insert(&self, parcel: NewParcel) -> Result<Parcel, StoreError> {
        let sql = format!(
            "INSERT INTO parcels (tracking_number, sender, recipient, weight, price, status, delivery_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(parcel.tracking_number.as_str())
            .bind(&parcel.sender)
            .bind(&parcel.recipient)
            .bind(parcel.weight)
            .bind(parcel.price)
            .bind(parcel.status.as_str())
            .bind(parcel.delivery_type.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        decode(&row)
    }

    #[instrument(skip(self, parcel), fields(parcel_id = %parcel.id), err(level = "warn"))]
    async fn update(&self, parcel: &Parcel) -> Result<Parcel, StoreError> {
        let sql = format!(
            "UPDATE parcels \
             SET sender = $2, recipient = $3, weight = $4, price = $5, status = $6, delivery_type = $7 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(parcel.id.0)
            .bind(&parcel.sender)
            .bind(&parcel.recipient)
            .bind(parcel.weight)
            .bind(parcel.price)
            .bind(parcel.status.as_str())
            .bind(parcel.delivery_type.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(r) => decode(&r),
            None => Err(StoreError::NotFound(parcel.id.to_string())),
        }
    }

    #[instrument(skip(self, params), err(level = "warn"))]
    async fn find_page(
        &self,
        params: &ParcelSearchParams,
        pagination: Pagination,
    ) -> Result<ParcelPage, StoreError> {
        let binds = FilterBinds::from(params);

        let count_sql = format!("SELECT COUNT(*) AS total FROM parcels {FILTER}");
        let count_row = bind_filter(sqlx::query(&count_sql), binds.clone())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_parcels", e))?;
        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {e}")))?;

        let page_sql =
            format!("SELECT {COLUMNS} FROM parcels {FILTER} ORDER BY id ASC LIMIT $10 OFFSET $11");
        let rows = bind_filter(sqlx::query(&page_sql), binds)
            .bind(i64::try_from(pagination.limit()).unwrap_or(i64::MAX))
            .bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_page", e))?;

        let items = rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        Ok(ParcelPage::new(items, total.max(0) as u64, pagination))
    }

    #[instrument(skip(self, params), err(level = "warn"))]
    async fn find_matching(&self, params: &ParcelSearchParams) -> Result<Vec<Parcel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM parcels {FILTER} ORDER BY id ASC");
        let rows = bind_filter(sqlx::query(&sql), FilterBinds::from(params))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_matching", e))?;

        rows.iter().map(decode).collect()
    }

    #[instrument(skip(self), err(level = "warn"))]
    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM parcels")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all", e))?;
        Ok(result.rows_affected())
    }
}

/// Owned filter parameters, in the order of the `FILTER` placeholders.
#[derive(Debug, Clone, PartialEq)]
struct FilterBinds {
    tracking_number: Option<String>,
    sender: Option<String>,
    recipient: Option<String>,
    from_weight: Option<f64>,
    to_weight: Option<f64>,
    from_price: Option<f64>,
    to_price: Option<f64>,
    statuses: Vec<String>,
    delivery_types: Vec<String>,
}

impl From<&ParcelSearchParams> for FilterBinds {
    fn from(params: &ParcelSearchParams) -> Self {
        Self {
            tracking_number: params.tracking_number.as_ref().map(|t| t.as_str().to_string()),
            sender: params.sender.clone(),
            recipient: params.recipient.clone(),
            from_weight: params.from_weight,
            to_weight: params.to_weight,
            from_price: params.from_price,
            to_price: params.to_price,
            statuses: params.statuses.iter().map(|s| s.as_str().to_string()).collect(),
            delivery_types: params
                .delivery_types
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }
}

fn bind_filter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    binds: FilterBinds,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(binds.tracking_number)
        .bind(binds.sender)
        .bind(binds.recipient)
        .bind(binds.from_weight)
        .bind(binds.to_weight)
        .bind(binds.from_price)
        .bind(binds.to_price)
        .bind(binds.statuses)
        .bind(binds.delivery_types)
}

/// Raw `parcels` row, before enum decoding.
#[derive(Debug, Clone)]
struct ParcelRow {
    id: i64,
    tracking_number: String,
    sender: String,
    recipient: String,
    weight: f64,
    price: f64,
    status: String,
    delivery_type: String,
}

impl<'r> FromRow<'r, PgRow> for ParcelRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ParcelRow {
            id: row.try_get("id")?,
            tracking_number: row.try_get("tracking_number")?,
            sender: row.try_get("sender")?,
            recipient: row.try_get("recipient")?,
            weight: row.try_get("weight")?,
            price: row.try_get("price")?,
            status: row.try_get("status")?,
            delivery_type: row.try_get("delivery_type")?,
        })
    }
}

impl TryFrom<ParcelRow> for Parcel {
    type Error = StoreError;

    fn try_from(row: ParcelRow) -> Result<Self, Self::Error> {
        let corrupt = |e: parceltrack_core::DomainError| {
            StoreError::Corrupt(format!("parcel id {}: {e}", row.id))
        };
        Ok(Parcel {
            id: ParcelId(row.id),
            tracking_number: row.tracking_number.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            delivery_type: row.delivery_type.parse().map_err(corrupt)?,
            sender: row.sender,
            recipient: row.recipient,
            weight: row.weight,
            price: row.price,
        })
    }
}

fn decode(row: &PgRow) -> Result<Parcel, StoreError> {
    let raw = ParcelRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("failed to read parcel row: {e}")))?;
    Parcel::try_from(raw)
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
