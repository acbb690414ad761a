//! Database operations for submissions
//!
//! SQLite access for the submissions table. Product lines are stored as a JSON
//! column; the geo fix is flattened into nullable columns so `hasGeo` can be
//! filtered in SQL.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::backend::submissions::filter::{utc_key, SubmissionFilter, TimeBound, LIST_LIMIT};
use crate::shared::api::{ClientMeta, StoredSubmission};
use crate::shared::{GeoFix, ProductLine, SubmissionDraft};

const SELECT_COLUMNS: &str = "SELECT id, customer_name, customer_phone, outlet_name, area, \
     geo_lat, geo_lng, geo_accuracy, items, collected_at, day, user_agent, platform, \
     created_at, updated_at FROM submissions";

fn decode_error(e: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

/// Store a validated draft and return the new record's id
///
/// Fails with a unique violation when the outlet already has a submission on
/// the draft's collection day, or when the idempotency key was seen before.
pub async fn insert_submission(
    pool: &SqlitePool,
    draft: &SubmissionDraft,
    idempotency_key: Option<&str>,
    client_meta: &ClientMeta,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let items = serde_json::to_string(&draft.items).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO submissions (
            id, customer_name, customer_phone, outlet_name, area,
            geo_lat, geo_lng, geo_accuracy, items,
            collected_at, collected_at_utc, day, idempotency_key,
            user_agent, platform, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&draft.customer_name)
    .bind(&draft.customer_phone)
    .bind(&draft.outlet_name)
    .bind(&draft.area)
    .bind(draft.geo.map(|g| g.lat))
    .bind(draft.geo.map(|g| g.lng))
    .bind(draft.geo.and_then(|g| g.accuracy))
    .bind(&items)
    .bind(draft.collected_at.to_rfc3339())
    .bind(utc_key(&draft.collected_at.with_timezone(&Utc)))
    .bind(draft.collection_day())
    .bind(idempotency_key)
    .bind(&client_meta.user_agent)
    .bind(&client_meta.platform)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Id of the submission stored for `outlet_name` on `day`, if any
pub async fn find_by_outlet_day(
    pool: &SqlitePool,
    outlet_name: &str,
    day: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM submissions WHERE outlet_name = ? AND day = ?")
        .bind(outlet_name)
        .bind(day)
        .fetch_optional(pool)
        .await?;

    row.map(|r| r.try_get("id")).transpose()
}

/// Submissions matching `filter`, newest collection first
pub async fn list_submissions(
    pool: &SqlitePool,
    filter: &SubmissionFilter,
) -> Result<Vec<StoredSubmission>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    query.push(" WHERE 1 = 1");

    match &filter.from {
        Some(TimeBound::Day(day)) => {
            query.push(" AND day >= ").push_bind(day.clone());
        }
        Some(TimeBound::Instant(t)) => {
            query.push(" AND collected_at_utc >= ").push_bind(t.clone());
        }
        None => {}
    }
    match &filter.to {
        Some(TimeBound::Day(day)) => {
            query.push(" AND day <= ").push_bind(day.clone());
        }
        Some(TimeBound::Instant(t)) => {
            query.push(" AND collected_at_utc <= ").push_bind(t.clone());
        }
        None => {}
    }
    if let Some(area) = &filter.area {
        query
            .push(" AND instr(lower(area), lower(")
            .push_bind(area.clone())
            .push(")) > 0");
    }
    if let Some(outlet) = &filter.outlet_name {
        query
            .push(" AND instr(lower(outlet_name), lower(")
            .push_bind(outlet.clone())
            .push(")) > 0");
    }
    match filter.has_geo {
        Some(true) => {
            query.push(" AND geo_lat IS NOT NULL");
        }
        Some(false) => {
            query.push(" AND geo_lat IS NULL");
        }
        None => {}
    }

    query
        .push(" ORDER BY collected_at_utc DESC LIMIT ")
        .push_bind(LIST_LIMIT);

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(row_to_stored).collect()
}

fn parse_offset_time(raw: &str) -> Result<DateTime<FixedOffset>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw).map_err(decode_error)
}

fn row_to_stored(row: &SqliteRow) -> Result<StoredSubmission, sqlx::Error> {
    let items: String = row.try_get("items")?;
    let items: Vec<ProductLine> = serde_json::from_str(&items).map_err(decode_error)?;

    let lat: Option<f64> = row.try_get("geo_lat")?;
    let lng: Option<f64> = row.try_get("geo_lng")?;
    let geo = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoFix {
            lat,
            lng,
            accuracy: row.try_get("geo_accuracy")?,
        }),
        _ => None,
    };

    let collected_at: String = row.try_get("collected_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(StoredSubmission {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        customer_phone: row.try_get("customer_phone")?,
        outlet_name: row.try_get("outlet_name")?,
        area: row.try_get("area")?,
        geo,
        items,
        collected_at: parse_offset_time(&collected_at)?,
        day: row.try_get("day")?,
        client_meta: ClientMeta {
            user_agent: row.try_get("user_agent")?,
            platform: row.try_get("platform")?,
        },
        created_at: parse_offset_time(&created_at)?.with_timezone(&Utc),
        updated_at: parse_offset_time(&updated_at)?.with_timezone(&Utc),
    })
}

/// Whether `err` is a uniqueness violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
