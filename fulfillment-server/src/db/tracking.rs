//! Order tracking status

use shared::models::STATUS_IN_PROGRESS;
use sqlx::SqliteConnection;

use super::{Database, release};

/// Current status of an order
///
/// `None` when the order has no rows. An order without a tracking row is
/// reported as "in progress".
pub async fn order_status(db: &Database, order_id: i64) -> Result<Option<String>, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = order_status_on(&mut conn, order_id).await;
    release(conn).await;
    result
}

async fn order_status_on(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<Option<String>, sqlx::Error> {
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(&mut *conn)
        .await?;
    if rows == 0 {
        return Ok(None);
    }

    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM order_tracking WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(Some(status.unwrap_or_else(|| STATUS_IN_PROGRESS.to_string())))
}

/// Upsert the tracking status of an order (status changes happen outside
/// this service; tests use this to stage them)
#[cfg(test)]
pub(crate) async fn set_status(db: &Database, order_id: i64, status: &str) -> Result<(), sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query(
        "INSERT INTO order_tracking (order_id, status) VALUES (?, ?)
         ON CONFLICT (order_id) DO UPDATE SET status = excluded.status",
    )
    .bind(order_id)
    .bind(status)
    .execute(&mut conn)
    .await;
    release(conn).await;
    result.map(|_| ())
}
