//! Order rows and order-level transactions

use shared::models::{OrderLine, OrderTracking, STATUS_IN_PROGRESS, is_closed_status};
use sqlx::{Connection, SqliteConnection};

use super::{Database, release};

/// Result of persisting a quoted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A line referenced an item that no longer exists; nothing was written
    MissingItem(i64),
}

/// Result of a cancellation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { rows: u64 },
    /// No order rows; the transaction was rolled back
    NotFound,
    /// Tracking status forbids cancellation
    Closed(String),
}

/// Rows of one order plus its tracking entry
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    pub lines: Vec<OrderLine>,
    pub tracking: Option<OrderTracking>,
}

/// Smallest id above every persisted order
pub async fn next_order_id(db: &Database) -> Result<i64, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result: Result<i64, _> =
        sqlx::query_scalar("SELECT COALESCE(MAX(order_id), 0) + 1 FROM orders")
            .fetch_one(&mut conn)
            .await;
    release(conn).await;
    result
}

/// Insert order lines and the "in progress" tracking row atomically
pub async fn save_order(
    db: &Database,
    order_id: i64,
    lines: &[OrderLine],
) -> Result<SaveOutcome, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = save_order_tx(&mut conn, order_id, lines).await;
    release(conn).await;
    result
}

async fn save_order_tx(
    conn: &mut SqliteConnection,
    order_id: i64,
    lines: &[OrderLine],
) -> Result<SaveOutcome, sqlx::Error> {
    // Take the write lock up front so the busy timeout covers lock contention
    let mut tx = conn.begin_with("BEGIN IMMEDIATE").await?;

    for line in lines {
        let exists: Option<i64> = sqlx::query_scalar("SELECT item_id FROM food_items WHERE item_id = ?")
            .bind(line.item_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(SaveOutcome::MissingItem(line.item_id));
        }

        sqlx::query(
            "INSERT INTO orders (order_id, item_id, quantity, total_price) VALUES (?, ?, ?, ?)
             ON CONFLICT (order_id, item_id) DO UPDATE SET
                 quantity = quantity + excluded.quantity,
                 total_price = total_price + excluded.total_price",
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(line.total_price)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO order_tracking (order_id, status) VALUES (?, ?)
         ON CONFLICT (order_id) DO UPDATE SET status = excluded.status",
    )
    .bind(order_id)
    .bind(STATUS_IN_PROGRESS)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(SaveOutcome::Saved)
}

/// Delete an order and its tracking row unless it is already closed
pub async fn cancel_order(db: &Database, order_id: i64) -> Result<CancelOutcome, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = cancel_order_tx(&mut conn, order_id).await;
    release(conn).await;
    result
}

async fn cancel_order_tx(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<CancelOutcome, sqlx::Error> {
    let mut tx = conn.begin_with("BEGIN IMMEDIATE").await?;

    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM order_tracking WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
    if let Some(status) = status.filter(|s| is_closed_status(s)) {
        tx.rollback().await?;
        return Ok(CancelOutcome::Closed(status));
    }

    sqlx::query("DELETE FROM order_tracking WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM orders WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows == 0 {
        tx.rollback().await?;
        return Ok(CancelOutcome::NotFound);
    }

    tx.commit().await?;
    Ok(CancelOutcome::Cancelled { rows })
}

/// Lines and tracking row of one order, read on a single connection
pub async fn snapshot(db: &Database, order_id: i64) -> Result<OrderSnapshot, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = snapshot_on(&mut conn, order_id).await;
    release(conn).await;
    result
}

async fn snapshot_on(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> Result<OrderSnapshot, sqlx::Error> {
    let lines = sqlx::query_as(
        "SELECT order_id, item_id, quantity, total_price FROM orders
         WHERE order_id = ? ORDER BY item_id",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    let tracking = sqlx::query_as("SELECT order_id, status FROM order_tracking WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(OrderSnapshot { lines, tracking })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;
    use crate::db::tracking;

    async fn order_total(db: &Database, order_id: i64) -> Option<f64> {
        let mut conn = db.connect().await.unwrap();
        sqlx::query_scalar("SELECT SUM(total_price) FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&mut conn)
            .await
            .unwrap()
    }

    fn line(order_id: i64, item_id: i64, quantity: i64, total_price: f64) -> OrderLine {
        OrderLine {
            order_id,
            item_id,
            quantity,
            total_price,
        }
    }

    #[tokio::test]
    async fn next_id_starts_at_one_and_follows_max() {
        let (_dir, db) = test_db().await;
        assert_eq!(next_order_id(&db).await.unwrap(), 1);

        let saved = save_order(&db, 41, &[line(41, 3, 1, 8.0)]).await.unwrap();
        assert_eq!(saved, SaveOutcome::Saved);
        assert_eq!(next_order_id(&db).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn save_writes_lines_and_tracking() {
        let (_dir, db) = test_db().await;
        let lines = [line(1, 1, 2, 12.0), line(1, 9, 1, 5.0)];
        assert_eq!(save_order(&db, 1, &lines).await.unwrap(), SaveOutcome::Saved);

        let snap = snapshot(&db, 1).await.unwrap();
        assert_eq!(snap.lines, lines.to_vec());
        assert_eq!(snap.tracking.unwrap().status, STATUS_IN_PROGRESS);
        assert_eq!(order_total(&db, 1).await, Some(17.0));
    }

    #[tokio::test]
    async fn missing_item_rolls_back_everything() {
        let (_dir, db) = test_db().await;
        let lines = [line(5, 1, 1, 6.0), line(5, 999, 1, 1.0)];
        assert_eq!(
            save_order(&db, 5, &lines).await.unwrap(),
            SaveOutcome::MissingItem(999)
        );

        let snap = snapshot(&db, 5).await.unwrap();
        assert!(snap.lines.is_empty());
        assert!(snap.tracking.is_none());
        assert_eq!(order_total(&db, 5).await, None);
    }

    #[tokio::test]
    async fn cancel_removes_rows_and_tracking() {
        let (_dir, db) = test_db().await;
        save_order(&db, 7, &[line(7, 1, 1, 6.0), line(7, 2, 1, 7.0)])
            .await
            .unwrap();

        assert_eq!(
            cancel_order(&db, 7).await.unwrap(),
            CancelOutcome::Cancelled { rows: 2 }
        );
        assert_eq!(tracking::order_status(&db, 7).await.unwrap(), None);
        assert_eq!(cancel_order(&db, 7).await.unwrap(), CancelOutcome::NotFound);
    }

    #[tokio::test]
    async fn cancel_refuses_closed_orders() {
        let (_dir, db) = test_db().await;
        save_order(&db, 8, &[line(8, 1, 1, 6.0)]).await.unwrap();
        tracking::set_status(&db, 8, "Delivered").await.unwrap();

        assert_eq!(
            cancel_order(&db, 8).await.unwrap(),
            CancelOutcome::Closed("Delivered".to_string())
        );
        assert_eq!(snapshot(&db, 8).await.unwrap().lines.len(), 1);
    }

    #[tokio::test]
    async fn cancel_without_rows_keeps_orphan_tracking() {
        let (_dir, db) = test_db().await;
        tracking::set_status(&db, 12, "in progress").await.unwrap();

        assert_eq!(cancel_order(&db, 12).await.unwrap(), CancelOutcome::NotFound);
        let snap = snapshot(&db, 12).await.unwrap();
        assert!(snap.tracking.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_and_cancels_all_commit() {
        let (_dir, db) = test_db().await;
        let mut handles = Vec::new();
        for order_id in 1..=12 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                save_order(&db, order_id, &[line(order_id, 1, 1, 6.0), line(order_id, 9, 2, 10.0)])
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), SaveOutcome::Saved);
        }

        let mut handles = Vec::new();
        for order_id in 1..=6 {
            let db = db.clone();
            handles.push(tokio::spawn(async move { cancel_order(&db, order_id).await }));
        }
        for handle in handles {
            assert_eq!(
                handle.await.unwrap().unwrap(),
                CancelOutcome::Cancelled { rows: 2 }
            );
        }
        assert_eq!(next_order_id(&db).await.unwrap(), 13);
        assert_eq!(order_total(&db, 12).await, Some(16.0));
    }
}
