//! Reservation rows

use shared::models::{Reservation, ReservationCreate};

use super::{Database, release};

/// Insert a reservation, returning its generated id
pub async fn create(db: &Database, data: &ReservationCreate) -> Result<i64, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query(
        "INSERT INTO reservations (customer_name, reservation_date, time) VALUES (?, ?, ?)",
    )
    .bind(&data.customer_name)
    .bind(data.reservation_date)
    .bind(data.time)
    .execute(&mut conn)
    .await;
    release(conn).await;
    Ok(result?.last_insert_rowid())
}

pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Reservation>, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query_as(
        "SELECT reservation_id, customer_name, reservation_date, time
         FROM reservations WHERE reservation_id = ?",
    )
    .bind(id)
    .fetch_optional(&mut conn)
    .await;
    release(conn).await;
    result
}

/// Delete a reservation; `false` when no row matched
pub async fn delete(db: &Database, id: i64) -> Result<bool, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query("DELETE FROM reservations WHERE reservation_id = ?")
        .bind(id)
        .execute(&mut conn)
        .await;
    release(conn).await;
    Ok(result?.rows_affected() > 0)
}
