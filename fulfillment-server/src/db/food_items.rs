//! Menu item lookups

use shared::models::MenuItem;

use super::{Database, release};

/// Look up several names on one connection, preserving input order
pub async fn find_by_names(
    db: &Database,
    names: &[&str],
) -> Result<Vec<Option<MenuItem>>, sqlx::Error> {
    let mut conn = db.connect().await?;
    let mut found = Vec::with_capacity(names.len());
    let mut failure = None;
    for name in names {
        match sqlx::query_as(
            "SELECT item_id, name, price FROM food_items WHERE LOWER(name) = LOWER(?) LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(&mut conn)
        .await
        {
            Ok(item) => found.push(item),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    release(conn).await;
    match failure {
        Some(e) => Err(e),
        None => Ok(found),
    }
}
