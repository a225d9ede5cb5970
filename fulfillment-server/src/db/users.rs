use shared::models::User;

use super::{Database, release};
use crate::utils::password::verify_password;

pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<User>, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query_as("SELECT id, username, email, password FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut conn)
        .await;
    release(conn).await;
    result
}

/// Insert a user; a duplicate email surfaces as a unique violation
pub async fn create(
    db: &Database,
    username: &str,
    email: &str,
    hashed_password: &str,
) -> Result<i64, sqlx::Error> {
    let mut conn = db.connect().await?;
    let result = sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .execute(&mut conn)
        .await;
    release(conn).await;
    Ok(result?.last_insert_rowid())
}

/// Verify credentials, returning the user on success
pub async fn authenticate(
    db: &Database,
    email: &str,
    password: &str,
) -> Result<Option<User>, sqlx::Error> {
    let Some(user) = find_by_email(db, email).await? else {
        return Ok(None);
    };

    if verify_password(password, &user.password) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}
