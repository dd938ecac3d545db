use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;

/// Connects the database pool. `DATABASE_URL` selects the backend; without
/// it the app runs self-contained on an in-memory SQLite database, which is
/// also what the integration tests use.
pub async fn set_up_db() -> Result<DatabaseConnection, DbErr> {
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    let mut options = ConnectOptions::new(db_url.clone());
    if db_url.starts_with("sqlite::memory:") {
        // With more than one pooled connection every connection would see
        // its own empty in-memory database.
        options.max_connections(1);
    }

    Database::connect(options).await
}
