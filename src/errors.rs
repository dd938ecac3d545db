use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::Request;
use sea_orm::DbErr;
use std::io::Cursor;

/// Application-wide error type. Handlers return `Result<_, AppError>` and
/// propagate database and I/O failures with `?`.
#[derive(Debug)]
pub enum AppError {
    /// Database error (500)
    Database(DbErr),
    /// Resource does not exist (404)
    NotFound,
    /// Anything else that went wrong server-side (500)
    Internal(String),
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, message) = match &self {
            AppError::NotFound => (Status::NotFound, "Not Found"),
            AppError::Database(_) => (Status::InternalServerError, "Database Error"),
            AppError::Internal(msg) => (Status::InternalServerError, msg.as_str()),
        };

        Response::build()
            .status(status)
            .sized_body(message.len(), Cursor::new(message.to_string()))
            .ok()
    }
}

impl From<DbErr> for AppError {
    fn from(e: DbErr) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
