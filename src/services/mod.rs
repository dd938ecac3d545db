pub mod feed;
pub mod user_service;
