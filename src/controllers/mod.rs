use crate::views::app_template::AppTemplate;
use rocket::response::Redirect;

pub mod auth;
pub mod follow;
pub mod posts;

/// Handlers that either render a page or bounce the client elsewhere
/// (validation failures re-render, successes and denials redirect).
#[derive(Responder)]
pub enum PageOrRedirect {
    Page(AppTemplate),
    Redirect(Redirect),
}
