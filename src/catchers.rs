use crate::views::app_template::AppTemplate;
use rocket::response::Redirect;
use rocket::Request;
use serde_json::json;

/// A protected route was hit without a session: send the client to the
/// login page, remembering where it wanted to go.
#[catch(401)]
pub fn unauthorized(req: &Request<'_>) -> Redirect {
    Redirect::to(format!("/auth/login?next={}", req.uri().path()))
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> AppTemplate {
    AppTemplate::new("404", json!({ "path": req.uri().path().as_str() }))
}
