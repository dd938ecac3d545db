use crate::entities::{prelude::*, user};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use sea_orm::*;

/// Request guard for the logged-in user. Including it in a handler's
/// arguments makes the route authenticated-only; a failing guard turns into
/// a 401, which the error catcher converts to a login redirect carrying the
/// original path in `next`.
pub struct AuthenticatedUser {
    pub user: user::Model,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db = match request.guard::<&State<DatabaseConnection>>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let user_id = request
            .cookies()
            .get_private("user_id")
            .and_then(|c| c.value().parse::<i32>().ok());

        match user_id {
            Some(id) => match User::find_by_id(id).one(db.inner()).await {
                Ok(Some(user)) if user.is_active => {
                    Outcome::Success(AuthenticatedUser { user })
                }
                _ => Outcome::Error((Status::Unauthorized, ())),
            },
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
