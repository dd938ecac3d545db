use crate::csrf::CsrfToken;
use crate::guards::auth::AuthenticatedUser;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request};

/// Context-processor fairing. Resolves the current user and the session's
/// CSRF token once per request and parks them in the request-local cache so
/// `AppTemplate` can inject them into every rendered template without the
/// handlers passing them along.
pub struct ContextFairing;

#[rocket::async_trait]
impl Fairing for ContextFairing {
    fn info(&self) -> Info {
        Info {
            name: "Template Context Processor",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let username = match request.guard::<AuthenticatedUser>().await {
            rocket::outcome::Outcome::Success(auth) => Some(auth.user.username),
            _ => None,
        };
        request.local_cache(|| CachedUser(username));

        // The guard creates the cookie on first sight, so every page gets a
        // token to embed in its forms.
        if let rocket::outcome::Outcome::Success(csrf) =
            request.guard::<CsrfToken>().await
        {
            let token = csrf.token().to_string();
            request.local_cache(|| CachedCsrf(token));
        }
    }
}

#[derive(Clone)]
pub struct CachedUser(pub Option<String>);

#[derive(Clone)]
pub struct CachedCsrf(pub String);
