use crate::fairings::context::{CachedCsrf, CachedUser};
use rocket::request::Request;
use rocket::response::{Responder, Result};
use rocket_dyn_templates::Template;
use serde_json::Value;
use std::borrow::Cow;

/// Application-standard template responder. Merges the per-request globals
/// cached by `ContextFairing` (current username, CSRF token) under the
/// handler-supplied context; local keys win on collision.
pub struct AppTemplate {
    pub name: Cow<'static, str>,
    pub context: Value,
}

impl AppTemplate {
    pub fn new<N, C>(name: N, context: C) -> Self
    where
        N: Into<Cow<'static, str>>,
        C: serde::Serialize,
    {
        AppTemplate {
            name: name.into(),
            context: serde_json::to_value(context).unwrap_or(Value::Null),
        }
    }
}

impl<'r> Responder<'r, 'static> for AppTemplate {
    fn respond_to(self, request: &'r Request<'_>) -> Result<'static> {
        let mut final_context = serde_json::Map::new();

        let cached_user = request.local_cache(|| CachedUser(None));
        final_context.insert(
            "user".into(),
            cached_user
                .0
                .as_ref()
                .map(|name| Value::String(name.clone()))
                .unwrap_or(Value::Null),
        );

        let cached_csrf = request.local_cache(|| CachedCsrf(String::new()));
        final_context.insert("csrf_token".into(), Value::String(cached_csrf.0.clone()));

        if let Value::Object(local_map) = self.context {
            for (k, v) in local_map {
                final_context.insert(k, v);
            }
        }

        Template::render(self.name, Value::Object(final_context)).respond_to(request)
    }
}
