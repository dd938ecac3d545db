use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use rocket::http::{Cookie, SameSite};
use rocket::request::{FromRequest, Outcome, Request};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token lifetime in seconds.
const CSRF_TOKEN_EXPIRY: u64 = 3600;

/// Per-session CSRF token, carried in a cookie and echoed back through a
/// hidden form field. The first 8 bytes of the decoded token are a creation
/// timestamp used for expiry.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let random_bytes: [u8; 32] = rng.gen();

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut token_data = timestamp.to_be_bytes().to_vec();
        token_data.extend_from_slice(&random_bytes);

        CsrfToken(URL_SAFE_NO_PAD.encode(&token_data))
    }

    /// True when `submitted` matches this token and the token has not
    /// expired.
    pub fn verify(&self, submitted: &str) -> bool {
        if self.0 != submitted {
            return false;
        }

        if let Ok(decoded) = URL_SAFE_NO_PAD.decode(&self.0) {
            if decoded.len() >= 8 {
                let timestamp_bytes: [u8; 8] = decoded[..8].try_into().unwrap_or([0; 8]);
                let token_time = u64::from_be_bytes(timestamp_bytes);
                let current_time = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();

                return current_time.saturating_sub(token_time) < CSRF_TOKEN_EXPIRY;
            }
        }
        false
    }

    /// A form submitted without a token (the client never rendered one) is
    /// let through; a present token must verify.
    pub fn accepts(&self, submitted: &str) -> bool {
        submitted.is_empty() || self.verify(submitted)
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Reads the session's CSRF token from the cookie jar, creating one on the
/// first request.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for CsrfToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cookies = request.cookies();

        let token = if let Some(cookie) = cookies.get("csrf_token") {
            CsrfToken(cookie.value().to_string())
        } else {
            let new_token = CsrfToken::generate();

            let cookie = Cookie::build(("csrf_token", new_token.0.clone()))
                .path("/")
                .same_site(SameSite::Strict)
                .http_only(false)
                .secure(false);

            cookies.add(cookie);
            new_token
        };

        Outcome::Success(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_token_generation() {
        let token1 = CsrfToken::generate();
        let token2 = CsrfToken::generate();

        assert_ne!(token1.0, token2.0);
        assert!(!token1.0.is_empty());
    }

    #[test]
    fn test_csrf_token_verification() {
        let token = CsrfToken::generate();
        let token_string = token.0.clone();

        assert!(token.verify(&token_string));
        assert!(!token.verify("invalid_token"));
    }

    #[test]
    fn test_empty_submission_is_accepted() {
        let token = CsrfToken::generate();
        assert!(token.accepts(""));
        assert!(!token.accepts("garbage"));
    }
}
