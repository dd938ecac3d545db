use crate::controllers::PageOrRedirect;
use crate::csrf::CsrfToken;
use crate::errors::AppError;
use crate::services::user_service::UserService;
use crate::validation::SignupValidation;
use crate::views::app_template::AppTemplate;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar};
use rocket::response::Redirect;
use rocket::State;
use sea_orm::DatabaseConnection;
use serde_json::json;

#[derive(FromForm)]
pub struct LoginForm<'r> {
    pub username: &'r str,
    pub password: &'r str,
    /// Where to return after login; filled by the 401 catcher's redirect.
    pub next: Option<&'r str>,
}

#[derive(FromForm)]
pub struct SignupForm<'r> {
    pub username: &'r str,
    pub password: &'r str,
    #[field(default = "")]
    pub csrf_token: &'r str,
}

#[get("/login?<next>")]
pub fn login_form(next: Option<&str>) -> AppTemplate {
    AppTemplate::new("auth/login", json!({ "next": next }))
}

/// Checks credentials and opens the session. Failures re-render the form
/// instead of answering 401, which would bounce through the login-redirect
/// catcher.
#[post("/login", data = "<login_form>")]
pub async fn login(
    db: &State<DatabaseConnection>,
    login_form: Form<LoginForm<'_>>,
    cookies: &CookieJar<'_>,
) -> Result<PageOrRedirect, AppError> {
    let user =
        UserService::authenticate(db.inner(), login_form.username, login_form.password).await?;

    let Some(user) = user else {
        return Ok(PageOrRedirect::Page(AppTemplate::new(
            "auth/login",
            json!({
                "error": "Wrong username or password",
                "next": login_form.next,
            }),
        )));
    };

    cookies.add_private(Cookie::new("user_id", user.id.to_string()));

    let target = match login_form.next {
        Some(next) if next.starts_with('/') => next.to_string(),
        _ => "/".to_string(),
    };
    Ok(PageOrRedirect::Redirect(Redirect::to(target)))
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove_private(Cookie::from("user_id"));
    Redirect::to("/")
}

#[get("/signup")]
pub fn signup_form() -> AppTemplate {
    AppTemplate::new("auth/signup", json!({}))
}

/// Registers an account and logs it in right away.
#[post("/signup", data = "<form>")]
pub async fn signup(
    db: &State<DatabaseConnection>,
    csrf: CsrfToken,
    form: Form<SignupForm<'_>>,
    cookies: &CookieJar<'_>,
) -> Result<PageOrRedirect, AppError> {
    if !csrf.accepts(form.csrf_token) {
        return Ok(signup_error(vec!["Form expired, please resubmit".into()]));
    }

    if let Err(messages) = SignupValidation::new(form.username, form.password).validate_form() {
        return Ok(signup_error(messages));
    }

    if UserService::find_by_username(db.inner(), form.username)
        .await?
        .is_some()
    {
        return Ok(signup_error(vec!["Username is already taken".into()]));
    }

    let user = UserService::create(db.inner(), form.username, form.password).await?;
    cookies.add_private(Cookie::new("user_id", user.id.to_string()));

    Ok(PageOrRedirect::Redirect(Redirect::to("/")))
}

fn signup_error(messages: Vec<String>) -> PageOrRedirect {
    PageOrRedirect::Page(AppTemplate::new(
        "auth/signup",
        json!({ "errors": messages }),
    ))
}
