use rocket::http::Status;
use yatube::cache::PageCache;

mod common;

/// Counts rendered post cards in a page body.
fn article_count(body: &str) -> usize {
    body.matches("<article").count()
}

#[test]
fn test_list_pages_carry_post_author_and_group() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    let group = common::create_group(&client, "Test group", "slug_test");
    common::create_post(&client, author.id, "A test post", Some(group.id));

    let follower = common::create_user(&client, "follower");
    common::create_follow(&client, follower.id, author.id);
    common::login(&client, "follower");

    for path in ["/", "/group/slug_test", "/profile/auth", "/follow"] {
        let body = client.get(path).dispatch().into_string().unwrap();
        assert!(body.contains("A test post"), "post text missing on {path}");
        assert!(body.contains("auth"), "author missing on {path}");
        assert!(body.contains("Test group"), "group missing on {path}");
    }
}

#[test]
fn test_post_detail_context() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    let group = common::create_group(&client, "Test group", "slug_test");
    common::create_post(&client, author.id, "A test post", Some(group.id));

    let body = client.get("/posts/1").dispatch().into_string().unwrap();
    assert!(body.contains("A test post"));
    assert!(body.contains("auth"));
    assert!(body.contains("Test group"));
}

#[test]
fn test_group_page_excludes_foreign_posts() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    let group = common::create_group(&client, "Test group", "slug_test");
    common::create_group(&client, "Other group", "slug_test_2");
    common::create_post(&client, author.id, "A grouped post", Some(group.id));

    let body = client
        .get("/group/slug_test_2")
        .dispatch()
        .into_string()
        .unwrap();
    assert_eq!(article_count(&body), 0);
    assert!(!body.contains("A grouped post"));
}

#[test]
fn test_group_page_exposes_group() {
    let client = common::setup();
    common::create_group(&client, "Test group", "slug_test");

    let body = client
        .get("/group/slug_test")
        .dispatch()
        .into_string()
        .unwrap();
    assert!(body.contains("Test group"));
    assert!(body.contains("About Test group"));
}

#[test]
fn test_profile_page_exposes_author() {
    let client = common::setup();
    common::create_user(&client, "auth");

    let body = client.get("/profile/auth").dispatch().into_string().unwrap();
    assert!(body.contains("All posts by auth"));
}

#[test]
fn test_create_and_edit_pages_differ_by_marker() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    common::create_post(&client, author.id, "A test post", None);
    common::login(&client, "auth");

    let create_body = client.get("/create").dispatch().into_string().unwrap();
    assert!(create_body.contains("New post"));
    assert!(!create_body.contains("Edit post"));

    let edit_body = client
        .get("/posts/1/edit")
        .dispatch()
        .into_string()
        .unwrap();
    assert!(edit_body.contains("Edit post"));
    assert!(edit_body.contains("A test post"));
}

#[test]
fn test_index_is_cached_until_cleared() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    common::create_post(&client, author.id, "A test post", None);

    let first = client.get("/").dispatch().into_string().unwrap();

    // A new post does not reach the page while the cache holds it.
    common::create_post(&client, author.id, "Text for the cache test", None);
    let second = client.get("/").dispatch().into_string().unwrap();
    assert_eq!(first, second);
    assert!(!second.contains("Text for the cache test"));

    let cache = client
        .rocket()
        .state::<PageCache>()
        .expect("managed page cache");
    cache.clear();

    let third = client.get("/").dispatch().into_string().unwrap();
    assert!(third.contains("Text for the cache test"));
    assert_eq!(article_count(&third), 2);
}

#[test]
fn test_signup_creates_account_and_logs_in() {
    let client = common::setup();

    let response = client
        .post("/auth/signup")
        .header(rocket::http::ContentType::Form)
        .body("username=newcomer&password=password123")
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);

    // The fresh session can reach authenticated pages right away.
    let response = client.get("/create").dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn test_signup_rejects_bad_username() {
    let client = common::setup();

    let response = client
        .post("/auth/signup")
        .header(rocket::http::ContentType::Form)
        .body("username=bad+name%21&password=password123")
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Username may only contain"));
}

#[test]
fn test_login_failure_rerenders_form() {
    let client = common::setup();
    common::create_user(&client, "auth");

    let response = client
        .post("/auth/login")
        .header(rocket::http::ContentType::Form)
        .body("username=auth&password=wrong")
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Wrong username or password"));
}
