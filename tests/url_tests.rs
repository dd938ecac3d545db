use rocket::http::Status;

mod common;

#[test]
fn test_public_pages_are_reachable() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    let group = common::create_group(&client, "Test group", "slug_test");
    common::create_post(&client, author.id, "A test post", Some(group.id));

    for path in ["/", "/group/slug_test", "/profile/auth", "/posts/1"] {
        let response = client.get(path).dispatch();
        assert_eq!(response.status(), Status::Ok, "GET {path}");
    }
}

#[test]
fn test_unknown_path_is_not_found() {
    let client = common::setup();

    let response = client.get("/zdrgzdfhxfghstgh").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn test_missing_post_is_not_found() {
    let client = common::setup();

    let response = client.get("/posts/999").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn test_authorized_pages_are_reachable() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    common::create_post(&client, author.id, "A test post", None);
    common::login(&client, "auth");

    for path in ["/create", "/posts/1/edit", "/follow"] {
        let response = client.get(path).dispatch();
        assert_eq!(response.status(), Status::Ok, "GET {path}");
    }
}

#[test]
fn test_anonymous_is_redirected_to_login() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    common::create_post(&client, author.id, "A test post", None);

    for path in ["/create", "/posts/1/edit", "/follow"] {
        let response = client.get(path).dispatch();
        assert_eq!(response.status(), Status::SeeOther, "GET {path}");
        assert_eq!(
            response.headers().get_one("Location"),
            Some(format!("/auth/login?next={path}").as_str()),
        );
    }
}

#[test]
fn test_non_author_edit_redirects_to_detail() {
    let client = common::setup();
    let author = common::create_user(&client, "auth");
    common::create_user(&client, "not_auth");
    common::create_post(&client, author.id, "A test post", None);
    common::login(&client, "not_auth");

    let response = client.get("/posts/1/edit").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/posts/1"));
}
