#![allow(dead_code)]

use chrono::Utc;
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
};
use yatube::auth_utils::hash_password;
use yatube::entities::{follow, group, post, prelude::*, user};

/// The 1x2 GIF used as an uploaded image everywhere.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

/// A process-wide runtime for the async setup and database helpers. A
/// short-lived runtime (as `rocket::execute` creates) would cancel sqlx's
/// return-to-pool task on teardown and drop the pooled connection — for an
/// in-memory SQLite database that discards the freshly migrated schema.
fn runtime() -> &'static rocket::tokio::runtime::Runtime {
    static RT: std::sync::OnceLock<rocket::tokio::runtime::Runtime> = std::sync::OnceLock::new();
    RT.get_or_init(|| {
        rocket::tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("test runtime")
    })
}

/// Each test gets its own application over a fresh in-memory database.
pub fn setup() -> Client {
    let rocket = runtime().block_on(yatube::build_rocket());
    Client::tracked(rocket).expect("valid rocket instance")
}

pub fn db(client: &Client) -> &DatabaseConnection {
    client
        .rocket()
        .state::<DatabaseConnection>()
        .expect("managed database connection")
}

/// Blocks on an async database call from the (synchronous) test body.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    runtime().block_on(fut)
}

/// Inserts a user with the password "password".
pub fn create_user(client: &Client, username: &str) -> user::Model {
    let db = db(client);
    block_on(async {
        let password_hash = hash_password("password").unwrap();
        user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    })
}

/// Logs the named user in through the login endpoint; the tracked client
/// keeps the session cookie afterwards.
pub fn login(client: &Client, username: &str) {
    let response = client
        .post("/auth/login")
        .header(ContentType::Form)
        .body(format!("username={username}&password=password"))
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);
}

pub fn logout(client: &Client) {
    let response = client.post("/auth/logout").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
}

pub fn create_group(client: &Client, title: &str, slug: &str) -> group::Model {
    let db = db(client);
    block_on(async {
        group::ActiveModel {
            title: Set(title.to_owned()),
            slug: Set(slug.to_owned()),
            description: Set(format!("About {title}")),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    })
}

pub fn create_post(
    client: &Client,
    author_id: i32,
    text: &str,
    group_id: Option<i32>,
) -> post::Model {
    let db = db(client);
    block_on(async {
        post::ActiveModel {
            text: Set(text.to_owned()),
            pub_date: Set(Utc::now().into()),
            author_id: Set(author_id),
            group_id: Set(group_id),
            image: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    })
}

pub fn create_follow(client: &Client, user_id: i32, author_id: i32) -> follow::Model {
    let db = db(client);
    block_on(async {
        follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    })
}

pub fn post_count(client: &Client) -> u64 {
    let db = db(client);
    block_on(async { Post::find().count(db).await.unwrap() })
}

pub fn comment_count(client: &Client) -> u64 {
    let db = db(client);
    block_on(async { Comment::find().count(db).await.unwrap() })
}

pub fn follow_count(client: &Client) -> u64 {
    let db = db(client);
    block_on(async { Follow::find().count(db).await.unwrap() })
}

pub fn find_post(client: &Client, id: i32) -> Option<post::Model> {
    let db = db(client);
    block_on(async { Post::find_by_id(id).one(db).await.unwrap() })
}

pub const BOUNDARY: &str = "XBOUNDARYX";

pub fn multipart_header() -> Header<'static> {
    Header::new(
        "Content-Type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    )
}

/// Builds a multipart body for the post form: text, optional group id and
/// optional image file.
pub fn post_form_body(
    text: &str,
    group: Option<i32>,
    image: Option<(&str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n"
        )
        .as_bytes(),
    );

    if let Some(group_id) = group {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"group\"\r\n\r\n{group_id}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/gif\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
