#[macro_use]
extern crate rocket;

use migration::{Migrator, MigratorTrait};
use rocket::fs::{relative, FileServer};
use rocket::Build;
use rocket_dyn_templates::Template;

pub mod auth_utils;
pub mod cache;
pub mod catchers;
pub mod controllers;
pub mod csrf;
pub mod db;
pub mod entities;
pub mod errors;
pub mod fairings;
pub mod guards;
pub mod services;
pub mod validation;
pub mod views;

use cache::PageCache;
use fairings::context::ContextFairing;

/// Builds the Rocket instance; split out of `main` so the integration
/// tests can stand up a full application per test.
pub async fn build_rocket() -> rocket::Rocket<Build> {
    dotenvy::dotenv().ok();

    let db = db::set_up_db().await.expect("Failed to connect to DB");

    // Schema is migrated on boot, so a fresh database works out of the box.
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let media_root = std::path::Path::new(relative!("media"));
    std::fs::create_dir_all(media_root.join("posts")).expect("Failed to create media dir");

    rocket::build()
        .manage(db)
        .manage(PageCache::default())
        .attach(Template::fairing())
        .attach(ContextFairing)
        .mount(
            "/",
            routes![
                controllers::posts::index,
                controllers::posts::group_list,
                controllers::posts::profile,
                controllers::posts::post_detail,
                controllers::posts::post_create_form,
                controllers::posts::post_create,
                controllers::posts::post_edit_form,
                controllers::posts::post_edit,
                controllers::posts::add_comment,
                controllers::follow::follow_index,
                controllers::follow::profile_follow,
                controllers::follow::profile_unfollow,
            ],
        )
        .mount(
            "/auth",
            routes![
                controllers::auth::login_form,
                controllers::auth::login,
                controllers::auth::logout,
                controllers::auth::signup_form,
                controllers::auth::signup,
            ],
        )
        .register("/", catchers![catchers::unauthorized, catchers::not_found])
        .mount("/static", FileServer::from(relative!("static")))
        .mount("/media", FileServer::from(relative!("media")))
}
