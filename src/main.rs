use yatube::build_rocket;

#[rocket::launch]
async fn rocket() -> _ {
    build_rocket().await
}
