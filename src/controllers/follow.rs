use crate::entities::{follow, post, prelude::*, user};
use crate::errors::AppError;
use crate::guards::auth::AuthenticatedUser;
use crate::services::feed;
use crate::views::app_template::AppTemplate;
use rocket::response::Redirect;
use rocket::State;
use sea_orm::*;
use serde_json::json;

/// Personal feed: posts by every author the current user follows.
#[get("/follow?<page>")]
pub async fn follow_index(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    page: Option<u64>,
) -> Result<AppTemplate, AppError> {
    let author_ids: Vec<i32> = Follow::find()
        .filter(follow::Column::UserId.eq(user.user.id))
        .all(db.inner())
        .await?
        .into_iter()
        .map(|edge| edge.author_id)
        .collect();

    let page_obj = if author_ids.is_empty() {
        feed::Page::empty(page.unwrap_or(1))
    } else {
        let select = Post::find().filter(post::Column::AuthorId.is_in(author_ids));
        feed::paginate_posts(db.inner(), select, page.unwrap_or(1)).await?
    };

    Ok(AppTemplate::new(
        "posts/follow",
        json!({
            "page_obj": page_obj.items,
            "current_page": page_obj.number,
            "num_pages": page_obj.num_pages,
            "has_previous": page_obj.has_previous,
            "has_next": page_obj.has_next,
        }),
    ))
}

/// Subscribes the current user to an author. Following yourself or an
/// author you already follow changes nothing.
#[get("/profile/<username>/follow")]
pub async fn profile_follow(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    username: &str,
) -> Result<Redirect, AppError> {
    let author = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    if author.id != user.user.id {
        let already_following = Follow::find()
            .filter(follow::Column::UserId.eq(user.user.id))
            .filter(follow::Column::AuthorId.eq(author.id))
            .one(db.inner())
            .await?
            .is_some();

        if !already_following {
            let edge = follow::ActiveModel {
                user_id: Set(user.user.id),
                author_id: Set(author.id),
                ..Default::default()
            };
            edge.insert(db.inner()).await?;
        }
    }

    Ok(Redirect::to(format!("/profile/{username}")))
}

/// Removes the subscription edge(s) to an author.
#[get("/profile/<username>/unfollow")]
pub async fn profile_unfollow(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    username: &str,
) -> Result<Redirect, AppError> {
    let author = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Follow::delete_many()
        .filter(follow::Column::UserId.eq(user.user.id))
        .filter(follow::Column::AuthorId.eq(author.id))
        .exec(db.inner())
        .await?;

    Ok(Redirect::to(format!("/profile/{username}")))
}
