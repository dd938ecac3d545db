use crate::cache::PageCache;
use crate::controllers::PageOrRedirect;
use crate::csrf::CsrfToken;
use crate::entities::{comment, group, post, prelude::*, user};
use crate::errors::AppError;
use crate::guards::auth::AuthenticatedUser;
use crate::services::feed;
use crate::views::app_template::AppTemplate;
use chrono::Utc;
use rocket::form::Form;
use rocket::fs::{relative, TempFile};
use rocket::response::Redirect;
use rocket::State;
use sea_orm::*;
use serde_json::json;
use std::path::Path;

/// Root of the uploaded-media tree; post images live under `posts/` inside.
const MEDIA_ROOT: &str = relative!("media");

/// User-editable fields of a post: text is required, group and image are
/// optional. Everything else (author, pub_date) is set by the handlers.
#[derive(FromForm)]
pub struct PostForm<'r> {
    pub text: &'r str,
    pub group: Option<i32>,
    pub image: Option<TempFile<'r>>,
    #[field(default = "")]
    pub csrf_token: &'r str,
}

/// User-editable fields of a comment.
#[derive(FromForm)]
pub struct CommentForm<'r> {
    pub text: &'r str,
    #[field(default = "")]
    pub csrf_token: &'r str,
}

/// Home feed. The page context is served from `PageCache` when present, so
/// repeated requests render byte-identical pages until the cache is cleared
/// or expires, regardless of posts created in between.
#[get("/?<page>")]
pub async fn index(
    db: &State<DatabaseConnection>,
    cache: &State<PageCache>,
    page: Option<u64>,
) -> Result<AppTemplate, AppError> {
    let page = page.unwrap_or(1).max(1);

    if let Some(context) = cache.get(page) {
        return Ok(AppTemplate::new("posts/index", context));
    }

    let page_obj = feed::paginate_posts(db.inner(), Post::find(), page).await?;
    let context = page_context(&page_obj);
    cache.set(page, context.clone());

    Ok(AppTemplate::new("posts/index", context))
}

/// Posts of a single group; posts assigned elsewhere never appear.
#[get("/group/<slug>?<page>")]
pub async fn group_list(
    db: &State<DatabaseConnection>,
    slug: &str,
    page: Option<u64>,
) -> Result<AppTemplate, AppError> {
    let group = Group::find()
        .filter(group::Column::Slug.eq(slug))
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    let select = Post::find().filter(post::Column::GroupId.eq(group.id));
    let page_obj = feed::paginate_posts(db.inner(), select, page.unwrap_or(1)).await?;

    let mut context = page_context(&page_obj);
    merge(&mut context, json!({ "group": group }));

    Ok(AppTemplate::new("posts/group_list", context))
}

/// An author's page with everything they published.
#[get("/profile/<username>?<page>")]
pub async fn profile(
    db: &State<DatabaseConnection>,
    username: &str,
    page: Option<u64>,
) -> Result<AppTemplate, AppError> {
    let author = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    let select = Post::find().filter(post::Column::AuthorId.eq(author.id));
    let page_obj = feed::paginate_posts(db.inner(), select, page.unwrap_or(1)).await?;

    let posts_total = Post::find()
        .filter(post::Column::AuthorId.eq(author.id))
        .count(db.inner())
        .await?;

    let mut context = page_context(&page_obj);
    merge(
        &mut context,
        json!({ "author": author.username, "posts_total": posts_total }),
    );

    Ok(AppTemplate::new("posts/profile", context))
}

/// Single post with its comments and the comment form.
#[get("/posts/<post_id>")]
pub async fn post_detail(
    db: &State<DatabaseConnection>,
    post_id: i32,
) -> Result<AppTemplate, AppError> {
    let (post, author) = Post::find_by_id(post_id)
        .find_also_related(User)
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    let group = match post.group_id {
        Some(group_id) => Group::find_by_id(group_id).one(db.inner()).await?,
        None => None,
    };

    let comments: Vec<_> = Comment::find()
        .filter(comment::Column::PostId.eq(post.id))
        .find_also_related(User)
        .order_by_desc(comment::Column::Created)
        .all(db.inner())
        .await?
        .into_iter()
        .map(|(c, a)| {
            json!({
                "text": c.text,
                "created": c.created.format("%-d %B %Y").to_string(),
                "author": a.map(|a| a.username).unwrap_or_default(),
            })
        })
        .collect();

    let preview = post.to_string();
    let context = json!({
        "post": {
            "id": post.id,
            "text": post.text,
            "pub_date": post.pub_date.format("%-d %B %Y").to_string(),
            "author": author.map(|a| a.username).unwrap_or_default(),
            "group": group.map(|g| json!({ "title": g.title, "slug": g.slug })),
            "image": post.image,
        },
        "preview": preview,
        "comments": comments,
    });

    Ok(AppTemplate::new("posts/post_detail", context))
}

#[get("/create")]
pub async fn post_create_form(
    db: &State<DatabaseConnection>,
    _user: AuthenticatedUser,
) -> Result<AppTemplate, AppError> {
    let groups = Group::find().all(db.inner()).await?;

    Ok(AppTemplate::new(
        "posts/create_post",
        json!({ "groups": groups }),
    ))
}

#[post("/create", data = "<form>")]
pub async fn post_create(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    csrf: CsrfToken,
    form: Form<PostForm<'_>>,
) -> Result<PageOrRedirect, AppError> {
    let mut form = form.into_inner();

    if !csrf.accepts(form.csrf_token) {
        return create_error(db, &form, "Form expired, please resubmit").await;
    }
    if form.text.trim().is_empty() {
        return create_error(db, &form, "Post text must not be empty").await;
    }

    let image = match form.image.as_mut() {
        Some(file) => save_image(file).await?,
        None => None,
    };

    let new_post = post::ActiveModel {
        text: Set(form.text.to_owned()),
        pub_date: Set(Utc::now().into()),
        author_id: Set(user.user.id),
        group_id: Set(form.group),
        image: Set(image),
        ..Default::default()
    };
    new_post.insert(db.inner()).await?;

    Ok(PageOrRedirect::Redirect(Redirect::to(format!(
        "/profile/{}",
        user.user.username
    ))))
}

#[get("/posts/<post_id>/edit")]
pub async fn post_edit_form(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    post_id: i32,
) -> Result<PageOrRedirect, AppError> {
    let post = Post::find_by_id(post_id)
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    // Only the author may edit; everyone else is sent to the post itself
    // without an error.
    if post.author_id != user.user.id {
        return Ok(PageOrRedirect::Redirect(Redirect::to(format!(
            "/posts/{post_id}"
        ))));
    }

    let groups = Group::find().all(db.inner()).await?;

    Ok(PageOrRedirect::Page(AppTemplate::new(
        "posts/create_post",
        json!({
            "is_edit": true,
            "post_id": post.id,
            "form": { "text": post.text, "group": post.group_id, "image": post.image },
            "groups": groups,
        }),
    )))
}

#[post("/posts/<post_id>/edit", data = "<form>")]
pub async fn post_edit(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    csrf: CsrfToken,
    post_id: i32,
    form: Form<PostForm<'_>>,
) -> Result<PageOrRedirect, AppError> {
    let post = Post::find_by_id(post_id)
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    if post.author_id != user.user.id {
        return Ok(PageOrRedirect::Redirect(Redirect::to(format!(
            "/posts/{post_id}"
        ))));
    }

    let mut form = form.into_inner();

    if !csrf.accepts(form.csrf_token) {
        return edit_error(db, post_id, &form, "Form expired, please resubmit").await;
    }
    if form.text.trim().is_empty() {
        return edit_error(db, post_id, &form, "Post text must not be empty").await;
    }

    let image = match form.image.as_mut() {
        Some(file) => save_image(file).await?,
        None => None,
    };

    // pub_date and author_id stay untouched.
    let mut active: post::ActiveModel = post.into();
    active.text = Set(form.text.to_owned());
    active.group_id = Set(form.group);
    if let Some(image) = image {
        active.image = Set(Some(image));
    }
    active.update(db.inner()).await?;

    Ok(PageOrRedirect::Redirect(Redirect::to(format!(
        "/posts/{post_id}"
    ))))
}

/// Attaches a comment to a post. A blank comment creates nothing; either
/// way the client lands back on the post.
#[post("/posts/<post_id>/comment", data = "<form>")]
pub async fn add_comment(
    db: &State<DatabaseConnection>,
    user: AuthenticatedUser,
    csrf: CsrfToken,
    post_id: i32,
    form: Form<CommentForm<'_>>,
) -> Result<Redirect, AppError> {
    let post = Post::find_by_id(post_id)
        .one(db.inner())
        .await?
        .ok_or(AppError::NotFound)?;

    if csrf.accepts(form.csrf_token) && !form.text.trim().is_empty() {
        let new_comment = comment::ActiveModel {
            post_id: Set(post.id),
            author_id: Set(user.user.id),
            text: Set(form.text.to_owned()),
            created: Set(Utc::now().into()),
            ..Default::default()
        };
        new_comment.insert(db.inner()).await?;
    }

    Ok(Redirect::to(format!("/posts/{post_id}")))
}

/// Builds the shared list-page context around one `Page` of posts.
fn page_context(page_obj: &feed::Page) -> serde_json::Value {
    json!({
        "page_obj": page_obj.items,
        "current_page": page_obj.number,
        "num_pages": page_obj.num_pages,
        "has_previous": page_obj.has_previous,
        "has_next": page_obj.has_next,
    })
}

fn merge(context: &mut serde_json::Value, extra: serde_json::Value) {
    if let (Some(map), serde_json::Value::Object(extra)) = (context.as_object_mut(), extra) {
        for (k, v) in extra {
            map.insert(k, v);
        }
    }
}

async fn create_error(
    db: &State<DatabaseConnection>,
    form: &PostForm<'_>,
    error: &str,
) -> Result<PageOrRedirect, AppError> {
    let groups = Group::find().all(db.inner()).await?;
    Ok(PageOrRedirect::Page(AppTemplate::new(
        "posts/create_post",
        json!({
            "error": error,
            "form": { "text": form.text, "group": form.group },
            "groups": groups,
        }),
    )))
}

async fn edit_error(
    db: &State<DatabaseConnection>,
    post_id: i32,
    form: &PostForm<'_>,
    error: &str,
) -> Result<PageOrRedirect, AppError> {
    let groups = Group::find().all(db.inner()).await?;
    Ok(PageOrRedirect::Page(AppTemplate::new(
        "posts/create_post",
        json!({
            "error": error,
            "is_edit": true,
            "post_id": post_id,
            "form": { "text": form.text, "group": form.group },
            "groups": groups,
        }),
    )))
}

/// Copies an upload into the media tree and returns its media-relative
/// path. Empty file fields (a form submitted without choosing a file) yield
/// `None`. The stored name is the sanitized upload stem plus the extension
/// implied by the declared content type.
async fn save_image(file: &mut TempFile<'_>) -> Result<Option<String>, AppError> {
    if file.len() == 0 {
        return Ok(None);
    }

    let stem = file.name().unwrap_or("upload").to_owned();
    let ext = file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|e| e.as_str().to_owned())
        .unwrap_or_else(|| "bin".to_owned());
    let file_name = format!("{stem}.{ext}");

    let dest_dir = Path::new(MEDIA_ROOT).join("posts");
    std::fs::create_dir_all(&dest_dir)?;
    file.copy_to(dest_dir.join(&file_name)).await?;

    Ok(Some(format!("posts/{file_name}")))
}
