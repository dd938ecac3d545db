use crate::entities::{group, post, user};
use sea_orm::*;
use serde::Serialize;

/// Page size shared by every post list (home, group, profile, feed).
pub const POSTS_PER_PAGE: u64 = 10;

/// A post as handed to the templates: author and group resolved to names,
/// publication date preformatted.
#[derive(Serialize, Clone)]
pub struct PostContext {
    pub id: i32,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupContext>,
    pub image: Option<String>,
}

#[derive(Serialize, Clone)]
pub struct GroupContext {
    pub title: String,
    pub slug: String,
}

/// One page of posts plus the pagination state the templates need.
#[derive(Serialize, Clone)]
pub struct Page {
    pub items: Vec<PostContext>,
    pub number: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Page {
    pub fn empty(number: u64) -> Self {
        Page {
            items: Vec::new(),
            number,
            num_pages: 0,
            has_previous: false,
            has_next: false,
        }
    }
}

/// Paginates a post query, newest first, resolving each post's author and
/// group in two batched loads. `page` is 1-based.
pub async fn paginate_posts(
    db: &DatabaseConnection,
    select: Select<post::Entity>,
    page: u64,
) -> Result<Page, DbErr> {
    let page = page.max(1);

    let paginator = select
        .order_by_desc(post::Column::PubDate)
        // Deterministic order for posts sharing a timestamp.
        .order_by_desc(post::Column::Id)
        .paginate(db, POSTS_PER_PAGE);

    let num_pages = paginator.num_pages().await?;
    let posts = paginator.fetch_page(page - 1).await?;

    let authors = posts.load_one(user::Entity, db).await?;
    let groups = posts.load_one(group::Entity, db).await?;

    let items = posts
        .into_iter()
        .zip(authors)
        .zip(groups)
        .map(|((post, author), group)| PostContext {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date.format("%-d %B %Y").to_string(),
            author: author.map(|a| a.username).unwrap_or_default(),
            group: group.map(|g| GroupContext {
                title: g.title,
                slug: g.slug,
            }),
            image: post.image,
        })
        .collect();

    Ok(Page {
        items,
        number: page,
        num_pages,
        has_previous: page > 1,
        has_next: page < num_pages,
    })
}
