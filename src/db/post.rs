use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection as Connection, RunQueryDsl};
use rocket::serde::{Deserialize, Serialize};

use super::schema::{posts, posts_tags};
use super::tag;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Deserialize, Serialize)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    pub user_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub user_id: i32,
}

/// Non-Option fields: an edit always overwrites title and content,
/// unlike the partial semantics of `user::ModifyUser`.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = posts)]
pub struct ModifyPost {
    pub title: String,
    pub content: String,
}

impl Post {
    pub async fn get(conn: &mut Connection, id: i32) -> Option<Self> {
        posts::table
            .find(id)
            .first(conn)
            .await
            .optional()
            .expect("Error loading post")
    }

    /// Human-readable creation date, e.g. "Sat Aug 22 2026, 9:05 AM".
    pub fn friendly_date(&self) -> String {
        use time::macros::format_description;

        let fmt = format_description!(
            "[weekday repr:short] [month repr:short] [day padding:none] [year], \
             [hour repr:12 padding:none]:[minute] [period]"
        );
        self.created_at
            .to_offset(time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC))
            .format(&fmt)
            .expect("Error formatting date")
    }
}

/// Inserts the post and attaches the given tags in one transaction:
/// a failing tag id leaves no orphaned post behind.
pub async fn create_post(conn: &mut Connection, new_post: NewPost, tag_ids: Vec<i32>) -> Post {
    conn.transaction(|conn| {
        async move {
            let post: Post = diesel::insert_into(posts::table)
                .values(&new_post)
                .returning(Post::as_returning())
                .get_result(conn)
                .await?;
            tag::replace_post_tags(conn, post.id, tag_ids).await?;
            Ok::<_, diesel::result::Error>(post)
        }
        .scope_boxed()
    })
    .await
    .expect("Error saving new post")
}

/// Overwrites title and content unconditionally and replaces the tag
/// set, committing both or neither. `created_at` and `user_id` are
/// never touched.
pub async fn update_post(
    conn: &mut Connection,
    id: i32,
    modified: ModifyPost,
    tag_ids: Vec<i32>,
) -> Option<Post> {
    conn.transaction(|conn| {
        async move {
            let post = diesel::update(posts::table.find(id))
                .set(&modified)
                .returning(Post::as_returning())
                .get_result(conn)
                .await
                .optional()?;
            if let Some(ref post) = post {
                tag::replace_post_tags(conn, post.id, tag_ids).await?;
            }
            Ok::<_, diesel::result::Error>(post)
        }
        .scope_boxed()
    })
    .await
    .expect("Error updating post")
}

/// Deletes the post and its tag associations in one transaction.
/// The owning user and the tags themselves stay. Returns the number
/// of deleted posts.
pub async fn delete_post(conn: &mut Connection, id: i32) -> usize {
    conn.transaction(|conn| {
        async move {
            diesel::delete(posts_tags::table.filter(posts_tags::post_id.eq(id)))
                .execute(conn)
                .await?;
            diesel::delete(posts::table.find(id)).execute(conn).await
        }
        .scope_boxed()
    })
    .await
    .expect("Error deleting post")
}

pub async fn list_posts_by_user(conn: &mut Connection, user_id: i32) -> Vec<Post> {
    posts::table
        .filter(posts::user_id.eq(user_id))
        .order(posts::id.asc())
        .load(conn)
        .await
        .expect("Error loading posts")
}

pub async fn recent_posts(conn: &mut Connection, limit: i64) -> Vec<Post> {
    posts::table
        .order((posts::created_at.desc(), posts::id.desc()))
        .limit(limit)
        .load(conn)
        .await
        .expect("Error loading posts")
}
