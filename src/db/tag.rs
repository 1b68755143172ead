use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection as Connection, RunQueryDsl};
use itertools::Itertools;
use rocket::serde::{Deserialize, Serialize};

use super::post::Post;
use super::schema::{posts, posts_tags, tags};
use crate::utils::DatabaseError;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Deserialize, Serialize)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Identifiable, Selectable, Queryable, Associations, Debug)]
#[diesel(belongs_to(Post))]
#[diesel(belongs_to(Tag))]
#[diesel(table_name = posts_tags)]
#[diesel(primary_key(post_id, tag_id))]
pub struct PostTag {
    pub post_id: i32,
    pub tag_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
}

impl Tag {
    pub async fn get(conn: &mut Connection, id: i32) -> Option<Self> {
        tags::table
            .find(id)
            .first(conn)
            .await
            .optional()
            .expect("Error loading tag")
    }
}

pub async fn list_tags(conn: &mut Connection) -> Vec<Tag> {
    tags::table.load(conn).await.expect("Error loading tags")
}

pub async fn create_tag(conn: &mut Connection, name: &str) -> Result<Tag, DatabaseError> {
    diesel::insert_into(tags::table)
        .values(&NewTag { name })
        .returning(Tag::as_returning())
        .get_result(conn)
        .await
        .map_err(|e: diesel::result::Error| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => DatabaseError::DuplicationError {
                table: "tags".to_string(),
            },
            _ => panic!("Unexpected error: {:?}", e),
        })
}

/// Renames unconditionally; the unique constraint on the name still applies.
pub async fn update_tag(
    conn: &mut Connection,
    id: i32,
    name: &str,
) -> Result<Option<Tag>, DatabaseError> {
    diesel::update(tags::table.find(id))
        .set(tags::name.eq(name))
        .returning(Tag::as_returning())
        .get_result(conn)
        .await
        .optional()
        .map_err(|e: diesel::result::Error| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => DatabaseError::DuplicationError {
                table: "tags".to_string(),
            },
            _ => panic!("Unexpected error: {:?}", e),
        })
}

/// Deletes the tag and its association rows in one transaction; tagged
/// posts stay. Returns the number of deleted tags.
pub async fn delete_tag(conn: &mut Connection, id: i32) -> usize {
    conn.transaction(|conn| {
        async move {
            diesel::delete(posts_tags::table.filter(posts_tags::tag_id.eq(id)))
                .execute(conn)
                .await?;
            diesel::delete(tags::table.find(id)).execute(conn).await
        }
        .scope_boxed()
    })
    .await
    .expect("Error deleting tag")
}

/// Replaces the post's tag set with the given ids. An empty list clears
/// all associations. Runs on the caller's transaction, so post create
/// and edit can commit the post row and its tag set together.
pub(crate) async fn replace_post_tags(
    conn: &mut Connection,
    post_id: i32,
    tag_ids: Vec<i32>,
) -> diesel::QueryResult<usize> {
    let rows = tag_ids
        .into_iter()
        .unique()
        .map(|tag_id| PostTag { post_id, tag_id })
        .collect::<Vec<_>>();

    diesel::delete(posts_tags::table.filter(posts_tags::post_id.eq(post_id)))
        .execute(conn)
        .await?;
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(posts_tags::table)
        .values(&rows)
        .execute(conn)
        .await
}

/// Standalone tag-set replacement in its own transaction.
pub async fn set_post_tags(conn: &mut Connection, post_id: i32, tag_ids: Vec<i32>) {
    conn.transaction(|conn| replace_post_tags(conn, post_id, tag_ids).scope_boxed())
        .await
        .expect("Error updating post tags");
}

pub async fn tags_of_post(conn: &mut Connection, post_id: i32) -> Vec<Tag> {
    posts_tags::table
        .inner_join(tags::table)
        .filter(posts_tags::post_id.eq(post_id))
        .select(Tag::as_select())
        .order(tags::id.asc())
        .load(conn)
        .await
        .expect("Error loading tags of post")
}

pub async fn posts_of_tag(conn: &mut Connection, tag_id: i32) -> Vec<Post> {
    posts_tags::table
        .inner_join(posts::table)
        .filter(posts_tags::tag_id.eq(tag_id))
        .select(Post::as_select())
        .order(posts::id.asc())
        .load(conn)
        .await
        .expect("Error loading posts of tag")
}
