use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection as Connection, RunQueryDsl};
use rocket::serde::{Deserialize, Serialize};

use super::schema::{posts, posts_tags, users};

/// Placeholder avatar, also the column default in the migration.
pub const DEFAULT_IMAGE_URL: &str = "https://cdn5.vectorstock.com/i/1000x1000/45/79/male-avatar-profile-picture-silhouette-light-vector-4684579.jpg";

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Deserialize, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    /// `None` falls back to the column default.
    pub image_url: Option<String>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = users)]
pub struct ModifyUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn get(conn: &mut Connection, id: i32) -> Option<Self> {
        users::table
            .find(id)
            .first(conn)
            .await
            .optional()
            .expect("Error loading user")
    }
}

impl ModifyUser {
    fn is_noop(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.image_url.is_none()
    }
}

pub async fn list_users(conn: &mut Connection) -> Vec<User> {
    users::table
        .order((users::last_name.asc(), users::first_name.asc()))
        .load(conn)
        .await
        .expect("Error loading users")
}

pub async fn create_user(conn: &mut Connection, new_user: NewUser) -> User {
    diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .await
        .expect("Error saving new user")
}

/// Partial update: `None` fields keep their stored value.
pub async fn update_user(conn: &mut Connection, id: i32, modified: ModifyUser) -> Option<User> {
    if modified.is_noop() {
        // An all-None changeset is not a valid UPDATE statement.
        return User::get(conn, id).await;
    }
    diesel::update(users::table.find(id))
        .set(&modified)
        .returning(User::as_returning())
        .get_result(conn)
        .await
        .optional()
        .expect("Error updating user")
}

/// Deletes the user together with all owned posts and their tag
/// associations, in one transaction. Returns the number of deleted users.
pub async fn delete_user(conn: &mut Connection, id: i32) -> usize {
    conn.transaction(|conn| {
        async move {
            let post_ids: Vec<i32> = posts::table
                .filter(posts::user_id.eq(id))
                .select(posts::id)
                .load(conn)
                .await?;
            diesel::delete(posts_tags::table.filter(posts_tags::post_id.eq_any(post_ids.clone())))
                .execute(conn)
                .await?;
            diesel::delete(posts::table.filter(posts::id.eq_any(post_ids)))
                .execute(conn)
                .await?;
            diesel::delete(users::table.find(id)).execute(conn).await
        }
        .scope_boxed()
    })
    .await
    .expect("Error deleting user")
}
