use super::errors::Error;
use super::fairings::db::Db;
use crate::db::post::{self, ModifyPost, NewPost, Post};
use crate::db::tag::{self, Tag};
use crate::db::user::User;

use rocket::form::Form;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;

#[derive(FromForm, Debug)]
pub struct CreatePostForm<'r> {
    #[field(validate = len(1..=50))]
    pub title: &'r str,
    #[field(validate = len(1..))]
    pub content: &'r str,
    /// Checked tag ids; absent means no tags.
    pub tags: Vec<i32>,
}

#[derive(FromForm, Debug)]
pub struct EditPostForm<'r> {
    pub title: &'r str,
    pub content: &'r str,
    pub tags: Vec<i32>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct NewPostContext {
    pub user: User,
    pub tags: Vec<Tag>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct PostDetail {
    pub post: Post,
    pub friendly_date: String,
    pub author: User,
    pub tags: Vec<Tag>,
}

#[get("/<user_id>/posts/new")]
pub async fn new_post_form(
    mut db: Connection<Db>,
    user_id: i32,
) -> Result<Json<NewPostContext>, Error> {
    let user = User::get(&mut db, user_id)
        .await
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    let tags = tag::list_tags(&mut db).await;
    Ok(Json(NewPostContext { user, tags }))
}

#[post("/<user_id>/posts/new", data = "<form>")]
pub async fn create_post(
    mut db: Connection<Db>,
    user_id: i32,
    form: Form<CreatePostForm<'_>>,
) -> Redirect {
    let form = form.into_inner();
    post::create_post(
        &mut db,
        NewPost {
            title: form.title.to_string(),
            content: form.content.to_string(),
            user_id,
        },
        form.tags,
    )
    .await;
    Redirect::found(format!("/users/{}", user_id))
}

#[get("/<id>")]
pub async fn show_post(mut db: Connection<Db>, id: i32) -> Result<Json<PostDetail>, Error> {
    let post = Post::get(&mut db, id)
        .await
        .ok_or_else(|| Error::NotFound("Post not found".to_string()))?;
    let author = User::get(&mut db, post.user_id)
        .await
        .expect("post author must exist");
    let tags = tag::tags_of_post(&mut db, post.id).await;
    Ok(Json(PostDetail {
        friendly_date: post.friendly_date(),
        post,
        author,
        tags,
    }))
}

#[get("/<id>/edit")]
pub async fn edit_post_form(mut db: Connection<Db>, id: i32) -> Result<Json<Post>, Error> {
    Post::get(&mut db, id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound("Post not found".to_string()))
}

#[post("/<id>/edit", data = "<form>")]
pub async fn update_post(
    mut db: Connection<Db>,
    id: i32,
    form: Form<EditPostForm<'_>>,
) -> Result<Redirect, Error> {
    let form = form.into_inner();
    // One transaction: the overwrite and the tag-set replacement
    // (empty included) commit together.
    post::update_post(
        &mut db,
        id,
        ModifyPost {
            title: form.title.to_string(),
            content: form.content.to_string(),
        },
        form.tags,
    )
    .await
    .ok_or_else(|| Error::NotFound("Post not found".to_string()))?;
    Ok(Redirect::found(format!("/posts/{}", id)))
}

#[post("/<id>/delete")]
pub async fn delete_post(mut db: Connection<Db>, id: i32) -> Result<Redirect, Error> {
    let post = Post::get(&mut db, id)
        .await
        .ok_or_else(|| Error::NotFound("Post not found".to_string()))?;
    post::delete_post(&mut db, id).await;
    Ok(Redirect::found(format!("/users/{}", post.user_id)))
}

/// Routes mounted under `/posts`.
pub fn routes() -> Vec<rocket::Route> {
    routes![show_post, edit_post_form, update_post, delete_post]
}

/// Post-creation routes mounted under `/users`.
pub fn user_routes() -> Vec<rocket::Route> {
    routes![new_post_form, create_post]
}
