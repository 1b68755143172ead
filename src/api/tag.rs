use super::errors::Error;
use super::fairings::db::Db;
use crate::db::post::Post;
use crate::db::tag::{self, Tag};

use rocket::form::Form;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;

#[derive(FromForm, Debug)]
pub struct CreateTagForm<'r> {
    #[field(validate = len(1..=25))]
    pub name: &'r str,
}

#[derive(FromForm, Debug)]
pub struct EditTagForm<'r> {
    pub name: &'r str,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct TagDetail {
    pub tag: Tag,
    pub posts: Vec<Post>,
}

#[get("/")]
pub async fn list_tags(mut db: Connection<Db>) -> Json<Vec<Tag>> {
    Json(tag::list_tags(&mut db).await)
}

#[get("/new")]
pub fn new_tag_form() {
    // Nothing to prefill.
}

#[post("/new", data = "<form>")]
pub async fn create_tag(
    mut db: Connection<Db>,
    form: Form<CreateTagForm<'_>>,
) -> Result<Redirect, Error> {
    tag::create_tag(&mut db, form.name).await?;
    Ok(Redirect::found("/tags"))
}

#[get("/<id>")]
pub async fn show_tag(mut db: Connection<Db>, id: i32) -> Result<Json<TagDetail>, Error> {
    let tag = Tag::get(&mut db, id)
        .await
        .ok_or_else(|| Error::NotFound("Tag not found".to_string()))?;
    let posts = tag::posts_of_tag(&mut db, id).await;
    Ok(Json(TagDetail { tag, posts }))
}

#[get("/<id>/edit")]
pub async fn edit_tag_form(mut db: Connection<Db>, id: i32) -> Result<Json<Tag>, Error> {
    Tag::get(&mut db, id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound("Tag not found".to_string()))
}

#[post("/<id>/edit", data = "<form>")]
pub async fn update_tag(
    mut db: Connection<Db>,
    id: i32,
    form: Form<EditTagForm<'_>>,
) -> Result<Redirect, Error> {
    tag::update_tag(&mut db, id, form.name)
        .await?
        .ok_or_else(|| Error::NotFound("Tag not found".to_string()))?;
    Ok(Redirect::found("/tags"))
}

#[post("/<id>/delete")]
pub async fn delete_tag(mut db: Connection<Db>, id: i32) -> Result<Redirect, Error> {
    let deleted = tag::delete_tag(&mut db, id).await == 1;
    if deleted {
        Ok(Redirect::found("/tags"))
    } else {
        Err(Error::NotFound("Tag not found".to_string()))
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        list_tags,
        new_tag_form,
        create_tag,
        show_tag,
        edit_tag_form,
        update_tag,
        delete_tag
    ]
}
