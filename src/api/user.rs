use super::errors::Error;
use super::fairings::db::Db;
use crate::db::post::{self, Post};
use crate::db::user::{self, ModifyUser, NewUser, User, DEFAULT_IMAGE_URL};

use rocket::form::Form;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;

#[derive(FromForm, Debug)]
pub struct CreateUserForm<'r> {
    #[field(validate = len(1..))]
    pub fname: &'r str,
    #[field(validate = len(1..))]
    pub lname: &'r str,
    pub imgurl: Option<&'r str>,
}

#[derive(FromForm, Debug)]
pub struct EditUserForm<'r> {
    pub fname: Option<&'r str>,
    pub lname: Option<&'r str>,
    pub imgurl: Option<&'r str>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct UserFormContext {
    pub default_image_url: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct UserDetail {
    pub user: User,
    pub full_name: String,
    pub posts: Vec<Post>,
}

/// Empty strings submitted by HTML forms count as "not provided".
fn submitted(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}

#[get("/")]
pub async fn list_users(mut db: Connection<Db>) -> Json<Vec<User>> {
    Json(user::list_users(&mut db).await)
}

#[get("/new")]
pub fn new_user_form() -> Json<UserFormContext> {
    Json(UserFormContext {
        default_image_url: DEFAULT_IMAGE_URL.to_string(),
    })
}

#[post("/new", data = "<form>")]
pub async fn create_user(mut db: Connection<Db>, form: Form<CreateUserForm<'_>>) -> Redirect {
    let form = form.into_inner();
    user::create_user(
        &mut db,
        NewUser {
            first_name: form.fname.to_string(),
            last_name: form.lname.to_string(),
            image_url: submitted(form.imgurl),
        },
    )
    .await;
    Redirect::found("/users")
}

#[get("/<id>")]
pub async fn show_user(mut db: Connection<Db>, id: i32) -> Result<Json<UserDetail>, Error> {
    let user = User::get(&mut db, id)
        .await
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    let posts = post::list_posts_by_user(&mut db, id).await;
    Ok(Json(UserDetail {
        full_name: user.full_name(),
        user,
        posts,
    }))
}

#[get("/<id>/edit")]
pub async fn edit_user_form(mut db: Connection<Db>, id: i32) -> Result<Json<User>, Error> {
    User::get(&mut db, id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

#[post("/<id>/edit", data = "<form>")]
pub async fn update_user(
    mut db: Connection<Db>,
    id: i32,
    form: Form<EditUserForm<'_>>,
) -> Result<Redirect, Error> {
    let form = form.into_inner();
    user::update_user(
        &mut db,
        id,
        ModifyUser {
            first_name: submitted(form.fname),
            last_name: submitted(form.lname),
            image_url: submitted(form.imgurl),
        },
    )
    .await
    .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Redirect::found("/users"))
}

#[post("/<id>/delete")]
pub async fn delete_user(mut db: Connection<Db>, id: i32) -> Result<Redirect, Error> {
    let deleted = user::delete_user(&mut db, id).await == 1;
    if deleted {
        Ok(Redirect::found("/users"))
    } else {
        Err(Error::NotFound("User not found".to_string()))
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        list_users,
        new_user_form,
        create_user,
        show_user,
        edit_user_form,
        update_user,
        delete_user
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection;
    use crate::utils::rand::rand_str;

    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;
    use rocket_db_pools::Database;

    fn test_client() -> Client {
        let app = rocket::build().attach(Db::init()).mount("/users", routes());
        Client::tracked(app).expect("valid rocket instance")
    }

    fn find_user(client: &Client, first_name: &str) -> User {
        let res = client.get("/users").dispatch();
        assert_eq!(res.status(), Status::Ok);
        let users: Vec<User> = res.into_json().unwrap();
        users
            .into_iter()
            .find(|u| u.first_name == first_name)
            .expect("created user should be listed")
    }

    #[test]
    fn create_user_then_listed() {
        let client = test_client();
        let fname = rand_str(8);
        let lname = rand_str(8);

        let res = client
            .post("/users/new")
            .header(ContentType::Form)
            .body(format!("fname={}&lname={}&imgurl=", fname, lname))
            .dispatch();
        assert_eq!(res.status(), Status::Found);
        assert_eq!(res.headers().get_one("Location"), Some("/users"));

        let created = find_user(&client, &fname);
        assert_eq!(created.last_name, lname);
        // Empty imgurl falls back to the placeholder.
        assert_eq!(created.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(created.full_name(), format!("{} {}", fname, lname));
    }

    #[test]
    fn create_user_requires_names() {
        let client = test_client();
        let res = client
            .post("/users/new")
            .header(ContentType::Form)
            .body("fname=&lname=b&imgurl=")
            .dispatch();
        assert_eq!(res.status(), Status::UnprocessableEntity);
    }

    #[test]
    fn new_user_form_exposes_default_image() {
        let client = test_client();
        let res = client.get("/users/new").dispatch();
        assert_eq!(res.status(), Status::Ok);
        let ctx: UserFormContext = res.into_json().unwrap();
        assert_eq!(ctx.default_image_url, DEFAULT_IMAGE_URL);
    }

    #[test]
    fn show_user_detail() {
        let client = test_client();
        let fname = rand_str(8);
        client
            .post("/users/new")
            .header(ContentType::Form)
            .body(format!("fname={}&lname=doe&imgurl=", fname))
            .dispatch();
        let created = find_user(&client, &fname);

        let res = client.get(format!("/users/{}", created.id)).dispatch();
        assert_eq!(res.status(), Status::Ok);
        let detail: UserDetail = res.into_json().unwrap();
        assert_eq!(detail.user.id, created.id);
        assert_eq!(detail.full_name, format!("{} doe", fname));
        assert!(detail.posts.is_empty());
    }

    #[test]
    fn missing_user_is_404() {
        let client = test_client();
        let res = client.get("/users/99999999").dispatch();
        assert_eq!(res.status(), Status::NotFound);

        let res = client.get("/users/99999999/edit").dispatch();
        assert_eq!(res.status(), Status::NotFound);

        let res = client
            .post("/users/99999999/edit")
            .header(ContentType::Form)
            .body("fname=a&lname=b&imgurl=")
            .dispatch();
        assert_eq!(res.status(), Status::NotFound);

        let res = client.post("/users/99999999/delete").dispatch();
        assert_eq!(res.status(), Status::NotFound);
    }

    #[test]
    fn edit_user_keeps_empty_fields() {
        let client = test_client();
        let fname = rand_str(8);
        client
            .post("/users/new")
            .header(ContentType::Form)
            .body(format!("fname={}&lname=before&imgurl=", fname))
            .dispatch();
        let created = find_user(&client, &fname);

        let res = client
            .post(format!("/users/{}/edit", created.id))
            .header(ContentType::Form)
            .body("fname=&lname=after&imgurl=")
            .dispatch();
        assert_eq!(res.status(), Status::Found);
        assert_eq!(res.headers().get_one("Location"), Some("/users"));

        let updated = find_user(&client, &fname);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, fname);
        assert_eq!(updated.last_name, "after");
        assert_eq!(updated.image_url, DEFAULT_IMAGE_URL);
    }

    #[test]
    fn edit_user_form_prefills() {
        let client = test_client();
        let fname = rand_str(8);
        client
            .post("/users/new")
            .header(ContentType::Form)
            .body(format!("fname={}&lname=doe&imgurl=", fname))
            .dispatch();
        let created = find_user(&client, &fname);

        let res = client.get(format!("/users/{}/edit", created.id)).dispatch();
        assert_eq!(res.status(), Status::Ok);
        let current: User = res.into_json().unwrap();
        assert_eq!(current.first_name, fname);
        assert_eq!(current.last_name, "doe");
    }

    #[rocket::async_test]
    async fn delete_user_with_posts() {
        use rocket::local::asynchronous;

        let mut conn = connection::establish().await;
        let user = crate::db::user::tests::create_rand_user(&mut conn).await;
        let post = crate::db::post::tests::create_rand_post(&mut conn, user.id).await;

        let app = rocket::build().attach(Db::init()).mount("/users", routes());
        let client = asynchronous::Client::tracked(app)
            .await
            .expect("valid rocket instance");

        let res = client
            .post(format!("/users/{}/delete", user.id))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::Found);
        assert_eq!(res.headers().get_one("Location"), Some("/users"));

        assert!(User::get(&mut conn, user.id).await.is_none());
        assert!(Post::get(&mut conn, post.id).await.is_none());

        // Gone means gone.
        let res = client
            .post(format!("/users/{}/delete", user.id))
            .dispatch()
            .await;
        assert_eq!(res.status(), Status::NotFound);
    }
}
