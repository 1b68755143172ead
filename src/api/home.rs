use super::fairings::db::Db;
use crate::db::post::{self, Post};

use itertools::Itertools;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::Connection;

/// How many posts the homepage shows.
pub const RECENT_POST_COUNT: i64 = 5;

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct RecentPost {
    pub post: Post,
    pub friendly_date: String,
}

#[get("/")]
pub async fn homepage(mut db: Connection<Db>) -> Json<Vec<RecentPost>> {
    Json(
        post::recent_posts(&mut db, RECENT_POST_COUNT)
            .await
            .into_iter()
            .map(|post| RecentPost {
                friendly_date: post.friendly_date(),
                post,
            })
            .collect_vec(),
    )
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection;
    use crate::db::post::tests::create_rand_post;
    use crate::db::user::tests::create_rand_user;

    use futures::future::join_all;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;
    use rocket_db_pools::Database;

    #[rocket::async_test]
    async fn homepage_shows_five_newest_posts() {
        let mut conn = connection::establish().await;
        let user = create_rand_user(&mut conn).await;
        join_all((0..6).map(|_| async {
            let mut conn = connection::establish().await;
            create_rand_post(&mut conn, user.id).await
        }))
        .await;

        let app = rocket::build().attach(Db::init()).mount("/", routes());
        let client = Client::tracked(app).await.expect("valid rocket instance");

        let res = client.get("/").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
        let recent: Vec<RecentPost> = res.into_json().await.unwrap();
        assert_eq!(recent.len(), 5);
        for pair in recent.windows(2) {
            assert!(
                (pair[0].post.created_at, pair[0].post.id)
                    > (pair[1].post.created_at, pair[1].post.id),
                "homepage posts not in descending creation order"
            );
        }
        assert!(recent.iter().all(|p| !p.friendly_date.is_empty()));
    }
}
