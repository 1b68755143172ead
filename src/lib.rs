#[macro_use]
extern crate rocket;

pub mod api;
pub mod db;
pub mod utils;

#[cfg(test)]
#[cfg(not(tarpaulin_include))]
#[ctor::ctor]
fn init() {
    crate::utils::logging::setup_console_log();
}

#[cfg(not(tarpaulin_include))]
pub async fn rocket() -> rocket::Rocket<rocket::Build> {
    use rocket::fairing::AdHoc;
    use rocket::fs::FileServer;
    use rocket_db_pools::Database;

    use crate::api::configs::{self, Config};
    use crate::api::fairings::db::Db;
    use crate::api::{home, post, tag, user};

    crate::utils::logging::setup_console_log();
    crate::db::connection::run_migrations().await;

    let cfg_provider = configs::config_provider();
    let ui_path = cfg_provider
        .extract_inner::<Option<String>>("ui_path")
        .unwrap();

    let mut builder = rocket::custom(cfg_provider);
    if let Some(ui_path) = ui_path {
        // Serve the UI files if the path is provided
        builder = builder.mount("/static", FileServer::from(ui_path));
    }
    builder
        .attach(Db::init())
        .mount("/", home::routes())
        .mount("/users", user::routes())
        .mount("/users", post::user_routes())
        .mount("/posts", post::routes())
        .mount("/tags", tag::routes())
        .attach(AdHoc::config::<Config>())
}
