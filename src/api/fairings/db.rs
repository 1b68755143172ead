use diesel::connection::InstrumentationEvent;
use diesel_async::{
    pooled_connection::{
        deadpool::{BuildError, Object, Pool, PoolError},
        AsyncDieselConnectionManager,
    },
    AsyncConnection, AsyncPgConnection,
};
use rocket::figment::Figment;
use rocket_db_pools::{Database, Error};

use crate::db::connection::database_url;

pub struct DBPool(Pool<AsyncPgConnection>);

#[rocket::async_trait]
impl rocket_db_pools::Pool for DBPool {
    type Connection = Object<AsyncPgConnection>;

    type Error = Error<BuildError, PoolError>;

    async fn init(_figment: &Figment) -> Result<Self, Self::Error> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url());
        Pool::builder(manager).build().map(Self).map_err(Error::Init)
    }

    async fn get(&self) -> Result<Self::Connection, Self::Error> {
        let mut conn = self.0.get().await.map_err(Error::Get)?;

        // Log every statement a handler runs on this connection.
        conn.set_instrumentation(|event: InstrumentationEvent<'_>| {
            if let InstrumentationEvent::FinishQuery { query, error, .. } = event {
                match error {
                    Some(e) => tracing::error!(%query, ?e, "query failed"),
                    None => tracing::debug!(%query, "query ok"),
                }
            }
        });

        Ok(conn)
    }

    async fn close(&self) {
        self.0.close()
    }
}

#[derive(Database)]
#[database("main")]
pub struct Db(DBPool);
