use crate::utils::DatabaseError;

#[derive(Responder)]
pub enum Error {
    #[response(status = 404)]
    NotFound(String),
    #[response(status = 400)]
    BadRequest(String),
}

impl From<DatabaseError> for Error {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::DuplicationError { table: _ } => Error::BadRequest(e.to_string()),
        }
    }
}
