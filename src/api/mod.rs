pub mod configs;
pub mod errors;
pub mod fairings;

pub mod home;
pub mod post;
pub mod tag;
pub mod user;
