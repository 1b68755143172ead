// ORM Schema
pub mod schema;

// ORM Models
pub mod post;
pub mod tag;
pub mod user;

// Driver
pub mod connection;
