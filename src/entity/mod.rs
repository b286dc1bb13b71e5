//! SeaORM entities for the link/comment/user tables.

pub mod comment;
pub mod link;
pub mod user;
