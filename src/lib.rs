//! Hacker News clone backend.
//!
//! A GraphQL API over links, comments and users:
//! - SeaORM storage layer over Postgres (SQLite in tests)
//! - async-graphql resolvers with dataloaders for relation fields
//! - axum HTTP adapter with a single `/graphql` endpoint
//! - forgiving bearer-token authentication (invalid token == no user)

pub mod auth;
pub mod config;
pub mod entity;
pub mod graphql;
pub mod migration;
pub mod server;
pub mod store;
