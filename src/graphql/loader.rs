//! Dataloaders for relation fields.
//!
//! Nested field resolution (`Link.comments`, `Comment.link`, ...) goes
//! through these so sibling parents in one response share a single
//! batched query instead of one query per row. The loaders are
//! installed once as schema data and live for the process; with the
//! default `NoCache` policy they only batch, nothing is cached across
//! requests.

use std::collections::HashMap;

use async_graphql::dataloader::Loader;

use crate::entity::{comment, link, user};
use crate::store::Store;

/// Fetches all comments for a set of link ids.
pub struct CommentsByLinkLoader {
    store: Store,
}

impl CommentsByLinkLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Loader<i32> for CommentsByLinkLoader {
    type Value = Vec<comment::Model>;
    type Error = async_graphql::Error;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        self.store
            .comments_for_links(keys)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

/// Fetches links by id.
pub struct LinkLoader {
    store: Store,
}

impl LinkLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Loader<i32> for LinkLoader {
    type Value = link::Model;
    type Error = async_graphql::Error;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        self.store
            .links_by_ids(keys)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

/// Fetches users by id.
pub struct UserLoader {
    store: Store,
}

impl UserLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Loader<i32> for UserLoader {
    type Value = user::Model;
    type Error = async_graphql::Error;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        self.store
            .users_by_ids(keys)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

/// Fetches all links posted by a set of user ids.
pub struct LinksByUserLoader {
    store: Store,
}

impl LinksByUserLoader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Loader<i32> for LinksByUserLoader {
    type Value = Vec<link::Model>;
    type Error = async_graphql::Error;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        self.store
            .links_for_users(keys)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}
