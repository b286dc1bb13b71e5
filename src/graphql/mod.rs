//! GraphQL schema: object types, Query/Mutation resolvers, dataloaders.

mod loader;
mod mutation;
mod query;
mod types;

pub use loader::{CommentsByLinkLoader, LinkLoader, LinksByUserLoader, UserLoader};
pub use mutation::Mutation;
pub use query::Query;
pub use types::{AuthPayload, Comment, Link, User};

use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};

use crate::auth::JwtSecret;
use crate::store::Store;

pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema with the shared store, the signing secret, and the
/// relation dataloaders installed as schema data. The loaders share
/// the process lifetime but cache nothing across requests.
pub fn build_schema(store: Store, secret: JwtSecret) -> AppSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(store.clone())
        .data(secret)
        .data(DataLoader::new(
            CommentsByLinkLoader::new(store.clone()),
            tokio::spawn,
        ))
        .data(DataLoader::new(LinkLoader::new(store.clone()), tokio::spawn))
        .data(DataLoader::new(UserLoader::new(store.clone()), tokio::spawn))
        .data(DataLoader::new(LinksByUserLoader::new(store), tokio::spawn))
        .finish()
}
