//! GraphQL object types over the storage models.

use async_graphql::dataloader::DataLoader;
use async_graphql::{Context, Object, Result, SimpleObject, ID};

use crate::entity::{comment, link, user};

use super::loader::{CommentsByLinkLoader, LinkLoader, LinksByUserLoader, UserLoader};

#[derive(Clone)]
pub struct Link {
    pub id: i32,
    pub description: String,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub posted_by_id: Option<i32>,
}

#[Object]
impl Link {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn url(&self) -> &str {
        &self.url
    }

    async fn created_at(&self) -> String {
        self.created_at.to_rfc3339()
    }

    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        let loader = ctx.data_unchecked::<DataLoader<CommentsByLinkLoader>>();
        let rows = loader.load_one(self.id).await?.unwrap_or_default();
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = self.posted_by_id else {
            return Ok(None);
        };
        let loader = ctx.data_unchecked::<DataLoader<UserLoader>>();
        Ok(loader.load_one(user_id).await?.map(User::from))
    }
}

impl From<link::Model> for Link {
    fn from(model: link::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            url: model.url,
            created_at: model.created_at,
            posted_by_id: model.posted_by_id,
        }
    }
}

#[derive(Clone)]
pub struct Comment {
    pub id: i32,
    pub body: String,
    pub link_id: Option<i32>,
}

#[Object]
impl Comment {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn body(&self) -> &str {
        &self.body
    }

    async fn link(&self, ctx: &Context<'_>) -> Result<Option<Link>> {
        let Some(link_id) = self.link_id else {
            return Ok(None);
        };
        let loader = ctx.data_unchecked::<DataLoader<LinkLoader>>();
        Ok(loader.load_one(link_id).await?.map(Link::from))
    }
}

impl From<comment::Model> for Comment {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            body: model.body,
            link_id: model.link_id,
        }
    }
}

#[derive(Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        &self.email
    }

    async fn links(&self, ctx: &Context<'_>) -> Result<Vec<Link>> {
        let loader = ctx.data_unchecked::<DataLoader<LinksByUserLoader>>();
        let rows = loader.load_one(self.id).await?.unwrap_or_default();
        Ok(rows.into_iter().map(Link::from).collect())
    }
}

// The password hash stays out of the API surface.
impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Returned by `signup` and `login`.
#[derive(SimpleObject)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}
