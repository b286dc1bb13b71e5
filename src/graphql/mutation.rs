//! Mutation resolvers.

use async_graphql::{Context, Object, Result, ID};

use crate::auth::{self, CurrentUser, JwtSecret};
use crate::store::Store;

use super::types::{AuthPayload, Comment, Link, User};

#[derive(Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    /// Submit a new link. Owner is the authenticated user, when present.
    async fn post_link(
        &self,
        ctx: &Context<'_>,
        description: String,
        url: String,
    ) -> Result<Link> {
        require_non_empty("description", &description)?;
        require_non_empty("url", &url)?;
        let store = ctx.data_unchecked::<Store>();
        let posted_by = ctx.data_opt::<CurrentUser>().map(|user| user.id);
        let row = store
            .create_link(&description, &url, posted_by)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(Link::from(row))
    }

    /// Delete a link and its comments; returns the deleted link.
    async fn delete_link(&self, ctx: &Context<'_>, id: ID) -> Result<Link> {
        let id = parse_entity_id(&id, "link")?;
        let store = ctx.data_unchecked::<Store>();
        let row = store
            .delete_link(id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(Link::from(row))
    }

    /// Attach a comment to an existing link.
    async fn post_comment_on_link(
        &self,
        ctx: &Context<'_>,
        link_id: ID,
        body: String,
    ) -> Result<Comment> {
        require_non_empty("body", &body)?;
        let link_id = parse_entity_id(&link_id, "link")?;
        let store = ctx.data_unchecked::<Store>();
        let row = store
            .create_comment(link_id, &body)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(Comment::from(row))
    }

    /// Replace the body of an existing comment.
    async fn update_comment_on_link(
        &self,
        ctx: &Context<'_>,
        comment_id: ID,
        body: String,
    ) -> Result<Comment> {
        require_non_empty("body", &body)?;
        let comment_id = parse_entity_id(&comment_id, "comment")?;
        let store = ctx.data_unchecked::<Store>();
        let row = store
            .update_comment(comment_id, &body)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(Comment::from(row))
    }

    /// Delete a comment; returns the deleted comment.
    async fn delete_comment_on_link(&self, ctx: &Context<'_>, comment_id: ID) -> Result<Comment> {
        let comment_id = parse_entity_id(&comment_id, "comment")?;
        let store = ctx.data_unchecked::<Store>();
        let row = store
            .delete_comment(comment_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(Comment::from(row))
    }

    /// Register a new user and sign them in.
    async fn signup(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
    ) -> Result<AuthPayload> {
        require_non_empty("name", &name)?;
        require_non_empty("email", &email)?;
        require_non_empty("password", &password)?;
        let store = ctx.data_unchecked::<Store>();
        let secret = ctx.data_unchecked::<JwtSecret>();
        let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let user = store
            .create_user(&name, &email, &hash)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let token = auth::issue_token(&secret.0, user.id)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(AuthPayload {
            token,
            user: User::from(user),
        })
    }

    /// Exchange credentials for a token.
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthPayload> {
        let store = ctx.data_unchecked::<Store>();
        let secret = ctx.data_unchecked::<JwtSecret>();
        let Some(user) = store
            .user_by_email(&email)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
        else {
            return Err(async_graphql::Error::new("invalid email or password"));
        };
        let valid = bcrypt::verify(&password, &user.password)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        if !valid {
            return Err(async_graphql::Error::new("invalid email or password"));
        }
        let token = auth::issue_token(&secret.0, user.id)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(AuthPayload {
            token,
            user: User::from(user),
        })
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(async_graphql::Error::new(format!(
            "`{name}` must not be empty"
        )));
    }
    Ok(())
}

/// Ids arrive as GraphQL `ID` strings; anything non-numeric cannot name
/// an existing row, so it reports the same way as a missing one.
fn parse_entity_id(raw: &ID, kind: &str) -> Result<i32> {
    raw.parse::<i32>().map_err(|_| {
        async_graphql::Error::new(format!("{kind} with id `{}` does not exist", raw.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entity_id_accepts_numeric_ids() {
        assert_eq!(parse_entity_id(&ID("17".into()), "link").unwrap(), 17);
    }

    #[test]
    fn parse_entity_id_reports_does_not_exist_for_garbage() {
        let err = parse_entity_id(&ID("abc".into()), "link").unwrap_err();
        assert!(err.message.contains("link"));
        assert!(err.message.contains("abc"));
        assert!(err.message.contains("does not exist"));
    }

    #[test]
    fn require_non_empty_rejects_blank_values() {
        assert!(require_non_empty("description", "").is_err());
        assert!(require_non_empty("description", "   ").is_err());
        assert!(require_non_empty("description", "ok").is_ok());
    }
}
