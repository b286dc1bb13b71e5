//! Query resolvers.

use async_graphql::{Context, Object, Result, ID};

use crate::auth::CurrentUser;
use crate::store::Store;

use super::types::{Comment, Link, User};

const TAKE_DEFAULT: i32 = 30;
const TAKE_MIN: i32 = 1;
const TAKE_MAX: i32 = 50;
const SKIP_MIN: i32 = 0;
const SKIP_MAX: i32 = 50;

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    /// Paginated, optionally filtered feed of all submitted links.
    async fn link_feed(
        &self,
        ctx: &Context<'_>,
        filter_needle: Option<String>,
        take: Option<i32>,
        skip: Option<i32>,
    ) -> Result<Vec<Link>> {
        let take = check_range("take", take.unwrap_or(TAKE_DEFAULT), TAKE_MIN, TAKE_MAX)?;
        let skip = check_range("skip", skip.unwrap_or(0), SKIP_MIN, SKIP_MAX)?;
        let store = ctx.data_unchecked::<Store>();
        let rows = store
            .link_feed(filter_needle.as_deref(), take as u64, skip as u64)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(rows.into_iter().map(Link::from).collect())
    }

    /// A single link by id, or null.
    async fn link(&self, ctx: &Context<'_>, link_id: ID) -> Result<Option<Link>> {
        let Ok(id) = link_id.parse::<i32>() else {
            return Ok(None);
        };
        let store = ctx.data_unchecked::<Store>();
        Ok(store
            .link(id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .map(Link::from))
    }

    /// A single comment by id, or null.
    async fn comment(&self, ctx: &Context<'_>, comment_id: ID) -> Result<Option<Comment>> {
        let Ok(id) = comment_id.parse::<i32>() else {
            return Ok(None);
        };
        let store = ctx.data_unchecked::<Store>();
        Ok(store
            .comment(id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .map(Comment::from))
    }

    /// Despite the name, this resolves to the link itself, not its
    /// comment list. Clients reach the comments through the `comments`
    /// field on the result. The name is long-standing public API, so it
    /// stays.
    async fn link_comments(&self, ctx: &Context<'_>, link_id: ID) -> Result<Option<Link>> {
        let Ok(id) = link_id.parse::<i32>() else {
            return Ok(None);
        };
        let store = ctx.data_unchecked::<Store>();
        Ok(store
            .link(id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .map(Link::from))
    }

    /// The authenticated user, or null without a valid token.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(current) = ctx.data_opt::<CurrentUser>() else {
            return Ok(None);
        };
        let store = ctx.data_unchecked::<Store>();
        Ok(store
            .user(current.id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .map(User::from))
    }
}

fn check_range(name: &str, value: i32, min: i32, max: i32) -> Result<i32> {
    if value < min || value > max {
        return Err(async_graphql::Error::new(format!(
            "`{name}` argument out of range: got {value}, allowed between {min} and {max}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_range_accepts_bounds() {
        assert_eq!(check_range("take", 1, 1, 50).unwrap(), 1);
        assert_eq!(check_range("take", 50, 1, 50).unwrap(), 50);
        assert_eq!(check_range("skip", 0, 0, 50).unwrap(), 0);
    }

    #[test]
    fn check_range_names_argument_value_and_bounds() {
        let err = check_range("take", 999, 1, 50).unwrap_err();
        assert!(err.message.contains("take"));
        assert!(err.message.contains("999"));
        assert!(err.message.contains('1') && err.message.contains("50"));

        let err = check_range("skip", -3, 0, 50).unwrap_err();
        assert!(err.message.contains("skip"));
        assert!(err.message.contains("-3"));
    }
}
