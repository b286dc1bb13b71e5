//! Storage layer over SeaORM.
//!
//! All database access goes through [`Store`], a cheap-to-clone handle
//! around the process-wide [`DatabaseConnection`]. Errors are classified
//! into [`StoreError`]: missing rows, remapped constraint violations,
//! and everything else propagated as-is.

use std::collections::HashMap;

use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::entity::{comment, link, user};

/// Storage-level error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row referenced by id was not found. Message is per entity kind.
    #[error("{0}")]
    NotFound(String),
    /// A constraint violation remapped to a domain message.
    #[error("{0}")]
    Constraint(String),
    /// Any other database error, propagated unchanged.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared data-access handle. One per process, cloned per use.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    pub async fn link(&self, id: i32) -> StoreResult<Option<link::Model>> {
        Ok(link::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Feed query: optional substring filter over description OR url,
    /// offset/limit pagination, id-ascending for stable pages.
    pub async fn link_feed(
        &self,
        needle: Option<&str>,
        take: u64,
        skip: u64,
    ) -> StoreResult<Vec<link::Model>> {
        let mut query = link::Entity::find();
        if let Some(needle) = needle {
            // The needle is a literal substring, so LIKE metacharacters
            // in it must not act as wildcards.
            let pattern = format!("%{}%", escape_like(needle));
            query = query.filter(
                Condition::any()
                    .add(link::Column::Description.like(LikeExpr::new(pattern.as_str()).escape('\\')))
                    .add(link::Column::Url.like(LikeExpr::new(pattern.as_str()).escape('\\'))),
            );
        }
        Ok(query
            .order_by_asc(link::Column::Id)
            .offset(skip)
            .limit(take)
            .all(&self.db)
            .await?)
    }

    pub async fn create_link(
        &self,
        description: &str,
        url: &str,
        posted_by: Option<i32>,
    ) -> StoreResult<link::Model> {
        let row = link::ActiveModel {
            description: Set(description.to_owned()),
            url: Set(url.to_owned()),
            created_at: Set(chrono::Utc::now()),
            posted_by_id: Set(posted_by),
            ..Default::default()
        };
        row.insert(&self.db)
            .await
            .map_err(|e| constraint_or_db(e, "cannot create link"))
    }

    /// Deletes a link and its comments in one transaction, so the
    /// existence check and the delete cannot race.
    pub async fn delete_link(&self, id: i32) -> StoreResult<link::Model> {
        let txn = self.db.begin().await?;
        let Some(found) = link::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Err(StoreError::NotFound(format!(
                "link with id {id} does not exist"
            )));
        };
        comment::Entity::delete_many()
            .filter(comment::Column::LinkId.eq(id))
            .exec(&txn)
            .await?;
        link::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| constraint_or_db(e, "cannot delete link: rows still reference it"))?;
        txn.commit().await?;
        Ok(found)
    }

    /// Batch lookup backing the `Link.comments` dataloader.
    pub async fn comments_for_links(
        &self,
        link_ids: &[i32],
    ) -> StoreResult<HashMap<i32, Vec<comment::Model>>> {
        let rows = comment::Entity::find()
            .filter(comment::Column::LinkId.is_in(link_ids.iter().copied()))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        let mut map: HashMap<i32, Vec<comment::Model>> = HashMap::new();
        for row in rows {
            if let Some(link_id) = row.link_id {
                map.entry(link_id).or_default().push(row);
            }
        }
        Ok(map)
    }

    pub async fn links_by_ids(&self, ids: &[i32]) -> StoreResult<HashMap<i32, link::Model>> {
        let rows = link::Entity::find()
            .filter(link::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    /// Batch lookup backing the `User.links` dataloader.
    pub async fn links_for_users(
        &self,
        user_ids: &[i32],
    ) -> StoreResult<HashMap<i32, Vec<link::Model>>> {
        let rows = link::Entity::find()
            .filter(link::Column::PostedById.is_in(user_ids.iter().copied()))
            .order_by_asc(link::Column::Id)
            .all(&self.db)
            .await?;
        let mut map: HashMap<i32, Vec<link::Model>> = HashMap::new();
        for row in rows {
            if let Some(user_id) = row.posted_by_id {
                map.entry(user_id).or_default().push(row);
            }
        }
        Ok(map)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn comment(&self, id: i32) -> StoreResult<Option<comment::Model>> {
        Ok(comment::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create_comment(&self, link_id: i32, body: &str) -> StoreResult<comment::Model> {
        if link::Entity::find_by_id(link_id).one(&self.db).await?.is_none() {
            return Err(StoreError::NotFound(format!(
                "link with id {link_id} does not exist"
            )));
        }
        let row = comment::ActiveModel {
            body: Set(body.to_owned()),
            link_id: Set(Some(link_id)),
            ..Default::default()
        };
        row.insert(&self.db)
            .await
            .map_err(|e| constraint_or_db(e, "cannot comment on this link"))
    }

    pub async fn update_comment(&self, id: i32, body: &str) -> StoreResult<comment::Model> {
        let Some(found) = comment::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(StoreError::NotFound(format!(
                "comment with id {id} does not exist"
            )));
        };
        let mut active: comment::ActiveModel = found.into();
        active.body = Set(body.to_owned());
        active
            .update(&self.db)
            .await
            .map_err(|e| constraint_or_db(e, "cannot update this comment"))
    }

    pub async fn delete_comment(&self, id: i32) -> StoreResult<comment::Model> {
        let Some(found) = comment::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(StoreError::NotFound(format!(
                "comment with id {id} does not exist"
            )));
        };
        let res = comment::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| constraint_or_db(e, "cannot delete this comment"))?;
        // Row vanished between lookup and delete.
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(format!(
                "comment with id {id} does not exist"
            )));
        }
        Ok(found)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn user(&self, id: i32) -> StoreResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn user_by_email(&self, email: &str) -> StoreResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    pub async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<HashMap<i32, user::Model>> {
        let rows = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<user::Model> {
        let row = user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password: Set(password_hash.to_owned()),
            ..Default::default()
        };
        row.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Constraint(format!(
                "a user with email `{email}` already exists"
            )),
            _ => StoreError::Database(err),
        })
    }
}

/// Escape `%`, `_` and the escape character itself so a needle only
/// ever matches literally inside a LIKE pattern.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Remap foreign-key violations to a domain message; everything else
/// propagates unchanged.
fn constraint_or_db(err: DbErr, message: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            StoreError::Constraint(message.to_owned())
        }
        _ => StoreError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("a%c"), "a\\%c");
        assert_eq!(escape_like("a_c"), "a\\_c");
        assert_eq!(escape_like("a\\c"), "a\\\\c");
        assert_eq!(escape_like("plain"), "plain");
    }
}
