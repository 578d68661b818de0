use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::users::{
    dto::{DeleteResult, UpdateResult, UserPatch},
    repo_types::User,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate user_id: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Document-store operations on the users collection. Callers hand in records
/// that are already validated; the store only enforces `user_id` uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    /// Zero or more matches; absence is an empty vec, not an error.
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<User>, StoreError>;
    async fn update_by_user_id(
        &self,
        user_id: &str,
        patch: &UserPatch,
    ) -> Result<UpdateResult, StoreError>;
    async fn delete_by_user_id(&self, user_id: &str) -> Result<DeleteResult, StoreError>;
}

/// Users kept as JSONB documents in Postgres, keyed by `user_id`.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (user_id, doc, created_on)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.user_id)
        .bind(Json(&user))
        .bind(user.created_on)
        .execute(&self.db)
        .await;

        match res {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate(user.user_id))
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_scalar::<_, Json<User>>(
            r#"
            SELECT doc
              FROM users
             ORDER BY created_on ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows.into_iter().map(|Json(u)| u).collect())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_scalar::<_, Json<User>>(
            r#"
            SELECT doc
              FROM users
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("find user by user_id")?;
        Ok(rows.into_iter().map(|Json(u)| u).collect())
    }

    async fn update_by_user_id(
        &self,
        user_id: &str,
        patch: &UserPatch,
    ) -> Result<UpdateResult, StoreError> {
        // Both CTEs read the same snapshot, so `matched` sees the row even when
        // `modified` skips it for being unchanged.
        let (matched, modified) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            WITH matched AS (
                SELECT user_id FROM users WHERE user_id = $1
            ), modified AS (
                UPDATE users
                   SET doc = doc || $2
                 WHERE user_id = $1
                   AND doc <> doc || $2
                RETURNING user_id
            )
            SELECT (SELECT count(*) FROM matched),
                   (SELECT count(*) FROM modified)
            "#,
        )
        .bind(user_id)
        .bind(Json(patch))
        .fetch_one(&self.db)
        .await
        .context("update user")?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched as u64,
            modified_count: modified as u64,
        })
    }

    async fn delete_by_user_id(&self, user_id: &str) -> Result<DeleteResult, StoreError> {
        let res = sqlx::query(r#"DELETE FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: res.rows_affected(),
        })
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryUserStore;
