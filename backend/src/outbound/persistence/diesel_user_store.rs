//! PostgreSQL-backed `UserStore` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewUser, UserStore, UserStoreError};
use crate::domain::{User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserStore` port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::new(row.id),
        subject: row.subject,
        email: row.email,
        display_name: row.display_name,
        created_at: row.created_at,
    }
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(row_to_user))
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::subject.eq(subject))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row.map(row_to_user))
    }

    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await?;
        let inserted = diesel::insert_into(users::table)
            .values(NewUserRow {
                subject: &user.subject,
                email: &user.email,
                display_name: &user.display_name,
                created_at: Utc::now(),
            })
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await;

        match inserted {
            Ok(row) => Ok(row_to_user(row)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(UserStoreError::subject_taken(user.subject))
            }
            Err(err) => Err(err.into()),
        }
    }
}
