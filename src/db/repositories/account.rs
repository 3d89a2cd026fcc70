use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::debug;

use crate::entities::{prelude::*, users};

/// Fields supplied when inserting a new account row.
#[derive(Debug, Clone)]
pub struct NewAccountRow {
    pub user: String,
    pub password_hash: String,
    pub uid: i32,
    pub gid: i32,
    pub dir: String,
    pub requested_by: Option<String>,
    pub requested_on: NaiveDate,
    pub expiration_date: NaiveDate,
}

/// One statement per method against the `users` table.
pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::User.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to query user by name")?;

        Ok(count > 0)
    }

    pub async fn get(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find_by_id(username.to_string())
            .one(&self.conn)
            .await
            .context("Failed to load user")
    }

    pub async fn insert(&self, row: NewAccountRow) -> Result<users::Model> {
        let active_model = users::ActiveModel {
            user: Set(row.user),
            password: Set(row.password_hash),
            uid: Set(row.uid),
            gid: Set(row.gid),
            dir: Set(row.dir),
            requested_by: Set(row.requested_by),
            requested_on: Set(row.requested_on),
            active: Set(true),
            expiration_date: Set(row.expiration_date),
            renewed_on: Set(None),
            renew_counter: Set(0),
        };

        // No error context here: callers inspect the DbErr for key conflicts.
        let model = active_model.insert(&self.conn).await?;

        debug!("Inserted user row {}", model.user);
        Ok(model)
    }

    /// Rows ordered by name, optionally restricted to one value of `Active`.
    pub async fn list(&self, active: Option<bool>) -> Result<Vec<users::Model>> {
        let mut query = Users::find().order_by_asc(users::Column::User);

        if let Some(active) = active {
            query = query.filter(users::Column::Active.eq(active));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list users")
    }

    /// Active rows whose expiration date lies in `[from, to]`.
    pub async fn list_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<users::Model>> {
        Users::find()
            .filter(users::Column::Active.eq(true))
            .filter(users::Column::ExpirationDate.between(from, to))
            .order_by_asc(users::Column::ExpirationDate)
            .order_by_asc(users::Column::User)
            .all(&self.conn)
            .await
            .context("Failed to list expiring users")
    }

    pub async fn set_active(&self, username: &str, active: bool) -> Result<u64> {
        let result = Users::update_many()
            .col_expr(users::Column::Active, Expr::value(active))
            .filter(users::Column::User.eq(username))
            .exec(&self.conn)
            .await
            .context("Failed to update active flag")?;

        Ok(result.rows_affected)
    }

    pub async fn count_deactivated(&self, username: &str) -> Result<u64> {
        Users::find()
            .filter(users::Column::User.eq(username))
            .filter(users::Column::Active.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to query deactivated state")
    }

    pub async fn count_expired(&self, username: &str, today: NaiveDate) -> Result<u64> {
        Users::find()
            .filter(users::Column::User.eq(username))
            .filter(users::Column::ExpirationDate.lt(today))
            .count(&self.conn)
            .await
            .context("Failed to query expiration state")
    }

    /// Sets the new expiration, bumps `RenewCounter` in place and stamps `RenewedOn`.
    pub async fn renew(
        &self,
        username: &str,
        expiration_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<u64> {
        let result = Users::update_many()
            .col_expr(users::Column::ExpirationDate, Expr::value(expiration_date))
            .col_expr(
                users::Column::RenewCounter,
                Expr::col(users::Column::RenewCounter).add(1),
            )
            .col_expr(users::Column::RenewedOn, Expr::value(today))
            .col_expr(users::Column::Active, Expr::value(true))
            .filter(users::Column::User.eq(username))
            .exec(&self.conn)
            .await
            .context("Failed to renew user")?;

        Ok(result.rows_affected)
    }

    pub async fn requester(&self, username: &str) -> Result<Option<(Option<String>, NaiveDate)>> {
        Users::find()
            .select_only()
            .column(users::Column::RequestedBy)
            .column(users::Column::RequestedOn)
            .filter(users::Column::User.eq(username))
            .into_tuple::<(Option<String>, NaiveDate)>()
            .one(&self.conn)
            .await
            .context("Failed to query requester")
    }
}
