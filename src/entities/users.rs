use sea_orm::entity::prelude::*;

/// One virtual FTP login, in the column layout pure-ftpd's SQL backend queries.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "User")]
    pub user: String,

    /// Argon2id password hash
    #[sea_orm(column_name = "Password")]
    pub password: String,

    #[sea_orm(column_name = "Uid")]
    pub uid: i32,

    #[sea_orm(column_name = "Gid")]
    pub gid: i32,

    #[sea_orm(column_name = "Dir")]
    pub dir: String,

    #[sea_orm(column_name = "RequestedBy")]
    pub requested_by: Option<String>,

    #[sea_orm(column_name = "RequestedOn")]
    pub requested_on: Date,

    /// Suspends the login independently of the expiration date.
    #[sea_orm(column_name = "Active")]
    pub active: bool,

    #[sea_orm(column_name = "ExpirationDate")]
    pub expiration_date: Date,

    #[sea_orm(column_name = "RenewedOn")]
    pub renewed_on: Option<Date>,

    #[sea_orm(column_name = "RenewCounter")]
    pub renew_counter: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
