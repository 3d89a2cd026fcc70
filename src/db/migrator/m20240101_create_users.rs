use sea_orm_migration::prelude::*;

use crate::constants::accounts::{DEFAULT_GID, DEFAULT_UID};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::User)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Uid)
                            .integer()
                            .not_null()
                            .default(DEFAULT_UID),
                    )
                    .col(
                        ColumnDef::new(Users::Gid)
                            .integer()
                            .not_null()
                            .default(DEFAULT_GID),
                    )
                    .col(ColumnDef::new(Users::Dir).string_len(255).not_null())
                    .col(ColumnDef::new(Users::RequestedBy).string_len(255).null())
                    .col(ColumnDef::new(Users::RequestedOn).date().not_null())
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::ExpirationDate).date().not_null())
                    .col(ColumnDef::new(Users::RenewedOn).date().null())
                    .col(
                        ColumnDef::new(Users::RenewCounter)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // pure-ftpd filters on the flag and the date for every login
        manager
            .create_index(
                Index::create()
                    .name("idx_users_active_expiration")
                    .table(Users::Table)
                    .col(Users::Active)
                    .col(Users::ExpirationDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    #[iden = "User"]
    User,
    #[iden = "Password"]
    Password,
    #[iden = "Uid"]
    Uid,
    #[iden = "Gid"]
    Gid,
    #[iden = "Dir"]
    Dir,
    #[iden = "RequestedBy"]
    RequestedBy,
    #[iden = "RequestedOn"]
    RequestedOn,
    #[iden = "Active"]
    Active,
    #[iden = "ExpirationDate"]
    ExpirationDate,
    #[iden = "RenewedOn"]
    RenewedOn,
    #[iden = "RenewCounter"]
    RenewCounter,
}
