//! Create login session table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginSession::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoginSession::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoginSession::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LoginSession::Ip).string_len(64))
                    .col(ColumnDef::new(LoginSession::UserAgent).text())
                    .col(ColumnDef::new(LoginSession::Device).string_len(32))
                    .col(ColumnDef::new(LoginSession::Browser).string_len(64))
                    .col(ColumnDef::new(LoginSession::Os).string_len(64))
                    .col(
                        ColumnDef::new(LoginSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LoginSession::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LoginSession::RevokedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_session_user")
                            .from(LoginSession::Table, LoginSession::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_login_session_user_id")
                    .table(LoginSession::Table)
                    .col(LoginSession::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: token (for bearer auth lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_login_session_token")
                    .table(LoginSession::Table)
                    .col(LoginSession::Token)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginSession::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LoginSession {
    Table,
    Id,
    UserId,
    Token,
    Ip,
    UserAgent,
    Device,
    Browser,
    Os,
    CreatedAt,
    LastSeenAt,
    RevokedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
