//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250801_000001_create_user_table;
mod m20250801_000002_create_post_table;
mod m20250801_000003_create_report_table;
mod m20250801_000004_create_reaction_table;
mod m20250801_000005_create_comment_table;
mod m20250801_000006_create_notification_table;
mod m20250801_000007_create_friend_request_table;
mod m20250801_000008_create_friendship_table;
mod m20250801_000009_create_moderation_log_table;
mod m20250801_000010_create_login_session_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_user_table::Migration),
            Box::new(m20250801_000002_create_post_table::Migration),
            Box::new(m20250801_000003_create_report_table::Migration),
            Box::new(m20250801_000004_create_reaction_table::Migration),
            Box::new(m20250801_000005_create_comment_table::Migration),
            Box::new(m20250801_000006_create_notification_table::Migration),
            Box::new(m20250801_000007_create_friend_request_table::Migration),
            Box::new(m20250801_000008_create_friendship_table::Migration),
            Box::new(m20250801_000009_create_moderation_log_table::Migration),
            Box::new(m20250801_000010_create_login_session_table::Migration),
        ]
    }
}
