//! Moderation log entity (append-only audit trail of admin actions).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ModerationAction {
    #[sea_orm(string_value = "approvePost")]
    ApprovePost,
    #[sea_orm(string_value = "reviewPost")]
    ReviewPost,
    #[sea_orm(string_value = "declinePost")]
    DeclinePost,
    #[sea_orm(string_value = "banUser")]
    BanUser,
    #[sea_orm(string_value = "unbanUser")]
    UnbanUser,
    #[sea_orm(string_value = "deactivateUser")]
    DeactivateUser,
    #[sea_orm(string_value = "activateUser")]
    ActivateUser,
    #[sea_orm(string_value = "deleteUser")]
    DeleteUser,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moderation_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The admin who performed the action
    #[sea_orm(indexed)]
    pub moderator_id: String,

    pub action: ModerationAction,

    #[sea_orm(nullable, indexed)]
    pub target_post_id: Option<String>,

    #[sea_orm(nullable, indexed)]
    pub target_user_id: Option<String>,

    #[sea_orm(nullable)]
    pub reason: Option<String>,

    /// Snapshot of the moderated content at action time
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub snapshot: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ModeratorId",
        to = "super::user::Column::Id"
    )]
    Moderator,
}

impl ActiveModelBehavior for ActiveModel {}
