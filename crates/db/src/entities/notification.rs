//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    #[sea_orm(string_value = "reaction")]
    Reaction,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "friendRequest")]
    FriendRequest,
    #[sea_orm(string_value = "friendAccepted")]
    FriendAccepted,
    #[sea_orm(string_value = "share")]
    Share,
}

impl NotificationType {
    /// Grouped types merge repeated events into one unread document.
    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        matches!(self, Self::Reaction | Self::Comment)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    #[sea_orm(indexed)]
    pub user_id: String,

    /// The user who triggered the notification (primary actor)
    pub actor_id: String,

    pub notification_type: NotificationType,

    /// Related post ID (for reaction, comment, share, approved, declined)
    #[sea_orm(nullable, indexed)]
    pub post_id: Option<String>,

    /// Additional actors merged into this notification ("X and N others")
    #[sea_orm(column_type = "JsonBinary")]
    pub other_actor_ids: Json,

    /// Latest event payload (reaction kind, comment excerpt, decline reason)
    #[sea_orm(nullable)]
    pub payload: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,

    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Actor IDs merged into this notification beyond the primary actor.
    #[must_use]
    pub fn other_actors(&self) -> Vec<String> {
        self.other_actor_ids
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}
