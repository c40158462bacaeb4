//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    pub email_lower: String,

    /// Argon2 password hash
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(nullable)]
    pub department: Option<String>,

    #[sea_orm(nullable)]
    pub campus: Option<String>,

    /// Is this user an admin?
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Is this account banned?
    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    /// Is this account deactivated?
    #[sea_orm(default_value = false)]
    pub is_deactivated: bool,

    /// Soft-delete flag; accounts are never hard-deleted
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    #[sea_orm(nullable)]
    pub ban_reason: Option<String>,

    #[sea_orm(nullable)]
    pub banned_by: Option<String>,

    #[sea_orm(nullable)]
    pub banned_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub deactivate_reason: Option<String>,

    #[sea_orm(nullable)]
    pub deactivated_by: Option<String>,

    #[sea_orm(nullable)]
    pub deactivated_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub last_active_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,

    #[sea_orm(has_many = "super::login_session::Entity")]
    Sessions,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this account may authenticate and act.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_banned && !self.is_deactivated && !self.is_deleted
    }

    /// Display name shown next to posts and notifications.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
