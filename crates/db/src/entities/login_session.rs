//! Login session entity (device/session tracking per user).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "login_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    /// Bearer token issued at login; each session carries its own
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,

    /// Remote address at login time
    #[sea_orm(nullable)]
    pub ip: Option<String>,

    /// Raw User-Agent header
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    /// Parsed device class ("desktop", "mobile", "tablet")
    #[sea_orm(nullable)]
    pub device: Option<String>,

    #[sea_orm(nullable)]
    pub browser: Option<String>,

    #[sea_orm(nullable)]
    pub os: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub last_seen_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub revoked_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this session is still usable.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
