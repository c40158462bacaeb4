//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post moderation status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
    #[sea_orm(string_value = "declined")]
    Declined,
}

/// Kind of inline media attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MediaType {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID. Always stored, even for anonymous posts.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Post text content
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Inline media as a data-URI (size-capped)
    #[sea_orm(column_type = "Text", nullable)]
    pub media: Option<String>,

    #[sea_orm(nullable)]
    pub media_type: Option<MediaType>,

    /// Set when the compression loop exhausted its attempts
    #[sea_orm(default_value = false)]
    pub media_oversized: bool,

    /// Hide the author's display name (author id is still stored)
    #[sea_orm(default_value = false)]
    pub is_anonymous: bool,

    pub status: PostStatus,

    #[sea_orm(default_value = false)]
    pub is_reported: bool,

    /// Declined posts are archived, not deleted
    #[sea_orm(default_value = false)]
    pub archived: bool,

    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    #[sea_orm(default_value = 0)]
    pub shares_count: i32,

    #[sea_orm(nullable)]
    pub decline_reason: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub declined_by: Option<String>,

    #[sea_orm(nullable)]
    pub declined_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::report::Entity")]
    Reports,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::reaction::Entity")]
    Reactions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
