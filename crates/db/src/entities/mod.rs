//! Database entities.

pub mod comment;
pub mod friend_request;
pub mod friendship;
pub mod login_session;
pub mod moderation_log;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod report;
pub mod user;

pub use comment::Entity as Comment;
pub use friend_request::Entity as FriendRequest;
pub use friendship::Entity as Friendship;
pub use login_session::Entity as LoginSession;
pub use moderation_log::Entity as ModerationLog;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use reaction::Entity as Reaction;
pub use report::Entity as Report;
pub use user::Entity as User;
