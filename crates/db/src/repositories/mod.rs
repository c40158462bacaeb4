//! Repository layer.

mod comment;
mod friendship;
mod moderation_log;
mod notification;
mod post;
mod reaction;
mod report;
mod session;
mod user;

pub use comment::CommentRepository;
pub use friendship::FriendshipRepository;
pub use moderation_log::ModerationLogRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use reaction::ReactionRepository;
pub use report::ReportRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
