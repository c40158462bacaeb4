//! Business logic services.

pub mod comment;
pub mod friendship;
pub mod media;
pub mod moderation;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod session;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
pub use friendship::{FriendshipService, FriendshipView};
pub use media::{MediaService, PreparedMedia};
pub use moderation::ModerationService;
pub use notification::NotificationService;
pub use post::{CreatePostInput, PostService};
pub use reaction::ReactionService;
pub use session::{SessionService, SessionView};
pub use user::{RegisterInput, UpdateProfileInput, UserService};
