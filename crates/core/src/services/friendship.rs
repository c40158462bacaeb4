//! Friendship service: the friend-request state machine.

use sea_orm::Set;
use serde::Serialize;

use crate::services::notification::NotificationService;
use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{
    entities::{
        friend_request::{self, RequestStatus},
        friendship, notification::NotificationType, user,
    },
    repositories::{FriendshipRepository, UserRepository},
};

/// A friendship joined with the other user's profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipView {
    pub friendship: friendship::Model,
    pub friend: user::Model,
}

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    friendship_repo: FriendshipRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(
        friendship_repo: FriendshipRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            friendship_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a friend request.
    ///
    /// Rejected for self-requests, an existing friendship, or a pending
    /// request in either direction.
    pub async fn send_request(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> AppResult<friend_request::Model> {
        if sender_id == receiver_id {
            return Err(AppError::BadRequest(
                "You cannot send a friend request to yourself".to_string(),
            ));
        }

        let receiver = self.user_repo.get_by_id(receiver_id).await?;
        if !receiver.is_active() {
            return Err(AppError::UserNotFound(receiver_id.to_string()));
        }

        if self.friendship_repo.are_friends(sender_id, receiver_id).await? {
            return Err(AppError::Conflict("You are already friends".to_string()));
        }

        if self
            .friendship_repo
            .find_pending_between(sender_id, receiver_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A friend request between you is already pending".to_string(),
            ));
        }

        let created = self
            .friendship_repo
            .create_request(friend_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                sender_id: Set(sender_id.to_string()),
                receiver_id: Set(receiver_id.to_string()),
                status: Set(RequestStatus::Pending),
                created_at: Set(chrono::Utc::now().into()),
                responded_at: Set(None),
            })
            .await?;

        self.notifications
            .notify(
                receiver_id,
                sender_id,
                NotificationType::FriendRequest,
                None,
                None,
            )
            .await?;

        Ok(created)
    }

    /// Accept a friend request. Only the receiver may accept.
    ///
    /// The status flip and the friendship row are committed together; the
    /// `friendAccepted` notification afterwards is best-effort.
    pub async fn accept_request(
        &self,
        user_id: &str,
        request_id: &str,
    ) -> AppResult<friendship::Model> {
        let request = self.pending_request(request_id).await?;
        if request.receiver_id != user_id {
            return Err(AppError::Forbidden);
        }

        let sender_id = request.sender_id.clone();
        let created = self
            .friendship_repo
            .accept_request(request, self.id_gen.generate())
            .await?;

        if let Err(e) = self
            .notifications
            .notify(
                &sender_id,
                user_id,
                NotificationType::FriendAccepted,
                None,
                None,
            )
            .await
        {
            tracing::warn!(error = %e, "friendAccepted notification failed");
        }

        Ok(created)
    }

    /// Decline a friend request. Only the receiver may decline; the row is
    /// deleted outright.
    pub async fn decline_request(&self, user_id: &str, request_id: &str) -> AppResult<()> {
        let request = self.pending_request(request_id).await?;
        if request.receiver_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.friendship_repo.delete_request(request).await
    }

    /// Cancel a sent friend request. Only the sender may cancel.
    pub async fn cancel_request(&self, user_id: &str, request_id: &str) -> AppResult<()> {
        let request = self.pending_request(request_id).await?;
        if request.sender_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.friendship_repo.delete_request(request).await
    }

    /// Withdraw a pending request: the receiver declines it, the sender
    /// cancels it. Either way the row is deleted.
    pub async fn withdraw_request(&self, user_id: &str, request_id: &str) -> AppResult<()> {
        let request = self.pending_request(request_id).await?;
        if request.receiver_id != user_id && request.sender_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.friendship_repo.delete_request(request).await
    }

    /// Remove an existing friendship.
    pub async fn unfriend(&self, user_id: &str, other_id: &str) -> AppResult<()> {
        let Some(found) = self.friendship_repo.find_friendship(user_id, other_id).await? else {
            return Err(AppError::NotFound("You are not friends".to_string()));
        };
        self.friendship_repo.delete_friendship(found).await
    }

    /// Friends of a user, with their profiles.
    pub async fn friends(&self, user_id: &str) -> AppResult<Vec<FriendshipView>> {
        let friendships = self.friendship_repo.find_friendships(user_id).await?;
        let other_ids: Vec<String> = friendships
            .iter()
            .map(|f| f.other(user_id).to_owned())
            .collect();
        let users = self.user_repo.find_by_ids(&other_ids).await?;

        Ok(friendships
            .into_iter()
            .filter_map(|f| {
                let other_id = f.other(user_id).to_owned();
                users
                    .iter()
                    .find(|u| u.id == other_id)
                    .cloned()
                    .map(|friend| FriendshipView {
                        friendship: f,
                        friend,
                    })
            })
            .collect())
    }

    /// Pending requests addressed to a user.
    pub async fn incoming(&self, user_id: &str) -> AppResult<Vec<friend_request::Model>> {
        self.friendship_repo.find_incoming_requests(user_id).await
    }

    /// Pending requests sent by a user.
    pub async fn outgoing(&self, user_id: &str) -> AppResult<Vec<friend_request::Model>> {
        self.friendship_repo.find_outgoing_requests(user_id).await
    }

    async fn pending_request(&self, request_id: &str) -> AppResult<friend_request::Model> {
        let Some(request) = self.friendship_repo.find_request_by_id(request_id).await? else {
            return Err(AppError::NotFound("Friend request not found".to_string()));
        };
        if request.status != RequestStatus::Pending {
            return Err(AppError::Conflict(
                "Friend request was already answered".to_string(),
            ));
        }
        Ok(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use minsu_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn self_requests_are_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = FriendshipService::new(
            FriendshipRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            NotificationService::new(NotificationRepository::new(db)),
        );

        let err = service.send_request("user1", "user1").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn ordered_pair_is_direction_independent() {
        use minsu_db::entities::friendship::ordered_pair;

        assert_eq!(ordered_pair("a", "b"), ordered_pair("b", "a"));
        assert_eq!(ordered_pair("a", "b"), ("a".to_string(), "b".to_string()));
    }
}
