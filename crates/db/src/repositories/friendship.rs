//! Friendship repository (friend requests and established friendships).

use std::sync::Arc;

use crate::entities::{
    FriendRequest, Friendship, friend_request, friend_request::RequestStatus, friendship,
    friendship::ordered_pair,
};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// Friendship repository for database operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a friend request by ID.
    pub async fn find_request_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pending request between two users, in either direction.
    pub async fn find_pending_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(friend_request::Column::SenderId.eq(a))
                            .add(friend_request::Column::ReceiverId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(friend_request::Column::SenderId.eq(b))
                            .add(friend_request::Column::ReceiverId.eq(a)),
                    ),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new friend request.
    pub async fn create_request(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a friend request (decline or cancel).
    pub async fn delete_request(&self, request: friend_request::Model) -> AppResult<()> {
        request
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Accept a friend request.
    ///
    /// The status flip and the friendship insert happen in one transaction,
    /// so an accepted request always has a matching friendship row.
    pub async fn accept_request(
        &self,
        request: friend_request::Model,
        friendship_id: String,
    ) -> AppResult<friendship::Model> {
        let (user_a_id, user_b_id) = ordered_pair(&request.sender_id, &request.receiver_id);
        let now = chrono::Utc::now();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: friend_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Accepted);
        active.responded_at = Set(Some(now.into()));
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = friendship::ActiveModel {
            id: Set(friendship_id),
            user_a_id: Set(user_a_id),
            user_b_id: Set(user_b_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Incoming pending requests for a user, newest first.
    pub async fn find_incoming_requests(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::ReceiverId.eq(user_id))
            .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(friend_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Outgoing pending requests from a user, newest first.
    pub async fn find_outgoing_requests(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::SenderId.eq(user_id))
            .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(friend_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the friendship between two users, if any.
    pub async fn find_friendship(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<friendship::Model>> {
        let (user_a_id, user_b_id) = ordered_pair(a, b);
        Friendship::find()
            .filter(friendship::Column::UserAId.eq(user_a_id))
            .filter(friendship::Column::UserBId.eq(user_b_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether two users are friends.
    pub async fn are_friends(&self, a: &str, b: &str) -> AppResult<bool> {
        Ok(self.find_friendship(a, b).await?.is_some())
    }

    /// Friendships involving a user, newest first.
    pub async fn find_friendships(&self, user_id: &str) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(
                Condition::any()
                    .add(friendship::Column::UserAId.eq(user_id))
                    .add(friendship::Column::UserBId.eq(user_id)),
            )
            .order_by_desc(friendship::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a friendship (unfriend).
    pub async fn delete_friendship(&self, model: friendship::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count friends of a user.
    pub async fn count_friends(&self, user_id: &str) -> AppResult<u64> {
        Friendship::find()
            .filter(
                Condition::any()
                    .add(friendship::Column::UserAId.eq(user_id))
                    .add(friendship::Column::UserBId.eq(user_id)),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn pending_request(id: &str, sender_id: &str, receiver_id: &str) -> friend_request::Model {
        friend_request::Model {
            id: id.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now().into(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn accept_flips_the_request_and_inserts_one_friendship() {
        let request = pending_request("r1", "user2", "user1");

        let mut accepted = request.clone();
        accepted.status = RequestStatus::Accepted;
        accepted.responded_at = Some(Utc::now().into());

        let created = friendship::Model {
            id: "fs1".to_string(),
            user_a_id: "user1".to_string(),
            user_b_id: "user2".to_string(),
            created_at: Utc::now().into(),
        };

        // One UPDATE on the request, one INSERT for the friendship, both
        // inside the same transaction; any further statement would fail on
        // the exhausted mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[accepted]])
                .append_query_results([[created]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(Arc::clone(&db));
        let result = repo
            .accept_request(request, "fs1".to_string())
            .await
            .unwrap();

        assert_eq!(result.user_a_id, "user1");
        assert_eq!(result.user_b_id, "user2");

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        assert_eq!(statements.matches("INSERT").count(), 1);
        // Both user ids are bound by the friendship insert alone; the
        // request update only touches status and responded_at.
        assert!(statements.contains("user1"));
        assert!(statements.contains("user2"));
    }
}
