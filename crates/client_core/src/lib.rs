use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{AuthorContext, Comment, CommentId, CommentPatch, NewComment, ThreadKey},
    error::{ErrorReport, StoreError, ValidationError},
    protocol::{CommentOperation, Notification},
    validation::validate_body,
};
use storage::CommentRepository;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

mod view;

pub use view::{PendingOperation, ViewSnapshot, ViewStatus};

use view::ViewState;

const LOAD_FAILED_MESSAGE: &str = "Failed to load comments";
const ADD_OK_MESSAGE: &str = "Comment added successfully";
const ADD_FAILED_MESSAGE: &str = "Failed to add comment";
const EDIT_OK_MESSAGE: &str = "Comment updated successfully";
const EDIT_FAILED_MESSAGE: &str = "Failed to update comment";
const DELETE_OK_MESSAGE: &str = "Comment deleted successfully";
const DELETE_FAILED_MESSAGE: &str = "Failed to delete comment";

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("comment rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ControllerError {
    pub fn report(&self) -> ErrorReport {
        match self {
            ControllerError::Validation(err) => ErrorReport::from(*err),
            ControllerError::Store(err) => ErrorReport::from(err),
        }
    }
}

/// Asks the user whether a comment should really be deleted.
#[async_trait]
pub trait DeleteConfirmation: Send + Sync {
    async fn confirm_delete(&self, comment_id: CommentId) -> bool;
}

/// Accepts every delete request.
pub struct AutoConfirm;

#[async_trait]
impl DeleteConfirmation for AutoConfirm {
    async fn confirm_delete(&self, _comment_id: CommentId) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Comment),
    Declined,
    Failed(ErrorReport),
}

/// Drives one comment thread on behalf of a UI.
///
/// The view only changes after the store has confirmed an operation, so a
/// failed add, edit or delete leaves the displayed list as it was. The state
/// lock is never held across a store call or a confirmation prompt.
pub struct CommentController {
    repository: Arc<dyn CommentRepository>,
    confirmation: Arc<dyn DeleteConfirmation>,
    thread: ThreadKey,
    inner: Mutex<ViewState>,
    notifications: broadcast::Sender<Notification>,
}

impl CommentController {
    pub fn new(repository: Arc<dyn CommentRepository>, thread: ThreadKey) -> Arc<Self> {
        Self::new_with_confirmation(repository, thread, Arc::new(AutoConfirm))
    }

    pub fn new_with_confirmation(
        repository: Arc<dyn CommentRepository>,
        thread: ThreadKey,
        confirmation: Arc<dyn DeleteConfirmation>,
    ) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(256);
        Arc::new(Self {
            repository,
            confirmation,
            thread,
            inner: Mutex::new(ViewState::default()),
            notifications,
        })
    }

    pub fn thread(&self) -> ThreadKey {
        self.thread
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    fn notify(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }

    /// Edits and deletes only reach comments on this controller's thread.
    async fn ensure_in_thread(&self, comment_id: CommentId) -> Result<(), StoreError> {
        let comment = self.repository.get_by_id(comment_id).await?;
        if comment.belongs_to(self.thread) {
            return Ok(());
        }
        Err(StoreError::InvalidArgument(format!(
            "comment {comment_id} belongs to thread {}, not {}",
            comment.thread(),
            self.thread
        )))
    }

    /// Fetches the thread from the store. On failure the previously displayed
    /// comments are kept and the view moves to `LoadFailed`. Adds, edits and
    /// deletes confirmed while the fetch is outstanding are replayed over the
    /// result.
    pub async fn load(&self) -> Result<usize, ControllerError> {
        self.inner.lock().await.begin_load();

        let result = self
            .repository
            .list_by_parent(self.thread.parent_id, self.thread.parent_type)
            .await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(comments) => {
                guard.finish_load(comments);
                let count = guard.comments.len();
                info!(thread = %self.thread, count, "comments: thread loaded");
                Ok(count)
            }
            Err(err) => {
                guard.fail_load(LOAD_FAILED_MESSAGE.to_string());
                drop(guard);
                warn!(thread = %self.thread, error = %err, "comments: thread load failed");
                self.notify(Notification::failure(
                    CommentOperation::Load,
                    LOAD_FAILED_MESSAGE,
                    err.code(),
                ));
                Err(err.into())
            }
        }
    }

    /// Reloads only when the last load failed. Returns whether a reload ran.
    pub async fn retry(&self) -> Result<bool, ControllerError> {
        if self.inner.lock().await.status != ViewStatus::LoadFailed {
            return Ok(false);
        }
        self.load().await?;
        Ok(true)
    }

    pub async fn add_comment(
        &self,
        author: &AuthorContext,
        body: &str,
    ) -> Result<Comment, ControllerError> {
        let body = match validate_body(body) {
            Ok(body) => body,
            Err(err) => {
                self.notify(Notification::from_report(
                    CommentOperation::Add,
                    err.into(),
                ));
                return Err(err.into());
            }
        };

        self.inner.lock().await.begin_add();
        let result = self
            .repository
            .create(NewComment::new(self.thread, author, body))
            .await;

        let mut guard = self.inner.lock().await;
        guard.finish_add();
        match result {
            Ok(comment) => {
                guard.apply_created(comment.clone());
                drop(guard);
                self.notify(
                    Notification::success(CommentOperation::Add, ADD_OK_MESSAGE)
                        .with_comment(comment.id),
                );
                Ok(comment)
            }
            Err(err) => {
                drop(guard);
                warn!(thread = %self.thread, error = %err, "comments: add failed");
                self.notify(Notification::failure(
                    CommentOperation::Add,
                    ADD_FAILED_MESSAGE,
                    err.code(),
                ));
                Err(err.into())
            }
        }
    }

    pub async fn edit_comment(
        &self,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment, ControllerError> {
        let body = match validate_body(body) {
            Ok(body) => body,
            Err(err) => {
                self.notify(
                    Notification::from_report(CommentOperation::Edit, err.into())
                        .with_comment(comment_id),
                );
                return Err(err.into());
            }
        };
        if !comment_id.is_valid() {
            let err = StoreError::invalid_id(comment_id);
            self.notify(
                Notification::failure(CommentOperation::Edit, EDIT_FAILED_MESSAGE, err.code())
                    .with_comment(comment_id),
            );
            return Err(err.into());
        }

        self.inner
            .lock()
            .await
            .begin_pending(comment_id, PendingOperation::Edit);
        let result = match self.ensure_in_thread(comment_id).await {
            Ok(()) => {
                self.repository
                    .update(comment_id, CommentPatch::body(body))
                    .await
            }
            Err(err) => Err(err),
        };

        let mut guard = self.inner.lock().await;
        guard.finish_pending(comment_id);
        match result {
            Ok(comment) => {
                guard.apply_updated(comment.clone());
                drop(guard);
                self.notify(
                    Notification::success(CommentOperation::Edit, EDIT_OK_MESSAGE)
                        .with_comment(comment_id),
                );
                Ok(comment)
            }
            Err(err) => {
                drop(guard);
                warn!(comment_id = comment_id.0, error = %err, "comments: edit failed");
                self.notify(
                    Notification::failure(CommentOperation::Edit, EDIT_FAILED_MESSAGE, err.code())
                        .with_comment(comment_id),
                );
                Err(err.into())
            }
        }
    }

    /// Asks for confirmation, then deletes. Failures are reported through the
    /// notification channel and the returned outcome; they are not errors for
    /// the caller.
    pub async fn delete_comment(&self, comment_id: CommentId) -> DeleteOutcome {
        if !self.confirmation.confirm_delete(comment_id).await {
            info!(comment_id = comment_id.0, "comments: delete declined");
            return DeleteOutcome::Declined;
        }
        if !comment_id.is_valid() {
            let err = StoreError::invalid_id(comment_id);
            self.notify(
                Notification::failure(CommentOperation::Delete, DELETE_FAILED_MESSAGE, err.code())
                    .with_comment(comment_id),
            );
            return DeleteOutcome::Failed(ErrorReport::from(&err));
        }

        self.inner
            .lock()
            .await
            .begin_pending(comment_id, PendingOperation::Delete);
        let result = match self.ensure_in_thread(comment_id).await {
            Ok(()) => self.repository.delete(comment_id).await,
            Err(err) => Err(err),
        };

        let mut guard = self.inner.lock().await;
        guard.finish_pending(comment_id);
        match result {
            Ok(removed) => {
                guard.apply_removed(comment_id);
                drop(guard);
                self.notify(
                    Notification::success(CommentOperation::Delete, DELETE_OK_MESSAGE)
                        .with_comment(comment_id),
                );
                DeleteOutcome::Deleted(removed)
            }
            Err(err) => {
                drop(guard);
                warn!(comment_id = comment_id.0, error = %err, "comments: delete failed");
                self.notify(
                    Notification::failure(
                        CommentOperation::Delete,
                        DELETE_FAILED_MESSAGE,
                        err.code(),
                    )
                    .with_comment(comment_id),
                );
                DeleteOutcome::Failed(ErrorReport::from(&err))
            }
        }
    }

    pub async fn status(&self) -> ViewStatus {
        self.inner.lock().await.status
    }

    pub async fn is_loading(&self) -> bool {
        self.status().await == ViewStatus::Loading
    }

    pub async fn is_adding(&self) -> bool {
        self.inner.lock().await.is_adding()
    }

    pub async fn pending(&self, comment_id: CommentId) -> Option<PendingOperation> {
        self.inner.lock().await.pending(comment_id)
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.inner.lock().await.comments.clone()
    }

    pub async fn comment_count(&self) -> usize {
        self.inner.lock().await.comments.len()
    }

    pub async fn load_error(&self) -> Option<String> {
        self.inner.lock().await.load_error.clone()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.inner.lock().await.snapshot()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
