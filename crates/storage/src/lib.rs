use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared::{
    domain::{Comment, CommentId, CommentPatch, NewComment, ParentId, ParentType},
    error::StoreError,
};

pub mod seed;

pub use seed::{load_seed_file, parse_seed};

/// Operations the comment controller needs from a backing store.
///
/// [`CommentStore`] is the in-memory implementation. A backend doing real I/O
/// reports its failures as [`StoreError::Transport`] and must keep the same
/// id, ordering and timestamp guarantees.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_by_parent(
        &self,
        parent_id: ParentId,
        parent_type: ParentType,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Comment>, StoreError>;
    async fn get_by_id(&self, id: CommentId) -> Result<Comment, StoreError>;
    async fn create(&self, input: NewComment) -> Result<Comment, StoreError>;
    async fn update(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, StoreError>;
    async fn delete(&self, id: CommentId) -> Result<Comment, StoreError>;
    async fn count_by_parent(
        &self,
        parent_id: ParentId,
        parent_type: ParentType,
    ) -> Result<usize, StoreError>;
}

/// Artificial delay applied before each operation, emulating a remote service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreLatency {
    pub read: Duration,
    pub write: Duration,
}

impl StoreLatency {
    pub fn from_millis(read_ms: u64, write_ms: u64) -> Self {
        Self {
            read: Duration::from_millis(read_ms),
            write: Duration::from_millis(write_ms),
        }
    }
}

#[derive(Clone)]
pub struct CommentStore {
    inner: Arc<RwLock<StoreState>>,
    latency: StoreLatency,
}

struct StoreState {
    // insertion order; list_by_parent sorts its own copy
    comments: Vec<Comment>,
    // None once i64::MAX has been issued
    next_id: Option<i64>,
    last_stamp: Option<DateTime<Utc>>,
}

impl StoreState {
    fn position(&self, id: CommentId) -> Option<usize> {
        self.comments.iter().position(|c| c.id == id)
    }

    /// Wall-clock time, nudged forward so stamps never repeat or go backwards.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl Default for CommentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState {
                comments: Vec::new(),
                next_id: Some(1),
                last_stamp: None,
            })),
            latency: StoreLatency::default(),
        }
    }

    /// Builds a store from existing records. The id counter starts one past
    /// the largest seeded id and never moves backwards afterwards.
    pub fn from_seed(seed: Vec<Comment>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(seed.len());
        for comment in &seed {
            if !comment.id.is_valid() {
                return Err(StoreError::invalid_id(comment.id));
            }
            if !seen.insert(comment.id) {
                return Err(StoreError::InvalidArgument(format!(
                    "duplicate comment id {} in seed data",
                    comment.id
                )));
            }
        }

        let next_id = seed.iter().map(|c| c.id.0).max().unwrap_or(0).checked_add(1);
        let last_stamp = seed
            .iter()
            .flat_map(|c| [c.created_at, c.updated_at])
            .max();
        info!(
            seeded = seed.len(),
            next_id = ?next_id,
            "comments: store initialized from seed"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(StoreState {
                comments: seed,
                next_id,
                last_stamp,
            })),
            latency: StoreLatency::default(),
        })
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_read(&self) {
        if !self.latency.read.is_zero() {
            tokio::time::sleep(self.latency.read).await;
        }
    }

    async fn simulate_write(&self) {
        if !self.latency.write.is_zero() {
            tokio::time::sleep(self.latency.write).await;
        }
    }

    /// All comments on one thread, oldest first. Ties on `created_at` keep id
    /// order.
    pub async fn list_by_parent(
        &self,
        parent_id: ParentId,
        parent_type: ParentType,
    ) -> Vec<Comment> {
        self.simulate_read().await;
        let guard = self.inner.read().await;
        let mut comments: Vec<Comment> = guard
            .comments
            .iter()
            .filter(|c| c.parent_id == parent_id && c.parent_type == parent_type)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        comments
    }

    pub async fn list_all(&self) -> Vec<Comment> {
        self.simulate_read().await;
        self.inner.read().await.comments.clone()
    }

    pub async fn get_by_id(&self, id: CommentId) -> Result<Comment, StoreError> {
        if !id.is_valid() {
            return Err(StoreError::invalid_id(id));
        }
        self.simulate_read().await;
        let guard = self.inner.read().await;
        guard
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Stores a new comment. Body length rules are the caller's job; only a
    /// missing body is refused here.
    pub async fn create(&self, input: NewComment) -> Result<Comment, StoreError> {
        if input.body.is_empty() {
            return Err(StoreError::InvalidArgument(
                "comment body is required".to_string(),
            ));
        }
        self.simulate_write().await;

        let mut guard = self.inner.write().await;
        let id = guard.next_id.map(CommentId).ok_or_else(|| {
            StoreError::InvalidArgument("comment id space exhausted".to_string())
        })?;
        guard.next_id = id.0.checked_add(1);
        let now = guard.next_stamp();
        let comment = Comment {
            id,
            parent_id: input.parent_id,
            parent_type: input.parent_type,
            author_id: input.author_id,
            author_name: input.author_name,
            author_reputation: input.author_reputation,
            body: input.body,
            created_at: now,
            updated_at: now,
        };
        guard.comments.push(comment.clone());
        info!(
            comment_id = id.0,
            parent_id = comment.parent_id.0,
            parent_type = comment.parent_type.as_str(),
            author_id = comment.author_id.0,
            "comments: created"
        );
        Ok(comment)
    }

    /// Replaces the body and bumps `updated_at`. Concurrent edits of the same
    /// comment are applied in lock order; the last one wins.
    pub async fn update(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, StoreError> {
        if !id.is_valid() {
            return Err(StoreError::invalid_id(id));
        }
        if patch.body.is_empty() {
            return Err(StoreError::InvalidArgument(
                "comment body is required".to_string(),
            ));
        }
        self.simulate_write().await;

        let mut guard = self.inner.write().await;
        let index = guard.position(id).ok_or(StoreError::NotFound(id))?;
        let now = guard.next_stamp();
        let comment = &mut guard.comments[index];
        comment.body = patch.body;
        comment.updated_at = now;
        let updated = comment.clone();
        info!(comment_id = id.0, "comments: updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: CommentId) -> Result<Comment, StoreError> {
        if !id.is_valid() {
            return Err(StoreError::invalid_id(id));
        }
        self.simulate_write().await;

        let mut guard = self.inner.write().await;
        let index = guard.position(id).ok_or(StoreError::NotFound(id))?;
        let removed = guard.comments.remove(index);
        info!(
            comment_id = id.0,
            parent_id = removed.parent_id.0,
            parent_type = removed.parent_type.as_str(),
            "comments: deleted"
        );
        Ok(removed)
    }

    pub async fn count_by_parent(&self, parent_id: ParentId, parent_type: ParentType) -> usize {
        self.simulate_read().await;
        let guard = self.inner.read().await;
        let count = guard
            .comments
            .iter()
            .filter(|c| c.parent_id == parent_id && c.parent_type == parent_type)
            .count();
        debug!(
            parent_id = parent_id.0,
            parent_type = parent_type.as_str(),
            count,
            "comments: counted thread"
        );
        count
    }

    /// Id the next successful `create` will receive, if any are left.
    pub async fn peek_next_id(&self) -> Option<CommentId> {
        self.inner.read().await.next_id.map(CommentId)
    }
}

#[async_trait]
impl CommentRepository for CommentStore {
    async fn list_by_parent(
        &self,
        parent_id: ParentId,
        parent_type: ParentType,
    ) -> Result<Vec<Comment>, StoreError> {
        Ok(CommentStore::list_by_parent(self, parent_id, parent_type).await)
    }

    async fn list_all(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(CommentStore::list_all(self).await)
    }

    async fn get_by_id(&self, id: CommentId) -> Result<Comment, StoreError> {
        CommentStore::get_by_id(self, id).await
    }

    async fn create(&self, input: NewComment) -> Result<Comment, StoreError> {
        CommentStore::create(self, input).await
    }

    async fn update(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, StoreError> {
        CommentStore::update(self, id, patch).await
    }

    async fn delete(&self, id: CommentId) -> Result<Comment, StoreError> {
        CommentStore::delete(self, id).await
    }

    async fn count_by_parent(
        &self,
        parent_id: ParentId,
        parent_type: ParentType,
    ) -> Result<usize, StoreError> {
        Ok(CommentStore::count_by_parent(self, parent_id, parent_type).await)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
