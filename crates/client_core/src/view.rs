//! What a consumer renders: the displayed thread plus loading affordances.

use std::collections::HashMap;

use shared::domain::{Comment, CommentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOperation {
    Edit,
    Delete,
}

/// Point-in-time copy of the controller's view.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub status: ViewStatus,
    pub comments: Vec<Comment>,
    pub load_error: Option<String>,
    pub adding: bool,
    pub pending: HashMap<CommentId, PendingOperation>,
}

#[derive(Debug, Clone, Copy)]
struct PendingMarker {
    operation: PendingOperation,
    in_flight: usize,
}

/// A store-confirmed mutation, kept while a fetch is outstanding so it can be
/// replayed over a listing that may predate it.
#[derive(Debug, Clone)]
enum ConfirmedChange {
    Created(Comment),
    Updated(Comment),
    Removed(CommentId),
}

#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub(crate) status: ViewStatus,
    pub(crate) comments: Vec<Comment>,
    pub(crate) load_error: Option<String>,
    adds_in_flight: usize,
    pending: HashMap<CommentId, PendingMarker>,
    loads_in_flight: usize,
    confirmed_during_load: Vec<ConfirmedChange>,
}

impl ViewState {
    pub(crate) fn begin_load(&mut self) {
        self.loads_in_flight += 1;
        self.status = ViewStatus::Loading;
        self.load_error = None;
    }

    /// Installs a fetched thread, then replays every change confirmed since
    /// the fetch started so the listing cannot roll them back.
    pub(crate) fn finish_load(&mut self, fetched: Vec<Comment>) {
        self.comments = fetched;
        for change in self.confirmed_during_load.clone() {
            match change {
                ConfirmedChange::Created(comment) => self.insert_created(comment),
                ConfirmedChange::Updated(comment) => {
                    self.replace(comment);
                }
                ConfirmedChange::Removed(id) => {
                    self.remove(id);
                }
            }
        }
        self.status = ViewStatus::Loaded;
        self.end_load();
    }

    /// Leaves the displayed comments as they are.
    pub(crate) fn fail_load(&mut self, message: String) {
        self.status = ViewStatus::LoadFailed;
        self.load_error = Some(message);
        self.end_load();
    }

    fn end_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        if self.loads_in_flight == 0 {
            self.confirmed_during_load.clear();
        }
    }

    fn record(&mut self, change: ConfirmedChange) {
        if self.loads_in_flight > 0 {
            self.confirmed_during_load.push(change);
        }
    }

    /// A comment the store just created. It is shown only once the thread has
    /// been (or is being) fetched; otherwise the next load picks it up.
    pub(crate) fn apply_created(&mut self, comment: Comment) {
        self.record(ConfirmedChange::Created(comment.clone()));
        if matches!(self.status, ViewStatus::Loaded | ViewStatus::Loading) {
            self.insert_created(comment);
        }
    }

    pub(crate) fn apply_updated(&mut self, comment: Comment) {
        self.record(ConfirmedChange::Updated(comment.clone()));
        self.replace(comment);
    }

    pub(crate) fn apply_removed(&mut self, id: CommentId) {
        self.record(ConfirmedChange::Removed(id));
        self.remove(id);
    }

    pub(crate) fn begin_add(&mut self) {
        self.adds_in_flight += 1;
    }

    pub(crate) fn finish_add(&mut self) {
        self.adds_in_flight = self.adds_in_flight.saturating_sub(1);
    }

    pub(crate) fn is_adding(&self) -> bool {
        self.adds_in_flight > 0
    }

    pub(crate) fn begin_pending(&mut self, id: CommentId, operation: PendingOperation) {
        let marker = self.pending.entry(id).or_insert(PendingMarker {
            operation,
            in_flight: 0,
        });
        marker.operation = operation;
        marker.in_flight += 1;
    }

    /// Clears the marker once the last operation on `id` has finished.
    pub(crate) fn finish_pending(&mut self, id: CommentId) {
        if let Some(marker) = self.pending.get_mut(&id) {
            marker.in_flight = marker.in_flight.saturating_sub(1);
            if marker.in_flight == 0 {
                self.pending.remove(&id);
            }
        }
    }

    pub(crate) fn pending(&self, id: CommentId) -> Option<PendingOperation> {
        self.pending.get(&id).map(|m| m.operation)
    }

    /// Places a confirmed comment in chronological position. For a fresh
    /// create this is the tail of the list.
    fn insert_created(&mut self, comment: Comment) {
        if self.comments.iter().any(|c| c.id == comment.id) {
            self.replace(comment);
            return;
        }
        let key = (comment.created_at, comment.id);
        let pos = self
            .comments
            .partition_point(|c| (c.created_at, c.id) <= key);
        self.comments.insert(pos, comment);
    }

    /// Swaps in `comment` unless the displayed copy is already newer.
    fn replace(&mut self, comment: Comment) -> bool {
        match self.comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) if existing.updated_at <= comment.updated_at => {
                *existing = comment;
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, id: CommentId) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        self.comments.len() != before
    }

    pub(crate) fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            status: self.status,
            comments: self.comments.clone(),
            load_error: self.load_error.clone(),
            adding: self.is_adding(),
            pending: self
                .pending
                .iter()
                .map(|(id, m)| (*id, m.operation))
                .collect(),
        }
    }
}
