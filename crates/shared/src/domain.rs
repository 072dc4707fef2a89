use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CommentId);
id_newtype!(ParentId);
id_newtype!(UserId);

impl CommentId {
    /// Store-issued ids start at 1; zero and negatives never name a comment.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    Question,
    Answer,
}

impl ParentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParentType::Question => "question",
            ParentType::Answer => "answer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("question") {
            Some(ParentType::Question)
        } else if raw.eq_ignore_ascii_case("answer") {
            Some(ParentType::Answer)
        } else {
            None
        }
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity a comment thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadKey {
    pub parent_id: ParentId,
    pub parent_type: ParentType,
}

impl ThreadKey {
    pub fn new(parent_id: ParentId, parent_type: ParentType) -> Self {
        Self {
            parent_id,
            parent_type,
        }
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.parent_type, self.parent_id)
    }
}

/// Resolved identity of the user acting on a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorContext {
    pub author_id: UserId,
    pub author_name: String,
    pub author_reputation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "Id", alias = "id")]
    pub id: CommentId,
    pub parent_id: ParentId,
    pub parent_type: ParentType,
    pub author_id: UserId,
    pub author_name: String,
    pub author_reputation: u32,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn thread(&self) -> ThreadKey {
        ThreadKey::new(self.parent_id, self.parent_type)
    }

    pub fn belongs_to(&self, thread: ThreadKey) -> bool {
        self.thread() == thread
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Input to `create`; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub parent_id: ParentId,
    pub parent_type: ParentType,
    pub author_id: UserId,
    pub author_name: String,
    pub author_reputation: u32,
    pub body: String,
}

impl NewComment {
    pub fn new(thread: ThreadKey, author: &AuthorContext, body: impl Into<String>) -> Self {
        Self {
            parent_id: thread.parent_id,
            parent_type: thread.parent_type,
            author_id: author.author_id,
            author_name: author.author_name.clone(),
            author_reputation: author.author_reputation,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPatch {
    pub body: String,
}

impl CommentPatch {
    pub fn body(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
