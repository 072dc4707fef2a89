use std::sync::Arc;

use client_core::{CommentController, DeleteOutcome, ViewStatus};
use shared::{
    domain::{AuthorContext, CommentId, ParentId, ParentType, ThreadKey, UserId},
    protocol::{CommentOperation, Outcome},
};
use storage::{parse_seed, CommentStore};

const SEED: &str = r#"[
  {"Id": 3, "parentId": 5, "parentType": "question", "authorId": 2, "authorName": "Sarah Chen",
   "authorReputation": 1250, "body": "Which version of the toolchain?",
   "createdAt": "2024-01-15T10:30:00Z", "updatedAt": "2024-01-15T10:30:00Z"},
  {"Id": 7, "parentId": 5, "parentType": "answer", "authorId": 3, "authorName": "Marcus Johnson",
   "authorReputation": 890, "body": "This answer saved my afternoon.",
   "createdAt": "2024-01-15T11:00:00Z", "updatedAt": "2024-01-15T11:00:00Z"},
  {"Id": 2, "parentId": 5, "parentType": "question", "authorId": 4, "authorName": "Emily Rodriguez",
   "authorReputation": 40, "body": "Same problem here on stable.",
   "createdAt": "2024-01-15T09:00:00Z", "updatedAt": "2024-01-15T09:00:00Z"}
]"#;

fn author() -> AuthorContext {
    AuthorContext {
        author_id: UserId(1),
        author_name: "Current User".into(),
        author_reputation: 100,
    }
}

#[tokio::test]
async fn question_thread_lifecycle_through_controller() {
    let store = CommentStore::from_seed(parse_seed(SEED).expect("seed json")).expect("seed");
    let thread = ThreadKey::new(ParentId(5), ParentType::Question);
    let controller = CommentController::new(Arc::new(store.clone()), thread);
    let mut notes = controller.subscribe_notifications();

    assert_eq!(controller.load().await.expect("load"), 2);
    let ids: Vec<i64> = controller.comments().await.iter().map(|c| c.id.0).collect();
    assert_eq!(ids, vec![2, 3]);

    let added = controller
        .add_comment(&author(), "1.79 on Linux, nightly is the same")
        .await
        .expect("add");
    assert_eq!(added.id, CommentId(8));

    let edited = controller
        .edit_comment(added.id, "new body text")
        .await
        .expect("edit");
    assert!(edited.updated_at > added.created_at);
    assert_eq!(edited.parent_id, ParentId(5));

    assert!(matches!(
        controller.delete_comment(added.id).await,
        DeleteOutcome::Deleted(_)
    ));
    assert!(store.get_by_id(added.id).await.unwrap_err().is_not_found());

    let next = controller
        .add_comment(&author(), "one more comment after the delete")
        .await
        .expect("add again");
    assert_eq!(next.id, CommentId(9));

    assert_eq!(controller.status().await, ViewStatus::Loaded);
    assert_eq!(
        controller.comments().await,
        store.list_by_parent(ParentId(5), ParentType::Question).await
    );
    assert_eq!(store.count_by_parent(ParentId(5), ParentType::Answer).await, 1);

    let mut seen = Vec::new();
    while let Ok(note) = notes.try_recv() {
        assert_eq!(note.outcome, Outcome::Success);
        seen.push(note.operation);
    }
    assert_eq!(
        seen,
        vec![
            CommentOperation::Add,
            CommentOperation::Edit,
            CommentOperation::Delete,
            CommentOperation::Add,
        ]
    );
}
