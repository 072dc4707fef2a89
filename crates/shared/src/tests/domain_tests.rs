use super::*;

use chrono::TimeZone;

fn sample() -> Comment {
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
    Comment {
        id: CommentId(4),
        parent_id: ParentId(12),
        parent_type: ParentType::Answer,
        author_id: UserId(3),
        author_name: "Ada".into(),
        author_reputation: 250,
        body: "Could you share the stack trace?".into(),
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn serializes_with_camel_case_fields_and_capital_id() {
    let value = serde_json::to_value(sample()).expect("serialize");
    assert_eq!(value["Id"], 4);
    assert_eq!(value["parentId"], 12);
    assert_eq!(value["parentType"], "answer");
    assert_eq!(value["authorReputation"], 250);
    assert_eq!(value["createdAt"], "2024-01-15T10:30:00Z");
    assert!(value.get("id").is_none());
}

#[test]
fn accepts_lowercase_id_on_input() {
    let raw = r#"{
        "id": 9,
        "parentId": 1,
        "parentType": "question",
        "authorId": 2,
        "authorName": "Grace",
        "authorReputation": 0,
        "body": "Have you tried a clean build?",
        "createdAt": "2024-01-15T10:30:00Z",
        "updatedAt": "2024-01-15T10:30:00Z"
    }"#;
    let comment: Comment = serde_json::from_str(raw).expect("deserialize");
    assert_eq!(comment.id, CommentId(9));
    assert_eq!(comment.parent_type, ParentType::Question);
    assert!(!comment.is_edited());
}

#[test]
fn thread_membership_requires_both_fields() {
    let comment = sample();
    assert!(comment.belongs_to(ThreadKey::new(ParentId(12), ParentType::Answer)));
    assert!(!comment.belongs_to(ThreadKey::new(ParentId(12), ParentType::Question)));
    assert!(!comment.belongs_to(ThreadKey::new(ParentId(13), ParentType::Answer)));
}

#[test]
fn parses_parent_type_case_insensitively() {
    assert_eq!(ParentType::parse("Question"), Some(ParentType::Question));
    assert_eq!(ParentType::parse("answer"), Some(ParentType::Answer));
    assert_eq!(ParentType::parse("post"), None);
}

#[test]
fn only_positive_comment_ids_are_valid() {
    assert!(CommentId(1).is_valid());
    assert!(!CommentId(0).is_valid());
    assert!(!CommentId(-3).is_valid());
}
