use user_registry::AppError;
use serde_json::json;
use user_registry::domain::entities::{
    NewUser, PasswordChange, ProfileChanges, Role, UserChanges, UserProfile,
};
use user_registry::domain::repositories::UserStore;
use user_registry::infrastructure::persistence::InMemoryUserStore;
use uuid::Uuid;

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        role: Role::Customer,
        password_hash: Some("$argon2id$stored".to_string()),
        verification_token: None,
        profile: UserProfile::default(),
    }
}

fn changes_from(email: &str, password: PasswordChange) -> UserChanges {
    UserChanges {
        email: Some(email.to_string()),
        password,
        ..Default::default()
    }
}

fn profile_changes(value: serde_json::Value) -> ProfileChanges {
    match value {
        serde_json::Value::Object(map) => ProfileChanges::new(map),
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test]
async fn test_insert_assigns_id_and_timestamps() {
    let store = InMemoryUserStore::new();

    let user = store.insert(new_user("a@b.com")).await.unwrap();

    assert_ne!(user.id, Uuid::nil());
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.created_at, user.updated_at);
}

#[tokio::test]
async fn test_insert_duplicate_email() {
    let store = InMemoryUserStore::new();
    store.insert(new_user("a@b.com")).await.unwrap();

    let result = store.insert(new_user("a@b.com")).await;

    assert!(matches!(result, Err(AppError::DuplicateKey { ref field }) if field == "email"));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_find_by_id_and_email() {
    let store = InMemoryUserStore::new();
    let user = store.insert(new_user("a@b.com")).await.unwrap();

    let by_id = store.find_by_id(user.id).await.unwrap();
    let by_email = store.find_by_email("a@b.com").await.unwrap();

    assert_eq!(by_id, Some(user.clone()));
    assert_eq!(by_email, Some(user));
    assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(store.find_by_email("x@y.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_keeps_insertion_order() {
    let store = InMemoryUserStore::new();

    for email in ["c@b.com", "a@b.com", "b@b.com"] {
        store.insert(new_user(email)).await.unwrap();
    }

    let emails: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();

    assert_eq!(emails, vec!["c@b.com", "a@b.com", "b@b.com"]);
}

#[tokio::test]
async fn test_update_keep_password() {
    let store = InMemoryUserStore::new();
    let user = store.insert(new_user("a@b.com")).await.unwrap();

    let updated = store
        .update(user.id, changes_from("new@b.com", PasswordChange::Keep))
        .await
        .unwrap();

    assert_eq!(updated.email, "new@b.com");
    assert_eq!(updated.password_hash, user.password_hash);
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn test_update_replace_password() {
    let store = InMemoryUserStore::new();
    let user = store.insert(new_user("a@b.com")).await.unwrap();

    let updated = store
        .update(
            user.id,
            changes_from("a@b.com", PasswordChange::Replace("$argon2id$new".to_string())),
        )
        .await
        .unwrap();

    assert_eq!(updated.password_hash.as_deref(), Some("$argon2id$new"));
}

#[tokio::test]
async fn test_update_to_taken_email() {
    let store = InMemoryUserStore::new();
    store.insert(new_user("taken@b.com")).await.unwrap();
    let user = store.insert(new_user("a@b.com")).await.unwrap();

    let result = store
        .update(user.id, changes_from("taken@b.com", PasswordChange::Keep))
        .await;

    assert!(matches!(result, Err(AppError::DuplicateKey { .. })));
}

#[tokio::test]
async fn test_update_unknown_id() {
    let store = InMemoryUserStore::new();
    let id = Uuid::new_v4();

    let result = store
        .update(id, changes_from("a@b.com", PasswordChange::Keep))
        .await;

    assert!(matches!(result, Err(AppError::NotFound { id: ref missing }) if *missing == id.to_string()));
}

#[tokio::test]
async fn test_update_merges_profile_keys() {
    let store = InMemoryUserStore::new();
    let mut user = new_user("a@b.com");
    user.profile.first_name = Some("Ram".to_string());
    let user = store.insert(user).await.unwrap();

    store
        .update(
            user.id,
            UserChanges {
                profile: profile_changes(json!({ "city": "Pokhara" })),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let updated = store
        .update(
            user.id,
            UserChanges {
                profile: profile_changes(json!({ "country": "Nepal" })),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email, "a@b.com");
    assert_eq!(updated.role, Role::Customer);
    assert_eq!(updated.profile.first_name.as_deref(), Some("Ram"));
    assert_eq!(updated.profile.city.as_deref(), Some("Pokhara"));
    assert_eq!(updated.profile.country.as_deref(), Some("Nepal"));
}

#[tokio::test]
async fn test_update_role_only() {
    let store = InMemoryUserStore::new();
    let user = store.insert(new_user("a@b.com")).await.unwrap();

    let updated = store
        .update(
            user.id,
            UserChanges {
                role: Some(Role::Partner),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Partner);
    assert_eq!(updated.email, "a@b.com");
    assert_eq!(updated.password_hash, user.password_hash);
}
