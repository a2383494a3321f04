mod common;

use sqlx::PgPool;
use std::sync::Arc;
use carvo::domain::entities::NewUser;
use carvo::domain::repositories::UserRepository;
use carvo::error::AppError;
use carvo::infrastructure::persistence::PgUserRepository;

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$2b$04$notarealhash".to_string(),
        is_staff: false,
    }
}

#[sqlx::test]
async fn test_create_and_find(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let user = repo.create(new_user("frank")).await.unwrap();
    assert!(user.is_active);
    assert!(!user.is_staff);

    let by_name = repo.find_by_username("frank").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(by_name.email, "frank@example.com");

    assert!(repo.find_by_id(user.id).await.unwrap().is_some());
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_duplicate_username_conflicts(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("frank")).await.unwrap();

    let err = repo.create(new_user("frank")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
async fn test_flags(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("grace")).await.unwrap();

    assert!(repo.set_staff(user.id, true).await.unwrap());
    assert!(repo.set_active(user.id, false).await.unwrap());

    let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(reloaded.is_staff);
    assert!(!reloaded.is_active);

    assert!(!repo.set_staff(999_999, true).await.unwrap());
}

#[sqlx::test]
async fn test_list_oldest_first(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("first")).await.unwrap();
    repo.create(new_user("second")).await.unwrap();

    let users = repo.list().await.unwrap();

    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
}
