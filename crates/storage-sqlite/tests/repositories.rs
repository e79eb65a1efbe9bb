use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use taxdesk_core::household::{
    HouseholdMemberUpdate, HouseholdRepositoryTrait, NewHouseholdMember, Relationship,
};
use taxdesk_core::profiles::{
    BatchClaim, ProfileContactUpdate, ProfileRepositoryTrait, ProfileSection,
};
use taxdesk_core::users::{NewUser, UserRepositoryTrait};
use taxdesk_core::Error;
use taxdesk_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, HouseholdRepository, ProfileRepository,
    UserRepository,
};
use tempfile::TempDir;

struct Repos {
    users: UserRepository,
    profiles: ProfileRepository,
    households: HouseholdRepository,
    _dir: TempDir,
}

async fn repos() -> Repos {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("db").join("test.db");
    let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer(Arc::clone(&pool)).expect("Failed to spawn writer");

    Repos {
        users: UserRepository::new(pool.clone(), writer.clone()),
        profiles: ProfileRepository::new(pool.clone(), writer.clone()),
        households: HouseholdRepository::new(pool, writer),
        _dir: dir,
    }
}

async fn register(repos: &Repos, email: &str) -> String {
    repos
        .users
        .create_with_profile(NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
        })
        .await
        .unwrap()
        .id
}

fn member(first_name: &str) -> NewHouseholdMember {
    NewHouseholdMember {
        first_name: first_name.to_string(),
        last_name: "Lovelace".to_string(),
        relationship: Relationship::Child,
        date_of_birth: NaiveDate::from_ymd_opt(2016, 12, 10),
        is_dependent: true,
        notes: None,
    }
}

#[tokio::test]
async fn test_registration_creates_profile_and_household() {
    let repos = repos().await;
    let user_id = register(&repos, "ada@example.com").await;

    let user = repos.users.find_by_email("ada@example.com").unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(repos.users.get_by_id(&user_id).unwrap().email, "ada@example.com");

    let profile = repos.profiles.get_profile(&user_id).unwrap();
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.tax_data, json!({}));
    assert_eq!(profile.last_notified_batch_id, None);

    let household = repos.households.get_or_create(&user_id).await.unwrap();
    assert_eq!(household.household.primary_user_id, user_id);
    assert!(household.members.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_is_a_constraint_violation() {
    let repos = repos().await;
    register(&repos, "ada@example.com").await;

    let err = repos
        .users
        .create_with_profile(NewUser {
            email: "ada@example.com".to_string(),
            password_hash: "x".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert!(repos.users.find_by_email("nobody@example.com").unwrap().is_none());
}

#[tokio::test]
async fn test_sections_are_merged_into_tax_data() {
    let repos = repos().await;
    let user_id = register(&repos, "ada@example.com").await;

    repos
        .profiles
        .save_section(&user_id, ProfileSection::Personal, json!({ "firstName": "Ada" }))
        .await
        .unwrap();
    repos
        .profiles
        .save_section(&user_id, ProfileSection::Income, json!({ "wages": 1000 }))
        .await
        .unwrap();
    let profile = repos
        .profiles
        .save_section(&user_id, ProfileSection::Personal, json!({ "firstName": "Augusta" }))
        .await
        .unwrap();

    assert_eq!(
        profile.tax_data,
        json!({ "personal": { "firstName": "Augusta" }, "income": { "wages": 1000 } })
    );
    assert!(profile.updated_at >= profile.created_at);
}

#[tokio::test]
async fn test_contact_update_and_missing_profile() {
    let repos = repos().await;
    let user_id = register(&repos, "ada@example.com").await;

    let profile = repos
        .profiles
        .update_contact(
            &user_id,
            ProfileContactUpdate {
                full_name: Some("Ada Lovelace".to_string()),
                phone: Some("+44 20 7946 0000".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));

    let err = repos
        .profiles
        .update_contact("missing", ProfileContactUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(repos.profiles.get_profile("missing").unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_claim_is_idempotent_and_release_is_compare_and_set() {
    let repos = repos().await;
    let user_id = register(&repos, "ada@example.com").await;

    let first = repos
        .profiles
        .claim_notification_batch(&user_id, "batch-a")
        .await
        .unwrap();
    assert_eq!(first, BatchClaim::Claimed { previous: None });

    let again = repos
        .profiles
        .claim_notification_batch(&user_id, "batch-a")
        .await
        .unwrap();
    assert_eq!(again, BatchClaim::AlreadyProcessed);

    let second = repos
        .profiles
        .claim_notification_batch(&user_id, "batch-b")
        .await
        .unwrap();
    assert_eq!(
        second,
        BatchClaim::Claimed {
            previous: Some("batch-a".to_string())
        }
    );

    // Releasing a batch that no longer holds the marker changes nothing.
    let stale = repos
        .profiles
        .release_notification_batch(&user_id, "batch-a", None)
        .await
        .unwrap();
    assert!(!stale);
    assert_eq!(
        repos.profiles.get_profile(&user_id).unwrap().last_notified_batch_id,
        Some("batch-b".to_string())
    );

    let restored = repos
        .profiles
        .release_notification_batch(&user_id, "batch-b", Some("batch-a".to_string()))
        .await
        .unwrap();
    assert!(restored);
    assert_eq!(
        repos.profiles.get_profile(&user_id).unwrap().last_notified_batch_id,
        Some("batch-a".to_string())
    );
}

#[tokio::test]
async fn test_household_members_crud() {
    let repos = repos().await;
    let user_id = register(&repos, "ada@example.com").await;

    let byron = repos
        .households
        .insert_member(&user_id, member("Byron"))
        .await
        .unwrap();
    repos
        .households
        .insert_member(&user_id, member("Annabella"))
        .await
        .unwrap();

    let updated = repos
        .households
        .update_member(
            &user_id,
            &byron.id,
            HouseholdMemberUpdate {
                first_name: "Byron".to_string(),
                last_name: "King".to_string(),
                relationship: Relationship::Dependent,
                date_of_birth: None,
                is_dependent: false,
                notes: Some("Moved out".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.last_name, "King");
    assert_eq!(updated.relationship, Relationship::Dependent);
    assert_eq!(updated.notes.as_deref(), Some("Moved out"));

    let household = repos.households.get_or_create(&user_id).await.unwrap();
    assert_eq!(household.members.len(), 2);

    assert_eq!(
        repos
            .households
            .delete_member(&user_id, &byron.id)
            .await
            .unwrap(),
        1
    );
    let household = repos.households.get_or_create(&user_id).await.unwrap();
    assert_eq!(household.members.len(), 1);
    assert_eq!(household.members[0].first_name, "Annabella");
}

#[tokio::test]
async fn test_members_of_other_households_are_invisible() {
    let repos = repos().await;
    let ada = register(&repos, "ada@example.com").await;
    let mallory = register(&repos, "mallory@example.com").await;

    let byron = repos
        .households
        .insert_member(&ada, member("Byron"))
        .await
        .unwrap();

    let err = repos
        .households
        .update_member(
            &mallory,
            &byron.id,
            HouseholdMemberUpdate {
                first_name: "Evil".to_string(),
                last_name: "Twin".to_string(),
                relationship: Relationship::Other,
                date_of_birth: None,
                is_dependent: false,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(
        repos
            .households
            .delete_member(&mallory, &byron.id)
            .await
            .unwrap(),
        0
    );
    assert!(repos
        .households
        .get_or_create(&mallory)
        .await
        .unwrap()
        .members
        .is_empty());
    assert_eq!(
        repos.households.get_or_create(&ada).await.unwrap().members[0].first_name,
        "Byron"
    );
}
