use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::errors::{Error, ValidationError};
use crate::test_support::InMemoryProfileRepository;

fn service_with_user(user_id: &str) -> (ProfileService, Arc<InMemoryProfileRepository>) {
    let repo = Arc::new(InMemoryProfileRepository::new());
    repo.insert_profile(user_id, "client@example.com");
    (ProfileService::new(repo.clone()), repo)
}

#[tokio::test]
async fn test_save_section_merges_into_tax_data() {
    let (service, _repo) = service_with_user("u-1");

    service
        .save_section("u-1", "personal", json!({ "firstName": "Ada" }))
        .await
        .unwrap();
    let profile = service
        .save_section("u-1", "selfEmployed", json!({ "businessName": "Ada Consulting" }))
        .await
        .unwrap();

    assert_eq!(profile.tax_data["personal"]["firstName"], "Ada");
    assert_eq!(
        profile.section(ProfileSection::SelfEmployed).unwrap()["businessName"],
        "Ada Consulting"
    );
}

#[tokio::test]
async fn test_save_section_rejects_unknown_section() {
    let (service, _repo) = service_with_user("u-1");

    let result = service
        .save_section("u-1", "crypto", json!({ "wallets": 3 }))
        .await;

    match result {
        Err(Error::Validation(ValidationError::UnknownSection(name))) => {
            assert_eq!(name, "crypto");
        }
        other => panic!("Expected UnknownSection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_save_section_rejects_non_object_document() {
    let (service, _repo) = service_with_user("u-1");

    let result = service.save_section("u-1", "income", json!([1, 2, 3])).await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_update_contact_normalizes_blank_fields() {
    let (service, _repo) = service_with_user("u-1");

    let profile = service
        .update_contact(
            "u-1",
            ProfileContactUpdate {
                full_name: Some("  Ada Lovelace ".to_string()),
                phone: Some("   ".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
    assert!(profile.phone.is_none());
}

#[tokio::test]
async fn test_update_contact_rejects_bad_phone() {
    let (service, _repo) = service_with_user("u-1");

    let result = service
        .update_contact(
            "u-1",
            ProfileContactUpdate {
                full_name: None,
                phone: Some("call me maybe".to_string()),
            },
        )
        .await;

    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn test_section_names_round_trip_through_from_str() {
    for section in ProfileSection::ALL {
        let parsed: ProfileSection = section.as_str().parse().unwrap();
        assert_eq!(parsed, section);
    }
    assert_eq!(
        serde_json::to_string(&ProfileSection::SelfEmployed).unwrap(),
        "\"selfEmployed\""
    );
}
