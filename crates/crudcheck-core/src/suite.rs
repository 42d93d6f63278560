//! Built-in petstore contract suite
//!
//! Literal payloads and expectations as observed against the public
//! petstore `/v2/pet` resource, including its known validation gaps.

use crate::case::{ExpectedOutcome, Operation, TestCase};
use crate::mock::MockPriorSpec;
use crate::registry::TestRegistry;

pub const PET_JSON: &str = r#"{ "id": 1, "name": "Doggie", "status": "available" }"#;
pub const UPDATED_PET_JSON: &str =
    r#"{ "id": 1, "name": "UpdatedDoggie", "status": "available" }"#;
pub const INVALID_JSON_PAYLOAD: &str = "invalid_json_payload";
pub const INVALID_TYPES_JSON: &str = r#"{"id": "invalid-id", "name": 123, "status": "available"}"#;
pub const PET_WITHOUT_NAME_JSON: &str = r#"{ "id": 1, "status": "available" }"#;
pub const PET_INVALID_STATUS_JSON: &str =
    r#"{ "id": 2, "name": "Catty", "status": "invalid_status" }"#;

/// All petstore cases in declaration order.
#[must_use]
pub fn petstore_cases() -> Vec<TestCase> {
    vec![
        // create -> read -> update -> delete
        TestCase::new(
            "create_pet",
            Operation::Create,
            ExpectedOutcome::status(200).containing("Doggie"),
        )
        .with_body(PET_JSON),
        TestCase::new(
            "read_pet",
            Operation::Read,
            ExpectedOutcome::status(200).containing("Doggie"),
        )
        .with_path_param("petId", "1")
        .depends_on("create_pet"),
        TestCase::new(
            "update_pet",
            Operation::Update,
            ExpectedOutcome::status(200).containing("UpdatedDoggie"),
        )
        .with_body(UPDATED_PET_JSON)
        .depends_on("read_pet"),
        TestCase::new(
            "delete_pet",
            Operation::Delete,
            ExpectedOutcome::status(200),
        )
        .with_path_param("petId", "1")
        .depends_on("update_pet"),
        // negative paths
        TestCase::new(
            "create_pet_with_invalid_json",
            Operation::Create,
            ExpectedOutcome::status(400),
        )
        .with_body(INVALID_JSON_PAYLOAD),
        // server does not handle bad field types gracefully
        TestCase::new(
            "create_pet_with_invalid_id_and_name",
            Operation::Create,
            ExpectedOutcome::status(500),
        )
        .with_body(INVALID_TYPES_JSON),
        TestCase::new(
            "read_non_existent_pet",
            Operation::Read,
            ExpectedOutcome::status(404),
        )
        .with_path_param("petId", "1")
        .depends_on("delete_pet"),
        TestCase::new(
            "update_pet_with_invalid_id",
            Operation::Update,
            ExpectedOutcome::status(404),
        )
        .with_path("/{petId}")
        .with_path_param("petId", "invalid-id")
        .with_body(UPDATED_PET_JSON),
        TestCase::new(
            "update_non_existent_pet",
            Operation::Update,
            ExpectedOutcome::status(404),
        )
        .with_path("/{petId}")
        .with_body(UPDATED_PET_JSON)
        .with_mock_predecessor(MockPriorSpec::new(200).with_field("id", 9999))
        .binding("petId", "id"),
        TestCase::new(
            "update_pet_with_invalid_json",
            Operation::Update,
            ExpectedOutcome::status(404),
        )
        .with_path("/{petId}")
        .with_body(INVALID_JSON_PAYLOAD)
        .with_mock_predecessor(MockPriorSpec::new(200).with_field("id", 1))
        .binding("petId", "id"),
        TestCase::new(
            "delete_non_existent_pet",
            Operation::Delete,
            ExpectedOutcome::status(404),
        )
        .with_path_param("petId", "9999"),
        TestCase::new(
            "delete_pet_with_invalid_id_format",
            Operation::Delete,
            ExpectedOutcome::status(404),
        )
        .with_path_param("petId", "invalid-id-format"),
        // documented contract the service does not enforce
        TestCase::new(
            "create_pet_without_name",
            Operation::Create,
            ExpectedOutcome::status(400),
        )
        .with_body(PET_WITHOUT_NAME_JSON)
        .known_defect("name is required but the service returns 200"),
        TestCase::new(
            "create_pet_with_invalid_status",
            Operation::Create,
            ExpectedOutcome::status(400),
        )
        .with_body(PET_INVALID_STATUS_JSON)
        .known_defect("status is not validated; the service returns 200"),
    ]
}

/// The petstore suite as a registry.
#[must_use]
pub fn petstore() -> TestRegistry {
    let mut registry = TestRegistry::new();
    registry
        .extend(petstore_cases())
        .expect("built-in suite ids should be unique");
    registry
}
