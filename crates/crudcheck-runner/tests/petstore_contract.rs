//! Built-in suite against an in-memory pet service
//!
//! `FakePetstore` reproduces the public petstore's observable behavior,
//! including the two validation gaps the suite records as known defects.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crudcheck_core::{
    CaseStatus, ExpectedOutcome, FailureKind, ObservedResponse, Operation, RequestSnapshot,
    RunReport, TestCase, TestRegistry, VerdictPolicy, VerdictStatus, suite,
};
use crudcheck_runner::{RequestBuilder, Runner, Transport, TransportError};
use serde_json::Value;

const BASE: &str = "http://petstore.test/v2/pet";

#[derive(Default)]
struct FakePetstore {
    pets: Mutex<BTreeMap<i64, Value>>,
    /// Accept malformed JSON on create, as a regressed service would
    lenient_json: bool,
    down: bool,
}

fn not_found() -> ObservedResponse {
    ObservedResponse::new(
        404,
        r#"{"code":1,"type":"error","message":"Pet not found"}"#,
    )
}

fn bad_input() -> ObservedResponse {
    ObservedResponse::new(
        400,
        r#"{"code":400,"type":"unknown","message":"bad input"}"#,
    )
}

impl FakePetstore {
    fn store(&self, body: Option<&str>) -> ObservedResponse {
        let Ok(pet) = serde_json::from_str::<Value>(body.unwrap_or_default()) else {
            if self.lenient_json {
                return ObservedResponse::new(200, "{}");
            }
            return bad_input();
        };
        let id = pet.get("id").map(Value::as_i64);
        let name_ok = pet.get("name").is_none_or(Value::is_string);
        match id {
            Some(Some(id)) if name_ok => {
                self.pets.lock().unwrap().insert(id, pet.clone());
                ObservedResponse::new(200, pet.to_string())
            }
            _ => ObservedResponse::new(
                500,
                r#"{"code":500,"type":"unknown","message":"something bad happened"}"#,
            ),
        }
    }
}

impl Transport for FakePetstore {
    fn send(&self, request: &RequestSnapshot) -> Result<ObservedResponse, TransportError> {
        if self.down {
            return Err(TransportError::Request("connection refused".into()));
        }
        let rest = request
            .url
            .strip_prefix(BASE)
            .ok_or_else(|| TransportError::Request(format!("unknown host: {}", request.url)))?;
        let id = rest.strip_prefix('/').map(|s| s.parse::<i64>().ok());

        let resp = match (request.method.as_str(), id) {
            ("POST" | "PUT", None) => self.store(request.body.as_deref()),
            ("GET", Some(Some(id))) => match self.pets.lock().unwrap().get(&id) {
                Some(pet) => ObservedResponse::new(200, pet.to_string()),
                None => not_found(),
            },
            ("DELETE", Some(Some(id))) => match self.pets.lock().unwrap().remove(&id) {
                Some(_) => {
                    ObservedResponse::new(200, format!(r#"{{"code":200,"message":"{id}"}}"#))
                }
                None => not_found(),
            },
            ("PUT", Some(Some(id))) if self.pets.lock().unwrap().contains_key(&id) => {
                ObservedResponse::new(405, "")
            }
            _ => not_found(),
        };
        Ok(resp)
    }
}

fn run(service: &FakePetstore, policy: VerdictPolicy) -> RunReport {
    Runner::new(service, RequestBuilder::new(BASE))
        .with_policy(policy)
        .run(&suite::petstore())
        .unwrap()
}

fn statuses(report: &RunReport) -> String {
    report
        .results
        .iter()
        .map(|r| format!("{} {}", r.case_id, r.status))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn full_suite_passes_with_known_defects() {
    let service = FakePetstore::default();
    let report = run(&service, VerdictPolicy::default());

    insta::assert_snapshot!(statuses(&report), @r"
    create_pet passed
    read_pet passed
    update_pet passed
    delete_pet passed
    create_pet_with_invalid_json passed
    create_pet_with_invalid_id_and_name passed
    read_non_existent_pet passed
    update_pet_with_invalid_id passed
    update_non_existent_pet passed
    update_pet_with_invalid_json passed
    delete_non_existent_pet passed
    delete_pet_with_invalid_id_format passed
    create_pet_without_name known_defect
    create_pet_with_invalid_status known_defect
    ");

    assert_eq!(report.summary.total, 14);
    assert_eq!(report.summary.passed, 12);
    assert_eq!(report.summary.known_defects, 2);
    assert_eq!(report.verdict.status, VerdictStatus::Pass);
    assert_eq!(report.verdict.exit_code, 0);
}

#[test]
fn mocked_cases_never_depend_on_live_calls() {
    let service = FakePetstore::default();
    let report = run(&service, VerdictPolicy::default());

    let mocked: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.used_mock)
        .map(|r| {
            (
                r.case_id.as_str(),
                r.request.as_ref().map(|q| q.url.as_str()),
            )
        })
        .collect();
    assert_eq!(
        mocked,
        vec![
            (
                "update_non_existent_pet",
                Some("http://petstore.test/v2/pet/9999")
            ),
            (
                "update_pet_with_invalid_json",
                Some("http://petstore.test/v2/pet/1")
            ),
        ]
    );
}

#[test]
fn strict_mode_fails_on_known_defects() {
    let service = FakePetstore::default();
    let report = run(&service, VerdictPolicy::strict());
    assert_eq!(report.verdict.status, VerdictStatus::Fail);
    assert_eq!(report.verdict.exit_code, 1);
}

#[test]
fn regression_fails_only_the_affected_case() {
    let service = FakePetstore {
        lenient_json: true,
        ..FakePetstore::default()
    };
    let report = run(&service, VerdictPolicy::default());

    let failures: Vec<_> = report.failures().map(|r| r.case_id.as_str()).collect();
    assert_eq!(failures, vec!["create_pet_with_invalid_json"]);

    let reason = report
        .result("create_pet_with_invalid_json")
        .and_then(|r| r.failure_reason())
        .unwrap();
    assert!(reason.contains("expected 400, got 200"), "{reason}");
    assert_eq!(report.summary.passed, 11);
    assert_eq!(report.verdict.status, VerdictStatus::Fail);
}

#[test]
fn unreachable_service_skips_dependent_chain() {
    let service = FakePetstore {
        down: true,
        ..FakePetstore::default()
    };
    let report = run(&service, VerdictPolicy::default());

    let status = |id: &str| report.result(id).map(|r| r.status).unwrap();
    assert_eq!(status("create_pet"), CaseStatus::Failed);
    for id in [
        "read_pet",
        "update_pet",
        "delete_pet",
        "read_non_existent_pet",
    ] {
        assert_eq!(status(id), CaseStatus::Skipped, "{id}");
    }
    assert_eq!(report.summary.skipped, 4);
    assert_eq!(report.summary.failed, 10);
    assert!(
        report
            .results
            .iter()
            .filter(|r| r.status == CaseStatus::Failed)
            .all(|r| r.failure.as_ref().map(|f| f.kind) == Some(FailureKind::Transport))
    );
}

#[test]
fn user_declared_chain_runs_against_service() {
    let mut registry = TestRegistry::new();
    registry
        .extend([
            TestCase::new("add", Operation::Create, ExpectedOutcome::status(200))
                .with_body(r#"{"id":42,"name":"Rex"}"#),
            TestCase::new(
                "fetch",
                Operation::Read,
                ExpectedOutcome::status(200)
                    .containing("Rex")
                    .not_containing("Doggie"),
            )
            .with_live_predecessor("add")
            .binding("petId", "id"),
            TestCase::new("remove", Operation::Delete, ExpectedOutcome::status(200))
                .with_path_param("petId", "42")
                .depends_on("fetch"),
            TestCase::new("gone", Operation::Read, ExpectedOutcome::status(404))
                .with_path_param("petId", "42")
                .depends_on("remove"),
        ])
        .unwrap();

    let service = FakePetstore::default();
    let report = Runner::new(&service, RequestBuilder::new(BASE))
        .run(&registry)
        .unwrap();
    assert_eq!(report.summary.passed, 4, "{}", statuses(&report));
    assert!(service.pets.lock().unwrap().is_empty());
}
