//! crudcheck-core: Core types and logic for CRUD contract checks
//!
//! This crate declares test cases, orders them by dependency, verifies
//! responses against expectations, and provides synthetic prior results for
//! cases that must not depend on a live call. It performs no I/O besides
//! reading config files.

pub mod case;
pub mod config;
pub mod generator;
pub mod mock;
pub mod plan;
pub mod registry;
pub mod response;
pub mod result;
pub mod schedule;
pub mod schema;
pub mod suite;
pub mod verdict;
pub mod verify;

pub use case::{ExpectedOutcome, Operation, Predecessor, TestCase};
pub use config::{Config, ConfigError};
pub use generator::to_http_file;
pub use mock::{MockPriorResult, MockPriorSpec};
pub use plan::RunPlan;
pub use registry::{RegistryError, TestRegistry};
pub use response::{FieldError, ObservedResponse, ResponseView};
pub use result::{
    CaseFailure, CaseStatus, ExecutionResult, FailureKind, RequestSnapshot, RunReport, RunSummary,
};
pub use schedule::ScheduleError;
pub use verdict::{Verdict, VerdictPolicy, VerdictStatus};
pub use verify::{Rule, Verification, verify};
