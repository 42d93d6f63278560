//! Dependency-ordered case execution
//!
//! Cases run one at a time in topological order. A case whose prerequisite
//! did not pass is skipped without sending anything; an unrelated failure
//! never stops the run.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crudcheck_core::schedule::{self, ScheduleError};
use crudcheck_core::{
    CaseFailure, CaseStatus, Config, ExecutionResult, FailureKind, ObservedResponse, Predecessor,
    ResponseView, RunReport, RunSummary, TestCase, TestRegistry, VerdictPolicy, verify,
};

use crate::request::RequestBuilder;
use crate::transport::{HttpTransport, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid case configuration: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Contract runner over a [`Transport`].
pub struct Runner<T> {
    transport: T,
    builder: RequestBuilder,
    policy: VerdictPolicy,
}

impl Runner<HttpTransport> {
    /// Live runner for the configured base URL, headers and timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        let builder = RequestBuilder::new(&config.base_url).with_headers(config.headers.clone());
        Ok(Self::new(transport, builder))
    }
}

impl<T: Transport> Runner<T> {
    #[must_use]
    pub fn new(transport: T, builder: RequestBuilder) -> Self {
        Self {
            transport,
            builder,
            policy: VerdictPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: VerdictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run every registered case and produce one result per case.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Schedule`] before any request is sent if the
    /// dependency graph is invalid or cyclic.
    pub fn run(&self, registry: &TestRegistry) -> Result<RunReport, RunError> {
        let order = schedule::order(registry)?;
        let cases = registry.cases();

        tracing::info!(
            cases = cases.len(),
            base_url = %self.builder.base_url(),
            "starting contract run"
        );

        let mut statuses: HashMap<&str, CaseStatus> = cases
            .iter()
            .map(|c| (c.id.as_str(), CaseStatus::NotRun))
            .collect();
        let mut live: HashMap<&str, ObservedResponse> = HashMap::new();
        let mut results = Vec::with_capacity(order.len());

        for i in order {
            let case = &cases[i];
            let (result, response) = self.run_case(case, &statuses, &live);

            match result.status {
                CaseStatus::Passed => tracing::info!(case = %case.id, "passed"),
                CaseStatus::Skipped => {
                    tracing::info!(case = %case.id, reason = ?result.failure_reason(), "skipped");
                }
                status => tracing::warn!(
                    case = %case.id,
                    %status,
                    reason = ?result.failure_reason(),
                    "did not pass"
                ),
            }

            statuses.insert(case.id.as_str(), result.status);
            if let Some(resp) = response {
                live.insert(case.id.as_str(), resp);
            }
            results.push(result);
        }

        let summary = RunSummary::from_results(&results);
        let verdict = self.policy.verdict(&summary);
        Ok(RunReport {
            base_url: self.builder.base_url().to_string(),
            results,
            summary,
            verdict,
        })
    }

    /// Execute one case. Returns its finalized result and, if a request was
    /// sent, the observed response for dependents to bind from.
    fn run_case(
        &self,
        case: &TestCase,
        statuses: &HashMap<&str, CaseStatus>,
        live: &HashMap<&str, ObservedResponse>,
    ) -> (ExecutionResult, Option<ObservedResponse>) {
        let mut result = ExecutionResult::not_run(&case.id, case.label());
        result.used_mock = case.uses_mock_predecessor();

        // Cascading skip
        let blocker = case.depends_on.iter().find_map(|d| {
            let status = statuses
                .get(d.as_str())
                .copied()
                .unwrap_or(CaseStatus::NotRun);
            (status != CaseStatus::Passed).then_some((d, status))
        });
        if let Some((dep, status)) = blocker {
            return (
                finalize(
                    result,
                    CaseStatus::Skipped,
                    FailureKind::DependencySkipped,
                    format!("prerequisite '{dep}' is {status}"),
                ),
                None,
            );
        }

        let bound = match self.resolve_bindings(case, live) {
            Ok(bound) => bound,
            Err(reason) => {
                return (
                    finalize(
                        result,
                        CaseStatus::Failed,
                        FailureKind::Configuration,
                        reason,
                    ),
                    None,
                );
            }
        };

        let request = match self.builder.build(case, &bound) {
            Ok(request) => request,
            Err(e) => {
                return (
                    finalize(
                        result,
                        CaseStatus::Failed,
                        FailureKind::Configuration,
                        e.to_string(),
                    ),
                    None,
                );
            }
        };

        tracing::debug!(
            case = %case.id,
            method = %request.method,
            url = %request.url,
            "sending request"
        );
        let start = Instant::now();
        let sent = self.transport.send(&request);
        result.elapsed_ms = Some(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX));
        result.request = Some(request);

        let observed = match sent {
            Ok(observed) => observed,
            Err(e) => {
                return (
                    finalize(
                        result,
                        CaseStatus::Failed,
                        FailureKind::Transport,
                        e.to_string(),
                    ),
                    None,
                );
            }
        };

        result.observed_status = Some(observed.status);
        result.observed_body = Some(observed.body.clone());

        let verification = verify(observed.status, &observed.body, &case.expect);
        let result = match (&case.known_defect, verification.passed) {
            (_, true) => {
                if let Some(note) = &case.known_defect {
                    tracing::warn!(case = %case.id, note = %note, "known defect appears fixed");
                }
                result.status = CaseStatus::Passed;
                result
            }
            (Some(note), false) => finalize(
                result,
                CaseStatus::KnownDefect,
                FailureKind::ContractMismatch,
                format!("known defect ({note}): {}", verification.reason),
            ),
            (None, false) => finalize(
                result,
                CaseStatus::Failed,
                FailureKind::ContractMismatch,
                verification.reason,
            ),
        };

        (result, Some(observed))
    }

    /// Resolve `bind` entries through the predecessor's read surface.
    fn resolve_bindings(
        &self,
        case: &TestCase,
        live: &HashMap<&str, ObservedResponse>,
    ) -> Result<BTreeMap<String, String>, String> {
        let Some(predecessor) = &case.predecessor else {
            return Ok(BTreeMap::new());
        };

        let mock;
        let view: &dyn ResponseView = match predecessor {
            Predecessor::Mock(spec) => {
                mock = spec.materialize();
                tracing::debug!(
                    case = %case.id,
                    status = mock.status_code(),
                    "using mock predecessor"
                );
                &mock
            }
            Predecessor::Live { case: pred } => live
                .get(pred.as_str())
                .ok_or_else(|| format!("live predecessor '{pred}' produced no response"))?,
        };

        case.bind
            .iter()
            .map(|(param, field)| {
                view.extract_field(field)
                    .map(|value| (param.clone(), value))
                    .map_err(|e| format!("binding '{param}': {e}"))
            })
            .collect()
    }
}

fn finalize(
    mut result: ExecutionResult,
    status: CaseStatus,
    kind: FailureKind,
    reason: String,
) -> ExecutionResult {
    result.status = status;
    result.failure = Some(CaseFailure { kind, reason });
    result
}
