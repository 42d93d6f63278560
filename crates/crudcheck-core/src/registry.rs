//! Test registry: the declared cases, in declaration order

use std::collections::{HashMap, HashSet};

use crate::case::{Predecessor, TestCase};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("case id must not be empty")]
    EmptyId,
    #[error("duplicate case id '{0}'")]
    DuplicateId(String),
    #[error("case '{case}' depends on unknown case '{dependency}'")]
    UnknownDependency { case: String, dependency: String },
    #[error("case '{0}' depends on itself")]
    SelfDependency(String),
    #[error("case '{case}' reads from live predecessor '{predecessor}' which is not in depends_on")]
    PredecessorNotDependency { case: String, predecessor: String },
    #[error("case '{case}' binds '{param}' but declares no predecessor")]
    BindWithoutPredecessor { case: String, param: String },
}

/// Holds the declared test cases.
///
/// Cases are validated on insertion except for dependency targets, which may
/// be declared later; [`TestRegistry::validate`] checks those.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    cases: Vec<TestCase>,
    index: HashMap<String, usize>,
}

impl TestRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case.
    ///
    /// # Errors
    ///
    /// Returns error on empty or duplicate id, self dependency, or a binding
    /// without a predecessor.
    pub fn register(&mut self, case: TestCase) -> Result<(), RegistryError> {
        if case.id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.index.contains_key(&case.id) {
            return Err(RegistryError::DuplicateId(case.id));
        }
        if case.depends_on.iter().any(|d| d == &case.id) {
            return Err(RegistryError::SelfDependency(case.id));
        }
        if case.predecessor.is_none() {
            if let Some(param) = case.bind.keys().next() {
                return Err(RegistryError::BindWithoutPredecessor {
                    case: case.id.clone(),
                    param: param.clone(),
                });
            }
        }
        if let Some(Predecessor::Live { case: pred }) = &case.predecessor {
            if !case.depends_on.contains(pred) {
                return Err(RegistryError::PredecessorNotDependency {
                    case: case.id.clone(),
                    predecessor: pred.clone(),
                });
            }
        }
        self.index.insert(case.id.clone(), self.cases.len());
        self.cases.push(case);
        Ok(())
    }

    /// Register several cases, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`TestRegistry::register`].
    pub fn extend(
        &mut self,
        cases: impl IntoIterator<Item = TestCase>,
    ) -> Result<(), RegistryError> {
        for case in cases {
            self.register(case)?;
        }
        Ok(())
    }

    /// Check that every dependency names a registered case.
    ///
    /// # Errors
    ///
    /// Returns the first unknown dependency in declaration order.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for case in &self.cases {
            for dep in &case.depends_on {
                if !self.index.contains_key(dep) {
                    return Err(RegistryError::UnknownDependency {
                        case: case.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.index.get(id).map(|&i| &self.cases[i])
    }

    /// Declaration position of a case.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Cases in declaration order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Drop cases tagged as known defects, and anything that transitively
    /// depends on them. Every other case is kept in declaration order.
    #[must_use]
    pub fn without_known_defects(&self) -> Self {
        let mut excluded: HashSet<&str> = self
            .cases
            .iter()
            .filter(|c| c.known_defect.is_some())
            .map(|c| c.id.as_str())
            .collect();

        // fixpoint: dependencies may be declared after their dependents
        loop {
            let before = excluded.len();
            for case in &self.cases {
                let mut deps = case.depends_on.iter();
                if deps.any(|d| excluded.contains(d.as_str())) {
                    excluded.insert(case.id.as_str());
                }
            }
            if excluded.len() == before {
                break;
            }
        }

        let cases: Vec<TestCase> = self
            .cases
            .iter()
            .filter(|c| !excluded.contains(c.id.as_str()))
            .cloned()
            .collect();
        let index = cases
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { cases, index }
    }
}
