//! Non-fatal generation problems.
//!
//! Placement and wiring steps return these instead of aborting; the
//! orchestrator logs each one and keeps it in `Ruin::diagnostics`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum GenerationIssue {
    /// A computed rectangle or span came out empty.
    #[error("degenerate geometry: {0}")]
    GeometryDegenerate(String),
    /// A room type, container or target lookup found nothing.
    #[error("unresolved: {0}")]
    ResolutionMiss(String),
    /// A prefab referenced by the catalog does not exist.
    #[error("catalog inconsistency: {0}")]
    CatalogInconsistency(String),
}

impl GenerationIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationIssue::GeometryDegenerate(_) => "geometry",
            GenerationIssue::ResolutionMiss(_) => "resolution",
            GenerationIssue::CatalogInconsistency(_) => "catalog",
        }
    }
}

/// Collects issues and logs them as they arrive.
#[derive(Debug, Default)]
pub struct Diagnostics {
    issues: Vec<GenerationIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, issue: GenerationIssue) {
        log::warn!("{}", issue);
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = GenerationIssue>) {
        for issue in issues {
            self.report(issue);
        }
    }

    /// Report the error side of a step result, passing the success through.
    pub fn check<T>(&mut self, result: Result<T, GenerationIssue>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(issue) => {
                self.report(issue);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_vec(self) -> Vec<GenerationIssue> {
        self.issues
    }
}
