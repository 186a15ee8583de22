//! Invariant checks over a whole tree.
//!
//! [`LayoutNode::validate`] is the strict gate used when accepting a tree from
//! outside (storage, templates). [`LayoutNode::invariant_report`] lists every
//! finding, including warnings, for diagnostics.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::node::{LayoutModelError, LayoutNode, NodeId};
use crate::weight::LayoutPolicy;

/// Severity for one invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantSeverity {
    Error,
    Warning,
}

/// Stable code for invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    MalformedNode,
    UnderfilledContainer,
    InvalidWeight,
    WeightSumMismatch,
    BelowFloor,
    DuplicateNodeId,
}

impl InvariantCode {
    /// Default severity for this code.
    #[must_use]
    pub const fn severity(self) -> InvariantSeverity {
        match self {
            Self::BelowFloor => InvariantSeverity::Warning,
            _ => InvariantSeverity::Error,
        }
    }
}

impl From<&LayoutModelError> for InvariantCode {
    fn from(error: &LayoutModelError) -> Self {
        match error {
            LayoutModelError::LeafWithChildren { .. }
            | LayoutModelError::ContainerWithoutChildren { .. }
            | LayoutModelError::ContainerWithComponent { .. } => Self::MalformedNode,
            LayoutModelError::UnderfilledContainer { .. } => Self::UnderfilledContainer,
            LayoutModelError::InvalidWeight { .. } => Self::InvalidWeight,
            LayoutModelError::WeightSumMismatch { .. } => Self::WeightSumMismatch,
            LayoutModelError::BelowFloor { .. } => Self::BelowFloor,
            LayoutModelError::DuplicateNodeId { .. } => Self::DuplicateNodeId,
        }
    }
}

/// One invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub severity: InvariantSeverity,
    pub node_id: NodeId,
    pub message: String,
}

/// Structured invariant report over one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub snapshot_hash: u64,
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    /// Return true if any error-level finding exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == InvariantSeverity::Error)
    }

    /// Codes present in the report, sorted and deduplicated.
    #[must_use]
    pub fn codes(&self) -> Vec<InvariantCode> {
        let mut codes: Vec<InvariantCode> = self.issues.iter().map(|issue| issue.code).collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

impl LayoutNode {
    /// Check every structural and weight invariant.
    ///
    /// Warnings (weights under the resize floor) do not fail validation;
    /// delete may legitimately leave such weights behind.
    pub fn validate(&self, policy: &LayoutPolicy) -> Result<(), LayoutModelError> {
        match collect_violations(self, policy)
            .into_iter()
            .find(|violation| InvariantCode::from(violation).severity() == InvariantSeverity::Error)
        {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// Inspect invariants and emit a structured diagnostics report.
    #[must_use]
    pub fn invariant_report(&self, policy: &LayoutPolicy) -> InvariantReport {
        let issues = collect_violations(self, policy)
            .into_iter()
            .map(|violation| {
                let code = InvariantCode::from(&violation);
                InvariantIssue {
                    code,
                    severity: code.severity(),
                    node_id: violation.node_id().clone(),
                    message: violation.to_string(),
                }
            })
            .collect();
        InvariantReport {
            snapshot_hash: self.state_hash(),
            issues,
        }
    }
}

fn collect_violations(tree: &LayoutNode, policy: &LayoutPolicy) -> Vec<LayoutModelError> {
    let mut violations = Vec::new();
    let mut seen: FxHashSet<&NodeId> = FxHashSet::default();

    for node in tree.iter() {
        if !seen.insert(&node.id) {
            violations.push(LayoutModelError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
        if node.is_leaf() {
            continue;
        }

        let children = node.children();
        if children.len() < 2 {
            violations.push(LayoutModelError::UnderfilledContainer {
                node_id: node.id.clone(),
                children: children.len(),
            });
        }

        let mut weights_valid = true;
        for child in children {
            if !child.weight.is_finite() || child.weight <= 0.0 {
                weights_valid = false;
                violations.push(LayoutModelError::InvalidWeight {
                    node_id: child.id.clone(),
                    weight: child.weight,
                });
            } else if child.weight < policy.min_weight {
                violations.push(LayoutModelError::BelowFloor {
                    node_id: child.id.clone(),
                    weight: child.weight,
                    floor: policy.min_weight,
                });
            }
        }
        if weights_valid && !children.is_empty() {
            let sum: f64 = children.iter().map(|child| child.weight).sum();
            if (sum - policy.total_weight).abs() > policy.renormalize_tolerance {
                violations.push(LayoutModelError::WeightSumMismatch {
                    node_id: node.id.clone(),
                    sum,
                    expected: policy.total_weight,
                });
            }
        }
    }
    violations
}
