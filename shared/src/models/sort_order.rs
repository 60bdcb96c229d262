//! Sort order DTOs
//!
//! Payloads for the batch and single-item sort order endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of a batch sort order update: `{ "id": ..., "sort_order": n }`
///
/// `order` is the 1-based position in the list at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: String,
    #[serde(rename = "sort_order")]
    pub order: u32,
}

impl OrderAssignment {
    pub fn new(id: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }

    /// Number a sequence of ids `1..=N` in iteration order.
    pub fn dense<I, S>(ids: I) -> Vec<OrderAssignment>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(index, id)| OrderAssignment::new(id, index as u32 + 1))
            .collect()
    }

    /// Check that a batch is a dense ranking: orders are exactly `1..=N`
    /// in slice order and every id appears once.
    pub fn validate_dense(assignments: &[OrderAssignment]) -> Result<(), AssignmentError> {
        let mut seen = std::collections::HashSet::with_capacity(assignments.len());
        for (index, assignment) in assignments.iter().enumerate() {
            let expected = index as u32 + 1;
            if assignment.order != expected {
                return Err(AssignmentError::Gap {
                    id: assignment.id.clone(),
                    expected,
                    actual: assignment.order,
                });
            }
            if !seen.insert(assignment.id.as_str()) {
                return Err(AssignmentError::DuplicateId(assignment.id.clone()));
            }
        }
        Ok(())
    }
}

/// Body of a single-item sort order update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrderUpdate {
    pub sort_order: u32,
}

/// Response for batch update operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    pub updated: usize,
}

/// A batch that is not a dense `1..=N` ranking
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("assignment for {id} has order {actual}, expected {expected}")]
    Gap {
        id: String,
        expected: u32,
        actual: u32,
    },

    #[error("duplicate id in assignment batch: {0}")]
    DuplicateId(String),
}
