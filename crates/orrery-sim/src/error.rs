//! The simulation error taxonomy.
//!
//! Errors form a closed, flat set of seven kinds; sub-errors from the parser,
//! validator and router convert in via `#[from]` without ever changing kind,
//! and no kind is converted to another implicitly. A pipeline that fails
//! discards its partial state; no partial result accompanies an error.
//!
//! | Kind | Source |
//! |------|--------|
//! | `Parse` | QASM2 parser |
//! | `Validation` | resource caps / request checks |
//! | `Router` | pipeline selection |
//! | `Resource` | allocation and size limits inside a pipeline |
//! | `Numerical` | post-run invariant checks |
//! | `Cancelled` | timeout or caller cancellation |
//! | `Internal` | anything that indicates a bug |

use serde::Serialize;
use thiserror::Error;

use crate::router::RouterError;
use crate::validate::ValidationError;

/// Errors produced by the simulation core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// QASM malformed or outside the accepted surface.
    #[error("{0}")]
    Parse(#[from] orrery_qasm2::ParseError),

    /// Cap exceeded or request field out of range.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Pipeline override conflicts with caps or with the circuit kind.
    #[error("{0}")]
    Router(#[from] RouterError),

    /// Memory allocation failed or a size limit was exceeded.
    #[error("resource limit: {0}")]
    Resource(String),

    /// A post-run invariant check failed (trace, hermiticity, PSD).
    #[error("numerical invariant violated: {0}")]
    Numerical(String),

    /// Timeout or caller cancellation.
    #[error("simulation cancelled")]
    Cancelled,

    /// Unexpected condition; indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SimError {
    /// Stable wire identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::Parse(_) => "ParseError",
            SimError::Validation(_) => "ValidationError",
            SimError::Router(_) => "RouterError",
            SimError::Resource(_) => "ResourceError",
            SimError::Numerical(_) => "NumericalError",
            SimError::Cancelled => "Cancelled",
            SimError::Internal(_) => "InternalError",
        }
    }

    /// Build the serializable error record for the response boundary.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            detail: None,
        }
    }
}

/// The error record surfaced to callers in place of per-qubit results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// One of the seven kind identifiers.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional extra detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
