//! Pipeline selection.
//!
//! Maps `(qubit count, unitarity, shots, override?)` to one of the three
//! simulation pipelines, subject to hard caps. The decision and its reason
//! are logged; a best-effort warning accompanies wide trajectory runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::validate::CircuitInfo;

/// Qubit budget of the statevector (unitary) pipeline.
pub const UNITARY_MAX_QUBITS: u32 = 20;
/// Qubit budget of the exact-density pipeline.
pub const EXACT_DENSITY_MAX_QUBITS: u32 = 8;
/// Qubit budget of the trajectory pipeline.
pub const TRAJECTORY_MAX_QUBITS: u32 = 24;
/// Width above which trajectory results carry a best-effort warning.
pub const TRAJECTORY_COMFORT_QUBITS: u32 = 16;

/// The three simulation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Statevector evolution; unitary circuits only.
    Unitary,
    /// Full density-matrix evolution.
    ExactDensity,
    /// Monte-Carlo pure-state trajectories.
    Trajectory,
}

impl PipelineKind {
    /// Wire name of the pipeline.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineKind::Unitary => "unitary",
            PipelineKind::ExactDensity => "exact_density",
            PipelineKind::Trajectory => "trajectory",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PipelineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unitary" => Ok(PipelineKind::Unitary),
            "exact_density" => Ok(PipelineKind::ExactDensity),
            "trajectory" => Ok(PipelineKind::Trajectory),
            other => Err(format!(
                "unknown pipeline '{other}' (expected unitary, exact_density or trajectory)"
            )),
        }
    }
}

/// Routing failures: an illegal override or a circuit outside every budget.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouterError {
    /// The unitary pipeline cannot simulate measurements or resets.
    #[error("unitary pipeline requires a unitary circuit (no measure, no reset)")]
    OverrideRequiresUnitary,

    /// Override names a pipeline whose qubit budget the circuit exceeds.
    #[error("{pipeline} pipeline supports at most {max} qubits, circuit has {got}")]
    OverrideTooWide {
        pipeline: PipelineKind,
        max: u32,
        got: u32,
    },

    /// A unitary circuit too wide for the statevector budget.
    #[error("unitary circuit with {got} qubits exceeds the {max}-qubit statevector budget")]
    OutOfBudget { got: u32, max: u32 },
}

/// Select a pipeline for the circuit.
pub fn route(
    info: &CircuitInfo,
    shots: u32,
    override_kind: Option<PipelineKind>,
) -> Result<PipelineKind, RouterError> {
    let n = info.num_qubits;

    if let Some(kind) = override_kind {
        check_override(kind, info)?;
        debug!(pipeline = %kind, "override routing");
        return Ok(kind);
    }

    let kind = if info.is_unitary {
        if n > UNITARY_MAX_QUBITS {
            return Err(RouterError::OutOfBudget {
                got: n,
                max: UNITARY_MAX_QUBITS,
            });
        }
        PipelineKind::Unitary
    } else if n <= EXACT_DENSITY_MAX_QUBITS {
        PipelineKind::ExactDensity
    } else {
        if n > TRAJECTORY_COMFORT_QUBITS {
            warn!(
                num_qubits = n,
                "wide non-unitary circuit routed to trajectory on a best-effort basis"
            );
        }
        PipelineKind::Trajectory
    };

    debug!(
        pipeline = %kind,
        num_qubits = n,
        is_unitary = info.is_unitary,
        shots,
        "auto routing"
    );
    Ok(kind)
}

/// An override is legal iff the named pipeline could run this circuit.
fn check_override(kind: PipelineKind, info: &CircuitInfo) -> Result<(), RouterError> {
    let (max, needs_unitary) = match kind {
        PipelineKind::Unitary => (UNITARY_MAX_QUBITS, true),
        PipelineKind::ExactDensity => (EXACT_DENSITY_MAX_QUBITS, false),
        PipelineKind::Trajectory => (TRAJECTORY_MAX_QUBITS, false),
    };
    if needs_unitary && !info.is_unitary {
        return Err(RouterError::OverrideRequiresUnitary);
    }
    if info.num_qubits > max {
        return Err(RouterError::OverrideTooWide {
            pipeline: kind,
            max,
            got: info.num_qubits,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn info(num_qubits: u32, is_unitary: bool) -> CircuitInfo {
        CircuitInfo {
            num_qubits,
            num_operations: 10,
            is_unitary,
            gate_histogram: FxHashMap::default(),
        }
    }

    #[test]
    fn test_unitary_within_budget() {
        assert_eq!(
            route(&info(20, true), 1024, None).unwrap(),
            PipelineKind::Unitary
        );
    }

    #[test]
    fn test_unitary_over_budget_rejected() {
        assert!(matches!(
            route(&info(21, true), 1024, None),
            Err(RouterError::OutOfBudget { got: 21, max: 20 })
        ));
    }

    #[test]
    fn test_narrow_nonunitary_goes_exact() {
        assert_eq!(
            route(&info(8, false), 1024, None).unwrap(),
            PipelineKind::ExactDensity
        );
    }

    #[test]
    fn test_mid_nonunitary_goes_trajectory() {
        assert_eq!(
            route(&info(9, false), 1024, None).unwrap(),
            PipelineKind::Trajectory
        );
        assert_eq!(
            route(&info(16, false), 1024, None).unwrap(),
            PipelineKind::Trajectory
        );
    }

    #[test]
    fn test_wide_nonunitary_goes_trajectory_best_effort() {
        assert_eq!(
            route(&info(24, false), 1024, None).unwrap(),
            PipelineKind::Trajectory
        );
    }

    #[test]
    fn test_legal_override_wins() {
        assert_eq!(
            route(&info(4, false), 1024, Some(PipelineKind::Trajectory)).unwrap(),
            PipelineKind::Trajectory
        );
        assert_eq!(
            route(&info(4, true), 1024, Some(PipelineKind::ExactDensity)).unwrap(),
            PipelineKind::ExactDensity
        );
    }

    #[test]
    fn test_override_unitary_on_nonunitary_rejected() {
        assert!(matches!(
            route(&info(4, false), 1024, Some(PipelineKind::Unitary)),
            Err(RouterError::OverrideRequiresUnitary)
        ));
    }

    #[test]
    fn test_override_exceeding_cap_rejected() {
        assert!(matches!(
            route(&info(9, false), 1024, Some(PipelineKind::ExactDensity)),
            Err(RouterError::OverrideTooWide { got: 9, max: 8, .. })
        ));
    }

    #[test]
    fn test_pipeline_names() {
        assert_eq!(PipelineKind::Unitary.name(), "unitary");
        assert_eq!(PipelineKind::ExactDensity.name(), "exact_density");
        assert_eq!(PipelineKind::Trajectory.name(), "trajectory");
        assert_eq!(
            "exact_density".parse::<PipelineKind>().unwrap(),
            PipelineKind::ExactDensity
        );
        assert!("density".parse::<PipelineKind>().is_err());
    }
}
