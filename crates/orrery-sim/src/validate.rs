//! Circuit validation and metadata extraction.
//!
//! The gate whitelist is enforced structurally: the parser can only emit
//! whitelisted gates and the circuit builder checks operand arity and
//! bounds. What remains here are the resource caps, each reported with the
//! triggering cap and the observed value, plus the unitarity classification
//! the router keys on.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use orrery_ir::Circuit;

/// Hard resource caps.
pub const MAX_QUBITS: u32 = 24;
/// Maximum number of instructions in a circuit.
pub const MAX_OPERATIONS: usize = 1000;
/// Maximum shot count for the trajectory pipeline.
pub const MAX_SHOTS: u32 = 100_000;

/// Summary metadata of a validated circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitInfo {
    /// Width of the quantum register.
    pub num_qubits: u32,
    /// Total instruction count, barriers included.
    pub num_operations: usize,
    /// True iff the circuit contains no measurement and no reset.
    pub is_unitary: bool,
    /// Instruction counts keyed by source gate name.
    pub gate_histogram: FxHashMap<String, u32>,
}

/// Cap violations and malformed request fields.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Register wider than the global cap.
    #[error("circuit has {got} qubits, exceeding the cap of {max}")]
    TooManyQubits { got: u32, max: u32 },

    /// Instruction count over the cap.
    #[error("circuit has {got} operations, exceeding the cap of {max}")]
    TooManyOperations { got: usize, max: usize },

    /// Shot count over the cap.
    #[error("requested {got} shots, exceeding the cap of {max}")]
    TooManyShots { got: u32, max: u32 },

    /// Shot count of zero.
    #[error("shots must be at least 1")]
    ZeroShots,
}

/// Check the circuit and requested shots against the caps and produce the
/// metadata record.
pub fn validate(circuit: &Circuit, shots: u32) -> Result<CircuitInfo, ValidationError> {
    if circuit.num_qubits() > MAX_QUBITS {
        return Err(ValidationError::TooManyQubits {
            got: circuit.num_qubits(),
            max: MAX_QUBITS,
        });
    }
    if circuit.num_operations() > MAX_OPERATIONS {
        return Err(ValidationError::TooManyOperations {
            got: circuit.num_operations(),
            max: MAX_OPERATIONS,
        });
    }
    if shots == 0 {
        return Err(ValidationError::ZeroShots);
    }
    if shots > MAX_SHOTS {
        return Err(ValidationError::TooManyShots {
            got: shots,
            max: MAX_SHOTS,
        });
    }

    let info = CircuitInfo {
        num_qubits: circuit.num_qubits(),
        num_operations: circuit.num_operations(),
        is_unitary: circuit.is_unitary(),
        gate_histogram: circuit.gate_histogram(),
    };

    if info.num_operations > 100 {
        warn!(
            num_operations = info.num_operations,
            "large circuit may take time to simulate"
        );
    }
    debug!(
        num_qubits = info.num_qubits,
        num_operations = info.num_operations,
        is_unitary = info.is_unitary,
        "validated circuit"
    );

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_ir::QubitId;

    #[test]
    fn test_accepts_small_circuit() {
        let info = validate(&Circuit::bell(), 1024).unwrap();
        assert_eq!(info.num_qubits, 2);
        assert_eq!(info.num_operations, 2);
        assert!(info.is_unitary);
        assert_eq!(info.gate_histogram.get("h"), Some(&1));
    }

    #[test]
    fn test_rejects_wide_register() {
        let circuit = Circuit::new(25, 0);
        assert!(matches!(
            validate(&circuit, 1024),
            Err(ValidationError::TooManyQubits { got: 25, max: 24 })
        ));
    }

    #[test]
    fn test_rejects_too_many_operations() {
        let mut circuit = Circuit::new(1, 0);
        for _ in 0..=MAX_OPERATIONS {
            circuit.x(QubitId(0)).unwrap();
        }
        assert!(matches!(
            validate(&circuit, 1024),
            Err(ValidationError::TooManyOperations { .. })
        ));
    }

    #[test]
    fn test_rejects_shot_extremes() {
        let circuit = Circuit::bell();
        assert!(matches!(
            validate(&circuit, 0),
            Err(ValidationError::ZeroShots)
        ));
        assert!(matches!(
            validate(&circuit, MAX_SHOTS + 1),
            Err(ValidationError::TooManyShots { .. })
        ));
        assert!(validate(&circuit, MAX_SHOTS).is_ok());
    }
}
