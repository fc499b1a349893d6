//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index outside the register.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Width of the register.
        num_qubits: u32,
    },

    /// Classical bit index outside the register.
    #[error("Classical bit {clbit} out of range for a {num_clbits}-bit register")]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Width of the classical register.
        num_clbits: u32,
    },

    /// The same qubit used twice in one operation.
    #[error("Duplicate qubit {qubit} in '{gate}'")]
    DuplicateQubit {
        /// The duplicated qubit.
        qubit: QubitId,
        /// Name of the gate.
        gate: &'static str,
    },

    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate: &'static str,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
