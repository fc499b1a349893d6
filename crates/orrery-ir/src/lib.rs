//! Orrery Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing quantum
//! circuits in Orrery. The IR is deliberately small: an ordered, immutable
//! sequence of instructions over one global quantum register, exactly the
//! surface the simulation pipelines consume.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`] for addressing
//!   the quantum and classical registers
//! - **Gates**: [`StandardGate`], the closed whitelisted gate set with
//!   concrete rotation parameters
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`], a checked linear builder
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use orrery_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::new(2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert!(circuit.is_unitary());
//! ```
//!
//! # Endianness
//!
//! Basis index `b ∈ [0, 2ⁿ)` encodes qubit `i` in bit `i`; qubit 0 is the
//! least-significant bit. Every consumer of this IR shares that convention.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
