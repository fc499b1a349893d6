//! `OpenQASM` 2.0 Parser for Orrery
//!
//! This crate accepts the core QASM2 grammar used by the simulation
//! pipelines: the `OPENQASM 2.0;` header, the mandatory
//! `include "qelib1.inc";`, one quantum register, an optional classical
//! register, and a linear sequence of whitelisted gate applications,
//! measurements, resets and barriers.
//!
//! A textual gate shim runs before the lexer and expands convenience gates
//! (currently `cry`) into supported primitives, so sources written against
//! slightly richer gate sets still parse.
//!
//! # Example
//!
//! ```rust
//! use orrery_qasm2::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert!(!circuit.is_unitary());
//! ```
//!
//! Anything outside the surface (custom `gate` definitions, `opaque`
//! declarations, `if` conditionals, unknown gates) is a [`ParseError`]
//! carrying the offending source line.

pub mod ast;
pub mod error;
pub mod lexer;
mod parser;
pub mod shim;

pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_ast};
pub use shim::expand_convenience_gates;
