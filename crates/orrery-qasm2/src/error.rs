//! Error types for the QASM2 parser.

use thiserror::Error;

/// Errors that can occur during parsing.
///
/// Every user-facing variant carries the 1-based source line it was raised
/// on, so the caller can point at the offending statement.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Line {line}: invalid token: {message}")]
    LexerError {
        /// Source line of the invalid token.
        line: usize,
        /// Description of the offending input.
        message: String,
    },

    /// Unexpected token.
    #[error("Line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// Wrong or missing OPENQASM version.
    #[error("Line {line}: unsupported OPENQASM version '{found}' (only 2.0 is accepted)")]
    UnsupportedVersion { line: usize, found: String },

    /// Wrong include path.
    #[error("Line {line}: expected include \"qelib1.inc\", found \"{path}\"")]
    InvalidInclude { line: usize, path: String },

    /// Gate outside the accepted surface.
    #[error("Line {line}: unknown gate '{name}'")]
    UnknownGate { line: usize, name: String },

    /// Reference to an undeclared register.
    #[error("Line {line}: undefined register '{name}'")]
    UndefinedRegister { line: usize, name: String },

    /// Register declared twice.
    #[error("Line {line}: duplicate register declaration '{name}'")]
    DuplicateRegister { line: usize, name: String },

    /// More than one quantum register.
    #[error("Line {line}: only one quantum register is supported")]
    MultipleQuantumRegisters { line: usize },

    /// More than one classical register.
    #[error("Line {line}: only one classical register is supported")]
    MultipleClassicalRegisters { line: usize },

    /// No quantum register declared.
    #[error("Program declares no quantum register")]
    MissingQuantumRegister,

    /// Register declared with zero width.
    #[error("Line {line}: register '{name}' must have at least one element")]
    InvalidRegisterSize { line: usize, name: String },

    /// Index outside a declared register.
    #[error("Line {line}: index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        line: usize,
        register: String,
        index: usize,
        size: usize,
    },

    /// Wrong number of parameters for a gate.
    #[error("Line {line}: gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of qubit operands for a gate.
    #[error("Line {line}: gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Multi-qubit gate applied to a whole register.
    #[error("Line {line}: gate '{gate}' requires indexed qubit operands")]
    UnindexedOperand { line: usize, gate: String },

    /// Register-wide measure with mismatched register sizes.
    #[error("Line {line}: cannot broadcast between registers of different sizes")]
    BroadcastMismatch { line: usize },

    /// A parameter expression that does not fold to a finite number.
    #[error("Line {line}: invalid parameter expression: {reason}")]
    InvalidParameter { line: usize, reason: String },

    /// A QASM2 form that is deliberately outside the accepted surface.
    #[error("Line {line}: {construct} are not supported")]
    UnsupportedConstruct {
        line: usize,
        construct: &'static str,
    },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    Circuit(#[from] orrery_ir::IrError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
