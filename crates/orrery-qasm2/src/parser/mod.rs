//! Parser for `OpenQASM` 2.0.

mod expression;
mod lowering;
mod statement;

use orrery_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{line_of, line_starts, tokenize, SpannedToken, Token};
use crate::shim::expand_convenience_gates;

/// Parse a QASM2 source string into a [`Circuit`].
///
/// The gate shim runs first, so sources using `cry` parse as their expanded
/// primitive sequence.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let shimmed = expand_convenience_gates(source);
    let mut parser = Parser::new(&shimmed)?;
    let program = parser.parse_program()?;
    lowering::lower_to_circuit(&program)
}

/// Parse a QASM2 source string into an AST [`Program`].
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    let shimmed = expand_convenience_gates(source);
    let mut parser = Parser::new(&shimmed)?;
    parser.parse_program()
}

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    line_starts: Vec<usize>,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let starts = line_starts(source);
        let mut tokens = Vec::new();

        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(ParseError::LexerError {
                        line: line_of(&starts, span.start),
                        message,
                    });
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            line_starts: starts,
        })
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// 1-based source line of the current token (or of the last token at EOF).
    pub(super) fn line(&self) -> usize {
        let idx = self.pos.min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(idx)
            .map_or(1, |t| line_of(&self.line_starts, t.span.start))
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("{expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the entire program: header, include, statements.
    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(Token::OpenQasm)?;
        let version = self.parse_version()?;
        self.expect(Token::Semicolon)?;

        self.parse_required_include()?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse the version number; only 2.0 is accepted.
    fn parse_version(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::FloatLiteral(v)) if v == 2.0 => Ok("2.0".to_string()),
            Some(other) => Err(ParseError::UnsupportedVersion {
                line,
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("version number".into())),
        }
    }

    /// Parse the mandatory `include "qelib1.inc";` line.
    fn parse_required_include(&mut self) -> ParseResult<()> {
        let line = self.line();
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "string literal".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        if path != "qelib1.inc" {
            return Err(ParseError::InvalidInclude { line, path });
        }
        self.expect(Token::Semicolon)?;
        Ok(())
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bell_state() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert!(!circuit.is_unitary());
    }

    #[test]
    fn test_parse_parameterized() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[1];
            rx(pi/2) q[0];
            ry(pi/4) q[0];
            rz(0.5) q[0];
        "#;

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 1);
        assert_eq!(circuit.num_operations(), 3);
    }

    #[test]
    fn test_missing_include_rejected() {
        let source = "OPENQASM 2.0; qreg q[1]; h q[0];";
        assert!(matches!(
            parse(source),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let source = "OPENQASM 3.0; include \"qelib1.inc\"; qreg q[1];";
        assert!(matches!(
            parse(source),
            Err(ParseError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_undefined_register_rejected() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[1];
            h nope[0];
        "#;
        assert!(matches!(
            parse(source),
            Err(ParseError::UndefinedRegister { .. })
        ));
    }

    #[test]
    fn test_error_carries_line() {
        let source = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nbogus q[0];\n";
        match parse(source) {
            Err(ParseError::UnknownGate { line, name }) => {
                assert_eq!(line, 4);
                assert_eq!(name, "bogus");
            }
            other => panic!("expected UnknownGate, got {other:?}"),
        }
    }

    #[test]
    fn test_gate_definition_rejected() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[1];
            gate mygate a { h a; }
        "#;
        assert!(matches!(
            parse(source),
            Err(ParseError::UnsupportedConstruct { .. })
        ));
    }

    #[test]
    fn test_shimmed_cry_parses() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            cry(pi/3) q[0], q[1];
        "#;
        let circuit = parse(source).unwrap();
        // ry, cx, ry, cx
        assert_eq!(circuit.num_operations(), 4);
        let histogram = circuit.gate_histogram();
        assert_eq!(histogram.get("ry"), Some(&2));
        assert_eq!(histogram.get("cx"), Some(&2));
    }
}
