//! Statement parsing for QASM2.

use super::Parser;
use crate::ast::{GateCall, RegRef, Statement, Stmt};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        let node = match token {
            Token::Include => {
                // A second include is outside the surface; the only legal one
                // was consumed with the header.
                return Err(ParseError::UnsupportedConstruct {
                    line,
                    construct: "additional includes",
                });
            }
            Token::Qreg => self.parse_qreg_decl()?,
            Token::Creg => self.parse_creg_decl()?,
            Token::Measure => self.parse_measure()?,
            Token::Reset => self.parse_reset()?,
            Token::Barrier => self.parse_barrier()?,
            Token::Gate => {
                return Err(ParseError::UnsupportedConstruct {
                    line,
                    construct: "custom gate definitions",
                });
            }
            Token::Opaque => {
                return Err(ParseError::UnsupportedConstruct {
                    line,
                    construct: "opaque gate declarations",
                });
            }
            Token::If => {
                return Err(ParseError::UnsupportedConstruct {
                    line,
                    construct: "conditional statements",
                });
            }
            Token::Identifier(_) => self.parse_gate_call()?,
            _ => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "statement".into(),
                    found: token.to_string(),
                });
            }
        };

        Ok(Stmt { line, node })
    }

    /// Parse `qreg name[n];`.
    fn parse_qreg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Qreg)?;
        let (name, size) = self.parse_sized_register()?;
        Ok(Statement::QregDecl { name, size })
    }

    /// Parse `creg name[n];`.
    fn parse_creg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Creg)?;
        let (name, size) = self.parse_sized_register()?;
        Ok(Statement::CregDecl { name, size })
    }

    /// Parse `name[n];` after a register keyword. QASM2 registers are always
    /// explicitly sized.
    fn parse_sized_register(&mut self) -> ParseResult<(String, u32)> {
        let line = self.line();
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_int_literal()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;

        let size = u32::try_from(size).map_err(|_| ParseError::UnexpectedToken {
            line,
            expected: "register size that fits in 32 bits".into(),
            found: size.to_string(),
        })?;
        Ok((name, size))
    }

    /// Parse `measure q[i] -> c[j];`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;
        let qubit = self.parse_reg_ref()?;
        self.expect(Token::Arrow)?;
        let bit = self.parse_reg_ref()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { qubit, bit })
    }

    /// Parse `reset q[i];`.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubit = self.parse_reg_ref()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubit })
    }

    /// Parse `barrier q, ...;` or bare `barrier;`.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_reg_ref_list()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse a gate call: `name(params?) operands;`.
    fn parse_gate_call(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let params = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };

        let qubits = self.parse_reg_ref_list()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    /// Parse a comma-separated list of register references.
    fn parse_reg_ref_list(&mut self) -> ParseResult<Vec<RegRef>> {
        let mut refs = vec![self.parse_reg_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_reg_ref()?);
        }
        Ok(refs)
    }

    /// Parse `name` or `name[i]`.
    fn parse_reg_ref(&mut self) -> ParseResult<RegRef> {
        let line = self.line();
        let register = self.parse_identifier()?;

        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_int_literal()?;
            self.expect(Token::RBracket)?;
            let index = u32::try_from(index).map_err(|_| ParseError::UnexpectedToken {
                line,
                expected: "index that fits in 32 bits".into(),
                found: index.to_string(),
            })?;
            Some(index)
        } else {
            None
        };

        Ok(RegRef { register, index })
    }
}
