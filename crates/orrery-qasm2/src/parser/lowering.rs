//! AST-to-Circuit lowering for QASM2.

use orrery_ir::{Circuit, ClbitId, QubitId};

use crate::ast::{GateCall, Program, RegRef, Statement, Stmt};
use crate::error::{ParseError, ParseResult};

/// Lower an AST Program to a Circuit.
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::default();
    lowerer.lower(program)
}

/// Lowers AST to Circuit. The surface admits exactly one quantum register
/// and at most one classical register, so the register tables are options.
#[derive(Default)]
struct Lowerer {
    /// Quantum register: (name, size).
    qreg: Option<(String, u32)>,
    /// Classical register: (name, size).
    creg: Option<(String, u32)>,
}

impl Lowerer {
    fn lower(&mut self, program: &Program) -> ParseResult<Circuit> {
        // First pass: collect the register declarations.
        for stmt in &program.statements {
            match &stmt.node {
                Statement::QregDecl { name, size } => {
                    if *size == 0 {
                        return Err(ParseError::InvalidRegisterSize {
                            line: stmt.line,
                            name: name.clone(),
                        });
                    }
                    if self.qreg.is_some() {
                        return Err(ParseError::MultipleQuantumRegisters { line: stmt.line });
                    }
                    self.qreg = Some((name.clone(), *size));
                }
                Statement::CregDecl { name, size } => {
                    if *size == 0 {
                        return Err(ParseError::InvalidRegisterSize {
                            line: stmt.line,
                            name: name.clone(),
                        });
                    }
                    if self.creg.is_some() {
                        return Err(ParseError::MultipleClassicalRegisters { line: stmt.line });
                    }
                    if self.qreg.as_ref().is_some_and(|(q, _)| q == name) {
                        return Err(ParseError::DuplicateRegister {
                            line: stmt.line,
                            name: name.clone(),
                        });
                    }
                    self.creg = Some((name.clone(), *size));
                }
                _ => {}
            }
        }

        let num_qubits = match &self.qreg {
            Some((_, size)) => *size,
            None => return Err(ParseError::MissingQuantumRegister),
        };
        let num_clbits = self.creg.as_ref().map_or(0, |(_, size)| *size);

        let mut circuit = Circuit::new(num_qubits, num_clbits);

        // Second pass: lower operations in program order.
        for stmt in &program.statements {
            self.lower_statement(&mut circuit, stmt)?;
        }

        Ok(circuit)
    }

    fn lower_statement(&self, circuit: &mut Circuit, stmt: &Stmt) -> ParseResult<()> {
        match &stmt.node {
            Statement::QregDecl { .. } | Statement::CregDecl { .. } => Ok(()),

            Statement::Gate(call) => self.lower_gate_call(circuit, call, stmt.line),

            Statement::Measure { qubit, bit } => {
                let qubits = self.resolve_qubits(qubit, stmt.line)?;
                let clbits = self.resolve_clbits(bit, stmt.line)?;
                if qubits.len() != clbits.len() {
                    return Err(ParseError::BroadcastMismatch { line: stmt.line });
                }
                for (q, c) in qubits.iter().zip(clbits.iter()) {
                    circuit.measure(*q, *c)?;
                }
                Ok(())
            }

            Statement::Reset { qubit } => {
                for q in self.resolve_qubits(qubit, stmt.line)? {
                    circuit.reset(q)?;
                }
                Ok(())
            }

            Statement::Barrier { qubits } => {
                if qubits.is_empty() {
                    circuit.barrier_all()?;
                } else {
                    let mut ids = Vec::new();
                    for r in qubits {
                        ids.extend(self.resolve_qubits(r, stmt.line)?);
                    }
                    circuit.barrier(ids)?;
                }
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn lower_gate_call(
        &self,
        circuit: &mut Circuit,
        call: &GateCall,
        line: usize,
    ) -> ParseResult<()> {
        let params = fold_params(call, line)?;

        match call.name.as_str() {
            // Single-qubit gates broadcast over a whole-register operand.
            "id" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.id(q)?;
                }
                Ok(())
            }
            "x" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.x(q)?;
                }
                Ok(())
            }
            "y" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.y(q)?;
                }
                Ok(())
            }
            "z" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.z(q)?;
                }
                Ok(())
            }
            "h" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.h(q)?;
                }
                Ok(())
            }
            "s" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.s(q)?;
                }
                Ok(())
            }
            "sdg" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.sdg(q)?;
                }
                Ok(())
            }
            "t" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.t(q)?;
                }
                Ok(())
            }
            "tdg" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.tdg(q)?;
                }
                Ok(())
            }
            "sx" => {
                check_param_count(call, 0, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.sx(q)?;
                }
                Ok(())
            }
            "rx" => {
                check_param_count(call, 1, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.rx(params[0], q)?;
                }
                Ok(())
            }
            "ry" => {
                check_param_count(call, 1, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.ry(params[0], q)?;
                }
                Ok(())
            }
            "rz" => {
                check_param_count(call, 1, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.rz(params[0], q)?;
                }
                Ok(())
            }
            "p" => {
                check_param_count(call, 1, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.p(params[0], q)?;
                }
                Ok(())
            }
            "u1" => {
                check_param_count(call, 1, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.u1(params[0], q)?;
                }
                Ok(())
            }
            "u2" => {
                check_param_count(call, 2, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.u2(params[0], params[1], q)?;
                }
                Ok(())
            }
            "u3" => {
                check_param_count(call, 3, line)?;
                for q in self.broadcast_single(call, line)? {
                    circuit.u3(params[0], params[1], params[2], q)?;
                }
                Ok(())
            }

            // Multi-qubit gates require explicitly indexed operands.
            "cx" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 2, line)?;
                circuit.cx(q[0], q[1])?;
                Ok(())
            }
            "cy" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 2, line)?;
                circuit.cy(q[0], q[1])?;
                Ok(())
            }
            "cz" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 2, line)?;
                circuit.cz(q[0], q[1])?;
                Ok(())
            }
            "ch" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 2, line)?;
                circuit.ch(q[0], q[1])?;
                Ok(())
            }
            "swap" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 2, line)?;
                circuit.swap(q[0], q[1])?;
                Ok(())
            }
            "ccx" => {
                check_param_count(call, 0, line)?;
                let q = self.indexed_operands(call, 3, line)?;
                circuit.ccx(q[0], q[1], q[2])?;
                Ok(())
            }

            other => Err(ParseError::UnknownGate {
                line,
                name: other.to_string(),
            }),
        }
    }

    /// Resolve a single-qubit gate's operands with register broadcast.
    fn broadcast_single(&self, call: &GateCall, line: usize) -> ParseResult<Vec<QubitId>> {
        if call.qubits.len() != 1 {
            return Err(ParseError::WrongQubitCount {
                line,
                gate: call.name.clone(),
                expected: 1,
                got: call.qubits.len(),
            });
        }
        self.resolve_qubits(&call.qubits[0], line)
    }

    /// Resolve a multi-qubit gate's operands, all of which must be indexed.
    fn indexed_operands(
        &self,
        call: &GateCall,
        expected: usize,
        line: usize,
    ) -> ParseResult<Vec<QubitId>> {
        if call.qubits.len() != expected {
            return Err(ParseError::WrongQubitCount {
                line,
                gate: call.name.clone(),
                expected,
                got: call.qubits.len(),
            });
        }
        call.qubits
            .iter()
            .map(|r| {
                if r.index.is_none() {
                    return Err(ParseError::UnindexedOperand {
                        line,
                        gate: call.name.clone(),
                    });
                }
                Ok(self.resolve_qubits(r, line)?[0])
            })
            .collect()
    }

    /// Resolve a register reference to qubit ids (the whole register when
    /// unindexed).
    fn resolve_qubits(&self, r: &RegRef, line: usize) -> ParseResult<Vec<QubitId>> {
        let (name, size) = self
            .qreg
            .as_ref()
            .filter(|(name, _)| *name == r.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                line,
                name: r.register.clone(),
            })?;

        match r.index {
            Some(index) => {
                if index >= *size {
                    return Err(ParseError::IndexOutOfBounds {
                        line,
                        register: name.clone(),
                        index: index as usize,
                        size: *size as usize,
                    });
                }
                Ok(vec![QubitId(index)])
            }
            None => Ok((0..*size).map(QubitId).collect()),
        }
    }

    /// Resolve a classical register reference to clbit ids.
    fn resolve_clbits(&self, r: &RegRef, line: usize) -> ParseResult<Vec<ClbitId>> {
        let (name, size) = self
            .creg
            .as_ref()
            .filter(|(name, _)| *name == r.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                line,
                name: r.register.clone(),
            })?;

        match r.index {
            Some(index) => {
                if index >= *size {
                    return Err(ParseError::IndexOutOfBounds {
                        line,
                        register: name.clone(),
                        index: index as usize,
                        size: *size as usize,
                    });
                }
                Ok(vec![ClbitId(index)])
            }
            None => Ok((0..*size).map(ClbitId).collect()),
        }
    }
}

/// Fold call parameters to concrete radians.
fn fold_params(call: &GateCall, line: usize) -> ParseResult<Vec<f64>> {
    call.params
        .iter()
        .map(|expr| {
            expr.as_f64().ok_or_else(|| ParseError::InvalidParameter {
                line,
                reason: "expression does not evaluate to a finite number".into(),
            })
        })
        .collect()
}

fn check_param_count(call: &GateCall, expected: usize, line: usize) -> ParseResult<()> {
    if call.params.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongParameterCount {
            line,
            gate: call.name.clone(),
            expected,
            got: call.params.len(),
        })
    }
}
