//! Linear circuit representation and builder.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// An ordered sequence of instructions over a single quantum register.
///
/// The register is global and fixed: basis index bit `i` corresponds to
/// qubit `i` (qubit 0 is least-significant). Circuits are built through the
/// checked methods below and treated as immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits and `num_clbits`
    /// classical bits.
    pub fn new(num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            num_qubits,
            num_clbits,
            instructions: Vec::new(),
        }
    }

    /// Number of qubits in the register.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Number of instructions (gates, measurements, resets and barriers).
    #[inline]
    pub fn num_operations(&self) -> usize {
        self.instructions.len()
    }

    /// The instruction sequence in program order.
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// True iff the circuit contains no measurement and no reset.
    /// Barriers do not affect the classification.
    pub fn is_unitary(&self) -> bool {
        !self
            .instructions
            .iter()
            .any(|inst| inst.is_measure() || inst.is_reset())
    }

    /// Count instructions by name.
    pub fn gate_histogram(&self) -> FxHashMap<String, u32> {
        let mut histogram = FxHashMap::default();
        for inst in &self.instructions {
            *histogram.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        histogram
    }

    fn check_qubit(&self, qubit: QubitId) -> IrResult<()> {
        if qubit.0 < self.num_qubits {
            Ok(())
        } else {
            Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            })
        }
    }

    fn check_clbit(&self, clbit: ClbitId) -> IrResult<()> {
        if clbit.0 < self.num_clbits {
            Ok(())
        } else {
            Err(IrError::ClbitOutOfRange {
                clbit,
                num_clbits: self.num_clbits,
            })
        }
    }

    /// Append a gate after validating operand count, bounds and distinctness.
    pub fn push_gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<()> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        let expected = gate.num_qubits();
        if qubits.len() as u32 != expected {
            return Err(IrError::QubitCountMismatch {
                gate: gate.name(),
                expected,
                got: qubits.len() as u32,
            });
        }
        for (i, &q) in qubits.iter().enumerate() {
            self.check_qubit(q)?;
            if qubits[..i].contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate: gate.name(),
                });
            }
        }
        self.instructions.push(Instruction::gate(gate, qubits));
        Ok(())
    }

    /// Apply an identity gate.
    pub fn id(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::I, [q])
    }

    /// Apply a Pauli-X gate.
    pub fn x(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::X, [q])
    }

    /// Apply a Pauli-Y gate.
    pub fn y(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Y, [q])
    }

    /// Apply a Pauli-Z gate.
    pub fn z(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Z, [q])
    }

    /// Apply a Hadamard gate.
    pub fn h(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::H, [q])
    }

    /// Apply an S gate.
    pub fn s(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::S, [q])
    }

    /// Apply an S-dagger gate.
    pub fn sdg(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Sdg, [q])
    }

    /// Apply a T gate.
    pub fn t(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::T, [q])
    }

    /// Apply a T-dagger gate.
    pub fn tdg(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Tdg, [q])
    }

    /// Apply a sqrt(X) gate.
    pub fn sx(&mut self, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::SX, [q])
    }

    /// Apply an X rotation.
    pub fn rx(&mut self, theta: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Rx(theta), [q])
    }

    /// Apply a Y rotation.
    pub fn ry(&mut self, theta: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Ry(theta), [q])
    }

    /// Apply a Z rotation.
    pub fn rz(&mut self, theta: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Rz(theta), [q])
    }

    /// Apply a phase gate.
    pub fn p(&mut self, lambda: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::P(lambda), [q])
    }

    /// Apply a U1 gate.
    pub fn u1(&mut self, lambda: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::U1(lambda), [q])
    }

    /// Apply a U2 gate.
    pub fn u2(&mut self, phi: f64, lambda: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::U2(phi, lambda), [q])
    }

    /// Apply a U3 gate.
    pub fn u3(&mut self, theta: f64, phi: f64, lambda: f64, q: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::U3(theta, phi, lambda), [q])
    }

    /// Apply a CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::CX, [control, target])
    }

    /// Apply a controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::CY, [control, target])
    }

    /// Apply a controlled-Z gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::CZ, [control, target])
    }

    /// Apply a controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::CH, [control, target])
    }

    /// Apply a SWAP gate.
    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::Swap, [a, b])
    }

    /// Apply a Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<()> {
        self.push_gate(StandardGate::CCX, [c1, c2, target])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<()> {
        self.check_qubit(qubit)?;
        self.check_clbit(clbit)?;
        self.instructions.push(Instruction::measure(qubit, clbit));
        Ok(())
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<()> {
        self.check_qubit(qubit)?;
        self.instructions.push(Instruction::reset(qubit));
        Ok(())
    }

    /// Add a barrier across the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<()> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        for &q in &qubits {
            self.check_qubit(q)?;
        }
        self.instructions.push(Instruction::barrier(qubits));
        Ok(())
    }

    /// Add a barrier across the whole register.
    pub fn barrier_all(&mut self) -> IrResult<()> {
        let qubits: Vec<QubitId> = (0..self.num_qubits).map(QubitId).collect();
        self.instructions.push(Instruction::barrier(qubits));
        Ok(())
    }

    /// Build a Bell-state circuit on two qubits.
    pub fn bell() -> Self {
        let mut circuit = Circuit::new(2, 0);
        circuit.h(QubitId(0)).expect("in-range");
        circuit.cx(QubitId(0), QubitId(1)).expect("in-range");
        circuit
    }

    /// Build an n-qubit GHZ-state circuit.
    pub fn ghz(num_qubits: u32) -> Self {
        let mut circuit = Circuit::new(num_qubits, 0);
        if num_qubits == 0 {
            return circuit;
        }
        circuit.h(QubitId(0)).expect("in-range");
        for i in 1..num_qubits {
            circuit.cx(QubitId(i - 1), QubitId(i)).expect("in-range");
        }
        circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_circuit() {
        let circuit = Circuit::bell();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_operations(), 2);
        assert!(circuit.is_unitary());
    }

    #[test]
    fn test_measure_breaks_unitarity() {
        let mut circuit = Circuit::new(1, 1);
        circuit.h(QubitId(0)).unwrap();
        assert!(circuit.is_unitary());
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(!circuit.is_unitary());
    }

    #[test]
    fn test_barrier_is_neutral() {
        let mut circuit = Circuit::new(3, 0);
        circuit.barrier_all().unwrap();
        assert!(circuit.is_unitary());
        assert_eq!(circuit.num_operations(), 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut circuit = Circuit::new(2, 0);
        assert!(matches!(
            circuit.h(QubitId(2)),
            Err(IrError::QubitOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::new(2, 0);
        assert!(matches!(
            circuit.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_histogram() {
        let mut circuit = Circuit::new(2, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let histogram = circuit.gate_histogram();
        assert_eq!(histogram.get("h"), Some(&2));
        assert_eq!(histogram.get("cx"), Some(&1));
        assert_eq!(histogram.get("measure"), Some(&1));
    }
}
