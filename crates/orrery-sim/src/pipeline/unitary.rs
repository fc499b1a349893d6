//! Statevector pipeline for unitary circuits.

use tracing::{debug, instrument};

use orrery_ir::{Circuit, InstructionKind};

use crate::cancel::CancelToken;
use crate::error::{SimError, SimResult};
use crate::math;
use crate::pipeline::PipelineOutput;
use crate::router::UNITARY_MAX_QUBITS;
use crate::statevector::Statevector;

/// Tolerance on the reduced trace before normalization.
const TRACE_TOLERANCE: f64 = 1e-8;

/// Evolves a statevector and extracts every per-qubit marginal exactly.
/// No sampling; the `shots` request field is ignored here.
pub struct UnitaryPipeline;

impl UnitaryPipeline {
    /// Run the pipeline.
    #[instrument(skip_all, fields(num_qubits = circuit.num_qubits()))]
    pub fn run(&self, circuit: &Circuit, cancel: &CancelToken) -> SimResult<PipelineOutput> {
        let n = circuit.num_qubits();
        if n > UNITARY_MAX_QUBITS {
            return Err(SimError::Resource(format!(
                "statevector pipeline supports at most {UNITARY_MAX_QUBITS} qubits, got {n}"
            )));
        }

        let mut sv = Statevector::try_new(n).map_err(|_| {
            SimError::Resource(format!("failed to allocate a {n}-qubit statevector"))
        })?;

        debug!(
            num_operations = circuit.num_operations(),
            "starting statevector evolution"
        );

        for inst in circuit.instructions() {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            match &inst.kind {
                InstructionKind::Gate(gate) => sv.apply_gate(gate, &inst.qubits),
                InstructionKind::Barrier => {}
                InstructionKind::Measure | InstructionKind::Reset => {
                    // The router never sends collapse operations here.
                    return Err(SimError::Internal(format!(
                        "non-unitary instruction '{}' reached the unitary pipeline",
                        inst.name()
                    )));
                }
            }
        }

        let mut rdms = Vec::with_capacity(n as usize);
        for qubit in 0..n {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            let mut rho = sv.reduced_density(qubit as usize);
            math::hermitize(&mut rho);
            let trace = math::trace_re(&rho);
            if (trace - 1.0).abs() > TRACE_TOLERANCE {
                return Err(SimError::Numerical(format!(
                    "reduced state of qubit {qubit} has trace {trace}, expected 1"
                )));
            }
            math::normalize_trace(&mut rho);
            rdms.push(rho);
        }

        debug!("statevector evolution complete");
        Ok(PipelineOutput {
            rdms,
            shots_used: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_ir::{ClbitId, QubitId};

    #[test]
    fn test_bell_marginals_are_mixed() {
        let output = UnitaryPipeline
            .run(&Circuit::bell(), &CancelToken::new())
            .unwrap();

        assert_eq!(output.shots_used, 0);
        assert_eq!(output.rdms.len(), 2);
        for rho in &output.rdms {
            assert!((rho[0][0].re - 0.5).abs() < 1e-10);
            assert!((rho[1][1].re - 0.5).abs() < 1e-10);
            assert!(rho[0][1].norm() < 1e-10);
        }
    }

    #[test]
    fn test_rejects_measurement() {
        let mut circuit = Circuit::new(1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        assert!(matches!(
            UnitaryPipeline.run(&circuit, &CancelToken::new()),
            Err(SimError::Internal(_))
        ));
    }

    #[test]
    fn test_cancelled_before_work() {
        let token = CancelToken::new();
        token.cancel();

        assert!(matches!(
            UnitaryPipeline.run(&Circuit::bell(), &token),
            Err(SimError::Cancelled)
        ));
    }

    #[test]
    fn test_rejects_over_budget() {
        let circuit = Circuit::new(21, 0);
        assert!(matches!(
            UnitaryPipeline.run(&circuit, &CancelToken::new()),
            Err(SimError::Resource(_))
        ));
    }
}
