//! Exact density-matrix pipeline.

use tracing::{debug, instrument};

use orrery_ir::{Circuit, InstructionKind};

use crate::cancel::CancelToken;
use crate::density::DensityOperator;
use crate::error::{SimError, SimResult};
use crate::math;
use crate::pipeline::PipelineOutput;
use crate::router::EXACT_DENSITY_MAX_QUBITS;

/// Tolerance on the reduced trace before normalization.
const TRACE_TOLERANCE: f64 = 1e-8;

/// Evolves the full 2ⁿ×2ⁿ density matrix. Handles any circuit, unitary or
/// not, and keeps the measurement ensemble instead of sampling outcomes.
/// The 4ⁿ memory footprint restricts it to 8 qubits.
pub struct ExactDensityPipeline;

impl ExactDensityPipeline {
    /// Run the pipeline.
    #[instrument(skip_all, fields(num_qubits = circuit.num_qubits()))]
    pub fn run(&self, circuit: &Circuit, cancel: &CancelToken) -> SimResult<PipelineOutput> {
        let n = circuit.num_qubits();
        if n > EXACT_DENSITY_MAX_QUBITS {
            return Err(SimError::Resource(format!(
                "exact-density pipeline supports at most {EXACT_DENSITY_MAX_QUBITS} qubits, got {n}"
            )));
        }

        let mut rho = DensityOperator::try_new(n).map_err(|_| {
            SimError::Resource(format!("failed to allocate a {n}-qubit density matrix"))
        })?;

        debug!(
            num_operations = circuit.num_operations(),
            "starting density-matrix evolution"
        );

        for inst in circuit.instructions() {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            match &inst.kind {
                InstructionKind::Gate(gate) => rho.apply_gate(gate, &inst.qubits),
                InstructionKind::Measure => rho.measure(inst.qubits[0].index()),
                InstructionKind::Reset => rho.reset(inst.qubits[0].index()),
                InstructionKind::Barrier => {}
            }
        }

        let mut rdms = Vec::with_capacity(n as usize);
        for qubit in 0..n {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            let mut reduced = rho.partial_trace(qubit as usize);
            math::hermitize(&mut reduced);
            let trace = math::trace_re(&reduced);
            if (trace - 1.0).abs() > TRACE_TOLERANCE {
                return Err(SimError::Numerical(format!(
                    "reduced state of qubit {qubit} has trace {trace}, expected 1"
                )));
            }
            math::normalize_trace(&mut reduced);
            rdms.push(reduced);
        }

        debug!("density-matrix evolution complete");
        Ok(PipelineOutput {
            rdms,
            shots_used: 0,
        })
    }
}
