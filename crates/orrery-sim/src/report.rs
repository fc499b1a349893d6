//! Result assembly and post-run invariant checks.
//!
//! The assembler is the only place where complex numbers cross into the
//! wire shape (`[re, im]` pairs). Before that happens, every per-qubit
//! marginal is re-checked against the density-matrix invariants; a
//! violation here means a pipeline bug or extreme numerical degeneracy and
//! surfaces as `NumericalError` rather than a silently wrong picture.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{SimError, SimResult};
use crate::math::{self, Rdm};
use crate::pipeline::PipelineOutput;
use crate::router::PipelineKind;
use crate::validate::CircuitInfo;

/// Trace deviation allowed on assembled marginals.
const TRACE_TOLERANCE: f64 = 1e-6;
/// Hermiticity deviation allowed per entry.
const HERMITICITY_TOLERANCE: f64 = 1e-9;
/// Most negative eigenvalue tolerated (rounding leaves `−1e-17`-ish values).
const EIGENVALUE_TOLERANCE: f64 = -1e-9;
/// Bloch-norm overshoot beyond which the vector is rescaled.
const BLOCH_NORM_SLACK: f64 = 1e-9;

/// One qubit's view in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitState {
    /// Qubit index within the register.
    pub id: u32,
    /// Display label, `"q0"`, `"q1"`, …
    pub label: String,
    /// Bloch vector (x, y, z) with ‖·‖₂ ≤ 1.
    pub bloch_coords: [f64; 3],
    /// Tr(ρ²), in [0, 1].
    pub purity: f64,
    /// The 2×2 reduced density matrix, each entry as `[re, im]`.
    pub density_matrix: [[[f64; 2]; 2]; 2],
}

/// The full simulation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Per-qubit states in register order.
    pub qubits: Vec<QubitState>,
    /// Which pipeline produced the result.
    pub pipeline_used: PipelineKind,
    /// Wall-clock duration of the pipeline run.
    pub execution_time_seconds: f64,
    /// Shots consumed (0 for non-trajectory pipelines).
    pub shots_used: u32,
    /// Circuit metadata from validation.
    pub circuit_info: CircuitInfo,
}

/// Validate the pipeline output and assemble the response record.
pub fn assemble(
    output: PipelineOutput,
    pipeline_used: PipelineKind,
    circuit_info: CircuitInfo,
    elapsed: Duration,
) -> SimResult<SimulationResponse> {
    let mut qubits = Vec::with_capacity(output.rdms.len());

    for (id, rho) in output.rdms.iter().enumerate() {
        check_invariants(id, rho)?;

        let mut bloch = math::bloch(rho);
        let norm = (bloch[0] * bloch[0] + bloch[1] * bloch[1] + bloch[2] * bloch[2]).sqrt();
        if norm > 1.0 + BLOCH_NORM_SLACK {
            for component in &mut bloch {
                *component /= norm;
            }
        }

        qubits.push(QubitState {
            id: id as u32,
            label: format!("q{id}"),
            bloch_coords: bloch,
            purity: math::purity(rho),
            density_matrix: wire_matrix(rho),
        });
    }

    Ok(SimulationResponse {
        qubits,
        pipeline_used,
        execution_time_seconds: elapsed.as_secs_f64(),
        shots_used: output.shots_used,
        circuit_info,
    })
}

/// Trace, hermiticity and positive-semidefiniteness checks.
fn check_invariants(id: usize, rho: &Rdm) -> SimResult<()> {
    let trace = math::trace_re(rho);
    if (trace - 1.0).abs() > TRACE_TOLERANCE {
        return Err(SimError::Numerical(format!(
            "qubit {id}: trace {trace} deviates from 1"
        )));
    }

    if (rho[0][1] - rho[1][0].conj()).norm() > HERMITICITY_TOLERANCE
        || rho[0][0].im.abs() > HERMITICITY_TOLERANCE
        || rho[1][1].im.abs() > HERMITICITY_TOLERANCE
    {
        return Err(SimError::Numerical(format!(
            "qubit {id}: matrix is not Hermitian"
        )));
    }

    // For a Hermitian unit-trace 2×2 matrix, non-negative diagonal plus
    // non-negative determinant is equivalent to eigenvalues ≥ 0.
    let det = (rho[0][0] * rho[1][1] - rho[0][1] * rho[1][0]).re;
    if rho[0][0].re < EIGENVALUE_TOLERANCE
        || rho[1][1].re < EIGENVALUE_TOLERANCE
        || det < EIGENVALUE_TOLERANCE
    {
        return Err(SimError::Numerical(format!(
            "qubit {id}: matrix is not positive semidefinite"
        )));
    }

    Ok(())
}

/// Convert to the `[re, im]` wire shape, clipping dust.
fn wire_matrix(rho: &Rdm) -> [[[f64; 2]; 2]; 2] {
    let mut out = [[[0.0; 2]; 2]; 2];
    for r in 0..2 {
        for c in 0..2 {
            out[r][c] = [math::clip_tiny(rho[r][c].re), math::clip_tiny(rho[r][c].im)];
        }
    }
    out
}
