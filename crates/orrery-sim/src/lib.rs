//! Orrery simulation core.
//!
//! The pipeline behind the Bloch-sphere picture: parse an OpenQASM 2.0
//! program, validate it against resource caps, route it to one of three
//! simulation strategies, evolve the quantum state, and report, for every
//! qubit, a reduced 2×2 density matrix with its Bloch vector and purity.
//!
//! | Strategy | State | When |
//! |----------|-------|------|
//! | [`pipeline::UnitaryPipeline`] | statevector, 2ⁿ amplitudes | unitary circuits, n ≤ 20 |
//! | [`pipeline::ExactDensityPipeline`] | density matrix, 4ⁿ entries | any circuit, n ≤ 8 |
//! | [`pipeline::TrajectoryPipeline`] | statevector per trajectory | non-unitary circuits, n ≤ 24 |
//!
//! # Example
//!
//! ```rust
//! use orrery_sim::{simulate, SimulationRequest};
//!
//! let request = SimulationRequest::new(
//!     r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[1];
//!     h q[0];
//!     "#,
//! );
//!
//! let response = simulate(&request).unwrap();
//! let qubit = &response.qubits[0];
//! assert!((qubit.bloch_coords[0] - 1.0).abs() < 1e-10);
//! assert!((qubit.purity - 1.0).abs() < 1e-10);
//! ```
//!
//! A request that fails anywhere in the chain produces a [`SimError`] of
//! exactly one of seven kinds; no partial per-qubit data accompanies an
//! error.

pub mod cancel;
pub mod density;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod statevector;
pub mod validate;

pub use cancel::CancelToken;
pub use error::{ErrorReport, SimError, SimResult};
pub use pipeline::{Pipeline, PipelineOutput};
pub use report::{QubitState, SimulationResponse};
pub use router::{PipelineKind, RouterError};
pub use validate::{CircuitInfo, ValidationError};

use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A simulation request.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    /// OpenQASM 2.0 source.
    pub qasm_code: String,
    /// Shot count for the trajectory pipeline (clamped into [100, 100000]
    /// when that pipeline runs). Defaults to 1024.
    #[serde(default = "default_shots")]
    pub shots: u32,
    /// Skip automatic routing and demand a specific pipeline.
    #[serde(default)]
    pub pipeline_override: Option<PipelineKind>,
    /// Master seed for reproducible trajectory runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_shots() -> u32 {
    1024
}

impl SimulationRequest {
    /// A request with default shots and no override.
    pub fn new(qasm_code: impl Into<String>) -> Self {
        Self {
            qasm_code: qasm_code.into(),
            shots: default_shots(),
            pipeline_override: None,
            seed: None,
        }
    }

    /// Set the shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Force a pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, kind: PipelineKind) -> Self {
        self.pipeline_override = Some(kind);
        self
    }

    /// Pin the trajectory seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Wall-clock budget for one simulation.
    pub timeout: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }
}

/// Run one simulation under the default 300 s wall-clock budget.
pub fn simulate(request: &SimulationRequest) -> SimResult<SimulationResponse> {
    let config = SimulatorConfig::default();
    simulate_with_cancel(request, &CancelToken::with_timeout(config.timeout))
}

/// Run one simulation, polling the caller's cancellation token.
///
/// The full chain: shim + parse → validate → route → simulate → assemble.
/// Each stage owns its error kind; nothing is converted between kinds.
pub fn simulate_with_cancel(
    request: &SimulationRequest,
    cancel: &CancelToken,
) -> SimResult<SimulationResponse> {
    debug!(
        source_len = request.qasm_code.len(),
        shots = request.shots,
        "received simulation request"
    );

    let circuit = orrery_qasm2::parse(&request.qasm_code)?;
    let circuit_info = validate::validate(&circuit, request.shots)?;
    let kind = router::route(&circuit_info, request.shots, request.pipeline_override)?;

    let pipeline = Pipeline::for_kind(kind, request.seed);
    let start = Instant::now();
    let output = pipeline.run(&circuit, request.shots, cancel)?;
    let elapsed = start.elapsed();

    info!(
        pipeline = %kind,
        num_qubits = circuit_info.num_qubits,
        num_operations = circuit_info.num_operations,
        elapsed_ms = elapsed.as_millis() as u64,
        shots_used = output.shots_used,
        "simulation complete"
    );

    report::assemble(output, kind, circuit_info, elapsed)
}
