//! Monte-Carlo trajectory pipeline.
//!
//! Samples `S` stochastic pure-state trajectories with projective collapse
//! at each measurement, extracts per-qubit marginals from every trajectory
//! and averages them. Statistical error per RDM entry scales as `O(1/√S)`.
//!
//! # Reproducibility under parallelism
//!
//! Each trajectory draws from `ChaCha8Rng::seed_from_u64(master_seed)` on
//! its own stream (the trajectory index), so the random sequence of a
//! trajectory does not depend on which worker runs it. Trajectories are
//! summed in fixed-size chunks: workers sum within a chunk in index order
//! and the chunk partials are folded in chunk order afterwards, so the
//! result is bitwise identical for a given seed no matter how many threads
//! ran or how the scheduler interleaved them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, instrument};

use orrery_ir::{Circuit, InstructionKind};

use crate::cancel::CancelToken;
use crate::error::{SimError, SimResult};
use crate::math::{self, zero_rdm, Rdm};
use crate::pipeline::PipelineOutput;
use crate::router::TRAJECTORY_MAX_QUBITS;
use crate::statevector::Statevector;

/// Fewest shots that give meaningful statistics; requests below are raised.
pub const MIN_SHOTS: u32 = 100;
/// Shot cap; requests above are clamped.
pub const MAX_SHOTS: u32 = 100_000;
/// Upper bound on worker threads; larger pools gain little.
const MAX_WORKERS: usize = 16;
/// Trajectories summed per chunk. Fixed so chunk boundaries, and therefore
/// the floating-point summation order, do not depend on the worker count.
const CHUNK_SIZE: u32 = 64;

/// Tolerance on the averaged trace before normalization.
const TRACE_TOLERANCE: f64 = 1e-8;

/// The trajectory pipeline with its seeding policy.
pub struct TrajectoryPipeline {
    seed: Option<u64>,
}

impl TrajectoryPipeline {
    /// Create the pipeline; `seed` pins the master seed for reproducible
    /// runs, otherwise one is drawn from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Run `shots` trajectories (clamped into `[100, 100000]`).
    #[instrument(skip_all, fields(num_qubits = circuit.num_qubits(), shots))]
    pub fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        cancel: &CancelToken,
    ) -> SimResult<PipelineOutput> {
        let n = circuit.num_qubits();
        if n > TRAJECTORY_MAX_QUBITS {
            return Err(SimError::Resource(format!(
                "trajectory pipeline supports at most {TRAJECTORY_MAX_QUBITS} qubits, got {n}"
            )));
        }

        let shots = shots.clamp(MIN_SHOTS, MAX_SHOTS);
        let master_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let workers = std::thread::available_parallelism()
            .map_or(1, std::num::NonZeroUsize::get)
            .min(MAX_WORKERS);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| SimError::Internal(format!("failed to build worker pool: {e}")))?;

        debug!(shots, workers, "starting trajectory sampling");

        let num_chunks = shots.div_ceil(CHUNK_SIZE);
        let partials: SimResult<Vec<Vec<Rdm>>> = pool.install(|| {
            (0..num_chunks)
                .into_par_iter()
                .map(|chunk| {
                    let start = chunk * CHUNK_SIZE;
                    let end = (start + CHUNK_SIZE).min(shots);
                    run_chunk(circuit, master_seed, start..end, cancel)
                })
                .collect()
        });
        let partials = partials?;

        // Fold chunk partials in chunk order; summation order is fixed.
        let mut sums = vec![zero_rdm(); n as usize];
        for partial in partials {
            for (sum, rho) in sums.iter_mut().zip(partial.iter()) {
                for r in 0..2 {
                    for c in 0..2 {
                        sum[r][c] += rho[r][c];
                    }
                }
            }
        }

        let scale = 1.0 / f64::from(shots);
        let mut rdms = Vec::with_capacity(n as usize);
        for (qubit, mut rho) in sums.into_iter().enumerate() {
            for row in rho.iter_mut() {
                for entry in row.iter_mut() {
                    *entry *= scale;
                }
            }
            math::hermitize(&mut rho);
            let trace = math::trace_re(&rho);
            if (trace - 1.0).abs() > TRACE_TOLERANCE {
                return Err(SimError::Numerical(format!(
                    "averaged state of qubit {qubit} has trace {trace}, expected 1"
                )));
            }
            math::normalize_trace(&mut rho);
            rdms.push(rho);
        }

        debug!(shots, "trajectory sampling complete");
        Ok(PipelineOutput {
            rdms,
            shots_used: shots,
        })
    }
}

/// Simulate trajectories `range` sequentially and return the per-qubit RDM
/// sums for the chunk.
fn run_chunk(
    circuit: &Circuit,
    master_seed: u64,
    range: std::ops::Range<u32>,
    cancel: &CancelToken,
) -> SimResult<Vec<Rdm>> {
    let n = circuit.num_qubits();
    let mut sums = vec![zero_rdm(); n as usize];

    for trajectory in range {
        if cancel.is_cancelled() {
            return Err(SimError::Cancelled);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(master_seed);
        rng.set_stream(u64::from(trajectory));

        let mut sv = Statevector::try_new(n).map_err(|_| {
            SimError::Resource(format!("failed to allocate a {n}-qubit statevector"))
        })?;

        for inst in circuit.instructions() {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            match &inst.kind {
                InstructionKind::Gate(gate) => sv.apply_gate(gate, &inst.qubits),
                InstructionKind::Measure => {
                    sv.collapse(inst.qubits[0].index(), rng.gen::<f64>());
                }
                InstructionKind::Reset => {
                    sv.reset(inst.qubits[0].index(), rng.gen::<f64>());
                }
                InstructionKind::Barrier => {}
            }
        }

        for (qubit, sum) in sums.iter_mut().enumerate() {
            let rho = sv.reduced_density(qubit);
            for r in 0..2 {
                for c in 0..2 {
                    sum[r][c] += rho[r][c];
                }
            }
        }
    }

    Ok(sums)
}
