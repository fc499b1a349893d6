//! The three simulation pipelines behind one closed sum type.

mod exact_density;
mod trajectory;
mod unitary;

pub use exact_density::ExactDensityPipeline;
pub use trajectory::TrajectoryPipeline;
pub use unitary::UnitaryPipeline;

use orrery_ir::Circuit;

use crate::cancel::CancelToken;
use crate::error::SimResult;
use crate::math::Rdm;
use crate::router::PipelineKind;

/// What every pipeline produces: one reduced density matrix per qubit, in
/// qubit order, plus the shot count actually consumed (0 for the exact
/// pipelines).
pub struct PipelineOutput {
    /// Per-qubit 2×2 reduced density matrices, hermitized and normalized.
    pub rdms: Vec<Rdm>,
    /// Shots used; 0 unless the trajectory pipeline ran.
    pub shots_used: u32,
}

/// A chosen pipeline. The set is closed, so this is a sum type rather than
/// a trait object; the router picks the variant.
pub enum Pipeline {
    /// Statevector evolution.
    Unitary(UnitaryPipeline),
    /// Full density-matrix evolution.
    ExactDensity(ExactDensityPipeline),
    /// Monte-Carlo trajectories.
    Trajectory(TrajectoryPipeline),
}

impl Pipeline {
    /// Instantiate the pipeline the router chose.
    pub fn for_kind(kind: PipelineKind, seed: Option<u64>) -> Self {
        match kind {
            PipelineKind::Unitary => Pipeline::Unitary(UnitaryPipeline),
            PipelineKind::ExactDensity => Pipeline::ExactDensity(ExactDensityPipeline),
            PipelineKind::Trajectory => Pipeline::Trajectory(TrajectoryPipeline::new(seed)),
        }
    }

    /// Run the simulation to completion, polling `cancel` cooperatively.
    pub fn run(
        &self,
        circuit: &Circuit,
        shots: u32,
        cancel: &CancelToken,
    ) -> SimResult<PipelineOutput> {
        match self {
            Pipeline::Unitary(p) => p.run(circuit, cancel),
            Pipeline::ExactDensity(p) => p.run(circuit, cancel),
            Pipeline::Trajectory(p) => p.run(circuit, shots, cancel),
        }
    }
}
