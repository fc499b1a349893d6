//! The `run` command: simulate a circuit file.

use anyhow::Context;
use console::style;

use orrery_sim::{simulate, PipelineKind, SimulationRequest};

/// Simulate `input` and print the response as JSON on stdout.
pub fn execute(
    input: &str,
    shots: u32,
    pipeline: Option<PipelineKind>,
    seed: Option<u64>,
    compact: bool,
) -> anyhow::Result<()> {
    let qasm_code = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read '{input}'"))?;

    let mut request = SimulationRequest::new(qasm_code).with_shots(shots);
    if let Some(kind) = pipeline {
        request = request.with_pipeline(kind);
    }
    if let Some(seed) = seed {
        request = request.with_seed(seed);
    }

    match simulate(&request) {
        Ok(response) => {
            let json = if compact {
                serde_json::to_string(&response)?
            } else {
                serde_json::to_string_pretty(&response)?
            };
            println!("{json}");

            eprintln!(
                "{} {} pipeline, {} qubits, {:.3}s",
                style("done:").green().bold(),
                response.pipeline_used,
                response.qubits.len(),
                response.execution_time_seconds,
            );
            Ok(())
        }
        Err(e) => {
            // Emit the structured error record for machine consumers,
            // then fail with the human-readable message.
            eprintln!("{}", serde_json::to_string(&e.report())?);
            Err(e.into())
        }
    }
}
