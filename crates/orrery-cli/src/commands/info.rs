//! The `info` command: parse and validate without simulating.

use anyhow::Context;

use orrery_sim::validate;

/// Print circuit metadata for `input` as JSON.
pub fn execute(input: &str) -> anyhow::Result<()> {
    let qasm_code = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read '{input}'"))?;

    let circuit = orrery_qasm2::parse(&qasm_code)?;
    let info = validate::validate(&circuit, 1)?;

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
