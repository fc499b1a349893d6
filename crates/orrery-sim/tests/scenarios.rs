//! End-to-end scenarios and cross-pipeline agreement checks.

use orrery_sim::{simulate, PipelineKind, SimulationRequest, SimulationResponse};

fn qasm(body: &str) -> String {
    format!("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n{body}\n")
}

fn run(body: &str) -> SimulationResponse {
    simulate(&SimulationRequest::new(qasm(body))).unwrap()
}

/// Universal invariants every accepted circuit must satisfy.
fn assert_invariants(response: &SimulationResponse) {
    for q in &response.qubits {
        let rho = &q.density_matrix;
        let trace = rho[0][0][0] + rho[1][1][0];
        assert!((trace - 1.0).abs() <= 1e-6, "trace {trace} for {}", q.label);

        // Hermiticity on the wire shape: ρ01 = conj(ρ10).
        assert!((rho[0][1][0] - rho[1][0][0]).abs() <= 1e-9);
        assert!((rho[0][1][1] + rho[1][0][1]).abs() <= 1e-9);

        let [x, y, z] = q.bloch_coords;
        let norm = (x * x + y * y + z * z).sqrt();
        assert!(norm <= 1.0 + 1e-9, "Bloch norm {norm} for {}", q.label);

        assert!((0.0..=1.0).contains(&q.purity));
        // Purity and Bloch norm characterize each other.
        assert!(
            (q.purity - (1.0 + norm * norm) / 2.0).abs() <= 1e-6,
            "purity {} vs Bloch norm {} for {}",
            q.purity,
            norm,
            q.label
        );
    }
}

#[test]
fn scenario_a_single_hadamard() {
    let response = run("qreg q[1];\nh q[0];");

    assert_eq!(response.pipeline_used, PipelineKind::Unitary);
    assert_eq!(response.shots_used, 0);
    assert_eq!(response.qubits.len(), 1);
    assert_invariants(&response);

    let q = &response.qubits[0];
    assert!((q.bloch_coords[0] - 1.0).abs() < 1e-10);
    assert!(q.bloch_coords[1].abs() < 1e-10);
    assert!(q.bloch_coords[2].abs() < 1e-10);
    assert!((q.purity - 1.0).abs() < 1e-10);
    for r in 0..2 {
        for c in 0..2 {
            assert!((q.density_matrix[r][c][0] - 0.5).abs() < 1e-10);
            assert!(q.density_matrix[r][c][1].abs() < 1e-10);
        }
    }
}

#[test]
fn scenario_b_bell_state() {
    let response = run("qreg q[2];\nh q[0];\ncx q[0], q[1];");

    assert_eq!(response.pipeline_used, PipelineKind::Unitary);
    assert_eq!(response.qubits.len(), 2);
    assert_invariants(&response);

    // The whole state is pure, but each marginal is maximally mixed.
    for q in &response.qubits {
        assert_eq!(q.bloch_coords, [0.0, 0.0, 0.0]);
        assert!((q.purity - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[0][0][0] - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[1][1][0] - 0.5).abs() < 1e-10);
        assert_eq!(q.density_matrix[0][1], [0.0, 0.0]);
    }
}

#[test]
fn scenario_c_ghz_three() {
    let response = run("qreg q[3];\nh q[0];\ncx q[0], q[1];\ncx q[1], q[2];");

    assert_eq!(response.pipeline_used, PipelineKind::Unitary);
    assert_eq!(response.qubits.len(), 3);
    assert_invariants(&response);

    for q in &response.qubits {
        assert_eq!(q.bloch_coords, [0.0, 0.0, 0.0]);
        assert!((q.purity - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[0][0][0] - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[1][1][0] - 0.5).abs() < 1e-10);
    }
}

#[test]
fn scenario_d_rotation_then_z() {
    let response = run("qreg q[1];\nry(pi/2) q[0];\nz q[0];");

    assert_eq!(response.pipeline_used, PipelineKind::Unitary);
    assert_invariants(&response);

    let q = &response.qubits[0];
    assert!((q.bloch_coords[0] + 1.0).abs() < 1e-10);
    assert!(q.bloch_coords[1].abs() < 1e-10);
    assert!(q.bloch_coords[2].abs() < 1e-10);
    assert!((q.purity - 1.0).abs() < 1e-10);
}

#[test]
fn scenario_e_measurement_forces_mixed_marginal() {
    let response = run("qreg q[2];\ncreg c[1];\nh q[0];\ncx q[0], q[1];\nmeasure q[0] -> c[0];");

    assert_eq!(response.pipeline_used, PipelineKind::ExactDensity);
    assert_eq!(response.shots_used, 0);
    assert!(!response.circuit_info.is_unitary);
    assert_invariants(&response);

    for q in &response.qubits {
        assert_eq!(q.bloch_coords, [0.0, 0.0, 0.0]);
        assert!((q.purity - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[0][0][0] - 0.5).abs() < 1e-10);
        assert!((q.density_matrix[1][1][0] - 0.5).abs() < 1e-10);
        assert_eq!(q.density_matrix[0][1], [0.0, 0.0]);
    }
}

#[test]
fn scenario_f_reset_returns_to_ground() {
    let response = run("qreg q[1];\nh q[0];\nreset q[0];");

    assert_eq!(response.pipeline_used, PipelineKind::ExactDensity);
    assert_invariants(&response);

    let q = &response.qubits[0];
    assert_eq!(q.bloch_coords, [0.0, 0.0, 1.0]);
    assert!((q.purity - 1.0).abs() < 1e-10);
    assert!((q.density_matrix[0][0][0] - 1.0).abs() < 1e-10);
    assert_eq!(q.density_matrix[1][1], [0.0, 0.0]);
}

#[test]
fn scenario_g_trajectory_convergence_and_reproducibility() {
    let request = SimulationRequest::new(qasm(
        "qreg q[2];\ncreg c[1];\nh q[0];\ncx q[0], q[1];\nmeasure q[0] -> c[0];",
    ))
    .with_pipeline(PipelineKind::Trajectory)
    .with_shots(10_000)
    .with_seed(42);

    let response = simulate(&request).unwrap();
    assert_eq!(response.pipeline_used, PipelineKind::Trajectory);
    assert_eq!(response.shots_used, 10_000);
    assert_invariants(&response);

    for q in &response.qubits {
        assert!((q.density_matrix[0][0][0] - 0.5).abs() < 0.05);
        assert!((q.density_matrix[1][1][0] - 0.5).abs() < 0.05);
        assert!(q.density_matrix[0][1][0].abs() < 0.05);
        assert!(q.density_matrix[0][1][1].abs() < 0.05);
    }

    // Same seed, same numbers, bit for bit.
    let again = simulate(&request).unwrap();
    for (a, b) in response.qubits.iter().zip(again.qubits.iter()) {
        assert_eq!(a.density_matrix, b.density_matrix);
        assert_eq!(a.bloch_coords, b.bloch_coords);
        assert_eq!(a.purity, b.purity);
    }
}

#[test]
fn unitary_runs_are_bitwise_deterministic() {
    let body = "qreg q[2];\nry(pi/2) q[0];\nrx(pi/4) q[1];\ncx q[0], q[1];\nrz(pi/6) q[0];";
    let first = run(body);
    let second = run(body);

    for (a, b) in first.qubits.iter().zip(second.qubits.iter()) {
        assert_eq!(a.bloch_coords, b.bloch_coords);
        assert_eq!(a.density_matrix, b.density_matrix);
    }
}

#[test]
fn barrier_only_circuit_equals_empty_circuit() {
    let empty = run("qreg q[2];");
    let barriers = run("qreg q[2];\nbarrier q;\nbarrier q[0], q[1];");

    assert_eq!(barriers.circuit_info.num_operations, 2);
    for (a, b) in empty.qubits.iter().zip(barriers.qubits.iter()) {
        assert_eq!(a.bloch_coords, [0.0, 0.0, 1.0]);
        assert_eq!(a.bloch_coords, b.bloch_coords);
        assert_eq!(a.purity, 1.0);
        assert_eq!(a.density_matrix, b.density_matrix);
    }
}

#[test]
fn gate_and_inverse_cancel() {
    let base = "qreg q[2];\nh q[0];\ncx q[0], q[1];\nt q[1];";
    let padded = "qreg q[2];\nh q[0];\ncx q[0], q[1];\nt q[1];\ns q[0];\nsdg q[0];";

    let a = run(base);
    let b = run(padded);
    for (qa, qb) in a.qubits.iter().zip(b.qubits.iter()) {
        for i in 0..3 {
            assert!((qa.bloch_coords[i] - qb.bloch_coords[i]).abs() < 1e-10);
        }
        assert!((qa.purity - qb.purity).abs() < 1e-10);
    }
}

#[test]
fn unitary_and_exact_density_agree() {
    // The W-state preparation exercises ry, ch, ccx and cx at once.
    let body = "qreg q[3];\nry(1.910633236) q[0];\nch q[0], q[1];\nccx q[0], q[1], q[2];\ncx q[0], q[1];";

    let via_unitary = run(body);
    assert_eq!(via_unitary.pipeline_used, PipelineKind::Unitary);
    assert_invariants(&via_unitary);

    let via_density = simulate(
        &SimulationRequest::new(qasm(body)).with_pipeline(PipelineKind::ExactDensity),
    )
    .unwrap();
    assert_eq!(via_density.pipeline_used, PipelineKind::ExactDensity);
    assert_invariants(&via_density);

    for (a, b) in via_unitary.qubits.iter().zip(via_density.qubits.iter()) {
        for r in 0..2 {
            for c in 0..2 {
                assert!((a.density_matrix[r][c][0] - b.density_matrix[r][c][0]).abs() < 1e-9);
                assert!((a.density_matrix[r][c][1] - b.density_matrix[r][c][1]).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn trajectory_and_exact_density_agree() {
    let body = "qreg q[2];\ncreg c[2];\nry(pi/3) q[0];\ncx q[0], q[1];\nmeasure q[0] -> c[0];\nh q[1];";
    let shots = 20_000u32;
    let tolerance = 5.0 / f64::from(shots).sqrt();

    let exact = run(body);
    assert_eq!(exact.pipeline_used, PipelineKind::ExactDensity);

    let sampled = simulate(
        &SimulationRequest::new(qasm(body))
            .with_pipeline(PipelineKind::Trajectory)
            .with_shots(shots)
            .with_seed(1234),
    )
    .unwrap();
    assert_invariants(&sampled);

    for (a, b) in exact.qubits.iter().zip(sampled.qubits.iter()) {
        for r in 0..2 {
            for c in 0..2 {
                assert!(
                    (a.density_matrix[r][c][0] - b.density_matrix[r][c][0]).abs() < tolerance
                );
                assert!(
                    (a.density_matrix[r][c][1] - b.density_matrix[r][c][1]).abs() < tolerance
                );
            }
        }
    }
}

#[test]
fn router_sends_wide_nonunitary_circuit_to_trajectory() {
    let mut body = String::from("qreg q[10];\ncreg c[10];\n");
    for i in 0..10 {
        body.push_str(&format!("h q[{i}];\n"));
    }
    body.push_str("measure q[0] -> c[0];");

    let response = simulate(&SimulationRequest::new(qasm(&body)).with_shots(200)).unwrap();
    assert_eq!(response.pipeline_used, PipelineKind::Trajectory);
    assert_eq!(response.shots_used, 200);
    assert_invariants(&response);

    // Unmeasured qubits stay pure |+⟩; the measured one is mixed.
    let measured = &response.qubits[0];
    assert!(measured.purity < 0.6);
    let untouched = &response.qubits[5];
    assert!((untouched.bloch_coords[0] - 1.0).abs() < 1e-9);
}

#[test]
fn error_kinds_on_the_boundary() {
    // Unitary circuit wider than the statevector budget.
    let wide = simulate(&SimulationRequest::new(qasm("qreg q[21];\nh q[0];"))).unwrap_err();
    assert_eq!(wide.kind(), "RouterError");

    // Register wider than the global cap.
    let too_wide = simulate(&SimulationRequest::new(qasm("qreg q[25];\nh q[0];"))).unwrap_err();
    assert_eq!(too_wide.kind(), "ValidationError");

    // Shots over the cap.
    let too_many = simulate(
        &SimulationRequest::new(qasm("qreg q[1];\nh q[0];")).with_shots(100_001),
    )
    .unwrap_err();
    assert_eq!(too_many.kind(), "ValidationError");

    // Illegal override.
    let bad_override = simulate(
        &SimulationRequest::new(qasm("qreg q[1];\ncreg c[1];\nmeasure q[0] -> c[0];"))
            .with_pipeline(PipelineKind::Unitary),
    )
    .unwrap_err();
    assert_eq!(bad_override.kind(), "RouterError");

    // Malformed source.
    let bad_parse = simulate(&SimulationRequest::new("qreg q[1];")).unwrap_err();
    assert_eq!(bad_parse.kind(), "ParseError");
}

#[test]
fn shim_and_simulation_compose() {
    // cry(π) with control in |1⟩ acts as a full Y rotation on the target.
    let response = run("qreg q[2];\nx q[0];\ncry(pi) q[0], q[1];");
    assert_invariants(&response);

    let target = &response.qubits[1];
    // Ry(π)|0⟩ = |1⟩.
    assert!((target.bloch_coords[2] + 1.0).abs() < 1e-10);
}

#[test]
fn response_serializes_to_wire_shape() {
    let response = run("qreg q[1];\nh q[0];");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["pipeline_used"], "unitary");
    assert_eq!(json["shots_used"], 0);
    assert_eq!(json["circuit_info"]["num_qubits"], 1);
    assert_eq!(json["circuit_info"]["is_unitary"], true);
    assert_eq!(json["circuit_info"]["gate_histogram"]["h"], 1);
    assert_eq!(json["qubits"][0]["density_matrix"][0][1][0], 0.5);
    assert!(json["execution_time_seconds"].as_f64().unwrap() >= 0.0);
}
