//! Property-based tests for the QASM2 parser.
//!
//! Generates random programs inside the accepted surface and checks that
//! parsing succeeds, is deterministic, and preserves operation counts.

use orrery_qasm2::parse;
use proptest::prelude::*;

/// One operation in a generated program.
#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    Rz(u32, f64),
    Cx(u32, u32),
    Measure(u32),
    Reset(u32),
    Barrier,
}

impl Op {
    fn emit(&self) -> String {
        match self {
            Op::H(q) => format!("h q[{q}];"),
            Op::X(q) => format!("x q[{q}];"),
            Op::Rz(q, theta) => format!("rz({theta}) q[{q}];"),
            Op::Cx(c, t) => format!("cx q[{c}], q[{t}];"),
            Op::Measure(q) => format!("measure q[{q}] -> c[{q}];"),
            Op::Reset(q) => format!("reset q[{q}];"),
            Op::Barrier => "barrier q;".to_string(),
        }
    }

    /// Number of IR instructions this statement lowers to.
    fn lowered_len(&self) -> usize {
        1
    }
}

fn arb_op(num_qubits: u32) -> impl Strategy<Value = Op> {
    let q = 0..num_qubits;
    if num_qubits < 2 {
        prop_oneof![
            q.clone().prop_map(Op::H),
            q.clone().prop_map(Op::X),
            (q.clone(), -10.0..10.0f64).prop_map(|(q, t)| Op::Rz(q, t)),
            q.clone().prop_map(Op::Measure),
            q.prop_map(Op::Reset),
            Just(Op::Barrier),
        ]
        .boxed()
    } else {
        prop_oneof![
            q.clone().prop_map(Op::H),
            q.clone().prop_map(Op::X),
            (q.clone(), -10.0..10.0f64).prop_map(|(q, t)| Op::Rz(q, t)),
            (q.clone(), q.clone())
                .prop_filter("distinct qubits", |(c, t)| c != t)
                .prop_map(|(c, t)| Op::Cx(c, t)),
            q.clone().prop_map(Op::Measure),
            q.prop_map(Op::Reset),
            Just(Op::Barrier),
        ]
        .boxed()
    }
}

fn arb_program() -> impl Strategy<Value = (u32, Vec<Op>)> {
    (1u32..=5).prop_flat_map(|num_qubits| {
        (
            Just(num_qubits),
            prop::collection::vec(arb_op(num_qubits), 0..=20),
        )
    })
}

fn render(num_qubits: u32, ops: &[Op]) -> String {
    let mut source = format!(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[{num_qubits}];\ncreg c[{num_qubits}];\n"
    );
    for op in ops {
        source.push_str(&op.emit());
        source.push('\n');
    }
    source
}

proptest! {
    #[test]
    fn generated_programs_parse((num_qubits, ops) in arb_program()) {
        let source = render(num_qubits, &ops);
        let circuit = parse(&source).unwrap();

        prop_assert_eq!(circuit.num_qubits(), num_qubits);
        let expected_ops: usize = ops.iter().map(Op::lowered_len).sum();
        prop_assert_eq!(circuit.num_operations(), expected_ops);

        let has_collapse = ops.iter().any(|op| matches!(op, Op::Measure(_) | Op::Reset(_)));
        prop_assert_eq!(circuit.is_unitary(), !has_collapse);
    }

    #[test]
    fn parsing_is_deterministic((num_qubits, ops) in arb_program()) {
        let source = render(num_qubits, &ops);
        let first = parse(&source).unwrap();
        let second = parse(&source).unwrap();
        prop_assert_eq!(first, second);
    }
}
