//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// The whitelisted gate set.
///
/// Rotation parameters are concrete radians; OpenQASM 2.0 angle expressions
/// are folded to `f64` during lowering, so the IR never carries symbols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// U1(λ), the phase gate under its legacy name.
    U1(f64),
    /// U2(φ, λ) = U3(π/2, φ, λ).
    U2(f64, f64),
    /// Universal single-qubit gate U3(θ, φ, λ).
    U3(f64, f64, f64),

    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,

    /// Toffoli gate (CCX).
    CCX,
}

impl StandardGate {
    /// Get the OpenQASM name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U1(_) => "u1",
            StandardGate::U2(_, _) => "u2",
            StandardGate::U3(_, _, _) => "u3",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U1(_)
            | StandardGate::U2(_, _)
            | StandardGate::U3(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap => 2,

            StandardGate::CCX => 3,
        }
    }

    /// Get the rotation parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(a)
            | StandardGate::Ry(a)
            | StandardGate::Rz(a)
            | StandardGate::P(a)
            | StandardGate::U1(a) => vec![*a],
            StandardGate::U2(a, b) => vec![*a, *b],
            StandardGate::U3(a, b, c) => vec![*a, *b, *c],
            _ => vec![],
        }
    }

    /// The 2×2 matrix of a single-qubit gate, or `None` for multi-qubit gates.
    pub fn single_qubit_matrix(&self) -> Option<[[Complex64; 2]; 2]> {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();

        Some(match self {
            StandardGate::I => [[one, zero], [zero, one]],
            StandardGate::X => [[zero, one], [one, zero]],
            StandardGate::Y => [[zero, -i], [i, zero]],
            StandardGate::Z => [[one, zero], [zero, -one]],
            StandardGate::H => [
                [sqrt2_inv * one, sqrt2_inv * one],
                [sqrt2_inv * one, -sqrt2_inv * one],
            ],
            StandardGate::S => [[one, zero], [zero, i]],
            StandardGate::Sdg => [[one, zero], [zero, -i]],
            StandardGate::T => [[one, zero], [zero, Complex64::from_polar(1.0, FRAC_PI_4)]],
            StandardGate::Tdg => [[one, zero], [zero, Complex64::from_polar(1.0, -FRAC_PI_4)]],
            StandardGate::SX => {
                let p = Complex64::new(0.5, 0.5);
                let m = Complex64::new(0.5, -0.5);
                [[p, m], [m, p]]
            }
            StandardGate::Rx(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                [[c, s], [s, c]]
            }
            StandardGate::Ry(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                [[c, -s], [s, c]]
            }
            StandardGate::Rz(theta) => [
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)],
            ],
            StandardGate::P(lambda) | StandardGate::U1(lambda) => {
                [[one, zero], [zero, Complex64::from_polar(1.0, *lambda)]]
            }
            StandardGate::U2(phi, lambda) => u3_matrix(FRAC_PI_2, *phi, *lambda),
            StandardGate::U3(theta, phi, lambda) => u3_matrix(*theta, *phi, *lambda),
            _ => return None,
        })
    }

    /// For a controlled gate, the 2×2 matrix applied to the target when the
    /// control is set. `None` for everything else (including SWAP and CCX,
    /// which are permutations rather than controlled single-qubit blocks).
    pub fn controlled_target_matrix(&self) -> Option<[[Complex64; 2]; 2]> {
        match self {
            StandardGate::CX => StandardGate::X.single_qubit_matrix(),
            StandardGate::CY => StandardGate::Y.single_qubit_matrix(),
            StandardGate::CZ => StandardGate::Z.single_qubit_matrix(),
            StandardGate::CH => StandardGate::H.single_qubit_matrix(),
            _ => None,
        }
    }
}

/// U3(θ, φ, λ) in the OpenQASM convention.
fn u3_matrix(theta: f64, phi: f64, lambda: f64) -> [[Complex64; 2]; 2] {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [
        [
            Complex64::new(c, 0.0),
            -Complex64::from_polar(1.0, lambda) * s,
        ],
        [
            Complex64::from_polar(1.0, phi) * s,
            Complex64::from_polar(1.0, phi + lambda) * c,
        ],
    ]
}
