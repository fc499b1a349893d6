//! Dense statevector engine.
//!
//! Shared by the unitary and trajectory pipelines: gate kernels mutate the
//! amplitude vector in place, projective collapse consumes an externally
//! drawn uniform variate, and per-qubit reduced density matrices come out of
//! a Gram product over the `2 × 2^(n−1)` view of the state.

use num_complex::Complex64;
use std::collections::TryReserveError;
use std::f64::consts::FRAC_PI_2;

use orrery_ir::{QubitId, StandardGate};

use crate::math::Rdm;

/// A pure state on `n` qubits: `2^n` complex amplitudes, basis index bit `i`
/// encoding qubit `i`.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: u32,
}

impl Statevector {
    /// Allocate `|0…0⟩`. Allocation is fallible so an oversized request
    /// surfaces as an error instead of an abort.
    pub fn try_new(num_qubits: u32) -> Result<Self, TryReserveError> {
        let size = 1usize << num_qubits;
        let mut amplitudes = Vec::new();
        amplitudes.try_reserve_exact(size)?;
        amplitudes.resize(size, Complex64::new(0.0, 0.0));
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Apply a whitelisted gate to the given operands.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[QubitId]) {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0].index()),
            StandardGate::Y => self.apply_y(qubits[0].index()),
            StandardGate::Z => self.apply_z(qubits[0].index()),
            StandardGate::H => self.apply_h(qubits[0].index()),
            StandardGate::S => self.apply_phase(qubits[0].index(), FRAC_PI_2),
            StandardGate::Sdg => self.apply_phase(qubits[0].index(), -FRAC_PI_2),
            StandardGate::T => self.apply_phase(qubits[0].index(), FRAC_PI_2 / 2.0),
            StandardGate::Tdg => self.apply_phase(qubits[0].index(), -FRAC_PI_2 / 2.0),
            StandardGate::SX => self.apply_rx(qubits[0].index(), FRAC_PI_2),
            StandardGate::Rx(theta) => self.apply_rx(qubits[0].index(), *theta),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0].index(), *theta),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0].index(), *theta),
            StandardGate::P(lambda) | StandardGate::U1(lambda) => {
                self.apply_phase(qubits[0].index(), *lambda);
            }
            StandardGate::U2(phi, lambda) => {
                self.apply_u(qubits[0].index(), FRAC_PI_2, *phi, *lambda);
            }
            StandardGate::U3(theta, phi, lambda) => {
                self.apply_u(qubits[0].index(), *theta, *phi, *lambda);
            }
            StandardGate::CX => self.apply_cx(qubits[0].index(), qubits[1].index()),
            StandardGate::CY => self.apply_cy(qubits[0].index(), qubits[1].index()),
            StandardGate::CZ => self.apply_cz(qubits[0].index(), qubits[1].index()),
            StandardGate::CH => self.apply_ch(qubits[0].index(), qubits[1].index()),
            StandardGate::Swap => self.apply_swap(qubits[0].index(), qubits[1].index()),
            StandardGate::CCX => {
                self.apply_ccx(qubits[0].index(), qubits[1].index(), qubits[2].index());
            }
        }
    }

    // =========================================================================
    // Single-qubit gate kernels
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.dim() {
            if i & mask != 0 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..self.dim() {
            if i & mask != 0 {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..self.dim() {
            if i & mask == 0 {
                self.amplitudes[i] *= phase_0;
            } else {
                self.amplitudes[i] *= phase_1;
            }
        }
    }

    fn apply_u(&mut self, qubit: usize, theta: f64, phi: f64, lambda: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let e_il = Complex64::from_polar(1.0, lambda);
        let e_ip = Complex64::from_polar(1.0, phi);
        let e_ipl = Complex64::from_polar(1.0, phi + lambda);

        for i in 0..self.dim() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - e_il * s * b;
                self.amplitudes[j] = e_ip * s * a + e_ipl * c * b;
            }
        }
    }

    // =========================================================================
    // Multi-qubit gate kernels
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.dim() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cy(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.dim() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.dim() {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_ch(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.dim() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.dim() {
            let b1 = (i & mask1) != 0;
            let b2 = (i & mask2) != 0;
            if b1 && !b2 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1 << c1;
        let c2_mask = 1 << c2;
        let tgt_mask = 1 << target;
        for i in 0..self.dim() {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Collapse operations
    // =========================================================================

    /// Probability of measuring `qubit` as 0.
    pub fn probability_of_zero(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        let mut p0 = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            if i & mask == 0 {
                p0 += amp.norm_sqr();
            }
        }
        p0
    }

    /// Projective measurement of `qubit`, driven by the uniform draw
    /// `u ∈ [0, 1)`. Zeroes the losing branch and rescales the survivor.
    /// Returns the outcome bit.
    ///
    /// When `p0` is exactly 0 or 1 the surviving branch already has unit
    /// weight and no scaling happens, so degenerate draws cannot divide by
    /// zero.
    pub fn collapse(&mut self, qubit: usize, u: f64) -> u8 {
        let mask = 1 << qubit;
        let p0 = self.probability_of_zero(qubit);
        let outcome = u8::from(u >= p0);

        let keep_prob = if outcome == 0 { p0 } else { 1.0 - p0 };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let bit = u8::from(i & mask != 0);
            if bit != outcome {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        if keep_prob > 0.0 && (keep_prob - 1.0).abs() > f64::EPSILON {
            let scale = 1.0 / keep_prob.sqrt();
            for amp in &mut self.amplitudes {
                *amp *= scale;
            }
        }
        outcome
    }

    /// Reset `qubit` to |0⟩: measure, then flip if the outcome was 1.
    pub fn reset(&mut self, qubit: usize, u: f64) {
        if self.collapse(qubit, u) == 1 {
            self.apply_x(qubit);
        }
    }

    // =========================================================================
    // Reduced density matrix extraction
    // =========================================================================

    /// Reduced density matrix of `qubit`.
    ///
    /// Viewing ψ as a `2 × 2^(n−1)` matrix `V` with the target qubit on the
    /// row axis, this computes the Gram product `ρ = V·V†` directly: entry
    /// `[a][b]` sums `ψ[a⊕k]·conj(ψ[b⊕k])` over the `2^(n−1)` configurations
    /// `k` of the remaining qubits. O(2^n) time, no larger intermediate.
    pub fn reduced_density(&self, qubit: usize) -> Rdm {
        let mask = 1 << qubit;
        let low_mask = mask - 1;

        let mut rho00 = Complex64::new(0.0, 0.0);
        let mut rho01 = Complex64::new(0.0, 0.0);
        let mut rho11 = Complex64::new(0.0, 0.0);

        for k in 0..(self.dim() >> 1) {
            let low = k & low_mask;
            let high = (k & !low_mask) << 1;
            let i0 = high | low;
            let i1 = i0 | mask;

            let a = self.amplitudes[i0];
            let b = self.amplitudes[i1];
            rho00 += a * a.conj();
            rho01 += a * b.conj();
            rho11 += b * b.conj();
        }

        [[rho00, rho01], [rho01.conj(), rho11]]
    }

    /// Σ|ψ_b|² over the full register.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }
}
