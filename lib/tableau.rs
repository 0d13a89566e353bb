//! *N*-qubit stabilizer states in the Aaronson-Gottesman tableau
//! representation.
//!
//! A stabilizer state is identified by *N* commuting *N*-qubit Pauli operators
//! that stabilize it. Along with *N* complementary "destabilizers" these
//! generate the full *N*-qubit Pauli group, and keeping both around lets
//! single-qubit Z-basis measurements run in *O*(*N*<sup>2</sup>) time. Each
//! row of the tableau stores one Pauli string as a pair of bit vectors (one for
//! the X part, one for the Z part) plus a sign; all generators of the Clifford
//! group then act as bitwise updates on a single column (or pair of columns).
//!
//! Rows `0..n` hold the destabilizers, rows `n..2n` the stabilizers, and row
//! `2n` is scratch space for deterministic measurements. Bits are packed into
//! `u32`s, so each row is `n / 32 + 1` words wide.
//!
//! See [arXiv:quant-ph/0406196][tableau] and the accompanying [CHP][chp]
//! program.
//!
//! # Example
//! ```
//! use rand::{ SeedableRng, rngs::StdRng };
//! use stim_backend::tableau::Tableau;
//!
//! let mut rng = StdRng::seed_from_u64(10546);
//! let mut tab = Tableau::new(2);
//! tab.h(0).cx(0, 1);
//! let stab: Vec<String>
//!     = tab.stabilizers().iter().map(|s| s.to_string()).collect();
//! assert_eq!(stab, ["+XX", "+ZZ"]);
//!
//! let a = tab.measure(0, &mut rng);
//! let b = tab.measure(1, &mut rng);
//! assert!(a.is_random() && !b.is_random());
//! assert_eq!(a.is_1(), b.is_1());
//! ```
//!
//! [tableau]: https://arxiv.org/abs/quant-ph/0406196
//! [chp]: https://www.scottaaronson.com/chp/

use std::fmt;
use nalgebra as na;
use rand::Rng;
use crate::gate::{ Pauli, Phase };

const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

// word index and bit mask for the `k`-th qubit
#[inline]
fn loc(k: usize) -> (usize, u32) { (k >> 5, PW[k & 31]) }

/// A stabilizer state of a fixed number of qubits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tableau {
    n: usize,
    // X and Z bits; each (2n + 1) × (n / 32 + 1)
    x: na::DMatrix<u32>,
    z: na::DMatrix<u32>,
    // signs of each row as powers of i; always 0 or 2 outside of intermediate
    // products; size 2n + 1
    r: na::DVector<u8>,
}

impl Tableau {
    /// Create a new state of `n` qubits initialized to ∣0...0⟩.
    pub fn new(n: usize) -> Self {
        let words: usize = (n >> 5) + 1;
        let mut x: na::DMatrix<u32> = na::DMatrix::zeros(2 * n + 1, words);
        let mut z: na::DMatrix<u32> = na::DMatrix::zeros(2 * n + 1, words);
        let r: na::DVector<u8> = na::DVector::zeros(2 * n + 1);
        for k in 0..n {
            let (k5, pw) = loc(k);
            x[(k, k5)] = pw;
            z[(k + n, k5)] = pw;
        }
        Self { n, x, z, r }
    }

    /// Number of qubits.
    pub fn n(&self) -> usize { self.n }

    fn in_range(&self, k: usize) -> bool { k < self.n }

    fn in_range2(&self, a: usize, b: usize) -> bool {
        a < self.n && b < self.n && a != b
    }

    #[inline]
    fn flip_sign(&mut self, i: usize) { self.r[i] = (self.r[i] + 2) % 4; }

    fn h_unchecked(&mut self, k: usize) -> &mut Self {
        let (k5, pw) = loc(k);
        for i in 0..2 * self.n {
            let xi = self.x[(i, k5)] & pw;
            let zi = self.z[(i, k5)] & pw;
            if xi != 0 && zi != 0 { self.flip_sign(i); }
            self.x[(i, k5)] ^= xi ^ zi;
            self.z[(i, k5)] ^= xi ^ zi;
        }
        self
    }

    fn s_unchecked(&mut self, k: usize) -> &mut Self {
        let (k5, pw) = loc(k);
        for i in 0..2 * self.n {
            let xi = self.x[(i, k5)] & pw;
            if xi != 0 && self.z[(i, k5)] & pw != 0 { self.flip_sign(i); }
            self.z[(i, k5)] ^= xi;
        }
        self
    }

    // conjugation by a Pauli flips the sign of every row containing an
    // anticommuting component on `k`
    fn pauli_unchecked(&mut self, k: usize, p: Pauli) -> &mut Self {
        let (k5, pw) = loc(k);
        for i in 0..2 * self.n {
            let here = Pauli::from_xz(self.x[(i, k5)] & pw != 0, self.z[(i, k5)] & pw != 0);
            if !here.commutes_with(p) { self.flip_sign(i); }
        }
        self
    }

    fn cx_unchecked(&mut self, a: usize, b: usize) -> &mut Self {
        let (a5, pwa) = loc(a);
        let (b5, pwb) = loc(b);
        for i in 0..2 * self.n {
            let xa = self.x[(i, a5)] & pwa != 0;
            let zb = self.z[(i, b5)] & pwb != 0;
            // sign flips when x_a z_b (x_b XOR z_a XOR 1) = 1
            if xa && zb {
                let xb = self.x[(i, b5)] & pwb != 0;
                let za = self.z[(i, a5)] & pwa != 0;
                if xb == za { self.flip_sign(i); }
            }
            if xa { self.x[(i, b5)] ^= pwb; }
            if zb { self.z[(i, a5)] ^= pwa; }
        }
        self
    }

    fn swap_unchecked(&mut self, a: usize, b: usize) -> &mut Self {
        let (a5, pwa) = loc(a);
        let (b5, pwb) = loc(b);
        for i in 0..2 * self.n {
            for m in [&mut self.x, &mut self.z] {
                let ba = m[(i, a5)] & pwa != 0;
                let bb = m[(i, b5)] & pwb != 0;
                if ba != bb {
                    m[(i, a5)] ^= pwa;
                    m[(i, b5)] ^= pwb;
                }
            }
        }
        self
    }

    /// Apply a Hadamard gate to the `k`-th qubit.
    pub fn h(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.h_unchecked(k)
    }

    /// Apply an S = √Z gate to the `k`-th qubit.
    pub fn s(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.s_unchecked(k)
    }

    /// Apply an S<sup>†</sup> gate to the `k`-th qubit.
    pub fn s_dag(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.s_unchecked(k).pauli_unchecked(k, Pauli::Z)
    }

    /// Apply an X gate to the `k`-th qubit.
    pub fn x(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.pauli_unchecked(k, Pauli::X)
    }

    /// Apply a Y gate to the `k`-th qubit.
    pub fn y(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.pauli_unchecked(k, Pauli::Y)
    }

    /// Apply a Z gate to the `k`-th qubit.
    pub fn z(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.pauli_unchecked(k, Pauli::Z)
    }

    /// Apply a √X gate to the `k`-th qubit.
    pub fn sqrt_x(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.h_unchecked(k).s_unchecked(k).h_unchecked(k)
    }

    /// Apply a √X<sup>†</sup> gate to the `k`-th qubit.
    pub fn sqrt_x_dag(&mut self, k: usize) -> &mut Self {
        if !self.in_range(k) { return self; }
        self.h_unchecked(k)
            .s_unchecked(k)
            .pauli_unchecked(k, Pauli::Z)
            .h_unchecked(k)
    }

    /// Apply a CNOT gate to the `b`-th qubit, with the `a`-th qubit as control.
    pub fn cx(&mut self, a: usize, b: usize) -> &mut Self {
        if !self.in_range2(a, b) { return self; }
        self.cx_unchecked(a, b)
    }

    /// Apply a controlled-Y gate to the `b`-th qubit, with the `a`-th qubit as
    /// control.
    pub fn cy(&mut self, a: usize, b: usize) -> &mut Self {
        if !self.in_range2(a, b) { return self; }
        self.s_unchecked(b).pauli_unchecked(b, Pauli::Z)
            .cx_unchecked(a, b)
            .s_unchecked(b)
    }

    /// Apply a CZ gate to the `a`-th and `b`-th qubits.
    pub fn cz(&mut self, a: usize, b: usize) -> &mut Self {
        if !self.in_range2(a, b) { return self; }
        self.h_unchecked(b).cx_unchecked(a, b).h_unchecked(b)
    }

    /// Apply a SWAP gate to the `a`-th and `b`-th qubits.
    pub fn swap(&mut self, a: usize, b: usize) -> &mut Self {
        if !self.in_range2(a, b) { return self; }
        self.swap_unchecked(a, b)
    }

    /// Apply an iSWAP gate to the `a`-th and `b`-th qubits.
    pub fn iswap(&mut self, a: usize, b: usize) -> &mut Self {
        if !self.in_range2(a, b) { return self; }
        self.h_unchecked(a)
            .cx_unchecked(a, b)
            .cx_unchecked(b, a)
            .h_unchecked(b)
            .s_unchecked(a)
            .s_unchecked(b)
    }

    // set row `b` equal to row `a`
    fn row_copy(&mut self, a: usize, b: usize) {
        for j in 0..self.x.ncols() {
            self.x[(b, j)] = self.x[(a, j)];
            self.z[(b, j)] = self.z[(a, j)];
        }
        self.r[b] = self.r[a];
    }

    // set row `b` to the single-qubit Z operator on qubit `k`
    fn row_set_z(&mut self, k: usize, b: usize) {
        self.x.fill_row(b, 0);
        self.z.fill_row(b, 0);
        self.r[b] = 0;
        let (k5, pw) = loc(k);
        self.z[(b, k5)] = pw;
    }

    // phase (as a power of i) of the product (row a) × (row b)
    fn row_mul_phase(&self, a: usize, b: usize) -> u8 {
        let mut e: i32 = 0;
        for j in 0..self.x.ncols() {
            let (xa, za) = (self.x[(a, j)], self.z[(a, j)]);
            let (xb, zb) = (self.x[(b, j)], self.z[(b, j)]);
            for &pw in PW.iter() {
                let pa = Pauli::from_xz(xa & pw != 0, za & pw != 0);
                let pb = Pauli::from_xz(xb & pw != 0, zb & pw != 0);
                // cyclic X -> Y -> Z products contribute +i, anticyclic -i
                e += match (pa, pb) {
                    (Pauli::X, Pauli::Y) | (Pauli::Y, Pauli::Z) | (Pauli::Z, Pauli::X) => 1,
                    (Pauli::X, Pauli::Z) | (Pauli::Y, Pauli::X) | (Pauli::Z, Pauli::Y) => -1,
                    _ => 0,
                };
            }
        }
        (e + i32::from(self.r[a]) + i32::from(self.r[b])).rem_euclid(4) as u8
    }

    // left-multiply row `b` by row `a`
    fn row_mul(&mut self, a: usize, b: usize) {
        self.r[b] = self.row_mul_phase(a, b);
        for j in 0..self.x.ncols() {
            let (xa, za) = (self.x[(a, j)], self.z[(a, j)]);
            self.x[(b, j)] ^= xa;
            self.z[(b, j)] ^= za;
        }
    }

    /// Perform a projective measurement of the `k`-th qubit in the Z basis.
    ///
    /// The outcome is random if some stabilizer anticommutes with Z on `k`, in
    /// which case it is drawn from `rng`. Out-of-bounds indices give a
    /// deterministic 0 and leave the state unchanged.
    pub fn measure<R>(&mut self, k: usize, rng: &mut R) -> Outcome
    where R: Rng + ?Sized
    {
        if !self.in_range(k) { return Outcome::Det0; }
        let n = self.n;
        let (k5, pw) = loc(k);

        let maybe_p = (n..2 * n).find(|&i| self.x[(i, k5)] & pw != 0);
        if let Some(p) = maybe_p {
            // the old stabilizer becomes the destabilizer of the new one
            self.row_copy(p, p - n);
            self.row_set_z(k, p);
            self.r[p] = 2 * u8::from(rng.gen::<bool>());
            for i in 0..2 * n {
                if i != p - n && i != p && self.x[(i, k5)] & pw != 0 {
                    self.row_mul(p - n, i);
                }
            }
            if self.r[p] != 0 { Outcome::Rand1 } else { Outcome::Rand0 }
        } else {
            // Z_k is in the stabilizer group: accumulate its sign in the
            // scratch row from every stabilizer whose destabilizer
            // anticommutes with it
            let scratch = 2 * n;
            let maybe_m = (0..n).find(|&i| self.x[(i, k5)] & pw != 0);
            let Some(m) = maybe_m else { return Outcome::Det0; };
            self.row_copy(m + n, scratch);
            for i in m + 1..n {
                if self.x[(i, k5)] & pw != 0 { self.row_mul(i + n, scratch); }
            }
            if self.r[scratch] != 0 { Outcome::Det1 } else { Outcome::Det0 }
        }
    }

    /// Reset the `k`-th qubit to ∣0⟩ by measuring it and flipping it if the
    /// result was 1.
    pub fn reset<R>(&mut self, k: usize, rng: &mut R) -> &mut Self
    where R: Rng + ?Sized
    {
        if self.measure(k, rng).is_1() { self.x(k); }
        self
    }

    fn row_pauli(&self, i: usize) -> NPauli {
        let ops: Vec<Pauli>
            = (0..self.n)
            .map(|j| {
                let (j5, pw) = loc(j);
                Pauli::from_xz(self.x[(i, j5)] & pw != 0, self.z[(i, j5)] & pw != 0)
            })
            .collect();
        NPauli { phase: Phase::from_int(self.r[i] as i8), ops }
    }

    /// Return the current set of stabilizer generators.
    pub fn stabilizers(&self) -> Vec<NPauli> {
        (self.n..2 * self.n).map(|i| self.row_pauli(i)).collect()
    }

    /// Return the current set of destabilizers.
    pub fn destabilizers(&self) -> Vec<NPauli> {
        (0..self.n).map(|i| self.row_pauli(i)).collect()
    }
}

/// A single `n`-qubit Pauli operator with a phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NPauli {
    pub phase: Phase,
    pub ops: Vec<Pauli>,
}

impl fmt::Display for NPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.phase.fmt(f)?;
        self.ops.iter().try_for_each(|p| p.fmt(f))
    }
}

/// The result of a measurement, generated by [`Tableau::measure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A deterministic outcome resulting in ∣0⟩
    Det0,
    /// A deterministic outcome resulting in ∣1⟩
    Det1,
    /// A random outcome resulting in ∣0⟩
    Rand0,
    /// A random outcome resulting in ∣1⟩
    Rand1,
}

impl Outcome {
    /// Returns `true` if `self` is `Det0` or `Rand0`.
    pub fn is_0(&self) -> bool { matches!(self, Self::Det0 | Self::Rand0) }

    /// Returns `true` if `self` is `Det1` or `Rand1`.
    pub fn is_1(&self) -> bool { matches!(self, Self::Det1 | Self::Rand1) }

    pub fn is_random(&self) -> bool { matches!(self, Self::Rand0 | Self::Rand1) }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ SeedableRng, rngs::StdRng };

    fn stab_strings(tab: &Tableau) -> Vec<String> {
        tab.stabilizers().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn initial_state() {
        let tab = Tableau::new(3);
        assert_eq!(stab_strings(&tab), ["+Z__", "+_Z_", "+__Z"]);
        let destab: Vec<String>
            = tab.destabilizers().iter().map(|s| s.to_string()).collect();
        assert_eq!(destab, ["+X__", "+_X_", "+__X"]);
    }

    #[test]
    fn single_qubit_conjugation() {
        let mut tab = Tableau::new(1);
        tab.h(0);
        assert_eq!(stab_strings(&tab), ["+X"]);
        tab.s(0);
        assert_eq!(stab_strings(&tab), ["+Y"]);
        tab.s(0);
        assert_eq!(stab_strings(&tab), ["-X"]);
        tab.s_dag(0).s_dag(0).h(0).x(0);
        assert_eq!(stab_strings(&tab), ["-Z"]);
        tab.y(0);
        assert_eq!(stab_strings(&tab), ["+Z"]);
        tab.sqrt_x(0);
        assert_eq!(stab_strings(&tab), ["-Y"]);
        tab.sqrt_x_dag(0);
        assert_eq!(stab_strings(&tab), ["+Z"]);
    }

    #[test]
    fn bell_state() {
        let mut tab = Tableau::new(2);
        tab.h(0).cx(0, 1);
        assert_eq!(stab_strings(&tab), ["+XX", "+ZZ"]);
        tab.z(1);
        assert_eq!(stab_strings(&tab), ["-XX", "+ZZ"]);
    }

    #[test]
    fn two_qubit_conjugation() {
        // CZ: X_ -> XZ
        let mut tab = Tableau::new(2);
        tab.h(0).cz(0, 1);
        assert_eq!(stab_strings(&tab), ["+XZ", "+_Z"]);
        // CY: X_ -> XY, _Z -> ZZ
        let mut tab = Tableau::new(2);
        tab.h(0).cy(0, 1);
        assert_eq!(stab_strings(&tab), ["+XY", "+ZZ"]);
        // SWAP
        let mut tab = Tableau::new(2);
        tab.h(0).swap(0, 1);
        assert_eq!(stab_strings(&tab), ["+_X", "+Z_"]);
        // iSWAP: X_ -> ZY, _Z -> Z_
        let mut tab = Tableau::new(2);
        tab.h(0).iswap(0, 1);
        assert_eq!(stab_strings(&tab), ["+ZY", "+Z_"]);
    }

    #[test]
    fn invalid_indices_ignored() {
        let mut tab = Tableau::new(2);
        let init = tab.clone();
        tab.h(2).cx(0, 0).cz(1, 5).swap(3, 3).iswap(1, 1);
        assert_eq!(tab, init);
    }

    #[test]
    fn deterministic_measurement() {
        let mut rng = StdRng::seed_from_u64(10546);
        let mut tab = Tableau::new(3);
        tab.x(1);
        assert_eq!(tab.measure(0, &mut rng), Outcome::Det0);
        assert_eq!(tab.measure(1, &mut rng), Outcome::Det1);
        tab.h(2).s(2).s(2).h(2);
        assert_eq!(tab.measure(2, &mut rng), Outcome::Det1);
    }

    #[test]
    fn random_measurement_collapses() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..50 {
            let mut tab = Tableau::new(3);
            tab.h(0).cx(0, 1).cx(1, 2);
            let a = tab.measure(2, &mut rng);
            assert!(a.is_random());
            let b = tab.measure(0, &mut rng);
            let c = tab.measure(1, &mut rng);
            assert!(!b.is_random() && !c.is_random());
            assert_eq!(a.is_1(), b.is_1());
            assert_eq!(a.is_1(), c.is_1());
            assert_eq!(tab.measure(2, &mut rng).is_1(), a.is_1());
        }
    }

    #[test]
    fn random_outcomes_both_occur() {
        let mut rng = StdRng::seed_from_u64(10546);
        let ones
            = (0..200)
            .filter(|_| {
                let mut tab = Tableau::new(1);
                tab.h(0);
                tab.measure(0, &mut rng).is_1()
            })
            .count();
        assert!(ones > 50 && ones < 150);
    }

    #[test]
    fn reset_to_zero() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..20 {
            let mut tab = Tableau::new(2);
            tab.h(0).cx(0, 1).reset(0, &mut rng);
            assert_eq!(tab.measure(0, &mut rng), Outcome::Det0);
        }
    }

    #[test]
    fn wide_register() {
        let mut rng = StdRng::seed_from_u64(10546);
        let n = 70;
        let mut tab = Tableau::new(n);
        tab.h(0);
        for k in 0..n - 1 { tab.cx(k, k + 1); }
        let first = tab.measure(n - 1, &mut rng);
        assert!(first.is_random());
        assert!((0..n - 1).all(|k| {
            let o = tab.measure(k, &mut rng);
            !o.is_random() && o.is_1() == first.is_1()
        }));
    }
}
