//! Operation kinds, Pauli operators, and phases.
//!
//! All angles are given in half-turns, i.e. as multiples of π, so that
//! `Rz(0.5)` is a quarter-turn about Z and differs from [`OpType::S`] only by a
//! global phase. Single-qubit rotations are
//!
//! | Kind      | Matrix                                  |
//! | :-------- | :-------------------------------------- |
//! | `Rz(θ)`   | exp(-iπθ *Z* / 2)                      |
//! | `Rx(θ)`   | exp(-iπθ *X* / 2)                      |
//! | `Ry(θ)`   | exp(-iπθ *Y* / 2)                      |
//! | `TK1(a, b, c)` | `Rz(a)` · `Rx(b)` · `Rz(c)`       |
//!
//! so that in a `TK1`, the `c` rotation is applied first.

use std::{
    fmt,
    ops::{ Neg, Add, AddAssign, Sub, SubAssign },
    str::FromStr,
};
use nalgebra as na;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::error::Error;

/// The argument of a complex phase factor, limited to integer multiples of
/// π/2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// 0
    Pi0,
    /// π/2
    Pi1h,
    /// π
    Pi,
    /// 3π/2
    Pi3h,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pi0 => write!(f, "+"),
            Self::Pi1h => write!(f, "+i"),
            Self::Pi => write!(f, "-"),
            Self::Pi3h => write!(f, "-i"),
        }
    }
}

impl Phase {
    /// Convert to the bare multiple of π/2.
    pub fn to_int(&self) -> u8 {
        match self {
            Self::Pi0  => 0,
            Self::Pi1h => 1,
            Self::Pi   => 2,
            Self::Pi3h => 3,
        }
    }

    /// Convert from a bare multiple of π/2 (modulo 4).
    pub fn from_int(i: i8) -> Self {
        match i.rem_euclid(4) {
            0 => Self::Pi0,
            1 => Self::Pi1h,
            2 => Self::Pi,
            3 => Self::Pi3h,
            _ => unreachable!(),
        }
    }

    pub fn as_complex(self) -> C64 {
        match self {
            Self::Pi0  => 1.0_f64.into(),
            Self::Pi1h => C64::i(),
            Self::Pi   => (-1.0_f64).into(),
            Self::Pi3h => -C64::i(),
        }
    }
}

impl Neg for Phase {
    type Output = Self;

    fn neg(self) -> Self::Output { Self::from_int(-(self.to_int() as i8)) }
}

macro_rules! impl_phase_math {
    (
        $trait:ident,
        $trait_fn:ident,
        $trait_assign:ident,
        $trait_assign_fn:ident,
        $op:tt
    ) => {
        impl $trait for Phase {
            type Output = Self;

            fn $trait_fn(self, rhs: Self) -> Self::Output {
                Self::from_int(self.to_int() as i8 $op rhs.to_int() as i8)
            }
        }

        impl $trait_assign for Phase {
            fn $trait_assign_fn(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    }
}
impl_phase_math!(Add, add, AddAssign, add_assign, +);
impl_phase_math!(Sub, sub, SubAssign, sub_assign, -);

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "_" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Return `true` if `self` and `other` commute.
    pub fn commutes_with(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::I) => true,
            (Self::I, _) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }

    /// Build from (x, z) bits of the symplectic representation.
    pub fn from_xz(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => Self::I,
            (true,  false) => Self::X,
            (true,  true ) => Self::Y,
            (false, true ) => Self::Z,
        }
    }
}

/// Kind of operation that can appear in a [`Circuit`][crate::circuit::Circuit].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum OpType {
    /// Identity
    #[serde(rename = "noop")]
    Noop,
    /// π rotation about X
    X,
    /// π rotation about Y
    Y,
    /// π rotation about Z
    Z,
    /// Hadamard
    H,
    /// π/2 rotation about Z
    S,
    /// -π/2 rotation about Z
    Sdg,
    /// π/4 rotation about Z
    T,
    /// -π/4 rotation about Z
    Tdg,
    /// Square root of X
    SX,
    /// Inverse square root of X
    SXdg,
    /// `Rx(1/2)`
    V,
    /// `Rx(-1/2)`
    Vdg,
    /// Parameterized rotation about X
    Rx,
    /// Parameterized rotation about Y
    Ry,
    /// Parameterized rotation about Z
    Rz,
    /// Generic single-qubit rotation `Rz(a) Rx(b) Rz(c)`
    TK1,
    /// Z-controlled π rotation about X; the first qubit is the control.
    CX,
    /// Z-controlled π rotation about Y; the first qubit is the control.
    CY,
    /// Z-controlled π rotation about Z.
    CZ,
    /// Maximal iSWAP, mapping ∣01⟩ → i∣10⟩.
    ISWAPMax,
    /// Swap
    SWAP,
    /// Z-basis measurement, writing to one bit.
    Measure,
    /// Reset to ∣0⟩.
    Reset,
    /// Embedded sub-circuit.
    CircBox,
}

impl OpType {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 25] = [
        Self::Noop, Self::X, Self::Y, Self::Z, Self::H, Self::S, Self::Sdg,
        Self::T, Self::Tdg, Self::SX, Self::SXdg, Self::V, Self::Vdg, Self::Rx,
        Self::Ry, Self::Rz, Self::TK1, Self::CX, Self::CY, Self::CZ,
        Self::ISWAPMax, Self::SWAP, Self::Measure, Self::Reset, Self::CircBox,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::H => "H",
            Self::S => "S",
            Self::Sdg => "Sdg",
            Self::T => "T",
            Self::Tdg => "Tdg",
            Self::SX => "SX",
            Self::SXdg => "SXdg",
            Self::V => "V",
            Self::Vdg => "Vdg",
            Self::Rx => "Rx",
            Self::Ry => "Ry",
            Self::Rz => "Rz",
            Self::TK1 => "TK1",
            Self::CX => "CX",
            Self::CY => "CY",
            Self::CZ => "CZ",
            Self::ISWAPMax => "ISWAPMax",
            Self::SWAP => "SWAP",
            Self::Measure => "Measure",
            Self::Reset => "Reset",
            Self::CircBox => "CircBox",
        }
    }

    /// Number of qubits acted on, or `None` for [`Self::CircBox`], whose
    /// arity is that of the embedded circuit.
    pub fn n_qubits(self) -> Option<usize> {
        match self {
            Self::CX | Self::CY | Self::CZ | Self::ISWAPMax | Self::SWAP
                => Some(2),
            Self::CircBox => None,
            _ => Some(1),
        }
    }

    /// Number of classical bits written, or `None` for [`Self::CircBox`].
    pub fn n_bits(self) -> Option<usize> {
        match self {
            Self::Measure => Some(1),
            Self::CircBox => None,
            _ => Some(0),
        }
    }

    /// Number of angle parameters.
    pub fn n_params(self) -> usize {
        match self {
            Self::Rx | Self::Ry | Self::Rz => 1,
            Self::TK1 => 3,
            _ => 0,
        }
    }

    /// Return `true` for unitary gates, i.e. everything but `Measure`,
    /// `Reset`, and `CircBox`.
    pub fn is_gate(self) -> bool {
        !matches!(self, Self::Measure | Self::Reset | Self::CircBox)
    }

    /// Return `true` if a parameterless `self` followed by `other` on the same
    /// qubits is the identity.
    pub fn dagger_of(self, other: Self) -> bool {
        use OpType::*;
        matches!(
            (self, other),
            (X, X) | (Y, Y) | (Z, Z) | (H, H)
            | (CX, CX) | (CY, CY) | (CZ, CZ) | (SWAP, SWAP)
            | (S, Sdg) | (Sdg, S)
            | (T, Tdg) | (Tdg, T)
            | (SX, SXdg) | (SXdg, SX)
            | (V, Vdg) | (Vdg, V)
        )
    }

    /// Return `true` for two-qubit gates that are unchanged when their qubit
    /// arguments are exchanged.
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::CZ | Self::SWAP | Self::ISWAPMax)
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnsupportedOp(s.to_string()))
    }
}

/// 2 × 2 complex matrix.
pub type U2 = na::Matrix2<C64>;

fn rz(t: f64) -> U2 {
    use std::f64::consts::PI;
    let zero = C64::new(0.0, 0.0);
    U2::new(
        C64::cis(-PI * t / 2.0), zero,
        zero, C64::cis(PI * t / 2.0),
    )
}

fn rx(t: f64) -> U2 {
    use std::f64::consts::PI;
    let c = C64::new((PI * t / 2.0).cos(), 0.0);
    let s = C64::new(0.0, -(PI * t / 2.0).sin());
    U2::new(c, s, s, c)
}

fn ry(t: f64) -> U2 {
    use std::f64::consts::PI;
    let c = C64::new((PI * t / 2.0).cos(), 0.0);
    let s = C64::new((PI * t / 2.0).sin(), 0.0);
    U2::new(c, -s, s, c)
}

/// Return the matrix of a single-qubit gate in the Z basis, or `None` if
/// `kind` is not a single-qubit unitary or `params` has the wrong length.
pub fn unitary(kind: OpType, params: &[f64]) -> Option<U2> {
    use std::f64::consts::FRAC_1_SQRT_2;
    if kind.n_qubits() != Some(1) || !kind.is_gate()
        || params.len() != kind.n_params()
    {
        return None;
    }
    let o = C64::new(0.0, 0.0);
    let l = C64::new(1.0, 0.0);
    let i = C64::i();
    let h = C64::new(FRAC_1_SQRT_2, 0.0);
    let sx_p = C64::new(0.5, 0.5);
    let sx_m = C64::new(0.5, -0.5);
    let mat = match kind {
        OpType::Noop => U2::identity(),
        OpType::X => U2::new(o, l, l, o),
        OpType::Y => U2::new(o, -i, i, o),
        OpType::Z => U2::new(l, o, o, -l),
        OpType::H => U2::new(h, h, h, -h),
        OpType::S => U2::new(l, o, o, i),
        OpType::Sdg => U2::new(l, o, o, -i),
        OpType::T => U2::new(l, o, o, C64::cis(std::f64::consts::FRAC_PI_4)),
        OpType::Tdg => U2::new(l, o, o, C64::cis(-std::f64::consts::FRAC_PI_4)),
        OpType::SX => U2::new(sx_p, sx_m, sx_m, sx_p),
        OpType::SXdg => U2::new(sx_m, sx_p, sx_p, sx_m),
        OpType::V => rx(0.5),
        OpType::Vdg => rx(-0.5),
        OpType::Rx => rx(params[0]),
        OpType::Ry => ry(params[0]),
        OpType::Rz => rz(params[0]),
        OpType::TK1 => rz(params[0]) * rx(params[1]) * rz(params[2]),
        _ => unreachable!(),
    };
    Some(mat)
}

/// Return `true` if `a` and `b` are equal up to a global phase.
pub fn equal_up_to_phase(a: &U2, b: &U2, tol: f64) -> bool {
    let (k, _) = b.iter().enumerate()
        .fold((0, 0.0), |(kmax, nmax), (k, bk)| {
            if bk.norm() > nmax { (k, bk.norm()) } else { (kmax, nmax) }
        });
    if b[k].norm() < tol { return a.iter().all(|ak| ak.norm() < tol); }
    let ph = a[k] / b[k];
    if (ph.norm() - 1.0).abs() > tol { return false; }
    a.iter().zip(b.iter()).all(|(ak, bk)| (ak - ph * bk).norm() < tol)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phase_arith() {
        assert_eq!(Phase::Pi1h + Phase::Pi1h, Phase::Pi);
        assert_eq!(Phase::Pi0 - Phase::Pi1h, Phase::Pi3h);
        assert_eq!(-Phase::Pi3h, Phase::Pi1h);
        assert_eq!(Phase::from_int(-2), Phase::Pi);
    }

    #[test]
    fn pauli_commutation() {
        assert!(Pauli::X.commutes_with(Pauli::I));
        assert!(Pauli::Z.commutes_with(Pauli::Z));
        assert!(!Pauli::X.commutes_with(Pauli::Y));
        assert_eq!(Pauli::from_xz(true, true), Pauli::Y);
    }

    #[test]
    fn optype_names_roundtrip() {
        for kind in OpType::ALL {
            assert_eq!(kind.name().parse::<OpType>().unwrap(), kind);
        }
        assert!("CCX".parse::<OpType>().is_err());
    }

    #[test]
    fn arities() {
        assert_eq!(OpType::CX.n_qubits(), Some(2));
        assert_eq!(OpType::Measure.n_bits(), Some(1));
        assert_eq!(OpType::TK1.n_params(), 3);
        assert_eq!(OpType::CircBox.n_qubits(), None);
    }

    #[test]
    fn daggers() {
        assert!(OpType::S.dagger_of(OpType::Sdg));
        assert!(OpType::H.dagger_of(OpType::H));
        assert!(!OpType::S.dagger_of(OpType::S));
        assert!(!OpType::ISWAPMax.dagger_of(OpType::ISWAPMax));
    }

    #[test]
    fn named_gates_as_tk1() {
        let tk1 = |a, b, c| unitary(OpType::TK1, &[a, b, c]).unwrap();
        let u = |k| unitary(k, &[]).unwrap();
        assert!(equal_up_to_phase(&u(OpType::H), &tk1(0.5, 0.5, 0.5), 1e-9));
        assert!(equal_up_to_phase(&u(OpType::Y), &tk1(0.5, 1.0, -0.5), 1e-9));
        assert!(equal_up_to_phase(&u(OpType::SX), &tk1(0.0, 0.5, 0.0), 1e-9));
        assert!(equal_up_to_phase(&u(OpType::S), &tk1(0.5, 0.0, 0.0), 1e-9));
        assert!(!equal_up_to_phase(&u(OpType::S), &u(OpType::Z), 1e-9));
    }

    #[test]
    fn ry_from_tk1() {
        let ry = unitary(OpType::Ry, &[0.3]).unwrap();
        let tk1 = unitary(OpType::TK1, &[0.5, 0.3, -0.5]).unwrap();
        assert!(equal_up_to_phase(&ry, &tk1, 1e-9));
    }

    #[test]
    fn unitary_rejects_non_gates() {
        assert!(unitary(OpType::Measure, &[]).is_none());
        assert!(unitary(OpType::CX, &[]).is_none());
        assert!(unitary(OpType::Rz, &[]).is_none());
    }
}
