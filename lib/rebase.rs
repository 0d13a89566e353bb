//! Decompositions used to rebase circuits onto a small Clifford gate set.
//!
//! Every single-qubit gate is equal, up to a global phase, to some
//! `TK1(a, b, c)` = `Rz(a) Rx(b) Rz(c)`. When all three angles are multiples
//! of a half-turn the rotation is Clifford, and can be written with only *S*
//! and *H* gates, since `Rz(1/2)` is *S* and `Rx(1/2)` is *HSH*, each up to a
//! phase of π/4.

use crate::{
    circuit::Circuit,
    error::{ Error, Result },
    gate::OpType,
};

// absolute and relative tolerances for recognizing multiples of 1/2
const ATOL: f64 = 1e-8;
const RTOL: f64 = 1e-5;

/// Return `(2x) mod 8` if `x` is close to a multiple of 1/2.
///
/// Fails with [`Error::NonCliffordAngle`] otherwise.
pub fn int_double(x: f64) -> Result<u8> {
    let y = 2.0 * x;
    let n = y.round();
    if (y - n).abs() <= ATOL + RTOL * n.abs() {
        Ok((n as i64).rem_euclid(8) as u8)
    } else {
        Err(Error::NonCliffordAngle(x))
    }
}

/// Convert a Clifford `TK1(a, b, c)` to a single-qubit circuit composed of only
/// *H* and *S* gates.
///
/// The circuit applies *S* `2c mod 8` times, then *HSH* `2b mod 8` times, then
/// *S* `2a mod 8` times, with its phase adjusted so that its unitary is exactly
/// that of `TK1(a, b, c)`.
pub fn tk1_to_cliff(a: f64, b: f64, c: f64) -> Result<Circuit> {
    let (n_a, n_b, n_c) = (int_double(a)?, int_double(b)?, int_double(c)?);
    let mut circ = Circuit::new(1, 0);
    for _ in 0..n_c {
        circ.s(0)?;
    }
    for _ in 0..n_b {
        circ.h(0)?.s(0)?.h(0)?;
    }
    for _ in 0..n_a {
        circ.s(0)?;
    }
    circ.add_phase(-0.25 * f64::from(n_a + n_b + n_c));
    Ok(circ)
}

/// Express a single-qubit gate as `TK1(a, b, c)` angles along with the phase
/// (in half-turns) that must be added to recover the exact unitary.
///
/// Returns `None` for anything that is not a single-qubit unitary gate, and for
/// [`OpType::Noop`].
pub fn op_to_tk1(kind: OpType, params: &[f64]) -> Option<([f64; 3], f64)> {
    if params.len() != kind.n_params() { return None; }
    let res
        = match kind {
            OpType::X    => ([0.0, 1.0, 0.0], 0.5),
            OpType::Y    => ([0.5, 1.0, -0.5], 0.5),
            OpType::Z    => ([1.0, 0.0, 0.0], 0.5),
            OpType::H    => ([0.5, 0.5, 0.5], 0.5),
            OpType::S    => ([0.5, 0.0, 0.0], 0.25),
            OpType::Sdg  => ([-0.5, 0.0, 0.0], -0.25),
            OpType::T    => ([0.25, 0.0, 0.0], 0.125),
            OpType::Tdg  => ([-0.25, 0.0, 0.0], -0.125),
            OpType::SX   => ([0.0, 0.5, 0.0], 0.25),
            OpType::SXdg => ([0.0, -0.5, 0.0], -0.25),
            OpType::V    => ([0.0, 0.5, 0.0], 0.0),
            OpType::Vdg  => ([0.0, -0.5, 0.0], 0.0),
            OpType::Rx   => ([0.0, params[0], 0.0], 0.0),
            OpType::Ry   => ([0.5, params[0], -0.5], 0.0),
            OpType::Rz   => ([params[0], 0.0, 0.0], 0.0),
            OpType::TK1  => ([params[0], params[1], params[2]], 0.0),
            _ => { return None; },
        };
    Some(res)
}

/// Express a two-qubit gate as a sequence of CX and single-qubit gates, given
/// as `(kind, argument positions)` in application order.
///
/// All of these are exact, with no additional phase. Returns `None` for
/// anything else, including `CX` itself.
pub fn two_qubit_via_cx(kind: OpType) -> Option<&'static [(OpType, &'static [usize])]> {
    const CY: &[(OpType, &[usize])] = &[
        (OpType::Sdg, &[1]),
        (OpType::CX, &[0, 1]),
        (OpType::S, &[1]),
    ];
    const CZ: &[(OpType, &[usize])] = &[
        (OpType::H, &[1]),
        (OpType::CX, &[0, 1]),
        (OpType::H, &[1]),
    ];
    const SWAP: &[(OpType, &[usize])] = &[
        (OpType::CX, &[0, 1]),
        (OpType::CX, &[1, 0]),
        (OpType::CX, &[0, 1]),
    ];
    const ISWAP: &[(OpType, &[usize])] = &[
        (OpType::H, &[0]),
        (OpType::CX, &[0, 1]),
        (OpType::CX, &[1, 0]),
        (OpType::H, &[1]),
        (OpType::S, &[0]),
        (OpType::S, &[1]),
    ];
    match kind {
        OpType::CY => Some(CY),
        OpType::CZ => Some(CZ),
        OpType::SWAP => Some(SWAP),
        OpType::ISWAPMax => Some(ISWAP),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_complex::Complex64 as C64;
    use crate::gate::{ equal_up_to_phase, unitary, U2 };

    fn circuit_unitary(circ: &Circuit) -> U2 {
        let ph = C64::cis(std::f64::consts::PI * circ.phase());
        circ.commands().iter()
            .fold(U2::identity(), |acc, cmd| {
                unitary(cmd.kind(), cmd.op.params()).unwrap() * acc
            })
            * ph
    }

    #[test]
    fn int_double_values() {
        assert_eq!(int_double(0.0).unwrap(), 0);
        assert_eq!(int_double(0.5).unwrap(), 1);
        assert_eq!(int_double(-0.5).unwrap(), 7);
        assert_eq!(int_double(3.5).unwrap(), 7);
        assert_eq!(int_double(4.0).unwrap(), 0);
        assert_eq!(int_double(0.5 + 1e-10).unwrap(), 1);
        assert!(matches!(int_double(0.25), Err(Error::NonCliffordAngle(_))));
    }

    #[test]
    fn tk1_to_cliff_counts() {
        let circ = tk1_to_cliff(0.5, 0.5, 1.0).unwrap();
        assert_eq!(circ.count_kind(OpType::S), 1 + 1 + 2);
        assert_eq!(circ.count_kind(OpType::H), 2);
        assert!((circ.phase() - (-0.25 * 4.0_f64).rem_euclid(2.0)).abs() < 1e-12);
        assert!(tk1_to_cliff(0.0, 0.0, 0.0).unwrap().commands().is_empty());
        assert!(tk1_to_cliff(0.5, 0.125, 0.0).is_err());
    }

    #[test]
    fn tk1_to_cliff_exact() {
        let angles = [0.0, 0.5, 1.0, 1.5, -0.5, 3.0, -2.5];
        for &a in angles.iter() {
            for &b in angles.iter() {
                for &c in angles.iter() {
                    let target = unitary(OpType::TK1, &[a, b, c]).unwrap();
                    let got = circuit_unitary(&tk1_to_cliff(a, b, c).unwrap());
                    assert!(
                        (target - got).iter().all(|d| d.norm() < 1e-9),
                        "TK1({a}, {b}, {c})"
                    );
                }
            }
        }
    }

    #[test]
    fn op_to_tk1_exact() {
        for kind in OpType::ALL {
            let params: Vec<f64> = vec![0.37; kind.n_params()];
            let Some(([a, b, c], ph)) = op_to_tk1(kind, &params) else { continue; };
            let target = unitary(kind, &params).unwrap();
            let got
                = unitary(OpType::TK1, &[a, b, c]).unwrap()
                * C64::cis(std::f64::consts::PI * ph);
            assert!((target - got).iter().all(|d| d.norm() < 1e-9), "{kind}");
        }
        assert!(op_to_tk1(OpType::CX, &[]).is_none());
        assert!(op_to_tk1(OpType::Noop, &[]).is_none());
    }

    #[test]
    fn two_qubit_known() {
        assert_eq!(two_qubit_via_cx(OpType::SWAP).unwrap().len(), 3);
        assert!(two_qubit_via_cx(OpType::CX).is_none());
        assert!(two_qubit_via_cx(OpType::H).is_none());
        let cy = two_qubit_via_cx(OpType::CY).unwrap();
        assert!(equal_up_to_phase(
            &unitary(cy[0].0, &[]).unwrap(),
            &unitary(OpType::Sdg, &[]).unwrap(),
            1e-9,
        ));
    }
}
