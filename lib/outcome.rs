//! Compact storage for many shots of classical readouts.

use std::collections::BTreeMap;
use nalgebra as na;

/// A two-dimensional array of readouts, one row per shot.
///
/// Each row of `width` bits is packed big-endian into bytes: the first bit of
/// a readout is the most significant bit of the row's first byte, and unused
/// trailing bits are zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeArray {
    width: usize,
    // size n_outcomes × (width / 8 rounded up)
    data: na::DMatrix<u8>,
}

fn n_bytes(width: usize) -> usize { width.div_ceil(8) }

impl OutcomeArray {
    /// Pack readouts of a given width.
    ///
    /// Rows shorter than `width` are padded with `false` and longer rows are
    /// truncated.
    pub fn with_width<R>(width: usize, readouts: &[R]) -> Self
    where R: AsRef<[bool]>
    {
        let mut data: na::DMatrix<u8>
            = na::DMatrix::zeros(readouts.len(), n_bytes(width));
        for (i, row) in readouts.iter().enumerate() {
            for (j, &b) in row.as_ref().iter().take(width).enumerate() {
                if b { data[(i, j >> 3)] |= 0x80 >> (j & 7); }
            }
        }
        Self { width, data }
    }

    /// Pack readouts, taking the width from the longest row.
    pub fn from_readouts<R>(readouts: &[R]) -> Self
    where R: AsRef<[bool]>
    {
        let width
            = readouts.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);
        Self::with_width(width, readouts)
    }

    /// Number of bits per readout.
    pub fn width(&self) -> usize { self.width }

    /// Number of readouts (shots).
    pub fn n_outcomes(&self) -> usize { self.data.nrows() }

    /// Unpack the `i`-th readout.
    pub fn readout(&self, i: usize) -> Option<Vec<bool>> {
        (i < self.n_outcomes()).then(|| {
            (0..self.width)
                .map(|j| self.data[(i, j >> 3)] & (0x80 >> (j & 7)) != 0)
                .collect()
        })
    }

    /// Unpack all readouts.
    pub fn to_readouts(&self) -> Vec<Vec<bool>> {
        (0..self.n_outcomes()).filter_map(|i| self.readout(i)).collect()
    }

    /// Read each readout as an unsigned integer, with the first bit most
    /// significant.
    ///
    /// Returns `None` if the width exceeds 64.
    pub fn to_intlist(&self) -> Option<Vec<u64>> {
        (self.width <= 64).then(|| {
            self.to_readouts().into_iter()
                .map(|row| row.into_iter().fold(0_u64, |acc, b| (acc << 1) | u64::from(b)))
                .collect()
        })
    }

    /// Build a new array from a selection of columns, in the given order.
    ///
    /// Returns `None` if any index is out of bounds.
    pub fn choose_indices(&self, indices: &[usize]) -> Option<Self> {
        if indices.iter().any(|&j| j >= self.width) { return None; }
        let rows: Vec<Vec<bool>>
            = self.to_readouts().into_iter()
            .map(|row| indices.iter().map(|&j| row[j]).collect())
            .collect();
        Some(Self::with_width(indices.len(), &rows))
    }

    /// Count the occurrences of each distinct readout.
    pub fn counts(&self) -> BTreeMap<Vec<bool>, usize> {
        let mut acc: BTreeMap<Vec<bool>, usize> = BTreeMap::new();
        for row in self.to_readouts().into_iter() {
            *acc.entry(row).or_insert(0) += 1;
        }
        acc
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packing_is_big_endian() {
        let arr = OutcomeArray::from_readouts(&[
            vec![true, false, false, false, false, false, false, false, true],
            vec![false, true, true, false, false, false, false, false, false],
        ]);
        assert_eq!(arr.width(), 9);
        assert_eq!(arr.n_outcomes(), 2);
        assert_eq!(arr.data.ncols(), 2);
        assert_eq!(arr.data[(0, 0)], 0x80);
        assert_eq!(arr.data[(0, 1)], 0x80);
        assert_eq!(arr.data[(1, 0)], 0x60);
        assert_eq!(arr.data[(1, 1)], 0x00);
    }

    #[test]
    fn unpack() {
        let rows = vec![vec![true, false, true], vec![false, false, true]];
        let arr = OutcomeArray::from_readouts(&rows);
        assert_eq!(arr.to_readouts(), rows);
        assert_eq!(arr.readout(1).unwrap(), rows[1]);
        assert!(arr.readout(2).is_none());
        assert_eq!(arr.to_intlist().unwrap(), vec![0b101, 0b001]);
    }

    #[test]
    fn ragged_rows_padded() {
        let arr = OutcomeArray::with_width(3, &[vec![true], vec![true, true, true, true]]);
        assert_eq!(arr.to_readouts(), vec![vec![true, false, false], vec![true; 3]]);
    }

    #[test]
    fn empty() {
        let arr = OutcomeArray::with_width(4, &Vec::<Vec<bool>>::new());
        assert_eq!(arr.n_outcomes(), 0);
        assert_eq!(arr.width(), 4);
        assert!(arr.counts().is_empty());

        let arr = OutcomeArray::from_readouts(&[Vec::<bool>::new(), Vec::new()]);
        assert_eq!(arr.width(), 0);
        assert_eq!(arr.counts().get(&Vec::new()), Some(&2));
    }

    #[test]
    fn choose_and_count() {
        let arr = OutcomeArray::from_readouts(&[
            vec![true, false, true],
            vec![true, true, true],
            vec![false, false, false],
            vec![true, false, true],
        ]);
        let counts = arr.counts();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&vec![true, false, true]], 2);

        let sub = arr.choose_indices(&[2, 0]).unwrap();
        assert_eq!(sub.width(), 2);
        assert_eq!(sub.counts()[&vec![true, true]], 3);
        assert!(arr.choose_indices(&[3]).is_none());
    }
}
