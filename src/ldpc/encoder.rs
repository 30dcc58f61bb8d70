// Copyright (c) 2024, The AR4JA Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! # Compact firmware encodings
//!
//! * Dense generator constants: one row in every `b` of the parity block of
//!   `G`, packed into 32-bit words most significant bit first. The other
//!   rows are recovered by rotating each `b`-bit circulant block, see
//!   [`expand_compact`].
//! * Dense parity-check matrix: every row of `H` in 32-bit words.
//! * Sparse parity-check index: compressed row and compressed column
//!   adjacency lists, see [`SparseIndex`].

use super::bitmatrix::{copy_bits, read_bits, write_bits, BinaryMatrix};
use crate::error::{LdpcError, Result};
use serde::{Deserialize, Serialize};

const WORD: usize = 32;

/// Reads 32 columns starting at `col` as one MSB-first word.
#[inline]
fn msb_word(row: &[u64], col: usize) -> u32 {
    (read_bits(row, col, WORD) as u32).reverse_bits()
}

/// Packs the parity block of a `k x n` systematic generator into the
/// constants table of the quasi-cyclic encoder.
///
/// `b` is the circulant size. Rows `0, b, 2b, ...` are emitted in order,
/// each as `(n - k) / 32` words.
pub fn pack_generator(g: &BinaryMatrix, k: usize, b: usize) -> Result<Vec<u32>> {
    let n = g.cols();
    if g.rows() != k || n <= k {
        return Err(LdpcError::InvalidParameter(format!(
            "a {}x{} matrix is not a generator of dimension {}",
            g.rows(),
            n,
            k
        )));
    }
    let r = n - k;
    if b == 0 || k % b != 0 || r % WORD != 0 {
        return Err(LdpcError::InvalidParameter(format!(
            "cannot pack {} parity columns with circulant size {}",
            r, b
        )));
    }
    let per_row = r / WORD;
    let mut words = Vec::with_capacity(k / b * per_row);
    for row in (0..k).step_by(b) {
        let bits = g.row_words(row);
        words.extend((0..per_row).map(|w| msb_word(bits, k + w * WORD)));
    }
    Ok(words)
}

/// Rebuilds the `k x (n - k)` parity block from its packed constants.
pub fn expand_compact(words: &[u32], k: usize, n: usize, b: usize) -> Result<BinaryMatrix> {
    if n <= k || b == 0 || k % b != 0 || (n - k) % b != 0 || (n - k) % WORD != 0 {
        return Err(LdpcError::InvalidParameter(format!(
            "no compact generator layout for n={} k={} b={}",
            n, k, b
        )));
    }
    let r = n - k;
    let per_row = r / WORD;
    if words.len() != k / b * per_row {
        return Err(LdpcError::InvalidParameter(format!(
            "expected {} compact words, got {}",
            k / b * per_row,
            words.len()
        )));
    }

    let mut out = BinaryMatrix::zeros(k, r)?;
    let mut prev = vec![0u64; out.stride()];
    for i in 0..k {
        let row = out.row_words_mut(i);
        if i % b == 0 {
            let base = i / b * per_row;
            for (w, &word) in words[base..base + per_row].iter().enumerate() {
                write_bits(row, w * WORD, WORD, word.reverse_bits() as u64);
            }
        } else {
            // rotate every circulant block right by one position
            for s in (0..r).step_by(b) {
                copy_bits(row, s + 1, &prev, s, b - 1);
                write_bits(row, s, 1, read_bits(&prev, s + b - 1, 1));
            }
        }
        prev.copy_from_slice(row);
    }
    Ok(out)
}

/// Packs every row of `h` into 32-bit MSB-first words. The column count
/// must be a multiple of 32.
pub fn pack_parity_check(h: &BinaryMatrix) -> Result<Vec<u32>> {
    if h.cols() % WORD != 0 {
        return Err(LdpcError::InvalidParameter(format!(
            "{} columns do not pack into 32-bit words",
            h.cols()
        )));
    }
    let per_row = h.cols() / WORD;
    let mut words = Vec::with_capacity(h.rows() * per_row);
    for r in 0..h.rows() {
        let bits = h.row_words(r);
        words.extend((0..per_row).map(|w| msb_word(bits, w * WORD)));
    }
    Ok(words)
}

/// Renders words as `0xXXXXXXXX` constants separated by `", "`, breaking
/// the line after every `per_line` words (never, when zero).
pub fn render_hex_words(words: &[u32], per_line: usize) -> String {
    let mut out = String::with_capacity(words.len() * 12);
    for (i, w) in words.iter().enumerate() {
        if i > 0 {
            if per_line > 0 && i % per_line == 0 {
                out.push_str(",\n");
            } else {
                out.push_str(", ");
            }
        }
        out.push_str("0x");
        out.push_str(&hex::encode_upper(w.to_be_bytes()));
    }
    out
}

/// Compressed adjacency of a parity-check matrix.
///
/// `check_cols[check_row_starts[r]..check_row_starts[r + 1]]` are the columns
/// set in row `r`, ascending; `data_rows` and `data_col_starts` are the same
/// per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseIndex {
    pub check_cols: Vec<u32>,
    pub check_row_starts: Vec<u32>,
    pub data_rows: Vec<u32>,
    pub data_col_starts: Vec<u32>,
}

/// [`SparseIndex`] narrowed to the 16-bit tables used on target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseIndex16 {
    pub check_cols: Vec<u16>,
    pub check_row_starts: Vec<u16>,
    pub data_rows: Vec<u16>,
    pub data_col_starts: Vec<u16>,
}

fn index_u32(v: usize) -> Result<u32> {
    u32::try_from(v).map_err(|_| LdpcError::InvalidParameter(format!("index {} exceeds 32 bits", v)))
}

fn narrow(name: &str, v: &[u32]) -> Result<Vec<u16>> {
    v.iter()
        .map(|&x| {
            u16::try_from(x).map_err(|_| {
                LdpcError::InvalidParameter(format!("{} value {} does not fit in 16 bits", name, x))
            })
        })
        .collect()
}

fn check_starts(name: &str, starts: &[u32], len: usize, edges: usize) -> Result<()> {
    if starts.len() != len + 1 {
        return Err(LdpcError::InvalidParameter(format!(
            "{} has {} entries, expected {}",
            name,
            starts.len(),
            len + 1
        )));
    }
    if starts[0] != 0 || starts.windows(2).any(|w| w[0] > w[1]) || starts[len] as usize != edges {
        return Err(LdpcError::InvalidParameter(format!(
            "{} is not a non-decreasing offset table ending at {}",
            name, edges
        )));
    }
    Ok(())
}

impl SparseIndex {
    /// Builds both adjacency lists of `h`.
    pub fn from_matrix(h: &BinaryMatrix) -> Result<Self> {
        let (rows, cols) = h.shape();
        let edges = h.count_ones();

        let mut check_cols = Vec::with_capacity(edges);
        let mut check_row_starts = Vec::with_capacity(rows + 1);
        let mut col_counts = vec![0u32; cols + 1];
        for r in 0..rows {
            check_row_starts.push(index_u32(check_cols.len())?);
            for c in h.row_ones(r) {
                check_cols.push(index_u32(c)?);
                col_counts[c + 1] += 1;
            }
        }
        check_row_starts.push(index_u32(check_cols.len())?);

        // prefix sums give the column starts, rows arrive in ascending order
        for c in 0..cols {
            col_counts[c + 1] += col_counts[c];
        }
        let data_col_starts = col_counts;
        let mut fill: Vec<u32> = data_col_starts[..cols].to_vec();
        let mut data_rows = vec![0u32; edges];
        for r in 0..rows {
            let (lo, hi) = (check_row_starts[r] as usize, check_row_starts[r + 1] as usize);
            for &c in &check_cols[lo..hi] {
                let slot = &mut fill[c as usize];
                data_rows[*slot as usize] = r as u32;
                *slot += 1;
            }
        }

        Ok(Self {
            check_cols,
            check_row_starts,
            data_rows,
            data_col_starts,
        })
    }

    pub fn rows(&self) -> usize {
        self.check_row_starts.len().saturating_sub(1)
    }

    pub fn cols(&self) -> usize {
        self.data_col_starts.len().saturating_sub(1)
    }

    /// Number of ones in the matrix.
    pub fn edges(&self) -> usize {
        self.check_cols.len()
    }

    /// Columns connected to check node `row`.
    pub fn check_node(&self, row: usize) -> &[u32] {
        let (lo, hi) = (self.check_row_starts[row] as usize, self.check_row_starts[row + 1] as usize);
        &self.check_cols[lo..hi]
    }

    /// Rows connected to variable node `col`.
    pub fn variable_node(&self, col: usize) -> &[u32] {
        let (lo, hi) = (self.data_col_starts[col] as usize, self.data_col_starts[col + 1] as usize);
        &self.data_rows[lo..hi]
    }

    /// Checks offset tables and index ranges of both halves.
    pub fn validate(&self) -> Result<()> {
        let (rows, cols, edges) = (self.rows(), self.cols(), self.edges());
        check_starts("check_row_starts", &self.check_row_starts, rows, edges)?;
        check_starts("data_col_starts", &self.data_col_starts, cols, self.data_rows.len())?;
        if self.data_rows.len() != edges {
            return Err(LdpcError::InvalidParameter(format!(
                "row-major side has {} edges, column-major side {}",
                edges,
                self.data_rows.len()
            )));
        }
        if self.check_cols.iter().any(|&c| c as usize >= cols) || self.data_rows.iter().any(|&r| r as usize >= rows) {
            return Err(LdpcError::InvalidParameter("sparse index out of range".into()));
        }
        Ok(())
    }

    /// Rebuilds the dense matrix from the row-major lists.
    pub fn rows_to_dense(&self) -> Result<BinaryMatrix> {
        self.validate()?;
        let mut m = BinaryMatrix::zeros(self.rows(), self.cols())?;
        for r in 0..self.rows() {
            for &c in self.check_node(r) {
                m.set(r, c as usize, true);
            }
        }
        Ok(m)
    }

    /// Rebuilds the dense matrix from the column-major lists.
    pub fn cols_to_dense(&self) -> Result<BinaryMatrix> {
        self.validate()?;
        let mut m = BinaryMatrix::zeros(self.rows(), self.cols())?;
        for c in 0..self.cols() {
            for &r in self.variable_node(c) {
                m.set(r as usize, c, true);
            }
        }
        Ok(m)
    }

    /// Narrows every table to `u16`, failing if any value is too large.
    pub fn to_u16(&self) -> Result<SparseIndex16> {
        Ok(SparseIndex16 {
            check_cols: narrow("check_cols", &self.check_cols)?,
            check_row_starts: narrow("check_row_starts", &self.check_row_starts)?,
            data_rows: narrow("data_rows", &self.data_rows)?,
            data_col_starts: narrow("data_col_starts", &self.data_col_starts)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(rows: &[&str]) -> BinaryMatrix {
        BinaryMatrix::from_fn(rows.len(), rows[0].len(), |r, c| rows[r].as_bytes()[c] == b'1').unwrap()
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(render_hex_words(&[0xCFA794F4, 0x1], 0), "0xCFA794F4, 0x00000001");
        assert_eq!(render_hex_words(&[1, 2, 3], 2), "0x00000001, 0x00000002,\n0x00000003");
        assert_eq!(render_hex_words(&[], 6), "");
    }

    #[test]
    fn words_are_msb_first() {
        let h = BinaryMatrix::from_fn(2, 64, |r, c| (r == 0 && c == 0) || (r == 1 && c == 63)).unwrap();
        assert_eq!(pack_parity_check(&h).unwrap(), vec![0x8000_0000, 0, 0, 1]);
        let odd = BinaryMatrix::zeros(1, 40).unwrap();
        assert!(pack_parity_check(&odd).is_err());
    }

    #[test]
    fn compact_generator_rotates_circulants() {
        // k = 64, r = 64, b = 32: two circulant rows of two blocks each
        let (k, n, b) = (64, 128, 32);
        let words = [0x8000_0001, 0x4000_0000, 0x0000_0003, 0xFFFF_0000];
        let p = expand_compact(&words, k, n, b).unwrap();
        assert_eq!(p.shape(), (64, 64));
        // row 1 is row 0 with each 32-bit block rotated right by one
        assert!(p.get(1, 0) && p.get(1, 1) && p.get(1, 34));
        assert_eq!(p.row_ones(1).count(), 3);
        // after b rotations a block is back where it started
        for c in 0..64 {
            assert_eq!(p.get(31, c), p.get(0, (c / 32) * 32 + (c % 32 + 1) % 32));
        }

        // packing a generator built from the expansion returns the constants
        let g = BinaryMatrix::hstack(&[&BinaryMatrix::identity(k).unwrap(), &p]).unwrap();
        assert_eq!(pack_generator(&g, k, b).unwrap(), words.to_vec());
    }

    #[test]
    fn compact_generator_with_word_aligned_circulants() {
        // b = 512 spans eight 64-bit words, every block starts on a word
        let (k, n, b) = (1024, 2048, 512);
        let words: Vec<u32> = (0..64u32).map(|i| i.wrapping_mul(0x9E37_79B9) ^ (i << 3)).collect();
        let p = expand_compact(&words, k, n, b).unwrap();
        for row in [1, 200, 511, 513, 1023] {
            let base = row / b * b;
            let shift = row - base;
            for c in 0..1024 {
                let block = c / b * b;
                let src = block + (c - block + b - shift) % b;
                assert_eq!(p.get(row, c), p.get(base, src), "row {} col {}", row, c);
            }
        }
        let g = BinaryMatrix::hstack(&[&BinaryMatrix::identity(k).unwrap(), &p]).unwrap();
        assert_eq!(pack_generator(&g, k, b).unwrap(), words);
    }

    #[test]
    fn compact_layout_errors() {
        assert!(expand_compact(&[0; 3], 64, 128, 32).is_err());
        assert!(expand_compact(&[0; 4], 64, 128, 0).is_err());
        let g = BinaryMatrix::zeros(64, 100).unwrap();
        assert!(pack_generator(&g, 64, 32).is_err());
    }

    #[test]
    fn sparse_index_both_directions() {
        let h = small(&["1010", "0110", "0001"]);
        let s = SparseIndex::from_matrix(&h).unwrap();
        assert_eq!(s.check_cols, vec![0, 2, 1, 2, 3]);
        assert_eq!(s.check_row_starts, vec![0, 2, 4, 5]);
        assert_eq!(s.data_rows, vec![0, 1, 0, 1, 2]);
        assert_eq!(s.data_col_starts, vec![0, 1, 2, 4, 5]);
        assert_eq!(s.variable_node(2), &[0, 1]);
        assert_eq!(s.rows_to_dense().unwrap(), h);
        assert_eq!(s.cols_to_dense().unwrap(), h);
    }

    #[test]
    fn sparse_validation_and_narrowing() {
        let h = small(&["11", "01"]);
        let mut s = SparseIndex::from_matrix(&h).unwrap();
        assert_eq!(s.to_u16().unwrap().check_cols, vec![0u16, 1, 1]);
        s.check_cols[0] = 70_000;
        assert!(s.validate().is_err());
        assert!(s.to_u16().is_err());
        s.check_cols[0] = 0;
        s.data_col_starts[2] = 4;
        assert!(s.rows_to_dense().is_err());
    }
}
