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

//! # Packed GF(2) matrices
//!
//! Every matrix in the generator pipeline is stored one bit per entry, row
//! major, each row padded to a whole number of 64-bit words. Column `c` of a
//! row lives in word `c / 64` at bit `c % 64` (least significant first).
//! Padding bits past the last column are always zero, so whole-word
//! comparisons and popcounts are exact.
//!
//! Storage comes from a 64-byte aligned buffer so that row XORs in the
//! elimination loop run over cache-line aligned memory.

use crate::error::{LdpcError, Result};
use aligned_box::AlignedBox;
use std::fmt;
use std::ops::Range;

pub const WORD_BITS: usize = 64;
const ALIGNMENT: usize = 64;

#[inline(always)]
pub(crate) fn words_for(bits: usize) -> usize {
    (bits + WORD_BITS - 1) / WORD_BITS
}

#[inline(always)]
fn low_mask(len: usize) -> u64 {
    if len >= WORD_BITS {
        !0
    } else {
        (1u64 << len) - 1
    }
}

/// Reads `len <= 64` bits starting at bit `off`.
#[inline]
pub(crate) fn read_bits(src: &[u64], off: usize, len: usize) -> u64 {
    if len == 0 {
        return 0;
    }
    let w = off / WORD_BITS;
    let sh = off % WORD_BITS;
    let mut v = src[w] >> sh;
    if sh != 0 && sh + len > WORD_BITS {
        v |= src[w + 1] << (WORD_BITS - sh);
    }
    v & low_mask(len)
}

/// Overwrites `len <= 64` bits starting at bit `off` with the low bits of `val`.
#[inline]
pub(crate) fn write_bits(dst: &mut [u64], off: usize, len: usize, val: u64) {
    if len == 0 {
        return;
    }
    let mask = low_mask(len);
    let val = val & mask;
    let w = off / WORD_BITS;
    let sh = off % WORD_BITS;
    dst[w] = (dst[w] & !(mask << sh)) | (val << sh);
    if sh != 0 && sh + len > WORD_BITS {
        let done = WORD_BITS - sh;
        dst[w + 1] = (dst[w + 1] & !(mask >> done)) | (val >> done);
    }
}

/// Copies `len` bits from `src` at `src_off` into `dst` at `dst_off`.
pub(crate) fn copy_bits(dst: &mut [u64], dst_off: usize, src: &[u64], src_off: usize, len: usize) {
    if dst_off % WORD_BITS == 0 && src_off % WORD_BITS == 0 && len % WORD_BITS == 0 {
        let d = dst_off / WORD_BITS;
        let s = src_off / WORD_BITS;
        let n = len / WORD_BITS;
        dst[d..d + n].copy_from_slice(&src[s..s + n]);
        return;
    }
    let mut t = 0;
    while t < len {
        let n = (len - t).min(WORD_BITS);
        write_bits(dst, dst_off + t, n, read_bits(src, src_off + t, n));
        t += n;
    }
}

/// Iterator over the set bit positions of a packed row.
pub struct Ones<'a> {
    words: std::slice::Iter<'a, u64>,
    current: u64,
    base: usize,
}

impl<'a> Ones<'a> {
    pub(crate) fn new(words: &'a [u64]) -> Self {
        let mut it = words.iter();
        let current = it.next().copied().unwrap_or(0);
        Ones {
            words: it,
            current,
            base: 0,
        }
    }
}

impl<'a> Iterator for Ones<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.current = *self.words.next()?;
            self.base += WORD_BITS;
        }
        let tz = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.base + tz)
    }
}

/// A dense binary matrix with all arithmetic taken modulo 2.
pub struct BinaryMatrix {
    rows: usize,
    cols: usize,
    stride: usize,
    data: AlignedBox<[u64]>,
}

impl BinaryMatrix {
    /// Creates an all-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let stride = words_for(cols);
        let words = rows * stride;
        // zero-length allocations are not supported by the aligned allocator
        let data = AlignedBox::<[u64]>::slice_from_default(ALIGNMENT, words.max(1))
            .map_err(|_| LdpcError::Allocation { words })?;
        Ok(Self {
            rows,
            cols,
            stride,
            data,
        })
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.set(i, i, true);
        }
        Ok(m)
    }

    /// Builds a matrix by evaluating `f(row, col)` for every entry.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut m = Self::zeros(rows, cols)?;
        for r in 0..rows {
            for c in 0..cols {
                if f(r, c) {
                    m.set(r, c, true);
                }
            }
        }
        Ok(m)
    }

    /// Rebuilds a matrix from its packed words, as produced by [`Self::words`].
    pub fn from_words(rows: usize, cols: usize, words: &[u64]) -> Result<Self> {
        let mut m = Self::zeros(rows, cols)?;
        if words.len() != rows * m.stride {
            return Err(LdpcError::InvalidParameter(format!(
                "{} packed words cannot hold a {}x{} matrix",
                words.len(),
                rows,
                cols
            )));
        }
        let used = cols % WORD_BITS;
        if used != 0 {
            let pad = !low_mask(used);
            let dirty = words
                .chunks(m.stride)
                .any(|row| row[m.stride - 1] & pad != 0);
            if dirty {
                return Err(LdpcError::InvalidParameter(
                    "packed words carry bits past the last column".to_string(),
                ));
            }
        }
        m.words_mut().copy_from_slice(words);
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of 64-bit words per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// All packed words, row after row.
    pub fn words(&self) -> &[u64] {
        &self.data[..self.rows * self.stride]
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        let n = self.rows * self.stride;
        &mut self.data[..n]
    }

    pub fn row_words(&self, r: usize) -> &[u64] {
        let s = r * self.stride;
        &self.data[s..s + self.stride]
    }

    pub(crate) fn row_words_mut(&mut self, r: usize) -> &mut [u64] {
        let s = r * self.stride;
        &mut self.data[s..s + self.stride]
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> bool {
        debug_assert!(r < self.rows && c < self.cols);
        (self.data[r * self.stride + c / WORD_BITS] >> (c % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: bool) {
        debug_assert!(r < self.rows && c < self.cols);
        let idx = r * self.stride + c / WORD_BITS;
        let bit = 1u64 << (c % WORD_BITS);
        if v {
            self.data[idx] |= bit;
        } else {
            self.data[idx] &= !bit;
        }
    }

    #[inline]
    pub fn toggle(&mut self, r: usize, c: usize) {
        debug_assert!(r < self.rows && c < self.cols);
        self.data[r * self.stride + c / WORD_BITS] ^= 1u64 << (c % WORD_BITS);
    }

    /// Column indices of the ones in row `r`, in increasing order.
    pub fn row_ones(&self, r: usize) -> Ones<'_> {
        Ones::new(self.row_words(r))
    }

    /// Total number of ones in the matrix.
    pub fn count_ones(&self) -> usize {
        self.words().iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|r| {
                let mut ones = self.row_ones(r);
                ones.next() == Some(r) && ones.next().is_none()
            })
    }

    fn check_same_shape(&self, other: &Self, op: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(LdpcError::ShapeMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    /// In-place addition modulo 2.
    pub fn add_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_shape(other, "add")?;
        for (a, b) in self.words_mut().iter_mut().zip(other.words()) {
            *a ^= *b;
        }
        Ok(())
    }

    /// Deep copy into freshly allocated storage.
    pub fn try_clone(&self) -> Result<Self> {
        let mut out = Self::zeros(self.rows, self.cols)?;
        out.words_mut().copy_from_slice(self.words());
        Ok(out)
    }

    /// Sum modulo 2.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "add")?;
        let mut out = self.try_clone()?;
        out.add_assign(other)?;
        Ok(out)
    }

    /// Concatenates matrices left to right. All parts must share a row count.
    pub fn hstack(parts: &[&BinaryMatrix]) -> Result<Self> {
        let rows = parts.first().map(|p| p.rows).unwrap_or(0);
        for p in parts {
            if p.rows != rows {
                return Err(LdpcError::ShapeMismatch {
                    op: "hstack",
                    left: parts[0].shape(),
                    right: p.shape(),
                });
            }
        }
        let cols = parts.iter().map(|p| p.cols).sum();
        let mut out = Self::zeros(rows, cols)?;
        for r in 0..rows {
            let mut offset = 0;
            for p in parts {
                copy_bits(out.row_words_mut(r), offset, p.row_words(r), 0, p.cols);
                offset += p.cols;
            }
        }
        Ok(out)
    }

    /// Concatenates matrices top to bottom. All parts must share a column count.
    pub fn vstack(parts: &[&BinaryMatrix]) -> Result<Self> {
        let cols = parts.first().map(|p| p.cols).unwrap_or(0);
        for p in parts {
            if p.cols != cols {
                return Err(LdpcError::ShapeMismatch {
                    op: "vstack",
                    left: parts[0].shape(),
                    right: p.shape(),
                });
            }
        }
        let rows = parts.iter().map(|p| p.rows).sum();
        let mut out = Self::zeros(rows, cols)?;
        let mut offset = 0;
        for p in parts {
            let n = p.words().len();
            out.words_mut()[offset..offset + n].copy_from_slice(p.words());
            offset += n;
        }
        Ok(out)
    }

    /// Copies out the columns in `range`.
    pub fn columns(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.cols {
            return Err(LdpcError::ShapeMismatch {
                op: "columns",
                left: self.shape(),
                right: (range.start, range.end),
            });
        }
        let len = range.end - range.start;
        let mut out = Self::zeros(self.rows, len)?;
        for r in 0..self.rows {
            copy_bits(out.row_words_mut(r), 0, self.row_words(r), range.start, len);
        }
        Ok(out)
    }

    pub fn transpose(&self) -> Result<Self> {
        let mut out = Self::zeros(self.cols, self.rows)?;
        for r in 0..self.rows {
            for c in self.row_ones(r) {
                out.set(c, r, true);
            }
        }
        Ok(out)
    }
}

impl PartialEq for BinaryMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.words() == other.words()
    }
}

impl Eq for BinaryMatrix {}

impl fmt::Debug for BinaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryMatrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("ones", &self.count_ones())
            .finish()
    }
}
