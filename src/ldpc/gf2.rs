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

//! # GF(2) linear algebra
//!
//! Gauss-Jordan inversion and matrix products over packed rows. Both loops
//! work a whole row of words at a time and hand independent rows to rayon.

use super::bitmatrix::{copy_bits, BinaryMatrix, Ones, WORD_BITS};
use crate::error::{LdpcError, Result};
use crate::telemetry;
use log::debug;
use rayon::prelude::*;

/// Computes `a * b` modulo 2.
pub fn multiply(a: &BinaryMatrix, b: &BinaryMatrix) -> Result<BinaryMatrix> {
    if a.cols() != b.rows() {
        return Err(LdpcError::ShapeMismatch {
            op: "multiply",
            left: a.shape(),
            right: b.shape(),
        });
    }
    let mut out = BinaryMatrix::zeros(a.rows(), b.cols())?;
    let stride = out.stride();
    if stride == 0 {
        return Ok(out);
    }
    out.words_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(i, row)| {
            for j in a.row_ones(i) {
                for (d, s) in row.iter_mut().zip(b.row_words(j)) {
                    *d ^= *s;
                }
            }
        });
    Ok(out)
}

/// Inverts a square matrix over GF(2).
///
/// Works on the augmented matrix `[A | I]`. Row `i` pivots on its first
/// non-zero column, which is then cleared from every other row; rows are
/// never swapped during elimination. Afterwards the left half is a
/// permutation matrix and the inverse is the right half with its rows put
/// back in pivot order. A row whose left half is empty when it comes up for
/// pivoting means `A` is singular, reported as [`LdpcError::Singular`].
pub fn invert(a: &BinaryMatrix) -> Result<BinaryMatrix> {
    let n = a.rows();
    if n != a.cols() {
        return Err(LdpcError::ShapeMismatch {
            op: "invert",
            left: a.shape(),
            right: (a.cols(), a.rows()),
        });
    }
    let mut aug = {
        let identity = BinaryMatrix::identity(n)?;
        BinaryMatrix::hstack(&[a, &identity])?
    };
    let stride = aug.stride();
    let mut pivots = Vec::with_capacity(n);
    let mut pivot_row = vec![0u64; stride];

    for i in 0..n {
        let pivot = match Ones::new(aug.row_words(i)).next() {
            Some(c) if c < n => c,
            _ => return Err(LdpcError::Singular { row: i }),
        };
        pivots.push(pivot);

        // Columns left of the pivot are zero in the pivot row, so XORs can
        // start at the pivot's word.
        let start = pivot / WORD_BITS;
        pivot_row[start..].copy_from_slice(&aug.row_words(i)[start..]);
        let tail = &pivot_row[start..];
        let (pw, pb) = (pivot / WORD_BITS, 1u64 << (pivot % WORD_BITS));

        let eliminated: usize = aug
            .words_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .filter(|(j, row)| *j != i && row[pw] & pb != 0)
            .map(|(_, row)| {
                for (d, s) in row[start..].iter_mut().zip(tail) {
                    *d ^= *s;
                }
                1
            })
            .sum();
        telemetry::GF2_ROW_ELIMINATIONS.inc_by(eliminated as u64);

        if i > 0 && i % 4096 == 0 {
            debug!("invert: {}/{} pivots placed", i, n);
        }
    }

    let mut inverse = BinaryMatrix::zeros(n, n)?;
    for (i, &p) in pivots.iter().enumerate() {
        copy_bits(inverse.row_words_mut(p), 0, aug.row_words(i), n, n);
    }
    telemetry::MATRICES_INVERTED.inc();
    Ok(inverse)
}
