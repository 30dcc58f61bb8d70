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

use super::bitmatrix::BinaryMatrix;
use super::tables;
use crate::error::{LdpcError, Result};

/// An `M x M` circulant permutation sub-matrix, kept as the column index of
/// the single one in each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationSubmatrix {
    k: usize,
    columns: Vec<usize>,
}

impl PermutationSubmatrix {
    /// Permutation index (1..=26).
    pub fn index(&self) -> usize {
        self.k
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Column of the one in row `row`.
    pub fn column(&self, row: usize) -> usize {
        self.columns[row]
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Adds this permutation into `m` modulo 2.
    pub fn add_into(&self, m: &mut BinaryMatrix) -> Result<()> {
        if m.shape() != (self.size(), self.size()) {
            return Err(LdpcError::ShapeMismatch {
                op: "add_into",
                left: m.shape(),
                right: (self.size(), self.size()),
            });
        }
        for (row, &col) in self.columns.iter().enumerate() {
            m.toggle(row, col);
        }
        Ok(())
    }

    pub fn to_matrix(&self) -> Result<BinaryMatrix> {
        let mut m = BinaryMatrix::zeros(self.size(), self.size())?;
        self.add_into(&mut m)?;
        Ok(m)
    }
}

/// Builds permutation sub-matrix `k` of size `m` (section 7.4.2.4).
///
/// Row `i` falls in quadrant `j = 4i / M` and maps to column
/// `M/4 * ((theta_k + j) mod 4) + (phi_k(j, M) + i) mod M/4`.
pub fn permutation(m: usize, k: usize) -> Result<PermutationSubmatrix> {
    tables::submatrix_index(m)?;
    let theta = tables::theta(k)?;
    let quarter = m / 4;
    let mut phis = [0usize; 4];
    for (j, phi) in phis.iter_mut().enumerate() {
        *phi = tables::phi(j, m, k)?;
    }

    let mut taken = vec![false; m];
    let mut columns = Vec::with_capacity(m);
    for i in 0..m {
        let j = 4 * i / m;
        let col = quarter * ((theta + j) % 4) + (phis[j] + i) % quarter;
        if std::mem::replace(&mut taken[col], true) {
            return Err(LdpcError::InvalidParameter(format!(
                "permutation {} of size {} maps two rows to column {}",
                k, m, col
            )));
        }
        columns.push(col);
    }
    Ok(PermutationSubmatrix { k, columns })
}
