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

//! Block templates of the AR4JA parity-check matrices (CCSDS 131.0-B-2,
//! section 7.4.2).
//!
//! Every block is an `M x M` sum of identity and permutation sub-matrices.
//! The rate 2/3 matrix prepends two block columns to the rate 1/2 matrix
//! and the rate 4/5 matrix prepends four more to the rate 2/3 one.

use super::bitmatrix::BinaryMatrix;
use super::permutation::permutation;
use super::{CodeParameters, Rate};
use crate::error::Result;
use log::debug;

/// One summand of a template block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Identity,
    Pi(usize),
}

use Term::{Identity as I, Pi};

const Z: &[Term] = &[];

type Template = [[&'static [Term]; 2]; 3];

// Block columns each rate adds in front of the previous rate's matrix.
const H23_PREFIX: Template = [
    [Z, Z],
    [&[Pi(9), Pi(10), Pi(11)], &[I]],
    [&[I], &[Pi(12), Pi(13), Pi(14)]],
];

const H45_PREFIX_OUTER: Template = [
    [Z, Z],
    [&[Pi(21), Pi(22), Pi(23)], &[I]],
    [&[I], &[Pi(24), Pi(25), Pi(26)]],
];

const H45_PREFIX_INNER: Template = [
    [Z, Z],
    [&[Pi(15), Pi(16), Pi(17)], &[I]],
    [&[I], &[Pi(18), Pi(19), Pi(20)]],
];

const H12: [[&[Term]; 5]; 3] = [
    [Z, Z, &[I], Z, &[I, Pi(1)]],
    [&[I], &[I], Z, &[I], &[Pi(2), Pi(3), Pi(4)]],
    [&[I], &[Pi(5), Pi(6)], Z, &[Pi(7), Pi(8)], &[I]],
];

/// Writes the mod-2 sum of `terms` into block `(br, bc)` of `h`.
fn place(h: &mut BinaryMatrix, m: usize, br: usize, bc: usize, terms: &[Term]) -> Result<()> {
    let (r0, c0) = (br * m, bc * m);
    for term in terms {
        match *term {
            Term::Identity => {
                for i in 0..m {
                    h.toggle(r0 + i, c0 + i);
                }
            }
            Term::Pi(k) => {
                let p = permutation(m, k)?;
                for (i, &c) in p.columns().iter().enumerate() {
                    h.toggle(r0 + i, c0 + c);
                }
            }
        }
    }
    Ok(())
}

fn from_template<const C: usize>(m: usize, template: &[[&[Term]; C]; 3]) -> Result<BinaryMatrix> {
    let mut h = BinaryMatrix::zeros(3 * m, C * m)?;
    for (br, row) in template.iter().enumerate() {
        for (bc, terms) in row.iter().enumerate() {
            place(&mut h, m, br, bc, terms)?;
        }
    }
    Ok(h)
}

/// Rate 1/2 parity-check matrix, `3M x 5M`.
pub fn h12(m: usize) -> Result<BinaryMatrix> {
    from_template(m, &H12)
}

/// Rate 2/3 parity-check matrix, `3M x 7M`, with [`h12`] as its last five
/// block columns.
pub fn h23(m: usize) -> Result<BinaryMatrix> {
    let prefix = from_template(m, &H23_PREFIX)?;
    BinaryMatrix::hstack(&[&prefix, &h12(m)?])
}

/// Rate 4/5 parity-check matrix, `3M x 11M`, with [`h23`] as its last seven
/// block columns.
pub fn h45(m: usize) -> Result<BinaryMatrix> {
    let outer = from_template(m, &H45_PREFIX_OUTER)?;
    let inner = from_template(m, &H45_PREFIX_INNER)?;
    BinaryMatrix::hstack(&[&outer, &inner, &h23(m)?])
}

/// Assembles the parity-check matrix of `rate` from `M x M` blocks.
pub fn assemble_h(m: usize, rate: Rate) -> Result<BinaryMatrix> {
    debug!("assembling H for rate {} with M={}", rate, m);
    match rate {
        Rate::R1_2 => h12(m),
        Rate::R2_3 => h23(m),
        Rate::R4_5 => h45(m),
    }
}

/// Parity-check matrix of a code, shape `(n - k + p) x (n + p)`.
pub fn parity_check(params: &CodeParameters) -> Result<BinaryMatrix> {
    assemble_h(params.m(), params.rate())
}
