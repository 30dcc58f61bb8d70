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

//! # AR4JA LDPC matrix generation (CCSDS 131.0-B-2)
//!
//! This module builds the parity-check matrices of the nine AR4JA codes from
//! their circulant permutation tables, derives the systematic generator
//! matrices by inverting the parity block over GF(2), and reduces both to the
//! compact tables used by firmware encoders and decoders.
//!
//! The pipeline, leaf first:
//! [`tables`] -> [`permutation`] -> [`parity`] -> [`generator`] (using
//! [`gf2`] on [`bitmatrix`] storage) -> [`encoder`] and [`sizes`].

use crate::error::{LdpcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod bitmatrix;
pub mod encoder;
pub mod generator;
pub mod gf2;
pub mod parity;
pub mod permutation;
pub mod sizes;
pub mod tables;

pub use bitmatrix::BinaryMatrix;
pub use encoder::*;
pub use generator::*;
pub use gf2::{invert, multiply};
pub use parity::*;
pub use permutation::*;
pub use sizes::*;

/// Code rate of an AR4JA code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rate {
    #[serde(rename = "1/2")]
    R1_2,
    #[serde(rename = "2/3")]
    R2_3,
    #[serde(rename = "4/5")]
    R4_5,
}

impl Rate {
    pub const ALL: [Rate; 3] = [Rate::R1_2, Rate::R2_3, Rate::R4_5];

    /// Number of M-wide information column blocks (K in section 7.4.3).
    pub fn info_blocks(self) -> usize {
        match self {
            Rate::R1_2 => 2,
            Rate::R2_3 => 4,
            Rate::R4_5 => 8,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Rate::R1_2 => 0,
            Rate::R2_3 => 1,
            Rate::R4_5 => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rate::R1_2 => "1/2",
            Rate::R2_3 => "2/3",
            Rate::R4_5 => "4/5",
        }
    }

    /// Rate without the slash, as used in file names.
    pub fn tag(self) -> &'static str {
        match self {
            Rate::R1_2 => "12",
            Rate::R2_3 => "23",
            Rate::R4_5 => "45",
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rate {
    type Err = LdpcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1/2" | "12" => Ok(Rate::R1_2),
            "2/3" | "23" => Ok(Rate::R2_3),
            "4/5" | "45" => Ok(Rate::R4_5),
            other => Err(LdpcError::InvalidParameter(format!("unknown rate '{}'", other))),
        }
    }
}

/// Parameters of one AR4JA code, fixed by its information size and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeParameters {
    k: usize,
    rate: Rate,
    m: usize,
    n: usize,
}

impl CodeParameters {
    pub fn new(k: usize, rate: Rate) -> Result<Self> {
        let ki = tables::info_size_index(k).map_err(|_| LdpcError::UnsupportedCode {
            k,
            rate: rate.to_string(),
        })?;
        Ok(Self {
            k,
            rate,
            m: tables::SUBMATRIX_SIZE_K_R[ki][rate.index()],
            n: tables::CODE_LENGTH_K_R[ki][rate.index()],
        })
    }

    /// All nine supported codes, by information size then rate.
    pub fn all() -> Vec<Self> {
        tables::INFO_SIZES
            .iter()
            .flat_map(|&k| Rate::ALL.iter().map(move |&r| (k, r)))
            .filter_map(|(k, r)| Self::new(k, r).ok())
            .collect()
    }

    /// Information length.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Sub-matrix size M.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Transmitted code length.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Punctured code bits, always one sub-matrix wide.
    pub fn punctured(&self) -> usize {
        self.m
    }

    /// Circulant size of the quasi-cyclic generator, M/4.
    pub fn circulant_size(&self) -> usize {
        self.m / 4
    }

    /// Rows of H, `n - k + p`.
    pub fn check_rows(&self) -> usize {
        3 * self.m
    }

    /// Columns of H, `n + p`.
    pub fn variable_cols(&self) -> usize {
        self.n + self.m
    }
}

impl fmt::Display for CodeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) rate {}", self.n, self.k, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_follow_tables() {
        let p = CodeParameters::new(1024, Rate::R1_2).unwrap();
        assert_eq!((p.n(), p.m(), p.punctured(), p.circulant_size()), (2048, 512, 512, 128));
        assert_eq!((p.check_rows(), p.variable_cols()), (1536, 2560));
        let p = CodeParameters::new(16384, Rate::R4_5).unwrap();
        assert_eq!((p.n(), p.m()), (20480, 2048));
        assert_eq!(p.k(), p.rate().info_blocks() * p.m());
    }

    #[test]
    fn unsupported_dimension_rejected() {
        assert!(matches!(
            CodeParameters::new(2048, Rate::R2_3),
            Err(LdpcError::UnsupportedCode { k: 2048, .. })
        ));
    }

    #[test]
    fn rate_parsing() {
        assert_eq!("2/3".parse::<Rate>().unwrap(), Rate::R2_3);
        assert_eq!("45".parse::<Rate>().unwrap(), Rate::R4_5);
        assert!("3/4".parse::<Rate>().is_err());
        assert_eq!(Rate::R1_2.to_string(), "1/2");
    }

    #[test]
    fn nine_codes() {
        let all = CodeParameters::all();
        assert_eq!(all.len(), 9);
        for p in all {
            assert_eq!(p.n() - p.k(), 2 * p.m());
        }
    }
}
