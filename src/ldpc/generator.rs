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

//! Systematic generator matrices (CCSDS 131.0-B-2, section 7.4.3).

use super::bitmatrix::BinaryMatrix;
use super::gf2::{invert, multiply};
use super::parity::parity_check;
use super::CodeParameters;
use crate::error::{LdpcError, Result};
use crate::telemetry;
use log::{debug, error, info};
use rayon::prelude::*;
use std::time::Instant;

/// The matrices of one code.
#[derive(Debug)]
pub struct GeneratedCode {
    pub params: CodeParameters,
    /// Parity-check matrix, `(n - k + p) x (n + p)`.
    pub parity_check: BinaryMatrix,
    /// Transmitted systematic generator, `k x n`.
    pub generator: BinaryMatrix,
}

impl GeneratedCode {
    /// The `k x (n - k)` parity block of the generator.
    pub fn parity_block(&self) -> Result<BinaryMatrix> {
        self.generator.columns(self.params.k()..self.params.n())
    }

    /// Number of ones in the parity-check matrix.
    pub fn edges(&self) -> usize {
        self.parity_check.count_ones()
    }
}

fn check_h_shape(h: &BinaryMatrix, params: &CodeParameters, op: &'static str) -> Result<()> {
    let expected = (params.check_rows(), params.variable_cols());
    if h.shape() != expected {
        return Err(LdpcError::ShapeMismatch {
            op,
            left: h.shape(),
            right: expected,
        });
    }
    Ok(())
}

/// Builds `G_full = [I_k | (P^-1 Q)^T]`, the generator of the code before
/// puncturing, shape `k x (n + p)`.
///
/// `Q` is the first `k` columns of `h` and `P` the last `3M`.
pub fn unpunctured_generator(h: &BinaryMatrix, params: &CodeParameters) -> Result<BinaryMatrix> {
    check_h_shape(h, params, "unpunctured_generator")?;
    let k = params.k();
    let q = h.columns(0..k)?;
    let p = h.columns(k..h.cols())?;

    let started = Instant::now();
    let p_inv = invert(&p)?;
    debug!("{}: inverted {}x{} parity block in {:?}", params, p.rows(), p.cols(), started.elapsed());

    let w = multiply(&p_inv, &q)?.transpose()?;
    let identity = BinaryMatrix::identity(k)?;
    BinaryMatrix::hstack(&[&identity, &w])
}

/// Drops the last `M` columns of an unpunctured generator.
///
/// The first `M` parity columns of the codeword are never transmitted, and
/// with the column ordering of the block templates those are the trailing
/// columns of `G_full` (sections 7.4.3.3 and 7.4.3.4). What remains is the
/// `k x n` generator of the transmitted code.
pub fn puncture(g_full: &BinaryMatrix, params: &CodeParameters) -> Result<BinaryMatrix> {
    if g_full.shape() != (params.k(), params.variable_cols()) {
        return Err(LdpcError::ShapeMismatch {
            op: "puncture",
            left: g_full.shape(),
            right: (params.k(), params.variable_cols()),
        });
    }
    g_full.columns(0..params.n())
}

/// Builds the transmitted generator `G` (`k x n`) from `h`.
pub fn build_generator(h: &BinaryMatrix, params: &CodeParameters) -> Result<BinaryMatrix> {
    let g_full = unpunctured_generator(h, params)?;
    puncture(&g_full, params)
}

/// Checks `H * G^T == 0 (mod 2)`.
///
/// `g` must span the full column range of `h`, so this takes the
/// unpunctured generator.
pub fn check_membership(h: &BinaryMatrix, g: &BinaryMatrix) -> Result<bool> {
    if h.cols() != g.cols() {
        return Err(LdpcError::ShapeMismatch {
            op: "check_membership",
            left: h.shape(),
            right: g.shape(),
        });
    }
    Ok(multiply(h, &g.transpose()?)?.is_zero())
}

/// Like [`check_membership`], but a non-zero product is an error that
/// names the code and the number of violated checks.
pub fn verify_generator(h: &BinaryMatrix, g_full: &BinaryMatrix, params: &CodeParameters) -> Result<()> {
    if h.cols() != g_full.cols() {
        return Err(LdpcError::ShapeMismatch {
            op: "verify_generator",
            left: h.shape(),
            right: g_full.shape(),
        });
    }
    let product = multiply(h, &g_full.transpose()?)?;
    if product.is_zero() {
        return Ok(());
    }
    Err(LdpcError::NotOrthogonal {
        k: params.k(),
        rate: params.rate().to_string(),
        ones: product.count_ones(),
    })
}

fn generate_inner(params: &CodeParameters, verify: bool) -> Result<GeneratedCode> {
    info!("{}: assembling parity-check matrix", params);
    let h = parity_check(params)?;

    info!("{}: deriving generator from {}x{} H", params, h.rows(), h.cols());
    let g_full = unpunctured_generator(&h, params)?;
    if verify {
        verify_generator(&h, &g_full, params)?;
    }
    let generator = puncture(&g_full, params)?;
    Ok(GeneratedCode {
        params: *params,
        parity_check: h,
        generator,
    })
}

/// Builds H and G for one code.
///
/// With `verify` set, the unpunctured generator is checked against H before
/// it is truncated. Any failure is reported against the `(k, rate)` pair.
pub fn generate(params: &CodeParameters, verify: bool) -> Result<GeneratedCode> {
    let started = Instant::now();
    match generate_inner(params, verify) {
        Ok(code) => {
            telemetry::CODES_GENERATED.inc();
            let rss = telemetry::update_memory_usage();
            info!(
                "{}: done in {:?}, {} edges, resident memory {} MiB",
                params,
                started.elapsed(),
                code.edges(),
                rss / (1024 * 1024)
            );
            Ok(code)
        }
        Err(e) => {
            telemetry::CODES_FAILED.inc();
            error!("{}: generation failed: {}", params, e);
            Err(LdpcError::Generation {
                k: params.k(),
                rate: params.rate().to_string(),
                source: Box::new(e),
            })
        }
    }
}

/// Generates several codes, optionally in parallel. Results come back in
/// the order of `codes`.
pub fn generate_all(codes: &[CodeParameters], verify: bool, parallel: bool) -> Vec<Result<GeneratedCode>> {
    if parallel {
        codes.par_iter().map(|p| generate(p, verify)).collect()
    } else {
        codes.iter().map(|p| generate(p, verify)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc::Rate;

    #[test]
    fn rate_one_half_k1024() {
        let params = CodeParameters::new(1024, Rate::R1_2).unwrap();
        let code = generate(&params, true).unwrap();
        assert_eq!(code.parity_check.shape(), (1536, 2560));
        assert_eq!(code.generator.shape(), (1024, 2048));
        assert!(code.generator.columns(0..1024).unwrap().is_identity());
        assert_eq!(code.parity_block().unwrap().shape(), (1024, 1024));
    }

    #[test]
    fn puncturing_keeps_leading_columns() {
        let params = CodeParameters::new(1024, Rate::R4_5).unwrap();
        let h = parity_check(&params).unwrap();
        let g_full = unpunctured_generator(&h, &params).unwrap();
        assert!(check_membership(&h, &g_full).unwrap());
        let g = puncture(&g_full, &params).unwrap();
        assert_eq!(g, g_full.columns(0..params.n()).unwrap());
        assert!(check_membership(&h, &g).is_err());
    }

    #[test]
    fn corrupted_generator_is_not_orthogonal() {
        let params = CodeParameters::new(1024, Rate::R4_5).unwrap();
        let h = parity_check(&params).unwrap();
        let mut g_full = unpunctured_generator(&h, &params).unwrap();
        verify_generator(&h, &g_full, &params).unwrap();

        // one flipped parity bit breaks every check touching that column
        let col = params.k() + 5;
        let touched = (0..h.rows()).filter(|&r| h.get(r, col)).count();
        g_full.toggle(3, col);
        match verify_generator(&h, &g_full, &params) {
            Err(LdpcError::NotOrthogonal { k, rate, ones }) => {
                assert_eq!((k, rate.as_str()), (1024, "4/5"));
                assert_eq!(ones, touched);
            }
            other => panic!("expected NotOrthogonal, got {:?}", other),
        }
        assert!(!check_membership(&h, &g_full).unwrap());
    }

    #[test]
    fn wrong_h_shape_is_reported_with_code() {
        let params = CodeParameters::new(1024, Rate::R2_3).unwrap();
        let h = BinaryMatrix::zeros(10, 10).unwrap();
        assert!(matches!(
            build_generator(&h, &params),
            Err(LdpcError::ShapeMismatch { op: "unpunctured_generator", .. })
        ));
    }

    #[test]
    fn singular_parity_block_fails_generation() {
        let params = CodeParameters::new(1024, Rate::R1_2).unwrap();
        let h = BinaryMatrix::zeros(params.check_rows(), params.variable_cols()).unwrap();
        assert!(matches!(
            unpunctured_generator(&h, &params),
            Err(LdpcError::Singular { row: 0 })
        ));
    }
}
