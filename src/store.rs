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

//! On-disk cache of generated matrices, one bincode file per code.

use crate::error::{LdpcError, Result};
use crate::ldpc::{BinaryMatrix, CodeParameters, GeneratedCode, Rate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
struct StoredMatrix {
    rows: u64,
    cols: u64,
    words: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct Record {
    k: u64,
    rate: Rate,
    generator: StoredMatrix,
    parity_check: StoredMatrix,
    /// Hex SHA-256 over both matrices, see [`digest`].
    sha256: String,
}

impl StoredMatrix {
    fn from_matrix(m: &BinaryMatrix) -> Self {
        Self {
            rows: m.rows() as u64,
            cols: m.cols() as u64,
            words: m.words().to_vec(),
        }
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows as usize, self.cols as usize)
    }
}

fn digest(k: u64, rate: Rate, mats: [&StoredMatrix; 2]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(k.to_le_bytes());
    hasher.update(rate.tag().as_bytes());
    for m in mats {
        hasher.update(m.rows.to_le_bytes());
        hasher.update(m.cols.to_le_bytes());
        for w in &m.words {
            hasher.update(w.to_le_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// A directory of `ldpc_k{k}_r{rate}.bin` files.
#[derive(Debug, Clone)]
pub struct MatrixStore {
    dir: PathBuf,
}

impl MatrixStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, params: &CodeParameters) -> PathBuf {
        self.dir
            .join(format!("ldpc_k{}_r{}.bin", params.k(), params.rate().tag()))
    }

    pub fn contains(&self, params: &CodeParameters) -> bool {
        self.path_for(params).is_file()
    }

    /// Writes both matrices of `code`, replacing any earlier file.
    pub fn save(&self, code: &GeneratedCode) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&code.params);
        let generator = StoredMatrix::from_matrix(&code.generator);
        let parity_check = StoredMatrix::from_matrix(&code.parity_check);
        let k = code.params.k() as u64;
        let rate = code.params.rate();
        let record = Record {
            k,
            rate,
            sha256: digest(k, rate, [&generator, &parity_check]),
            generator,
            parity_check,
        };

        let mut out = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut out, &record)?;
        out.flush()?;
        info!("{}: saved to {}", code.params, path.display());
        Ok(path)
    }

    /// Reads the matrices of `params`, checking shapes and digest.
    pub fn load(&self, params: &CodeParameters) -> Result<GeneratedCode> {
        let path = self.path_for(params);
        let corrupt = |reason: String| LdpcError::CorruptStore {
            path: path.display().to_string(),
            reason,
        };

        let record: Record = bincode::deserialize_from(BufReader::new(File::open(&path)?))?;
        if record.k != params.k() as u64 || record.rate != params.rate() {
            return Err(corrupt(format!(
                "holds k={} rate {}, expected k={} rate {}",
                record.k,
                record.rate,
                params.k(),
                params.rate()
            )));
        }
        let expected = digest(record.k, record.rate, [&record.generator, &record.parity_check]);
        if expected != record.sha256 {
            return Err(corrupt(format!("digest {} does not match contents ({})", record.sha256, expected)));
        }

        let g_shape = (params.k(), params.n());
        let h_shape = (params.check_rows(), params.variable_cols());
        if record.generator.shape() != g_shape || record.parity_check.shape() != h_shape {
            return Err(corrupt(format!(
                "matrix shapes {:?} and {:?}, expected {:?} and {:?}",
                record.generator.shape(),
                record.parity_check.shape(),
                g_shape,
                h_shape
            )));
        }
        let generator = BinaryMatrix::from_words(g_shape.0, g_shape.1, &record.generator.words)
            .map_err(|e| corrupt(e.to_string()))?;
        let parity_check = BinaryMatrix::from_words(h_shape.0, h_shape.1, &record.parity_check.words)
            .map_err(|e| corrupt(e.to_string()))?;
        debug!("{}: loaded from {}", params, path.display());
        Ok(GeneratedCode {
            params: *params,
            parity_check,
            generator,
        })
    }
}
