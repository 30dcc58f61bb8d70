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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LdpcError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unsupported code k={k} rate={rate}")]
    UnsupportedCode { k: usize, rate: String },
    #[error("matrix is singular over GF(2): no pivot in row {row}")]
    Singular { row: usize },
    #[error("generator of k={k} rate={rate} is not orthogonal to H: H * G^T has {ones} ones")]
    NotOrthogonal { k: usize, rate: String, ones: usize },
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("failed to allocate {words} words of matrix storage")]
    Allocation { words: usize },
    #[error("corrupt matrix store {path}: {reason}")]
    CorruptStore { path: String, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("generation failed for k={k} rate={rate}: {source}")]
    Generation {
        k: usize,
        rate: String,
        #[source]
        source: Box<LdpcError>,
    },
}

impl From<String> for LdpcError {
    fn from(s: String) -> Self {
        LdpcError::InvalidParameter(s)
    }
}

pub type Result<T> = std::result::Result<T, LdpcError>;
