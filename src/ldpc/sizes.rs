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

//! RAM needed by the firmware encoders and decoders for one code.

use super::CodeParameters;
use serde::Serialize;
use std::fmt::Write;

/// Buffer sizes in bytes. Sparse tables use 16-bit entries, soft values
/// are 32-bit floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareSizes {
    pub n: usize,
    pub k: usize,
    pub p: usize,
    /// Ones in the parity-check matrix.
    pub edges: usize,
    pub dense_h: usize,
    pub ci: usize,
    pub cs: usize,
    pub vi: usize,
    pub vs: usize,
    pub generator: usize,
    pub bf_work_area: usize,
    pub mp_llrs: usize,
    pub mp_work_area: usize,
    pub decoder_out: usize,
}

impl FirmwareSizes {
    pub fn new(params: &CodeParameters, edges: usize) -> Self {
        let (n, k, p) = (params.n(), params.k(), params.punctured());
        Self {
            n,
            k,
            p,
            edges,
            dense_h: (n + p) * (n - k + p) / 8,
            ci: 2 * edges,
            cs: 2 * (n - k + p + 1),
            vi: 2 * edges,
            vs: 2 * (n + p + 1),
            generator: k * (n - k) / 8,
            bf_work_area: 9 * (n + p) / 8,
            mp_llrs: 4 * n,
            mp_work_area: 8 * edges,
            decoder_out: (n + p) / 8,
        }
    }

    /// Codeword buffer only.
    pub fn tx_small(&self) -> usize {
        self.n / 8
    }

    /// Expanded generator plus codeword buffer.
    pub fn tx_fast(&self) -> usize {
        self.generator + self.n / 8
    }

    /// Bit-flipping decoder. The column lists are only needed to recover
    /// punctured bits.
    pub fn rx_bit_flip(&self) -> usize {
        let mut sum = self.ci + self.cs + self.bf_work_area + self.decoder_out + self.n / 8;
        if self.p > 0 {
            sum += self.vi + self.vs;
        }
        sum
    }

    /// Message-passing decoder.
    pub fn rx_message_passing(&self) -> usize {
        self.ci + self.cs + self.vi + self.vs + self.mp_llrs + self.mp_work_area + self.decoder_out + self.n / 8
    }
}

/// Renders the RAM requirements of each code as a markdown table.
pub fn render_memory_table(sizes: &[FirmwareSizes]) -> String {
    let mut out = String::new();
    out.push_str("| Code          | TX Small | TX Fast  | RX BF    | RX MP    |\n");
    out.push_str("|---------------|----------|----------|----------|----------|\n");
    for s in sizes {
        let code = format!("({}, {})", s.n, s.k);
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "| {:<13} | {:>8} | {:>8} | {:>8} | {:>8} |",
            code,
            s.tx_small(),
            s.tx_fast(),
            s.rx_bit_flip(),
            s.rx_message_passing()
        );
    }
    out
}
