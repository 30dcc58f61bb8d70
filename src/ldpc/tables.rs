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

//! Shift constants for the AR4JA circulant permutations, CCSDS 131.0-B-2
//! section 7.4.2.4, together with the sub-matrix size and code length
//! tables of section 7.4.2.

use crate::error::{LdpcError, Result};

/// Number of distinct permutation sub-matrices used by the three rates.
pub const NUM_PERMUTATIONS: usize = 26;

/// Supported sub-matrix sizes M, smallest first.
pub const SUBMATRIX_SIZES: [usize; 7] = [128, 256, 512, 1024, 2048, 4096, 8192];

/// Supported information block sizes k.
pub const INFO_SIZES: [usize; 3] = [1024, 4096, 16384];

/// Sub-matrix size M, by information size then rate (1/2, 2/3, 4/5).
pub const SUBMATRIX_SIZE_K_R: [[usize; 3]; 3] = [
    [512, 256, 128],
    [2048, 1024, 512],
    [8192, 4096, 2048],
];

/// Code length n, by information size then rate (1/2, 2/3, 4/5).
pub const CODE_LENGTH_K_R: [[usize; 3]; 3] = [
    [2048, 1536, 1280],
    [8192, 6144, 5120],
    [32768, 24576, 20480],
];

// Table 7-3
pub static THETA_K: [u8; NUM_PERMUTATIONS] = [
    3, 0, 1, 2, 2, 3, 0, 1, 0, 1, 2, 0, 2, 3, 0, 1, 2, 0, 1, 2, 0, 1, 2, 1, 2, 3,
];

// Tables 7-3 and 7-4, indexed by j (0..4), then by M, then by k - 1.
pub static PHI_J_M_K: [[[u16; NUM_PERMUTATIONS]; 7]; 4] = [
    // j = 0
    [
        // M = 128
        [
            1, 22, 0, 26, 0, 10, 5, 18, 3, 22, 3, 8, 25, 25, 2, 27, 7, 7, 15, 10, 4, 19, 7, 9, 26,
            17,
        ],
        // M = 256
        [
            59, 18, 52, 23, 11, 7, 22, 25, 27, 30, 43, 14, 46, 62, 44, 12, 38, 47, 1, 52, 61, 10,
            55, 7, 12, 2,
        ],
        // M = 512
        [
            16, 103, 105, 0, 50, 29, 115, 30, 92, 78, 70, 66, 39, 84, 79, 70, 29, 32, 45, 113, 86,
            1, 42, 118, 33, 126,
        ],
        // M = 1024
        [
            160, 241, 185, 251, 209, 103, 90, 184, 248, 12, 111, 66, 173, 42, 157, 174, 104, 144,
            43, 181, 250, 202, 68, 177, 170, 89,
        ],
        // M = 2048
        [
            108, 126, 238, 481, 96, 28, 59, 225, 323, 28, 386, 305, 34, 510, 147, 199, 347, 391,
            165, 414, 97, 158, 86, 168, 506, 489,
        ],
        // M = 4096
        [
            226, 618, 404, 32, 912, 950, 534, 63, 971, 304, 409, 708, 719, 176, 743, 759, 674, 958,
            984, 11, 413, 925, 687, 752, 867, 323,
        ],
        // M = 8192
        [
            1148, 2032, 249, 1807, 485, 1044, 717, 873, 364, 1926, 1241, 1769, 532, 768, 1138, 965,
            141, 1527, 505, 1312, 1840, 709, 1427, 989, 1925, 270,
        ],
    ],
    // j = 1
    [
        // M = 128
        [
            0, 27, 30, 28, 7, 1, 8, 20, 26, 24, 4, 12, 23, 15, 15, 22, 31, 3, 29, 21, 2, 5, 11, 26,
            9, 17,
        ],
        // M = 256
        [
            0, 32, 21, 36, 30, 29, 44, 29, 39, 14, 22, 15, 48, 55, 39, 11, 1, 50, 40, 62, 27, 38,
            40, 15, 11, 18,
        ],
        // M = 512
        [
            0, 53, 74, 45, 47, 0, 59, 102, 25, 3, 88, 65, 62, 68, 91, 70, 115, 31, 121, 45, 56, 54,
            108, 14, 30, 116,
        ],
        // M = 1024
        [
            0, 182, 249, 65, 70, 141, 237, 77, 55, 12, 227, 42, 52, 243, 179, 250, 247, 164, 17,
            31, 149, 105, 183, 153, 177, 19,
        ],
        // M = 2048
        [
            0, 375, 436, 350, 260, 84, 318, 382, 169, 213, 67, 313, 242, 188, 1, 306, 397, 80, 33,
            7, 447, 336, 424, 134, 152, 492,
        ],
        // M = 4096
        [
            0, 767, 227, 247, 284, 370, 482, 273, 886, 634, 762, 184, 696, 413, 854, 544, 864, 82,
            1009, 437, 36, 562, 816, 452, 290, 778,
        ],
        // M = 8192
        [
            0, 1822, 203, 882, 1989, 957, 1705, 1083, 1072, 354, 1942, 446, 1456, 1940, 1660, 1661,
            587, 708, 1466, 433, 1345, 867, 1551, 2041, 1383, 1790,
        ],
    ],
    // j = 2
    [
        // M = 128
        [
            0, 12, 30, 18, 10, 16, 13, 9, 7, 15, 16, 18, 4, 23, 5, 3, 29, 11, 4, 8, 2, 11, 11, 3,
            15, 13,
        ],
        // M = 256
        [
            0, 46, 45, 27, 48, 37, 41, 13, 9, 49, 36, 10, 11, 18, 54, 40, 27, 35, 25, 46, 24, 33,
            18, 37, 35, 21,
        ],
        // M = 512
        [
            0, 8, 119, 89, 31, 122, 1, 69, 92, 47, 11, 31, 19, 66, 49, 81, 96, 38, 83, 42, 58, 24,
            25, 92, 38, 120,
        ],
        // M = 1024
        [
            0, 35, 167, 214, 84, 206, 122, 67, 147, 54, 23, 93, 20, 197, 46, 162, 101, 76, 78, 253,
            124, 143, 63, 41, 214, 70,
        ],
        // M = 2048
        [
            0, 219, 16, 263, 415, 403, 184, 279, 198, 307, 432, 240, 454, 294, 479, 289, 373, 104,
            141, 270, 439, 333, 399, 14, 277, 412,
        ],
        // M = 4096
        [
            0, 254, 790, 642, 248, 899, 328, 518, 477, 404, 698, 160, 497, 100, 518, 92, 464, 592,
            198, 856, 235, 134, 542, 545, 777, 483,
        ],
        // M = 8192
        [
            0, 318, 494, 1467, 757, 1085, 1630, 64, 689, 1300, 148, 777, 1431, 659, 352, 1177, 836,
            1572, 348, 1040, 779, 476, 191, 1393, 1752, 1627,
        ],
    ],
    // j = 3
    [
        // M = 128
        [
            0, 13, 19, 14, 15, 20, 17, 4, 4, 11, 17, 20, 8, 22, 19, 15, 5, 21, 17, 9, 20, 18, 31,
            13, 2, 18,
        ],
        // M = 256
        [
            0, 44, 51, 12, 15, 12, 4, 7, 2, 30, 53, 23, 29, 37, 42, 48, 4, 10, 18, 56, 9, 11, 23,
            8, 7, 24,
        ],
        // M = 512
        [
            0, 35, 97, 112, 64, 93, 99, 94, 103, 91, 3, 6, 39, 113, 92, 119, 74, 73, 116, 31, 127,
            98, 23, 38, 18, 62,
        ],
        // M = 1024
        [
            0, 162, 7, 31, 164, 11, 237, 125, 133, 99, 105, 17, 97, 91, 211, 128, 82, 115, 248, 62,
            26, 140, 121, 12, 41, 249,
        ],
        // M = 2048
        [
            0, 312, 503, 388, 48, 7, 185, 328, 254, 202, 285, 11, 168, 127, 8, 437, 475, 85, 419,
            459, 468, 209, 311, 211, 510, 320,
        ],
        // M = 4096
        [
            0, 285, 554, 809, 185, 49, 101, 82, 898, 627, 154, 65, 81, 823, 50, 413, 462, 175, 715,
            537, 722, 37, 488, 179, 430, 264,
        ],
        // M = 8192
        [
            0, 1189, 458, 460, 1039, 1000, 1265, 1223, 874, 1292, 1491, 631, 464, 461, 844, 392,
            922, 256, 1986, 19, 266, 471, 1166, 1300, 1033, 1606,
        ],
    ],
];

/// Position of `m` in [`SUBMATRIX_SIZES`].
pub fn submatrix_index(m: usize) -> Result<usize> {
    SUBMATRIX_SIZES
        .iter()
        .position(|&s| s == m)
        .ok_or_else(|| LdpcError::InvalidParameter(format!("unsupported sub-matrix size M={}", m)))
}

/// Position of `k` in [`INFO_SIZES`].
pub fn info_size_index(k: usize) -> Result<usize> {
    INFO_SIZES
        .iter()
        .position(|&s| s == k)
        .ok_or_else(|| LdpcError::InvalidParameter(format!("unsupported information size k={}", k)))
}

fn check_permutation_index(k: usize) -> Result<()> {
    if (1..=NUM_PERMUTATIONS).contains(&k) {
        Ok(())
    } else {
        Err(LdpcError::InvalidParameter(format!(
            "permutation index {} outside 1..={}",
            k, NUM_PERMUTATIONS
        )))
    }
}

/// theta_k for a 1-based permutation index.
pub fn theta(k: usize) -> Result<usize> {
    check_permutation_index(k)?;
    Ok(THETA_K[k - 1] as usize)
}

/// phi_k(j, M) for a 1-based permutation index.
pub fn phi(j: usize, m: usize, k: usize) -> Result<usize> {
    check_permutation_index(k)?;
    if j >= 4 {
        return Err(LdpcError::InvalidParameter(format!("quadrant {} outside 0..4", j)));
    }
    let mi = submatrix_index(m)?;
    Ok(PHI_J_M_K[j][mi][k - 1] as usize)
}
