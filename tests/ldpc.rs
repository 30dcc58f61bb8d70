use ar4ja::ldpc::{
    expand_compact, generate, invert, multiply, pack_generator, pack_parity_check, permutation,
    tables::SUBMATRIX_SIZES, unpunctured_generator, check_membership, SparseIndex,
};
use ar4ja::{BinaryMatrix, CodeParameters, GeneratedCode, Rate};
use once_cell::sync::Lazy;

static R12: Lazy<GeneratedCode> = Lazy::new(|| code(Rate::R1_2));
static R23: Lazy<GeneratedCode> = Lazy::new(|| code(Rate::R2_3));
static R45: Lazy<GeneratedCode> = Lazy::new(|| code(Rate::R4_5));

fn code(rate: Rate) -> GeneratedCode {
    let params = CodeParameters::new(1024, rate).unwrap();
    generate(&params, true).unwrap()
}

fn k1024() -> [(&'static GeneratedCode, Rate); 3] {
    [(&*R12, Rate::R1_2), (&*R23, Rate::R2_3), (&*R45, Rate::R4_5)]
}

fn crc_le_u32(words: &[u32]) -> u32 {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    crc32fast::hash(&bytes)
}

fn crc_be_u32(words: &[u32]) -> u32 {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    crc32fast::hash(&bytes)
}

fn crc_u16(values: &[u16]) -> u32 {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    crc32fast::hash(&bytes)
}

/// Parity block of G expanded into firmware words, one row after another.
fn expanded_words(code: &GeneratedCode) -> Vec<u32> {
    let p = &code.params;
    let packed = pack_generator(&code.generator, p.k(), p.circulant_size()).unwrap();
    let block = expand_compact(&packed, p.k(), p.n(), p.circulant_size()).unwrap();
    pack_parity_check(&block).unwrap()
}

#[test]
fn every_permutation_is_a_permutation() {
    for &m in SUBMATRIX_SIZES.iter() {
        for k in 1..=26 {
            let p = permutation(m, k).unwrap();
            let mut seen = vec![false; m];
            for &c in p.columns() {
                assert!(c < m);
                assert!(!seen[c], "pi_{} of size {} repeats column {}", k, m, c);
                seen[c] = true;
            }
        }
    }
}

#[test]
fn pi_1_row_0_for_m128() {
    assert_eq!(permutation(128, 1).unwrap().column(0), 97);
}

#[test]
fn shapes_of_k1024_codes() {
    for (code, rate) in k1024() {
        let p = CodeParameters::new(1024, rate).unwrap();
        assert_eq!(code.parity_check.shape(), (3 * p.m(), p.n() + p.m()));
        assert_eq!(code.generator.shape(), (1024, p.n()));
        assert!(code.generator.columns(0..1024).unwrap().is_identity());
    }
    assert_eq!(R12.parity_check.shape(), (1536, 2560));
    assert_eq!(R12.generator.shape(), (1024, 2048));
}

#[test]
fn edge_counts() {
    assert_eq!(R12.edges(), 7680);
    assert_eq!(R23.edges(), 5888);
    assert_eq!(R45.edges(), 4992);
}

#[test]
fn unpunctured_generator_is_orthogonal_to_h() {
    for (code, _) in k1024() {
        let g_full = unpunctured_generator(&code.parity_check, &code.params).unwrap();
        assert!(check_membership(&code.parity_check, &g_full).unwrap());
        let product = multiply(&code.parity_check, &g_full.transpose().unwrap()).unwrap();
        assert_eq!(product.shape(), (code.params.check_rows(), 1024));
        assert!(product.is_zero());
        assert_eq!(g_full.columns(0..code.params.n()).unwrap(), code.generator);
    }
}

#[test]
fn parity_block_inverse() {
    for (code, _) in k1024() {
        let k = code.params.k();
        let p = code.parity_check.columns(k..code.parity_check.cols()).unwrap();
        let p_inv = invert(&p).unwrap();
        assert!(multiply(&p_inv, &p).unwrap().is_identity());
        assert!(multiply(&p, &p_inv).unwrap().is_identity());
    }
}

#[test]
fn dense_parity_check_reference_crc() {
    assert_eq!(crc_le_u32(&pack_parity_check(&R45.parity_check).unwrap()), 0x90224F9A);
    assert_eq!(crc_le_u32(&pack_parity_check(&R23.parity_check).unwrap()), 0x0A8EFA1C);
    assert_eq!(crc_le_u32(&pack_parity_check(&R12.parity_check).unwrap()), 0x2CD11363);
}

#[test]
fn expanded_generator_reference_crc() {
    assert_eq!(crc_be_u32(&expanded_words(&R45)), 0x452FE118);
    assert_eq!(crc_be_u32(&expanded_words(&R23)), 0xBCCBA8D0);
    assert_eq!(crc_be_u32(&expanded_words(&R12)), 0x1597B6F6);
}

#[test]
fn compact_generator_first_words() {
    let expected: [(&GeneratedCode, [u32; 4]); 3] = [
        (&*R12, [0xCFA794F4, 0x9FA5A0D8, 0x8BB31D8F, 0xCA7EA8BB]),
        (&*R23, [0x51236781, 0x781D416A, 0xB0C8419F, 0xA21559A8]),
        (&*R45, [0x678ECB51, 0xFE821D5C, 0xFA5F424B, 0xF55927AA]),
    ];
    for (code, first) in expected {
        let p = &code.params;
        let words = pack_generator(&code.generator, p.k(), p.circulant_size()).unwrap();
        assert_eq!(words.len(), 256);
        assert_eq!(words.len() * 32 * p.circulant_size(), p.k() * (p.n() - p.k()));
        assert_eq!(&words[..4], &first);
    }
}

#[test]
fn compact_generator_expands_to_parity_block() {
    for (code, _) in k1024() {
        let p = &code.params;
        let words = pack_generator(&code.generator, p.k(), p.circulant_size()).unwrap();
        let block = expand_compact(&words, p.k(), p.n(), p.circulant_size()).unwrap();
        assert_eq!(block, code.parity_block().unwrap());
    }
}

#[test]
fn sparse_tables_reference_crc() {
    let expected: [(&GeneratedCode, [u32; 4]); 3] = [
        (&*R45, [0x07699182, 0xF5386F36, 0x3951ACFF, 0x2C89D420]),
        (&*R23, [0x6DFECCF6, 0xE3AC8063, 0xDC800AEB, 0xD737D4FD]),
        (&*R12, [0x6805D4C6, 0x5F00D915, 0x4139AA3E, 0xE7FDABD1]),
    ];
    for (code, crcs) in expected {
        let s = SparseIndex::from_matrix(&code.parity_check).unwrap().to_u16().unwrap();
        let got = [
            crc_u16(&s.check_cols),
            crc_u16(&s.check_row_starts),
            crc_u16(&s.data_rows),
            crc_u16(&s.data_col_starts),
        ];
        assert_eq!(got, crcs);
    }
}

#[test]
fn sparse_round_trip() {
    for (code, _) in k1024() {
        let s = SparseIndex::from_matrix(&code.parity_check).unwrap();
        s.validate().unwrap();
        assert_eq!(s.edges(), code.edges());
        assert_eq!(*s.check_row_starts.last().unwrap() as usize, s.edges());
        assert_eq!(*s.data_col_starts.last().unwrap() as usize, s.edges());
        let by_rows = s.rows_to_dense().unwrap();
        let by_cols = s.cols_to_dense().unwrap();
        assert_eq!(by_rows, code.parity_check);
        assert_eq!(by_cols, code.parity_check);
    }
}

#[test]
fn generator_rows_are_codewords_of_the_unpunctured_code() {
    // any sum of generator rows must also satisfy every parity check once
    // the punctured bits are restored
    let code = &*R45;
    let g_full = unpunctured_generator(&code.parity_check, &code.params).unwrap();
    let mut rows = BinaryMatrix::zeros(1, g_full.cols()).unwrap();
    for r in [0usize, 17, 512, 1023] {
        for c in g_full.row_ones(r) {
            rows.toggle(0, c);
        }
    }
    let syndrome = multiply(&code.parity_check, &rows.transpose().unwrap()).unwrap();
    assert!(syndrome.is_zero());
}
