use ar4ja::ldpc::{invert, multiply};
use ar4ja::{BinaryMatrix, LdpcError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, keep: impl Fn(usize, usize) -> bool) -> BinaryMatrix {
    let mut m = BinaryMatrix::zeros(rows, cols).unwrap();
    for r in 0..rows {
        for c in 0..cols {
            if keep(r, c) && rng.gen_bool(0.5) {
                m.set(r, c, true);
            }
        }
    }
    m
}

fn swap_rows(m: &mut BinaryMatrix, i: usize, j: usize) {
    for c in 0..m.cols() {
        let (x, y) = (m.get(i, c), m.get(j, c));
        m.set(i, c, y);
        m.set(j, c, x);
    }
}

/// Random invertible matrix: unit lower times unit upper triangular, with
/// the rows shuffled so pivots leave the diagonal.
fn random_invertible(rng: &mut StdRng, n: usize) -> BinaryMatrix {
    let mut l = random_matrix(rng, n, n, |r, c| c < r);
    let mut u = random_matrix(rng, n, n, |r, c| c > r);
    for i in 0..n {
        l.set(i, i, true);
        u.set(i, i, true);
    }
    let mut a = multiply(&l, &u).unwrap();
    for _ in 0..n {
        let (i, j) = (rng.gen_range(0..n), rng.gen_range(0..n));
        if i != j {
            swap_rows(&mut a, i, j);
        }
    }
    a
}

#[test]
fn random_matrices_invert() {
    let mut rng = StdRng::seed_from_u64(0x1234);
    for &n in &[1usize, 2, 63, 64, 65, 130, 257] {
        let a = random_invertible(&mut rng, n);
        let inv = invert(&a).unwrap();
        assert!(multiply(&a, &inv).unwrap().is_identity(), "n={}", n);
        assert!(multiply(&inv, &a).unwrap().is_identity(), "n={}", n);
        assert_eq!(invert(&inv).unwrap(), a);
    }
}

#[test]
fn repeated_row_is_singular() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut a = random_invertible(&mut rng, 100);
    for c in 0..100 {
        let v = a.get(10, c);
        a.set(90, c, v);
    }
    match invert(&a) {
        Err(LdpcError::Singular { row }) => assert!(row <= 90),
        other => panic!("expected a singular matrix, got {:?}", other.map(|m| m.shape())),
    }
}

#[test]
fn random_products_associate() {
    let mut rng = StdRng::seed_from_u64(99);
    let a = random_matrix(&mut rng, 40, 70, |_, _| true);
    let b = random_matrix(&mut rng, 70, 90, |_, _| true);
    let c = random_matrix(&mut rng, 90, 33, |_, _| true);
    let left = multiply(&multiply(&a, &b).unwrap(), &c).unwrap();
    let right = multiply(&a, &multiply(&b, &c).unwrap()).unwrap();
    assert_eq!(left, right);
    let t = multiply(&c.transpose().unwrap(), &b.transpose().unwrap()).unwrap();
    assert_eq!(t, multiply(&b, &c).unwrap().transpose().unwrap());
}
