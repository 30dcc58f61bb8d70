use ar4ja::ldpc::{assemble_h, invert, multiply, pack_generator, SparseIndex};
use ar4ja::{CodeParameters, Rate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_invert_parity_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert_parity_block");
    group.sample_size(10);
    for rate in Rate::ALL {
        let params = CodeParameters::new(1024, rate).unwrap();
        let h = assemble_h(params.m(), rate).unwrap();
        let p = h.columns(params.k()..h.cols()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rate.tag()), &p, |b, p| {
            b.iter(|| invert(black_box(p)).unwrap());
        });
    }
    group.finish();
}

fn bench_multiply(c: &mut Criterion) {
    let params = CodeParameters::new(1024, Rate::R1_2).unwrap();
    let h = assemble_h(params.m(), params.rate()).unwrap();
    let q = h.columns(0..params.k()).unwrap();
    let p_inv = invert(&h.columns(params.k()..h.cols()).unwrap()).unwrap();
    c.bench_function("multiply_pinv_q_r12", |b| {
        b.iter(|| multiply(black_box(&p_inv), black_box(&q)).unwrap());
    });
}

fn bench_encoders(c: &mut Criterion) {
    let params = CodeParameters::new(1024, Rate::R1_2).unwrap();
    let code = ar4ja::ldpc::generate(&params, false).unwrap();
    c.bench_function("sparse_index_r12", |b| {
        b.iter(|| SparseIndex::from_matrix(black_box(&code.parity_check)).unwrap());
    });
    c.bench_function("pack_generator_r12", |b| {
        b.iter(|| pack_generator(black_box(&code.generator), params.k(), params.circulant_size()).unwrap());
    });
}

criterion_group!(benches, bench_invert_parity_block, bench_multiply, bench_encoders);
criterion_main!(benches);
