use bitvec::prelude::*;
use channel_codes::cs::ecc::{
    BlockCode, BlockInterleaver, CyclicCode, ExtendedHammingCode, HammingCode, IterativeCode, Word,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_word(rng: &mut StdRng, len: usize) -> Word {
    (0..len).map(|_| rng.gen_bool(0.5)).collect()
}

fn with_single_error(codeword: &Word, position: usize) -> Word {
    let mut received = codeword.clone();
    let bit = !received[position];
    received.set(position, bit);
    received
}

fn bench_code<C: BlockCode>(c: &mut Criterion, name: &str, code: &C) {
    let mut rng = StdRng::seed_from_u64(7);
    let message = random_word(&mut rng, code.information_len());
    let codeword = code.encode(&message).unwrap();
    let received = with_single_error(&codeword, code.codeword_len() / 2);

    let mut group = c.benchmark_group(name);
    group.bench_function("encode", |b| b.iter(|| code.encode(black_box(&message))));
    group.bench_function("decode_clean", |b| {
        b.iter(|| code.decode(black_box(&codeword)))
    });
    group.bench_function("decode_single_error", |b| {
        b.iter(|| code.decode(black_box(&received)))
    });
    group.finish();
}

fn bench_block_codes(c: &mut Criterion) {
    bench_code(c, "hamming_7_4", &HammingCode::standard_7_4());
    bench_code(c, "hamming_26_5", &HammingCode::new(26, 5).unwrap());
    bench_code(c, "extended_hamming_8_4", &ExtendedHammingCode::extended_8_4());
    bench_code(c, "cyclic_7_4", &CyclicCode::standard_7_4());
    bench_code(
        c,
        "cyclic_15_11",
        &CyclicCode::new(11, 15, bits![u8, Msb0; 1, 0, 0, 1, 1]).unwrap(),
    );
    bench_code(c, "iterative_8x8", &IterativeCode::new(8, 8).unwrap());
}

fn bench_interleaver(c: &mut Criterion) {
    let mut group = c.benchmark_group("interleaver_hamming_11_4");
    let interleaver = BlockInterleaver::hamming(11, 4).unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    for size in [88, 880, 8800].iter() {
        let message = random_word(&mut rng, *size);
        let encoded = interleaver.encode(&message).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &message, |b, message| {
            b.iter(|| interleaver.encode(black_box(message)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| interleaver.decode(black_box(encoded)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_block_codes, bench_interleaver);
criterion_main!(benches);
