use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stmap::align::{align, map_reads, MapOpt, Mode, ScoreTable};
use stmap::index::SuffixTree;
use stmap::util::Sequence;

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len + 1);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn with_sentinel(mut seq: Vec<u8>) -> Vec<u8> {
    seq.push(b'$');
    seq
}

fn bench_build_tree(c: &mut Criterion) {
    let text = with_sentinel(make_reference(10_000));

    c.bench_function("suffix_tree_build_10k", |b| {
        b.iter(|| {
            black_box(SuffixTree::build(black_box(&text), 25).unwrap());
        })
    });
}

fn bench_find_loc(c: &mut Criterion) {
    let text = with_sentinel(make_reference(10_000));
    let tree = SuffixTree::build(&text, 25).unwrap();
    let read = &text[500..600];

    c.bench_function("find_loc_100bp", |b| {
        b.iter(|| {
            black_box(tree.find_loc(black_box(read)));
        })
    });
}

fn bench_lcs(c: &mut Criterion) {
    let text = with_sentinel(make_reference(10_000));
    let tree = SuffixTree::build(&text, 0).unwrap();

    c.bench_function("lcs_10k", |b| {
        b.iter(|| {
            black_box(tree.lcs());
        })
    });
}

fn bench_global_align(c: &mut Criterion) {
    let s1 = make_reference(200);
    let mut s2 = s1.clone();
    s2[50] = b'N';
    s2.remove(120);
    let table = ScoreTable::default();

    c.bench_function("global_align_200bp", |b| {
        b.iter(|| {
            black_box(align(black_box(&s1), black_box(&s2), &table, Mode::Global).unwrap());
        })
    });
}

fn bench_local_align(c: &mut Criterion) {
    let reference = make_reference(300);
    let read = reference[100..200].to_vec();
    let table = ScoreTable::default();

    c.bench_function("local_align_100bp_in_300bp", |b| {
        b.iter(|| {
            black_box(align(black_box(&reference), black_box(&read), &table, Mode::Local).unwrap());
        })
    });
}

fn bench_map_reads(c: &mut Criterion) {
    let reference = make_reference(20_000);
    let gene = Sequence::new("gene", reference.clone());
    let reads: Vec<Sequence> = (0..50)
        .map(|k| {
            let p = 100 + k * 350;
            Sequence::new(format!("r{}", k), reference[p..p + 100].to_vec())
        })
        .collect();
    let table = ScoreTable::default();
    let opt = MapOpt { threads: 2, ..MapOpt::default() };

    c.bench_function("map_50_reads_20k", |b| {
        b.iter(|| {
            black_box(map_reads(&gene, black_box(&reads), &table, &opt).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_build_tree,
    bench_find_loc,
    bench_lcs,
    bench_global_align,
    bench_local_align,
    bench_map_reads,
);
criterion_main!(benches);
