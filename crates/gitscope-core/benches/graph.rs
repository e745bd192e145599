use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gitscope_core::{
    CommitGraph, CommitId, CommitRecord, DisplayList, Point, Signature, Size, Theme, Viewport,
    render,
};

fn synthetic_history(n: usize) -> Vec<CommitRecord> {
    (0..n)
        .map(|i| CommitRecord {
            id: CommitId::new(format!("{:040x}", i)),
            message: format!("commit number {i}\n\nlonger body text for realism"),
            author: Signature::new(if i % 3 == 0 { "alice" } else { "bob" }),
            timestamp: 1_600_000_000 + i as i64 * 60,
            parents: if i + 1 < n {
                vec![CommitId::new(format!("{:040x}", i + 1))]
            } else {
                vec![]
            },
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let records = synthetic_history(1_000);
    c.bench_function("build_1000_commits", |b| {
        b.iter(|| CommitGraph::build(black_box(&records)))
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let graph = CommitGraph::build(&synthetic_history(1_000));
    let viewport = Viewport::new();
    c.bench_function("hit_test_1000_commits", |b| {
        b.iter(|| viewport.hit_test(black_box(&graph), Point::new(50.0, 30_050.0)))
    });
}

fn bench_render(c: &mut Criterion) {
    let graph = CommitGraph::build(&synthetic_history(1_000));
    let viewport = Viewport::new();
    let theme = Theme::default();
    let canvas = Size::new(1920.0, 1080.0);
    c.bench_function("render_1000_commits", |b| {
        b.iter(|| {
            let mut list = DisplayList::new();
            render(&mut list, canvas, black_box(&graph), &viewport, &theme).unwrap();
            list
        })
    });
}

criterion_group!(benches, bench_build, bench_hit_test, bench_render);
criterion_main!(benches);
