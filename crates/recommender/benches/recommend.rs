//! Benchmarks for the recommendation pipeline
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a generated table so it runs without any dataset on disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{ItemId, ItemUserIndex, UserRatingTable};
use recommender::{find_neighbors, similarity, RecommendationEngine};
use std::collections::HashSet;

const USERS: u32 = 2_000;
const ITEMS: u32 = 1_500;

fn build_table() -> UserRatingTable {
    let mut table = UserRatingTable::new();
    for user_id in 1..=USERS {
        for i in 0..40u32 {
            let item_id = 1 + (user_id * 31 + i * i * 17) % ITEMS;
            let rating = 0.5 + ((user_id + i * 7) % 10) as f64 * 0.5;
            table.insert_rating(user_id, item_id, rating);
        }
    }
    table
}

fn bench_similarity(c: &mut Criterion) {
    let table = build_table();
    let a = table.profile(1).unwrap().clone();
    let b = table.profile(2).unwrap().clone();

    c.bench_function("similarity", |bench| {
        bench.iter(|| black_box(similarity(black_box(&a), black_box(&b))))
    });
}

fn bench_find_neighbors(c: &mut Criterion) {
    let table = build_table();
    let index = ItemUserIndex::build(&table);
    let target = table.profile(1).unwrap().clone();

    c.bench_function("find_neighbors", |bench| {
        bench.iter(|| black_box(find_neighbors(black_box(&target), &table, &index).unwrap()))
    });
}

fn bench_recommend(c: &mut Criterion) {
    let table = build_table();
    let known: HashSet<ItemId> = (1..=ITEMS).collect();
    let engine = RecommendationEngine::default();
    let target = table.profile(1).unwrap().clone();

    c.bench_function("recommend_top_20", |bench| {
        bench.iter(|| black_box(engine.recommend(black_box(&target), &table, &known, 20).unwrap()))
    });
}

criterion_group!(benches, bench_similarity, bench_find_neighbors, bench_recommend);
criterion_main!(benches);
