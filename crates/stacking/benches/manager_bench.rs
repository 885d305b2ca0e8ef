//! Benchmarks for online placement and offline reorganization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use u_asrs_stacking::{AsrsManager, BinConfig, Item, ManagerConfig, RotationConstraint};

fn manager() -> AsrsManager {
    let online: Vec<u32> = vec![10, 9, 11, 8, 12, 7, 13, 6, 14, 5, 15, 4, 16, 3, 17, 2, 18];
    let mut offline = online.clone();
    offline.reverse();
    let config = ManagerConfig::new(BinConfig::new(100.0, 1000.0, 100.0, 5.0), online, offline)
        .with_pallet_bins(vec![1, 19])
        .with_pallet_count(150);
    AsrsManager::from_config(config).unwrap()
}

fn arrivals(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| {
            Item::new(
                format!("B{}", i),
                20.0 + ((i * 13) % 70) as f64,
                10.0 + ((i * 37) % 80) as f64,
                15.0 + ((i * 7) % 60) as f64,
            )
            .with_rotation(if i % 2 == 0 {
                RotationConstraint::Free
            } else {
                RotationConstraint::Fixed
            })
        })
        .collect()
}

fn manager_benchmark(c: &mut Criterion) {
    let items = arrivals(100);

    c.bench_function("place_100_items_online", |b| {
        b.iter(|| {
            let mut manager = manager();
            for item in items.iter().cloned() {
                let _ = black_box(manager.place_item_online(item));
            }
            black_box(manager)
        })
    });

    let mut loaded = manager();
    for item in items.iter().cloned() {
        let _ = loaded.place_item_online(item);
    }

    c.bench_function("reorganize_100_items", |b| {
        b.iter(|| {
            let mut manager = loaded.clone();
            black_box(manager.reorganize_offline())
        })
    });
}

criterion_group!(benches, manager_benchmark);
criterion_main!(benches);
