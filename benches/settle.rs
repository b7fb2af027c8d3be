use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roulette_table::engine::layout;
use roulette_table::engine::resolver::resolve;
use roulette_table::{Bet, BetCategory, Pocket, WheelKind};

fn full_table(wheel: WheelKind) -> Vec<Bet> {
    BetCategory::ALL
        .iter()
        .flat_map(|&category| {
            layout::legal_spots(category, wheel)
                .into_iter()
                .map(move |targets| Bet::new(category, targets, 5))
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let single = vec![Bet::new(BetCategory::Straight, [Pocket::Number(17)], 5)];
    let european = full_table(WheelKind::European);
    let american = full_table(WheelKind::American);

    c.bench_function("resolve_single_straight", |b| {
        b.iter(|| resolve(black_box(&single), black_box(1000), black_box(Pocket::Number(17))))
    });
    c.bench_function("resolve_every_european_spot", |b| {
        b.iter(|| resolve(black_box(&european), black_box(u64::MAX), black_box(Pocket::Number(17))))
    });
    c.bench_function("resolve_every_american_spot", |b| {
        b.iter(|| resolve(black_box(&american), black_box(u64::MAX), black_box(Pocket::DoubleZero)))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
