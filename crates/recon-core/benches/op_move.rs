use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use recon_core::belief::HypothesisTracker;
use recon_core::model::chess_move::Move;

/// Black's tracker after white's first move and black's reply, waiting on
/// white's second move.
fn second_move_tracker() -> HypothesisTracker {
    let mut tracker = HypothesisTracker::new();
    tracker.op_move(None);
    let reply: Move = "e7e5".parse().unwrap_or(Move::Pass);
    tracker.apply_move(reply, reply, None);
    tracker
}

fn bench_op_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("op_move");

    group.bench_function("opening_single_board", |b| {
        b.iter_batched(
            || {
                let mut tracker = HypothesisTracker::new();
                tracker.apply_move(Move::Pass, Move::Pass, None);
                tracker
            },
            |mut tracker| tracker.op_move(None),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("second_move_fanout", |b| {
        b.iter_batched(
            second_move_tracker,
            |mut tracker| tracker.op_move(None),
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_op_move);
criterion_main!(benches);
