//! Evaluation throughput on a large goal list

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use goalrush::engine::RewardEngine;
use goalrush::goals::{GameDefinition, Task};
use goalrush::progression::{resolve_unlocks, ProgressionPolicy, XpConfig};
use goalrush::rewards::RewardAccrualState;

fn large_game(len: usize, completed: usize) -> GameDefinition {
    let goals = (0..len)
        .map(|i| Task::new(format!("Goal {}", i + 1), 0.5).completed(i < completed))
        .collect();
    GameDefinition::new("bench", "Bench Game")
        .with_goals(goals)
        .with_policy(ProgressionPolicy::batched(3, 2))
        .with_xp(XpConfig::new(5.0, 1.05))
}

fn bench_resolve(c: &mut Criterion) {
    let game = large_game(500, 250);
    let policy = game.policy();
    c.bench_function("resolve_unlocks_500", |b| {
        b.iter(|| resolve_unlocks(black_box(&game.goals), black_box(&policy)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let game = large_game(200, 120);
    let engine = RewardEngine::default();
    let state = RewardAccrualState::new();
    c.bench_function("evaluate_200", |b| {
        b.iter(|| engine.evaluate(black_box(&game), black_box(&state)))
    });
}

criterion_group!(benches, bench_resolve, bench_evaluate);
criterion_main!(benches);
