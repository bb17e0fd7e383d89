use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_2048::core::{Board, Game, GameSnapshot, History, SimpleRng, Stats};
use tui_2048::save::SaveRecord;
use tui_2048::types::Direction;

fn busy_board() -> Board {
    Board::from_rows(&[
        [1, 1, 2, 2, 3],
        [0, 4, 4, 0, 1],
        [5, 0, 5, 6, 6],
        [1, 2, 3, 4, 5],
        [0, 0, 0, 1, 1],
    ])
    .unwrap()
}

fn bench_slide(c: &mut Criterion) {
    let board = busy_board();
    c.bench_function("slide_5x5_all_directions", |b| {
        b.iter(|| {
            for dir in Direction::ALL {
                black_box(board.slide(black_box(dir)));
            }
        })
    });
}

fn bench_can_slide(c: &mut Criterion) {
    let stuck = Board::from_rows(&[[1, 2, 3, 4], [2, 3, 4, 1], [3, 4, 1, 2], [4, 1, 2, 3]]).unwrap();
    c.bench_function("can_slide_full_4x4", |b| b.iter(|| black_box(&stuck).can_slide()));
}

fn bench_spawn(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    c.bench_function("spawn_on_empty_5x5", |b| {
        b.iter(|| {
            let mut board = Board::empty(5).unwrap();
            board.spawn(&mut rng, false)
        })
    });
}

fn bench_turn(c: &mut Criterion) {
    let mut game = Game::new(4, 12345).unwrap();
    let mut dirs = Direction::ALL.iter().cycle();
    c.bench_function("game_turn", |b| {
        b.iter(|| {
            if game.game_over() {
                game.restart();
            }
            let dir = *dirs.next().unwrap_or(&Direction::Left);
            black_box(game.slide(dir));
        })
    });
}

fn bench_history_push(c: &mut Criterion) {
    let snapshot = GameSnapshot::new(busy_board(), Stats::new(5));
    let mut history = History::new();
    c.bench_function("history_push_at_capacity", |b| {
        b.iter(|| history.save_state(black_box(snapshot)))
    });
}

fn bench_encode_decode(c: &mut Criterion) {
    let snapshot = GameSnapshot::new(busy_board(), Stats::new(5));
    let mut history = History::new();
    for _ in 0..50 {
        history.save_state(snapshot);
    }
    let record = SaveRecord::encode(&snapshot, &history, "bench", Duration::ZERO);
    let bytes = record.to_bytes();

    c.bench_function("encode_full_record", |b| b.iter(|| black_box(&record).to_bytes()));
    c.bench_function("decode_full_record", |b| {
        b.iter(|| SaveRecord::from_bytes(black_box(&bytes)))
    });
}

criterion_group!(
    benches,
    bench_slide,
    bench_can_slide,
    bench_spawn,
    bench_turn,
    bench_history_push,
    bench_encode_decode
);
criterion_main!(benches);
