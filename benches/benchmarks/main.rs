use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use itertools::Itertools as _;
use rand::{SeedableRng, rngs::StdRng};
use twenty_fourty_eight_engine::{
    Board, Cell, Direction, GameConfig, GameModel, board::test_utils, merge,
};

/// Generate random lines of length 4 across every fill level.
fn generate_lines(count: usize) -> Vec<Vec<Cell>> {
    let rng = &mut StdRng::seed_from_u64(0);

    (0..5u32)
        .cartesian_product(0..4u32)
        .cartesian_product(0..count)
        .map(|((filled, dup), _)| test_utils::generate_random_line(rng, 4, filled, dup))
        .collect()
}

fn generate_boards(count: usize) -> Vec<Board> {
    let rng = &mut StdRng::seed_from_u64(1);

    (0..16u32)
        .cartesian_product(0..count)
        .map(|(filled, _)| test_utils::generate_random_board(rng, 4, filled, filled / 2))
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("merge");
    let lines = generate_lines(COUNT);
    group.throughput(Throughput::Elements(lines.len() as u64));

    group.bench_function("reference_slide", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(test_utils::reference_slide(line));
            }
        });
    });

    group.bench_function("merge_orders", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(merge(line));
            }
        });
    });
}

fn bench_perform_move(c: &mut Criterion) {
    const COUNT: usize = 50;

    let mut group = c.benchmark_group("perform_move");
    let boards = generate_boards(COUNT);
    group.throughput(Throughput::Elements((boards.len() * Direction::ALL.len()) as u64));

    group.bench_function("all_directions", |b| {
        b.iter(|| {
            for board in &boards {
                for direction in Direction::ALL {
                    let mut model = GameModel::new(&GameConfig::default(), ()).unwrap();
                    for (pos, cell) in board.iter() {
                        if let Some(value) = cell.value() {
                            model.insert_tile(pos, value);
                        }
                    }
                    black_box(model.perform_move(direction));
                }
            }
        });
    });
}

criterion_group!(benches, bench_merge, bench_perform_move);
criterion_main!(benches);
