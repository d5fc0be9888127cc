//! Разбор схемы зала и наложение занятости.
//!
//! Run with: `cargo bench --bench seat_layout`

use cinema_booking::models::SeatRowDeclaration;
use cinema_booking::seating::{decode_layout, merge_occupancy, OccupancySet, SelectionTracker};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn hall(rows: usize) -> Vec<SeatRowDeclaration> {
    (0..rows)
        .map(|i| {
            let label = char::from(b'A' + (i % 26) as u8).to_string();
            let mut types = vec!["standard"; 12];
            types[5] = "vip";
            types[6] = "vip";
            // Последние ряды - диваны
            if i + 2 >= rows {
                types.extend(["double"; 6]);
            }
            SeatRowDeclaration::new(format!("{label}{}", i / 26), types)
        })
        .collect()
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_layout");
    for rows in [10usize, 26, 60] {
        let declarations = hall(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &declarations, |b, decl| {
            b.iter(|| black_box(decode_layout(black_box(decl))));
        });
    }
    group.finish();
}

fn benchmark_merge(c: &mut Criterion) {
    let matrix = decode_layout(&hall(26));
    let occupied: OccupancySet = matrix
        .seats()
        .step_by(3)
        .map(|s| s.id.clone())
        .collect();

    c.bench_function("merge_occupancy/26_rows", |b| {
        b.iter(|| black_box(merge_occupancy(black_box(&matrix), black_box(&occupied))));
    });

    let merged = merge_occupancy(&matrix, &occupied);
    let free: Vec<String> = merged
        .seats()
        .filter(|s| s.is_selectable())
        .take(8)
        .map(|s| s.id.clone())
        .collect();
    c.bench_function("toggle_8_seats", |b| {
        b.iter(|| {
            let mut tracker = SelectionTracker::new(merged.clone(), 95_000);
            for id in &free {
                tracker.toggle(id);
            }
            black_box(tracker.total_price())
        });
    });
}

criterion_group!(benches, benchmark_decode, benchmark_merge);
criterion_main!(benches);
