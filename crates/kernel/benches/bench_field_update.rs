use std::hint::black_box;
use std::time::Instant;

use ripple_common::ContactPoint;
use ripple_kernel::{HeightField, RippleParams, update};

fn make_params(side: usize) -> RippleParams {
    let mut params = RippleParams::default();
    params
        .set_grid_size(side, side)
        .expect("bench grid size is valid");
    params
}

fn bench_rising(side: usize, iterations: usize) {
    let params = make_params(side);
    let mut field = HeightField::new(&params);
    let contact = Some(ContactPoint::new(0.0, 0.0));

    let start = Instant::now();
    let mut changed = 0;
    for _ in 0..iterations {
        changed += update(black_box(&mut field), contact, &params).changed_cells;
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  rising ({side}x{side} cells, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, changed {changed}"
    );
}

fn bench_settled(side: usize, iterations: usize) {
    let params = make_params(side);
    let mut field = HeightField::new(&params);

    let start = Instant::now();
    for _ in 0..iterations {
        let report = update(black_box(&mut field), None, &params);
        assert!(!report.needs_update());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  settled ({side}x{side} cells, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_wandering(side: usize, iterations: usize) {
    let params = make_params(side);
    let mut field = HeightField::new(&params);

    let start = Instant::now();
    for i in 0..iterations {
        let t = i as f32 * 0.05;
        let contact = Some(ContactPoint::new(0.3 * t.cos(), 0.3 * t.sin()));
        update(black_box(&mut field), contact, &params);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  wandering ({side}x{side} cells, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Ripple Kernel Benchmarks ===\n");

    println!("[update, contact held]");
    bench_rising(50, 500);
    bench_rising(100, 200);
    bench_rising(250, 50);

    println!("\n[update, flat field]");
    bench_settled(100, 500);
    bench_settled(250, 100);

    println!("\n[update, moving contact]");
    bench_wandering(100, 200);
    bench_wandering(250, 50);

    println!("\nDone.");
}
