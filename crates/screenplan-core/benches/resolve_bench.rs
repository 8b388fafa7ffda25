//! Criterion benchmarks for the resolve and drag hot paths.
//!
//! A drag step runs the snap engine and a full refresh pass on every pointer
//! event, so both must stay well under a frame.
//!
//! Run with:
//! ```bash
//! cargo bench --package screenplan-core --bench resolve_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use screenplan_core::engine::resolve::{refresh_layout, resolve_display};
use screenplan_core::{
    DisplayId, EditOptions, EntityRef, Gpu, Layout, LayoutView, Mode, Placement, Relation, Screen,
};

// ── Layout fixture builders ───────────────────────────────────────────────────

/// One screen with `n` 1920×1080 displays chained left to right.
///
/// Display 0 is absolute at (0, 0); display i is RightOf display i-1.
fn build_chain(n: usize, metamodes: usize) -> (Layout, Vec<DisplayId>) {
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let screen = layout.add_screen(Screen::new("Screen-0", metamodes));
    let mut ids: Vec<DisplayId> = Vec::with_capacity(n);

    for i in 0..n {
        let mode = match ids.last() {
            Some(&prev) => Mode::new(1920, 1080).relative(Relation::RightOf, prev),
            None => Mode::new(1920, 1080),
        };
        let id = layout.add_display(gpu, Some(screen), format!("DP-{i}"), vec![mode; metamodes]);
        ids.push(id);
    }
    (layout, ids)
}

/// `n` single-display screens, each absolute and side by side.
fn build_screens(n: usize) -> Layout {
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    for i in 0..n {
        let screen = layout.add_screen(Screen::new(format!("Screen-{i}"), 1));
        layout.add_display(
            gpu,
            Some(screen),
            format!("DP-{i}"),
            vec![Mode::new(1920, 1080).at(1920 * i as i32, 0)],
        );
    }
    layout
}

// ── Benchmarks: resolve ───────────────────────────────────────────────────────

/// Benchmarks [`resolve_display`] at the end of a relative chain.
fn bench_resolve_chain_tail(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_display_chain");

    for &count in &[2usize, 4, 8, 16] {
        let (layout, ids) = build_chain(count, 1);
        let tail = ids[count - 1];
        group.bench_with_input(BenchmarkId::new("displays", count), &tail, |b, &d| {
            b.iter(|| resolve_display(black_box(&layout), black_box(d), 0))
        });
    }

    group.finish();
}

/// Benchmarks the full [`refresh_layout`] pass.
fn bench_refresh_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_layout");

    for &metamodes in &[1usize, 4] {
        let (layout, _) = build_chain(8, metamodes);
        group.bench_with_input(
            BenchmarkId::new("chain8_metamodes", metamodes),
            &layout,
            |b, layout| {
                b.iter_batched(
                    || layout.clone(),
                    |mut l| refresh_layout(&mut l),
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    let layout = build_screens(8);
    group.bench_function("screens8", |b| {
        b.iter_batched(
            || layout.clone(),
            |mut l| refresh_layout(&mut l),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ── Benchmarks: drag ──────────────────────────────────────────────────────────

/// Benchmarks one snapping drag step of a screen among its neighbours.
fn bench_drag_step(c: &mut Criterion) {
    let layout = build_screens(8);
    let mut view = LayoutView::new(layout, EditOptions::default());
    view.select_display(DisplayId(4));
    let mut group = c.benchmark_group("drag_step");

    // Alternate directions so the display oscillates around its start.
    let mut sign = 1;
    group.bench_function("move_display_snap", |b| {
        b.iter(|| {
            sign = -sign;
            view.move_selected(black_box(3 * sign), black_box(0), true)
        })
    });

    group.finish();
}

/// Benchmarks hit testing through the Z-order.
fn bench_hit_test(c: &mut Criterion) {
    let view = LayoutView::new(build_screens(16), EditOptions::default());
    let mut group = c.benchmark_group("hit_test");

    group.bench_function("last_screen", |b| {
        b.iter(|| view.hit_test(black_box(screenplan_core::Point::new(1920 * 15 + 960, 540))))
    });

    group.finish();
}

/// Benchmarks switching a relative display to another side.
fn bench_relative_reattach(c: &mut Criterion) {
    let (layout, ids) = build_chain(4, 2);
    let mut view = LayoutView::new(layout, EditOptions::default());
    let mut group = c.benchmark_group("relative_reattach");

    let below = Placement::Relative {
        relation: Relation::Below,
        to: ids[0],
    };
    let right = Placement::Relative {
        relation: Relation::RightOf,
        to: ids[0],
    };
    let mut flip = false;
    group.bench_function("set_display_position", |b| {
        b.iter(|| {
            flip = !flip;
            let placement = if flip { below } else { right };
            view.set_display_position(black_box(ids[1]), placement, 0, 0)
        })
    });

    group.finish();
    assert!(view.z_order().contains(&EntityRef::Display(ids[1])));
}

criterion_group!(
    benches,
    bench_resolve_chain_tail,
    bench_refresh_layout,
    bench_drag_step,
    bench_hit_test,
    bench_relative_reattach,
);
criterion_main!(benches);
