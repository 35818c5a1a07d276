// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use understory_display_list::{
    Canvas, ClipOp, DisplayListData, IRect, InvertColors, NoDrawCanvas, Paint, PointMode,
    RecordingCanvas,
};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1_u64 << 53) as f64
    }
}

/// A UI-like frame: nested groups of clipped rects, paths and point runs.
fn record_frame(canvas: &mut RecordingCanvas<'_>, groups: usize, rng: &mut Lcg) {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.quad_to((8.0, 0.0), (8.0, 8.0));
    path.line_to((0.0, 8.0));
    path.close_path();
    let points: Vec<_> = (0..16)
        .map(|i| Point::new(f64::from(i) * 2.0, f64::from(i)))
        .collect();

    for _ in 0..groups {
        let x = rng.next_f64() * 800.0;
        let y = rng.next_f64() * 600.0;
        let paint = Paint::new(Color::new([rng.next_f64() as f32, 0.5, 0.25, 1.0]));
        canvas.save();
        canvas.translate(x, y);
        canvas.clip_rect(&Rect::new(0.0, 0.0, 64.0, 32.0), ClipOp::Intersect, true);
        canvas.draw_rect(&Rect::new(0.0, 0.0, 64.0, 32.0), &paint);
        canvas.concat(&Affine::scale(0.5));
        canvas.draw_path(&path, &paint);
        canvas.draw_points(PointMode::Polygon, (&points).into(), &paint);
        canvas.restore();
    }
}

fn build(groups: usize) -> DisplayListData {
    let mut dl = DisplayListData::new();
    let mut canvas = RecordingCanvas::new(&mut dl, IRect::from_size(800, 600));
    record_frame(&mut canvas, groups, &mut Lcg::new(7));
    dl
}

fn bench_display_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_display_list");
    group.sample_size(50);

    for groups in [64_usize, 1024] {
        group.bench_function(format!("record(groups={groups})"), |b| {
            b.iter_batched(
                || Lcg::new(7),
                |mut rng| {
                    let mut dl = DisplayListData::new();
                    let mut canvas = RecordingCanvas::new(&mut dl, IRect::from_size(800, 600));
                    record_frame(&mut canvas, groups, &mut rng);
                    black_box(dl.used())
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("record_reuse(groups={groups})"), |b| {
            let mut dl = DisplayListData::new();
            let mut rng = Lcg::new(7);
            b.iter(|| {
                dl.reset();
                let mut canvas = RecordingCanvas::new(&mut dl, IRect::from_size(800, 600));
                record_frame(&mut canvas, groups, &mut rng);
                black_box(dl.used())
            });
        });

        let dl = build(groups);

        group.bench_function(format!("skip(groups={groups})"), |b| {
            b.iter(|| black_box(dl.records().count()));
        });

        group.bench_function(format!("playback(groups={groups})"), |b| {
            b.iter(|| dl.draw(black_box(&mut NoDrawCanvas)));
        });

        group.bench_function(format!("color_transform(groups={groups})"), |b| {
            b.iter_batched_ref(
                || dl.clone(),
                |dl| dl.apply_color_transform(&InvertColors),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_display_list);
criterion_main!(benches);
