use criterion::{black_box, criterion_group, criterion_main, Criterion};
use piv_tracker_core::{GrayImage, PixelPoint};
use piv_tracker_detector::{zncc_surface, DetectorParams, PatternDetector};

fn textured(width: usize, height: usize, shift: f32) -> GrayImage {
    GrayImage::from_fn(width, height, |r, c| {
        let (y, x) = (r as f32 - shift, c as f32 - shift);
        110.0 + 45.0 * (0.37 * y).sin() + 35.0 * (0.23 * x + 0.11 * y).cos()
    })
}

fn bench_surface(c: &mut Criterion) {
    let search = textured(35, 35, 0.0);
    let template = textured(25, 25, -5.0);
    c.bench_function("zncc_surface_35x35_25x25", |b| {
        b.iter(|| zncc_surface(black_box(&search.view()), black_box(&template.view())))
    });
}

fn bench_detect(c: &mut Criterion) {
    let a = textured(640, 480, 0.0);
    let b = textured(640, 480, 2.0);
    let detector = PatternDetector::new(DetectorParams::default()).expect("valid params");
    let points: Vec<PixelPoint> = (0..64)
        .map(|k| PixelPoint::new(40 + (k % 8) * 70, 40 + (k / 8) * 50))
        .collect();

    c.bench_function("detect_many_64_points", |bench| {
        bench.iter(|| detector.detect_many(&a.view(), &b.view(), black_box(&points)))
    });
}

criterion_group!(benches, bench_surface, bench_detect);
criterion_main!(benches);
