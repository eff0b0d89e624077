//! Benchmarks for the imgtools pipeline engine.
//!
//! Run with: cargo bench -p imgtools-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat};
use imgtools_core::config::{
    CropAlignment, CropConfig, EncodeConfig, OutputConfig, ResizeAlgorithm, ResizeMode, Step,
};
use imgtools_core::ops::{Chain, Crop, Decode, Encode, Resize, WorkingImage};
use imgtools_core::pipeline::{execute, ExecutionContext};
use imgtools_core::ValidatedProfile;
use std::io::Cursor;
use std::path::Path;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn benchmark_decode(c: &mut Criterion) {
    let bytes = png_bytes(1920, 1080);

    c.bench_function("decode_png_1080p", |b| {
        b.iter(|| {
            let image = WorkingImage::from_bytes(Path::new("bench.png"), black_box(bytes.clone()));
            let _ = Chain::new(image).then(&Decode).finish();
        })
    });
}

fn benchmark_resize(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);
    let resize = Resize::by_width(ResizeAlgorithm::CatmullRom, 640);

    c.bench_function("resize_by_width_1080p_to_640", |b| {
        b.iter(|| {
            let image = WorkingImage::from_image(Path::new("bench.png"), black_box(img.clone()));
            let _ = Chain::new(image).then(&resize).finish();
        })
    });
}

fn benchmark_chain(c: &mut Criterion) {
    let bytes = png_bytes(1280, 720);
    let crop = Crop::new(720, 720, CropAlignment::Center);
    let resize = Resize::by_factor(ResizeAlgorithm::Lanczos3, 0.5);
    let encode = Encode::new("jpeg", None);

    c.bench_function("decode_crop_resize_encode_720p", |b| {
        b.iter(|| {
            let image = WorkingImage::from_bytes(Path::new("bench.png"), black_box(bytes.clone()));
            let _ = Chain::new(image)
                .then(&Decode)
                .then(&crop)
                .then(&resize)
                .then(&encode)
                .finish();
        })
    });
}

fn benchmark_execute(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bench.png");
    std::fs::write(&input, png_bytes(800, 600)).unwrap();

    let profile = ValidatedProfile {
        name: "bench".to_string(),
        steps: vec![
            Step::Decode,
            Step::Crop(CropConfig {
                alignment: CropAlignment::TopLeft,
                width: 600,
                height: 600,
            }),
            Step::Resize {
                mode: ResizeMode::ByHeight(300),
                algorithm: ResizeAlgorithm::CatmullRom,
            },
            Step::Encode(EncodeConfig {
                format: "png".to_string(),
                options: None,
            }),
            Step::Write(OutputConfig {
                format: "png".to_string(),
                name_prefix: String::new(),
                name_suffix: "_bench".to_string(),
            }),
        ],
    };
    let ctx = ExecutionContext::new(&input);

    c.bench_function("execute_profile_800x600", |b| {
        b.iter(|| {
            let _ = execute(black_box(&profile), black_box(&ctx));
        })
    });
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_resize,
    benchmark_chain,
    benchmark_execute,
);
criterion_main!(benches);
