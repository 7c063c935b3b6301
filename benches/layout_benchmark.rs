//! Benchmarks for relayout pipeline performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the page pipeline over synthetic page dumps.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use relayout::{ConvertOptions, Converter, DocumentBuilder, PageLayout};

fn text_block(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Value {
    let bbox = [x0, y0, x1, y1];
    json!({
        "type": 0,
        "bbox": bbox,
        "lines": [{"bbox": bbox, "spans": [{"bbox": bbox, "text": text, "size": 10}]}]
    })
}

/// Creates a synthetic page with paragraphs, a bordered grid and an aligned band.
fn create_test_page(grid: usize) -> Value {
    let mut blocks = Vec::new();
    let mut shapes = Vec::new();

    for i in 0..10 {
        let y = 60.0 + i as f32 * 16.0;
        blocks.push(text_block(
            "Benchmark paragraph content for relayout.",
            72.0,
            y,
            520.0,
            y + 12.0,
        ));
    }

    // bordered grid
    let (left, top, cell_w, cell_h) = (72.0, 260.0, 440.0 / grid as f32, 20.0);
    let (right, bottom) = (left + cell_w * grid as f32, top + cell_h * grid as f32);
    shapes.push(json!({"bbox": [left, top, right, bottom]}));
    for k in 1..grid {
        let x = left + cell_w * k as f32;
        let y = top + cell_h * k as f32;
        shapes.push(json!({"bbox": [x - 0.5, top, x + 0.5, bottom]}));
        shapes.push(json!({"bbox": [left, y - 0.5, right, y + 0.5]}));
    }
    for r in 0..grid {
        for c in 0..grid {
            let x = left + cell_w * c as f32 + 2.0;
            let y = top + cell_h * r as f32 + 4.0;
            blocks.push(text_block("cell", x, y, x + cell_w - 4.0, y + 12.0));
        }
    }

    // aligned band below the grid
    let band = bottom + 30.0;
    blocks.push(text_block("left", 72.0, band, 200.0, band + 12.0));
    blocks.push(text_block("middle", 250.0, band, 350.0, band + 12.0));
    blocks.push(text_block("right", 400.0, band, 520.0, band + 12.0));

    json!({"width": 612, "height": 792, "blocks": blocks, "shapes": shapes})
}

fn create_test_document(page_count: usize) -> String {
    let pages: Vec<Value> = (0..page_count).map(|_| create_test_page(4)).collect();
    json!({ "pages": pages }).to_string()
}

/// Benchmark the single-page pipeline at various grid sizes.
fn bench_page_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_pipeline");

    for grid in [2, 4, 8].iter() {
        let page = create_test_page(*grid).to_string();

        group.bench_function(format!("{}x{}_grid", grid, grid), |b| {
            b.iter(|| {
                let mut layout = PageLayout::from_json(black_box(&page)).unwrap();
                layout.parse().unwrap();
                let mut builder = DocumentBuilder::new();
                layout.make_page(&mut builder).unwrap();
                builder.finish()
            });
        });
    }

    group.finish();
}

/// Benchmark multi-page conversion, parallel and sequential.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let input = create_test_document(20);

    group.bench_function("20_pages_parallel", |b| {
        let converter = Converter::new();
        b.iter(|| converter.convert_json(black_box(&input)).unwrap());
    });

    group.bench_function("20_pages_sequential", |b| {
        let converter = Converter::with_options(ConvertOptions::new().sequential());
        b.iter(|| converter.convert_json(black_box(&input)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_page_pipeline, bench_conversion);
criterion_main!(benches);
