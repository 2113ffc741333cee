use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tagsplit_core::{
    classify, evaluate_row, materialize, parse_tags, scan_column, ColumnRule, RuleSet,
    TagUniverse,
};
use tagsplit_sheet::Sheet;

const COLORS: [&str; 6] = ["red", "blue", "green", "black", "white", "grey"];
const MATERIALS: [&str; 4] = ["wood", "metal", "glass", "plastic"];
const SIZES: [&str; 3] = ["S", "M", "L"];

fn rules() -> RuleSet {
    let mut color = ColumnRule::new("Color", "none", "[all]");
    color.owned_tags = COLORS.iter().map(|t| (*t).to_string()).collect();
    let mut material = ColumnRule::new("Material", "unknown", "mixed");
    material.owned_tags = MATERIALS.iter().map(|t| (*t).to_string()).collect();
    let mut size = ColumnRule::new("Size", "", "N/A");
    size.owned_tags = SIZES.iter().map(|t| (*t).to_string()).collect();
    vec![color, material, size].into_iter().collect()
}

fn row_text(i: usize) -> String {
    format!(
        "{}, {}, {}, extra{}",
        COLORS[i % COLORS.len()],
        MATERIALS[i % MATERIALS.len()],
        COLORS[(i / 3) % COLORS.len()],
        i % 50
    )
}

fn sheet_with_rows(rows: usize) -> Sheet {
    let mut sheet = Sheet::from_data(vec![vec!["Item", "Tags"]]);
    for i in 0..rows {
        sheet.row_append(vec![format!("item{i}"), row_text(i)]);
    }
    sheet
}

fn bench_parse_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("short", |b| b.iter(|| parse_tags(black_box("red, wood"))));

    group.bench_function("messy", |b| {
        b.iter(|| parse_tags(black_box(" red ,\r\nwood,, glass ,\n , metal,red ")))
    });

    group.finish();
}

fn bench_evaluate_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_row");
    let rules = rules();

    group.bench_function("single_match", |b| {
        b.iter(|| evaluate_row(black_box(&rules), black_box("red, wood")))
    });

    group.bench_function("join_all", |b| {
        b.iter(|| evaluate_row(black_box(&rules), black_box("red, blue, green, metal, glass")))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| evaluate_row(black_box(&rules), black_box("extra1, extra2")))
    });

    group.finish();
}

fn bench_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("sheet");
    let rules = rules();

    for size in [100, 1000, 10000].iter() {
        let sheet = sheet_with_rows(*size);

        group.bench_with_input(BenchmarkId::new("scan_classify", size), size, |b, _| {
            let universe = TagUniverse::new();
            b.iter(|| classify(&universe, &scan_column(black_box(&sheet), 1, None)))
        });

        group.bench_with_input(BenchmarkId::new("materialize", size), size, |b, _| {
            b.iter(|| {
                let mut sheet = sheet.clone();
                materialize(black_box(&mut sheet), 1, black_box(&rules))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_tags, bench_evaluate_row, bench_sheet);
criterion_main!(benches);
