//! Benchmarks for the card text pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cardpress::text::{parse_blocks, tokenize, wrap, FitOptions, FontRange, FontStyle};
use cardpress::{render, AssetLibrary, CardMetadata, Rect};

const RULES: &str = "Flying, vigilance{lns}{T}, Pay 2 life: Add {W}{U}. Activate only once each turn.{lns}\
When {cardname} enters the battlefield, exile up to one target nonland permanent an opponent controls \
until {cardname} leaves the battlefield.{flavor}The light that blinds also reveals.";

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("text");
    let assets = AssetLibrary::builtin();
    let typesetter = assets.typesetter();

    group.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(RULES), Some("Serra Paragon")))
    });

    let fragments = tokenize(RULES, Some("Serra Paragon"));
    group.bench_function("wrap", |b| {
        b.iter(|| {
            wrap(
                black_box(&fragments),
                1100.0,
                typesetter.metrics(48),
                FontStyle::Regular,
            )
        })
    });

    let blocks = parse_blocks(RULES, Some("Serra Paragon"));
    let region = Rect::new(125, 1310, 1250, 550);
    group.bench_function("fit", |b| {
        b.iter(|| {
            typesetter
                .fit(black_box(&blocks), region, FontRange::new(72, 24), FitOptions::default())
                .unwrap()
        })
    });

    let layout = typesetter
        .fit(&blocks, region, FontRange::new(72, 24), FitOptions::default())
        .unwrap();
    group.bench_function("render_layout", |b| b.iter(|| typesetter.render(black_box(&layout))));

    group.finish();
}

fn bench_card(c: &mut Criterion) {
    let assets = AssetLibrary::builtin();
    let card = CardMetadata::new()
        .with("title", "Serra Paragon")
        .with("mana_cost", "{2}{W}{W}")
        .with("type_line", "Creature \u{2014} Angel")
        .with("rules_text", RULES)
        .with("power", "3")
        .with("toughness", "4");

    c.bench_function("render_card", |b| {
        b.iter(|| render(black_box(&card), &assets).unwrap())
    });
}

criterion_group!(benches, bench_text, bench_card);
criterion_main!(benches);
