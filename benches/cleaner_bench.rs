use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shelob::cleaner::{CleanOptions, Cleaner, CleanerMode, TextCleaner};
use shelob::filtering::is_corrupted;

const LINES: [&str; 4] = [
    "Привет, мир! Это обычная строка текста, 2024-01-05, глава XIV.",
    "Visit https://example.com/some/page?x=1 or write to john.doe@example.org",
    "Mixed 北京 text with ﬁ ligatures, ＦＵＬＬＷＩＤＴＨ letters and ёлки.",
    "lore////mmm////m ipsum d///////olor//////sit a. \u{FFFD}\u{FFFD} \x07",
];

fn text() -> String {
    LINES.iter().cycle().take(400).copied().collect::<Vec<_>>().join(" ")
}

pub fn modes(c: &mut Criterion) {
    let text = text();
    let mut group = c.benchmark_group("clean");
    for name in CleanerMode::VARIANTS {
        let cleaner = Cleaner::new(name.parse().unwrap(), CleanOptions::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| cleaner.clean(black_box(text)))
        });
    }
    group.finish();
}

pub fn all_options(c: &mut Criterion) {
    let text = text();
    let options = CleanOptions {
        keep_numbers: true,
        keep_roman_numerals: false,
        replace_yo: true,
        preserve_dates: true,
        preserve_fractions: true,
        preserve_decimals: true,
        remove_urls: true,
        normalize: true,
    };
    let cleaner = Cleaner::new(CleanerMode::Modern, options).unwrap();
    c.bench_function("clean_all_options", |b| {
        b.iter(|| cleaner.clean(black_box(&text)))
    });
}

pub fn detector(c: &mut Criterion) {
    let text = text();
    c.bench_function("is_corrupted", |b| {
        b.iter(|| is_corrupted(black_box(text.as_bytes())))
    });
}

criterion_group!(benches, modes, all_options, detector);
criterion_main!(benches);
