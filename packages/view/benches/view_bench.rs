use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stencil_parser::tokenize;
use stencil_view::{clean, render, Cleaner, ViewConfig, ViewMode};

fn sample_template() -> String {
    let block = "<p>Hi {{ customer.first_name }},</p>\n\
{% if order.shipped %}\n<p>Order {{ order.name }} shipped.</p>\n{% endif %}\n";
    block.repeat(100)
}

fn render_live(c: &mut Criterion) {
    let tokens = tokenize(&sample_template());

    c.bench_function("render_live", |b| {
        b.iter(|| render(black_box(&tokens), ViewMode::Live))
    });
}

fn render_raw(c: &mut Criterion) {
    let tokens = tokenize(&sample_template());

    c.bench_function("render_raw", |b| {
        b.iter(|| render(black_box(&tokens), ViewMode::Raw))
    });
}

fn clean_live_markup(c: &mut Criterion) {
    let config = ViewConfig::default();
    let markup = render(&tokenize(&sample_template()), ViewMode::Live).to_markup(&config);
    let cleaner = Cleaner::new(&config);

    c.bench_function("clean_live_markup", |b| {
        b.iter(|| cleaner.clean(black_box(&markup)))
    });
}

fn clean_whitespace_heavy(c: &mut Criterion) {
    let markup = "<span> &nbsp; </span>  a \n\n b ".repeat(500);

    c.bench_function("clean_whitespace_heavy", |b| {
        b.iter(|| clean(black_box(&markup)))
    });
}

criterion_group!(
    benches,
    render_live,
    render_raw,
    clean_live_markup,
    clean_whitespace_heavy
);
criterion_main!(benches);
