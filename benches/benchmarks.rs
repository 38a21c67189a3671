use xiangqi_tablebase::combin::Triangle;
use xiangqi_tablebase::position::hash::{hash, unhash};
use xiangqi_tablebase::tier::Tier;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        parsing_tier_string,
        sizing_one_rook_tier,
        hashing_bare_kings_position,
        unhashing_bare_kings_position,
        enumerating_one_rook_children,
}

fn parsing_tier_string(c: &mut criterion::Criterion) {
    c.bench_function("parse a tier string", |b| {
        b.iter(|| Tier::parse("000000000001__").unwrap())
    });
}

fn sizing_one_rook_tier(c: &mut criterion::Criterion) {
    let triangle = Triangle::new();
    let tier = Tier::parse("000000000001__").unwrap();
    c.bench_function("compute a tier's size", |b| {
        b.iter(|| tier.size(&triangle))
    });
}

fn hashing_bare_kings_position(c: &mut criterion::Criterion) {
    let triangle = Triangle::new();
    let tier = Tier::parse("000000000000__").unwrap();
    let position = unhash(&tier, 0, &triangle);
    c.bench_function("hash a bare-kings position", |b| {
        b.iter(|| hash(&tier, &position, &triangle))
    });
}

fn unhashing_bare_kings_position(c: &mut criterion::Criterion) {
    let triangle = Triangle::new();
    let tier = Tier::parse("000000000000__").unwrap();
    c.bench_function("unhash a bare-kings position", |b| {
        b.iter(|| unhash(&tier, 0, &triangle))
    });
}

fn enumerating_one_rook_children(c: &mut criterion::Criterion) {
    let tier = Tier::parse("000000000001__").unwrap();
    c.bench_function("enumerate a one-rook tier's children", |b| {
        b.iter(|| tier.children())
    });
}
