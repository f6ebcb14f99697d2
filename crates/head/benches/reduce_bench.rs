use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use head::{HeadConfig, HeadManager, InstanceRegistry, PropBag, TagDescriptor, reduce};
use html::DomStore;

const SMALL_TREE: usize = 8;
const LARGE_TREE: usize = 2_000;

fn make_contributors(count: usize) -> Vec<PropBag> {
    (0..count)
        .map(|i| {
            PropBag::new()
                .title(format!("Page {i}"))
                .title_template("%s | Bench")
                .meta(
                    TagDescriptor::new()
                        .attr("name", "description")
                        .attr("content", format!("level {i}")),
                )
                .meta(
                    TagDescriptor::new()
                        .attr("property", format!("og:item:{}", i % 16))
                        .attr("content", "x"),
                )
                .link(
                    TagDescriptor::new()
                        .attr("rel", "stylesheet")
                        .attr("href", format!("/s/{}.css", i % 32)),
                )
                .script(TagDescriptor::new().attr("src", format!("/j/{i}.js")).attr("async", true))
        })
        .collect()
}

fn registry_of(count: usize) -> InstanceRegistry {
    let mut registry = InstanceRegistry::new();
    for props in make_contributors(count) {
        registry.register(props);
    }
    registry
}

fn bench_reduce_small(c: &mut Criterion) {
    let registry = registry_of(SMALL_TREE);
    let config = HeadConfig::default();
    c.bench_function("bench_reduce_small", |b| {
        b.iter(|| black_box(reduce(black_box(&registry).iter(), &config)));
    });
}

fn bench_reduce_large(c: &mut Criterion) {
    let registry = registry_of(LARGE_TREE);
    let config = HeadConfig::default();
    c.bench_function("bench_reduce_large", |b| {
        b.iter(|| black_box(reduce(black_box(&registry).iter(), &config)));
    });
}

fn bench_serialize_large(c: &mut Criterion) {
    let state = reduce(registry_of(LARGE_TREE).iter(), &HeadConfig::default());
    c.bench_function("bench_serialize_large", |b| {
        b.iter(|| black_box(black_box(&state).head_markup().len()));
    });
}

fn bench_client_commit(c: &mut Criterion) {
    let contributors = make_contributors(SMALL_TREE);
    c.bench_function("bench_client_commit", |b| {
        b.iter_batched(
            || HeadManager::client(HeadConfig::default(), DomStore::new(), true),
            |mut manager| {
                for props in &contributors {
                    manager.mount(props.clone());
                }
                manager.commit();
                black_box(manager.counters().patches);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_reduce_small,
    bench_reduce_large,
    bench_serialize_large,
    bench_client_commit
);
criterion_main!(benches);
