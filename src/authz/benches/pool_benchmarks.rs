use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scoped_authz::{and, or, BoxError, Context, NamespacedPool, Resolver, ResolverPool, Right};
use tokio::runtime::Runtime;

fn modulo_pool() -> ResolverPool<Right> {
    ResolverPool::new(|_ctx: Context, n: Right| async move {
        Ok::<_, BoxError>(Resolver::new(move |r: &Right| r % n == 0))
    })
}

fn bench_resolve_cached(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pool = modulo_pool();
    let ctx = Context::new();

    // Warm up cache
    rt.block_on(pool.resolve(&ctx, 3)).unwrap();

    c.bench_function("resolve_cached", |b| {
        b.to_async(&rt)
            .iter(|| async { pool.resolve(&ctx, black_box(3)).await.unwrap() });
    });
}

fn bench_resolve_cold(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ctx = Context::new();

    c.bench_function("resolve_cold", |b| {
        b.to_async(&rt).iter(|| async {
            let pool = modulo_pool();
            pool.resolve(&ctx, black_box(7)).await.unwrap()
        });
    });
}

fn bench_resolve_namespaced_cached(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pool = NamespacedPool::builder()
        .register("user-project", |_ctx: Context, _user: u64, _project: u64| async {
            Ok::<_, BoxError>(Resolver::<Right>::allow())
        })
        .build();
    let ctx = Context::new();

    rt.block_on(pool.resolve(&ctx, "user-project", 4, 7)).unwrap();

    c.bench_function("resolve_namespaced_cached", |b| {
        b.to_async(&rt).iter(|| async {
            pool.resolve(&ctx, black_box("user-project"), 4, 7)
                .await
                .unwrap()
        });
    });
}

fn bench_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("algebra");
    for width in [1usize, 4, 16] {
        let resolvers: Vec<Resolver> = (1..=width as Right)
            .map(|n| Resolver::new(move |r: &Right| r % n == 0))
            .collect();
        let all = and(resolvers.clone());
        let any = or(resolvers);

        group.bench_with_input(BenchmarkId::new("and", width), &all, |b, all| {
            b.iter(|| all.check(black_box(&720720)));
        });
        group.bench_with_input(BenchmarkId::new("or", width), &any, |b, any| {
            b.iter(|| any.check(black_box(&7)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_cached,
    bench_resolve_cold,
    bench_resolve_namespaced_cached,
    bench_algebra
);
criterion_main!(benches);
