//! Response cache benchmarks for the Invoicely server.

use axum::http::{Method, Uri};
use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use invoicely_server::cache::{Cache, CacheKey, MemoryCache};
use std::time::Duration;
use tokio::runtime::Runtime;

fn benchmark_cache_key(c: &mut Criterion) {
    let uri: Uri = "/api/v1/activity-logs?perPage=20&page=3&action=upload"
        .parse()
        .unwrap();
    let scope = CacheKey::user_scope("6f1c2a7e-3b0d-4d1e-9a5c-0b8e2f4d7a10");

    c.bench_function("cache_key_for_request", |b| {
        b.iter(|| CacheKey::for_request(black_box(&Method::GET), black_box(&uri), Some(&scope)))
    });
}

fn benchmark_memory_cache(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = MemoryCache::with_capacity_bound(10_000);
    let body = Bytes::from(vec![b'x'; 4096]);
    let ttl = Duration::from_secs(300);

    rt.block_on(async {
        for i in 0..1_000 {
            cache
                .set_raw(&format!("/api/v1/dashboard#user:{i}"), body.clone(), ttl)
                .await
                .unwrap();
        }
    });

    c.bench_function("memory_cache_hit", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(cache.get_raw("/api/v1/dashboard#user:500").await.unwrap())
        })
    });

    c.bench_function("memory_cache_set", |b| {
        b.to_async(&rt).iter(|| async {
            cache
                .set_raw("/api/v1/dashboard/admin#user:bench", body.clone(), ttl)
                .await
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_cache_key, benchmark_memory_cache);
criterion_main!(benches);
