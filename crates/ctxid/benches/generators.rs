use std::convert::Infallible;
use std::hint::black_box;
use std::sync::{Arc, Barrier};
use std::thread::scope;
use std::time::Instant;

use axum::body::Body;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ctxid::{fast_id, secure_id, CorrelationLayer};
use http::{Request, Response};
use tokio::runtime::Builder;
use tower::{service_fn, Layer, ServiceExt};

// IDs generated per benchmark iteration (split across threads when contended).
const TOTAL_IDS: usize = 4096;

fn bench_sequential(c: &mut Criterion, group_name: &str, generate: fn() -> String) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generate());
            }
        });
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion, group_name: &str, generate: fn() -> String) {
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{}/threads/{}", TOTAL_IDS, thread_count),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(generate());
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_sequential_secure(c: &mut Criterion) {
    bench_sequential(c, "sequential/secure", secure_id);
}

fn benchmark_sequential_fast(c: &mut Criterion) {
    bench_sequential(c, "sequential/fast", fast_id);
}

fn benchmark_contended_secure(c: &mut Criterion) {
    bench_contended(c, "contended/secure", secure_id);
}

fn benchmark_contended_fast(c: &mut Criterion) {
    bench_contended(c, "contended/fast", fast_id);
}

/// One request through [`CorrelationLayer`] around a no-op handler.
fn benchmark_middleware(c: &mut Criterion) {
    let mut group = c.benchmark_group("middleware/context");
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    let svc = CorrelationLayer::default().layer(service_fn(|_: Request<Body>| async {
        Ok::<_, Infallible>(Response::new(Body::empty()))
    }));

    for (name, inbound) in [("generated", None), ("inbound", Some("abc-123"))] {
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| {
                let svc = svc.clone();
                async move {
                    let mut request = Request::get("/");
                    if let Some(id) = inbound {
                        request = request.header("x-correlation-id", id);
                    }
                    let response = svc.oneshot(request.body(Body::empty()).unwrap()).await;
                    black_box(response.unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sequential_secure,
    benchmark_sequential_fast,
    benchmark_contended_secure,
    benchmark_contended_fast,
    benchmark_middleware,
);
criterion_main!(benches);
