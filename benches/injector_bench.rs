//! Benchmarks for the service injector

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use service_injector::Injector;
use std::hint::black_box;
use std::sync::Arc;

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
struct Dependent {
    small: Arc<SmallService>,
    medium: Arc<MediumService>,
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("provide_value", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.provide_value(SmallService { value: 42 });
            black_box(injector)
        })
    });

    group.bench_function("provide_lazy", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.provide(|_| Ok(SmallService { value: 42 }));
            black_box(injector)
        })
    });

    group.bench_function("provide_named_4", |b| {
        b.iter(|| {
            let injector = Injector::new();
            for n in 0..4 {
                injector.provide_named_value(format!("small-{n}"), SmallService { value: n });
            }
            black_box(injector)
        })
    });

    group.bench_function("override_value", |b| {
        let injector = Injector::new();
        b.iter(|| injector.override_value(SmallService { value: 7 }))
    });

    group.finish();
}

fn bench_invocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("invocation");
    group.throughput(Throughput::Elements(1));

    let injector = Injector::new();
    injector.provide_value(SmallService { value: 42 });
    injector.provide(|_| {
        Ok(MediumService {
            name: "medium".to_string(),
            values: vec![1, 2, 3, 4, 5],
        })
    });
    injector.provide_named_value("named-small", SmallService { value: 1 });
    injector.provide(|i| {
        Ok(Dependent {
            small: i.invoke()?,
            medium: i.invoke()?,
        })
    });

    // Build lazy entries once so the loop measures the cached path
    let _ = injector.invoke::<Dependent>();

    group.bench_function("invoke_eager", |b| {
        b.iter(|| black_box(injector.invoke::<SmallService>()))
    });

    group.bench_function("invoke_lazy_built", |b| {
        b.iter(|| black_box(injector.invoke::<MediumService>()))
    });

    group.bench_function("invoke_named", |b| {
        b.iter(|| black_box(injector.invoke_named::<SmallService>("named-small")))
    });

    group.bench_function("invoke_not_found", |b| {
        b.iter(|| black_box(injector.invoke_named::<SmallService>("missing")))
    });

    group.bench_function("contains_check", |b| {
        b.iter(|| black_box(injector.contains::<MediumService>()))
    });

    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    group.bench_function("build_after_shutdown", |b| {
        let injector = Injector::new();
        injector.provide(|_| Ok(SmallService { value: 42 }));
        b.iter(|| {
            let service = injector.invoke::<SmallService>();
            let _ = injector.shutdown::<SmallService>();
            black_box(service)
        })
    });

    group.bench_function("dependency_graph_cold", |b| {
        b.iter(|| {
            let injector = Injector::new();
            injector.provide(|i| {
                Ok(Dependent {
                    small: i.invoke()?,
                    medium: i.invoke()?,
                })
            });
            injector.provide(|_| Ok(SmallService { value: 42 }));
            injector.provide(|_| {
                Ok(MediumService {
                    name: "medium".to_string(),
                    values: Vec::new(),
                })
            });
            black_box(injector.invoke::<Dependent>())
        })
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_invokes_4", |b| {
        let injector = Arc::new(Injector::new());
        injector.provide(|_| Ok(SmallService { value: 42 }));

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let injector = Arc::clone(&injector);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            black_box(injector.invoke::<SmallService>().ok());
                        }
                    })
                })
                .collect();

            for handle in handles {
                let _ = handle.join();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_invocation,
    bench_lifecycle,
    bench_concurrent,
);

criterion_main!(benches);
