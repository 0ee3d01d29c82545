#![no_main]

//! Fuzz target for concurrent injector operations
//!
//! Tests single-flight lazy builds and registry thread-safety under
//! concurrent invoke, override and shutdown.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use service_injector::Injector;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

#[derive(Clone, Debug, Arbitrary)]
struct ConcurrentService {
    id: u64,
    data: Vec<u8>,
}

#[derive(Debug)]
struct SharedConfig {
    value: u32,
}

/// Thread operation
#[derive(Debug, Clone, Arbitrary)]
enum ThreadOp {
    InvokeShared,
    InvokeNamed(u8),
    Contains,
    Override(ConcurrentService),
    OverrideNamed(u8, ConcurrentService),
    ListServices,
}

/// Concurrent test scenario
#[derive(Debug, Arbitrary)]
struct ConcurrentScenario {
    // Initial named services
    initial_services: Vec<ConcurrentService>,
    // Number of threads (clamped to 1-8)
    thread_count: u8,
    // Operations per thread (clamped)
    ops_per_thread: Vec<ThreadOp>,
}

fuzz_target!(|scenario: ConcurrentScenario| {
    let injector = Arc::new(Injector::new());
    let builds = Arc::new(AtomicU32::new(0));

    for (n, svc) in scenario.initial_services.into_iter().take(10).enumerate() {
        injector.provide_named_value(format!("svc-{n}"), svc);
    }

    let counter = Arc::clone(&builds);
    injector.provide(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(SharedConfig { value: 42 })
    });

    let thread_count = (scenario.thread_count % 8).max(1) as usize;
    let ops = scenario.ops_per_thread;

    let handles: Vec<_> = (0..thread_count)
        .map(|_| {
            let injector = Arc::clone(&injector);
            let ops = ops.clone();

            thread::spawn(move || {
                for op in ops.into_iter().take(50) {
                    match op {
                        ThreadOp::InvokeShared => {
                            let config = injector.invoke::<SharedConfig>();
                            assert_eq!(config.map(|c| c.value).ok(), Some(42));
                        }
                        ThreadOp::InvokeNamed(n) => {
                            let _ = injector.invoke_named::<ConcurrentService>(&format!("svc-{}", n % 16));
                        }
                        ThreadOp::Contains => {
                            assert!(injector.contains::<SharedConfig>());
                        }
                        ThreadOp::Override(svc) => {
                            injector.override_value(svc);
                        }
                        ThreadOp::OverrideNamed(n, svc) => {
                            let name = format!("svc-{}", n % 16);
                            injector.override_named_value(name.clone(), svc);
                            assert!(injector.contains_named(&name));
                        }
                        ThreadOp::ListServices => {
                            let _ = injector.list_provided_services();
                            let _ = injector.list_invoked_services();
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // The shared lazy entry is never shut down, so it was built at most once
    assert!(builds.load(Ordering::SeqCst) <= 1);
});
