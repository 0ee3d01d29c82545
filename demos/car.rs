//! A car assembled from an engine and four wheels
//!
//! Run with pretty logging:
//! ```bash
//! cargo run --example car --features logging-pretty
//! ```

use service_injector::{
    DiError, Healthcheckable, Injector, InjectorOptions, Result, Shutdownable,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct Wheel {
    position: &'static str,
}

struct Engine {
    running: AtomicBool,
}

impl Healthcheckable for Engine {
    fn health_check(&self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DiError::msg("engine is not running"))
        }
    }
}

impl Shutdownable for Engine {
    fn shutdown(&self) -> Result<()> {
        println!("  [Engine] stopping");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

struct Car {
    engine: Arc<Engine>,
    wheels: Vec<Arc<Wheel>>,
}

impl Car {
    fn start(&self) {
        self.engine.running.store(true, Ordering::SeqCst);
        let positions: Vec<_> = self.wheels.iter().map(|w| w.position).collect();
        println!("  [Car] vroooom on {}", positions.join(", "));
    }
}

impl Shutdownable for Car {
    fn shutdown(&self) -> Result<()> {
        println!("  [Car] parking");
        Ok(())
    }
}

const WHEELS: [&str; 4] = ["front-left", "front-right", "rear-left", "rear-right"];

fn main() {
    #[cfg(feature = "logging")]
    {
        service_injector::logging::init();
    }

    println!("=== Service Injector Car Demo ===\n");

    let options = InjectorOptions::new()
        .on_invoke(|_, name| println!("  [Hook] invoked {name}"))
        .on_shutdown(|_, name| println!("  [Hook] shut down {name}"))
        .log_to(|msg| println!("  [Log] {msg}"));
    let injector = Injector::with_options(options);

    for position in WHEELS {
        injector.provide_named_value(format!("wheel-{position}"), Wheel { position });
    }

    // Declared before its dependency: nothing is resolved until invoke
    injector.service::<Car>().shutdownable().provide(|i| {
        let wheels = WHEELS
            .iter()
            .map(|position| i.invoke_named::<Wheel>(&format!("wheel-{position}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Car {
            engine: i.invoke()?,
            wheels,
        })
    });

    injector
        .service::<Engine>()
        .healthcheckable()
        .shutdownable()
        .provide(|_| {
            Ok(Engine {
                running: AtomicBool::new(false),
            })
        });

    println!("\nProvided: {:?}\n", injector.list_provided_services());

    let car = injector.must_invoke::<Car>();
    car.start();

    println!("\nInvoked: {:?}", injector.list_invoked_services());
    println!("Engine health: {:?}\n", injector.health_check::<Engine>());

    if let Err(err) = injector.shutdown_all() {
        eprintln!("shutdown failed: {err}");
    }

    println!("\nEngine health after shutdown: {:?}", injector.health_check::<Engine>());
    println!("\n=== Demo Complete ===");
}
