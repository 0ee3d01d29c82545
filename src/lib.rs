//! # Service Injector - Lazy Service Registry for Rust
//!
//! A process-wide registry where independent parts of a program declare
//! "I provide a T" or "I need a T" without wiring constructors by hand.
//!
//! ## Features
//!
//! - 🏷️ **Typed or named slots** - One slot per type, or as many named slots as you like
//! - 🏭 **Lazy construction** - Providers run on first invocation, exactly once
//! - 🔒 **Single-flight builds** - Concurrent first invokers wait for one build
//! - 🔁 **Rebuildable** - Shutting down a lazy service lets the next invoke rebuild it
//! - 🩺 **Health checks and teardown** - Optional per-service capabilities
//! - 📊 **Observable** - Hooks, a log sink, and optional tracing output
//!
//! ## Quick Start
//!
//! ```rust
//! use service_injector::Injector;
//! use std::sync::Arc;
//!
//! struct Wheel;
//! struct Engine;
//! struct Car {
//!     engine: Arc<Engine>,
//!     wheels: Vec<Arc<Wheel>>,
//! }
//!
//! let injector = Injector::new();
//!
//! for n in 1..=4 {
//!     injector.provide_named_value(format!("wheel-{n}"), Wheel);
//! }
//!
//! // Car is declared before Engine: resolution happens at invoke time
//! injector.provide(|i| {
//!     Ok(Car {
//!         engine: i.invoke::<Engine>()?,
//!         wheels: (1..=4)
//!             .map(|n| i.invoke_named::<Wheel>(&format!("wheel-{n}")))
//!             .collect::<Result<_, _>>()?,
//!     })
//! });
//! injector.provide(|_| Ok(Engine));
//!
//! let car = injector.must_invoke::<Car>();
//! assert_eq!(car.wheels.len(), 4);
//! ```
//!
//! ## Service Lifecycle
//!
//! ```rust
//! use service_injector::{Injector, Result, Shutdownable};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! static BUILDS: AtomicU32 = AtomicU32::new(0);
//!
//! struct Cache;
//!
//! impl Shutdownable for Cache {
//!     fn shutdown(&self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector.service::<Cache>().shutdownable().provide(|_| {
//!     BUILDS.fetch_add(1, Ordering::SeqCst);
//!     Ok(Cache)
//! });
//!
//! injector.invoke::<Cache>().unwrap();
//! injector.invoke::<Cache>().unwrap();
//! assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
//!
//! // Shutdown resets the lazy entry; the next invoke builds a new instance
//! injector.shutdown::<Cache>().unwrap();
//! injector.invoke::<Cache>().unwrap();
//! assert_eq!(BUILDS.load(Ordering::SeqCst), 2);
//! ```
//!
//! ## Dependency Cycles
//!
//! Resolution is pull-based: nothing validates the graph up front. A provider
//! that ends up invoking its own service blocks on that service's build lock,
//! and a longer cycle recurses until the stack overflows. Cycles are not
//! reported as errors.

mod error;
mod global;
mod injector;
mod key;
mod lifecycle;
#[cfg(feature = "logging")]
pub mod logging;
mod options;
mod provider;
mod registry;
mod service;

pub use error::*;
pub use global::*;
pub use injector::*;
pub use key::*;
pub use lifecycle::*;
pub use options::*;
pub use provider::Injectable;
pub use service::ServiceKind;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        DiError, Healthcheckable, Injectable, Injector, InjectorOptions, Result, Shutdownable,
        default_injector,
    };
    pub use std::sync::Arc;
}
