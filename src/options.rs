//! Injector configuration
//!
//! Hooks and the log sink are set once when the injector is created and
//! carried over to injectors derived from it.
//!
//! # Example
//!
//! ```rust
//! use service_injector::{Injector, InjectorOptions};
//! use std::sync::{Arc, Mutex};
//!
//! let invoked = Arc::new(Mutex::new(Vec::new()));
//! let seen = Arc::clone(&invoked);
//!
//! let injector = Injector::with_options(
//!     InjectorOptions::new().on_invoke(move |_, name| seen.lock().unwrap().push(name.to_owned())),
//! );
//! injector.provide_named_value("answer", 42u32);
//! injector.invoke_named::<u32>("answer").unwrap();
//!
//! assert_eq!(*invoked.lock().unwrap(), vec!["answer".to_owned()]);
//! ```

use crate::Injector;
use std::sync::Arc;

/// Callback receiving the injector and a service name
pub type ServiceHook = Arc<dyn Fn(&Injector, &str) + Send + Sync>;

/// Callback receiving free-form diagnostic lines
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional hooks and log sink for an [`Injector`].
#[derive(Clone, Default)]
pub struct InjectorOptions {
    pub(crate) on_registration: Option<ServiceHook>,
    pub(crate) on_invoke: Option<ServiceHook>,
    pub(crate) on_shutdown: Option<ServiceHook>,
    pub(crate) log_sink: Option<LogSink>,
}

impl InjectorOptions {
    /// Options with no hooks and no log sink
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after every provide or override
    pub fn on_registration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Injector, &str) + Send + Sync + 'static,
    {
        self.on_registration = Some(Arc::new(hook));
        self
    }

    /// Called after every successful invocation
    pub fn on_invoke<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Injector, &str) + Send + Sync + 'static,
    {
        self.on_invoke = Some(Arc::new(hook));
        self
    }

    /// Called after every successful service shutdown
    pub fn on_shutdown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Injector, &str) + Send + Sync + 'static,
    {
        self.on_shutdown = Some(Arc::new(hook));
        self
    }

    /// Receive provide/override/invoke/shutdown diagnostics as text
    pub fn log_to<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_sink = Some(Arc::new(sink));
        self
    }
}

impl std::fmt::Debug for InjectorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectorOptions")
            .field("on_registration", &self.on_registration.is_some())
            .field("on_invoke", &self.on_invoke.is_some())
            .field("on_shutdown", &self.on_shutdown.is_some())
            .field("log_sink", &self.log_sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = InjectorOptions::default();
        assert!(options.on_registration.is_none());
        assert!(options.on_invoke.is_none());
        assert!(options.on_shutdown.is_none());
        assert!(options.log_sink.is_none());
    }

    #[test]
    fn test_options_chain() {
        let options = InjectorOptions::new()
            .on_registration(|_, _| {})
            .on_shutdown(|_, _| {})
            .log_to(|_| {});

        assert!(options.on_registration.is_some());
        assert!(options.on_invoke.is_none());
        assert!(options.on_shutdown.is_some());
        assert!(options.log_sink.is_some());
        assert_eq!(
            format!("{options:?}"),
            "InjectorOptions { on_registration: true, on_invoke: false, on_shutdown: true, log_sink: true }"
        );
    }
}
