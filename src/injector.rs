//! The injector
//!
//! `Injector` owns the registry and is the only object client code holds.
//! Services are declared with a provider (built lazily, once) or a ready
//! value, and later invoked by type or by name.

use crate::lifecycle::{Capabilities, Healthcheckable, Shutdownable};
use crate::options::{InjectorOptions, ServiceHook};
use crate::provider::provider_fn;
use crate::registry::Registry;
use crate::service::{ErasedService, ServiceEntry, ServiceKind};
use crate::{DiError, Injectable, Result, service_name};
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, error, trace};

/// Order in which services were first invoked.
///
/// Teardown walks it backwards so a service is shut down before the
/// services it pulled in while being built.
struct InvocationLog {
    order: DashMap<String, u64, RandomState>,
    next: AtomicU64,
}

impl InvocationLog {
    fn new() -> Self {
        Self {
            order: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            next: AtomicU64::new(0),
        }
    }

    /// Record the first invocation of `name`; later ones keep their index
    fn record(&self, name: &str) {
        if self.order.contains_key(name) {
            return;
        }
        self.order
            .entry(name.to_owned())
            .or_insert_with(|| self.next.fetch_add(1, Ordering::Relaxed));
    }

    fn forget(&self, name: &str) {
        self.order.remove(name);
    }

    fn names_in_order(&self) -> Vec<String> {
        let mut invoked: Vec<(u64, String)> = self
            .order
            .iter()
            .map(|r| (*r.value(), r.key().clone()))
            .collect();
        invoked.sort_unstable();
        invoked.into_iter().map(|(_, name)| name).collect()
    }
}

/// Service registry with deferred construction and ordered teardown.
///
/// # Examples
///
/// ```rust
/// use service_injector::Injector;
///
/// struct Engine { cylinders: u8 }
/// struct Car { engine: std::sync::Arc<Engine> }
///
/// let injector = Injector::new();
///
/// // Order of declaration does not matter, only order of invocation
/// injector.provide(|i| Ok(Car { engine: i.invoke::<Engine>()? }));
/// injector.provide(|_| Ok(Engine { cylinders: 4 }));
///
/// let car = injector.invoke::<Car>().unwrap();
/// assert_eq!(car.engine.cylinders, 4);
/// ```
pub struct Injector {
    registry: Registry,
    invocations: InvocationLog,
    options: InjectorOptions,
}

impl Injector {
    /// Create an injector without hooks.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(InjectorOptions::default())
    }

    /// Create an injector with hooks and a log sink.
    pub fn with_options(options: InjectorOptions) -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            options = ?options,
            "Creating new injector"
        );

        Self {
            registry: Registry::new(),
            invocations: InvocationLog::new(),
            options,
        }
    }

    /// Create an injector holding a copy of every entry.
    ///
    /// Lazy entries start unbuilt in the copy; eager entries share their
    /// instance. Hooks and the log sink are carried over.
    #[inline]
    pub fn derive(&self) -> Self {
        self.derive_with_options(self.options.clone())
    }

    /// Like [`derive`](Self::derive) but with different options.
    pub fn derive_with_options(&self, options: InjectorOptions) -> Self {
        let derived = Self::with_options(options);
        for entry in self.registry.entries() {
            derived.registry.set(entry.name().to_owned(), entry.fresh_clone());
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service_count = derived.registry.len(),
            "Derived injector from existing registry"
        );

        derived
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Start a typed registration for `T`.
    ///
    /// Use this to give the service a name or to record its health check and
    /// shutdown capabilities.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use service_injector::{Healthcheckable, Injector, Result};
    ///
    /// struct Database;
    ///
    /// impl Healthcheckable for Database {
    ///     fn health_check(&self) -> Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let injector = Injector::new();
    /// injector
    ///     .service::<Database>()
    ///     .named("primary")
    ///     .healthcheckable()
    ///     .provide(|_| Ok(Database));
    ///
    /// assert!(injector.health_check_named("primary").is_ok());
    /// ```
    #[inline]
    pub fn service<T: Injectable>(&self) -> Registration<'_, T> {
        Registration {
            injector: self,
            name: None,
            capabilities: Capabilities::none(),
        }
    }

    /// Declare a lazily built service under its type name.
    ///
    /// No health check or shutdown routine is recorded: shutting the service
    /// down only drops the instance. Register through
    /// [`service`](Self::service) with `.healthcheckable()` or
    /// `.shutdownable()` to have `T`'s own hooks run.
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    #[inline]
    pub fn provide<T: Injectable, F>(&self, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.service::<T>().provide(provider);
    }

    /// Declare a lazily built service under `name`.
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    #[inline]
    pub fn provide_named<T: Injectable, F>(&self, name: impl Into<String>, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.service::<T>().named(name).provide(provider);
    }

    /// Declare a ready instance under its type name.
    ///
    /// Records no capabilities, same as [`provide`](Self::provide).
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    #[inline]
    pub fn provide_value<T: Injectable>(&self, value: T) {
        self.service::<T>().provide_value(value);
    }

    /// Declare a ready instance under `name`.
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    #[inline]
    pub fn provide_named_value<T: Injectable>(&self, name: impl Into<String>, value: T) {
        self.service::<T>().named(name).provide_value(value);
    }

    /// Replace whatever is registered under `T`'s type name with a provider.
    ///
    /// Records no capabilities; use [`service`](Self::service) for those.
    #[inline]
    pub fn override_provide<T: Injectable, F>(&self, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.service::<T>().override_provide(provider);
    }

    /// Replace whatever is registered under `name` with a provider.
    #[inline]
    pub fn override_named<T: Injectable, F>(&self, name: impl Into<String>, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.service::<T>().named(name).override_provide(provider);
    }

    /// Replace whatever is registered under `T`'s type name with a value.
    ///
    /// Records no capabilities; use [`service`](Self::service) for those.
    #[inline]
    pub fn override_value<T: Injectable>(&self, value: T) {
        self.service::<T>().override_value(value);
    }

    /// Replace whatever is registered under `name` with a value.
    #[inline]
    pub fn override_named_value<T: Injectable>(&self, name: impl Into<String>, value: T) {
        self.service::<T>().named(name).override_value(value);
    }

    /// Insert a new entry, panicking if the name is taken
    fn declare<T: Injectable>(&self, name: String, entry: ServiceEntry<T>) {
        #[cfg(feature = "logging")]
        let kind = entry.kind();

        if !self.registry.insert_if_absent(name.clone(), Arc::new(entry)) {
            #[cfg(feature = "logging")]
            error!(
                target: "service_injector",
                service = %name,
                "Service declared twice"
            );
            panic!("{}", DiError::already_declared(name));
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = %name,
            kind = ?kind,
            service_count = self.registry.len(),
            "Registered service"
        );

        self.logf(format_args!("service {name} injected"));
        self.fire(&self.options.on_registration, &name);
    }

    /// Insert or replace an entry
    fn replace<T: Injectable>(&self, name: String, entry: ServiceEntry<T>) {
        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = %name,
            kind = ?entry.kind(),
            replaced = self.registry.exists(&name),
            "Overriding service"
        );

        self.registry.set(name.clone(), Arc::new(entry));

        self.logf(format_args!("service {name} overridden"));
        self.fire(&self.options.on_registration, &name);
    }

    // =========================================================================
    // Invocation Methods
    // =========================================================================

    /// Get the service registered under `T`'s type name, building it if needed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use service_injector::Injector;
    ///
    /// let injector = Injector::new();
    /// injector.provide(|_| Ok(String::from("hello")));
    ///
    /// let greeting = injector.invoke::<String>().unwrap();
    /// assert_eq!(greeting.as_str(), "hello");
    /// ```
    #[inline]
    pub fn invoke<T: Injectable>(&self) -> Result<Arc<T>> {
        self.invoke_implem(&service_name::<T>())
    }

    /// Get the service registered under `name`, building it if needed.
    ///
    /// A slot holding a different type is reported as not found.
    #[inline]
    pub fn invoke_named<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        self.invoke_implem(name)
    }

    /// Like [`invoke`](Self::invoke), for wiring that cannot continue without
    /// the service.
    ///
    /// # Panics
    ///
    /// If the service is missing or fails to build.
    #[inline]
    pub fn must_invoke<T: Injectable>(&self) -> Arc<T> {
        self.invoke::<T>().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`invoke_named`](Self::invoke_named), panicking on error.
    ///
    /// # Panics
    ///
    /// If the service is missing, has another type, or fails to build.
    #[inline]
    pub fn must_invoke_named<T: Injectable>(&self, name: &str) -> Arc<T> {
        self.invoke_named::<T>(name)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    fn invoke_implem<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        #[cfg(feature = "logging")]
        trace!(
            target: "service_injector",
            service = name,
            "Invoking service"
        );

        let Some(entry) = self.registry.get_typed::<T>(name) else {
            return Err(self.service_not_found(name));
        };

        let instance = entry.get_instance(self)?;

        self.invocations.record(name);
        self.fire(&self.options.on_invoke, name);

        #[cfg(feature = "logging")]
        trace!(
            target: "service_injector",
            service = name,
            "Service invoked"
        );

        self.logf(format_args!("service {name} invoked"));

        Ok(instance)
    }

    #[cold]
    fn service_not_found(&self, name: &str) -> DiError {
        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = name,
            "Service not found"
        );

        DiError::not_found(name, self.registry.names())
    }

    // =========================================================================
    // Health Check Methods
    // =========================================================================

    /// Run the health check of the service registered under `T`'s type name.
    #[inline]
    pub fn health_check<T: Injectable>(&self) -> Result<()> {
        self.health_check_implem(&service_name::<T>())
    }

    /// Run the health check of the service registered under `name`.
    ///
    /// Unbuilt services and services without a health check are healthy.
    #[inline]
    pub fn health_check_named(&self, name: &str) -> Result<()> {
        self.health_check_implem(name)
    }

    /// Run every service's health check.
    pub fn health_check_all(&self) -> HashMap<String, Result<()>> {
        self.registry
            .entries()
            .into_iter()
            .map(|entry| {
                let name = entry.name().to_owned();
                let result = self.run_health_check(&name, entry.as_ref());
                (name, result)
            })
            .collect()
    }

    fn health_check_implem(&self, name: &str) -> Result<()> {
        let Some(entry) = self.registry.get(name) else {
            return Err(self.service_not_found(name));
        };
        self.run_health_check(name, entry.as_ref())
    }

    fn run_health_check(&self, name: &str, entry: &dyn ErasedService) -> Result<()> {
        let result = entry.health_check();

        #[cfg(feature = "logging")]
        match &result {
            Ok(()) => trace!(
                target: "service_injector",
                service = name,
                "Health check passed"
            ),
            Err(err) => debug!(
                target: "service_injector",
                service = name,
                error = %err,
                "Health check failed"
            ),
        }

        #[cfg(not(feature = "logging"))]
        let _ = name;

        result
    }

    // =========================================================================
    // Shutdown Methods
    // =========================================================================

    /// Shut down the service registered under `T`'s type name.
    #[inline]
    pub fn shutdown<T: Injectable>(&self) -> Result<()> {
        self.shutdown_implem(&service_name::<T>())
    }

    /// Shut down the service registered under `name`.
    ///
    /// A lazy service returns to its unbuilt state and is rebuilt on its next
    /// invocation. If the service's own shutdown fails, the error is returned
    /// and the service keeps its instance.
    #[inline]
    pub fn shutdown_named(&self, name: &str) -> Result<()> {
        self.shutdown_implem(name)
    }

    /// Like [`shutdown`](Self::shutdown), panicking on error.
    ///
    /// # Panics
    ///
    /// If the service is missing or its shutdown fails.
    #[inline]
    pub fn must_shutdown<T: Injectable>(&self) {
        if let Err(err) = self.shutdown::<T>() {
            panic!("{err}");
        }
    }

    /// Like [`shutdown_named`](Self::shutdown_named), panicking on error.
    ///
    /// # Panics
    ///
    /// If the service is missing or its shutdown fails.
    #[inline]
    pub fn must_shutdown_named(&self, name: &str) {
        if let Err(err) = self.shutdown_named(name) {
            panic!("{err}");
        }
    }

    /// Shut down every service once.
    ///
    /// Invoked services go first, most recently first-invoked first; the
    /// services never invoked follow in name order. Failures do not stop the
    /// sweep and are reported together as [`DiError::Shutdown`].
    pub fn shutdown_all(&self) -> Result<()> {
        let invoked = self.invocations.names_in_order();
        let seen: HashSet<&str> = invoked.iter().map(String::as_str).collect();

        let mut order: Vec<String> = invoked.iter().rev().cloned().collect();
        order.extend(
            self.registry
                .names()
                .into_iter()
                .filter(|name| !seen.contains(name.as_str())),
        );

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service_count = order.len(),
            "Shutting down all services"
        );

        let mut failures = Vec::new();
        for name in order {
            match self.shutdown_implem(&name) {
                Ok(()) => {}
                // Removed while the sweep was running
                Err(err) if err.is_not_found() => {}
                Err(err) => failures.push((name, err)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Shutdown { failures })
        }
    }

    fn shutdown_implem(&self, name: &str) -> Result<()> {
        let Some(entry) = self.registry.get(name) else {
            return Err(self.service_not_found(name));
        };

        self.logf(format_args!("requested shutdown for service {name}"));

        if let Err(err) = entry.shutdown() {
            #[cfg(feature = "logging")]
            debug!(
                target: "service_injector",
                service = name,
                error = %err,
                "Service shutdown failed, keeping instance"
            );
            return Err(err);
        }

        self.invocations.forget(name);

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = name,
            "Service shut down"
        );

        self.fire(&self.options.on_shutdown, name);
        Ok(())
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Check if a service is registered under `T`'s type name.
    #[inline]
    pub fn contains<T: Injectable>(&self) -> bool {
        self.registry.exists(&service_name::<T>())
    }

    /// Check if a service is registered under `name`.
    #[inline]
    pub fn contains_named(&self, name: &str) -> bool {
        self.registry.exists(name)
    }

    /// Whether the service under `T`'s type name is eager or lazy.
    #[inline]
    pub fn kind<T: Injectable>(&self) -> Option<ServiceKind> {
        self.kind_named(&service_name::<T>())
    }

    /// Whether the service under `name` is eager or lazy, `None` if absent.
    #[inline]
    pub fn kind_named(&self, name: &str) -> Option<ServiceKind> {
        self.registry.get(name).map(|entry| entry.kind())
    }

    /// Check if the service under `name` currently holds an instance.
    ///
    /// Eager services always do; lazy ones only between a successful build
    /// and the next shutdown.
    #[inline]
    pub fn is_built_named(&self, name: &str) -> bool {
        self.registry.get(name).is_some_and(|entry| entry.is_built())
    }

    /// Unregister the service under `T`'s type name without shutting it down.
    #[inline]
    pub fn remove<T: Injectable>(&self) -> bool {
        self.remove_named(&service_name::<T>())
    }

    /// Unregister the service under `name` without shutting it down.
    pub fn remove_named(&self, name: &str) -> bool {
        let removed = self.registry.remove(name);
        if removed {
            self.invocations.forget(name);

            #[cfg(feature = "logging")]
            debug!(
                target: "service_injector",
                service = name,
                "Service removed"
            );
        }
        removed
    }

    /// Names of all registered services, sorted.
    #[inline]
    pub fn list_provided_services(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Names of invoked services, in order of first invocation.
    #[inline]
    pub fn list_invoked_services(&self) -> Vec<String> {
        self.invocations.names_in_order()
    }

    /// Get the number of registered services.
    #[inline]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no service is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    #[inline]
    fn fire(&self, hook: &Option<ServiceHook>, name: &str) {
        if let Some(hook) = hook {
            hook(self, name);
        }
    }

    #[inline]
    fn logf(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.options.log_sink {
            sink(&args.to_string());
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("service_count", &self.len())
            .field("invoked_count", &self.invocations.order.len())
            .field("options", &self.options)
            .finish()
    }
}

// =============================================================================
// Typed Registration
// =============================================================================

/// Fluent registration for one service type.
///
/// Created by [`Injector::service`]. Finish with one of `provide`,
/// `provide_value`, `override_provide` or `override_value`.
#[must_use = "a registration does nothing until provided"]
pub struct Registration<'a, T> {
    injector: &'a Injector,
    name: Option<String>,
    capabilities: Capabilities<T>,
}

impl<'a, T: Injectable> Registration<'a, T> {
    /// Register under `name` instead of the type name
    #[inline]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare a lazily built service.
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    pub fn provide<F>(self, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        let name = self.resolve_name();
        let entry = ServiceEntry::lazy(name.clone(), provider_fn(provider), self.capabilities);
        self.injector.declare(name, entry);
    }

    /// Declare a ready instance.
    ///
    /// # Panics
    ///
    /// If the name is already registered.
    pub fn provide_value(self, value: T) {
        let name = self.resolve_name();
        let entry = ServiceEntry::eager(name.clone(), value, self.capabilities);
        self.injector.declare(name, entry);
    }

    /// Replace any existing registration with a provider.
    pub fn override_provide<F>(self, provider: F)
    where
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        let name = self.resolve_name();
        let entry = ServiceEntry::lazy(name.clone(), provider_fn(provider), self.capabilities);
        self.injector.replace(name, entry);
    }

    /// Replace any existing registration with a ready instance.
    pub fn override_value(self, value: T) {
        let name = self.resolve_name();
        let entry = ServiceEntry::eager(name.clone(), value, self.capabilities);
        self.injector.replace(name, entry);
    }

    #[inline]
    fn resolve_name(&self) -> String {
        self.name.clone().unwrap_or_else(service_name::<T>)
    }
}

impl<'a, T: Injectable + Healthcheckable> Registration<'a, T> {
    /// Run `T`'s health check on health-check requests
    #[inline]
    pub fn healthcheckable(mut self) -> Self {
        self.capabilities = self.capabilities.with_health_check();
        self
    }
}

impl<'a, T: Injectable + Shutdownable> Registration<'a, T> {
    /// Run `T`'s shutdown routine on shutdown requests
    #[inline]
    pub fn shutdownable(mut self) -> Self {
        self.capabilities = self.capabilities.with_shutdown();
        self
    }
}
