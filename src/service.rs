//! Registry entries
//!
//! An entry is either eager (the instance exists at registration) or lazy
//! (a provider plus a build cache). The injector only ever sees entries
//! through the type-erased [`ErasedService`] table and recovers the typed
//! [`ServiceEntry<T>`] with a checked downcast at invocation time.

use crate::lifecycle::Capabilities;
use crate::provider::ProviderFn;
use crate::{DiError, Injectable, Injector, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// How an entry produces its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Instance supplied at registration
    Eager,
    /// Instance built by a provider on first invocation
    Lazy,
}

/// Type-erased view of an entry, used by the registry and by sweeps that
/// visit every entry without knowing its type.
pub(crate) trait ErasedService: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ServiceKind;

    fn is_built(&self) -> bool;

    fn health_check(&self) -> Result<()>;

    fn shutdown(&self) -> Result<()>;

    /// Copy of this entry in its never-built state
    fn fresh_clone(&self) -> Arc<dyn ErasedService>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

// =============================================================================
// Eager Service
// =============================================================================

/// Entry holding an instance built before registration.
///
/// The instance never changes; replacing it means overriding the whole entry.
pub(crate) struct EagerService<T> {
    name: String,
    instance: Arc<T>,
    capabilities: Capabilities<T>,
}

impl<T: Injectable> EagerService<T> {
    #[inline]
    pub fn new(name: String, instance: T, capabilities: Capabilities<T>) -> Self {
        Self {
            name,
            instance: Arc::new(instance),
            capabilities,
        }
    }

    #[inline]
    pub fn get_instance(&self) -> Arc<T> {
        Arc::clone(&self.instance)
    }

    #[inline]
    pub fn health_check(&self) -> Result<()> {
        self.capabilities.run_health_check(&self.instance)
    }

    /// Eager entries keep their instance after shutdown.
    #[inline]
    pub fn shutdown(&self) -> Result<()> {
        self.capabilities.run_shutdown(&self.instance)
    }
}

impl<T> Clone for EagerService<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            instance: Arc::clone(&self.instance),
            capabilities: self.capabilities,
        }
    }
}

// =============================================================================
// Lazy Service
// =============================================================================

/// Entry that builds its instance on first invocation.
///
/// The state is `None` while unbuilt and `Some` once a provider call
/// succeeded. A single lock covers the check and the build, so concurrent
/// first invocations run the provider once and all receive the same `Arc`.
///
/// # Reentrancy
///
/// The lock is held while the provider runs, and the provider may invoke
/// other services. A provider that (directly or through other providers)
/// invokes its own entry blocks on its own lock: `std::sync::RwLock` either
/// deadlocks or panics in that case. A cycle between distinct entries that
/// never revisits a held lock recurses until the stack is exhausted. Cycles
/// are not detected.
pub(crate) struct LazyService<T> {
    name: String,
    provider: ProviderFn<T>,
    capabilities: Capabilities<T>,
    state: RwLock<Option<Arc<T>>>,
}

impl<T: Injectable> LazyService<T> {
    #[inline]
    pub fn new(name: String, provider: ProviderFn<T>, capabilities: Capabilities<T>) -> Self {
        Self {
            name,
            provider,
            capabilities,
            state: RwLock::new(None),
        }
    }

    /// Return the instance, building it first if needed.
    ///
    /// A failed build leaves the entry unbuilt; the next call retries.
    pub fn get_instance(&self, injector: &Injector) -> Result<Arc<T>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(instance) = state.as_ref() {
            #[cfg(feature = "logging")]
            trace!(
                target: "service_injector",
                service = %self.name,
                "Lazy service already built, returning cached instance"
            );
            return Ok(Arc::clone(instance));
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = %self.name,
            "Building lazy service on first invocation"
        );

        let instance = Arc::new(self.build(injector)?);
        *state = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// Run the provider, turning a panic into `CreationFailed`
    fn build(&self, injector: &Injector) -> Result<T> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.provider)(injector)));

        match outcome {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(err)) => {
                #[cfg(feature = "logging")]
                debug!(
                    target: "service_injector",
                    service = %self.name,
                    error = %err,
                    "Provider returned an error, service stays unbuilt"
                );
                Err(err)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());

                #[cfg(feature = "logging")]
                warn!(
                    target: "service_injector",
                    service = %self.name,
                    reason = %reason,
                    "Provider panicked, service stays unbuilt"
                );

                Err(DiError::creation_failed(&self.name, reason))
            }
        }
    }

    /// Unbuilt entries are healthy.
    pub fn health_check(&self) -> Result<()> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.as_ref() {
            Some(instance) => self.capabilities.run_health_check(instance),
            None => Ok(()),
        }
    }

    /// Shut the instance down and return to the unbuilt state.
    ///
    /// If the instance's own shutdown fails the entry stays built.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let Some(instance) = state.as_ref() else {
            return Ok(());
        };

        self.capabilities.run_shutdown(instance)?;
        *state = None;

        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            service = %self.name,
            "Lazy service reset, next invocation rebuilds it"
        );

        Ok(())
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T> Clone for LazyService<T> {
    /// Same name and provider, never built.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            provider: Arc::clone(&self.provider),
            capabilities: self.capabilities,
            state: RwLock::new(None),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(err) = payload.downcast_ref::<DiError>() {
        err.to_string()
    } else {
        "provider panicked".to_owned()
    }
}

// =============================================================================
// ServiceEntry
// =============================================================================

/// Typed entry stored (erased) in the registry
pub(crate) enum ServiceEntry<T> {
    Eager(EagerService<T>),
    Lazy(LazyService<T>),
}

impl<T: Injectable> ServiceEntry<T> {
    #[inline]
    pub fn eager(name: String, instance: T, capabilities: Capabilities<T>) -> Self {
        ServiceEntry::Eager(EagerService::new(name, instance, capabilities))
    }

    #[inline]
    pub fn lazy(name: String, provider: ProviderFn<T>, capabilities: Capabilities<T>) -> Self {
        ServiceEntry::Lazy(LazyService::new(name, provider, capabilities))
    }

    #[inline]
    pub fn get_instance(&self, injector: &Injector) -> Result<Arc<T>> {
        match self {
            ServiceEntry::Eager(s) => Ok(s.get_instance()),
            ServiceEntry::Lazy(s) => s.get_instance(injector),
        }
    }
}

impl<T: Injectable> ErasedService for ServiceEntry<T> {
    fn name(&self) -> &str {
        match self {
            ServiceEntry::Eager(s) => &s.name,
            ServiceEntry::Lazy(s) => &s.name,
        }
    }

    fn kind(&self) -> ServiceKind {
        match self {
            ServiceEntry::Eager(_) => ServiceKind::Eager,
            ServiceEntry::Lazy(_) => ServiceKind::Lazy,
        }
    }

    fn is_built(&self) -> bool {
        match self {
            ServiceEntry::Eager(_) => true,
            ServiceEntry::Lazy(s) => s.is_built(),
        }
    }

    fn health_check(&self) -> Result<()> {
        match self {
            ServiceEntry::Eager(s) => s.health_check(),
            ServiceEntry::Lazy(s) => s.health_check(),
        }
    }

    fn shutdown(&self) -> Result<()> {
        match self {
            ServiceEntry::Eager(s) => s.shutdown(),
            ServiceEntry::Lazy(s) => s.shutdown(),
        }
    }

    fn fresh_clone(&self) -> Arc<dyn ErasedService> {
        match self {
            ServiceEntry::Eager(s) => Arc::new(ServiceEntry::Eager(s.clone())),
            ServiceEntry::Lazy(s) => Arc::new(ServiceEntry::Lazy(s.clone())),
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
