//! Optional service capabilities
//!
//! A service may expose a health check, a shutdown routine, or both. The
//! registry cannot ask an arbitrary `T` whether it implements a trait, so the
//! answer is captured once at registration time as a capabilities table
//! and stored next to the entry.
//!
//! # Example
//!
//! ```rust
//! use service_injector::{Injector, Result, Shutdownable};
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! struct Pool {
//!     open: AtomicBool,
//! }
//!
//! impl Shutdownable for Pool {
//!     fn shutdown(&self) -> Result<()> {
//!         self.open.store(false, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector
//!     .service::<Pool>()
//!     .shutdownable()
//!     .provide(|_| Ok(Pool { open: AtomicBool::new(true) }));
//!
//! let pool = injector.invoke::<Pool>().unwrap();
//! injector.shutdown::<Pool>().unwrap();
//! assert!(!pool.open.load(Ordering::SeqCst));
//! ```

use crate::Result;
use std::sync::Arc;

/// A service that can report its own health.
pub trait Healthcheckable {
    /// Return an error if the service is unhealthy
    fn health_check(&self) -> Result<()>;
}

/// A service that owns resources to release on teardown.
pub trait Shutdownable {
    /// Release the service's resources
    fn shutdown(&self) -> Result<()>;
}

impl<T: Healthcheckable + ?Sized> Healthcheckable for Arc<T> {
    #[inline]
    fn health_check(&self) -> Result<()> {
        (**self).health_check()
    }
}

impl<T: Healthcheckable + ?Sized> Healthcheckable for Box<T> {
    #[inline]
    fn health_check(&self) -> Result<()> {
        (**self).health_check()
    }
}

impl<T: Shutdownable + ?Sized> Shutdownable for Arc<T> {
    #[inline]
    fn shutdown(&self) -> Result<()> {
        (**self).shutdown()
    }
}

impl<T: Shutdownable + ?Sized> Shutdownable for Box<T> {
    #[inline]
    fn shutdown(&self) -> Result<()> {
        (**self).shutdown()
    }
}

type HookFn<T> = fn(&T) -> Result<()>;

/// Capabilities recorded for a service type at registration time.
///
/// An absent capability makes the matching entry operation a no-op success.
pub(crate) struct Capabilities<T> {
    health_check: Option<HookFn<T>>,
    shutdown: Option<HookFn<T>>,
}

impl<T> Capabilities<T> {
    /// No capabilities
    #[inline]
    pub const fn none() -> Self {
        Self {
            health_check: None,
            shutdown: None,
        }
    }

    /// Whether a health check was recorded
    #[inline]
    pub fn is_healthcheckable(&self) -> bool {
        self.health_check.is_some()
    }

    /// Whether a shutdown routine was recorded
    #[inline]
    pub fn is_shutdownable(&self) -> bool {
        self.shutdown.is_some()
    }

    #[inline]
    pub(crate) fn run_health_check(&self, instance: &T) -> Result<()> {
        match self.health_check {
            Some(check) => check(instance),
            None => Ok(()),
        }
    }

    #[inline]
    pub(crate) fn run_shutdown(&self, instance: &T) -> Result<()> {
        match self.shutdown {
            Some(shutdown) => shutdown(instance),
            None => Ok(()),
        }
    }
}

impl<T: Healthcheckable> Capabilities<T> {
    /// Record `T`'s health check
    #[inline]
    pub fn with_health_check(mut self) -> Self {
        self.health_check = Some(<T as Healthcheckable>::health_check);
        self
    }
}

impl<T: Shutdownable> Capabilities<T> {
    /// Record `T`'s shutdown routine
    #[inline]
    pub fn with_shutdown(mut self) -> Self {
        self.shutdown = Some(<T as Shutdownable>::shutdown);
        self
    }
}

impl<T> Default for Capabilities<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> Clone for Capabilities<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Capabilities<T> {}

impl<T> std::fmt::Debug for Capabilities<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("health_check", &self.is_healthcheckable())
            .field("shutdown", &self.is_shutdownable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiError;

    struct Probe {
        healthy: bool,
    }

    impl Healthcheckable for Probe {
        fn health_check(&self) -> Result<()> {
            if self.healthy {
                Ok(())
            } else {
                Err(DiError::msg("probe unhealthy"))
            }
        }
    }

    impl Shutdownable for Probe {
        fn shutdown(&self) -> Result<()> {
            Err(DiError::msg("probe refuses to stop"))
        }
    }

    #[test]
    fn test_none_is_trivially_ok() {
        let caps = Capabilities::<Probe>::none();
        let probe = Probe { healthy: false };

        assert!(!caps.is_healthcheckable());
        assert!(!caps.is_shutdownable());
        assert!(caps.run_health_check(&probe).is_ok());
        assert!(caps.run_shutdown(&probe).is_ok());
    }

    #[test]
    fn test_recorded_hooks_delegate() {
        let caps = Capabilities::<Probe>::none().with_health_check().with_shutdown();

        assert!(caps.run_health_check(&Probe { healthy: true }).is_ok());
        let err = caps.run_health_check(&Probe { healthy: false }).unwrap_err();
        assert_eq!(err.to_string(), "probe unhealthy");

        let err = caps.run_shutdown(&Probe { healthy: true }).unwrap_err();
        assert_eq!(err.to_string(), "probe refuses to stop");
    }

    #[test]
    fn test_arc_forwards_capabilities() {
        let caps = Capabilities::<Arc<Probe>>::none().with_health_check();
        let probe = Arc::new(Probe { healthy: false });
        assert!(caps.run_health_check(&probe).is_err());
    }
}
