//! Process-wide default injector
//!
//! Nothing creates the default injector implicitly: it exists once
//! [`default_injector`] has been called and lives until the process exits.

use crate::Injector;
use once_cell::sync::OnceCell;

#[cfg(feature = "logging")]
use tracing::debug;

static DEFAULT_INJECTOR: OnceCell<Injector> = OnceCell::new();

/// Get the default injector, creating it on first call.
///
/// Concurrent first calls create it once.
///
/// # Examples
///
/// ```rust
/// use service_injector::default_injector;
///
/// default_injector().override_named_value("greeting", String::from("hello"));
/// let greeting = default_injector().invoke_named::<String>("greeting").unwrap();
/// assert_eq!(greeting.as_str(), "hello");
/// ```
pub fn default_injector() -> &'static Injector {
    DEFAULT_INJECTOR.get_or_init(|| {
        #[cfg(feature = "logging")]
        debug!(
            target: "service_injector",
            "Creating default injector"
        );

        Injector::new()
    })
}

/// Use `injector` if given, otherwise the default injector.
#[inline]
pub fn injector_or_default(injector: Option<&Injector>) -> &Injector {
    match injector {
        Some(injector) => injector,
        None => default_injector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_injector_is_shared() {
        let a = default_injector() as *const Injector;
        let b = default_injector() as *const Injector;
        assert_eq!(a, b);
    }

    #[test]
    fn test_injector_or_default() {
        let local = Injector::new();
        local.provide_named_value("only-local-global-test", 1u8);

        assert!(injector_or_default(Some(&local)).contains_named("only-local-global-test"));
        assert!(!injector_or_default(None).contains_named("only-local-global-test"));
        assert!(std::ptr::eq(injector_or_default(None), default_injector()));
    }
}
