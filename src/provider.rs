//! Provider traits for the injector
//!
//! These define what types can be registered and the shape of the functions
//! that build them.

use crate::{Injector, Result};
use std::sync::Arc;

/// Marker trait for types that can be stored in the injector.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
///
/// # Examples
///
/// ```rust
/// // Any type that is Send + Sync + 'static works automatically
/// struct MyService {
///     name: String,
/// }
///
/// // No impl needed - it just works!
/// ```
pub trait Injectable: Send + Sync + 'static {}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type-erased provider function shared between an entry and its clones.
///
/// The injector is lent to the provider for the duration of the build so it
/// can invoke the services it depends on.
pub(crate) type ProviderFn<T> = Arc<dyn Fn(&Injector) -> Result<T> + Send + Sync>;

/// Convert a user provider into the shared form stored by lazy entries
#[inline]
pub(crate) fn provider_fn<T, F>(provider: F) -> ProviderFn<T>
where
    T: Injectable,
    F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(provider)
}
