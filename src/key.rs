//! Service keys
//!
//! Every registry slot is addressed by a string. Named registrations use the
//! caller's name; unnamed ones derive it from the service type, so there is
//! exactly one unnamed slot per distinct type.

/// Derive the default registry key for `T`.
///
/// The key is the fully qualified type path, e.g. `alloc::string::String` or
/// `alloc::sync::Arc<dyn my_app::Engine>`. It is stable for the lifetime of
/// the process, which is all the registry needs.
#[inline]
pub fn service_name<T: ?Sized + 'static>() -> String {
    std::any::type_name::<T>().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Engine;
    trait Wheel {}

    #[test]
    fn test_distinct_types_get_distinct_keys() {
        assert_ne!(service_name::<Engine>(), service_name::<String>());
        assert_ne!(service_name::<Engine>(), service_name::<Arc<Engine>>());
    }

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(service_name::<Engine>(), service_name::<Engine>());
        assert!(service_name::<Engine>().ends_with("Engine"));
    }

    #[test]
    fn test_trait_objects_have_keys() {
        let key = service_name::<Arc<dyn Wheel + Send + Sync>>();
        assert!(key.contains("Wheel"));
    }
}
