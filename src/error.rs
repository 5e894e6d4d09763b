//! Error types for gravity source registration.

use bevy::prelude::*;
use thiserror::Error;

/// Errors returned by the fallible [`GravityField`](crate::field::GravityField) operations.
///
/// Both variants are programmer errors. The non-fallible wrappers
/// (`register` / `unregister`) panic on them in debug builds and
/// ignore them in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GravityFieldError {
    /// The source was already present in the field.
    #[error("gravity source {0} is already registered")]
    AlreadyRegistered(Entity),

    /// The source was never registered, or was already removed.
    #[error("gravity source {0} is not registered")]
    NotRegistered(Entity),
}

/// Result type for gravity field operations.
pub type GravityFieldResult<T> = std::result::Result<T, GravityFieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_source() {
        let entity = Entity::from_raw(7);
        let err = GravityFieldError::AlreadyRegistered(entity);
        assert!(err.to_string().contains("already registered"));

        let err = GravityFieldError::NotRegistered(entity);
        assert!(err.to_string().contains("not registered"));
    }
}
