//! The error type shared by the world, the schedule and user callbacks.

use core::fmt;

use crate::ecs::entity::Entity;

/// Errors raised by world access, system registration and tick execution.
///
/// Not every failure is an error: removing a component that was never added, destroying an
/// entity that is already on its way out, and declaring an empty filter are all accepted as
/// no-ops.
#[derive(Debug)]
pub enum Error {
    /// A phased system was registered next to unphased ones (or the reverse). This is a
    /// programming mistake and setup must not continue past it.
    MixedPhases {
        /// The display name of the system that was rejected.
        system: String,
    },

    /// A component was requested from an entity that does not carry it.
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    /// The entity handle does not refer to a live entity in this world.
    NoSuchEntity(Entity),

    /// A system callback failed. The remainder of the tick was abandoned.
    System {
        system: String,
        source: Box<Error>,
    },

    /// An event listener failed. The remainder of the tick was abandoned.
    Listener {
        event: &'static str,
        source: Box<Error>,
    },

    /// A failure raised by user code through [`Error::custom`].
    Custom(String),
}

impl Error {
    /// Construct an error from a user supplied message.
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Construct a missing component error for the component type `C`.
    #[inline]
    pub(crate) fn missing<C: 'static>(entity: Entity) -> Self {
        Self::MissingComponent {
            entity,
            component: std::any::type_name::<C>(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MixedPhases { system } => write!(
                f,
                "system `{system}` mixes phased and unphased registration; either every system declares a phase or none does"
            ),
            Error::MissingComponent { entity, component } => {
                write!(f, "entity {entity:?} has no component `{component}`")
            }
            Error::NoSuchEntity(entity) => write!(f, "entity {entity:?} is not alive"),
            Error::System { system, source } => write!(f, "system `{system}` failed: {source}"),
            Error::Listener { event, source } => {
                write!(f, "listener for `{event}` failed: {source}")
            }
            Error::Custom(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::System { source, .. } | Error::Listener { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_names_the_component() {
        // Given
        let error = Error::missing::<u32>(Entity::new(3));

        // Then
        assert_eq!(
            error.to_string(),
            format!("entity {:?} has no component `u32`", Entity::new(3))
        );
    }

    #[test]
    fn system_error_exposes_its_source() {
        // Given
        let error = Error::System {
            system: "movement".into(),
            source: Box::new(Error::custom("boom")),
        };

        // Then
        assert_eq!(error.to_string(), "system `movement` failed: boom");
        assert_eq!(error.source().unwrap().to_string(), "boom");
        assert!(Error::custom("x").source().is_none());
    }
}
