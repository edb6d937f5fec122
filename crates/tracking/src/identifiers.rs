//! Newtype identifiers for server-side entities.
//!
//! The tracking server assigns integer ids to projects, models and
//! experiments. Each is a distinct newtype so a [`ProjectId`] can never be
//! passed where a [`ModelId`] is expected, even though both are `u64` under
//! the hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (server-assigned integers).
// Generates: struct (Copy), new(), as_u64(), From<u64>, Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

u64_id! {
    /// Identifies a project: the top-level grouping of models on the server.
    ProjectId
}

u64_id! {
    /// Identifies a model belonging to a project.
    ///
    /// Every experiment is logged against exactly one model.
    ModelId
}

u64_id! {
    /// Identifies a single logged experiment (one parameters/scores record).
    ExperimentId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_integer() {
        assert_eq!(ModelId::new(42).to_string(), "42");
        assert_eq!(ProjectId::from(7).to_string(), "7");
    }

    #[test]
    fn test_serialises_transparently() {
        let json = serde_json::to_string(&ExperimentId::new(3)).unwrap();
        assert_eq!(json, "3");

        let back: ModelId = serde_json::from_str("11").unwrap();
        assert_eq!(back.as_u64(), 11);
    }
}
