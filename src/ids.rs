//! Identifier types.
//!
//! Entities, skills and modifiers are named by interned strings. Each id is
//! an `Arc<str>` newtype, so cloning is a refcount bump and comparison is a
//! plain string compare. The three kinds are distinct types so an entity id
//! can never be passed where a skill id is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create an id from a string slice.
            pub fn from_str(s: &str) -> Self {
                Self(Arc::from(s))
            }

            /// The string form of this id.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_str(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.0.as_ref().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s))
            }
        }
    };
}

interned_id! {
    /// Identifier of an entity (player, monster, NPC) participating in resolution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statforge::EntityId;
    ///
    /// let hero = EntityId::from_str("hero");
    /// let same: EntityId = "hero".into();
    /// assert_eq!(hero, same);
    /// assert_eq!(hero.as_str(), "hero");
    /// ```
    EntityId
}

interned_id! {
    /// Identifier of a skill definition.
    SkillId
}

interned_id! {
    /// Identifier of a single modifier record inside a ledger.
    ModifierId
}
