//! Factions, unit identifiers and unit records.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Coord;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Name of one of the two competing sides.
    FactionId
}

string_id! {
    /// Stable unit identifier, unique for the whole game.
    UnitId
}

/// A single unit on the board.
///
/// Destroyed units stay in the state's arena so ids remain valid referents;
/// liveness is derived from hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning faction.
    pub faction: FactionId,
    /// Current location.
    #[serde(flatten)]
    pub coord: Coord,
    /// Hit points. May go negative when damage stacks.
    pub hp: i32,
    /// Damage dealt by one successful attack.
    pub attack: i32,
}

impl Unit {
    /// Create a new unit.
    #[must_use]
    pub fn new(
        id: impl Into<UnitId>,
        faction: impl Into<FactionId>,
        coord: Coord,
        hp: i32,
        attack: i32,
    ) -> Self {
        Self {
            id: id.into(),
            faction: faction.into(),
            coord,
            hp,
            attack,
        }
    }

    /// A unit is alive while it has positive hit points.
    #[must_use]
    #[inline]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Whether this unit belongs to `faction`.
    #[must_use]
    pub fn belongs_to(&self, faction: &FactionId) -> bool {
        &self.faction == faction
    }
}
