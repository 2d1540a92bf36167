//! Numeric identifier newtypes.
//!
//! Every entity carries an internal numeric id allocated by the database.
//! Wrapping them keeps a space id from being passed where a user id is
//! expected; the raw value is exposed only at the adapter boundaries.

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw numeric value for queries and projections.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
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

numeric_id! {
    /// Identifier of a registered user.
    UserId
}

numeric_id! {
    /// Identifier of a space.
    SpaceId
}

numeric_id! {
    /// Identifier of a commitment.
    CommitmentId
}

numeric_id! {
    /// Identifier of a membership row, used as the invite handle.
    InviteId
}

numeric_id! {
    /// Identifier of an audit event.
    EventId
}
