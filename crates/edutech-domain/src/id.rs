//! Newtype wrappers for identifiers generated by the backend.
//!
//! Every table in the hosted store keys its rows by a UUID. Wrapping them keeps
//! a course id from being passed where a batch id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifies an identity in the authentication subsystem. Profiles share it.
    IdentityId
);

uuid_id!(
    /// Identifies a course row.
    CourseId
);

uuid_id!(
    /// Identifies a batch row.
    BatchId
);

uuid_id!(
    /// Identifies an enrollment row.
    EnrollmentId
);
