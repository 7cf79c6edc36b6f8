//! # Identifiers
//!
//! String-backed identifier newtypes. Identifiers are opaque: the ledger
//! never interprets their contents beyond equality and ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Social worker submitting visits (the authenticated caller).
    WorkerId
);
string_id!(
    /// Residential care facility (RCFE).
    FacilityId
);
string_id!(
    /// Member residing in a facility.
    MemberId
);
string_id!(
    /// A single visit record.
    VisitId
);
string_id!(
    /// Claim record key, derived from worker, day and facility.
    ClaimId
);
string_id!(
    /// Sign-off attestation record.
    SignOffId
);
