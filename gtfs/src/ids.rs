use std::fmt;

use serde::{Deserialize, Serialize};

// GTFS identifiers are opaque strings. Missing columns and blank values deserialize to the empty
// ID; the joins skip those instead of matching one blank against another.
macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(x: S) -> Self {
                Self(x.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(x: &str) -> Self {
                Self(x.to_string())
            }
        }
    };
}

string_id!(StopID);
string_id!(RouteID);
string_id!(TripID);
string_id!(ShapeID);
