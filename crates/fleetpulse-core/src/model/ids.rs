// ── Opaque identifiers ──
//
// The server renders primary keys as integers today, but nothing on the
// client side does arithmetic with them. Both ids are kept as the text the
// server sent so they round-trip into URLs and toasts unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

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
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<fleetpulse_api::RecordId> for $name {
            fn from(raw: fleetpulse_api::RecordId) -> Self {
                match raw {
                    fleetpulse_api::RecordId::Number(n) => Self(n.to_string()),
                    fleetpulse_api::RecordId::Text(s) => Self(s),
                }
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s.trim()))
            }
        }
    };
}

opaque_id! {
    /// Identifier of a company, as used in `/devices/company/{id}`.
    CompanyId
}

opaque_id! {
    /// Identifier of a device within the fleet.
    DeviceId
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetpulse_api::RecordId;

    #[test]
    fn numeric_and_text_ids_display_as_sent() {
        assert_eq!(CompanyId::from(RecordId::Number(7)).to_string(), "7");
        assert_eq!(CompanyId::from(RecordId::Text("acme".into())).as_str(), "acme");
    }

    #[test]
    fn parsed_ids_are_trimmed() {
        let id: DeviceId = " 42 ".parse().unwrap_or_else(|e| match e {});
        assert_eq!(id, DeviceId::new("42"));
    }
}
