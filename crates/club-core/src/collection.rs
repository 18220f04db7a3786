//! # Lenient List Decoding
//!
//! List responses from the backend (tiers, vouchers, redemption history)
//! are decoded through [`Listing`], which never fails.
//!
//! ## Decoding Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON received                 Listing produced                         │
//! │  ─────────────                 ────────────────                         │
//! │  [a, b, c]                     items = [a, b, c]         issue = None   │
//! │  [a, <garbage>, c]             items = [a, c]            MalformedEntries│
//! │  {"error": ...} / null / 42    items = []                NotAList       │
//! │  <html>... (not JSON at all)   items = []                NotAList       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The screen renders whatever decoded and shows `issue()` as a banner, so a
//! bad payload degrades to an empty table instead of a crash.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::DataShapeError;

/// A decoded list plus whatever went wrong while decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    items: Vec<T>,
    issue: Option<DataShapeError>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Listing {
            items: Vec::new(),
            issue: None,
        }
    }
}

impl<T> Listing<T> {
    /// A well-formed listing.
    pub fn from_items(items: Vec<T>) -> Self {
        Listing { items, issue: None }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The data-shape problem to surface, if any.
    pub fn issue(&self) -> Option<&DataShapeError> {
        self.issue.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: DeserializeOwned> Listing<T> {
    /// Decodes any JSON value. See the module docs for the rules.
    ///
    /// ## Example
    /// ```rust
    /// use club_core::collection::Listing;
    /// use club_core::types::Voucher;
    /// use serde_json::json;
    ///
    /// let listing: Listing<Voucher> = Listing::from_value(json!({"message": "oops"}));
    /// assert!(listing.is_empty());
    /// assert!(listing.issue().is_some());
    /// ```
    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Array(entries) => entries,
            other => {
                return Listing {
                    items: Vec::new(),
                    issue: Some(DataShapeError::NotAList {
                        found: json_kind(&other),
                    }),
                }
            }
        };

        let total = entries.len();
        let items: Vec<T> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        let skipped = total - items.len();
        let issue = (skipped > 0).then_some(DataShapeError::MalformedEntries { skipped, total });

        Listing { items, issue }
    }
}

impl<T: DeserializeOwned> Listing<T> {
    /// Decodes a raw response body. Empty bodies count as `null`, bodies that
    /// are not JSON at all give an empty listing flagged as `NotAList`.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::from_value(Value::Null);
        }
        match serde_json::from_str(body) {
            Ok(value) => Self::from_value(value),
            Err(_) => Listing {
                items: Vec::new(),
                issue: Some(DataShapeError::NotAList {
                    found: "a non-JSON body",
                }),
            },
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Listing<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Listing::from_value(value))
    }
}

impl<T: Serialize> Serialize for Listing<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.items.serialize(serializer)
    }
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Listing::from_items(items)
    }
}

/// JSON type name for the banner message.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
