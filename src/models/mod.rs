pub mod conversation;
pub mod item;
pub mod message;
pub mod query;

use serde::{Deserialize, Deserializer};

/// Read an optional string field, mapping `null` to an empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
