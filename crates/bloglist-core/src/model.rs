//! Blog and user records as handed over by the record store.
//!
//! Relations between records are held as [`Ref`]s: either a bare
//! identifier or the related record expanded inline. The store decides
//! which one it hands out; the formatter renders both.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::id::ObjectId;

/// A record type that can sit on the far side of a [`Ref`].
pub trait Referent: DeserializeOwned {
    /// Field whose presence marks an inline (expanded) record of this type
    /// when the reference arrives as untyped JSON.
    const MARKER: &'static str;

    /// Identifier of the record.
    fn id(&self) -> ObjectId;
}

/// Reference to a related record.
#[derive(Debug, Clone, PartialEq)]
pub enum Ref<T> {
    /// Only the identifier is known.
    Id(ObjectId),
    /// The full record is embedded.
    Expanded(Box<T>),
}

impl<T: Referent> Ref<T> {
    /// Identifier of the referenced record, whichever form it is in.
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Id(id) => *id,
            Self::Expanded(record) => record.id(),
        }
    }

    /// Build a reference from untyped JSON.
    ///
    /// Strings are bare ids. Objects carrying [`Referent::MARKER`] are
    /// expanded records. Any other object is a bare reference read through
    /// its `id` (or `_id`) field.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::String(s) => s.parse().map(Self::Id).map_err(|e| format!("{e}")),
            Value::Object(map) if map.contains_key(T::MARKER) => {
                serde_json::from_value(Value::Object(map))
                    .map(|record| Self::Expanded(Box::new(record)))
                    .map_err(|e| e.to_string())
            }
            Value::Object(map) => match map.get("id").or_else(|| map.get("_id")) {
                Some(Value::String(s)) => s.parse().map(Self::Id).map_err(|e| format!("{e}")),
                _ => Err("reference carries no identifier".to_string()),
            },
            other => Err(format!("invalid reference: {other}")),
        }
    }
}

impl<T: Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => id.serialize(serializer),
            Self::Expanded(record) => record.serialize(serializer),
        }
    }
}

impl<'de, T: Referent> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

fn default_adult() -> bool {
    true
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    #[serde(alias = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    /// Owning user. Absent on blogs created without authentication.
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ref<UserRecord>>,
}

impl Referent for BlogRecord {
    const MARKER: &'static str = "url";

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: ObjectId,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_adult")]
    pub adult: bool,
    /// Blogs owned by this user, when the store loaded them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blogs: Option<Vec<Ref<BlogRecord>>>,
}

impl Referent for UserRecord {
    const MARKER: &'static str = "username";

    fn id(&self) -> ObjectId {
        self.id
    }
}
