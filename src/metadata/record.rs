use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tags::normalize_tags;

/// Raw metadata strings as supplied by the caller, before normalization.
///
/// `character` is an arbitrary JSON value because hosts do not always
/// guarantee a string there; anything other than a string becomes empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataInput {
    pub source: String,
    pub title: String,
    /// Primary tag string (comma- or space-separated).
    pub tags: String,
    pub pixiv_tags: Option<String>,
    pub danbooru_tags: Option<String>,
    pub character: Option<Value>,
}

/// The provenance record embedded into every image of a batch.
///
/// Every field is always present; optional inputs that were not supplied are
/// empty strings, so the JSON form has a stable schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(rename = "Source")]
    pub source: String,
    pub title: String,
    /// Normalized primary tag string.
    #[serde(rename = "tagsfor34")]
    pub tags: String,
    #[serde(rename = "tagsforpixiv")]
    pub pixiv_tags: String,
    #[serde(rename = "tagsfordanbooru")]
    pub danbooru_tags: String,
    pub character: String,
}

impl MetadataRecord {
    /// Reserved text-chunk keyword holding the full JSON record.
    pub const JSON_KEY: &'static str = "metadata";

    /// Every declared field key, in serialization order.
    pub const FIELDS: [&'static str; 6] = [
        "Source",
        "title",
        "tagsfor34",
        "tagsforpixiv",
        "tagsfordanbooru",
        "character",
    ];

    /// Build the record for one export request.
    pub fn from_input(input: &MetadataInput) -> Self {
        Self {
            source: input.source.clone(),
            title: input.title.clone(),
            tags: normalize_tags(&input.tags),
            pixiv_tags: normalize_tags(input.pixiv_tags.as_deref().unwrap_or_default()),
            danbooru_tags: normalize_tags(input.danbooru_tags.as_deref().unwrap_or_default()),
            character: match &input.character {
                Some(Value::String(s)) => s.clone(),
                _ => String::new(),
            },
        }
    }

    /// The text entries written individually alongside the JSON aggregate.
    pub fn salient_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("Source", self.source.as_str()),
            ("title", self.title.as_str()),
            ("tagsfor34", self.tags.as_str()),
        ]
    }

    /// Serialize as a JSON object (UTF-8, non-ASCII kept as-is).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
