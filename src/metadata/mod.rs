//! Provenance metadata: the record, its per-format encoding, and reading it back.
//!
//! - [`MetadataRecord`] — the fixed-schema record shared by every image of a batch
//! - [`encode_metadata`] / [`embed_metadata`] — build the payload for a format family and
//!   splice it into encoded image bytes
//! - [`read_embedded`] — recover the record from an exported file
//!
//! PNG gets one text chunk per salient field plus the full JSON record under
//! `metadata`. JPEG and WebP carry the JSON record in EXIF ImageDescription.

mod reader;
mod record;
mod writer;

pub use reader::{read_embedded, read_text_chunks};
pub use record::{MetadataInput, MetadataRecord};
pub use writer::{EmbeddedPayload, MetadataFamily, TextEntry, embed_metadata, encode_metadata};
