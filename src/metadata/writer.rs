use anyhow::{Context, Result};
use std::borrow::Cow;
use img_parts::jpeg::Jpeg;
use img_parts::png::{Png, PngChunk};
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};

use super::record::MetadataRecord;
use crate::config::Capabilities;
use crate::pipeline::OutputFormat;

pub(crate) const CHUNK_TEXT: [u8; 4] = *b"tEXt";
pub(crate) const CHUNK_ITXT: [u8; 4] = *b"iTXt";

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data (after Exif\0\0)
#[cfg(feature = "exif")]
const JPEG_EXIF_OVERHEAD: usize = 10; // 2 + 2 + 6

// APP1 length field counts itself (2) and Exif\0\0 (6) on top of the TIFF data
const APP1_LENGTH_OVERHEAD: usize = 8;

/// How a container format carries embedded metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFamily {
    /// Arbitrary named text chunks (PNG tEXt/iTXt).
    TextChunks,
    /// A single EXIF ImageDescription field holding the JSON record (JPEG, WebP).
    ExifDescriptor,
}

/// One named text entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

impl TextEntry {
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), text: text.into() }
    }
}

/// Metadata ready to be spliced into an encoded image.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedPayload {
    /// Text chunks: one per salient field, then the JSON record.
    TextChunks(Vec<TextEntry>),
    /// TIFF-structured EXIF data whose IFD0 ImageDescription is the JSON record.
    ExifDescriptor(Vec<u8>),
    /// No encoder available; the image is written without metadata.
    Unembedded,
}

/// Build the embeddable payload for `record` in the given family.
///
/// When the EXIF encoder is not available the payload is
/// [`EmbeddedPayload::Unembedded`] and a warning is logged; that is not an error.
pub fn encode_metadata(
    record: &MetadataRecord,
    family: MetadataFamily,
    capabilities: &Capabilities,
) -> Result<EmbeddedPayload> {
    let json = record.to_json().context("Failed to serialize metadata record")?;

    match family {
        MetadataFamily::TextChunks => {
            let mut entries: Vec<TextEntry> = record
                .salient_fields()
                .iter()
                .map(|(key, value)| TextEntry::new(*key, *value))
                .collect();
            entries.push(TextEntry::new(MetadataRecord::JSON_KEY, json));
            Ok(EmbeddedPayload::TextChunks(entries))
        }
        MetadataFamily::ExifDescriptor => {
            if !capabilities.exif_encoder {
                log::warn!("EXIF encoder unavailable; image will be saved without embedded metadata");
                return Ok(EmbeddedPayload::Unembedded);
            }
            let tiff = build_exif_descriptor(&json)?;
            log::debug!("  EXIF descriptor: {} bytes", tiff.len());
            Ok(EmbeddedPayload::ExifDescriptor(tiff))
        }
    }
}

/// Splice `payload` into an already encoded image of `format`.
pub fn embed_metadata(
    encoded: Vec<u8>,
    format: OutputFormat,
    payload: &EmbeddedPayload,
) -> Result<Vec<u8>> {
    match (payload, format) {
        (EmbeddedPayload::Unembedded, _) => Ok(encoded),
        (EmbeddedPayload::TextChunks(entries), OutputFormat::Png) => {
            embed_png_text(encoded, entries)
        }
        (EmbeddedPayload::ExifDescriptor(tiff), OutputFormat::Jpeg) => {
            embed_jpeg_exif(encoded, tiff)
        }
        (EmbeddedPayload::ExifDescriptor(tiff), OutputFormat::WebP) => {
            let mut webp = WebP::from_bytes(Bytes::from(encoded))
                .map_err(|e| anyhow::anyhow!("Failed to parse WebP: {e}"))?;
            webp.set_exif(Some(Bytes::from(tiff.clone())));
            Ok(webp.encoder().bytes().to_vec())
        }
        (payload, format) => anyhow::bail!(
            "{} payload cannot be embedded into {format:?}",
            match payload {
                EmbeddedPayload::TextChunks(_) => "text-chunk",
                _ => "EXIF",
            }
        ),
    }
}

// ============================================================================
// PNG text chunks
// ============================================================================

/// Insert text chunks right after IHDR, in entry order.
fn embed_png_text(encoded: Vec<u8>, entries: &[TextEntry]) -> Result<Vec<u8>> {
    let mut png = Png::from_bytes(Bytes::from(encoded))
        .map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))?;

    let chunks = png.chunks_mut();
    let mut insert_pos = chunks.len().min(1);
    for entry in entries {
        chunks.insert(insert_pos, text_chunk(&entry.keyword, &entry.text)?);
        insert_pos += 1;
    }

    Ok(png.encoder().bytes().to_vec())
}

/// tEXt when the text is Latin-1 representable, uncompressed iTXt otherwise.
///
/// NUL is not allowed in either chunk's text and is dropped. The JSON entry
/// never carries a raw NUL since serde escapes control characters.
fn text_chunk(keyword: &str, text: &str) -> Result<PngChunk> {
    if keyword.is_empty() || keyword.len() > 79 || !keyword.is_ascii() {
        anyhow::bail!("Invalid PNG text keyword {keyword:?}");
    }
    let text: Cow<'_, str> = if text.contains('\0') {
        Cow::Owned(text.replace('\0', ""))
    } else {
        Cow::Borrowed(text)
    };
    let text = text.as_ref();

    if let Some(latin1) = encode_latin1(text) {
        let mut contents = Vec::with_capacity(keyword.len() + 1 + latin1.len());
        contents.extend_from_slice(keyword.as_bytes());
        contents.push(0);
        contents.extend_from_slice(&latin1);
        return Ok(PngChunk::new(CHUNK_TEXT, Bytes::from(contents)));
    }

    let mut contents = Vec::with_capacity(keyword.len() + 5 + text.len());
    contents.extend_from_slice(keyword.as_bytes());
    contents.push(0); // keyword terminator
    contents.push(0); // compression flag: uncompressed
    contents.push(0); // compression method
    contents.push(0); // empty language tag
    contents.push(0); // empty translated keyword
    contents.extend_from_slice(text.as_bytes());
    Ok(PngChunk::new(CHUNK_ITXT, Bytes::from(contents)))
}

fn encode_latin1(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

// ============================================================================
// EXIF descriptor
// ============================================================================

#[cfg(feature = "exif")]
fn build_exif_descriptor(json: &str) -> Result<Vec<u8>> {
    use little_exif::exif_tag::ExifTag;
    use little_exif::filetype::FileExtension;
    use little_exif::metadata::Metadata;

    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::ImageDescription(json.to_string()));

    let exif_bytes = metadata.as_u8_vec(FileExtension::JPEG);
    if exif_bytes.len() <= JPEG_EXIF_OVERHEAD || &exif_bytes[4..JPEG_EXIF_OVERHEAD] != b"Exif\0\0" {
        anyhow::bail!("EXIF encoder returned an unexpected segment layout");
    }
    Ok(exif_bytes[JPEG_EXIF_OVERHEAD..].to_vec())
}

#[cfg(not(feature = "exif"))]
fn build_exif_descriptor(_json: &str) -> Result<Vec<u8>> {
    anyhow::bail!("EXIF encoder not compiled in (enable the `exif` feature)")
}

/// Write the EXIF APP1 segment into a JPEG, directly after APP0.
fn embed_jpeg_exif(encoded: Vec<u8>, tiff: &[u8]) -> Result<Vec<u8>> {
    let segment_len = tiff.len() + APP1_LENGTH_OVERHEAD;
    if segment_len > usize::from(u16::MAX) {
        anyhow::bail!(
            "EXIF metadata is {segment_len} bytes; a JPEG APP1 segment holds at most {}",
            u16::MAX
        );
    }

    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    jpeg.set_exif(Some(Bytes::copy_from_slice(tiff)));

    // set_exif() inserts at position 3; EXIF parsers expect it right after APP0.
    if let Some(pos) = find_exif_segment_pos(&jpeg) {
        let target_pos = 1;
        if target_pos < pos {
            let segments = jpeg.segments_mut();
            let seg = segments.remove(pos);
            segments.insert(target_pos, seg);
        }
    }

    Ok(jpeg.encoder().bytes().to_vec())
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    const EXIF_PREFIX: &[u8] = b"Exif\0\0";
    jpeg.segments().iter().position(|s| {
        s.marker() == 0xE1 && s.contents().starts_with(EXIF_PREFIX)
    })
}
