use anyhow::{Context, Result};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use std::path::Path;

use super::record::MetadataRecord;
use super::writer::{CHUNK_ITXT, CHUNK_TEXT, MetadataFamily, TextEntry};
use crate::pipeline::OutputFormat;

const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;

/// Read the metadata record embedded in an exported image.
///
/// Returns `Ok(None)` when the file carries no record (for example a JPEG
/// written without the EXIF encoder).
pub fn read_embedded(path: &Path) -> Result<Option<MetadataRecord>> {
    let format = OutputFormat::from_path(path)
        .with_context(|| format!("Unsupported image format: {}", path.display()))?;
    let bytes = std::fs::read(path).context("Failed to read image file")?;

    let json = match format.family() {
        MetadataFamily::TextChunks => parse_text_chunks(bytes)?
            .into_iter()
            .find(|e| e.keyword == MetadataRecord::JSON_KEY)
            .map(|e| e.text),
        MetadataFamily::ExifDescriptor => match exif_tiff(bytes, format)? {
            Some(tiff) => image_description(&tiff)?,
            None => None,
        },
    };

    match json {
        Some(json) => {
            let record = MetadataRecord::from_json(&json)
                .context("Embedded metadata is not a valid record")?;
            Ok(Some(record))
        }
        None => {
            log::debug!("No embedded metadata in {}", path.display());
            Ok(None)
        }
    }
}

/// List the text entries (tEXt and uncompressed iTXt) of a PNG file.
pub fn read_text_chunks(path: &Path) -> Result<Vec<TextEntry>> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    parse_text_chunks(bytes)
}

fn parse_text_chunks(bytes: Vec<u8>) -> Result<Vec<TextEntry>> {
    let png = Png::from_bytes(Bytes::from(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))?;

    let mut entries = Vec::new();
    for chunk in png.chunks() {
        let entry = match chunk.kind() {
            CHUNK_TEXT => parse_text(chunk.contents()),
            CHUNK_ITXT => parse_itxt(chunk.contents()),
            _ => continue,
        };
        match entry {
            Some(entry) => entries.push(entry),
            None => log::debug!("Skipping unreadable text chunk"),
        }
    }
    Ok(entries)
}

/// `keyword \0 text`, both Latin-1.
fn parse_text(contents: &[u8]) -> Option<TextEntry> {
    let nul = contents.iter().position(|&b| b == 0)?;
    Some(TextEntry::new(
        decode_latin1(&contents[..nul]),
        decode_latin1(&contents[nul + 1..]),
    ))
}

/// `keyword \0 flag method lang \0 translated \0 text`; compressed entries are skipped.
fn parse_itxt(contents: &[u8]) -> Option<TextEntry> {
    let nul = contents.iter().position(|&b| b == 0)?;
    let keyword = decode_latin1(&contents[..nul]);
    let rest = contents.get(nul + 1..)?;
    let (&compressed, rest) = rest.split_first()?;
    if compressed != 0 {
        return None;
    }
    let rest = rest.get(1..)?; // compression method
    let lang_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[lang_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = std::str::from_utf8(&rest[translated_end + 1..]).ok()?;
    Some(TextEntry::new(keyword, text))
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Raw EXIF (TIFF) data of a JPEG or WebP file, if any.
fn exif_tiff(bytes: Vec<u8>, format: OutputFormat) -> Result<Option<Bytes>> {
    let bytes = Bytes::from(bytes);
    let exif = match format {
        OutputFormat::Jpeg => Jpeg::from_bytes(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?
            .exif(),
        OutputFormat::WebP => WebP::from_bytes(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to parse WebP: {e}"))?
            .exif(),
        OutputFormat::Png => None,
    };
    Ok(exif)
}

/// Read IFD0 ImageDescription from TIFF data.
fn image_description(tiff: &[u8]) -> Result<Option<String>> {
    if tiff.len() < 8 {
        anyhow::bail!("EXIF data too short");
    }

    let big_endian = match &tiff[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => anyhow::bail!("Invalid TIFF byte order"),
    };

    let read_u16 = |offset: usize| -> Result<u16> {
        let b = tiff.get(offset..offset + 2).context("EXIF offset out of bounds")?;
        Ok(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };
    let read_u32 = |offset: usize| -> Result<u32> {
        let b = tiff.get(offset..offset + 4).context("EXIF offset out of bounds")?;
        Ok(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    let ifd0_offset = read_u32(4)? as usize;
    let ifd0_count = read_u16(ifd0_offset)? as usize;

    for i in 0..ifd0_count {
        let entry = ifd0_offset + 2 + i * 12;
        if read_u16(entry)? != TAG_IMAGE_DESCRIPTION {
            continue;
        }
        let count = read_u32(entry + 4)? as usize;
        let start = if count <= 4 {
            entry + 8
        } else {
            read_u32(entry + 8)? as usize
        };
        let raw = tiff
            .get(start..start + count)
            .context("ImageDescription extends beyond EXIF data")?;
        let raw = match raw.iter().position(|&b| b == 0) {
            Some(end) => &raw[..end],
            None => raw,
        };
        let text = String::from_utf8(raw.to_vec()).context("ImageDescription is not UTF-8")?;
        return Ok(Some(text));
    }

    Ok(None)
}
