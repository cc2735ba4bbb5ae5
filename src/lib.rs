//! # meta-export
//!
//! Batch image exporter that writes each image under a collision-free name and
//! embeds a provenance record (source, title, tags, platform fields) using the
//! metadata facility native to the chosen container.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meta_export::config::{Capabilities, Config};
//! use meta_export::metadata::MetadataInput;
//! use meta_export::pipeline::{ExportOptions, ExportRequest, Exporter};
//! use meta_export::raster::PixelBuffer;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Defaults for directory, prefix, format, quality, padding, overwrite
//!     let mut config = Config::load(Some("config.json".as_ref()))?;
//!     config.output.dir = "./exports".into();
//!
//!     // Resolve optional encoders once
//!     let exporter = Exporter::new(Capabilities::detect());
//!
//!     let images = vec![PixelBuffer::filled(512, 512, 3, 0.5)];
//!     let request = ExportRequest {
//!         images: &images,
//!         metadata: MetadataInput {
//!             source: "https://example.org/post/42".into(),
//!             title: "Gray".into(),
//!             tags: r"1girl, makima_\(chainsaw_man\)".into(),
//!             ..Default::default()
//!         },
//!         options: ExportOptions::from_config(&config.output),
//!     };
//!
//!     let output = exporter.export(&request)?;
//!     println!("{}", output.ui_json());
//!     Ok(())
//! }
//! ```
//!
//! ## Reading Metadata Back
//!
//! ```rust,no_run
//! use meta_export::metadata::read_embedded;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! if let Some(record) = read_embedded(Path::new("exports/image_00001.png"))? {
//!     println!("Tags: {}", record.tags);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Metadata | Alpha | Quality |
//! |--------|----------|-------|---------|
//! | PNG (`.png`) | tEXt/iTXt chunks + JSON under `metadata` | kept | inverse compression effort |
//! | JPEG (`.jpg`) | JSON in EXIF ImageDescription | dropped | encoder quality |
//! | WebP (`.webp`) | JSON in EXIF ImageDescription | kept | always lossless |
//!
//! JPEG/WebP metadata needs the `exif` feature (on by default). Without it those
//! files are still written, just without the record.
//!
//! ## Modules
//!
//! - [`pipeline`] — output formats, the batch exporter, input collection
//! - [`metadata`] — the metadata record, per-format encoding, reading it back
//! - [`naming`] — collision-free filename sequencing
//! - [`tags`] — tag string normalization
//! - [`raster`] — pixel buffers and the image codec call
//! - [`config`] — configuration loading/saving and build capabilities
//! - [`error`] — fatal error kinds

pub mod config;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod raster;
pub mod tags;
