use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

use crate::config::{Capabilities, OutputConfig};
use crate::error::ExportError;
use crate::metadata::{
    MetadataFamily, MetadataInput, MetadataRecord, embed_metadata, encode_metadata,
};
use crate::naming::{MAX_PADDING, batch_filename, next_filename};
use crate::raster::{PixelBuffer, encode_image};

/// Extensions accepted as CLI input images.
const INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Type tag attached to every [`ExportResult`].
const RESULT_TYPE: &str = "output";

/// The container format files are exported in.
///
/// Each format belongs to one [`MetadataFamily`], which decides how the
/// metadata record is embedded:
/// - **PNG** — text chunks, alpha kept
/// - **JPEG** — EXIF ImageDescription, alpha dropped
/// - **WebP** — EXIF ImageDescription, alpha kept, always lossless
///
/// # Example
///
/// ```rust
/// use meta_export::pipeline::OutputFormat;
/// use std::path::Path;
///
/// let format: OutputFormat = "JPEG".parse().unwrap();
/// assert_eq!(format, OutputFormat::Jpeg);
/// assert_eq!(format.extension(), "jpg");
///
/// assert_eq!(OutputFormat::from_path(Path::new("a.webp")), Some(OutputFormat::WebP));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Determine the format from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// File extension used for exported files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    pub fn family(&self) -> MetadataFamily {
        match self {
            Self::Png => MetadataFamily::TextChunks,
            Self::Jpeg | Self::WebP => MetadataFamily::ExifDescriptor,
        }
    }

    pub fn supports_alpha(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            other => anyhow::bail!("Unsupported output format: {other}"),
        }
    }
}

/// Where and how one batch is written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub format: OutputFormat,
    /// 1–100.
    pub quality: u8,
    /// Zero-padding width, 0–10.
    pub padding: usize,
    /// Replace existing files instead of skipping them.
    pub overwrite: bool,
}

impl ExportOptions {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&output.dir),
            prefix: output.prefix.clone(),
            format: output.format,
            quality: output.quality,
            padding: output.number_padding,
            overwrite: output.overwrite_existing,
        }
    }

    /// Reject options the exporter cannot honor.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ExportError::MissingOutputDir);
        }
        if self.prefix.is_empty() {
            return Err(ExportError::InvalidOption {
                name: "prefix",
                reason: "must not be empty".into(),
            });
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(ExportError::InvalidOption {
                name: "prefix",
                reason: format!("{:?} contains a path separator", self.prefix),
            });
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ExportError::InvalidOption {
                name: "quality",
                reason: format!("{} is outside 1..=100", self.quality),
            });
        }
        if self.padding > MAX_PADDING {
            return Err(ExportError::InvalidOption {
                name: "padding",
                reason: format!("{} is outside 0..={MAX_PADDING}", self.padding),
            });
        }
        Ok(())
    }
}

/// One export call: the batch, its metadata, and the options.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub images: &'a [PixelBuffer],
    pub metadata: MetadataInput,
    pub options: ExportOptions,
}

/// A file written by the exporter, described for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub filename: String,
    /// Always empty; files land directly in the output directory.
    pub subfolder: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ExportResult {
    fn saved(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            subfolder: String::new(),
            kind: RESULT_TYPE.to_string(),
        }
    }
}

/// What happened to one image of a batch.
#[derive(Debug)]
pub enum ImageOutcome {
    /// Written to disk.
    Saved(ExportResult),
    /// Target existed and overwriting is off. Not an error.
    Skipped(PathBuf),
    /// Encoding or writing failed. Aborts the rest of the batch.
    Failed { path: PathBuf, error: anyhow::Error },
}

/// The batch as it was passed in, plus the files written for it.
#[derive(Debug)]
pub struct ExportOutput<'a> {
    pub images: &'a [PixelBuffer],
    pub results: Vec<ExportResult>,
}

impl ExportOutput<'_> {
    /// `{"ui": {"images": [...]}}` for the caller's display layer.
    pub fn ui_json(&self) -> serde_json::Value {
        serde_json::json!({ "ui": { "images": self.results } })
    }
}

/// Writes batches of images with embedded metadata.
///
/// # Example
///
/// ```rust,no_run
/// use meta_export::config::Capabilities;
/// use meta_export::metadata::MetadataInput;
/// use meta_export::pipeline::{ExportOptions, ExportRequest, Exporter, OutputFormat};
/// use meta_export::raster::PixelBuffer;
///
/// # fn main() -> anyhow::Result<()> {
/// let exporter = Exporter::new(Capabilities::detect());
/// let images = vec![PixelBuffer::filled(64, 64, 3, 0.5)];
///
/// let request = ExportRequest {
///     images: &images,
///     metadata: MetadataInput {
///         source: "https://example.org/post/1".into(),
///         title: "Gray square".into(),
///         tags: "gray, square".into(),
///         ..Default::default()
///     },
///     options: ExportOptions {
///         output_dir: "./out".into(),
///         prefix: "image".into(),
///         format: OutputFormat::Png,
///         quality: 95,
///         padding: 5,
///         overwrite: false,
///     },
/// };
///
/// let output = exporter.export(&request)?;
/// for result in &output.results {
///     println!("Saved {}", result.filename);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    capabilities: Capabilities,
}

impl Exporter {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Export every image of the request, strictly in order.
    ///
    /// 1. **Validate** options; a missing output directory is fatal
    /// 2. **Create** the output directory (once, no retry)
    /// 3. **Name** each image: by position for multi-image batches,
    ///    by directory sequencing for a single image
    /// 4. **Skip** images whose target exists when overwriting is off
    /// 5. **Encode + write**; the first failure aborts the batch
    ///
    /// Files saved before a failure stay on disk. Skipped images are absent
    /// from the returned results.
    pub fn export<'a>(&self, request: &ExportRequest<'a>) -> Result<ExportOutput<'a>> {
        let options = &request.options;
        options.validate()?;
        create_directory(&options.output_dir)?;

        let record = MetadataRecord::from_input(&request.metadata);
        let total = request.images.len();
        let mut results = Vec::with_capacity(total);

        for (i, image) in request.images.iter().enumerate() {
            let filename = select_filename(options, i, total)?;
            log::debug!("[{}/{}] {filename}", i + 1, total);

            match self.export_image(image, &filename, &record, options) {
                ImageOutcome::Saved(result) => results.push(result),
                ImageOutcome::Skipped(_) => {}
                ImageOutcome::Failed { path, error } => {
                    log::error!("Failed to save image {}: {error:#}", path.display());
                    return Err(ExportError::Write { path, source: error }.into());
                }
            }
        }

        log::info!(
            "Done: {} saved, {} skipped out of {total} images",
            results.len(),
            total - results.len()
        );

        Ok(ExportOutput { images: request.images, results })
    }

    /// Carry one image through the overwrite check, encode, and write.
    pub fn export_image(
        &self,
        image: &PixelBuffer,
        filename: &str,
        record: &MetadataRecord,
        options: &ExportOptions,
    ) -> ImageOutcome {
        let path = options.output_dir.join(filename);

        if !options.overwrite && path.exists() {
            log::info!("{} already exists. Skipping...", path.display());
            return ImageOutcome::Skipped(path);
        }

        match self.persist(image, &path, record, options) {
            Ok(()) => {
                log::info!("Saved {}", path.display());
                ImageOutcome::Saved(ExportResult::saved(filename))
            }
            Err(error) => ImageOutcome::Failed { path, error },
        }
    }

    fn persist(
        &self,
        image: &PixelBuffer,
        path: &Path,
        record: &MetadataRecord,
        options: &ExportOptions,
    ) -> Result<()> {
        let payload = encode_metadata(record, options.format.family(), &self.capabilities)?;
        let img = image.to_dynamic()?;
        let encoded = encode_image(&img, options.format, options.quality)?;
        let bytes = embed_metadata(encoded, options.format, &payload)?;
        std::fs::write(path, bytes).context("Failed to write image file")?;
        Ok(())
    }
}

/// Positional names for multi-image batches, directory sequencing for one image.
fn select_filename(options: &ExportOptions, index: usize, total: usize) -> Result<String> {
    let ext = options.format.extension();
    if total > 1 {
        Ok(batch_filename(&options.prefix, index, options.padding, ext))
    } else {
        next_filename(&options.output_dir, &options.prefix, options.padding, ext)
    }
}

/// Create the output directory if it does not exist yet.
fn create_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    log::info!("Created directory {}", dir.display());
    Ok(())
}

/// Collect supported input images from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks) in file-name order, so the batch order is
/// stable between runs.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_input(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_input(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported input extension.
fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INPUT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode input files into a batch of normalized pixel buffers.
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<PixelBuffer>> {
    paths
        .iter()
        .map(|path| {
            let img = image::open(path)
                .with_context(|| format!("Failed to decode {}", path.display()))?;
            Ok(PixelBuffer::from_dynamic(&img))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions {
            output_dir: dir.to_path_buf(),
            prefix: "img".into(),
            format: OutputFormat::Png,
            quality: 95,
            padding: 3,
            overwrite: false,
        }
    }

    fn gray(n: usize) -> Vec<PixelBuffer> {
        (0..n).map(|_| PixelBuffer::filled(4, 4, 3, 0.5)).collect()
    }

    fn filenames(results: &[ExportResult]) -> Vec<&str> {
        results.iter().map(|r| r.filename.as_str()).collect()
    }

    // ── OutputFormat ─────────────────────────────────────────────────

    #[test]
    fn format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.png")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("a.jpeg")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("a.webp")), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_path(Path::new("a.tiff")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn format_families() {
        assert_eq!(OutputFormat::Png.family(), MetadataFamily::TextChunks);
        assert_eq!(OutputFormat::Jpeg.family(), MetadataFamily::ExifDescriptor);
        assert_eq!(OutputFormat::WebP.family(), MetadataFamily::ExifDescriptor);
        assert!(!OutputFormat::Jpeg.supports_alpha());
        assert!(OutputFormat::WebP.supports_alpha());
    }

    #[test]
    fn format_serde_names() {
        assert_eq!(serde_json::to_string(&OutputFormat::Jpeg).unwrap(), r#""jpg""#);
        assert_eq!(serde_json::to_string(&OutputFormat::WebP).unwrap(), r#""webp""#);
        let f: OutputFormat = serde_json::from_str(r#""jpeg""#).unwrap();
        assert_eq!(f, OutputFormat::Jpeg);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    // ── ExportOptions::validate ──────────────────────────────────────

    #[test]
    fn validate_rejects_bad_options() {
        let dir = TempDir::new().unwrap();

        let mut o = options(dir.path());
        o.output_dir = PathBuf::new();
        assert!(matches!(o.validate(), Err(ExportError::MissingOutputDir)));

        let mut o = options(dir.path());
        o.quality = 0;
        assert!(matches!(o.validate(), Err(ExportError::InvalidOption { name: "quality", .. })));

        let mut o = options(dir.path());
        o.padding = 11;
        assert!(matches!(o.validate(), Err(ExportError::InvalidOption { name: "padding", .. })));

        let mut o = options(dir.path());
        o.prefix = "../escape".into();
        assert!(matches!(o.validate(), Err(ExportError::InvalidOption { name: "prefix", .. })));

        assert!(options(dir.path()).validate().is_ok());
    }

    #[test]
    fn options_from_config() {
        let config = OutputConfig {
            dir: "/out".into(),
            ..Default::default()
        };
        let o = ExportOptions::from_config(&config);
        assert_eq!(o.output_dir, PathBuf::from("/out"));
        assert_eq!(o.prefix, "image");
        assert_eq!(o.padding, 5);
        assert!(!o.overwrite);
    }

    // ── Exporter::export ─────────────────────────────────────────────

    #[test]
    fn missing_output_dir_fails_before_any_work() {
        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(1);
        let mut o = options(Path::new("unused"));
        o.output_dir = PathBuf::new();
        let request = ExportRequest { images: &images, metadata: MetadataInput::default(), options: o };

        let err = exporter.export(&request).unwrap_err();
        assert!(matches!(err.downcast_ref::<ExportError>(), Some(ExportError::MissingOutputDir)));
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(1);
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(&nested),
        };

        let output = exporter.export(&request).unwrap();
        assert_eq!(filenames(&output.results), ["img_001.png"]);
        assert!(nested.join("img_001.png").is_file());
    }

    #[test]
    fn directory_creation_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(1);
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(&blocker.join("sub")),
        };

        let err = exporter.export(&request).unwrap_err();
        assert!(matches!(err.downcast_ref::<ExportError>(), Some(ExportError::CreateDir { .. })));
    }

    #[test]
    fn batch_names_ignore_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img_007.png"), b"x").unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(3);
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(dir.path()),
        };

        let output = exporter.export(&request).unwrap();
        assert_eq!(filenames(&output.results), ["img_001.png", "img_002.png", "img_003.png"]);
        assert_eq!(output.images.len(), 3);
        for r in &output.results {
            assert_eq!(r.subfolder, "");
            assert_eq!(r.kind, "output");
        }
    }

    #[test]
    fn single_image_uses_directory_sequencing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img_007.png"), b"x").unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(1);
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(dir.path()),
        };

        let output = exporter.export(&request).unwrap();
        assert_eq!(filenames(&output.results), ["img_008.png"]);
    }

    #[test]
    fn existing_target_is_skipped_without_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img_002.png"), b"keep").unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(3);
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(dir.path()),
        };

        let output = exporter.export(&request).unwrap();
        assert_eq!(filenames(&output.results), ["img_001.png", "img_003.png"]);
        assert_eq!(fs::read(dir.path().join("img_002.png")).unwrap(), b"keep");
    }

    #[test]
    fn overwrite_replaces_existing_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img_002.png"), b"old").unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(2);
        let mut o = options(dir.path());
        o.overwrite = true;
        let request = ExportRequest { images: &images, metadata: MetadataInput::default(), options: o };

        let output = exporter.export(&request).unwrap();
        assert_eq!(output.results.len(), 2);
        assert_ne!(fs::read(dir.path().join("img_002.png")).unwrap(), b"old");
    }

    #[test]
    fn failure_aborts_remaining_images_and_keeps_earlier_ones() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(Capabilities::detect());
        let images = vec![
            PixelBuffer::filled(4, 4, 3, 0.5),
            PixelBuffer::filled(4, 4, 2, 0.5), // unsupported channel count
            PixelBuffer::filled(4, 4, 3, 0.5),
        ];
        let request = ExportRequest {
            images: &images,
            metadata: MetadataInput::default(),
            options: options(dir.path()),
        };

        let err = exporter.export(&request).unwrap_err();
        match err.downcast_ref::<ExportError>() {
            Some(ExportError::Write { path, .. }) => assert!(path.ends_with("img_002.png")),
            other => panic!("expected write error, got {other:?}"),
        }
        assert!(dir.path().join("img_001.png").is_file());
        assert!(!dir.path().join("img_002.png").exists());
        assert!(!dir.path().join("img_003.png").exists());
    }

    // ── Exporter::export_image ───────────────────────────────────────

    #[cfg(feature = "exif")]
    #[test]
    fn jpeg_metadata_too_large_for_app1_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(Capabilities::detect());
        let images = gray(1);
        let metadata = MetadataInput {
            tags: "tag_x ".repeat(14_000),
            ..Default::default()
        };

        let mut o = options(dir.path());
        o.format = OutputFormat::Jpeg;
        let request = ExportRequest { images: &images, metadata: metadata.clone(), options: o };
        let err = exporter.export(&request).unwrap_err();
        assert!(matches!(err.downcast_ref::<ExportError>(), Some(ExportError::Write { .. })));
        assert!(!dir.path().join("img_001.jpg").exists());

        let mut o = options(dir.path());
        o.format = OutputFormat::WebP;
        let request = ExportRequest { images: &images, metadata, options: o };
        let output = exporter.export(&request).unwrap();
        assert_eq!(filenames(&output.results), ["img_001.webp"]);
    }

    #[test]
    fn exporter_keeps_its_capabilities() {
        let exporter = Exporter::new(Capabilities { exif_encoder: false });
        assert!(!exporter.capabilities().exif_encoder);
        assert!(!exporter.capabilities().available_formats().is_empty());
    }

    #[test]
    fn outcome_saved_then_skipped() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(Capabilities::detect());
        let image = PixelBuffer::filled(2, 2, 3, 1.0);
        let record = MetadataRecord::default();
        let o = options(dir.path());

        let first = exporter.export_image(&image, "one.png", &record, &o);
        assert!(matches!(first, ImageOutcome::Saved(ref r) if r.filename == "one.png"));

        let second = exporter.export_image(&image, "one.png", &record, &o);
        assert!(matches!(second, ImageOutcome::Skipped(ref p) if p.ends_with("one.png")));
    }

    #[test]
    fn outcome_failed_when_target_is_a_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("taken.png")).unwrap();

        let exporter = Exporter::new(Capabilities::detect());
        let mut o = options(dir.path());
        o.overwrite = true;
        let outcome = exporter.export_image(
            &PixelBuffer::filled(2, 2, 3, 1.0),
            "taken.png",
            &MetadataRecord::default(),
            &o,
        );
        assert!(matches!(outcome, ImageOutcome::Failed { .. }));
    }

    #[test]
    fn ui_json_shape() {
        let output = ExportOutput {
            images: &[],
            results: vec![ExportResult::saved("a.png")],
        };
        assert_eq!(
            output.ui_json(),
            serde_json::json!({"ui": {"images": [{"filename": "a.png", "subfolder": "", "type": "output"}]}})
        );
    }

    // ── collect_images / load_images ─────────────────────────────────

    #[test]
    fn collect_images_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        fs::write(sub.join("c.webp"), b"x").unwrap();
        fs::write(sub.join("d.txt"), b"x").unwrap();

        let images = collect_images(&[dir.path().to_path_buf()]);
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a.JPG", "b.png", "c.webp"]);
    }

    #[test]
    fn collect_images_skips_missing_and_unsupported() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("readme.txt");
        fs::write(&txt, b"hello").unwrap();
        assert!(collect_images(&[txt, PathBuf::from("/nonexistent/path")]).is_empty());
    }

    #[test]
    fn load_images_decodes_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([255, 0, 0])).save(&path).unwrap();

        let batch = load_images(&[path]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!((batch[0].width, batch[0].height, batch[0].channels), (3, 2, 3));
        assert_eq!(&batch[0].data[..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn load_images_reports_undecodable_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        assert!(load_images(&[path]).is_err());
    }
}
