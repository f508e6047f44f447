use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, ImageReader};
use tracing::debug;

use crate::state::ImageFile;

/// Displayable form of a selected image. Dimensions are only known for
/// formats the decoder understands.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub data_uri: String,
    pub mime: &'static str,
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const FALLBACK_MIME: &str = "application/octet-stream";

/// Sniffs the bytes first, then the file name.
fn guess_mime(name: &str, format: Option<ImageFormat>) -> &'static str {
    if let Some(format) = format {
        return format.to_mime_type();
    }
    let is_svg = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        "image/svg+xml"
    } else {
        FALLBACK_MIME
    }
}

/// Encodes raw bytes as a `data:` URI. Any bytes produce a preview.
pub fn encode_preview(name: &str, bytes: &[u8]) -> Preview {
    let format = image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(name).ok());
    let dimensions = format.and_then(|format| {
        ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .ok()
    });
    let mime = guess_mime(name, format);

    Preview {
        data_uri: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        mime,
        dimensions,
    }
}

pub fn read_preview(image: &ImageFile) -> Result<Preview, DecodeError> {
    let bytes = fs::read(&image.path).map_err(|source| DecodeError::Io {
        path: image.path.clone(),
        source,
    })?;
    Ok(encode_preview(&image.name, &bytes))
}

/// Outcome of one background read, tagged with the generation it was started under.
#[derive(Debug)]
pub struct PreviewMessage {
    generation: u64,
    result: Result<Preview, DecodeError>,
}

impl PreviewMessage {
    pub(crate) fn new(generation: u64, result: Result<Preview, DecodeError>) -> Self {
        Self { generation, result }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_result(self) -> Result<Preview, DecodeError> {
        self.result
    }
}

/// Reads images on worker threads. Only results from the latest generation are current.
pub struct PreviewLoader {
    generation: u64,
    tx: Sender<PreviewMessage>,
    rx: Receiver<PreviewMessage>,
}

impl Default for PreviewLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, message: &PreviewMessage) -> bool {
        message.generation == self.generation
    }

    /// Starts reading `image` in the background and makes it the current intent.
    pub fn load(&mut self, image: &ImageFile) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let image = image.clone();
        let tx = self.tx.clone();
        debug!(generation, name = %image.name, "starting preview read");
        thread::spawn(move || {
            let result = read_preview(&image);
            // Receiver gone means the session ended.
            let _ = tx.send(PreviewMessage::new(generation, result));
        });
        generation
    }

    /// Makes every in-flight read stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn try_next(&self) -> Option<PreviewMessage> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn wait_next(&self, timeout: std::time::Duration) -> Option<PreviewMessage> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::RgbImage;
    use std::path::Path;
    use std::time::Duration;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> ImageFile {
        let path = dir.join(name);
        fs::write(&path, png_bytes(width, height)).unwrap();
        ImageFile::from_path(path)
    }

    /// Smallest valid 24-bit BMP: one white pixel.
    fn bmp_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"BM");
        bytes.extend_from_slice(&58u32.to_le_bytes()); // file size
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&54u32.to_le_bytes()); // pixel offset
        bytes.extend_from_slice(&40u32.to_le_bytes()); // info header size
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&24u16.to_le_bytes());
        bytes.extend_from_slice(&[0; 24]);
        bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0x00]);
        bytes
    }

    #[test]
    fn encodes_png_as_data_uri() {
        let bytes = png_bytes(2, 3);
        let preview = encode_preview("house.png", &bytes);
        assert_eq!(preview.mime, "image/png");
        assert_eq!(preview.dimensions, Some((2, 3)));
        assert_eq!(
            preview.data_uri,
            format!("data:image/png;base64,{}", STANDARD.encode(&bytes))
        );
    }

    #[test]
    fn bmp_gets_a_preview_even_without_a_decoder() {
        let bytes = bmp_bytes();
        let preview = encode_preview("house.bmp", &bytes);
        assert_eq!(preview.mime, "image/bmp");
        assert_eq!(
            preview.data_uri,
            format!("data:image/bmp;base64,{}", STANDARD.encode(&bytes))
        );
    }

    #[test]
    fn svg_is_typed_from_its_extension() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
        let preview = encode_preview("house.SVG", svg);
        assert_eq!(preview.mime, "image/svg+xml");
        assert_eq!(preview.dimensions, None);
        assert!(preview.data_uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn unknown_bytes_fall_back_to_octet_stream() {
        let preview = encode_preview("notes", b"just some text");
        assert_eq!(preview.mime, "application/octet-stream");
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn truncated_image_keeps_its_type_but_loses_dimensions() {
        let bytes = png_bytes(4, 4);
        let preview = encode_preview("cut.png", &bytes[..12]);
        assert_eq!(preview.mime, "image/png");
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = ImageFile::from_path(dir.path().join("gone.png"));
        let err = read_preview(&image).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[test]
    fn background_load_reports_its_generation() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "a.png", 5, 1);
        let mut loader = PreviewLoader::new();

        let generation = loader.load(&image);
        assert_eq!(generation, loader.current_generation());

        let message = loader.wait_next(Duration::from_secs(5)).unwrap();
        assert!(loader.is_current(&message));
        let preview = message.into_result().unwrap();
        assert_eq!(preview.dimensions, Some((5, 1)));
    }

    #[test]
    fn invalidate_makes_pending_reads_stale() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "a.png", 1, 1);
        let mut loader = PreviewLoader::new();

        loader.load(&image);
        loader.invalidate();

        let message = loader.wait_next(Duration::from_secs(5)).unwrap();
        assert!(!loader.is_current(&message));
    }
}
