//! Output artifacts: clipboard CSS text and a downloadable PNG.
//!
//! Both are one-way. Nothing here reads an artifact back.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tempfile::NamedTempFile;

use crate::css::preview_css;
use crate::descriptor::Gradient;
use crate::raster::PixelBuffer;

/// Filename suggested for image downloads.
pub const DOWNLOAD_FILENAME: &str = "gradient.png";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Encoded image bytes plus the name they should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl Download {
    /// Writes the bytes to `dir/<filename>` and returns the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        self.write_as(&path)?;
        Ok(path)
    }

    /// Writes the bytes to an explicit path, creating parent directories.
    ///
    /// The bytes go to a temporary sibling that is renamed over `path` once
    /// complete; a failed write leaves no file behind.
    pub fn write_as(&self, path: &Path) -> Result<(), ExportError> {
        let io_err = |source: std::io::Error| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err)?;

        let mut staged = NamedTempFile::new_in(parent).map_err(io_err)?;
        staged.write_all(&self.bytes).map_err(io_err)?;
        staged.persist(path).map_err(|err| io_err(err.error))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "wrote gradient image");
        Ok(())
    }
}

/// CSS declaration block for the clipboard.
///
/// Always a `background:` line; a `filter: blur(..)` line follows when the
/// gradient carries a positive blur.
pub fn clipboard_css(gradient: &Gradient) -> String {
    let mut css = format!("background: {};", preview_css(gradient));
    if let Some(blur) = gradient.atmosphere().map(|a| a.blur).filter(|b| *b > 0.0) {
        css.push_str(&format!("\nfilter: blur({blur}px);"));
    }
    css
}

/// Encodes `buffer` as PNG under [`DOWNLOAD_FILENAME`].
pub fn encode_png(buffer: &PixelBuffer) -> Result<Download, ExportError> {
    let mut bytes = Cursor::new(Vec::new());
    buffer.as_image().write_to(&mut bytes, ImageFormat::Png)?;
    let bytes = bytes.into_inner();
    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        bytes = bytes.len(),
        "encoded gradient PNG"
    );
    Ok(Download {
        bytes,
        filename: DOWNLOAD_FILENAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::descriptor::{Atmosphere, ColorStop};
    use crate::raster::{render, RasterConfig};
    use tempfile::TempDir;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn stops() -> Vec<ColorStop> {
        vec![
            ColorStop::new(Rgb::new(0x3b, 0x82, 0xf6), 0.0),
            ColorStop::new(Rgb::new(0x8b, 0x5c, 0xf6), 100.0),
        ]
    }

    #[test]
    fn clipboard_css_is_single_line_without_blur() {
        let gradient = Gradient::Linear {
            angle: 135.0,
            stops: stops(),
        };
        assert_eq!(
            clipboard_css(&gradient),
            "background: linear-gradient(135deg, #3b82f6 0%, #8b5cf6 100%);"
        );
    }

    #[test]
    fn clipboard_css_appends_blur_filter() {
        let gradient = Gradient::Atmospheric {
            angle: 135.0,
            stops: stops(),
            atmosphere: Atmosphere {
                blur: 60.0,
                noise: 20.0,
                layers: 1,
            },
        };
        let css = clipboard_css(&gradient);
        let lines: Vec<&str> = css.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("background: radial-gradient(ellipse at 20% 30%"));
        assert!(lines[0].ends_with("linear-gradient(135deg, #3b82f6 0%, #8b5cf6 100%);"));
        assert_eq!(lines[1], "filter: blur(60px);");

        let unblurred = gradient.with_atmosphere(Atmosphere {
            blur: 0.0,
            noise: 20.0,
            layers: 1,
        });
        assert_eq!(clipboard_css(&unblurred).lines().count(), 1);
    }

    #[test]
    fn png_has_signature_and_dimensions() {
        let gradient = Gradient::Radial { stops: stops() };
        let buffer = render(&gradient, RasterConfig::new(16, 9)).unwrap();
        let download = encode_png(&buffer).unwrap();
        assert_eq!(download.filename, "gradient.png");
        assert_eq!(&download.bytes[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(&download.bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (16, 9));
        assert_eq!(&decoded, buffer.as_image());
    }

    #[test]
    fn download_writes_under_suggested_name() {
        let dir = TempDir::new().unwrap();
        let download = Download {
            bytes: vec![1, 2, 3],
            filename: DOWNLOAD_FILENAME.to_string(),
        };
        let path = download.write_to(&dir.path().join("nested")).unwrap();
        assert_eq!(path, dir.path().join("nested/gradient.png"));
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn download_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("wall.png");
        fs::write(&target, b"stale contents that are longer").unwrap();

        let download = Download {
            bytes: vec![9, 8],
            filename: DOWNLOAD_FILENAME.to_string(),
        };
        download.write_as(&target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), vec![9, 8]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join(DOWNLOAD_FILENAME);
        fs::create_dir(&blocked).unwrap();

        let download = Download {
            bytes: vec![1, 2, 3],
            filename: DOWNLOAD_FILENAME.to_string(),
        };
        let err = download.write_to(dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Io { ref path, .. } if path == &blocked));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(DOWNLOAD_FILENAME)]);
        assert!(blocked.is_dir());
    }
}
