use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::class::StellarClass;
use crate::error::{Error, Result};

/// Height illustrations are scaled down to before display.
pub const DISPLAY_HEIGHT: u32 = 400;

/// How class labels map onto gallery directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetRouting {
    /// One subdirectory per class under the gallery root.
    #[default]
    PerClass,
    /// Degraded deployment: every class draws from the root itself.
    Shared,
}

/// Source of the index used to pick one asset out of a directory listing.
///
/// Injected so tests can force a fixed choice; `pick` must return a value
/// below `len`.
pub trait AssetPicker {
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice backed by an OS-seeded generator.
#[derive(Debug)]
pub struct UniformPicker(StdRng);

impl UniformPicker {
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for UniformPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetPicker for UniformPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Read-only gallery of representative images, grouped by class when routing
/// is per-class.
#[derive(Debug, Clone)]
pub struct IllustrationLibrary {
    root: PathBuf,
    routing: AssetRouting,
}

impl IllustrationLibrary {
    pub fn new(root: impl Into<PathBuf>, routing: AssetRouting) -> Self {
        Self {
            root: root.into(),
            routing,
        }
    }

    fn class_dir(&self, class: StellarClass) -> PathBuf {
        match self.routing {
            AssetRouting::PerClass => self.root.join(class.asset_dir()),
            AssetRouting::Shared => self.root.clone(),
        }
    }

    /// Picks one image file for the predicted class via the injected picker.
    pub fn select(&self, class: StellarClass, picker: &mut dyn AssetPicker) -> Result<PathBuf> {
        let dir = self.class_dir(class);
        if !dir.is_dir() {
            return Err(Error::AssetUnavailable(format!(
                "gallery directory missing: {}",
                dir.display()
            )));
        }
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&dir).max_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("walkdir error under {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && is_supported_image(path) {
                files.push(path.to_path_buf());
            }
        }
        if files.is_empty() {
            return Err(Error::AssetUnavailable(format!(
                "no image assets under {}",
                dir.display()
            )));
        }
        // Stable listing order so a fixed picker is reproducible.
        files.sort();
        let idx = picker.pick(files.len());
        Ok(files.swap_remove(idx))
    }
}

fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            matches!(ext.as_str(), "jpg" | "jpeg" | "png")
        }
        None => false,
    }
}

/// Illustration decoded into RGB channel order and scaled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedIllustration {
    pub path: PathBuf,
    pub pixels: RgbImage,
}

impl RenderedIllustration {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Inline data-URI payload, the base64 encoding variant of the display
    /// contract.
    pub fn to_base64_png(&self) -> Result<String> {
        let mut cursor = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| {
                Error::AssetUnavailable(format!("png encoding of {}: {e}", self.path.display()))
            })?;
        Ok(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(cursor.into_inner())
        ))
    }
}

/// Decodes an asset, forces RGB channel order, and bounds its height to
/// [`DISPLAY_HEIGHT`] preserving aspect ratio.
pub fn render(path: &Path) -> Result<RenderedIllustration> {
    let img = image::open(path)
        .map_err(|e| Error::AssetUnavailable(format!("{}: {e}", path.display())))?;
    let pixels = scale_to_display_height(img).to_rgb8();
    Ok(RenderedIllustration {
        path: path.to_path_buf(),
        pixels,
    })
}

fn scale_to_display_height(img: DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if height <= DISPLAY_HEIGHT {
        return img;
    }
    let scaled_width = ((width as f64) * (DISPLAY_HEIGHT as f64) / (height as f64))
        .round()
        .max(1.0) as u32;
    img.resize_exact(scaled_width, DISPLAY_HEIGHT, FilterType::Triangle)
}
