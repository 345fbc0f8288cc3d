use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::data::csv::split_row;
use crate::data::dataset::{Dataset, Sample};
use crate::error::{Error, Result};

/// File inside an image dataset directory listing `file,label...` rows.
pub const MANIFEST: &str = "labels.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Grayscale,
    Rgb,
}

/// How images are turned into input vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub color: ColorMode,
}

impl Default for ImageOptions {
    fn default() -> Self {
        ImageOptions { width: 28, height: 28, color: ColorMode::Grayscale }
    }
}

impl ImageOptions {
    /// Length of the input vector an image becomes.
    pub fn input_len(&self) -> usize {
        let channels = match self.color {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
        };
        self.width as usize * self.height as usize * channels
    }
}

/// Images on disk, decoded on access.
///
/// The directory holds a `labels.csv` manifest; each row names an image file
/// (relative to the directory) followed by its label values. Images are
/// resized to `width × height` and scaled to [0, 1]; RGB inputs are flattened
/// as R, G, B, R, G, B, ...
#[derive(Debug, Clone)]
pub struct ImageDataset {
    root: PathBuf,
    options: ImageOptions,
    entries: Vec<(PathBuf, Vec<f64>)>,
}

impl ImageDataset {
    pub fn open(root: impl AsRef<Path>, options: ImageOptions) -> Result<ImageDataset> {
        let root = root.as_ref().to_path_buf();
        let text = std::fs::read_to_string(root.join(MANIFEST))?;

        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let cells = split_row(line);
            let labels: std::result::Result<Vec<f64>, _> =
                cells[1..].iter().map(|c| c.trim().parse::<f64>()).collect();
            match labels {
                Ok(labels) if !labels.is_empty() => {
                    entries.push((PathBuf::from(cells[0].trim()), labels));
                }
                // header row
                Err(_) if i == 0 => continue,
                _ => {
                    return Err(Error::InvalidData(format!(
                        "{MANIFEST} line {}: expected `file,label...`",
                        i + 1
                    )))
                }
            }
        }
        log::debug!("indexed {} images under {}", entries.len(), root.display());
        Ok(ImageDataset { root, options, entries })
    }

    pub fn options(&self) -> ImageOptions {
        self.options
    }

    fn decode(&self, path: &Path) -> Result<Vec<f64>> {
        let ImageOptions { width, height, color } = self.options;
        let img = image::open(self.root.join(path))?
            .resize_exact(width, height, FilterType::Lanczos3);
        let input = match color {
            ColorMode::Grayscale => img
                .to_luma8()
                .pixels()
                .map(|p| p.0[0] as f64 / 255.0)
                .collect(),
            ColorMode::Rgb => img
                .to_rgb8()
                .pixels()
                .flat_map(|p| p.0.map(|c| c as f64 / 255.0))
                .collect(),
        };
        Ok(input)
    }
}

impl Dataset for ImageDataset {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let (path, label) = self
            .entries
            .get(index)
            .ok_or(Error::IndexOutOfBounds { index, len: self.entries.len() })?;
        Ok((self.decode(path)?, label.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn decodes_grayscale_images_with_labels() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(4, 4, Luma([255])).save(dir.path().join("white.png")).unwrap();
        GrayImage::from_pixel(4, 4, Luma([0])).save(dir.path().join("black.png")).unwrap();
        std::fs::write(dir.path().join(MANIFEST), "file,label\nwhite.png,1\nblack.png,0\n").unwrap();

        let opts = ImageOptions { width: 2, height: 2, color: ColorMode::Grayscale };
        let ds = ImageDataset::open(dir.path(), opts).unwrap();
        assert_eq!(ds.len(), 2);

        let (x, y) = ds.get(0).unwrap();
        assert_eq!(x.len(), opts.input_len());
        assert!(x.iter().all(|&v| v > 0.99));
        assert_eq!(y, vec![1.0]);
        let (x, _) = ds.get(1).unwrap();
        assert!(x.iter().all(|&v| v < 0.01));
    }

    #[test]
    fn rgb_inputs_are_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(1, 1, Rgb([255, 0, 51])).save(dir.path().join("px.png")).unwrap();
        std::fs::write(dir.path().join(MANIFEST), "px.png,0,1\n").unwrap();

        let opts = ImageOptions { width: 1, height: 1, color: ColorMode::Rgb };
        let (x, y) = ImageDataset::open(dir.path(), opts).unwrap().get(0).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 0.01);
        assert_relative_eq!(x[1], 0.0, epsilon = 0.01);
        assert_relative_eq!(x[2], 0.2, epsilon = 0.01);
        assert_eq!(y, vec![0.0, 1.0]);
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageDataset::open(dir.path(), ImageOptions::default()),
            Err(Error::Io(_))
        ));
    }
}
