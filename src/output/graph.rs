//! Graph rendering
//!
//! Time-frequency features become heatmaps: one pixel per cell, low rows at
//! the bottom, values min-max normalized through a dark-to-bright colormap.
//! Waveforms become an amplitude envelope on a white canvas.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use log::debug;

use crate::error::{GraphgenError, Result};
use crate::features::{FeatureMatrix, FeatureType};

/// Maximum width of a waveform plot
pub const WAVEFORM_WIDTH: u32 = 1024;

/// Height of a waveform plot
pub const WAVEFORM_HEIGHT: u32 = 256;

/// Colormap stops, darkest first
const COLORMAP: [[f32; 3]; 5] = [
    [0.0, 0.0, 4.0],
    [80.0, 18.0, 123.0],
    [182.0, 54.0, 121.0],
    [251.0, 136.0, 97.0],
    [252.0, 253.0, 191.0],
];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([200, 200, 200]);
const TRACE: Rgb<u8> = Rgb([31, 119, 180]);

/// Map a value in [0, 1] onto the colormap
pub fn colormap(t: f32) -> Rgb<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (COLORMAP.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(COLORMAP.len() - 2);
    let frac = scaled - lower as f32;

    let a = COLORMAP[lower];
    let b = COLORMAP[lower + 1];
    let mix = |i: usize| (a[i] + (b[i] - a[i]) * frac).round() as u8;

    Rgb([mix(0), mix(1), mix(2)])
}

/// Render a feature matrix as an image
pub fn render_graph(matrix: &FeatureMatrix, feature_type: FeatureType) -> Result<RgbImage> {
    if matrix.is_empty() {
        return Err(GraphgenError::EmptyFeature {
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }

    Ok(if feature_type.is_time_frequency() {
        render_heatmap(matrix)
    } else {
        render_waveform(matrix.row(0))
    })
}

/// Render and write a graph as PNG
///
/// # Arguments
/// * `matrix` - Feature data
/// * `path` - Destination file
/// * `feature_type` - Chooses heatmap or waveform rendering
pub fn write_graph(matrix: &FeatureMatrix, path: &Path, feature_type: FeatureType) -> Result<()> {
    let image = render_graph(matrix, feature_type)?;

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| GraphgenError::ImageWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!(
        "Wrote {} graph {}x{} to {}",
        feature_type,
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

fn render_heatmap(matrix: &FeatureMatrix) -> RgbImage {
    let (min, max) = matrix.min_max();
    let range = max - min;
    let height = matrix.rows() as u32;

    RgbImage::from_fn(matrix.cols() as u32, height, |x, y| {
        let row = (height - 1 - y) as usize;
        let value = matrix.get(row, x as usize);
        let t = if range > 0.0 { (value - min) / range } else { 0.0 };
        colormap(t)
    })
}

fn render_waveform(samples: &[f32]) -> RgbImage {
    let width = (samples.len() as u32).clamp(1, WAVEFORM_WIDTH);
    let height = WAVEFORM_HEIGHT;
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

    let to_y = |v: f32| {
        let v = if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        (((1.0 - v) / 2.0) * (height - 1) as f32).round() as u32
    };

    let mid = to_y(0.0);
    for x in 0..width {
        image.put_pixel(x, mid, AXIS);
    }

    let n = samples.len();
    for x in 0..width {
        let start = x as usize * n / width as usize;
        let end = ((x as usize + 1) * n / width as usize).max(start + 1).min(n);
        let chunk = &samples[start..end];

        let lo = chunk.iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = chunk.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        for y in to_y(hi)..=to_y(lo) {
            image.put_pixel(x, y, TRACE);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(colormap(0.0), Rgb([0, 0, 4]));
        assert_eq!(colormap(1.0), Rgb([252, 253, 191]));
        assert_eq!(colormap(f32::NAN), Rgb([0, 0, 4]));
        assert_eq!(colormap(7.0), Rgb([252, 253, 191]));
    }

    #[test]
    fn test_heatmap_orientation() {
        // Row 0 is the lowest band and must land on the bottom pixel row
        let matrix = FeatureMatrix::from_vec(2, 3, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0], 0).unwrap();
        let image = render_graph(&matrix, FeatureType::Spectrogram).unwrap();

        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(*image.get_pixel(0, 1), colormap(1.0));
        assert_eq!(*image.get_pixel(0, 0), colormap(0.0));
    }

    #[test]
    fn test_waveform_dimensions() {
        let long = FeatureMatrix::from_vec(1, 5000, vec![0.25; 5000], 8000).unwrap();
        let image = render_graph(&long, FeatureType::Waveform).unwrap();
        assert_eq!(image.dimensions(), (WAVEFORM_WIDTH, WAVEFORM_HEIGHT));

        let short = FeatureMatrix::from_vec(1, 10, vec![0.0; 10], 8000).unwrap();
        let image = render_graph(&short, FeatureType::Waveform).unwrap();
        assert_eq!(image.width(), 10);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let empty = FeatureMatrix::zeros(0, 0, 0);
        assert!(matches!(
            render_graph(&empty, FeatureType::MelSpectrogram),
            Err(GraphgenError::EmptyFeature { .. })
        ));
    }

    #[test]
    fn test_write_graph_creates_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.png");
        let matrix = FeatureMatrix::from_vec(2, 2, vec![0.0, 1.0, 2.0, 3.0], 22050).unwrap();

        write_graph(&matrix, &path, FeatureType::MelSpectrogram).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn test_write_graph_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/graph.png");
        let matrix = FeatureMatrix::from_vec(1, 1, vec![0.0], 0).unwrap();

        assert!(matches!(
            write_graph(&matrix, &path, FeatureType::Chromagram),
            Err(GraphgenError::ImageWriteError { .. })
        ));
    }
}
