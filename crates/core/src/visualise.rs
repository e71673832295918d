//! Heat-map rendering of a finished grid
//!
//! Cells are normalised against the range of evaluated values and mapped onto
//! a black → purple → red → white ramp. Unevaluated cells stay black, and in
//! path mode so does every cell no climber stepped off.
//!
//! Image x is the grid row and image y the grid column, flipped so that
//! column 0 lands on the bottom row of the image.
//!
//! The grid must not be mutated while rendering; callers render only after
//! the driver has joined.

use crate::error::HuntError;
use crate::grid::ManaGrid;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

/// Colour for a normalised height in `[0, 1]` (values outside are clamped).
#[must_use]
pub fn heat_color(normalized: f64) -> Rgb<u8> {
    let n = normalized.clamp(0.0, 1.0);

    if n < 0.33 {
        // Black -> purple
        let t = n / 0.33;
        Rgb([(128.0 * t) as u8, 0, (128.0 + 127.0 * t) as u8])
    } else if n < 0.66 {
        // Purple -> red
        let t = (n - 0.33) / 0.33;
        Rgb([(128.0 + 127.0 * t) as u8, 0, (255.0 - 255.0 * t) as u8])
    } else {
        // Red -> white
        let t = (n - 0.66) / 0.34;
        let fade = (255.0 * t) as u8;
        Rgb([255, fade, fade])
    }
}

/// Render the grid as an RGB raster of `rows × cols` pixels.
///
/// # Arguments
///
/// * `grid` - Finished grid
/// * `path_only` - Black out every cell no climber stepped off
#[must_use]
pub fn render_heat_map(grid: &ManaGrid, path_only: bool) -> RgbImage {
    let width = grid.rows();
    let height = grid.cols();
    let mut image = RgbImage::new(width as u32, height as u32);

    let Some((min, max)) = grid.value_range() else {
        return image;
    };
    let range = if max > min {
        f64::from(max) - f64::from(min)
    } else {
        1.0
    };

    for i in 0..width {
        for j in 0..height {
            let color = match grid.peek(i, j) {
                Some(_) if path_only && !grid.visited(i, j) => Rgb([0, 0, 0]),
                Some(value) => heat_color((f64::from(value) - f64::from(min)) / range),
                None => Rgb([0, 0, 0]),
            };
            image.put_pixel(i as u32, (height - 1 - j) as u32, color);
        }
    }

    image
}

/// Render and write the heat map as a PNG.
///
/// # Errors
///
/// [`HuntError::Image`] if encoding or writing the file fails.
pub fn save_heat_map(grid: &ManaGrid, path_only: bool, path: &Path) -> Result<(), HuntError> {
    let image = render_heat_map(grid, path_only);
    image.save_with_format(path, ImageFormat::Png)?;
    debug!(
        "Wrote {}x{} heat map to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bounds, PRECISION, RESOLUTION};
    use crate::field::ManaField;

    fn grid() -> ManaGrid {
        ManaGrid::new(
            ManaField::new(Bounds::square(1.0), 0.0, 0.0),
            RESOLUTION,
            PRECISION,
        )
    }

    #[test]
    fn test_heat_color_ramp() {
        assert_eq!(heat_color(0.0), Rgb([0, 0, 128]));
        assert_eq!(heat_color(-3.0), Rgb([0, 0, 128]));
        assert_eq!(heat_color(0.33), Rgb([128, 0, 255]));
        assert_eq!(heat_color(0.66), Rgb([255, 0, 0]));
        // (1 - 0.66) / 0.34 lands just below 1.0, as in the classic ramp
        let white = heat_color(1.0);
        assert_eq!(white.0[0], 255);
        assert!(white.0[1] >= 254 && white.0[1] == white.0[2]);
        assert_eq!(heat_color(7.0), white);
    }

    #[test]
    fn test_unevaluated_grid_is_black() {
        let grid = grid();
        let image = render_heat_map(&grid, false);
        assert_eq!(image.dimensions(), (10, 10));
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let grid = grid();
        // Two evaluated cells in column 0 and column 9 of row 2
        let low = grid.get_mana(2, 0);
        let high = grid.get_mana(2, 9);

        let image = render_heat_map(&grid, false);
        let (min, max) = (low.min(high), low.max(high));
        let range = f64::from(max - min).max(1.0);

        let bottom = *image.get_pixel(2, 9);
        let top = *image.get_pixel(2, 0);
        assert_eq!(bottom, heat_color((f64::from(low) - f64::from(min)) / range));
        assert_eq!(top, heat_color((f64::from(high) - f64::from(min)) / range));
        assert_eq!(*image.get_pixel(3, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_path_mode_masks_unvisited() {
        let grid = grid();
        let _ = grid.get_mana(1, 1);
        let _ = grid.get_mana(5, 5);
        grid.set_visited(5, 5, 1);

        let full = render_heat_map(&grid, false);
        let path = render_heat_map(&grid, true);

        assert_eq!(*path.get_pixel(1, 8), Rgb([0, 0, 0]));
        assert_eq!(path.get_pixel(5, 4), full.get_pixel(5, 4));
    }

    #[test]
    fn test_save_heat_map_writes_png() {
        let grid = grid();
        for i in 0..grid.rows() {
            let _ = grid.get_mana(i, i);
        }
        let path = std::env::temp_dir().join(format!(
            "dungeon-hunt-heat-map-{}.png",
            std::process::id()
        ));

        save_heat_map(&grid, false, &path).expect("png written");
        let bytes = std::fs::read(&path).expect("png readable");
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_heat_map_reports_bad_path() {
        let grid = grid();
        let path = Path::new("/nonexistent-dungeon-dir/visualiseSearch.png");
        assert!(matches!(
            save_heat_map(&grid, true, path),
            Err(HuntError::Image(_))
        ));
    }
}
