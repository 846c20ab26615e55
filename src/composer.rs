use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, imageops};
use palette::Srgb;
use tracing::debug;

use crate::error::Result;
use crate::layout::GridLayout;

/// Tiles thumbnails onto a fixed-size canvas over a solid background.
///
/// Cells are squares of side `tile_size`. Each tile is painted opaquely at
/// its cell's top-left corner; a smaller tile leaves background showing in the
/// rest of its cell, a larger one is cropped to the cell, and a cell running
/// past the canvas edge is clipped. Tiles are never resized here.
#[derive(Clone, Debug)]
pub struct CollageComposer {
    layout: GridLayout,
    background: Srgb<u8>,
}

impl CollageComposer {
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        tile_size: u32,
        background: Srgb<u8>,
    ) -> Result<Self> {
        let layout = GridLayout::new(canvas_width, canvas_height, tile_size)?;
        Ok(Self { layout, background })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Paint the background, then place `tiles` in order until the grid is
    /// full. Tiles past capacity are dropped.
    pub fn compose(&self, tiles: &[DynamicImage]) -> RgbaImage {
        let bg = Rgba([
            self.background.red,
            self.background.green,
            self.background.blue,
            255,
        ]);
        let mut canvas =
            RgbaImage::from_pixel(self.layout.canvas_width(), self.layout.canvas_height(), bg);

        let (margin_x, margin_y) = self.layout.margins();
        debug!(
            margin_x,
            margin_y,
            columns = self.layout.columns(),
            rows = self.layout.rows(),
            tiles = tiles.len(),
            "composing collage"
        );

        let mut placed = 0usize;
        for (tile, (x, y)) in tiles.iter().zip(self.layout.cursor()) {
            self.paint(&mut canvas, tile, x, y);
            placed += 1;
        }

        if placed < tiles.len() {
            debug!(placed, dropped = tiles.len() - placed, "grid full, dropping tiles");
        }

        canvas
    }

    fn paint(&self, canvas: &mut RgbaImage, tile: &DynamicImage, x: u32, y: u32) {
        let cell = self.layout.tile_size();
        let (w, h) = tile.dimensions();
        if w != cell || h != cell {
            debug!(width = w, height = h, cell, "tile does not match cell size");
        }

        // Clip to the cell, and to the canvas for cells on an odd-leftover edge.
        let w = w.min(cell).min(canvas.width() - x);
        let h = h.min(cell).min(canvas.height() - y);
        let mut visible = imageops::crop_imm(tile, 0, 0, w, h).to_image();
        for px in visible.pixels_mut() {
            px.0[3] = 255;
        }
        imageops::replace(canvas, &visible, x as i64, y as i64);
    }
}

/// Compose a wallpaper of exactly `canvas_width × canvas_height`.
pub fn compose(
    canvas_width: u32,
    canvas_height: u32,
    tile_size: u32,
    background: Srgb<u8>,
    tiles: &[DynamicImage],
) -> Result<RgbaImage> {
    let composer = CollageComposer::new(canvas_width, canvas_height, tile_size, background)?;
    Ok(composer.compose(tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, WallpaperError};
    use image::{Rgb, RgbImage};

    fn flat(size: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, Rgb(rgb)))
    }

    #[test]
    fn undersized_tile_leaves_background_gap() {
        let bg = Srgb::new(1, 2, 3);
        let tiles = [flat(4, [9, 9, 9]), flat(8, [7, 7, 7])];
        let canvas = compose(16, 8, 8, bg, &tiles).unwrap();

        assert_eq!(canvas.get_pixel(3, 3), &Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.get_pixel(4, 4), &Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(7, 0), &Rgba([1, 2, 3, 255]));
        // Second tile still starts at the next cell.
        assert_eq!(canvas.get_pixel(8, 0), &Rgba([7, 7, 7, 255]));
    }

    #[test]
    fn oversized_tile_is_cropped_to_its_cell() {
        let tiles = [flat(12, [9, 9, 9])];
        let canvas = compose(16, 8, 8, Srgb::new(0, 0, 0), &tiles).unwrap();
        assert_eq!(canvas.get_pixel(7, 7), &Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.get_pixel(8, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn transparent_tile_pixels_become_opaque() {
        let tile = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([50, 60, 70, 0])));
        let canvas = compose(4, 4, 4, Srgb::new(0, 0, 0), &[tile]).unwrap();
        assert!(canvas.pixels().all(|p| *p == Rgba([50, 60, 70, 255])));
    }

    #[test]
    fn margins_center_the_grid() {
        // 10px leftover on each axis, 5px each side.
        let tiles: Vec<_> = (0..6).map(|_| flat(30, [255, 255, 255])).collect();
        let canvas = compose(100, 70, 30, Srgb::new(0, 0, 0), &tiles).unwrap();

        assert_eq!(canvas.get_pixel(4, 4), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(94, 64), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(95, 65), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn odd_leftover_column_takes_a_clipped_tile() {
        let tiles = [flat(64, [1, 1, 1]), flat(64, [2, 2, 2]), flat(64, [3, 3, 3])];
        let canvas = compose(65, 128, 64, Srgb::new(9, 9, 9), &tiles).unwrap();

        assert_eq!(canvas.dimensions(), (65, 128));
        assert_eq!(canvas.get_pixel(63, 0), &Rgba([1, 1, 1, 255]));
        assert_eq!(canvas.get_pixel(64, 0), &Rgba([2, 2, 2, 255]));
        assert_eq!(canvas.get_pixel(64, 63), &Rgba([2, 2, 2, 255]));
        assert_eq!(canvas.get_pixel(0, 64), &Rgba([3, 3, 3, 255]));
        assert_eq!(canvas.get_pixel(64, 64), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn tile_larger_than_canvas_is_not_an_error() {
        let even = compose(50, 50, 64, Srgb::new(4, 5, 6), &[flat(64, [7, 7, 7])]).unwrap();
        assert!(even.pixels().all(|p| *p == Rgba([4, 5, 6, 255])));

        let odd = compose(51, 51, 64, Srgb::new(4, 5, 6), &[flat(64, [7, 7, 7])]).unwrap();
        assert_eq!(odd.get_pixel(24, 24), &Rgba([4, 5, 6, 255]));
        assert_eq!(odd.get_pixel(25, 25), &Rgba([7, 7, 7, 255]));
        assert_eq!(odd.get_pixel(50, 50), &Rgba([7, 7, 7, 255]));
    }

    #[test]
    fn zero_tile_size_is_a_configuration_error() {
        let err = compose(10, 10, 0, Srgb::new(0, 0, 0), &[]).unwrap_err();
        assert!(matches!(
            err,
            WallpaperError::Configuration(ConfigurationError::ZeroTileSize)
        ));
    }
}
