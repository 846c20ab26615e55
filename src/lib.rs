use wasm_bindgen::prelude::*;
use image::{DynamicImage, ImageFormat};
use js_sys::{Array, Uint8Array};

pub mod color;
pub mod composer;
pub mod error;
pub mod extractor;
pub mod layout;

pub use color::{Palette, parse_hex, to_hex};
pub use composer::{CollageComposer, compose};
pub use error::{ClusteringError, ConfigurationError, WallpaperError};
pub use extractor::{PaletteExtractor, extract_palette};
pub use layout::{GridLayout, LayoutCursor};

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract `n_colors` dominant colors from an encoded image.
///
/// Returns an array of `#rrggbb` strings in cluster order.
#[wasm_bindgen(js_name = extractPaletteHex)]
pub fn extract_palette_hex(input: Vec<u8>, n_colors: usize, seed: u64) -> Result<Array, JsValue> {
    let palette = PaletteExtractor::new(n_colors)
        .with_seed(seed)
        .extract_bytes(&input)
        .map_err(js_err)?;

    let out = Array::new();
    for hex in palette.to_hex() {
        out.push(&JsValue::from_str(&hex));
    }
    Ok(out)
}

/// Tile encoded thumbnails onto a `width × height` canvas and return it as PNG.
///
/// `tiles` is an array of `Uint8Array`s holding encoded images, in placement
/// order. `background` is a `#RRGGBB` string.
#[wasm_bindgen(js_name = composeWallpaper)]
pub fn compose_wallpaper(
    width: u32,
    height: u32,
    tile_size: u32,
    background: String,
    tiles: Array,
) -> Result<Uint8Array, JsValue> {
    let background = parse_hex(&background).map_err(js_err)?;

    let mut decoded: Vec<DynamicImage> = Vec::with_capacity(tiles.length() as usize);
    for val in tiles.iter() {
        let bytes = Uint8Array::new(&val).to_vec();
        let img = image::load_from_memory(&bytes)
            .map_err(|e| JsValue::from_str(&format!("Unable to decode tile: {e}")))?;
        decoded.push(img);
    }

    let canvas = compose(width, height, tile_size, background, &decoded).map_err(js_err)?;

    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        canvas
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| JsValue::from_str(&format!("PNG encode error: {e}")))?;
    }

    Ok(Uint8Array::from(buf.as_slice()))
}
