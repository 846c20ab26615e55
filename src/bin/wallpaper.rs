use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use album_wallpaper::{PaletteExtractor, compose, parse_hex, to_hex};
use anyhow::{Context, Result, bail};
use image::DynamicImage;
use palette::Srgb;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Album-art thumbnail sizes served by the image CDN.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ImageSize {
    Small,
    Medium,
    Large,
    Extralarge,
}

impl ImageSize {
    fn pixels(self) -> u32 {
        match self {
            ImageSize::Small => 34,
            ImageSize::Medium => 64,
            ImageSize::Large => 174,
            ImageSize::Extralarge => 300,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Config {
    download_dir: Option<PathBuf>,
}

/// Build a wallpaper from a directory of downloaded album-art thumbnails.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Thumbnail size preset
    #[arg(long, value_enum, default_value_t = ImageSize::Extralarge)]
    image_size: ImageSize,

    /// Explicit tile size in pixels (overrides --image-size)
    #[arg(long)]
    tile_size: Option<u32>,

    /// Wallpaper width
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Wallpaper height
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Index of the thumbnail whose colors become the background
    #[arg(long, default_value_t = 0)]
    wal_i: usize,

    /// Number of palette colors to extract
    #[arg(short = 'k', long, default_value_t = 4)]
    colors: usize,

    /// Seed for k-means and for picking the palette entry
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Palette entry to use as background instead of a seeded pick
    #[arg(long)]
    palette_index: Option<usize>,

    /// Fixed background color (#RRGGBB), skipping extraction
    #[arg(long)]
    background: Option<String>,

    /// Directory of thumbnails (defaults to download_dir from the config file)
    #[arg(short = 'd', long)]
    tiles_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output image path (defaults to <tiles-dir>/<unix-nanos>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let tiles_dir = match &args.tiles_dir {
        Some(dir) => dir.clone(),
        None => {
            let config = load_config(args.config.as_deref())?;
            config
                .download_dir
                .context("no --tiles-dir given and config has no download_dir")?
        }
    };

    let paths = list_images(&tiles_dir)?;
    if paths.is_empty() {
        bail!("no images found in {}", tiles_dir.display());
    }

    let mut tiles: Vec<(PathBuf, DynamicImage)> = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(&path) {
            Ok(img) => tiles.push((path, img)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping undecodable image"),
        }
    }

    let background = match &args.background {
        Some(hex) => parse_hex(hex)?,
        None => pick_background(&args, &tiles),
    };

    let tile_size = args.tile_size.unwrap_or_else(|| args.image_size.pixels());
    let images: Vec<DynamicImage> = tiles.into_iter().map(|(_, img)| img).collect();
    let canvas = compose(args.width, args.height, tile_size, background, &images)
        .context("composing wallpaper failed")?;

    let out_path = match &args.output {
        Some(p) => p.clone(),
        None => {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
            tiles_dir.join(format!("{nanos}.png"))
        }
    };
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    // The canvas is fully opaque; RGB8 drops the redundant alpha channel and
    // keeps the save valid for any extension, JPEG included.
    DynamicImage::ImageRgba8(canvas)
        .to_rgb8()
        .save(&out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;

    info!(path = %out_path.display(), "saved wallpaper");
    println!("{}", out_path.display());
    println!("{}", to_hex(background));

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match dirs::config_dir() {
            Some(dir) => dir.join("background.fm").join("config.json"),
            None => return Ok(Config::default()),
        },
    };
    info!(path = %path.display(), "reading configuration file");
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Background from the `wal_i`-th thumbnail's palette, black if extraction fails.
fn pick_background(args: &Args, tiles: &[(PathBuf, DynamicImage)]) -> Srgb<u8> {
    let fallback = Srgb::new(0, 0, 0);

    let Some((path, img)) = tiles.get(args.wal_i) else {
        warn!(wal_i = args.wal_i, available = tiles.len(), "no thumbnail at index, using default background");
        return fallback;
    };

    let extractor = PaletteExtractor::new(args.colors).with_seed(args.seed);
    match extractor.extract(img) {
        Ok(palette) => {
            let idx = args
                .palette_index
                .unwrap_or((args.seed % palette.len() as u64) as usize);
            palette.get(idx).unwrap_or(fallback)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "palette extraction failed, using default background");
            fallback
        }
    }
}
