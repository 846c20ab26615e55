use thiserror::Error;

#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Clustering(#[from] ClusteringError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusteringError {
    #[error("cannot form {requested} clusters from {distinct} distinct colors")]
    NotEnoughColors { requested: usize, distinct: usize },

    #[error("k-means did not converge within {0} iterations")]
    NotConverged(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("cluster count must be between 1 and {max}, got {got}")]
    InvalidClusterCount { got: usize, max: usize },

    #[error("canvas dimensions cannot be zero, got {width}x{height}")]
    ZeroCanvas { width: u32, height: u32 },

    #[error("tile size cannot be zero")]
    ZeroTileSize,

    #[error("invalid hex color {0:?}")]
    InvalidHexColor(String),
}

pub type Result<T> = std::result::Result<T, WallpaperError>;
