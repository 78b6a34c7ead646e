pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Flow(#[from] ibfs::Error),

    #[error("{what} is {found:?} pixels but the image is {expected:?}")]
    ImageSize {
        what: &'static str,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("bounding box mask selects no pixels")]
    EmptyBox,

    #[error("unsupported grid connectivity {0} (expected 4, 8 or 16)")]
    Connectivity(u32),

    #[error("color bin size must be between 1 and 256, got {0}")]
    ColorBinSize(u32),

    #[error("no graph has been constructed yet; call `construct` first")]
    NotConstructed,
}
