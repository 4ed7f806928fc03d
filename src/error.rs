use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The coordinate lies outside the square a node of `level` can address.
    #[error("cell ({x}, {y}) is out of bounds for a level {level} node")]
    OutOfBounds { x: i64, y: i64, level: u8 },
}
