use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("grid dimension must be positive and its square must fit in usize, got {0}")]
    InvalidDimension(usize),

    #[error("site ({row}, {col}) is outside of the {n}x{n} grid")]
    OutOfRange { row: usize, col: usize, n: usize },

    #[error("element {id} is outside of the universe of {size} elements")]
    ElementOutOfRange { id: usize, size: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
