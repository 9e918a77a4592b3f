use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    /// A read or seek would cross the end of the underlying buffer. Container data is untrusted,
    /// so this is an ordinary error and never a panic.
    #[error("Reading {requested} bytes at position {position} exceeds the buffer length {length}")]
    OutOfBounds {
        position: usize,
        requested: usize,
        length: usize,
    },

    #[error("Group {group}, frame {frame} is not part of the container")]
    FrameNotFound { group: u32, frame: u32 },

    #[error("Unsupported pixel format {format}")]
    UnsupportedPixelFormat { format: u32 },

    /// The runs of a scanline did not add up to the declared content width.
    #[error("Row {row} decoded to {decoded} pixels, but the frame is {expected} pixels wide")]
    RowLengthMismatch { row: u32, decoded: u32, expected: u32 },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

pub mod common;
pub mod def;
pub mod pcx;
