// error.rs
//
// Copyright (c) 2026  gifcodec developers
//
use std::fmt;
use std::io;

/// Errors caused by invalid use of the API.
///
/// Malformed GIF data never produces one of these; it is recorded in the
/// [ComponentStatus](struct.ComponentStatus.html) of the component which
/// detected it instead.  The only exception is [Error::Io], which wraps a
/// failure of the underlying reader or writer.
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Argument outside of its allowed range.
    OutOfRange {
        /// Name of the offending parameter
        param: &'static str,
        /// Description of the allowed range and supplied value
        msg: String,
    },
    /// Palette or colour table already holds 256 colours.
    TooManyColours,
    /// Fixed-capacity pixel buffer is full.
    CapacityExceeded(usize),
    /// Stream does not have the required length.
    InvalidStreamLength {
        /// Name of the offending stream
        param: &'static str,
        /// Required length, in bytes
        expected: usize,
        /// Actual length, in bytes
        actual: usize,
    },
    /// Raster dimensions do not fit a GIF frame, or do not match the pixel
    /// count.
    InvalidRasterDimensions,
    /// Indexed frame has no colour table.
    MissingColourTable,
}

/// Gifcodec result type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Make an out of range error
    pub(crate) fn out_of_range(param: &'static str, msg: String) -> Self {
        Error::OutOfRange { param, msg }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::OutOfRange { param, msg } => write!(fmt, "{param}: {msg}"),
            Error::TooManyColours => {
                write!(fmt, "The maximum number of colours (256) is reached")
            }
            Error::CapacityExceeded(cap) => write!(
                fmt,
                "Pixel buffer has a fixed capacity of {cap} pixels and is full"
            ),
            Error::InvalidStreamLength {
                param,
                expected,
                actual,
            } => write!(
                fmt,
                "{param}: stream must be exactly {expected} bytes, \
                 but is {actual} bytes"
            ),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let e = Error::out_of_range("start", "must be 0 to 7".to_string());
        assert_eq!(e.to_string(), "start: must be 0 to 7");
    }

    #[test]
    fn stream_length_message() {
        let e = Error::InvalidStreamLength {
            param: "reader",
            expected: 768,
            actual: 767,
        };
        assert_eq!(
            e.to_string(),
            "reader: stream must be exactly 768 bytes, but is 767 bytes"
        );
    }
}
