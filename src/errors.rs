use std::{io, num::TryFromIntError};
use font_kit::error::{FontLoadingError, GlyphLoadingError, SelectionError};
use png::EncodingError;

#[derive(Debug)]
pub struct Error {
    pub message: String,
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<tera::Error> for Error {
    fn from(value: tera::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<EncodingError> for Error {
    fn from(value: EncodingError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<SelectionError> for Error {
    fn from(value: SelectionError) -> Self {
        Error {
            message: format!("Font selection failed: {}", value)
        }
    }
}

impl From<FontLoadingError> for Error {
    fn from(value: FontLoadingError) -> Self {
        Error {
            message: format!("Font loading failed: {}", value)
        }
    }
}

impl From<GlyphLoadingError> for Error {
    fn from(value: GlyphLoadingError) -> Self {
        Error {
            message: format!("Glyph loading failed: {}", value)
        }
    }
}

impl From<TryFromIntError> for Error {
    fn from(value: TryFromIntError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            message: value
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
