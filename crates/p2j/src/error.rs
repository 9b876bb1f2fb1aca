use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(
        "Wrong file type specified. Expected {expected} extension but got {found} instead."
    )]
    InvalidExtension {
        expected: &'static str,
        found: String,
    },

    #[error("Source file not found. Specify a valid source file: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error(
        "File {} exists. Add -o flag to overwrite this file, or specify a different target filename using -t.",
        .0.display()
    )]
    TargetExists(PathBuf),

    #[error("malformed notebook: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ConvertError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidExtension { .. }
            | Self::SourceNotFound(_)
            | Self::TargetExists(_)
            | Self::MalformedDocument(_)
            | Self::Io(_) => ExitCode::Failure,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_exit_with_one() {
        let err = ConvertError::TargetExists(PathBuf::from("out.ipynb"));
        assert_eq!(err.exit_code() as u8, 1);
        assert!(err.to_string().contains("out.ipynb exists"));
        assert_eq!(ExitCode::Success as u8, 0);
    }
}
