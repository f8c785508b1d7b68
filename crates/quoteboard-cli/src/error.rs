use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] quoteboard_core::ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(CliError::from(quoteboard_core::ValidationError::EmptyTabName).exit_code(), 2);
        assert_eq!(CliError::Config(String::from("no source")).exit_code(), 3);
        assert_eq!(CliError::from(std::io::Error::other("closed")).exit_code(), 10);
    }
}
