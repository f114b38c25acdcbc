use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("invalid sources configuration: {0}")]
    Validation(String),
}
