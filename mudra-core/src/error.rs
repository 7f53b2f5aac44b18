use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Translation error: {0}")]
    Translation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
