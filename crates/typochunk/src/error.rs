#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Heading {0} does not qualify for this document")]
    TagNotSelected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
