use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error correction level of the rendered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    /// Output width and height in pixels.
    pub width: u32,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Hex colour of dark modules.
    pub dark: String,
    /// Hex colour of light modules and the margin.
    pub light: String,
    pub ec_level: EcLevel,
}

impl QrOptions {
    /// Rendering options used for payment intents: 300px, 2 module margin,
    /// black on white.
    pub fn payment() -> Self {
        Self {
            width: 300,
            margin: 2,
            dark: "#000000".to_string(),
            light: "#ffffff".to_string(),
            ec_level: EcLevel::M,
        }
    }
}

impl Default for QrOptions {
    fn default() -> Self {
        Self::payment()
    }
}

/// An encoded symbol, ready to be used as an `<img src>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrImage {
    pub data_uri: String,
    pub size_px: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("no input text")]
    EmptyInput,
    #[error("input does not fit in a QR code")]
    DataTooLong,
    #[error("invalid colour: {0}")]
    InvalidColor(String),
    #[error("encoder error: {0}")]
    Encoder(String),
    #[error("image error: {0}")]
    Image(String),
}

impl From<qrcode::types::QrError> for EncodeError {
    fn from(err: qrcode::types::QrError) -> Self {
        match err {
            qrcode::types::QrError::DataTooLong => EncodeError::DataTooLong,
            other => EncodeError::Encoder(other.to_string()),
        }
    }
}

/// Turns text into a displayable QR bitmap.
///
/// Implementations must be deterministic: the same `(text, options)` pair
/// always yields the same image.
#[async_trait]
pub trait QrEncoder: Send + Sync {
    async fn encode(&self, text: &str, options: &QrOptions) -> Result<QrImage, EncodeError>;
}

pub mod mock;
pub mod png;
