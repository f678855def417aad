//! Wire shapes of the worker message protocol
//!
//! ```text
//! request   { "name": "detect", "args": [ImageData] }
//! success   { "type": "result", "result": [DetectedBarcode, ...] }
//! failure   { "type": "error", "message": "..." }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;
use crate::models::{DetectedBarcode, ImageData};

/// The only operation a worker supports
pub const DETECT: &str = "detect";

/// One positional argument of a request
///
/// Anything that is not shaped like [`ImageData`] is kept as raw JSON so the
/// worker can report what it got instead of failing to parse the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Image(ImageData),
    Value(serde_json::Value),
}

impl From<ImageData> for Argument {
    fn from(image: ImageData) -> Self {
        Argument::Image(image)
    }
}

impl From<&str> for Argument {
    fn from(text: &str) -> Self {
        Argument::Value(serde_json::Value::String(text.to_owned()))
    }
}

/// Inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Operation name; only [`DETECT`] is supported
    pub name: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Argument>,
}

impl Request {
    /// Request with arbitrary name and arguments
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// `detect` request for one image
    pub fn detect(image: ImageData) -> Self {
        Self::new(DETECT, vec![Argument::Image(image)])
    }

    /// Take the image from the first argument. Extra arguments are ignored.
    pub fn into_image(self) -> Result<ImageData, WorkerError> {
        match self.args.into_iter().next() {
            Some(Argument::Image(image)) => Ok(image),
            Some(Argument::Value(value)) => Err(WorkerError::InvalidArgument(describe(&value))),
            None => Err(WorkerError::MissingImage),
        }
    }
}

fn describe(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(_) => "a boolean".to_string(),
        serde_json::Value::Number(_) => "a number".to_string(),
        serde_json::Value::String(_) => "a string".to_string(),
        serde_json::Value::Array(_) => "an array".to_string(),
        serde_json::Value::Object(_) => "an object".to_string(),
    }
}

/// Outbound message; exactly one per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Result { result: Vec<DetectedBarcode> },
    Error { message: String },
}

impl Response {
    /// Error response carrying the error's display string
    pub fn error(err: &WorkerError) -> Self {
        Response::Error {
            message: err.to_string(),
        }
    }

    /// Whether this is an `error` response
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Unwrap into the barcode list, mapping `error` to [`WorkerError::Remote`].
    pub fn into_result(self) -> Result<Vec<DetectedBarcode>, WorkerError> {
        match self {
            Response::Result { result } => Ok(result),
            Response::Error { message } => Err(WorkerError::Remote(message)),
        }
    }
}
