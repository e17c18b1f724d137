//! Request/response message types for the kinematics calculator.
//!
//! A client sends a [`Request`] naming an operation plus a loose map of
//! fields; the server replies with a [`Response`] envelope. Field values are
//! coerced to numbers with [`coerce_field`], which accepts JSON numbers,
//! numeric strings and booleans.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use kinova_core::{JointVector, Pose};

/// Largest accepted frame payload (1 MiB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Operation requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Inverse kinematics: pose fields -> joint angles.
    #[serde(rename = "cartesian2angular")]
    Cartesian2Angular,
    /// Forward kinematics: joint angle fields -> pose.
    #[serde(rename = "angular2cartesian")]
    Angular2Cartesian,
    /// Describe the loaded chain.
    #[serde(rename = "info")]
    Info,
    /// End the connection.
    #[serde(rename = "close")]
    Close,
}

/// A request from a client.
///
/// # Example
///
/// ```
/// use kinova_gateway::protocol::{Operation, Request};
///
/// let json = r#"{"op":"angular2cartesian","data":{"angle2":"344"}}"#;
/// let req: Request = serde_json::from_str(json).unwrap();
/// assert_eq!(req.op, Operation::Angular2Cartesian);
/// assert_eq!(req.data["angle2"], "344");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub op: Operation,
    /// Loose field map; missing fields default to zero.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(op: Operation, data: Map<String, Value>) -> Self {
        Self { op, data }
    }

    pub fn close() -> Self {
        Self::new(Operation::Close, Map::new())
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A response envelope. Serialized without a tag; the `success` flag and the
/// set of fields tell the variants apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Joint angles (degrees) plus round-trip error.
    Inverse {
        success: bool,
        q: JointVector,
        error: f64,
    },
    /// Tool pose plus round-trip error.
    Forward {
        success: bool,
        pose: Pose,
        error: f64,
    },
    /// Chain description.
    Info {
        success: bool,
        robot: String,
        joints: Vec<String>,
        links: usize,
    },
    /// Request-level failure.
    Failure { success: bool, error: String },
    /// Acknowledgement (close).
    Ack { success: bool },
}

impl Response {
    pub const fn inverse(q: JointVector, error: f64) -> Self {
        Self::Inverse {
            success: true,
            q,
            error,
        }
    }

    pub const fn forward(pose: Pose, error: f64) -> Self {
        Self::Forward {
            success: true,
            pose,
            error,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: message.into(),
        }
    }

    pub const fn ack() -> Self {
        Self::Ack { success: true }
    }

    pub const fn is_success(&self) -> bool {
        match self {
            Self::Inverse { success, .. }
            | Self::Forward { success, .. }
            | Self::Info { success, .. }
            | Self::Failure { success, .. }
            | Self::Ack { success } => *success,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A request field could not be read as a finite number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}' {reason}")]
pub struct InputCoercionError {
    pub field: String,
    pub reason: String,
}

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Read `name` from `fields` as a finite `f64`.
///
/// Numbers pass through, strings are trimmed and parsed, booleans map to
/// 1/0 and a missing field is 0. Null, arrays, objects, unparsable strings
/// and non-finite values are rejected.
pub fn coerce_field(fields: &Map<String, Value>, name: &str) -> Result<f64, InputCoercionError> {
    let fail = |reason: String| InputCoercionError {
        field: name.into(),
        reason,
    };

    let value = match fields.get(name) {
        None => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| fail(format!("is not representable as a float: {n}")))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| fail(format!("is not a number: {s:?}")))?,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Null) => return Err(fail("is null".into())),
        Some(Value::Array(_)) => return Err(fail("is an array".into())),
        Some(Value::Object(_)) => return Err(fail("is an object".into())),
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(fail(format!("is not finite: {value}")))
    }
}

/// Coerce each of `names` in order.
pub fn coerce_fields<const N: usize>(
    fields: &Map<String, Value>,
    names: [&str; N],
) -> Result<[f64; N], InputCoercionError> {
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = coerce_field(fields, name)?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
