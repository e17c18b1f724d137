//! Request boundary for the kinematics calculator.
//!
//! Turns loosely-typed field maps into typed calls on
//! [`kinova_ik::Kinematics`] and wraps the results in JSON envelopes:
//!
//! ```text
//! {"op": "cartesian2angular", "data": {"x": 0.057, ...}}
//!     -> {"success": true, "q": [...], "error": 0.0}
//! {"op": "angular2cartesian", "data": {"angle1": 0, ...}}
//!     -> {"success": true, "pose": {...}, "error": 0.0}
//! ```
//!
//! - [`protocol`]: message types and field coercion
//! - [`handler`]: per-operation request handling
//! - [`framing`]: length-prefixed JSON over a byte stream
//! - [`server`]: TCP server, one thread per connection

pub mod framing;
pub mod handler;
pub mod protocol;
pub mod server;

pub use framing::{read_frame, read_message, write_message};
pub use handler::{compute_forward, compute_inverse, handle_request, robot_info};
pub use protocol::{
    InputCoercionError, MAX_MESSAGE_SIZE, Operation, ProtocolError, Request, Response,
    coerce_field, coerce_fields,
};
pub use server::KinematicsServer;
