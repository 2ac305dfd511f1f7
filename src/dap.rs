//! Debug Adapter Protocol plumbing: message shapes and wire framing.

pub mod message;
pub mod transport;

pub use message::{MessageShape, describe, shape_of};
