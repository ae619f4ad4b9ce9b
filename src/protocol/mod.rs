//! Wire protocol between the coordinator and its peers
//!
//! Both directions use the same fixed 8-byte record; there is no framing,
//! versioning or variable-length content.

mod messages;

pub use messages::*;
