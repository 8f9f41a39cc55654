//! Opaque call arguments
//!
//! Arguments travel with an invocation record but no rule or query looks
//! inside them.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque argument payload of an invocation
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(pub Bytes);

impl Args {
    /// No arguments
    pub fn none() -> Self {
        Args(Bytes::new())
    }

    pub fn from_static(data: &'static [u8]) -> Self {
        Args(Bytes::from_static(data))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Args {
    fn from(data: Vec<u8>) -> Self {
        Args(Bytes::from(data))
    }
}
