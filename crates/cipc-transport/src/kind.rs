use std::fmt;

use serde::{Deserialize, Serialize};

/// Selects which backend [`create`](crate::create) instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Message-queue transport (ZeroMQ).
    Queue,
    /// Connection-oriented TCP stream.
    Stream,
    /// Reserved. No backend implements it.
    Rpc,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Queue => "queue",
            TransportKind::Stream => "stream",
            TransportKind::Rpc => "rpc",
        }
    }

    /// Whether this build can instantiate the kind.
    pub fn is_supported(self) -> bool {
        match self {
            TransportKind::Queue => cfg!(feature = "queue"),
            TransportKind::Stream => true,
            TransportKind::Rpc => false,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
