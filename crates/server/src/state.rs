use std::fmt;

/// Which requests a node currently serves.
///
/// Changed only by coordinator messages and by membership changes, never by
/// client traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeStatus {
    /// Serves gets and puts.
    Active,
    /// Rejects gets and puts; admin messages still work.
    #[default]
    Stopped,
    /// Serves gets, rejects puts. Held while keys migrate.
    WriteLocked,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Active => "ACTIVE",
            NodeStatus::Stopped => "STOPPED",
            NodeStatus::WriteLocked => "WRITE_LOCKED",
        }
    }

    pub fn can_read(self) -> bool {
        !matches!(self, NodeStatus::Stopped)
    }

    pub fn can_write(self) -> bool {
        matches!(self, NodeStatus::Active)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
