//! Core data model.
//!
//! Items are a tagged enum so the processing function matches on an explicit
//! discriminant. The queue itself only ever sees the lane an item was
//! submitted to.

use std::str::FromStr;

use uuid::Uuid;

use crate::error::Error;

// ---------------------------------------------------------------------------
// Lane
// ---------------------------------------------------------------------------

/// One of the two independent lanes of a [`crate::queue::DualLaneQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    File,
    Console,
}

impl LaneKind {
    pub const ALL: [LaneKind; 2] = [LaneKind::File, LaneKind::Console];

    pub fn as_str(self) -> &'static str {
        match self {
            LaneKind::File => "file",
            LaneKind::Console => "console",
        }
    }
}

impl std::fmt::Display for LaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LaneKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LaneKind::File),
            "console" => Ok(LaneKind::Console),
            other => Err(Error::Other(format!("unknown lane: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A line destined for the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub message: String,
}

/// A line destined for the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleItem {
    pub message: String,
}

/// Work submitted to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    File(FileItem),
    Console(ConsoleItem),
}

impl QueueItem {
    pub fn file(message: impl Into<String>) -> Self {
        QueueItem::File(FileItem {
            message: message.into(),
        })
    }

    pub fn console(message: impl Into<String>) -> Self {
        QueueItem::Console(ConsoleItem {
            message: message.into(),
        })
    }

    /// Build the item kind that belongs on `lane`.
    pub fn for_lane(lane: LaneKind, message: impl Into<String>) -> Self {
        match lane {
            LaneKind::File => QueueItem::file(message),
            LaneKind::Console => QueueItem::console(message),
        }
    }

    /// The lane this kind of item is routed to.
    pub fn lane(&self) -> LaneKind {
        match self {
            QueueItem::File(_) => LaneKind::File,
            QueueItem::Console(_) => LaneKind::Console,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            QueueItem::File(item) => &item.message,
            QueueItem::Console(item) => &item.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A file append finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWritten {
    /// Bytes appended, including the line terminator. Zero for empty messages.
    pub bytes: usize,
}

/// A console write finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleWritten;

/// Result of processing one [`QueueItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueResponse {
    File(FileWritten),
    Console(ConsoleWritten),
}

// ---------------------------------------------------------------------------
// Ticket identity
// ---------------------------------------------------------------------------

/// Newtype for ticket IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId(pub Uuid);

impl TicketId {
    /// A fresh random (v4) ID.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}
