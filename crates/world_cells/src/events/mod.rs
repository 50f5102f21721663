//! Presence notifications produced by cells
//!
//! A cell emits a [`DetectionEvent`] to every observer in its voyeur table
//! when an object becomes detectable there (added, unhidden) or stops being
//! detectable (removed, hidden).

use crate::physics::ObjectId;

/// Kind of presence change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionType {
    /// The subject entered detectable presence
    EnteredDetection,
    /// The subject left detectable presence
    LeftDetection,
}

/// Immutable record of one presence change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectionEvent {
    subject: ObjectId,
    kind: DetectionType,
}

impl DetectionEvent {
    /// Create a new detection event for `subject`
    pub const fn new(subject: ObjectId, kind: DetectionType) -> Self {
        Self { subject, kind }
    }

    /// Object whose presence changed
    pub const fn subject(&self) -> ObjectId {
        self.subject
    }

    /// What happened to the subject
    pub const fn kind(&self) -> DetectionType {
        self.kind
    }
}
