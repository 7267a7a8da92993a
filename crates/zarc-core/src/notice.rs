//! Short-lived user notices (toasts).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::NOTICE_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Error => write!(f, "error"),
            NoticeLevel::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub level: NoticeLevel,
    pub expires_at: Instant,
}

/// Ordered queue of visible notices, oldest first.
#[derive(Debug)]
pub struct NoticeQueue {
    ttl: Duration,
    next_id: u64,
    notices: Vec<Notice>,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: NoticeLevel) -> u64 {
        self.push_at(message, level, Instant::now())
    }

    pub fn push_at(&mut self, message: impl Into<String>, level: NoticeLevel, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            message: message.into(),
            level,
            expires_at: now + self.ttl,
        });
        id
    }

    /// Shorthand for an `Error` notice built from any displayable error.
    pub fn push_error(&mut self, error: &dyn std::fmt::Display) -> u64 {
        self.push(error.to_string(), NoticeLevel::Error)
    }

    /// Remove a notice early. Returns whether it was still visible.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop every notice whose lifetime has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        self.notices.retain(|n| n.expires_at > now);
        before - self.notices.len()
    }

    pub fn visible(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
