use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// How many notices are kept before the oldest are dropped.
pub const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible message produced by the session.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    unread: usize,
}

impl NoticeLog {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if self.entries.len() == MAX_NOTICES {
            self.entries.pop_front();
        }
        self.entries.push_back(Notice {
            level,
            message: message.into(),
            at: Utc::now(),
        });
        self.unread = (self.unread + 1).min(MAX_NOTICES);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notices added since the previous call, oldest first.
    pub fn drain_unread(&mut self) -> Vec<Notice> {
        let start = self.entries.len() - self.unread;
        self.unread = 0;
        self.entries.iter().skip(start).cloned().collect()
    }
}
