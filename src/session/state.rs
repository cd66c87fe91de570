use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_SECS: u32 = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Expired,
}

/// What a toggle did. The controller uses this to drive the camera and the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Paused,
    Resumed,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counted { remaining_secs: u32 },
    Expired,
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub paused_at_secs: u32,
    pub started_at: Option<DateTime<Utc>>,
    /// Set once the completion status for this session has been handed to the reporter.
    #[serde(skip)]
    pub completion_reported: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_duration(DEFAULT_SESSION_SECS)
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            duration_secs,
            remaining_secs: duration_secs,
            paused_at_secs: 0,
            started_at: None,
            completion_reported: false,
        }
    }

    /// The single control surface: start when idle, pause when running, resume when paused.
    pub fn toggle(&mut self, session_id: String, now: DateTime<Utc>) -> Transition {
        match self.status {
            SessionStatus::Idle => {
                self.status = SessionStatus::Running;
                self.session_id = Some(session_id);
                self.remaining_secs = self.duration_secs;
                self.paused_at_secs = 0;
                self.started_at = Some(now);
                self.completion_reported = false;
                Transition::Started
            }
            SessionStatus::Running => {
                self.status = SessionStatus::Paused;
                self.paused_at_secs = self.remaining_secs;
                Transition::Paused
            }
            SessionStatus::Paused => {
                self.status = SessionStatus::Running;
                self.remaining_secs = self.paused_at_secs;
                Transition::Resumed
            }
            SessionStatus::Expired => Transition::Ignored,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.status = SessionStatus::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Counted {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Returns true exactly once per expired session.
    pub fn take_expiry_report(&mut self) -> bool {
        if self.status != SessionStatus::Expired || self.completion_reported {
            return false;
        }
        self.completion_reported = true;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::with_duration(self.duration_secs);
    }
}
