//! Status vocabulary and the classifier every resolver builds on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Execution status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    NotStarted,
    Queued,
    QueuedLicenseLimitReached,
    QueuedExecutionConcurrencyReached,
    Running,
    AsyncWaiting,
    TaskWaiting,
    TimedWaiting,
    WaitStepRunning,
    ResourceWaiting,
    Discontinuing,
    Pausing,
    Paused,
    InterventionWaiting,
    ApprovalWaiting,
    InputWaiting,
    UploadWaiting,
    ApprovalRejected,
    Failed,
    Errored,
    IgnoreFailed,
    Expired,
    Aborted,
    AbortedByFreeze,
    Suspended,
    Skipped,
    Success,
    /// Anything the platform sends that this build does not know about.
    Unknown(String),
}

impl ExecutionStatus {
    /// Parse a raw status string. Case and `_` separators are ignored, so
    /// `INPUT_WAITING` and `InputWaiting` are the same status.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "notstarted" => Self::NotStarted,
            "queued" => Self::Queued,
            "queuedlicenselimitreached" => Self::QueuedLicenseLimitReached,
            "queuedexecutionconcurrencyreached" => Self::QueuedExecutionConcurrencyReached,
            "running" => Self::Running,
            "asyncwaiting" => Self::AsyncWaiting,
            "taskwaiting" => Self::TaskWaiting,
            "timedwaiting" => Self::TimedWaiting,
            "waitsteprunning" => Self::WaitStepRunning,
            "resourcewaiting" => Self::ResourceWaiting,
            "discontinuing" => Self::Discontinuing,
            "pausing" => Self::Pausing,
            "paused" => Self::Paused,
            "interventionwaiting" => Self::InterventionWaiting,
            "approvalwaiting" => Self::ApprovalWaiting,
            "inputwaiting" => Self::InputWaiting,
            "uploadwaiting" => Self::UploadWaiting,
            "approvalrejected" => Self::ApprovalRejected,
            "failed" => Self::Failed,
            "errored" => Self::Errored,
            "ignorefailed" => Self::IgnoreFailed,
            "expired" => Self::Expired,
            "aborted" => Self::Aborted,
            "abortedbyfreeze" => Self::AbortedByFreeze,
            "suspended" => Self::Suspended,
            "skipped" => Self::Skipped,
            "success" => Self::Success,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Queued => "Queued",
            Self::QueuedLicenseLimitReached => "QueuedLicenseLimitReached",
            Self::QueuedExecutionConcurrencyReached => "QueuedExecutionConcurrencyReached",
            Self::Running => "Running",
            Self::AsyncWaiting => "AsyncWaiting",
            Self::TaskWaiting => "TaskWaiting",
            Self::TimedWaiting => "TimedWaiting",
            Self::WaitStepRunning => "WaitStepRunning",
            Self::ResourceWaiting => "ResourceWaiting",
            Self::Discontinuing => "Discontinuing",
            Self::Pausing => "Pausing",
            Self::Paused => "Paused",
            Self::InterventionWaiting => "InterventionWaiting",
            Self::ApprovalWaiting => "ApprovalWaiting",
            Self::InputWaiting => "InputWaiting",
            Self::UploadWaiting => "UploadWaiting",
            Self::ApprovalRejected => "ApprovalRejected",
            Self::Failed => "Failed",
            Self::Errored => "Errored",
            Self::IgnoreFailed => "IgnoreFailed",
            Self::Expired => "Expired",
            Self::Aborted => "Aborted",
            Self::AbortedByFreeze => "AbortedByFreeze",
            Self::Suspended => "Suspended",
            Self::Skipped => "Skipped",
            Self::Success => "Success",
            Self::Unknown(raw) => raw,
        }
    }

    /// Bucket this status into one of the five semantic classes.
    pub fn class(&self) -> StatusClass {
        match self {
            Self::Queued
            | Self::QueuedLicenseLimitReached
            | Self::QueuedExecutionConcurrencyReached
            | Self::Running
            | Self::AsyncWaiting
            | Self::TaskWaiting
            | Self::TimedWaiting
            | Self::WaitStepRunning
            | Self::ResourceWaiting
            | Self::Discontinuing
            | Self::Pausing => StatusClass::Active,

            Self::Paused
            | Self::InterventionWaiting
            | Self::ApprovalWaiting
            | Self::InputWaiting
            | Self::UploadWaiting
            | Self::ApprovalRejected
            | Self::Failed
            | Self::Errored
            | Self::IgnoreFailed
            | Self::Expired
            | Self::Aborted
            | Self::AbortedByFreeze
            | Self::Suspended => StatusClass::WaitingOrBad,

            Self::Success => StatusClass::Success,
            Self::Skipped => StatusClass::Skipped,
            Self::NotStarted | Self::Unknown(_) => StatusClass::NotStarted,
        }
    }

    /// Completed without success.
    pub fn is_bad_terminal(&self) -> bool {
        matches!(
            self,
            Self::ApprovalRejected
                | Self::Failed
                | Self::Errored
                | Self::IgnoreFailed
                | Self::Expired
                | Self::Aborted
                | Self::AbortedByFreeze
                | Self::Suspended
        )
    }

    pub fn is_waiting_for_input(&self) -> bool {
        matches!(self, Self::InputWaiting)
    }

    /// Position in the sibling display order; lower is shown first.
    pub fn display_rank(&self) -> u8 {
        match self {
            Self::InterventionWaiting => 0,
            Self::Pausing | Self::Paused => 1,
            Self::Aborted | Self::AbortedByFreeze => 2,
            Self::Failed | Self::Errored | Self::IgnoreFailed | Self::ApprovalRejected => 3,
            Self::Expired => 4,
            Self::Suspended => 5,
            Self::Skipped => 6,
            Self::Queued
            | Self::QueuedLicenseLimitReached
            | Self::QueuedExecutionConcurrencyReached
            | Self::Running
            | Self::AsyncWaiting
            | Self::TaskWaiting
            | Self::TimedWaiting
            | Self::WaitStepRunning
            | Self::ResourceWaiting
            | Self::Discontinuing
            | Self::ApprovalWaiting
            | Self::InputWaiting
            | Self::UploadWaiting => 7,
            Self::Success => 8,
            Self::NotStarted | Self::Unknown(_) => 9,
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status class
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    NotStarted,
    Active,
    WaitingOrBad,
    Success,
    Skipped,
}

impl StatusClass {
    pub fn is_active_or_bad_terminal(self) -> bool {
        matches!(self, Self::Active | Self::WaitingOrBad)
    }
}

/// Classify a raw status string with the built-in table.
pub fn classify(raw: &str) -> StatusClass {
    ExecutionStatus::parse(raw).class()
}

/// Running, queued, paused or waiting, or finished in a non-success terminal
/// state. A status that has not started is never matched.
pub fn is_active_or_bad_terminal(raw: &str) -> bool {
    classify(raw).is_active_or_bad_terminal()
}

pub fn is_success(raw: &str) -> bool {
    classify(raw) == StatusClass::Success
}

pub fn is_waiting_for_input(raw: &str) -> bool {
    ExecutionStatus::parse(raw).is_waiting_for_input()
}

// ---------------------------------------------------------------------------
// Status rules
// ---------------------------------------------------------------------------

/// Classification rules handed to the resolvers. Overrides are keyed by the
/// raw status string exactly as the snapshot carries it and win over the
/// built-in table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRules {
    #[serde(default)]
    pub overrides: BTreeMap<String, StatusClass>,
}

impl StatusRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, raw: impl Into<String>, class: StatusClass) -> Self {
        self.overrides.insert(raw.into(), class);
        self
    }

    pub fn classify(&self, raw: &str) -> StatusClass {
        match self.overrides.get(raw) {
            Some(class) => *class,
            None => classify(raw),
        }
    }

    pub fn is_active_or_bad_terminal(&self, raw: &str) -> bool {
        self.classify(raw).is_active_or_bad_terminal()
    }

    pub fn is_success(&self, raw: &str) -> bool {
        self.classify(raw) == StatusClass::Success
    }

    /// An input gate that an override moved out of the waiting bucket no
    /// longer counts as one.
    pub fn is_waiting_for_input(&self, raw: &str) -> bool {
        is_waiting_for_input(raw) && self.classify(raw) == StatusClass::WaitingOrBad
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
