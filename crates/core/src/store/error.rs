use reqwest::StatusCode;
use std::fmt;

/// Outcome of the low-privilege probe issued after every scheme was forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenDiagnosis {
    /// The probe failed too: the key itself is rejected.
    InvalidCredential,
    /// The key works elsewhere but lacks wellness permission.
    InsufficientScope,
    /// The probe could not be completed.
    Unknown,
}

impl ForbiddenDiagnosis {
    pub fn advice(self) -> &'static str {
        match self {
            ForbiddenDiagnosis::InvalidCredential => {
                "credential rejected on every endpoint; check INTERVALS_API_KEY and INTERVALS_ATHLETE_ID"
            }
            ForbiddenDiagnosis::InsufficientScope => {
                "credential works for activities but not wellness; issue a key with wellness permission"
            }
            ForbiddenDiagnosis::Unknown => "diagnostic probe did not complete",
        }
    }
}

/// A single failed request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Status { status: StatusCode, body: String },
    Transport { detail: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            AttemptFailure::Transport { detail } => write!(f, "request error: {detail}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreError {
    /// Every auth scheme was forbidden; carries the probe verdict.
    Forbidden { diagnosis: ForbiddenDiagnosis },
    /// Every auth scheme failed; carries the most recent failure.
    Exhausted { last: AttemptFailure },
    /// The write was refused. `body` is the remote explanation.
    WriteRejected { status: StatusCode, body: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Forbidden { diagnosis } => write!(
                f,
                "wellness store forbidden (diagnosis={diagnosis:?}): {}",
                diagnosis.advice()
            ),
            StoreError::Exhausted { last } => {
                write!(f, "wellness store request failed for every auth scheme; last {last}")
            }
            StoreError::WriteRejected { status, body } => write!(
                f,
                "wellness write rejected with HTTP {status}: {body} \
                 (check the custom wellness field codes match the payload keys)"
            ),
        }
    }
}

impl std::error::Error for StoreError {}
