//! Task and worker state classification.
//!
//! Every state label falls into at most one of three sets. Labels outside
//! all three are treated as pending or unknown.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DEFAULT_SUCCESS: &[&str] = &["SUCCESS", "SUCCEEDED"];
const DEFAULT_EXCEPTION: &[&str] = &["FAILURE", "FAILED", "REJECTED", "REVOKED", "RETRY", "CRITICAL"];
const DEFAULT_UNREADY: &[&str] = &["PENDING", "QUEUED", "RECEIVED", "STARTED"];

/// Which set a state label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Success,
    Exception,
    Unready,
    Other,
}

impl std::fmt::Display for StateClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateClass::Success => write!(f, "success"),
            StateClass::Exception => write!(f, "exception"),
            StateClass::Unready => write!(f, "unready"),
            StateClass::Other => write!(f, "other"),
        }
    }
}

/// Three disjoint sets of state labels.
///
/// Construct through [`StateClassification::new`], which rejects a label
/// that appears in more than one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateClassification {
    success: BTreeSet<String>,
    exception: BTreeSet<String>,
    unready: BTreeSet<String>,
}

impl StateClassification {
    pub fn new<I, S>(success: I, exception: I, unready: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let success: BTreeSet<String> = success.into_iter().map(Into::into).collect();
        let exception: BTreeSet<String> = exception.into_iter().map(Into::into).collect();
        let unready: BTreeSet<String> = unready.into_iter().map(Into::into).collect();

        let pairs = [
            (&success, "success", &exception, "exception"),
            (&success, "success", &unready, "unready"),
            (&exception, "exception", &unready, "unready"),
        ];
        for (a, first, b, second) in pairs {
            if let Some(state) = a.intersection(b).next() {
                return Err(CoreError::OverlappingStates {
                    state: state.clone(),
                    first,
                    second,
                });
            }
        }

        Ok(Self {
            success,
            exception,
            unready,
        })
    }

    pub fn classify(&self, state: &str) -> StateClass {
        if self.exception.contains(state) {
            StateClass::Exception
        } else if self.success.contains(state) {
            StateClass::Success
        } else if self.unready.contains(state) {
            StateClass::Unready
        } else {
            StateClass::Other
        }
    }

    pub fn success(&self) -> impl Iterator<Item = &str> {
        self.success.iter().map(String::as_str)
    }

    pub fn exception(&self) -> impl Iterator<Item = &str> {
        self.exception.iter().map(String::as_str)
    }

    pub fn unready(&self) -> impl Iterator<Item = &str> {
        self.unready.iter().map(String::as_str)
    }
}

impl Default for StateClassification {
    fn default() -> Self {
        let owned = |s: &[&str]| s.iter().map(|v| v.to_string()).collect::<BTreeSet<_>>();
        Self {
            success: owned(DEFAULT_SUCCESS),
            exception: owned(DEFAULT_EXCEPTION),
            unready: owned(DEFAULT_UNREADY),
        }
    }
}

/// Split a comma-separated list of state labels, dropping blanks.
pub fn parse_state_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}
