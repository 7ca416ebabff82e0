//! Progression timepoints and their prompt phrasing.
//!
//! A [`Timepoint`] is one of four fixed points on a projected
//! disease-progression timeline. Derived ordering follows declaration
//! order, so ordered maps keyed by `Timepoint` iterate now -> 12m.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A point on the projected progression timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timepoint {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
}

impl Timepoint {
    /// Every timepoint, in canonical order.
    pub const ALL: [Timepoint; 4] = [
        Timepoint::Now,
        Timepoint::ThreeMonths,
        Timepoint::SixMonths,
        Timepoint::TwelveMonths,
    ];

    /// Wire identifier (`"now"`, `"3m"`, `"6m"`, `"12m"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Timepoint::Now => "now",
            Timepoint::ThreeMonths => "3m",
            Timepoint::SixMonths => "6m",
            Timepoint::TwelveMonths => "12m",
        }
    }

    /// Phrase appended to a uniform prompt to target this timepoint.
    pub fn phrase(self) -> &'static str {
        match self {
            Timepoint::Now => "current brain state",
            Timepoint::ThreeMonths => "brain state in approximately 3 months",
            Timepoint::SixMonths => "brain state in approximately 6 months",
            Timepoint::TwelveMonths => "brain state in approximately 12 months",
        }
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timepoint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timepoint::ALL
            .into_iter()
            .find(|tp| tp.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid timepoint '{s}'. Must be one of: now, 3m, 6m, 12m"
                ))
            })
    }
}

/// Resolve the timepoints a request should cover.
///
/// `None` or an empty list means all four in canonical order. Repeated
/// entries are dropped, keeping the first occurrence.
pub fn resolve_timepoints(requested: Option<&[Timepoint]>) -> Vec<Timepoint> {
    let requested = match requested {
        Some(list) if !list.is_empty() => list,
        _ => return Timepoint::ALL.to_vec(),
    };

    let mut resolved = Vec::with_capacity(requested.len());
    for &tp in requested {
        if !resolved.contains(&tp) {
            resolved.push(tp);
        }
    }
    resolved
}
