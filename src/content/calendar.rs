//! Content calendar: the fixed, ordered worklist consumed by the batch scheduler.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thematic angle used to frame a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Incentives,
    Processes,
    Constraints,
    Narratives,
    Feedback,
    Metrics,
}

impl Lens {
    pub const ALL: [Self; 6] = [
        Self::Incentives,
        Self::Processes,
        Self::Constraints,
        Self::Narratives,
        Self::Feedback,
        Self::Metrics,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incentives => "incentives",
            Self::Processes => "processes",
            Self::Constraints => "constraints",
            Self::Narratives => "narratives",
            Self::Feedback => "feedback",
            Self::Metrics => "metrics",
        }
    }
}

/// Goal a piece should achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    EstablishCredibility,
    DiagnoseFailure,
    TranslateComplexity,
    ReframeBelief,
    AdvisoryPerspective,
    OperatorInsight,
}

impl Objective {
    pub const ALL: [Self; 6] = [
        Self::EstablishCredibility,
        Self::DiagnoseFailure,
        Self::TranslateComplexity,
        Self::ReframeBelief,
        Self::AdvisoryPerspective,
        Self::OperatorInsight,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EstablishCredibility => "establish_credibility",
            Self::DiagnoseFailure => "diagnose_failure",
            Self::TranslateComplexity => "translate_complexity",
            Self::ReframeBelief => "reframe_belief",
            Self::AdvisoryPerspective => "advisory_perspective",
            Self::OperatorInsight => "operator_insight",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lens {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| CalendarError::UnknownLens(s.to_string()))
    }
}

impl FromStr for Objective {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| CalendarError::UnknownObjective(s.to_string()))
    }
}

/// Errors from calendar construction and lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("No calendar entry for post #{0}")]
    MissingEntry(u32),
    #[error("Invalid post range {start}-{end}: start is after end")]
    InvalidRange { start: u32, end: u32 },
    #[error("No calendar entries for posts {start}-{end}")]
    EmptyRange { start: u32, end: u32 },
    #[error("Duplicate post number {0} in calendar")]
    DuplicatePostNumber(u32),
    #[error("Unknown lens '{0}'")]
    UnknownLens(String),
    #[error("Unknown objective '{0}'")]
    UnknownObjective(String),
}

/// One scheduled unit of content work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub post_number: u32,
    pub week: u32,
    pub topic: String,
    pub lens: Lens,
    pub objective: Objective,
    /// Editorial note, not used for generation.
    pub description: String,
}

impl CalendarEntry {
    #[must_use]
    pub fn new(
        post_number: u32,
        week: u32,
        topic: impl Into<String>,
        lens: Lens,
        objective: Objective,
        description: impl Into<String>,
    ) -> Self {
        Self {
            post_number,
            week,
            topic: topic.into(),
            lens,
            objective,
            description: description.into(),
        }
    }
}

/// Immutable, post-number ordered list of calendar entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarStore {
    entries: Vec<CalendarEntry>,
}

impl CalendarStore {
    /// Build a calendar, ordering entries by post number.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::DuplicatePostNumber` if two entries share a
    /// post number.
    pub fn new(mut entries: Vec<CalendarEntry>) -> Result<Self, CalendarError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.post_number) {
                return Err(CalendarError::DuplicatePostNumber(entry.post_number));
            }
        }
        entries.sort_by_key(|e| e.post_number);
        Ok(Self { entries })
    }

    /// Weeks 2-4 of the content calendar (posts 4-12).
    #[must_use]
    pub fn reference() -> Self {
        use Lens::{Constraints, Feedback, Incentives, Metrics, Narratives, Processes};
        use Objective::{
            AdvisoryPerspective, DiagnoseFailure, OperatorInsight, ReframeBelief,
            TranslateComplexity,
        };

        let entries = vec![
            CalendarEntry::new(
                4,
                2,
                "Process theater: why most execution plans look impressive but fail",
                Processes,
                DiagnoseFailure,
                "Expose how process theater creates illusion of progress without results",
            ),
            CalendarEntry::new(
                5,
                2,
                "Motivation as tax: why organizations that rely on it always underperform",
                Incentives,
                ReframeBelief,
                "Reframe motivation from asset to liability",
            ),
            CalendarEntry::new(
                6,
                2,
                "Metrics optimization: how measuring the wrong thing creates the wrong behavior",
                Metrics,
                TranslateComplexity,
                "Show second-order effects of metrics on behavior",
            ),
            CalendarEntry::new(
                7,
                3,
                "Good people in bad systems: why character doesn't overcome constraints",
                Constraints,
                ReframeBelief,
                "Challenge belief that people problems are root cause",
            ),
            CalendarEntry::new(
                8,
                3,
                "3 things that actually change behavior: incentives, constraints, and feedback",
                Feedback,
                OperatorInsight,
                "Practical framework for behavior change",
            ),
            CalendarEntry::new(
                9,
                3,
                "Hidden cost of misaligned incentives: why teams work hard but fail",
                Incentives,
                DiagnoseFailure,
                "Diagnose failure mode from incentive misalignment",
            ),
            CalendarEntry::new(
                10,
                4,
                "Advisory approach: how to analyze a system from the outside",
                Narratives,
                AdvisoryPerspective,
                "Framework for external analysis",
            ),
            CalendarEntry::new(
                11,
                4,
                "Optimization without alignment: why efficiency improvements make things worse",
                Processes,
                DiagnoseFailure,
                "Show how local optimization breaks global systems",
            ),
            CalendarEntry::new(
                12,
                4,
                "Rational resistance: when teams push back, the system is usually the problem",
                Constraints,
                ReframeBelief,
                "Reframe resistance as signal, not noise",
            ),
        ];

        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by post number.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::MissingEntry` if no entry has that number.
    pub fn get(&self, post_number: u32) -> Result<&CalendarEntry, CalendarError> {
        self.entries
            .iter()
            .find(|e| e.post_number == post_number)
            .ok_or(CalendarError::MissingEntry(post_number))
    }

    /// Entries with `start <= post_number <= end`, in post-number order.
    #[must_use]
    pub fn range(&self, start: u32, end: u32) -> Vec<CalendarEntry> {
        self.entries
            .iter()
            .filter(|e| (start..=end).contains(&e.post_number))
            .cloned()
            .collect()
    }

    /// Number of entries in `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::InvalidRange` when `start > end` and
    /// `CalendarError::EmptyRange` when no entry falls inside the range.
    pub fn check_range(&self, start: u32, end: u32) -> Result<usize, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        match self.range(start, end).len() {
            0 => Err(CalendarError::EmptyRange { start, end }),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_calendar_shape() {
        let calendar = CalendarStore::reference();
        assert_eq!(calendar.len(), 9);
        let numbers: Vec<u32> = calendar.entries().iter().map(|e| e.post_number).collect();
        assert_eq!(numbers, (4..=12).collect::<Vec<_>>());
        let weeks: HashSet<u32> = calendar.entries().iter().map(|e| e.week).collect();
        assert_eq!(weeks, HashSet::from([2, 3, 4]));
        assert!(CalendarStore::new(calendar.entries().to_vec()).is_ok());
    }

    #[test]
    fn test_range_is_inclusive_and_ordered() {
        let calendar = CalendarStore::reference();
        let numbers: Vec<u32> = calendar.range(5, 7).iter().map(|e| e.post_number).collect();
        assert_eq!(numbers, vec![5, 6, 7]);
        assert!(calendar.range(13, 20).is_empty());
        assert!(calendar.range(7, 5).is_empty());
    }

    #[test]
    fn test_check_range_rejects_empty_and_inverted() {
        let calendar = CalendarStore::reference();
        assert_eq!(calendar.check_range(4, 12), Ok(9));
        assert_eq!(calendar.check_range(12, 40), Ok(1));
        assert_eq!(
            calendar.check_range(20, 30),
            Err(CalendarError::EmptyRange { start: 20, end: 30 })
        );
        assert_eq!(
            calendar.check_range(9, 5),
            Err(CalendarError::InvalidRange { start: 9, end: 5 })
        );
    }

    #[test]
    fn test_new_sorts_and_rejects_duplicates() {
        let a = CalendarEntry::new(2, 1, "b", Lens::Metrics, Objective::OperatorInsight, "");
        let b = CalendarEntry::new(1, 1, "a", Lens::Feedback, Objective::ReframeBelief, "");
        let calendar = CalendarStore::new(vec![a.clone(), b]).unwrap();
        assert_eq!(calendar.entries()[0].post_number, 1);

        let err = CalendarStore::new(vec![a.clone(), a]).unwrap_err();
        assert_eq!(err, CalendarError::DuplicatePostNumber(2));
    }

    #[test]
    fn test_get_missing_entry() {
        let calendar = CalendarStore::reference();
        assert_eq!(calendar.get(8).unwrap().lens, Lens::Feedback);
        assert_eq!(calendar.get(3).unwrap_err(), CalendarError::MissingEntry(3));
    }

    #[test]
    fn test_lens_and_objective_wire_names() {
        assert_eq!(serde_json::to_string(&Lens::Metrics).unwrap(), "\"metrics\"");
        assert_eq!(
            serde_json::to_string(&Objective::DiagnoseFailure).unwrap(),
            "\"diagnose_failure\""
        );
        for lens in Lens::ALL {
            assert_eq!(lens.as_str().parse::<Lens>().unwrap(), lens);
        }
        for objective in Objective::ALL {
            assert_eq!(objective.to_string().parse::<Objective>().unwrap(), objective);
        }
        assert!("vibes".parse::<Lens>().is_err());
    }
}
