//! Exam countdown and study-cycle lookups over the configured exam dates.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::domain::models::{Countdown, CycleAnchors, StudyCycle};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Unknown exam: {0}")]
    UnknownExam(String),

    #[error("No exam dates are configured")]
    NoExamsConfigured,

    #[error("Date out of supported range: {0}")]
    DateOutOfRange(NaiveDate),
}

/// Countdown and cycle position for one exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSnapshot {
    pub exam: String,
    pub today: NaiveDate,
    pub countdown: Countdown,
    pub cycle: StudyCycle,
}

/// Read-only view of the `exams` configuration section.
#[derive(Debug, Clone, Default)]
pub struct StudyCalendar {
    exams: BTreeMap<String, NaiveDate>,
}

impl StudyCalendar {
    pub fn new(exams: &HashMap<String, NaiveDate>) -> Self {
        Self {
            exams: exams
                .iter()
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), *v))
                .collect(),
        }
    }

    /// Configured exams, sorted by name.
    pub fn exams(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.exams.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The named exam, or the nearest one not yet past when `name` is `None`.
    ///
    /// With every exam in the past, the most recent one is returned.
    pub fn resolve(&self, name: Option<&str>, today: NaiveDate) -> Result<(&str, NaiveDate), CalendarError> {
        if let Some(name) = name {
            let key = name.trim().to_ascii_lowercase();
            return self
                .exams
                .get_key_value(&key)
                .map(|(k, v)| (k.as_str(), *v))
                .ok_or_else(|| CalendarError::UnknownExam(name.to_string()));
        }

        let upcoming = self
            .exams()
            .filter(|(_, date)| *date >= today)
            .min_by_key(|(_, date)| *date);
        upcoming
            .or_else(|| self.exams().max_by_key(|(_, date)| *date))
            .ok_or(CalendarError::NoExamsConfigured)
    }

    /// Countdown plus cycle position as of `today`.
    pub fn snapshot(
        &self,
        exam: Option<&str>,
        anchors: &CycleAnchors,
        today: NaiveDate,
    ) -> Result<CalendarSnapshot, CalendarError> {
        let (name, date) = self.resolve(exam, today)?;
        let cycle = StudyCycle::locate(anchors, today)
            .ok_or(CalendarError::DateOutOfRange(anchors.resolve(today).0))?;
        Ok(CalendarSnapshot {
            exam: name.to_string(),
            today,
            countdown: Countdown::until(date, today),
            cycle,
        })
    }
}
