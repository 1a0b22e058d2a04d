use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reporting window handed to Cost Explorer. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// First day of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }

    /// `MM/DD` label of the first covered day.
    pub fn start_label(&self) -> String {
        self.start.format("%m/%d").to_string()
    }

    /// `MM/DD` label of the last covered day (the day before `end`).
    pub fn end_label(&self) -> String {
        (self.end - Duration::days(1)).format("%m/%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service_name: String,
    /// Raw amount in USD, sign preserved.
    pub billing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub lines: Vec<String>,
    pub total: f64,
    pub include_credit: bool,
}
