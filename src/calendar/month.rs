use super::classify::DayClassification;
use super::datemath::{add_months, add_years, days_in_month, format_title, start_of_month};
use serde::Deserialize;
use std::iter::successors;
use thiserror::Error;
use time::{Date, Duration};

pub const DAYS_IN_WEEK: usize = 7;

/// How the calendar moves between months
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchMode {
    /// Every month between the bounds is shown at once
    None,
    /// One month is shown at a time, paging by month
    #[default]
    Month,
    /// One month is shown at a time, paging by month or by year
    YearMonth,
}

impl SwitchMode {
    pub fn is_paginated(self) -> bool {
        self != SwitchMode::None
    }
}

/// Inclusive date bounds; either end may be open
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Bounds {
    pub min: Option<Date>,
    pub max: Option<Date>,
}

impl Bounds {
    pub fn new(min: Option<Date>, max: Option<Date>) -> Bounds {
        Bounds { min, max }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.min.is_none_or(|min| min <= date) && self.max.is_none_or(|max| date <= max)
    }

    /// Tests whether any part of the month starting at `month_start` lies
    /// within the bounds, i.e., compares at month granularity
    pub fn contains_month(&self, month_start: Date) -> bool {
        self.min.is_none_or(|min| start_of_month(min) <= month_start)
            && self.max.is_none_or(|max| month_start <= start_of_month(max))
    }

    /// Returns the first-of-month nearest to the month of `date` that is
    /// within the bounds
    pub fn clamp_month(&self, date: Date) -> Date {
        let mut month = start_of_month(date);
        if let Some(max) = self.max {
            month = month.min(start_of_month(max));
        }
        if let Some(min) = self.min {
            month = month.max(start_of_month(min));
        }
        month
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DayCell {
    pub date: Date,
    pub(crate) disabled: bool,
    pub classification: DayClassification,
    pub text: Option<String>,
    pub top_info: Option<String>,
    pub bottom_info: Option<String>,
}

impl DayCell {
    fn new(date: Date, bounds: &Bounds) -> DayCell {
        DayCell {
            date,
            disabled: !bounds.contains(date),
            classification: DayClassification::None,
            text: None,
            top_info: None,
            bottom_info: None,
        }
    }

    /// Whether the day lies outside the calendar's bounds.  This is fixed
    /// when the cell is built; formatters cannot change it.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// The text to show for the day: the formatter's override if any, else
    /// the day of the month
    pub fn label(&self) -> String {
        self.text.clone().unwrap_or_else(|| self.date.day().to_string())
    }
}

// Invariant: At least one element of the array is Some
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Week(pub [Option<DayCell>; DAYS_IN_WEEK]);

impl Week {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.0.iter().flatten()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut DayCell> {
        self.0.iter_mut().flatten()
    }

    /// Number of leading empty slots
    pub fn leading_blanks(&self) -> usize {
        self.0.iter().take_while(|slot| slot.is_none()).count()
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MonthView {
    /// First day of the month
    pub anchor: Date,
    pub title: String,
    pub weeks: Vec<Week>,
}

impl MonthView {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| w.cells())
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut DayCell> {
        self.weeks.iter_mut().flat_map(|w| w.cells_mut())
    }

    pub fn cell(&self, date: Date) -> Option<&DayCell> {
        self.cells().find(|c| c.date == date)
    }

    pub fn contains(&self, date: Date) -> bool {
        start_of_month(date) == self.anchor
    }

    pub fn slot_count(&self) -> usize {
        self.weeks.len() * DAYS_IN_WEEK
    }
}

/// Builds the day matrix for the month containing `anchor`, with weeks
/// starting on `first_day_of_week` (0 = Sunday)
pub fn build_month(anchor: Date, first_day_of_week: u8, bounds: &Bounds) -> MonthView {
    let anchor = start_of_month(anchor);
    let weekday = usize::from(anchor.weekday().number_days_from_sunday());
    let offset = (weekday + DAYS_IN_WEEK - usize::from(first_day_of_week % 7)) % DAYS_IN_WEEK;
    let length = usize::from(days_in_month(anchor.year(), anchor.month()));
    let mut weeks = Vec::with_capacity((offset + length).div_ceil(DAYS_IN_WEEK));
    let mut week = Week::default();
    let mut slot = offset;
    for date in successors(Some(anchor), |d| d.next_day()).take(length) {
        week.0[slot] = Some(DayCell::new(date, bounds));
        slot += 1;
        if slot == DAYS_IN_WEEK {
            weeks.push(std::mem::take(&mut week));
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    MonthView {
        anchor,
        title: format_title(anchor),
        weeks,
    }
}

/// Builds one view per month from the month of `bounds.min` through the month
/// of `bounds.max`.  Open bounds produce no months.
pub fn build_months(first_day_of_week: u8, bounds: &Bounds) -> Vec<MonthView> {
    let (Some(min), Some(max)) = (bounds.min, bounds.max) else {
        return Vec::new();
    };
    let last = start_of_month(max);
    successors(Some(start_of_month(min)), |&m| add_months(m, 1))
        .take_while(|&m| m <= last)
        .map(|m| build_month(m, first_day_of_week, bounds))
        .collect()
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MonthUnit {
    Month,
    Year,
}

/// Moves a paginated anchor by `delta` months or years.  Fails if the new
/// month lies entirely outside `bounds`.
pub fn shift_anchor(
    anchor: Date,
    delta: i32,
    unit: MonthUnit,
    bounds: &Bounds,
) -> Result<Date, OutOfBoundsError> {
    let anchor = start_of_month(anchor);
    let shifted = match unit {
        MonthUnit::Month => add_months(anchor, delta),
        MonthUnit::Year => add_years(anchor, delta),
    }
    .ok_or(OutOfBoundsError)?;
    if bounds.contains_month(shifted) {
        Ok(shifted)
    } else {
        Err(OutOfBoundsError)
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("month lies outside the selectable range")]
pub struct OutOfBoundsError;

/// Default bounds for continuous mode: today through six months from today
pub fn continuous_default_bounds(today: Date, bounds: Bounds) -> Bounds {
    Bounds {
        min: bounds.min.or(Some(today)),
        max: bounds
            .max
            .or_else(|| add_months(today, 6))
            .or(Some(today.saturating_add(Duration::days(183)))),
    }
}
