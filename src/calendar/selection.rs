use super::datemath::diff_days_inclusive;
use serde::Deserialize;
use time::Date;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarMode {
    #[default]
    Single,
    Multiple,
    Range,
}

/// Progress of a range selection.  The start of a range is always set when
/// its end is, and a completed range is ordered.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RangeSelection {
    #[default]
    Empty,
    Started(Date),
    // Invariant: .0 <= .1
    Completed(Date, Date),
}

impl RangeSelection {
    /// Creates a completed range from two days given in either order
    pub fn ordered(a: Date, b: Date) -> RangeSelection {
        RangeSelection::Completed(a.min(b), a.max(b))
    }

    pub fn start(&self) -> Option<Date> {
        match *self {
            RangeSelection::Empty => None,
            RangeSelection::Started(start) | RangeSelection::Completed(start, _) => Some(start),
        }
    }

    pub fn end(&self) -> Option<Date> {
        match *self {
            RangeSelection::Completed(_, end) => Some(end),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RangeSelection::Completed(..))
    }
}

/// The selected day or days, shaped by the calendar mode
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Selection {
    Single(Option<Date>),
    /// Selected days in the order they were tapped, without duplicates
    Multiple(Vec<Date>),
    Range(RangeSelection),
}

impl Selection {
    pub fn empty(mode: CalendarMode) -> Selection {
        match mode {
            CalendarMode::Single => Selection::Single(None),
            CalendarMode::Multiple => Selection::Multiple(Vec::new()),
            CalendarMode::Range => Selection::Range(RangeSelection::Empty),
        }
    }

    /// Builds a selection for `mode` from a list of days, as supplied by a
    /// default value.  Single mode takes the first day, range mode takes the
    /// first two (in either order), and multiple mode drops repeats.
    pub fn from_dates(mode: CalendarMode, dates: &[Date]) -> Selection {
        match (mode, dates) {
            (CalendarMode::Single, _) => Selection::Single(dates.first().copied()),
            (CalendarMode::Multiple, _) => {
                let mut days = Vec::with_capacity(dates.len());
                for &d in dates {
                    if !days.contains(&d) {
                        days.push(d);
                    }
                }
                Selection::Multiple(days)
            }
            (CalendarMode::Range, []) => Selection::Range(RangeSelection::Empty),
            (CalendarMode::Range, [start]) => Selection::Range(RangeSelection::Started(*start)),
            (CalendarMode::Range, [a, b, ..]) => Selection::Range(RangeSelection::ordered(*a, *b)),
        }
    }

    pub fn mode(&self) -> CalendarMode {
        match self {
            Selection::Single(_) => CalendarMode::Single,
            Selection::Multiple(_) => CalendarMode::Multiple,
            Selection::Range(_) => CalendarMode::Range,
        }
    }

    /// The selected days in display order
    pub fn dates(&self) -> Vec<Date> {
        match self {
            Selection::Single(day) => day.iter().copied().collect(),
            Selection::Multiple(days) => days.clone(),
            Selection::Range(range) => range.start().into_iter().chain(range.end()).collect(),
        }
    }

    pub fn first_date(&self) -> Option<Date> {
        match self {
            Selection::Single(day) => *day,
            Selection::Multiple(days) => days.first().copied(),
            Selection::Range(range) => range.start(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_date().is_none()
    }

    /// Whether the selection is in a state that may be confirmed.  Only an
    /// unfinished range is not.
    pub fn is_complete(&self) -> bool {
        match self {
            Selection::Range(range) => range.is_completed(),
            _ => true,
        }
    }
}

/// Notification that a tap was refused because it would exceed the maximum
/// range
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OverRange {
    pub max_range: usize,
    /// The selection that the tap would have produced
    pub attempted: Selection,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TapOutput {
    /// The selection was changed to include the tapped day
    Selected,
    /// The tapped day was removed from a multiple selection
    Unselected(Date),
    /// The tap was rejected and the selection is unchanged
    OverRange(OverRange),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectionState {
    selection: Selection,
    max_range: Option<usize>,
    allow_same_day: bool,
}

impl SelectionState {
    pub fn new(selection: Selection) -> SelectionState {
        SelectionState {
            selection,
            max_range: None,
            allow_same_day: false,
        }
    }

    /// Caps the number of days in a multiple selection, or the length in days
    /// of a range.  Only checked when a day is added.
    pub fn max_range(mut self, max_range: Option<usize>) -> Self {
        self.max_range = max_range;
        self
    }

    /// Allows a range to start and end on the same day
    pub fn allow_same_day(mut self, allow: bool) -> Self {
        self.allow_same_day = allow;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> CalendarMode {
        self.selection.mode()
    }

    pub fn reset(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Applies a tap on `day`, which the caller has already checked is not
    /// disabled
    pub fn handle_tap(&mut self, day: Date) -> TapOutput {
        match &mut self.selection {
            Selection::Single(current) => {
                *current = Some(day);
                TapOutput::Selected
            }
            Selection::Multiple(days) => {
                if let Some(i) = days.iter().position(|&d| d == day) {
                    days.remove(i);
                    return TapOutput::Unselected(day);
                }
                if let Some(max_range) = self.max_range {
                    if days.len() + 1 > max_range {
                        let mut attempted = days.clone();
                        attempted.push(day);
                        return TapOutput::OverRange(OverRange {
                            max_range,
                            attempted: Selection::Multiple(attempted),
                        });
                    }
                }
                days.push(day);
                TapOutput::Selected
            }
            Selection::Range(range) => {
                let next = match *range {
                    RangeSelection::Started(start) if start == day => {
                        if self.allow_same_day {
                            RangeSelection::Completed(day, day)
                        } else {
                            RangeSelection::Started(day)
                        }
                    }
                    RangeSelection::Started(start) => {
                        let attempt = RangeSelection::ordered(start, day);
                        if let (Some(max_range), RangeSelection::Completed(earlier, later)) =
                            (self.max_range, attempt)
                        {
                            let limit = i64::try_from(max_range).unwrap_or(i64::MAX);
                            if diff_days_inclusive(earlier, later) > limit {
                                return TapOutput::OverRange(OverRange {
                                    max_range,
                                    attempted: Selection::Range(attempt),
                                });
                            }
                        }
                        attempt
                    }
                    RangeSelection::Empty | RangeSelection::Completed(..) => {
                        RangeSelection::Started(day)
                    }
                };
                *range = next;
                TapOutput::Selected
            }
        }
    }
}
