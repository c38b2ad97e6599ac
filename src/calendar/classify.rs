use super::datemath::is_same_day;
use super::month::{DayCell, MonthView};
use super::selection::{RangeSelection, Selection};
use time::Date;

/// How a day cell should be drawn
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DayClassification {
    #[default]
    None,
    Selected,
    Start,
    Middle,
    End,
    /// A range that starts and ends on the same day
    StartEnd,
    MultipleSelected,
    Disabled,
}

impl DayClassification {
    pub fn is_selected(self) -> bool {
        !matches!(self, DayClassification::None | DayClassification::Disabled)
    }
}

/// Hook for overriding how individual days are displayed
pub trait DayFormatter {
    /// Called with each fully classified cell.  The formatter may replace the
    /// cell's text, top/bottom info, and classification; whether the day
    /// accepts taps is unaffected.
    fn format_day(&self, cell: &mut DayCell);
}

impl<F: Fn(&mut DayCell)> DayFormatter for F {
    fn format_day(&self, cell: &mut DayCell) {
        self(cell);
    }
}

pub fn classify(selection: &Selection, date: Date, disabled: bool) -> DayClassification {
    if disabled {
        return DayClassification::Disabled;
    }
    match selection {
        Selection::Single(day) => {
            if is_same_day(date, *day) {
                DayClassification::Selected
            } else {
                DayClassification::None
            }
        }
        Selection::Multiple(days) => {
            if days.contains(&date) {
                DayClassification::MultipleSelected
            } else {
                DayClassification::None
            }
        }
        Selection::Range(range) => classify_range(range, date),
    }
}

fn classify_range(range: &RangeSelection, date: Date) -> DayClassification {
    let start = range.start();
    let end = range.end();
    match (is_same_day(date, start), is_same_day(date, end)) {
        (true, true) => DayClassification::StartEnd,
        (true, false) => DayClassification::Start,
        (false, true) => DayClassification::End,
        (false, false) => match (start, end) {
            (Some(s), Some(e)) if s < date && date < e => DayClassification::Middle,
            _ => DayClassification::None,
        },
    }
}

/// Classifies every cell of `month` against `selection`, then runs the
/// formatter (if any) over each cell
pub fn classify_month(
    month: &mut MonthView,
    selection: &Selection,
    formatter: Option<&dyn DayFormatter>,
) {
    for cell in month.cells_mut() {
        cell.classification = classify(selection, cell.date, cell.disabled);
        if let Some(f) = formatter {
            f.format_day(cell);
        }
    }
}
