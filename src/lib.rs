//! Date-selection engine for calendar pickers.
//!
//! A [`CalendarController`] lays out months as 7-column day matrices,
//! classifies each day against the current selection, and applies taps in
//! single, multiple, or range mode.  Results and rejections are reported
//! through the optional handlers in [`CalendarCallbacks`].
pub mod calendar;
pub mod config;
pub use crate::calendar::{
    CalendarCallbacks, CalendarController, CalendarMode, DayCell, DayClassification, MonthUnit,
    MonthView, Selection, SwitchMode,
};
pub use crate::config::CalendarConfig;
