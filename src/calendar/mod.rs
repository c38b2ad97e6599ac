pub mod classify;
pub mod controller;
pub mod datemath;
mod memo;
pub mod month;
pub mod popup;
pub mod selection;
pub use self::classify::{DayClassification, DayFormatter};
pub use self::controller::{CalendarCallbacks, CalendarController, MonthShow};
pub use self::month::{Bounds, DayCell, MonthUnit, MonthView, SwitchMode};
pub use self::popup::{PopupPosition, PopupProps};
pub use self::selection::{CalendarMode, OverRange, RangeSelection, Selection};
