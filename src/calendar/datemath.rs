use time::{format_description::FormatItem, macros::format_description, Date, Month};

/// Returns the number of days in `month` of `year`
pub const fn days_in_month(year: i32, month: Month) -> u8 {
    time::util::days_in_month(month, year)
}

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Short weekday names, indexed from Sunday
static WEEKDAY_NAMES: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

/// Returns the first day of the month containing `date`
pub fn start_of_month(date: Date) -> Date {
    // Every month has a first day
    date.replace_day(1).unwrap_or(date)
}

/// Moves `date` by `months` whole months.  If the day of the month does not
/// exist in the target month (e.g., January 31 plus one month), it is clamped
/// to the target month's last day.  Returns `None` if the result is outside
/// the range of representable dates.
pub fn add_months(date: Date, months: i32) -> Option<Date> {
    let index0 = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1;
    let target = index0.checked_add(i64::from(months))?;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(target.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(days_in_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}

/// Moves `date` by `years` whole years, clamping February 29 as necessary
pub fn add_years(date: Date, years: i32) -> Option<Date> {
    add_months(date, years.checked_mul(12)?)
}

pub fn is_same_day(a: Date, b: Option<Date>) -> bool {
    b == Some(a)
}

/// Number of calendar days spanned by `a` through `b`, counting both ends.  A
/// span from a day to itself is one day long.
pub fn diff_days_inclusive(a: Date, b: Date) -> i64 {
    (b - a).whole_days() + 1
}

/// Formats the month containing `date` as a panel title, e.g. "2024年7月"
pub fn format_title(date: Date) -> String {
    format!("{}年{}月", date.year(), u8::from(date.month()))
}

/// Formats `date` as `YYYY-MM-DD`
pub fn format_date(date: Date) -> String {
    date.to_string()
}

/// Parses a `YYYY-MM-DD` date.  Anything that does not parse is treated as
/// "no value".
pub fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), &YMD_FMT).ok()
}

/// Weekday labels for a calendar header whose first column is
/// `first_day_of_week` (0 = Sunday)
pub fn weekday_labels(first_day_of_week: u8) -> [&'static str; 7] {
    let first = usize::from(first_day_of_week % 7);
    std::array::from_fn(|i| WEEKDAY_NAMES[(first + i) % 7])
}
