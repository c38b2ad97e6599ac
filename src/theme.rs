use calpick::DayClassification;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

pub(crate) const SELECTED_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::LightCyan)
    .add_modifier(Modifier::BOLD);

pub(crate) const RANGE_MIDDLE_STYLE: Style = Style::new().fg(Color::LightCyan).bg(Color::DarkGray);

pub(crate) const DISABLED_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const INFO_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const BUTTON_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

pub(crate) const BUTTON_DISABLED_STYLE: Style = DISABLED_STYLE;

pub(crate) fn day_style(classification: DayClassification) -> Style {
    match classification {
        DayClassification::None => BASE_STYLE,
        DayClassification::Selected
        | DayClassification::Start
        | DayClassification::End
        | DayClassification::StartEnd
        | DayClassification::MultipleSelected => SELECTED_STYLE,
        DayClassification::Middle => RANGE_MIDDLE_STYLE,
        DayClassification::Disabled => DISABLED_STYLE,
    }
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
