use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use crate::widget::CalendarPopup;
use calpick::calendar::datemath::{add_months, add_years, format_date, start_of_month};
use calpick::calendar::{OverRange, PopupPosition, RangeSelection};
use calpick::{
    CalendarCallbacks, CalendarConfig, CalendarController, DayCell, DayClassification, MonthUnit,
    Selection,
};
use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;
use time::{Date, Duration};

/// Lines at the top of the screen showing the committed value, key hints, and
/// the status message
const SUMMARY_LINES: u16 = 3;

#[derive(Debug)]
pub(crate) struct App {
    calendar: CalendarController,
    cursor: Date,
    events: Rc<HostEvents>,
    state: AppState,
}

impl App {
    pub(crate) fn new(config: CalendarConfig, today: Date) -> App {
        let events = Rc::new(HostEvents::default());
        let calendar = CalendarController::new(config, today, host_callbacks(&events))
            .with_formatter(range_labels);
        let mut app = App {
            calendar,
            cursor: today,
            events,
            state: AppState::Calendar,
        };
        app.reset_cursor();
        app
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key or the key's action
    // was refused
    fn handle_key(&mut self, key: KeyCode) -> bool {
        let handled = match &mut self.state {
            AppState::Calendar if self.calendar.is_shown() => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-7),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(7),
                KeyCode::Char('[') => self.change_month(-1, MonthUnit::Month),
                KeyCode::Char(']') => self.change_month(1, MonthUnit::Month),
                KeyCode::Char('{') => self.change_month(-1, MonthUnit::Year),
                KeyCode::Char('}') => self.change_month(1, MonthUnit::Year),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.calendar.tap(self.cursor);
                    true
                }
                KeyCode::Char('c') => self.calendar.confirm(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Esc => {
                    self.press_overlay();
                    true
                }
                _ => false,
            },
            AppState::Calendar => match key {
                KeyCode::Char('o') | KeyCode::Enter => {
                    self.open();
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c @ '0'..='9') => {
                            let d = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
                            match d {
                                Some(d) => state.handle_input(JumpToInput::Digit(d)),
                                None => JumpToOutput::Invalid,
                            }
                        }
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            self.jump_to(date)
                        }
                    }
                }
            }
            AppState::Quitting => false,
        };
        self.close_if_confirmed();
        handled
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn open(&mut self) {
        log::debug!("Opening date picker");
        self.events.clear_status();
        self.calendar.set_visible(true);
        self.reset_cursor();
    }

    fn press_overlay(&mut self) {
        if self.calendar.config().poppable {
            self.calendar.overlay_pressed();
            if self.calendar.popup_props().close_on_click_overlay {
                self.calendar.set_visible(false);
            }
        } else {
            self.state = AppState::Quitting;
        }
    }

    /// A confirmed selection closes the popup, as a mobile host would on
    /// receiving the confirm callback
    fn close_if_confirmed(&mut self) {
        if self.events.confirmed.take() && self.calendar.config().poppable {
            self.calendar.set_visible(false);
        }
    }

    /// Puts the cursor on the first selected day if it is on screen, else on
    /// today if it is on screen, else on the first day shown
    fn reset_cursor(&mut self) {
        let candidates = [self.calendar.selection().first_date(), Some(self.calendar.today())];
        let months = self.calendar.months();
        let on_screen = |date: &Date| months.iter().any(|m| m.contains(*date));
        if let Some(date) = candidates.into_iter().flatten().find(on_screen) {
            self.cursor = date;
        } else if let Some(cell) = months.first().and_then(|m| m.cells().next()) {
            self.cursor = cell.date;
        }
    }

    fn on_screen(&mut self, date: Date) -> bool {
        self.calendar.months().iter().any(|m| m.contains(date))
    }

    /// Moves the cursor to `target`, paging the calendar if `target` is in
    /// the previous or next month
    fn move_cursor_to(&mut self, target: Date) -> bool {
        if let Some(anchor) = self.calendar.anchor() {
            let month = start_of_month(target);
            if month != anchor {
                let delta = if month > anchor { 1 } else { -1 };
                if !self.calendar.change_month(delta, MonthUnit::Month) {
                    return false;
                }
            }
        } else if !self.on_screen(target) {
            return false;
        }
        self.cursor = target;
        true
    }

    fn move_cursor(&mut self, days: i64) -> bool {
        match self.cursor.checked_add(Duration::days(days)) {
            Some(target) => self.move_cursor_to(target),
            None => false,
        }
    }

    fn change_month(&mut self, delta: i32, unit: MonthUnit) -> bool {
        let target = match unit {
            MonthUnit::Month => add_months(self.cursor, delta),
            MonthUnit::Year => add_years(self.cursor, delta),
        };
        let Some(target) = target else {
            return false;
        };
        if self.calendar.anchor().is_some() {
            if !self.calendar.change_month(delta, unit) {
                return false;
            }
            self.cursor = target;
            true
        } else {
            self.move_cursor_to(target)
        }
    }

    fn jump_to(&mut self, date: Date) -> bool {
        if self.calendar.scroll_to_date(date).is_some() {
            self.cursor = date;
            true
        } else {
            self.events
                .set_status(format!("{} is out of range", format_date(date)));
            false
        }
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let value = format!("Selected: {}", describe(self.calendar.committed()));
        let hint = if self.calendar.is_shown() {
            "Press ? for help, q to quit"
        } else {
            "Press o to pick a date, ? for help, q to quit"
        };
        let mut lines = vec![Line::styled(value, BASE_STYLE), Line::styled(hint, BASE_STYLE)];
        if let Some(status) = self.events.status.borrow().clone() {
            lines.push(Line::styled(status, STATUS_STYLE));
        }
        for (y, line) in std::iter::zip(area.top().., lines) {
            if y < area.bottom() {
                line.render(Rect { y, height: 1, ..area }, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [summary_area, main_area] =
            Layout::vertical([Constraint::Length(SUMMARY_LINES), Constraint::Min(0)]).areas(area);
        self.render_summary(summary_area, buf);
        if self.calendar.is_shown() {
            let labels = self.calendar.weekday_labels();
            let today = self.calendar.today();
            let props = self.calendar.popup_props();
            let poppable = self.calendar.config().poppable;
            let show_confirm = self.calendar.config().show_confirm;
            let can_confirm = self.calendar.can_confirm();
            let cursor = self.cursor;
            let status = self.events.status.borrow();
            let months = self.calendar.months();
            let month = months
                .iter()
                .find(|m| m.contains(cursor))
                .or_else(|| months.first());
            if let Some(month) = month {
                let mut popup = CalendarPopup::new(month, labels, today)
                    .cursor(cursor)
                    .round(props.round)
                    .status(status.as_deref());
                if show_confirm {
                    popup = popup.confirm_button(can_confirm);
                }
                let popup_area = if poppable {
                    popup.place(area, props.position)
                } else {
                    popup.place(main_area, PopupPosition::Center)
                };
                popup.render(popup_area, buf);
            }
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}

/// What the calendar's callbacks report back to the app
#[derive(Debug, Default)]
struct HostEvents {
    status: RefCell<Option<String>>,
    confirmed: Cell<bool>,
}

impl HostEvents {
    fn set_status(&self, msg: String) {
        *self.status.borrow_mut() = Some(msg);
    }

    fn clear_status(&self) {
        *self.status.borrow_mut() = None;
    }
}

fn host_callbacks(events: &Rc<HostEvents>) -> CalendarCallbacks {
    let on_select = Rc::clone(events);
    let on_confirm = Rc::clone(events);
    let on_over_range = Rc::clone(events);
    let on_disabled = Rc::clone(events);
    CalendarCallbacks::new()
        .on_select(move |_: &Selection| on_select.clear_status())
        .on_confirm(move |sel: &Selection| {
            log::info!("Confirmed selection: {}", describe(sel));
            on_confirm.confirmed.set(true);
            on_confirm.set_status(format!("Confirmed {}", describe(sel)));
        })
        .on_over_range(move |over: &OverRange| {
            on_over_range.set_status(format!(
                "Cannot select more than {} days",
                over.max_range
            ));
        })
        .on_click_disabled_date(move |date| {
            on_disabled.set_status(format!("{} is not selectable", format_date(date)));
        })
}

/// Marks the ends of a range beneath their days
fn range_labels(cell: &mut DayCell) {
    let info = match cell.classification {
        DayClassification::Start => "开始",
        DayClassification::End => "结束",
        DayClassification::StartEnd => "当天",
        _ => return,
    };
    cell.bottom_info = Some(String::from(info));
}

fn describe(selection: &Selection) -> String {
    if selection.is_empty() {
        return String::from("nothing");
    }
    match selection {
        Selection::Single(Some(date)) => format_date(*date),
        Selection::Multiple(dates) => dates
            .iter()
            .map(|&d| format_date(d))
            .collect::<Vec<_>>()
            .join(", "),
        Selection::Range(RangeSelection::Started(start)) => {
            format!("{} to ?", format_date(*start))
        }
        Selection::Range(RangeSelection::Completed(start, end)) => {
            format!("{} to {}", format_date(*start), format_date(*end))
        }
        _ => String::from("nothing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calpick::{CalendarMode, SwitchMode};
    use time::macros::date;

    const TODAY: Date = date!(2024 - 07 - 15);

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    fn press(app: &mut App, keys: &str) {
        for ch in keys.chars() {
            assert!(app.handle_key(KeyCode::Char(ch)), "key {ch:?} was refused");
        }
    }

    #[test]
    fn test_summary() {
        let mut app = App::new(
            CalendarConfig {
                default_date: vec![date!(2024 - 07 - 04)],
                ..CalendarConfig::default()
            },
            TODAY,
        );
        let area = Rect::new(0, 0, 50, 3);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "Selected: 2024-07-04                              ",
            "Press o to pick a date, ? for help, q to quit     ",
            "                                                  ",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_pick_and_confirm() {
        let mut app = App::new(CalendarConfig::default(), TODAY);
        press(&mut app, "o");
        assert!(app.calendar.is_shown());
        assert_eq!(app.cursor, TODAY);
        press(&mut app, "ll ");
        assert_eq!(app.calendar.selection(), &Selection::Single(Some(date!(2024 - 07 - 17))));
        assert_eq!(app.calendar.committed(), &Selection::Single(None));
        press(&mut app, "c");
        assert!(!app.calendar.is_shown());
        assert_eq!(
            app.calendar.committed(),
            &Selection::Single(Some(date!(2024 - 07 - 17)))
        );
        assert_eq!(
            app.events.status.borrow().as_deref(),
            Some("Confirmed 2024-07-17")
        );
    }

    #[test]
    fn test_auto_confirm_closes() {
        let mut app = App::new(
            CalendarConfig {
                show_confirm: false,
                ..CalendarConfig::default()
            },
            TODAY,
        );
        press(&mut app, "oj ");
        assert!(!app.calendar.is_shown());
        assert_eq!(
            app.calendar.committed(),
            &Selection::Single(Some(date!(2024 - 07 - 22)))
        );
    }

    #[test]
    fn test_escape_discards() {
        let mut app = App::new(CalendarConfig::default(), TODAY);
        press(&mut app, "o ");
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.calendar.is_shown());
        assert_eq!(app.calendar.committed(), &Selection::Single(None));
        press(&mut app, "o");
        assert_eq!(app.calendar.selection(), &Selection::Single(None));
    }

    #[test]
    fn test_over_range_status() {
        let mut app = App::new(
            CalendarConfig {
                mode: CalendarMode::Range,
                max_range: Some(3),
                ..CalendarConfig::default()
            },
            TODAY,
        );
        press(&mut app, "o llll ");
        assert_eq!(
            app.events.status.borrow().as_deref(),
            Some("Cannot select more than 3 days")
        );
        assert_eq!(
            app.calendar.selection(),
            &Selection::Range(RangeSelection::Started(TODAY))
        );
        assert!(!app.handle_key(KeyCode::Char('c')));
    }

    #[test]
    fn test_cursor_stops_at_bounds() {
        let mut app = App::new(
            CalendarConfig {
                min_date: Some(date!(2024 - 07 - 01)),
                max_date: Some(date!(2024 - 07 - 31)),
                ..CalendarConfig::default()
            },
            TODAY,
        );
        press(&mut app, "o");
        assert!(!app.handle_key(KeyCode::Char(']')));
        assert!(!app.handle_key(KeyCode::Char('}')));
        press(&mut app, "jjl");
        assert_eq!(app.cursor, date!(2024 - 07 - 30));
        press(&mut app, "l");
        assert!(!app.handle_key(KeyCode::Char('l')));
        assert_eq!(app.cursor, date!(2024 - 07 - 31));
    }

    #[test]
    fn test_paging_moves_cursor() {
        let mut app = App::new(CalendarConfig::default(), date!(2024 - 01 - 31));
        press(&mut app, "o]");
        assert_eq!(app.calendar.anchor(), Some(date!(2024 - 02 - 01)));
        assert_eq!(app.cursor, date!(2024 - 02 - 29));
        press(&mut app, "l");
        assert_eq!(app.calendar.anchor(), Some(date!(2024 - 03 - 01)));
        // Year paging needs the year-month switch mode
        assert!(!app.handle_key(KeyCode::Char('{')));
    }

    #[test]
    fn test_continuous_cursor() {
        let mut app = App::new(
            CalendarConfig {
                switch_mode: SwitchMode::None,
                poppable: false,
                ..CalendarConfig::default()
            },
            TODAY,
        );
        assert!(app.calendar.is_shown());
        assert_eq!(app.cursor, TODAY);
        press(&mut app, "]]]]]]");
        assert_eq!(app.cursor, date!(2025 - 01 - 15));
        assert!(!app.handle_key(KeyCode::Char(']')));
        press(&mut app, "h");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(
            app.calendar.selection(),
            &Selection::Single(Some(date!(2025 - 01 - 14)))
        );
        assert!(app.handle_key(KeyCode::Esc));
        assert!(app.quitting());
    }

    #[test]
    fn test_jump() {
        let mut app = App::new(
            CalendarConfig {
                max_date: Some(date!(2024 - 12 - 31)),
                ..CalendarConfig::default()
            },
            TODAY,
        );
        press(&mut app, "og20241105");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.cursor, date!(2024 - 11 - 05));
        assert_eq!(app.calendar.anchor(), Some(date!(2024 - 11 - 01)));
        press(&mut app, "g20250105");
        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.cursor, date!(2024 - 11 - 05));
        assert_eq!(
            app.events.status.borrow().as_deref(),
            Some("2025-01-05 is out of range")
        );
    }

    #[test]
    fn test_render_popup() {
        let mut app = App::new(
            CalendarConfig {
                mode: CalendarMode::Range,
                ..CalendarConfig::default()
            },
            TODAY,
        );
        press(&mut app, "o l ");
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        // The popup slides up from the bottom: 5 weeks plus the header,
        // status line, and confirm button
        assert_eq!(row(&buffer, 0), format!("{:<80}", "Selected: nothing"));
        assert_eq!(row(&buffer, 6).trim(), format!("╭{}╮", "─".repeat(78)));
        let week = row(&buffer, 14);
        assert!(week.contains("  14   15  [16]  17 "), "{week:?}");
        let info = row(&buffer, 15);
        assert!(info.starts_with("│"), "{info:?}");
        assert_eq!(info.trim_matches(|c| c == '│' || c == ' '), "开 始  结 束");
    }
}
