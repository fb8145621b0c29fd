use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        }
    }

    fn previous(self) -> Self {
        match self {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        }
    }
}

/// Segment-by-segment editor for the issue date.
///
/// Digits are collected for the selected part and applied once the part is
/// complete; combinations that are not a real date are ignored.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    digits: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            digits: String::new(),
        }
    }

    /// Start from the text already on the invoice, or `fallback` when it is
    /// not a `YYYY-MM-DD` date.
    pub fn from_text(text: &str, fallback: NaiveDate) -> Self {
        Self::new(NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").unwrap_or(fallback))
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        self.date_part = DatePart::Year;
        self.digits.clear();
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
        self.digits.clear();
    }

    pub fn as_text(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    fn apply_digits(&mut self) {
        let Ok(value) = self.digits.parse::<u32>() else {
            return;
        };
        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => self.date.with_year(value as i32),
            DatePart::Month => self.date.with_month(value),
            DatePart::Day => self.date.with_day(value),
            DatePart::Year => None,
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    fn step(&mut self, forward: bool) {
        let sign = if forward { 1 } else { -1 };
        let candidate = match self.date_part {
            DatePart::Year => self.date.with_year(self.date.year() + sign),
            DatePart::Month => {
                let month0 = (self.date.month0() as i32 + sign).rem_euclid(12) as u32;
                self.date.with_month0(month0)
            }
            DatePart::Day => self.date.checked_add_signed(Duration::days(sign as i64)),
        };
        if let Some(date) = candidate {
            self.date = date;
        }
    }

    /// Returns true when the date changed.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if !self.editing {
            return false;
        }

        let before = self.date;
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.digits.push(c);
                if self.digits.len() == self.date_part.width() {
                    self.apply_digits();
                    self.digits.clear();
                }
            }
            KeyCode::Backspace => {
                self.digits.pop();
            }
            KeyCode::Right | KeyCode::Tab => {
                self.date_part = self.date_part.next();
                self.digits.clear();
            }
            KeyCode::Left => {
                self.date_part = self.date_part.previous();
                self.digits.clear();
            }
            KeyCode::Up => self.step(true),
            KeyCode::Down => self.step(false),
            _ => {}
        }
        self.date != before
    }

    pub fn get_display_string(&self) -> String {
        let year = format!("{:04}", self.date.year());
        let month = format!("{:02}", self.date.month());
        let day = format!("{:02}", self.date.day());
        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let marker = if self.digits.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.digits)
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, marker, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, marker, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, marker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(y: i32, m: u32, d: u32) -> DateInputState {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        state.start_editing();
        state
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_each_part_sets_the_date() {
        let mut state = editing(2024, 7, 15);
        type_digits(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "03");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "09");
        assert_eq!(state.as_text(), "2025-03-09");
    }

    #[test]
    fn impossible_dates_are_ignored() {
        let mut state = editing(2024, 1, 31);
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "02");
        assert_eq!(state.as_text(), "2024-01-31");

        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "32");
        assert_eq!(state.as_text(), "2024-01-31");
    }

    #[test]
    fn arrows_step_the_selected_part() {
        let mut state = editing(2024, 12, 31);
        state.handle_input(KeyCode::Left);
        assert!(state.handle_input(KeyCode::Up));
        assert_eq!(state.as_text(), "2025-01-01");

        state.handle_input(KeyCode::Left);
        state.handle_input(KeyCode::Down);
        assert_eq!(state.as_text(), "2025-12-01");
    }

    #[test]
    fn ignores_keys_when_not_editing() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert!(!state.handle_input(KeyCode::Up));
        assert_eq!(state.get_display_string(), "2024-07-15");
    }

    #[test]
    fn display_marks_the_part_being_typed() {
        let mut state = editing(2024, 7, 15);
        assert_eq!(state.get_display_string(), "2024[YYYY]-07-15");
        state.handle_input(KeyCode::Right);
        state.handle_input(KeyCode::Char('1'));
        assert_eq!(state.get_display_string(), "2024-07[1]-15");
    }

    #[test]
    fn unparseable_text_falls_back() {
        let fallback = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(DateInputState::from_text("soon", fallback).date, fallback);
        assert_eq!(DateInputState::from_text("2023-05-06", fallback).as_text(), "2023-05-06");
    }
}
