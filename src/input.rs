//! User input. The shell reads all input through the Input trait so that
//! tests can script it; the console implementation wraps a Rustyline editor.
//! The helpers below prompt in an unbounded retry loop until the input is
//! valid, and yield None at end of input (Ctrl-D), which unwinds the current
//! menu action.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use crate::error::Result;

/// A source of user input lines.
pub trait Input {
    /// Reads one line of input, prompting with the given string. Returns
    /// None at end of input.
    fn line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Console input via a Rustyline editor, with line editing and history.
pub struct Console {
    editor: Editor<(), DefaultHistory>,
}

impl Console {
    /// Creates a new console input.
    pub fn new() -> Result<Self> {
        Ok(Self { editor: Editor::new()? })
    }
}

impl Input for Console {
    fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        self.editor.add_history_entry(&line)?;
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Scripted input for tests: yields the given lines in order, then None.
pub struct Script(std::collections::VecDeque<String>);

impl Script {
    pub fn new(lines: &[&str]) -> Self {
        Self(lines.iter().map(|line| line.to_string()).collect())
    }
}

impl Input for Script {
    fn line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

/// Prompts for a non-empty text field of at most max characters.
pub fn text(input: &mut dyn Input, prompt: &str, max: usize) -> Result<Option<String>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        let line = line.trim();
        if line.is_empty() {
            println!("Input can't be empty.");
        } else if line.len() > max {
            println!("Input can't be longer than {max} characters.");
        } else {
            return Ok(Some(line.to_string()));
        }
    }
}

/// Prompts for a text field that must match one of the allowed values.
pub fn one_of(input: &mut dyn Input, prompt: &str, allowed: &[&str]) -> Result<Option<String>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        let line = line.trim();
        if allowed.contains(&line) {
            return Ok(Some(line.to_string()));
        }
        println!("Input must be one of: {}.", allowed.join(", "));
    }
}

/// Prompts for a non-negative integer.
pub fn int(input: &mut dyn Input, prompt: &str) -> Result<Option<i32>> {
    loop {
        match long(input, prompt)? {
            Some(n) => match i32::try_from(n) {
                Ok(n) => return Ok(Some(n)),
                Err(_) => println!("Input is too large."),
            },
            None => return Ok(None),
        }
    }
}

/// Prompts for a non-negative integer beyond int() range, e.g. a phone
/// number.
pub fn long(input: &mut dyn Input, prompt: &str) -> Result<Option<i64>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        match line.trim().parse::<i64>() {
            Ok(n) if n >= 0 => return Ok(Some(n)),
            Ok(_) => println!("Input must be a non-negative number."),
            Err(_) => println!("Input must be a number."),
        }
    }
}

/// Prompts for a date in MM/DD/YYYY format.
pub fn date(input: &mut dyn Input, prompt: &str) -> Result<Option<NaiveDate>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        match NaiveDate::parse_from_str(line.trim(), "%m/%d/%Y") {
            Ok(date) => return Ok(Some(date)),
            Err(_) => println!("Input must be a date in MM/DD/YYYY format."),
        }
    }
}

/// Prompts for a time of day in HH:MM format.
pub fn time(input: &mut dyn Input, prompt: &str) -> Result<Option<NaiveTime>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        match NaiveTime::parse_from_str(line.trim(), "%H:%M") {
            Ok(time) => return Ok(Some(time)),
            Err(_) => println!("Input must be a time in HH:MM format."),
        }
    }
}

/// Prompts for a date and time in MM/DD/YYYY HH:MM format.
pub fn datetime(input: &mut dyn Input, prompt: &str) -> Result<Option<NaiveDateTime>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        match NaiveDateTime::parse_from_str(line.trim(), "%m/%d/%Y %H:%M") {
            Ok(datetime) => return Ok(Some(datetime)),
            Err(_) => println!("Input must be a date and time in MM/DD/YYYY HH:MM format."),
        }
    }
}

/// Prompts for a y/n confirmation.
pub fn confirm(input: &mut dyn Input, prompt: &str) -> Result<Option<bool>> {
    loop {
        let Some(line) = input.line(prompt)? else { return Ok(None) };
        match line.trim() {
            "y" | "Y" => return Ok(Some(true)),
            "n" | "N" => return Ok(Some(false)),
            _ => println!("Please answer y or n."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn text_retries_until_valid() {
        // Empty and over-length inputs are rejected and re-prompted.
        let mut input = Script::new(&["", "this is too long", "ok"]);
        assert_eq!(text(&mut input, "> ", 8).unwrap(), Some("ok".to_string()));
    }

    #[test]
    fn text_trims_whitespace() {
        let mut input = Script::new(&["  Heat  "]);
        assert_eq!(text(&mut input, "> ", 8).unwrap(), Some("Heat".to_string()));
    }

    #[test]
    fn text_none_at_end_of_input() {
        let mut input = Script::new(&[""]);
        assert_eq!(text(&mut input, "> ", 8).unwrap(), None);
    }

    #[test]
    fn one_of_rejects_unknown_values() {
        let mut input = Script::new(&["Maybe", "Pending"]);
        let status = one_of(&mut input, "> ", &["Paid", "Canceled", "Pending"]).unwrap();
        assert_eq!(status, Some("Pending".to_string()));
    }

    #[test]
    fn int_retries_on_garbage() {
        let mut input = Script::new(&["x", "-1", "12.5", "42"]);
        assert_eq!(int(&mut input, "> ").unwrap(), Some(42));
    }

    #[test]
    fn int_rejects_out_of_range() {
        let mut input = Script::new(&["3000000000", "7"]);
        assert_eq!(int(&mut input, "> ").unwrap(), Some(7));
    }

    #[test]
    fn long_accepts_phone_numbers() {
        let mut input = Script::new(&["9314736096"]);
        assert_eq!(long(&mut input, "> ").unwrap(), Some(9314736096));
    }

    #[test]
    fn date_parses_mmddyyyy() {
        let mut input = Script::new(&["2020-03-14", "03/14/2020"]);
        assert_eq!(
            date(&mut input, "> ").unwrap(),
            Some(NaiveDate::from_ymd_opt(2020, 3, 14).unwrap())
        );
    }

    #[test]
    fn time_parses_hhmm() {
        let mut input = Script::new(&["25:00", "19:30"]);
        assert_eq!(
            time(&mut input, "> ").unwrap(),
            Some(NaiveTime::from_hms_opt(19, 30, 0).unwrap())
        );
    }

    #[test]
    fn datetime_parses() {
        let mut input = Script::new(&["03/14/2020 19:30"]);
        let expect = NaiveDate::from_ymd_opt(2020, 3, 14).unwrap().and_hms_opt(19, 30, 0).unwrap();
        assert_eq!(datetime(&mut input, "> ").unwrap(), Some(expect));
    }

    #[test]
    fn confirm_takes_y_or_n() {
        let mut input = Script::new(&["yes", "y"]);
        assert_eq!(confirm(&mut input, "> ").unwrap(), Some(true));
        let mut input = Script::new(&["N"]);
        assert_eq!(confirm(&mut input, "> ").unwrap(), Some(false));
    }

    #[test]
    fn script_exhaustion_is_end_of_input() {
        let mut input = Script::new(&[]);
        assert_eq!(input.line("> ").unwrap(), None);
        assert_eq!(int(&mut input, "> ").unwrap(), None);
        assert_eq!(confirm(&mut input, "> ").unwrap(), None);
    }
}
