use std::io::{self, BufRead, Write};

use crate::constants::{DEFAULT_LOCATION, MAX_PAST_DAYS};
use crate::error::ValidationError;
use crate::record::Hour;
use crate::vocab::{Selection, Sport, Vocabulary};

/// Keyword accepted at the hour prompt to undo the last entry
pub const DELETE_COMMAND: &str = "delete";

/// Answer to the first question of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    /// Remove the last stored row instead of logging a new one
    Delete,
    At { hour: Hour, past_days: u32 },
}

/// Parses `""`, `"H"` or `"H D"`; blank means `current` hour today
pub fn parse_time_input(input: &str, current: Hour) -> Result<TimeInput, ValidationError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case(DELETE_COMMAND) {
        return Ok(TimeInput::Delete);
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let (hour, day) = match parts.as_slice() {
        [] => {
            return Ok(TimeInput::At {
                hour: current,
                past_days: 0,
            })
        }
        [hour] => (*hour, None),
        [hour, day] => (*hour, Some(*day)),
        _ => return Err(ValidationError::TooManyValues),
    };

    let hour: i64 = hour.parse().map_err(|_| ValidationError::NotAnInteger)?;
    let hour = u8::try_from(hour)
        .ok()
        .and_then(Hour::new)
        .ok_or(ValidationError::HourOutOfRange(hour))?;

    let past_days = match day {
        None => 0,
        Some(day) => {
            let day: i64 = day.parse().map_err(|_| ValidationError::NotAnInteger)?;
            u32::try_from(day)
                .ok()
                .filter(|day| *day <= MAX_PAST_DAYS)
                .ok_or(ValidationError::DayOutOfRange {
                    day,
                    max: MAX_PAST_DAYS,
                })?
        }
    };

    Ok(TimeInput::At { hour, past_days })
}

/// Blank input falls back to the default location
pub fn parse_location(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        input.to_string()
    }
}

/// Parses a comma separated multi-select answer.
///
/// Each item is a 1-based index, a run of single-digit indices (`"13"`
/// selects the first and third option when there is no thirteenth), or an
/// option label. Blank input selects the group's default.
pub fn parse_selection<V: Vocabulary>(input: &str) -> Result<Selection<V>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Selection::with_default());
    }

    let mut selection = Selection::new();
    for item in input.split(',') {
        let item = item.trim().to_lowercase();
        if let Ok(index) = item.parse::<usize>() {
            if let Some(option) = V::from_index(index) {
                selection.insert(option);
                continue;
            }
            let options = item
                .chars()
                .map(|digit| {
                    digit
                        .to_digit(10)
                        .and_then(|digit| V::from_index(digit as usize))
                })
                .collect::<Option<Vec<V>>>()
                .ok_or_else(|| ValidationError::InvalidIndex(item.clone()))?;
            selection.extend(options);
        } else {
            let option = V::ALL
                .iter()
                .copied()
                .find(|option| option.label() == item)
                .ok_or(ValidationError::UnknownOption(item))?;
            selection.insert(option);
        }
    }
    Ok(selection)
}

/// `y` is yes; blank or `n` is no
pub fn parse_yes_no(input: &str) -> Result<bool, ValidationError> {
    match input.trim().to_lowercase().as_str() {
        "" | "n" => Ok(false),
        "y" => Ok(true),
        other => Err(ValidationError::InvalidAnswer(other.to_string())),
    }
}

/// Blank notes are stored as NULL
pub fn parse_note(input: &str) -> Option<String> {
    let input = input.trim();
    (!input.is_empty()).then(|| input.to_string())
}

/// Asks questions on `output` and reads answers line by line from `input`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints a line of text
    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line)
    }

    fn ask_until<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> io::Result<T> {
        loop {
            let answer = self.ask(prompt)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::debug!("Rejected input {:?}: {}", answer.trim(), err);
                    self.say(&err.to_string())?;
                }
            }
        }
    }

    pub fn time(&mut self, current: Hour) -> io::Result<TimeInput> {
        self.say(&format!(
            "Enter the hour (HH) or leave blank for current hour, and (optionally) how many days prior (max {});\n\
             e.g. if yesterday 4pm, type: 16 1",
            MAX_PAST_DAYS
        ))?;
        self.ask_until("- Enter the hour (and day if not today): ", |answer| {
            parse_time_input(answer, current)
        })
    }

    pub fn location(&mut self) -> io::Result<String> {
        let answer = self.ask(&format!(
            "- Enter the location (City, Country) or leave blank for {}: ",
            DEFAULT_LOCATION
        ))?;
        Ok(parse_location(&answer))
    }

    pub fn selection<V: Vocabulary>(&mut self) -> io::Result<Selection<V>> {
        let options = V::ALL
            .iter()
            .enumerate()
            .map(|(idx, option)| format!("{} {}", idx + 1, option.label()))
            .collect::<Vec<_>>()
            .join(", ");
        self.ask_until(&format!("- {} ({}): ", V::PROMPT, options), parse_selection::<V>)
    }

    pub fn sport(&mut self, sport: Sport) -> io::Result<bool> {
        self.ask_until(
            &format!("- Suitable for {} (y/N): ", sport.label()),
            parse_yes_no,
        )
    }

    pub fn note(&mut self) -> io::Result<Option<String>> {
        let answer = self.ask("- Other notes (optional): ")?;
        Ok(parse_note(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{Accessory, Activity, Bottoms, Footwear, Outerwear};
    use std::io::Cursor;

    fn hour(value: u8) -> Hour {
        Hour::new(value).unwrap()
    }

    #[test]
    fn blank_time_uses_current_hour_today() {
        assert_eq!(
            parse_time_input("  \n", hour(9)).unwrap(),
            TimeInput::At { hour: hour(9), past_days: 0 }
        );
    }

    #[test]
    fn time_accepts_hour_and_day_offset() {
        assert_eq!(
            parse_time_input("16 1", hour(0)).unwrap(),
            TimeInput::At { hour: hour(16), past_days: 1 }
        );
        assert_eq!(
            parse_time_input("0", hour(5)).unwrap(),
            TimeInput::At { hour: hour(0), past_days: 0 }
        );
        assert_eq!(parse_time_input("delete", hour(5)).unwrap(), TimeInput::Delete);
    }

    #[test]
    fn time_rejects_out_of_range_and_garbage() {
        assert_eq!(
            parse_time_input("24", hour(0)),
            Err(ValidationError::HourOutOfRange(24))
        );
        assert_eq!(
            parse_time_input("-1", hour(0)),
            Err(ValidationError::HourOutOfRange(-1))
        );
        assert_eq!(
            parse_time_input("12 93", hour(0)),
            Err(ValidationError::DayOutOfRange { day: 93, max: 92 })
        );
        assert_eq!(parse_time_input("noon", hour(0)), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_time_input("1 2 3", hour(0)), Err(ValidationError::TooManyValues));
    }

    #[test]
    fn blank_location_is_toronto() {
        assert_eq!(parse_location("\n"), "Toronto, Canada");
        assert_eq!(parse_location(" Oslo, Norway \n"), "Oslo, Norway");
    }

    #[test]
    fn blank_selection_applies_group_default() {
        assert!(parse_selection::<Outerwear>("").unwrap().is_empty());
        let bottoms = parse_selection::<Bottoms>("").unwrap();
        assert_eq!(bottoms.iter().collect::<Vec<_>>(), vec![Bottoms::Athletic]);
        let activity = parse_selection::<Activity>("\n").unwrap();
        assert_eq!(activity.iter().collect::<Vec<_>>(), vec![Activity::Walking]);
    }

    #[test]
    fn selection_mixes_indices_and_names() {
        let accessories = parse_selection::<Accessory>("3, Hat").unwrap();
        assert_eq!(
            accessories.iter().collect::<Vec<_>>(),
            vec![Accessory::Sunglasses, Accessory::Hat]
        );

        let outerwear = parse_selection::<Outerwear>("heavy jacket").unwrap();
        assert!(outerwear.contains(Outerwear::HeavyJacket));
    }

    #[test]
    fn selection_splits_concatenated_digits() {
        let outerwear = parse_selection::<Outerwear>("25").unwrap();
        assert_eq!(
            outerwear.iter().collect::<Vec<_>>(),
            vec![Outerwear::ThinSweater, Outerwear::Jacket]
        );
    }

    #[test]
    fn selection_rejects_unknown_items() {
        assert_eq!(
            parse_selection::<Footwear>("sandals"),
            Err(ValidationError::UnknownOption("sandals".into()))
        );
        assert_eq!(
            parse_selection::<Footwear>("0"),
            Err(ValidationError::InvalidIndex("0".into()))
        );
        assert_eq!(
            parse_selection::<Footwear>("19"),
            Err(ValidationError::InvalidIndex("19".into()))
        );
    }

    #[test]
    fn yes_no_defaults_to_no() {
        assert_eq!(parse_yes_no(""), Ok(false));
        assert_eq!(parse_yes_no("N"), Ok(false));
        assert_eq!(parse_yes_no("y\n"), Ok(true));
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn prompter_reasks_after_invalid_input() {
        let input = Cursor::new("shoes\n2\n");
        let mut output = Vec::new();
        let footwear = Prompter::new(input, &mut output)
            .selection::<Footwear>()
            .unwrap();

        assert_eq!(footwear.iter().collect::<Vec<_>>(), vec![Footwear::ColdRunning]);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Invalid option 'shoes'"));
        assert_eq!(printed.matches("- Footwear (").count(), 2);
    }

    #[test]
    fn prompter_reports_closed_input() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
        let err = prompter.sport(Sport::Running).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn prompter_reads_notes() {
        let mut prompter = Prompter::new(Cursor::new("windy by the lake\n"), Vec::new());
        assert_eq!(prompter.note().unwrap().as_deref(), Some("windy by the lake"));
    }
}
