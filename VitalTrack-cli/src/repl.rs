//! Command loop for the journal terminal.
//!
//! Lines from stdin are parsed into [`Command`] values and executed against
//! the shared [`ReadingStore`] and [`UndoController`]. Execution returns the
//! text to print so the loop itself stays trivial and the behavior is easy
//! to test without a terminal.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;

use vital_track_domain::entities::{
    CreateReadingRequest, DailyAverage, Reading, ReadingForm, VitalField,
};
use vital_track_domain::services::aggregation;
use vital_track_domain::services::{ReadingStore, StoreError, UndoController};
use vital_track_domain::storage::ReadingStorage;

/// A single parsed journal command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a new reading from raw form fields
    Add(Box<ReadingForm>),
    /// Show every reading with its 1-based position
    List,
    /// Daily averages for the given date
    Average(NaiveDate),
    /// Dump the chart series as JSON
    Chart,
    /// Delete the reading at a 1-based position
    Delete(usize),
    /// Restore the most recently deleted reading
    Undo,
    Help,
    Quit,
}

/// Parses one input line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err("Type 'help' for the list of commands".to_string());
    };
    let args: Vec<&str> = tokens.collect();

    match keyword.to_ascii_lowercase().as_str() {
        "add" => parse_add(&args),
        "list" | "ls" => Ok(Command::List),
        "avg" | "average" => parse_average(&args),
        "chart" => Ok(Command::Chart),
        "delete" | "del" | "rm" => parse_delete(&args),
        "undo" => Ok(Command::Undo),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!(
            "Unknown command '{other}'. Type 'help' for the list of commands"
        )),
    }
}

fn parse_add(args: &[&str]) -> Result<Command, String> {
    if args.len() != 5 && args.len() != 8 {
        return Err(
            "Usage: add <date> <time> <sys> <dia> <hr> [sys2 dia2 hr2], \
             e.g. add 2024-03-01 morning 120 80 72"
                .to_string(),
        );
    }

    let mut form = ReadingForm {
        date: args[0].to_string(),
        time: args[1].to_string(),
        systolic: args[2].to_string(),
        diastolic: args[3].to_string(),
        heart_rate: args[4].to_string(),
        ..ReadingForm::default()
    };
    if args.len() == 8 {
        form.second_systolic = Some(args[5].to_string());
        form.second_diastolic = Some(args[6].to_string());
        form.second_heart_rate = Some(args[7].to_string());
    }

    Ok(Command::Add(Box::new(form)))
}

fn parse_average(args: &[&str]) -> Result<Command, String> {
    let date = match args.first() {
        None => Local::now().date_naive(),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("'{raw}' is not a valid date, expected YYYY-MM-DD"))?,
    };
    Ok(Command::Average(date))
}

fn parse_delete(args: &[&str]) -> Result<Command, String> {
    let Some(raw) = args.first() else {
        return Err("Usage: delete <position>, e.g. delete 2".to_string());
    };
    let position = raw
        .parse::<usize>()
        .map_err(|_| format!("'{raw}' is not a valid position, expected a number"))?;
    Ok(Command::Delete(position))
}

/// Executes commands against the shared store and undo controller.
pub struct Repl<S: ReadingStorage> {
    store: Arc<Mutex<ReadingStore<S>>>,
    undo: UndoController<S>,
}

impl<S: ReadingStorage> Repl<S> {
    pub fn new(store: Arc<Mutex<ReadingStore<S>>>, undo: UndoController<S>) -> Self {
        Self { store, undo }
    }

    /// Runs one command and returns the text to print plus whether the
    /// loop should exit afterwards.
    pub async fn execute(&self, command: Command) -> (String, bool) {
        match command {
            Command::Add(form) => (self.add(*form).await, false),
            Command::List => (self.list().await, false),
            Command::Average(date) => (self.average(date).await, false),
            Command::Chart => (self.chart().await, false),
            Command::Delete(position) => (self.delete(position).await, false),
            Command::Undo => (self.undo_last().await, false),
            Command::Help => (help_text().to_string(), false),
            Command::Quit => ("Goodbye".to_string(), true),
        }
    }

    async fn add(&self, form: ReadingForm) -> String {
        let request = match CreateReadingRequest::try_from(form) {
            Ok(request) => request,
            Err(message) => return message,
        };

        let mut store = self.store.lock().await;
        match store.append(request).await {
            Ok(()) => format!(
                "Recorded. The journal now holds {}",
                count_label(store.len())
            ),
            Err(err) => err.to_string(),
        }
    }

    async fn list(&self) -> String {
        let store = self.store.lock().await;
        let readings = store.all();
        if readings.is_empty() {
            return "The journal is empty".to_string();
        }

        let rows: Vec<String> = readings
            .iter()
            .enumerate()
            .map(|(index, reading)| format_row(index + 1, reading))
            .collect();
        rows.join("\n")
    }

    async fn average(&self, date: NaiveDate) -> String {
        let store = self.store.lock().await;
        let average = aggregation::daily_average(store.all(), date);
        if average == DailyAverage::ZERO {
            return format!("No readings recorded on {date}");
        }

        format!(
            "Average for {}: {}/{} mmHg, {} bpm [{}]",
            date,
            average.systolic,
            average.diastolic,
            average.heart_rate,
            aggregation::categorize(average.systolic, average.diastolic),
        )
    }

    async fn chart(&self) -> String {
        let store = self.store.lock().await;
        let series = aggregation::chart_series(store.all());
        serde_json::to_string_pretty(&series)
            .unwrap_or_else(|err| format!("Could not render the chart series: {err}"))
    }

    async fn delete(&self, position: usize) -> String {
        let Some(index) = position.checked_sub(1) else {
            return "Positions start at 1".to_string();
        };

        match self.undo.delete(index).await {
            Ok(reading) => format!(
                "Deleted the {} reading from {}. Type 'undo' within {} seconds to restore it",
                reading.time,
                reading.date,
                self.undo.window().as_secs(),
            ),
            Err(StoreError::IndexOutOfRange { len, .. }) => format!(
                "Position {position} does not exist, the journal holds {}",
                count_label(len)
            ),
            Err(err) => err.to_string(),
        }
    }

    async fn undo_last(&self) -> String {
        match self.undo.undo().await {
            Ok(true) => "Restored the deleted reading to its original position".to_string(),
            Ok(false) => "Nothing to undo".to_string(),
            Err(err) => err.to_string(),
        }
    }
}

fn format_row(position: usize, reading: &Reading) -> String {
    let systolic = aggregation::combined_value(reading, VitalField::Systolic);
    let diastolic = aggregation::combined_value(reading, VitalField::Diastolic);
    let heart_rate = aggregation::combined_value(reading, VitalField::HeartRate);
    let category = aggregation::categorize(systolic, diastolic);
    let sets = if reading.second.is_some() { " (2 sets)" } else { "" };

    let time = reading.time.to_string();
    format!(
        "{:>3}) {} {:<7} {}/{} mmHg, {} bpm [{}]{}",
        position, reading.date, time, systolic, diastolic, heart_rate, category, sets,
    )
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "1 reading".to_string()
    } else {
        format!("{count} readings")
    }
}

pub fn help_text() -> &'static str {
    "Commands:
  add <date> <time> <sys> <dia> <hr> [sys2 dia2 hr2]
                  Record a reading, e.g. add 2024-03-01 morning 120 80 72
  list            Show every reading with its position
  avg [date]      Daily averages for a date (YYYY-MM-DD), default today
  chart           Dump the chart series as JSON
  delete <n>      Remove the reading at position <n>
  undo            Restore the most recently deleted reading
  help            Show this message
  quit            Exit the journal"
}
