//! Interactive menu over a finished [`RecordStore`].
//!
//! Each menu entry maps to a [`Command`]; the loop only reads a choice,
//! dispatches it and prints the result. Input and output are generic so the
//! menu can be driven from tests.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::chart::save_chart;
use crate::output::{export_csv, write_record};
use crate::store::{NameMatch, RecordStore, pick};
use crate::summary::summarize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ShowAll,
    ExportCsv,
    SearchId,
    SearchName,
    SaveChart,
    Exit,
}

impl Command {
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Command::ShowAll),
            "2" => Some(Command::ExportCsv),
            "3" => Some(Command::SearchId),
            "4" => Some(Command::SearchName),
            "5" => Some(Command::SaveChart),
            "6" => Some(Command::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'a, R, W> {
    store: &'a RecordStore,
    export_path: PathBuf,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a RecordStore, export_path: &Path, input: R, out: W) -> Self {
        Self {
            store,
            export_path: export_path.to_path_buf(),
            input,
            out,
        }
    }

    /// Runs until the user picks exit or the input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("Enter your choice [1-6]: ")? else {
                break;
            };

            match Command::from_choice(&choice) {
                Some(Command::Exit) => {
                    writeln!(self.out, "\nBye !\n")?;
                    break;
                }
                Some(command) => {
                    if !self.dispatch(command)? {
                        break;
                    }
                }
                None => writeln!(
                    self.out,
                    "\nBe nice, input correct number. {} is not an option provided.\n",
                    choice
                )?,
            }
        }
        Ok(())
    }

    /// Executes one command. Returns `false` when the input ended mid-command.
    pub fn dispatch(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::ShowAll => {
                for record in self.store.records() {
                    write_record(&mut self.out, record)?;
                    writeln!(self.out)?;
                }
            }
            Command::ExportCsv => match export_csv(&self.export_path, self.store) {
                Ok(()) => writeln!(self.out, "\nSaved {}", self.export_path.display())?,
                Err(e) => {
                    error!(error = %e, "CSV export failed");
                    writeln!(self.out, "\nCould not save CSV file: {}", e)?;
                }
            },
            Command::SearchId => {
                let Some(sid) = self.prompt("\nEnter user SID: ")? else {
                    return Ok(false);
                };
                match self.store.get_by_id(&sid) {
                    Ok(record) => write_record(&mut self.out, record)?,
                    Err(_) => writeln!(self.out, "\n Incorrect SID, no student with this ID")?,
                }
            }
            Command::SearchName => {
                let Some(name) = self.prompt("\nEnter user name: ")? else {
                    return Ok(false);
                };
                return self.search_name(&name);
            }
            Command::SaveChart => {
                let Some(name) = self.prompt("\nEnter file name <supported pdf, jpg, png>: ")?
                else {
                    return Ok(false);
                };
                let path = PathBuf::from(name);
                match save_chart(&summarize(self.store), &path) {
                    Ok(()) => writeln!(self.out, "\nSaved {}", path.display())?,
                    Err(e) => {
                        error!(error = %e, "Chart rendering failed");
                        writeln!(self.out, "\nCould not save chart: {}", e)?;
                    }
                }
            }
            Command::Exit => {}
        }
        Ok(true)
    }

    fn search_name(&mut self, name: &str) -> Result<bool> {
        let store = self.store;
        match store.find_by_last_name(name) {
            NameMatch::None => writeln!(self.out, "No entries found! \n")?,
            NameMatch::One(record) => write_record(&mut self.out, record)?,
            NameMatch::Many(records) => {
                writeln!(self.out, "{} MULTIPLE RECORDS {}", "-".repeat(30), "-".repeat(30))?;
                for (i, record) in records.iter().enumerate() {
                    writeln!(
                        self.out,
                        "{}. {} {} {}",
                        i + 1,
                        record.last_name(),
                        record.first_name(),
                        record.sid()
                    )?;
                }
                writeln!(self.out, "{}", "-".repeat(67))?;

                let Some(choice) = self.prompt("Enter user number: ")? else {
                    return Ok(false);
                };
                match choice.parse::<usize>().ok().and_then(|n| pick(&records, n)) {
                    Some(record) => write_record(&mut self.out, record)?,
                    None => writeln!(self.out, "\n{} is not a listed user number", choice)?,
                }
            }
        }
        Ok(true)
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n {} MENU {}", "-".repeat(30), "-".repeat(30))?;
        writeln!(self.out, "1. Show all output data")?;
        writeln!(self.out, "2. Save CSV file as <{}>", self.export_path.display())?;
        writeln!(self.out, "3. Search by SID")?;
        writeln!(self.out, "4. Search by Last Name")?;
        writeln!(self.out, "5. Print Graph")?;
        writeln!(self.out, "6. Exit")?;
        writeln!(self.out, "{}", "-".repeat(67))?;
        Ok(())
    }

    /// Prints `text` and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            info!("Input closed, leaving menu");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
