//! Numbered query menu over a finished tree.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::{engine::FamilyTree, scenario::ReportConfig};

const PROMPT: &str = "(1) Total number of people in Family Tree\n\
                      (2) Total number of people in the tree by decade\n\
                      (3) Duplicate Names\n\
                      (4) Exit\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    TotalCount,
    CountByDecade,
    DuplicateNames,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("Invalid input '{0}'. Please enter a valid option.")]
    InvalidOption(String),
}

impl FromStr for MenuCommand {
    type Err = MenuError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        match trimmed {
            "1" => Ok(MenuCommand::TotalCount),
            "2" => Ok(MenuCommand::CountByDecade),
            "3" => Ok(MenuCommand::DuplicateNames),
            "4" => Ok(MenuCommand::Exit),
            other if other.eq_ignore_ascii_case("exit") => Ok(MenuCommand::Exit),
            other => Err(MenuError::InvalidOption(other.to_string())),
        }
    }
}

pub struct Menu<'a> {
    tree: &'a FamilyTree,
    report: &'a ReportConfig,
}

impl<'a> Menu<'a> {
    pub fn new(tree: &'a FamilyTree, report: &'a ReportConfig) -> Self {
        Self { tree, report }
    }

    /// Prompts and answers until the user exits or input ends.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and rejected as invalid options.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("menu input closed");
                return Ok(());
            }
            match String::from_utf8_lossy(&buf).parse::<MenuCommand>() {
                Ok(MenuCommand::Exit) => {
                    writeln!(output, "Exiting...")?;
                    return Ok(());
                }
                Ok(command) => self.answer(command, &mut output)?,
                Err(err) => writeln!(output, "{err}")?,
            }
        }
    }

    pub fn answer<W: Write>(&self, command: MenuCommand, output: &mut W) -> io::Result<()> {
        let query = self.tree.query();
        match command {
            MenuCommand::TotalCount => {
                writeln!(
                    output,
                    "Total number of people in Family Tree: {}",
                    query.total_count()
                )?;
            }
            MenuCommand::CountByDecade => {
                let histogram =
                    query.count_by_decade(self.report.histogram_start, self.report.histogram_end);
                for bucket in histogram {
                    writeln!(
                        output,
                        "Total number of people in the tree born in the {}: {}",
                        bucket.label(),
                        bucket.count
                    )?;
                }
            }
            MenuCommand::DuplicateNames => {
                let duplicates = query.duplicate_full_names();
                if duplicates.is_empty() {
                    writeln!(output, "No duplicate names found.")?;
                } else {
                    writeln!(output, "Duplicate names found:")?;
                    for (name, count) in duplicates {
                        writeln!(output, " - {name}: {count}")?;
                    }
                }
            }
            MenuCommand::Exit => {}
        }
        Ok(())
    }
}
