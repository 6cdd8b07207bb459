use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use crossterm::cursor::{MoveDown, MoveLeft, MoveRight, MoveUp};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};

use crate::display::text::truncate;
use crate::job::JobList;

/// Fixed terminal rows, one per job, below which the cursor rests
///
/// Each job owns the row given by its position. The cursor stays on the
/// line after the last lane between updates.
#[derive(Debug)]
pub struct Lanes {
    rows: HashMap<Arc<str>, usize>,
    count: usize,
    /// Column where lane text starts, after `<name>: `
    text_column: u16,
    columns: u16,
}

impl Lanes {
    pub fn new(jobs: &JobList, columns: u16) -> Self {
        let rows = jobs
            .iter()
            .map(|job| (Arc::clone(job.name()), job.position()))
            .collect();
        let text_column = u16::try_from(jobs.longest_name() + 2).unwrap_or(u16::MAX);
        Self {
            rows,
            count: jobs.len(),
            text_column,
            columns,
        }
    }

    /// Row assigned to a job
    pub fn row(&self, job: &str) -> Option<usize> {
        self.rows.get(job).copied()
    }

    /// Columns left for lane text
    pub fn text_width(&self) -> usize {
        usize::from(self.columns).saturating_sub(usize::from(self.text_column) + 2)
    }

    /// Reserve one line per job, in job order
    pub fn reserve<W: Write>(out: &mut W, jobs: &JobList) -> io::Result<()> {
        for job in jobs.iter() {
            queue!(out, Print(format!("{}: \n", job.name())))?;
        }
        out.flush()
    }

    /// Replace the text of a job's lane, leaving other lanes untouched
    ///
    /// Unknown jobs are ignored.
    pub fn write<W: Write>(&self, out: &mut W, job: &str, text: &str) -> io::Result<()> {
        let Some(row) = self.row(job) else {
            return Ok(());
        };
        let distance = u16::try_from(self.count - row).unwrap_or(u16::MAX);
        queue!(
            out,
            MoveUp(distance),
            MoveRight(self.text_column),
            Clear(ClearType::UntilNewLine),
            SetAttribute(Attribute::Reset),
            Print(truncate(text, self.text_width())),
            MoveDown(distance),
            MoveLeft(self.columns.saturating_add(1)),
        )?;
        out.flush()
    }
}
