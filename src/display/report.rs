use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::chunk::RECAP_MARKER;

/// Timings and report entries collected while jobs run
#[derive(Debug, Default)]
pub struct RunState {
    starts: HashMap<Arc<str>, Instant>,
    ends: HashMap<Arc<str>, Instant>,
    active: HashSet<Arc<str>>,
    /// Jobs in the order their first report entry arrived
    report_order: Vec<Arc<str>>,
    entries: HashMap<Arc<str>, Vec<String>>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, job: &Arc<str>) {
        self.starts.insert(Arc::clone(job), Instant::now());
        self.active.insert(Arc::clone(job));
    }

    pub fn finish(&mut self, job: &Arc<str>) {
        self.ends.insert(Arc::clone(job), Instant::now());
        self.active.remove(job);
    }

    /// Keep a RECAP or ERROR payload for the final report
    pub fn record(&mut self, job: &Arc<str>, payload: String) {
        self.entries
            .entry(Arc::clone(job))
            .or_insert_with(|| {
                self.report_order.push(Arc::clone(job));
                Vec::new()
            })
            .push(payload);
    }

    /// Jobs started but not done yet
    pub fn active(&self) -> impl Iterator<Item = &Arc<str>> {
        self.active.iter()
    }

    pub fn is_active(&self, job: &str) -> bool {
        self.active.contains(job)
    }

    /// Time between a job's start and end, up to now if it has not ended
    pub fn elapsed(&self, job: &str) -> Duration {
        let Some(start) = self.starts.get(job) else {
            return Duration::ZERO;
        };
        match self.ends.get(job) {
            Some(end) => end.saturating_duration_since(*start),
            None => start.elapsed(),
        }
    }

    /// Write the final report for every job with report entries
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        for job in &self.report_order {
            writeln!(
                out,
                "# Playbook {job}, ran in {:.0}s",
                self.elapsed(job).as_secs_f64()
            )?;
            for payload in &self.entries[job] {
                for line in payload.split('\n') {
                    if line.contains(RECAP_MARKER) {
                        continue;
                    }
                    writeln!(out, "{line}")?;
                }
            }
        }
        out.flush()
    }
}
