use std::io::Write;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinError;
use tracing::{debug, trace};

use crate::command::{Invocation, JobRunner};
use crate::display::LiveRenderer;
use crate::error::Result;
use crate::event::Event;
use crate::job::JobList;

/// Default number of playbooks running at the same time
pub const DEFAULT_MAX_PARALLEL: usize = 5;

/// Capacity of the channel between job tasks and the renderer
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Result of a complete run
#[derive(Debug)]
pub struct RunOutcome<W> {
    /// Sum of all job exit codes, 0 when every job succeeded
    pub exit_code: i32,
    /// Writer the renderer drew on
    pub output: W,
}

impl<W> RunOutcome<W> {
    /// Process exit status for the run
    ///
    /// 0 when every job succeeded, otherwise the sum clamped to `1..=255` so
    /// that a sum of 256 cannot wrap around to success.
    pub fn exit_status(&self) -> u8 {
        exit_status(self.exit_code)
    }
}

fn exit_status(sum: i32) -> u8 {
    match sum {
        0 => 0,
        sum => u8::try_from(sum.clamp(1, 255)).unwrap_or(u8::MAX),
    }
}

/// Runs jobs with at most `max_parallel` processes alive at once
pub struct Engine {
    invocation: Arc<Invocation>,
    gate: Arc<Semaphore>,
    max_parallel: usize,
}

impl Engine {
    /// Create an engine; a limit of 0 is raised to 1
    pub fn new(invocation: Invocation, max_parallel: usize) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            invocation: Arc::new(invocation),
            gate: Arc::new(Semaphore::new(max_parallel)),
            max_parallel,
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Run every job and render their events, returning once the report is printed
    pub async fn run<W: Write>(
        &self,
        jobs: &JobList,
        renderer: LiveRenderer<W>,
    ) -> Result<RunOutcome<W>> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (exit_code, rendered) = tokio::join!(self.run_jobs(jobs, tx), renderer.run(rx));
        Ok(RunOutcome {
            exit_code,
            output: rendered?,
        })
    }

    /// Run every job to completion, sending their events to `tx`
    ///
    /// Each job holds a gate permit from before its `Start` until after its
    /// `Done`. A failing job never stops the others. Returns the sum of exit
    /// codes, where a job that could not run counts as 1. `tx` is dropped
    /// once every job is settled, which closes the channel.
    pub async fn run_jobs(&self, jobs: &JobList, tx: mpsc::Sender<Event>) -> i32 {
        let (names, tasks): (Vec<_>, Vec<_>) = jobs
            .iter()
            .cloned()
            .map(|job| {
                let gate = Arc::clone(&self.gate);
                let invocation = Arc::clone(&self.invocation);
                let tx = tx.clone();
                let name = Arc::clone(job.name());
                let task = tokio::spawn(async move {
                    // the gate is never closed, so a permit is always granted
                    let _permit = gate.acquire_owned().await.ok();
                    debug!(job = %job.name(), "acquired permit");
                    JobRunner::run(&job, &invocation, &tx).await
                });
                (name, task)
            })
            .unzip();

        let mut total: i32 = 0;
        for (name, joined) in names.into_iter().zip(join_all(tasks).await) {
            total = total.saturating_add(settle(name, joined, &tx).await);
        }
        total
    }
}

/// Exit code counted for a finished job task
///
/// Failures are only logged at debug level: the job's lane already shows
/// them, and records on stderr would shift the live lanes.
async fn settle(
    job: Arc<str>,
    joined: std::result::Result<Result<i32>, JoinError>,
    tx: &mpsc::Sender<Event>,
) -> i32 {
    match joined {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => {
            debug!(job = %job, error = %err, "job could not run");
            1
        }
        Err(err) => {
            debug!(job = %job, error = %err, "job task panicked");
            // the task never got to send its own Done
            if tx.send(Event::done(job, "Failed: task panicked")).await.is_err() {
                trace!("event receiver dropped");
            }
            1
        }
    }
}
