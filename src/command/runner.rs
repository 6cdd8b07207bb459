use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use nix::sys::signal::Signal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::unix::pipe;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::chunk::{ChunkAssembler, classify};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::job::Job;

/// Program run for each playbook
pub const ANSIBLE_PLAYBOOK: &str = "ansible-playbook";

/// Environment variable forcing colored output in the child
pub const FORCE_COLOR_VAR: &str = "ANSIBLE_FORCE_COLOR";

/// How to build the command line for a job
///
/// The job identity is passed as the first argument after `leading_args`,
/// followed by `forwarded_args`.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: String,
    leading_args: Vec<String>,
    forwarded_args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            forwarded_args: Vec::new(),
        }
    }

    /// `ansible-playbook <playbook> <forwarded...>`
    pub fn ansible_playbook(forwarded_args: Vec<String>) -> Self {
        Self::new(ANSIBLE_PLAYBOOK).with_forwarded_args(forwarded_args)
    }

    /// Arguments placed before the job identity
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments placed after the job identity
    pub fn with_forwarded_args(mut self, args: Vec<String>) -> Self {
        self.forwarded_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_for(&self, job: &Job) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(&**job.name())
            .args(&self.forwarded_args)
            .env(FORCE_COLOR_VAR, "1");
        command
    }
}

/// How a job's process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Code(i32),
    Signal(i32),
}

impl Exit {
    fn from_status(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match (status.code(), status.signal()) {
            (Some(code), _) => Exit::Code(code),
            (None, Some(signal)) => Exit::Signal(signal),
            (None, None) => Exit::Code(-1),
        }
    }

    /// Exit code counted in the aggregate, shell convention for signals
    fn code(self) -> i32 {
        match self {
            Exit::Code(code) => code,
            Exit::Signal(signal) => 128 + signal,
        }
    }

    /// Status text shown in the job's lane
    fn describe(self) -> String {
        match self {
            Exit::Code(0) => "Done.".to_string(),
            Exit::Code(code) => format!("Exited with error code: {code}"),
            Exit::Signal(signal) => match Signal::try_from(signal) {
                Ok(signal) => format!("Killed by signal {}", signal.as_str()),
                Err(_) => format!("Killed by signal {signal}"),
            },
        }
    }
}

/// Runs one job's process and turns its output into events
pub struct JobRunner;

impl JobRunner {
    /// Run a job to completion
    ///
    /// Emits `Start`, then one event per output chunk, then exactly one
    /// `Done`, even when the process cannot be started. Returns the exit code,
    /// or an error when spawning or waiting for the process failed.
    pub async fn run(job: &Job, invocation: &Invocation, tx: &mpsc::Sender<Event>) -> Result<i32> {
        emit(tx, Event::start(Arc::clone(job.name()))).await;

        let result = Self::run_process(job, invocation, tx).await;
        let status = match &result {
            Ok(exit) => exit.describe(),
            Err(Error::Spawn { source, .. }) => format!("Failed to start: {source}"),
            Err(err) => err.to_string(),
        };
        emit(tx, Event::done(Arc::clone(job.name()), status)).await;

        result.map(Exit::code)
    }

    async fn run_process(
        job: &Job,
        invocation: &Invocation,
        tx: &mpsc::Sender<Event>,
    ) -> Result<Exit> {
        let spawn_error = |source| Error::Spawn {
            job: job.name().to_string(),
            program: invocation.program().to_string(),
            source,
        };

        // stdout and stderr share one pipe so their bytes keep their order
        let (sender, receiver) = pipe::pipe().map_err(spawn_error)?;
        let mut child = {
            let output = sender.into_blocking_fd().map_err(spawn_error)?;
            let errors = output.try_clone().map_err(spawn_error)?;
            let mut command = invocation.command_for(job);
            command
                .stdin(Stdio::null())
                .stdout(output)
                .stderr(errors);
            debug!(job = %job.name(), program = invocation.program(), "spawning process");
            command.spawn().map_err(spawn_error)?
        };

        let mut reader = BufReader::new(receiver);
        let mut assembler = ChunkAssembler::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if let Some(chunk) = assembler.push_line(&line) {
                        emit(tx, classify(job.name(), &chunk)).await;
                    }
                }
                Err(err) => {
                    debug!(job = %job.name(), error = %err, "reading process output failed");
                    break;
                }
            }
        }
        if let Some(chunk) = assembler.finish() {
            emit(tx, classify(job.name(), &chunk)).await;
        }

        let status = child.wait().await.map_err(|source| Error::Wait {
            job: job.name().to_string(),
            source,
        })?;
        let exit = Exit::from_status(status);
        info!(job = %job.name(), exit_code = exit.code(), "process exited");
        Ok(exit)
    }
}

async fn emit(tx: &mpsc::Sender<Event>, event: Event) {
    if tx.send(event).await.is_err() {
        trace!("event receiver dropped");
    }
}
