use std::io;

use thiserror::Error;

/// Errors raised while preparing or running playbook jobs
#[derive(Debug, Error)]
pub enum Error {
    /// The process for a job could not be started at all
    #[error("failed to start `{program}` for {job}: {source}")]
    Spawn {
        job: String,
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process was started but waiting for its exit failed
    #[error("failed to wait for {job}: {source}")]
    Wait {
        job: String,
        #[source]
        source: io::Error,
    },

    /// The same job identity was given more than once
    #[error("duplicate playbook: {0}")]
    DuplicateJob(String),

    /// No job was given
    #[error("at least one playbook is required")]
    NoJobs,

    /// The log file could not be opened
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Writing to the terminal failed
    #[error("terminal output failed: {0}")]
    Render(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
