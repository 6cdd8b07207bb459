//! Run several ansible playbooks at once and follow them on one screen.
//!
//! Each playbook gets a job and a lane. Job output is cut into chunks,
//! classified, and sent as events to a single renderer that updates the
//! lanes in place and prints a final report.

pub mod chunk;
pub mod cli;
pub mod command;
pub mod display;
pub mod engine;
pub mod error;
pub mod event;
pub mod job;
pub mod logging;
