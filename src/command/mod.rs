mod runner;

pub use runner::{ANSIBLE_PLAYBOOK, FORCE_COLOR_VAR, Invocation, JobRunner};
