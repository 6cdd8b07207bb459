use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, Result};

/// One playbook run, identified by its playbook path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: Arc<str>,
    position: usize,
}

impl Job {
    /// Get the job identity
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Get the fixed position given by input order
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Ordered, immutable list of jobs for one run
#[derive(Debug, Clone)]
pub struct JobList {
    jobs: Vec<Job>,
}

impl JobList {
    /// Create a job list from identities in input order
    ///
    /// Identities must be unique and the list must not be empty.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();
        for (position, name) in names.into_iter().enumerate() {
            let name: String = name.into();
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateJob(name));
            }
            jobs.push(Job {
                name: name.into(),
                position,
            });
        }
        if jobs.is_empty() {
            return Err(Error::NoJobs);
        }
        Ok(Self { jobs })
    }

    /// Get job count
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Check if there are no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Get job by position
    pub fn get(&self, position: usize) -> Option<&Job> {
        self.jobs.get(position)
    }

    /// Get iterator over all jobs in input order
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Length in characters of the longest job identity
    pub fn longest_name(&self) -> usize {
        self.jobs
            .iter()
            .map(|job| job.name.chars().count())
            .max()
            .unwrap_or(0)
    }
}
