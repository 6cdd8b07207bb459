use std::sync::Arc;

/// Kind of an event produced for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Job is about to spawn its process
    Start,
    /// Chunk starting with a `TASK` header
    Task,
    /// Host result reported as `ok:`
    Ok,
    /// Host result reported as `changed:`
    Changed,
    /// Host result reported as `failed:`/`fatal:`, or an `ERROR!` message
    Error,
    /// Host result reported as `unreachable:`
    Unreachable,
    /// Final `PLAY RECAP` summary
    Recap,
    /// Anything else
    Msg,
    /// Process terminated (or never started)
    Done,
}

/// Event sent from job tasks to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Identity of the job this event belongs to
    pub job: Arc<str>,
    /// Raw text, possibly empty
    pub payload: String,
}

impl Event {
    pub fn new(kind: EventKind, job: Arc<str>, payload: impl Into<String>) -> Self {
        Self {
            kind,
            job,
            payload: payload.into(),
        }
    }

    pub fn start(job: Arc<str>) -> Self {
        Self::new(EventKind::Start, job, String::new())
    }

    pub fn done(job: Arc<str>, status: impl Into<String>) -> Self {
        Self::new(EventKind::Done, job, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_start_has_empty_payload() {
        let event = Event::start("site.yml".into());
        assert_eq!(event.kind, EventKind::Start);
        assert_eq!(&*event.job, "site.yml");
        assert!(event.payload.is_empty());
    }

    #[test]
    fn event_done_carries_status() {
        let event = Event::done("site.yml".into(), "Exited with error code: 2");
        assert_eq!(event.kind, EventKind::Done);
        assert_eq!(event.payload, "Exited with error code: 2");
    }
}
