use std::io::{self, Write};

use crossterm::terminal;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::display::cursor::HiddenCursor;
use crate::display::lanes::Lanes;
use crate::display::report::RunState;
use crate::display::text::headline;
use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::job::JobList;

/// Width used when no terminal size can be read
const DEFAULT_COLUMNS: u16 = 80;

/// Single consumer of job events drawing one lane per job
///
/// Lanes are updated in place while events arrive. Once every sender is
/// gone, the cursor is restored and the final report is printed below them.
pub struct LiveRenderer<W: Write> {
    out: W,
    jobs: JobList,
    columns: Option<u16>,
    state: RunState,
}

impl<W: Write> LiveRenderer<W> {
    pub fn new(out: W, jobs: &JobList) -> Self {
        Self {
            out,
            jobs: jobs.clone(),
            columns: None,
            state: RunState::new(),
        }
    }

    /// Use a fixed width instead of the terminal's
    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Drain `rx` until it closes, then print the report
    ///
    /// Returns the writer once everything has been written.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Event>) -> Result<W> {
        let columns = self.columns.unwrap_or_else(terminal_columns);
        let lanes = Lanes::new(&self.jobs, columns);

        let mut out = HiddenCursor::hide(&mut self.out)?;
        Lanes::reserve(&mut *out, &self.jobs)?;
        while let Some(event) = rx.recv().await {
            apply(&mut self.state, &lanes, &mut *out, event)?;
        }
        out.restore()?;

        for job in self.state.active() {
            warn!(job = %job, "event stream ended before job finished");
        }
        self.state.write_report(&mut self.out)?;
        Ok(self.out)
    }
}

fn terminal_columns() -> u16 {
    terminal::size()
        .map(|(columns, _)| columns)
        .unwrap_or(DEFAULT_COLUMNS)
}

fn apply<W: Write>(
    state: &mut RunState,
    lanes: &Lanes,
    out: &mut W,
    event: Event,
) -> io::Result<()> {
    trace!(job = %event.job, kind = ?event.kind, "event");
    match event.kind {
        EventKind::Start => {
            state.start(&event.job);
            lanes.write(out, &event.job, "Started")
        }
        EventKind::Task => lanes.write(out, &event.job, &headline(&event.payload)),
        EventKind::Recap | EventKind::Error => {
            state.record(&event.job, event.payload);
            Ok(())
        }
        EventKind::Done => {
            state.finish(&event.job);
            lanes.write(out, &event.job, &event.payload)
        }
        // Host results and unclassified output leave the lane as it is
        EventKind::Ok | EventKind::Changed | EventKind::Unreachable | EventKind::Msg => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const HIDE: &str = "\x1b[?25l";
    const SHOW: &str = "\x1b[?25h";

    fn event(kind: EventKind, job: &str, payload: &str) -> Event {
        Event::new(kind, Arc::from(job), payload)
    }

    async fn render(jobs: &JobList, columns: u16, events: Vec<Event>) -> String {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let out = LiveRenderer::new(Vec::new(), jobs)
            .with_columns(columns)
            .run(rx)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report_part(output: &str) -> &str {
        output.split_once(SHOW).map(|(_, report)| report).unwrap()
    }

    #[tokio::test]
    async fn live_renderer_reserves_lanes_with_hidden_cursor() {
        let jobs = JobList::new(["a.yml", "b.yml"]).unwrap();
        let output = render(&jobs, 80, vec![]).await;

        assert!(output.starts_with(&format!("{HIDE}a.yml: \nb.yml: \n")));
        assert_eq!(report_part(&output), "\n");
    }

    #[tokio::test]
    async fn live_renderer_updates_lane_of_event_job() {
        let jobs = JobList::new(["a.yml", "b.yml"]).unwrap();
        let output = render(
            &jobs,
            80,
            vec![
                event(EventKind::Start, "b.yml", ""),
                event(EventKind::Task, "b.yml", "\x1b[0;32mTASK [setup] ***\x1b[0m\nok: [h]\n\n"),
                event(EventKind::Done, "b.yml", "Done."),
            ],
        )
        .await;

        // b.yml is one row above the resting line, text starts after "b.yml: "
        assert!(output.contains("\x1b[1A\x1b[7C\x1b[K\x1b[0mStarted\x1b[1B\x1b[81D"));
        assert!(output.contains("\x1b[0mTASK [setup] ***\x1b[1B"));
        assert!(output.contains("\x1b[0mDone.\x1b[1B"));
        assert!(!output.contains("\x1b[2A"));
    }

    #[tokio::test]
    async fn live_renderer_leaves_lane_alone_for_host_results() {
        let jobs = JobList::new(["a.yml"]).unwrap();
        let output = render(
            &jobs,
            80,
            vec![
                event(EventKind::Ok, "a.yml", "TASK [x]\nok: [h]\n\n"),
                event(EventKind::Changed, "a.yml", "TASK [x]\nchanged: [h]\n\n"),
                event(EventKind::Unreachable, "a.yml", "TASK [x]\nunreachable: [h]\n\n"),
                event(EventKind::Msg, "a.yml", "random text\n"),
            ],
        )
        .await;

        assert_eq!(output, format!("{HIDE}a.yml: \n{SHOW}\n"));
    }

    #[tokio::test]
    async fn live_renderer_truncates_task_headline() {
        let jobs = JobList::new(["a.yml"]).unwrap();
        // 20 columns - 5 - 4 = 11
        let output = render(
            &jobs,
            20,
            vec![event(EventKind::Task, "a.yml", "TASK [common : Install] ***\n\n")],
        )
        .await;

        assert!(output.contains("TASK [comm…"));
    }

    #[tokio::test]
    async fn live_renderer_reports_recap_and_errors_only() {
        let jobs = JobList::new(["a.yml", "b.yml"]).unwrap();
        let output = render(
            &jobs,
            80,
            vec![
                event(EventKind::Start, "a.yml", ""),
                event(EventKind::Start, "b.yml", ""),
                event(EventKind::Task, "a.yml", "TASK [x] ***\n\n"),
                event(EventKind::Error, "b.yml", "TASK [y] ***\nfailed: [h]\n\n"),
                event(EventKind::Done, "b.yml", "Exited with error code: 2"),
                event(EventKind::Recap, "a.yml", "PLAY RECAP ***\nh : ok=1\n"),
                event(EventKind::Done, "a.yml", "Done."),
            ],
        )
        .await;

        assert_eq!(
            report_part(&output),
            "\n# Playbook b.yml, ran in 0s\nTASK [y] ***\nfailed: [h]\n\n\n\
             # Playbook a.yml, ran in 0s\nh : ok=1\n\n"
        );
    }

    #[tokio::test]
    async fn live_renderer_restores_cursor_when_writer_fails() {
        struct FailOn {
            written: Vec<u8>,
            fail_on: &'static [u8],
        }

        impl Write for FailOn {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if buf == self.fail_on {
                    return Err(io::Error::other("terminal gone"));
                }
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let jobs = JobList::new(["a.yml"]).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tx.send(event(EventKind::Start, "a.yml", "")).await.unwrap();
        drop(tx);

        let mut writer = FailOn {
            written: Vec::new(),
            fail_on: b"Started",
        };
        let result = LiveRenderer::new(&mut writer, &jobs)
            .with_columns(80)
            .run(rx)
            .await;

        assert!(result.is_err());
        assert!(String::from_utf8_lossy(&writer.written).ends_with(SHOW));
    }
}
