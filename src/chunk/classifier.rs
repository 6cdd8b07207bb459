use std::sync::Arc;

use crate::event::{Event, EventKind};

/// Marker of the final summary ansible prints at the end of a run
pub const RECAP_MARKER: &str = "PLAY RECAP";

/// Classify a chunk of ansible-playbook output
///
/// Given a chunk like:
///
/// ```text
/// TASK [staging : Install sudo] ******************************************
/// ok: [staging1.example.net]
/// ```
///
/// the host result on the second line decides the kind. Rules are checked in
/// order and the first match wins. Chunks with fewer than two lines can only
/// be `Task`, `Error` or `Msg`.
pub fn classify(job: &Arc<str>, chunk: &str) -> Event {
    Event::new(kind_of(chunk), Arc::clone(job), chunk)
}

fn kind_of(chunk: &str) -> EventKind {
    if chunk.contains(RECAP_MARKER) {
        return EventKind::Recap;
    }

    let lines: Vec<&str> = chunk.trim().split('\n').collect();
    if let Some(second) = lines.get(1) {
        if second.contains("ok:") {
            return EventKind::Ok;
        }
        if second.contains("changed:") {
            return EventKind::Changed;
        }
        if second.contains("failed:") || second.contains("fatal:") {
            return EventKind::Error;
        }
        if second.contains("unreachable:") {
            return EventKind::Unreachable;
        }
    }

    if lines[0].starts_with("TASK") {
        EventKind::Task
    } else if chunk.contains("ERROR!") {
        EventKind::Error
    } else {
        EventKind::Msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kind(chunk: &str) -> EventKind {
        classify(&Arc::from("site.yml"), chunk).kind
    }

    #[rstest]
    #[case("TASK [install] ***\nok: [web1]\n\n", EventKind::Ok)]
    #[case("TASK [install] ***\nchanged: [web1]\n\n", EventKind::Changed)]
    #[case("TASK [install] ***\nfailed: [web1] => {}\n\n", EventKind::Error)]
    #[case("TASK [install] ***\nfatal: [web1]: FAILED!\n\n", EventKind::Error)]
    #[case("TASK [install] ***\nunreachable: [web1]\n\n", EventKind::Unreachable)]
    fn classify_uses_second_line_keyword(#[case] chunk: &str, #[case] expected: EventKind) {
        assert_eq!(kind(chunk), expected);
    }

    #[test]
    fn classify_recap_marker_wins_over_keywords() {
        let chunk = "PLAY RECAP ***\nweb1 : ok=3 changed: 1 failed=0\n\n";
        assert_eq!(kind(chunk), EventKind::Recap);
    }

    #[test]
    fn classify_recap_marker_applies_to_single_line_chunk() {
        assert_eq!(kind("PLAY RECAP ***\n"), EventKind::Recap);
    }

    #[test]
    fn classify_first_matching_keyword_wins() {
        // "ok:" is checked before "changed:" and "failed:"
        let chunk = "TASK [x]\nok: [a] changed: [b] failed: [c]\n";
        assert_eq!(kind(chunk), EventKind::Ok);

        let chunk = "TASK [x]\nchanged: [b] fatal: [c]\n";
        assert_eq!(kind(chunk), EventKind::Changed);

        let chunk = "TASK [x]\nfatal: [c] unreachable: [d]\n";
        assert_eq!(kind(chunk), EventKind::Error);
    }

    #[test]
    fn classify_keyword_on_third_line_is_ignored() {
        let chunk = "TASK [x]\nskipping: [a]\nfailed: [b]\n";
        assert_eq!(kind(chunk), EventKind::Task);
    }

    #[rstest]
    #[case("TASK [x]", EventKind::Task)]
    #[case("TASK [x]\n", EventKind::Task)]
    #[case("random text", EventKind::Msg)]
    #[case("ERROR! the playbook could not be found", EventKind::Error)]
    #[case("ok: [web1]", EventKind::Msg)]
    #[case("", EventKind::Msg)]
    fn classify_single_line_chunk_skips_keyword_rules(
        #[case] chunk: &str,
        #[case] expected: EventKind,
    ) {
        assert_eq!(kind(chunk), expected);
    }

    #[test]
    fn classify_ignores_surrounding_blank_lines() {
        assert_eq!(kind("\n\nTASK [x]\nok: [web1]\n\n"), EventKind::Ok);
    }

    #[test]
    fn classify_error_marker_without_task_header() {
        let chunk = "PLAY [all] ***\nERROR! Syntax Error while loading YAML.\n";
        assert_eq!(kind(chunk), EventKind::Error);
    }

    #[test]
    fn classify_task_header_beats_error_marker() {
        let chunk = "TASK [fail] ***\nskipping: ERROR! in message\n";
        assert_eq!(kind(chunk), EventKind::Task);
    }

    #[test]
    fn classify_keeps_chunk_and_job() {
        let job: Arc<str> = Arc::from("db.yml");
        let event = classify(&job, "TASK [x]\n\n");

        assert_eq!(event.job, job);
        assert_eq!(event.payload, "TASK [x]\n\n");
    }
}
