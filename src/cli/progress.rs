// src/cli/progress.rs — Terminal progress renderer for real-time session feedback

use crate::core::types::ProgressEvent;

/// One line per event. Shared by the stderr renderer and its tests.
pub fn format_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::BaselineReady { session_id, score } => {
            format!("[baseline] session={} score={:.2}", session_id, score)
        }
        ProgressEvent::IterationStart {
            iteration,
            max_iterations,
        } => format!("[iter {}/{}] refining...", iteration, max_iterations),
        ProgressEvent::FallbackUsed {
            iteration,
            stage,
            reason,
        } => format!("[iter {}]   fallback ({}): {}", iteration, stage, reason),
        ProgressEvent::IterationEnd {
            iteration,
            score_before,
            score_after,
            reward,
        } => format!(
            "[iter {}] score {:.2} -> {:.2} reward={:.2}",
            iteration, score_before, score_after, reward,
        ),
        ProgressEvent::Aborted { completed, reason } => {
            format!("[abort] after {} iteration(s): {}", completed, reason)
        }
        ProgressEvent::Complete {
            iterations,
            final_score,
            improvement,
            state,
        } => format!(
            "[done] score={:.2} improvement={:+.2} iterations={} state={}",
            final_score, improvement, iterations, state,
        ),
    }
}

/// Build a progress callback that writes formatted output to stderr.
///
/// All progress output goes to stderr so stdout remains clean for results.
/// Returns a closure suitable for `IterationOrchestrator::with_progress()`.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SessionState;
    use std::sync::{Arc, Mutex};

    /// Captures progress output into a Vec instead of stderr.
    fn capturing_progress() -> (
        impl Fn(ProgressEvent) + Send + Sync + 'static,
        Arc<Mutex<Vec<String>>>,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let cb = move |event: ProgressEvent| {
            log_clone.lock().unwrap().push(format_event(&event));
        };
        (cb, log)
    }

    #[test]
    fn test_iteration_start_format() {
        let (cb, log) = capturing_progress();
        cb(ProgressEvent::IterationStart {
            iteration: 1,
            max_iterations: 3,
        });
        assert_eq!(log.lock().unwrap()[0], "[iter 1/3] refining...");
    }

    #[test]
    fn test_iteration_end_format() {
        let (cb, log) = capturing_progress();
        cb(ProgressEvent::IterationEnd {
            iteration: 2,
            score_before: 61.5,
            score_after: 72.25,
            reward: 0.83,
        });
        let msgs = log.lock().unwrap();
        assert!(msgs[0].contains("61.50 -> 72.25"));
        assert!(msgs[0].contains("reward=0.83"));
    }

    #[test]
    fn test_fallback_and_abort_format() {
        let (cb, log) = capturing_progress();
        cb(ProgressEvent::FallbackUsed {
            iteration: 1,
            stage: "mutate".into(),
            reason: "generator timed out after 50ms".into(),
        });
        cb(ProgressEvent::Aborted {
            completed: 1,
            reason: "cancelled".into(),
        });
        let msgs = log.lock().unwrap();
        assert_eq!(
            msgs[0],
            "[iter 1]   fallback (mutate): generator timed out after 50ms"
        );
        assert_eq!(msgs[1], "[abort] after 1 iteration(s): cancelled");
    }

    #[test]
    fn test_complete_format() {
        let (cb, log) = capturing_progress();
        cb(ProgressEvent::Complete {
            iterations: 3,
            final_score: 88.4,
            improvement: 12.0,
            state: SessionState::Exhausted,
        });
        let msgs = log.lock().unwrap();
        assert!(msgs[0].contains("score=88.40"));
        assert!(msgs[0].contains("improvement=+12.00"));
        assert!(msgs[0].contains("state=exhausted"));
    }

    #[test]
    fn test_full_lifecycle_sequence() {
        let (cb, log) = capturing_progress();
        cb(ProgressEvent::BaselineReady {
            session_id: "abc".into(),
            score: 40.0,
        });
        for i in 1..=2 {
            cb(ProgressEvent::IterationStart {
                iteration: i,
                max_iterations: 2,
            });
            cb(ProgressEvent::IterationEnd {
                iteration: i,
                score_before: 40.0,
                score_after: 50.0,
                reward: 0.6,
            });
        }
        cb(ProgressEvent::Complete {
            iterations: 2,
            final_score: 50.0,
            improvement: 10.0,
            state: SessionState::Exhausted,
        });
        let msgs = log.lock().unwrap();
        assert_eq!(msgs.len(), 6);
        assert!(msgs[0].starts_with("[baseline]"));
        assert!(msgs[5].starts_with("[done]"));
    }
}
