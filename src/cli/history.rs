// src/cli/history.rs — `specloop history`: inspect stored sessions

use crate::core::types::{IterationRecord, LearningInsights};
use crate::memory::IterationStore;
use crate::util::ellipsize;

const SUGGESTIONS_WIDTH: usize = 80;

pub fn run_history(
    store: &dyn IterationStore,
    session_id: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    match session_id {
        None => {
            let sessions = store.sessions()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No sessions recorded yet.");
            } else {
                for id in &sessions {
                    let records = store.list(id)?;
                    println!("{}", session_line(id, &records));
                }
            }
        }
        Some(id) => {
            let records = store.list(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                anyhow::bail!("no records for session '{id}'");
            } else {
                for r in &records {
                    println!(
                        "#{} {:.2} -> {:.2} reward={:.2} feedback={} ({})",
                        r.iteration_number,
                        r.score_before(),
                        r.score_after(),
                        r.reward,
                        r.feedback.source,
                        ellipsize(&r.feedback.suggestions.join("; "), SUGGESTIONS_WIDTH),
                    );
                }
            }
        }
    }
    Ok(())
}

fn session_line(id: &str, records: &[IterationRecord]) -> String {
    let baseline = records.first().map(|r| r.score_before()).unwrap_or(0.0);
    let insights = LearningInsights::from_records(baseline, records);
    format!(
        "{id}  iterations={} final={:.2} improvement={:+.2}",
        insights.total_iterations, insights.final_score, insights.improvement
    )
}
