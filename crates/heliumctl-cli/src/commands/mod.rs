use heliumctl_store::MutationOutcome;

pub mod bookmarks;
pub mod close;
pub mod completion;
pub mod history;
pub mod launch;

/// "Deleted 3 bookmarks (1 not found)" style status line.
pub(crate) fn outcome_summary(outcome: MutationOutcome, singular: &str, plural: &str) -> String {
    let noun = if outcome.success_count == 1 {
        singular
    } else {
        plural
    };
    let mut message = format!("✅ Deleted {} {}", outcome.success_count, noun);
    if outcome.fail_count > 0 {
        message.push_str(&format!(" ({} not found)", outcome.fail_count));
    }
    message
}
