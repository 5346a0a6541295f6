use itertools::Itertools;
use stress_harness_summary_model::SessionSummary;

/// Keep the most recent session for each target and configuration fingerprint, ordered by target
/// and then by start time.
pub fn latest_sessions_by_target_and_config(
    sessions: Vec<SessionSummary>,
) -> Vec<(String, String, SessionSummary)> {
    sessions
        .into_iter()
        .into_group_map_by(|session| (session.target.clone(), session.fingerprint()))
        .into_iter()
        .filter_map(|((target, fingerprint), sessions)| {
            sessions
                .into_iter()
                .max_by_key(|session| session.started_at)
                .map(|latest| (target, fingerprint, latest))
        })
        .sorted_by(|(a_target, _, a), (b_target, _, b)| {
            a_target.cmp(b_target).then(a.started_at.cmp(&b.started_at))
        })
        .collect()
}
