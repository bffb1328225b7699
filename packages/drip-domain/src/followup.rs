use time::{Duration, OffsetDateTime};

use crate::templates::OutreachTemplate;

/// Stage counter after the final email. Leads at or past this are out of the
/// follow-up rotation entirely.
pub const MAX_OUTREACH_STAGE: i32 = 4;

/// Days to wait after the previous contact before the next email is due, keyed by
/// the current stage. Stage 1 -> follow_up_1 after 3 days, stage 2 -> follow_up_2
/// after 4 more days, stage 3 -> final after 3 more.
pub fn required_wait(stage: i32) -> Option<Duration> {
	match stage {
		1 => Some(Duration::days(3)),
		2 => Some(Duration::days(4)),
		3 => Some(Duration::days(3)),
		_ => None,
	}
}

/// The template due now, if any. The boundary is inclusive: exactly the required
/// wait is due, anything less is not.
pub fn next_follow_up(stage: i32, elapsed: Duration) -> Option<OutreachTemplate> {
	let wait = required_wait(stage)?;

	if elapsed < wait {
		return None;
	}

	OutreachTemplate::for_stage(stage + 1)
}

/// Informational timestamp for the lead record; `None` once the rotation is done.
pub fn next_follow_up_at(stage: i32, last_contacted_at: OffsetDateTime) -> Option<OffsetDateTime> {
	required_wait(stage).map(|wait| last_contacted_at + wait)
}
