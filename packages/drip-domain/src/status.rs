use serde::{Deserialize, Serialize};

/// Lead lifecycle. Strictly forward-moving; the only transition that skips the
/// ordering is into [`LeadStatus::Failed`], which is terminal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
	New,
	Processing,
	Enriched,
	SiteBuilt,
	OutreachActive,
	Responded,
	Converted,
	Failed,
}
impl LeadStatus {
	pub const ALL: [Self; 8] = [
		Self::New,
		Self::Processing,
		Self::Enriched,
		Self::SiteBuilt,
		Self::OutreachActive,
		Self::Responded,
		Self::Converted,
		Self::Failed,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::New => "new",
			Self::Processing => "processing",
			Self::Enriched => "enriched",
			Self::SiteBuilt => "site_built",
			Self::OutreachActive => "outreach_active",
			Self::Responded => "responded",
			Self::Converted => "converted",
			Self::Failed => "failed",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|status| status.as_str() == raw)
	}

	/// Whether a lead may move from `self` to `to`. Forward-only, except that any
	/// non-terminal state may fail.
	pub fn can_advance(self, to: Self) -> bool {
		if self == Self::Failed {
			return false;
		}
		if to == Self::Failed {
			return true;
		}

		to.rank() > self.rank()
	}

	fn rank(self) -> u8 {
		match self {
			Self::New => 0,
			Self::Processing => 1,
			Self::Enriched => 2,
			Self::SiteBuilt => 3,
			Self::OutreachActive => 4,
			Self::Responded => 5,
			Self::Converted => 6,
			Self::Failed => 7,
		}
	}
}
impl std::fmt::Display for LeadStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
