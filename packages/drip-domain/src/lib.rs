pub mod enrichment;
pub mod followup;
pub mod status;
pub mod templates;
