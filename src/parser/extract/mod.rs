pub mod channel;
pub mod detail;
pub mod listing;
pub mod seasons;

// ── Tests ──
