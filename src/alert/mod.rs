/// Alert evaluation and deduplication.
///
/// Submodules:
/// - `thresholds` : lead-time tiers, dawn-patrol cutoff, wave range test.
/// - `evaluate`   : per-day decisions and per-location alert bundling.
/// - `quiet_hours`: delivery suppression by hour of day.
/// - `stalenesses`: retention window for dedup records.
/// - `state`      : the persisted alert state file.
/// - `dedup`      : unseen-day filtering and the end-of-cycle commit.

pub mod dedup;
pub mod evaluate;
pub mod quiet_hours;
pub mod stalenesses;
pub mod state;
pub mod thresholds;
