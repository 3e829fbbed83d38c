// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types the
// application layer can swap sample sources without changing
// the code that consumes them:
//   - JsonlLoader        → loads from a JSON-lines file
//   - (future) CsvLoader → loads from a CSV export
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::sample::TweetSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the full set of labelled samples.
pub trait SampleSource {
    /// Load all available samples from this source.
    fn load_all(&self) -> Result<Vec<TweetSample>>;
}
