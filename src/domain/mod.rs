// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// This keeps the vocabulary of the system (what a sample IS)
// separate from how it is loaded, batched, or classified.

// One labelled (tweet, image description) pair
pub mod sample;

// Core abstractions (traits) that other layers implement
pub mod traits;
