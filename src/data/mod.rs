//! Data layer: core types and CSV loading.
//!
//! Architecture:
//! ```text
//!  neural_recording_papers.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse rows, drop malformed → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Vec<Record>, method index (first-seen order)
//!   └──────────┘
//! ```
pub mod loader;
pub mod model;
