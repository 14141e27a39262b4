//! Chart layer: payload JSON → chart model → SVG.
//!
//! ```text
//!   embedded payload JSON  (script#neuro-data)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ hydrate   │  deserialize, colors, axis, clamping
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   svg     │  fixed plotting contract → inline SVG
//!   └──────────┘
//! ```
pub mod hydrate;
pub mod svg;
