//! Data layer: CSV ingestion and derived statistics.
//!
//! Architecture:
//! ```text
//!   picked .csv file
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  worker thread reads text → LoadState
//!   └──────────┘
//!        │ Loaded
//!        ▼
//!   ┌─────────────┐
//!   │ deserialize  │  text → Vec<Row> (typed cells)
//!   └─────────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌──────────┐
//!   │  range    │   │  series   │  KP/X chart points
//!   └──────────┘   └──────────┘
//! ```

pub mod deserialize;
pub mod loader;
pub mod model;
pub mod range;
pub mod series;
