/// Data layer: record model, CSV loading and label summaries.
///
/// Architecture:
/// ```text
///   <id>.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Record (signal + label masks)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ intervals  │  mask → ordered inclusive runs / peak indices
///   └───────────┘
/// ```

pub mod intervals;
pub mod loader;
pub mod model;
