/// Data layer: core types, loading, derivation, filtering, aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, validate schema → records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  bin income_level → Income Category column
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ BonusTable  │  Vec<BonusRecord>, fixed categorical domains
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐     ┌────────────┐
///   │  filter   │ ──▶ │  aggregate  │  KPIs, group-bys, ratio sequence
///   └──────────┘     └────────────┘
/// ```

pub mod aggregate;
pub mod derive;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
