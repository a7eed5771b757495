/// Data layer: loading, reshaping, derivation and ranking.
///
/// Architecture:
/// ```text
///  wide .csv  (row 0: periods, row 1: metric labels, rows 2..: entities)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  bytes → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  header   │  rows 0/1 → Vec<ColumnHeader>, width checks
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  reshape  │  flatten → group by (entity, period)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  ratio / openness / balance
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  immutable snapshot, shared as Arc<Dataset>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  rank     │  single-period rankings, period-over-period deltas
///   └──────────┘
/// ```

pub mod derive;
pub mod export;
pub mod header;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod rank;
pub mod reshape;
