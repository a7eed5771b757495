//! Application-level tests: cached loading, default selections and the
//! numbered analyses.

use std::path::Path;
use std::sync::Arc;

use trade_lens::menu::Analysis;
use trade_lens::state::AppState;
use trade_lens::{load_dataset, AnalysisConfig, DatasetCache, MemoryCache, QueryResult, TradeError};

const TRADE: &str = "\
국가,2022,2022,2023,2023,2024,2024
,수출,수입,수출,수입,수출,수입
일본,15.2,17.4,16.0,18.0,16.1,16.9
대한민국,40.1,38.2,38.5,36.9,41.0,37.5
베트남,93.0,88.1,95.2,90.0,89.5,-
독일,39.0,34.0,-,33.1,37.2,31.8
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// A second load of unchanged input is served from the cache as the same Arc.
#[test]
fn cache_returns_shared_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "trade.csv", TRADE);
    let cache = MemoryCache::new();
    let cfg = AnalysisConfig::default();

    let first = load_dataset(&path, &cfg, &cache).unwrap();
    let second = load_dataset(&path, &cfg, &cache).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

/// Changing the file content produces a fresh dataset.
#[test]
fn changed_content_misses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "trade.csv", TRADE);
    let cache = MemoryCache::new();
    let cfg = AnalysisConfig::default();

    let first = load_dataset(&path, &cfg, &cache).unwrap();
    write(dir.path(), "trade.csv", &TRADE.replace("15.2", "15.3"));
    let second = load_dataset(&path, &cfg, &cache).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 2);
}

/// Failed loads leave nothing in the cache.
#[test]
fn failed_load_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.csv", "국가,2022\n,수출\n일본,1,2\n");
    let cache = MemoryCache::new();
    let err = load_dataset(&path, &AnalysisConfig::default(), &cache).unwrap_err();
    assert!(matches!(err, TradeError::ColumnCountMismatch { row: 2, .. }));
    assert!(cache.is_empty());
}

/// Snapshots can be read from several threads at once.
#[test]
fn concurrent_readers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "trade.csv", TRADE);
    let cache: Arc<dyn DatasetCache> = Arc::new(MemoryCache::new());
    let ds = load_dataset(&path, &AnalysisConfig::default(), cache.as_ref()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ds = Arc::clone(&ds);
            std::thread::spawn(move || {
                ds.rank("2022", "exports", 1, trade_lens::Direction::Top)
                    .unwrap()[0]
                    .entity
                    .clone()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), "베트남");
    }
}

fn state() -> AppState {
    let ds = trade_lens::dataset_from_bytes(TRADE.as_bytes(), &AnalysisConfig::default()).unwrap();
    AppState::new(Arc::new(ds), &AnalysisConfig::default())
}

/// Defaults: earliest period, the configured entity when present.
#[test]
fn default_selection() {
    let st = state();
    assert_eq!(st.selection.period, "2022");
    assert_eq!(st.selection.entity, "대한민국");
    assert_eq!(st.selection.n, 10);
    assert_eq!(st.periods, ["2022", "2023", "2024"]);

    let mut cfg = AnalysisConfig::default();
    cfg.default_entity = "Atlantis".into();
    let ds = trade_lens::dataset_from_bytes(TRADE.as_bytes(), &cfg).unwrap();
    let st = AppState::new(Arc::new(ds), &cfg);
    assert_eq!(st.selection.entity, st.entities[0]);
}

/// Selections are validated against the dataset.
#[test]
fn selection_validation() {
    let mut st = state();
    assert!(st.select_period("2023").is_ok());
    assert!(matches!(
        st.select_period("1990"),
        Err(TradeError::InsufficientPeriods { .. })
    ));
    assert!(matches!(
        st.select_entity("Atlantis"),
        Err(TradeError::UnknownEntity { .. })
    ));
    assert_eq!(st.selection.period, "2023");
}

/// Menu 3 and 4 rank the import/export ratio in opposite directions.
#[test]
fn ratio_analyses() {
    let mut st = state();
    st.set_top_n(2);
    let high = st.run(Analysis::HighestImportRatio).unwrap();
    let low = st.run(Analysis::LowestImportRatio).unwrap();
    match (high, low) {
        (QueryResult::Ranking { rows: high, .. }, QueryResult::Ranking { rows: low, .. }) => {
            assert_eq!(high[0].entity, "일본");
            assert_eq!(low[0].entity, "독일");
            assert_eq!(high.len(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

/// Menu 5-8 compare the configured periods and skip incomplete entities.
#[test]
fn change_analyses() {
    let st = state();
    match st.run(Analysis::ImportDrop).unwrap() {
        QueryResult::Changes { period_a, period_b, rows, .. } => {
            assert_eq!((period_a.as_str(), period_b.as_str()), ("2022", "2024"));
            assert!(rows.iter().all(|r| r.entity != "베트남"));
            assert_eq!(rows[0].entity, "독일");
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut st = state();
    st.set_comparison("2022", "2030");
    assert!(matches!(
        st.run(Analysis::ExportGain),
        Err(TradeError::InsufficientPeriods { .. })
    ));
}

/// Menu 9 lists the selected entity over all periods.
#[test]
fn history_analysis() {
    let mut st = state();
    st.select_entity("독일").unwrap();
    match st.run(Analysis::EntityHistory).unwrap() {
        QueryResult::History { entity, records } => {
            assert_eq!(entity, "독일");
            assert_eq!(records.len(), 3);
            assert!(records[1].metric("수출").is_missing());
        }
        other => panic!("unexpected {other:?}"),
    }
}
