//! Table layout store (桌台布局)
//!
//! Floor-plan records (position, size, background, arrange flags) kept
//! apart from the seat inventory. Changes are handed to a [`LayoutSink`]:
//! full replacement and seeding write at once, everything else is
//! scheduled so a drag gesture ends in a single write.

mod save_worker;

pub use save_worker::{DebouncedLayoutSink, LayoutSaveWorker};

use crate::outcome::{CommandOutcome, IgnoredReason};
use crate::storage::SessionPersistence;
use shared::models::{Position, TableFlags, TableLayout};
use std::time::Duration;

/// Grid unit positions snap to
pub const DEFAULT_SNAP_INCREMENT: f64 = 20.0;
/// Delay for ordinary layout edits
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(120);
/// Delay for position updates during a drag
pub const DEFAULT_POSITION_SAVE_DELAY: Duration = Duration::from_millis(60);

/// Where layout writes go
pub trait LayoutSink: Send + Sync {
    /// Write after `delay` unless a newer request arrives first
    fn schedule(&self, tables: &[TableLayout], delay: Duration);
    /// Write now, superseding anything scheduled
    fn write_now(&self, tables: &[TableLayout]);
}

/// Writes synchronously on every request
#[derive(Clone)]
pub struct ImmediateLayoutSink {
    persistence: SessionPersistence,
}

impl ImmediateLayoutSink {
    pub fn new(persistence: SessionPersistence) -> Self {
        Self { persistence }
    }
}

impl LayoutSink for ImmediateLayoutSink {
    fn schedule(&self, tables: &[TableLayout], _delay: Duration) {
        self.write_now(tables);
    }

    fn write_now(&self, tables: &[TableLayout]) {
        if let Err(e) = self.persistence.save_tables(tables) {
            tracing::warn!(error = %e, "Failed to save table layout");
        }
    }
}

/// Options for [`LayoutStore::init_from_storage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInitOptions {
    /// Seed the default tables when nothing is stored
    pub seed_if_empty: bool,
    /// Append default tables whose ids are missing from the stored list
    pub merge_missing_defaults: bool,
}

impl Default for LayoutInitOptions {
    fn default() -> Self {
        Self {
            seed_if_empty: true,
            merge_missing_defaults: false,
        }
    }
}

/// Save delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDelays {
    pub edit: Duration,
    pub position: Duration,
}

impl Default for LayoutDelays {
    fn default() -> Self {
        Self {
            edit: DEFAULT_SAVE_DELAY,
            position: DEFAULT_POSITION_SAVE_DELAY,
        }
    }
}

pub struct LayoutStore {
    tables: Vec<TableLayout>,
    loaded: bool,
    snap_increment: f64,
    delays: LayoutDelays,
    sink: Box<dyn LayoutSink>,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("tables", &self.tables)
            .field("loaded", &self.loaded)
            .field("snap_increment", &self.snap_increment)
            .finish_non_exhaustive()
    }
}

impl LayoutStore {
    pub fn new(sink: Box<dyn LayoutSink>, snap_increment: f64, delays: LayoutDelays) -> Self {
        Self {
            tables: Vec::new(),
            loaded: false,
            snap_increment,
            delays,
            sink,
        }
    }

    /// Three 300×300 tables in a row, arrange flags off
    pub fn default_tables() -> Vec<TableLayout> {
        let locked = TableFlags {
            draggable: Some(false),
            resizable: Some(false),
        };
        [
            ("t1", 1, 40.0, "/4-sit.png"),
            ("t2", 2, 360.0, "/6-sit.png"),
            ("t3", 3, 680.0, "/4-sit.png"),
        ]
        .into_iter()
        .map(|(id, number, x, image)| {
            TableLayout::new(id, number, Position::new(x, 40.0))
                .with_background(image)
                .with_size(300.0, 300.0)
                .with_flags(locked)
        })
        .collect()
    }

    /// Load the stored layout, or seed the defaults when nothing usable is stored
    ///
    /// Calling it again re-reads storage; defaults are only added to a
    /// non-empty stored list when `merge_missing_defaults` is set.
    pub fn init_from_storage(&mut self, persistence: &SessionPersistence, options: LayoutInitOptions) {
        match persistence.load_tables() {
            Some(stored) if !stored.is_empty() => {
                self.tables = stored;
                if options.merge_missing_defaults {
                    let missing: Vec<TableLayout> = Self::default_tables()
                        .into_iter()
                        .filter(|d| !self.tables.iter().any(|t| t.id == d.id))
                        .collect();
                    if !missing.is_empty() {
                        tracing::info!(count = missing.len(), "Merging missing default tables");
                        self.tables.extend(missing);
                        self.sink.write_now(&self.tables);
                    }
                }
            }
            _ => {
                self.tables = if options.seed_if_empty {
                    Self::default_tables()
                } else {
                    Vec::new()
                };
                tracing::info!(count = self.tables.len(), "No stored table layout, seeding");
                self.sink.write_now(&self.tables);
            }
        }
        self.loaded = true;
    }

    pub fn tables(&self) -> &[TableLayout] {
        &self.tables
    }

    pub fn get(&self, table_id: &str) -> Option<&TableLayout> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn snap_increment(&self) -> f64 {
        self.snap_increment
    }

    /// Sorted by display number
    pub fn sorted(&self) -> Vec<&TableLayout> {
        let mut sorted: Vec<&TableLayout> = self.tables.iter().collect();
        sorted.sort_by_key(|t| t.number);
        sorted
    }

    /// Replace every table (import / reset); written at once
    pub fn set_all(&mut self, tables: Vec<TableLayout>) -> CommandOutcome {
        self.tables = tables;
        self.loaded = true;
        self.sink.write_now(&self.tables);
        CommandOutcome::Applied
    }

    /// Insert, or replace the record with the same id
    pub fn upsert(&mut self, table: TableLayout) -> CommandOutcome {
        match self.tables.iter_mut().find(|t| t.id == table.id) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
        self.schedule_save();
        CommandOutcome::Applied
    }

    pub fn remove(&mut self, table_id: &str) -> CommandOutcome {
        let before = self.tables.len();
        self.tables.retain(|t| t.id != table_id);
        if self.tables.len() == before {
            return IgnoredReason::TableNotFound.into();
        }
        self.schedule_save();
        CommandOutcome::Applied
    }

    /// Move a table, snapping both axes to `snap` (default: the store's increment)
    pub fn update_position(
        &mut self,
        table_id: &str,
        position: Position,
        snap: Option<f64>,
    ) -> CommandOutcome {
        let snap = snap.unwrap_or(self.snap_increment);
        let Some(table) = self.tables.iter_mut().find(|t| t.id == table_id) else {
            return IgnoredReason::TableNotFound.into();
        };
        table.position = position.snapped(snap);
        self.sink.schedule(&self.tables, self.delays.position);
        CommandOutcome::Applied
    }

    /// Update width and/or height; `None` leaves a dimension as is
    pub fn set_size(
        &mut self,
        table_id: &str,
        width: Option<f64>,
        height: Option<f64>,
    ) -> CommandOutcome {
        let Some(table) = self.tables.iter_mut().find(|t| t.id == table_id) else {
            return IgnoredReason::TableNotFound.into();
        };
        if width.is_none() && height.is_none() {
            return IgnoredReason::NoChange.into();
        }
        if width.is_some() {
            table.width = width;
        }
        if height.is_some() {
            table.height = height;
        }
        self.schedule_save();
        CommandOutcome::Applied
    }

    /// Merge flags into the table's current flags
    pub fn set_flags(&mut self, table_id: &str, flags: TableFlags) -> CommandOutcome {
        let Some(table) = self.tables.iter_mut().find(|t| t.id == table_id) else {
            return IgnoredReason::TableNotFound.into();
        };
        table.flags.get_or_insert_with(TableFlags::default).merge(flags);
        self.schedule_save();
        CommandOutcome::Applied
    }

    /// Set or clear the background image
    pub fn set_background(&mut self, table_id: &str, image: Option<String>) -> CommandOutcome {
        let Some(table) = self.tables.iter_mut().find(|t| t.id == table_id) else {
            return IgnoredReason::TableNotFound.into();
        };
        table.background_image = image;
        self.schedule_save();
        CommandOutcome::Applied
    }

    /// Write the current tables now (shutdown)
    pub fn flush(&self) {
        if self.loaded {
            self.sink.write_now(&self.tables);
        }
    }

    fn schedule_save(&self) {
        self.sink.schedule(&self.tables, self.delays.edit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RedbStore;
    use std::sync::{Arc, Mutex};

    /// Records every request instead of writing
    #[derive(Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<(usize, Option<Duration>)>>>,
    }

    impl LayoutSink for RecordingSink {
        fn schedule(&self, tables: &[TableLayout], delay: Duration) {
            self.calls.lock().unwrap().push((tables.len(), Some(delay)));
        }

        fn write_now(&self, tables: &[TableLayout]) {
            self.calls.lock().unwrap().push((tables.len(), None));
        }
    }

    fn persistence() -> SessionPersistence {
        SessionPersistence::new(Arc::new(RedbStore::open_in_memory().unwrap()))
    }

    fn store_with(persistence: &SessionPersistence) -> LayoutStore {
        LayoutStore::new(
            Box::new(ImmediateLayoutSink::new(persistence.clone())),
            DEFAULT_SNAP_INCREMENT,
            LayoutDelays::default(),
        )
    }

    fn loaded_store() -> (SessionPersistence, LayoutStore) {
        let p = persistence();
        let mut store = store_with(&p);
        store.init_from_storage(&p, LayoutInitOptions::default());
        (p, store)
    }

    #[test]
    fn test_init_seeds_and_persists_defaults() {
        let (p, store) = loaded_store();
        assert!(store.is_loaded());
        assert_eq!(store.tables().len(), 3);
        assert_eq!(p.load_tables().unwrap().len(), 3);

        let t1 = store.get("t1").unwrap();
        assert_eq!(t1.position, Position::new(40.0, 40.0));
        assert_eq!(t1.background_image.as_deref(), Some("/4-sit.png"));
        assert_eq!(t1.width, Some(300.0));
        assert_eq!(t1.flags.unwrap().draggable, Some(false));
    }

    #[test]
    fn test_init_without_seed_is_empty() {
        let p = persistence();
        let mut store = store_with(&p);
        store.init_from_storage(
            &p,
            LayoutInitOptions {
                seed_if_empty: false,
                merge_missing_defaults: false,
            },
        );
        assert!(store.is_loaded());
        assert!(store.tables().is_empty());
    }

    #[test]
    fn test_init_is_idempotent_for_stored_tables() {
        let p = persistence();
        p.save_tables(&[TableLayout::new("custom", 9, Position::new(0.0, 0.0))])
            .unwrap();

        let mut store = store_with(&p);
        store.init_from_storage(&p, LayoutInitOptions::default());
        store.init_from_storage(&p, LayoutInitOptions::default());
        assert_eq!(store.tables().len(), 1);
        assert_eq!(store.tables()[0].id, "custom");
    }

    #[test]
    fn test_init_merges_missing_defaults_on_request() {
        let p = persistence();
        let mut t2 = LayoutStore::default_tables()[1].clone();
        t2.position = Position::new(500.0, 500.0);
        p.save_tables(&[t2]).unwrap();

        let mut store = store_with(&p);
        let options = LayoutInitOptions {
            seed_if_empty: true,
            merge_missing_defaults: true,
        };
        store.init_from_storage(&p, options);
        assert_eq!(store.tables().len(), 3);
        // Stored record wins over the default with the same id
        assert_eq!(store.get("t2").unwrap().position, Position::new(500.0, 500.0));
        assert_eq!(p.load_tables().unwrap().len(), 3);

        store.init_from_storage(&p, options);
        assert_eq!(store.tables().len(), 3);
    }

    #[test]
    fn test_update_position_snaps() {
        let (p, mut store) = loaded_store();
        assert!(
            store
                .update_position("t1", Position::new(113.0, 207.0), None)
                .is_applied()
        );
        assert_eq!(store.get("t1").unwrap().position, Position::new(120.0, 200.0));
        assert_eq!(
            p.load_tables().unwrap()[0].position,
            Position::new(120.0, 200.0)
        );

        store.update_position("t1", Position::new(113.0, 207.0), Some(50.0));
        assert_eq!(store.get("t1").unwrap().position, Position::new(100.0, 200.0));
    }

    #[test]
    fn test_unknown_table_is_ignored() {
        let (_, mut store) = loaded_store();
        let ignored = CommandOutcome::Ignored(IgnoredReason::TableNotFound);
        assert_eq!(store.update_position("nope", Position::default(), None), ignored);
        assert_eq!(store.remove("nope"), ignored);
        assert_eq!(store.set_size("nope", Some(1.0), None), ignored);
        assert_eq!(store.set_flags("nope", TableFlags::default()), ignored);
        assert_eq!(store.set_background("nope", None), ignored);
    }

    #[test]
    fn test_upsert_remove_sorted() {
        let (_, mut store) = loaded_store();
        store.upsert(TableLayout::new("t0", 0, Position::default()));
        let mut t1 = store.get("t1").unwrap().clone();
        t1.number = 7;
        store.upsert(t1);

        let numbers: Vec<u32> = store.sorted().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 2, 3, 7]);

        assert!(store.remove("t0").is_applied());
        assert_eq!(store.tables().len(), 3);
    }

    #[test]
    fn test_size_flags_background() {
        let (_, mut store) = loaded_store();
        store.set_size("t1", Some(200.0), None);
        let t1 = store.get("t1").unwrap();
        assert_eq!((t1.width, t1.height), (Some(200.0), Some(300.0)));

        store.set_flags(
            "t1",
            TableFlags {
                draggable: Some(true),
                resizable: None,
            },
        );
        let flags = store.get("t1").unwrap().flags.unwrap();
        assert_eq!(flags.draggable, Some(true));
        assert_eq!(flags.resizable, Some(false));

        store.set_background("t1", None);
        assert!(store.get("t1").unwrap().background_image.is_none());
    }

    #[test]
    fn test_writes_are_routed_by_kind() {
        let p = persistence();
        let sink = RecordingSink::default();
        let mut store = LayoutStore::new(
            Box::new(sink.clone()),
            DEFAULT_SNAP_INCREMENT,
            LayoutDelays::default(),
        );
        store.init_from_storage(&p, LayoutInitOptions::default());
        store.update_position("t1", Position::new(1.0, 1.0), None);
        store.set_background("t2", None);
        store.set_all(Vec::new());

        let calls = sink.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (3, None),
                (3, Some(DEFAULT_POSITION_SAVE_DELAY)),
                (3, Some(DEFAULT_SAVE_DELAY)),
                (0, None),
            ]
        );
    }
}
