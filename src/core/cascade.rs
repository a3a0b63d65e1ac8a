// LogDash - core/cascade.rs
//
// Cascading scope selection: client -> database -> table.
//
// Each setter commits its own level and returns the lookup the caller must
// dispatch to refresh the next level down. Lookups carry a per-level
// sequence number; a completed lookup is applied only if it is still the
// latest for its level, so out-of-order responses are dropped.
// Core layer: no I/O. The engine never calls the directory itself.

use crate::core::model::{ScopeListing, ScopeOptions, ScopeSelection};
use crate::core::sequence::SequenceGate;

/// Which option list a lookup refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
    Clients,
    Databases,
    Tables,
}

impl ScopeLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ScopeLevel::Clients => "clients",
            ScopeLevel::Databases => "databases",
            ScopeLevel::Tables => "tables",
        }
    }
}

/// A pending list-metadata request, tagged for stale-response detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeLookup {
    pub level: ScopeLevel,
    pub seq: u64,
    /// Client parameter sent to the directory ("" when unselected).
    pub client: String,
    /// Database parameter sent to the directory ("" when unselected).
    pub database: String,
}

/// What the caller must do after a lookup result has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    /// A newer lookup for the same level was issued; nothing changed.
    Stale,
    /// Options were replaced and no further cascade is needed.
    Settled,
    /// Databases were replaced; select this database next.
    SelectDatabase(String),
    /// Tables were replaced; select this table next.
    SelectTable(String),
}

/// Owns the scope selection and the option list for every level.
#[derive(Debug, Default)]
pub struct CascadeEngine {
    selection: ScopeSelection,
    options: ScopeOptions,
    clients_gate: SequenceGate,
    databases_gate: SequenceGate,
    tables_gate: SequenceGate,
    /// Databases-gate seq current when the database was last chosen. A
    /// databases lookup issued at or before it must not override the choice.
    database_chosen_at: u64,
}

impl CascadeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &ScopeSelection {
        &self.selection
    }

    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// Lookup that populates the top-level client list.
    pub fn init(&mut self) -> ScopeLookup {
        ScopeLookup {
            level: ScopeLevel::Clients,
            seq: self.clients_gate.issue(),
            client: String::new(),
            database: String::new(),
        }
    }

    /// Select a client. The returned lookup refreshes the database list.
    pub fn set_client(&mut self, client: String) -> ScopeLookup {
        self.selection.client = Some(client);
        ScopeLookup {
            level: ScopeLevel::Databases,
            seq: self.databases_gate.issue(),
            client: self.client_param(),
            database: self.database_param(),
        }
    }

    /// Select a database. The returned lookup refreshes the table list.
    pub fn set_database(&mut self, database: String) -> ScopeLookup {
        self.selection.database = Some(database);
        self.database_chosen_at = self.databases_gate.latest();
        ScopeLookup {
            level: ScopeLevel::Tables,
            seq: self.tables_gate.issue(),
            client: self.client_param(),
            database: self.database_param(),
        }
    }

    /// Select a table. Tables are leaves; nothing is fetched.
    pub fn set_table(&mut self, table: String) {
        self.selection.table = Some(table);
    }

    /// True if `lookup` is still the latest for its level.
    pub fn is_current(&self, lookup: &ScopeLookup) -> bool {
        self.gate(lookup.level).is_latest(lookup.seq)
    }

    /// Apply a successful lookup result.
    ///
    /// The relevant option list is swapped in whole. An empty list clears the
    /// dependent selection and everything below it, so a selection never
    /// outlives its option set.
    pub fn apply(&mut self, lookup: &ScopeLookup, listing: ScopeListing) -> CascadeStep {
        if !self.is_current(lookup) {
            return CascadeStep::Stale;
        }

        match lookup.level {
            ScopeLevel::Clients => {
                self.options.clients = listing.clients;
                CascadeStep::Settled
            }
            ScopeLevel::Databases => {
                self.options.databases = listing.databases;
                if self.database_chosen_at >= lookup.seq && self.database_listed() {
                    // Chosen after this lookup was issued and still valid.
                    return CascadeStep::Settled;
                }
                match self.options.databases.first() {
                    Some(first) => CascadeStep::SelectDatabase(first.clone()),
                    None => {
                        self.selection.database = None;
                        self.clear_tables();
                        CascadeStep::Settled
                    }
                }
            }
            ScopeLevel::Tables => {
                self.options.tables = listing.tables;
                match self.options.tables.first() {
                    Some(first) => CascadeStep::SelectTable(first.clone()),
                    None => {
                        self.selection.table = None;
                        CascadeStep::Settled
                    }
                }
            }
        }
    }

    fn database_listed(&self) -> bool {
        self.selection
            .database
            .as_ref()
            .is_some_and(|db| self.options.databases.contains(db))
    }

    fn clear_tables(&mut self) {
        self.options.tables.clear();
        self.selection.table = None;
        // A table lookup for the dropped database must not land later.
        self.tables_gate.invalidate();
    }

    fn gate(&self, level: ScopeLevel) -> &SequenceGate {
        match level {
            ScopeLevel::Clients => &self.clients_gate,
            ScopeLevel::Databases => &self.databases_gate,
            ScopeLevel::Tables => &self.tables_gate,
        }
    }

    fn client_param(&self) -> String {
        self.selection.client.clone().unwrap_or_default()
    }

    fn database_param(&self) -> String {
        self.selection.database.clone().unwrap_or_default()
    }
}
