//! The process-wide registry of tables by name.

use std::sync::Arc;

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use snafu::{ensure, OptionExt, Snafu};

use crate::table::Table;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("a table named '{}' is already registered", name))]
    DuplicateTable { name: String },

    #[snafu(display("no table named '{}' is registered", name))]
    UnknownTable { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Name-to-table mapping with shared table handles.
///
/// The catalog owns a share of each registered table; dropping a table
/// releases that share, not necessarily the storage (reference segments in
/// result tables may keep the table alive).
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_table(&self, name: impl Into<String>, table: Arc<Table>) -> Result<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        ensure!(!tables.contains_key(&name), DuplicateTable { name });
        tables.insert(name, table);
        Ok(())
    }

    /// Unregisters a table, returning the released handle.
    pub fn drop_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .write()
            .remove(name)
            .context(UnknownTable { name })
    }

    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .map(Arc::clone)
            .context(UnknownTable { name })
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Registered table names, in unspecified order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// Discards all entries, returning the catalog to its initial state.
    pub fn reset(&self) {
        self.tables.write().clear();
    }
}

/// The process-wide catalog, initialised on first use.
pub fn catalog() -> &'static Catalog {
    static CATALOG: Lazy<Catalog> = Lazy::new(Catalog::default);
    &CATALOG
}
