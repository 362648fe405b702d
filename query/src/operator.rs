//! The operator framework: lazy unary computation nodes producing tables.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use storage::Table;

use crate::Result;

/// A lazy computation node producing a table.
///
/// `execute` computes and caches the output; a second call is a no-op.
/// Operators are shared as `Arc<dyn Operator>` so they can be chained as
/// inputs to downstream operators.
pub trait Operator: Debug + Send + Sync {
    /// Computes and caches the output table. Idempotent.
    fn execute(&self) -> Result<()>;

    /// The cached output table.
    ///
    /// # Panics
    ///
    /// If called before a successful `execute`.
    fn get_output(&self) -> Arc<Table>;
}

/// Adapts an existing table into the operator framework.
#[derive(Debug)]
pub struct TableWrapper {
    table: Arc<Table>,
    output: RwLock<Option<Arc<Table>>>,
}

impl TableWrapper {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            output: RwLock::new(None),
        }
    }
}

impl Operator for TableWrapper {
    fn execute(&self) -> Result<()> {
        let mut output = self.output.write();
        if output.is_none() {
            *output = Some(Arc::clone(&self.table));
        }
        Ok(())
    }

    fn get_output(&self) -> Arc<Table> {
        self.output
            .read()
            .as_ref()
            .map(Arc::clone)
            .expect("execute() must run before get_output()")
    }
}
