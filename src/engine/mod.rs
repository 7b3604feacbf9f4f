//! The engine seam: traits implemented by readers of the container format.
//!
//! An [`Engine`] is an open handle to one data source, a [`Backend`] opens
//! engines against paths. The indexing layer above never touches storage
//! itself: it inquires metadata and issues selection reads, and any failure
//! an engine reports propagates to the caller unmodified.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod memory;

pub use memory::{MemBackend, MemFile};

/// Variable metadata as reported by an engine, in the engine's native
/// (column-major) dimension order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableMeta {
    pub name: String,
    pub shape: Vec<u64>,
    /// Native type name, e.g. "double".
    pub dtype: String,
}

/// An open handle to a data source, supporting selection and synchronous
/// reads.
pub trait Engine: Send {
    /// Names of the variables available in the source.
    fn available_variables(&self) -> Vec<String>;

    /// Look up a variable by name.
    fn inquire_variable(&self, name: &str) -> Result<VariableMeta, anyhow::Error>;

    /// Read the selected region of `name` into `dst`, blocking until the
    /// data is available.
    ///
    /// `start` and `count` are in the engine's native dimension order and
    /// `dst` must hold exactly the selected number of elements.
    fn get(
        &mut self,
        name: &str,
        start: &[u64],
        count: &[u64],
        dst: &mut [u8],
    ) -> Result<(), anyhow::Error>;

    /// Close the source. Called once by the owning file handle.
    fn close(&mut self) -> Result<(), anyhow::Error>;
}

/// Opens engines. Implemented by container format bindings.
pub trait Backend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Engine>, anyhow::Error>;
}
