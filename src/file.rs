//! File handles owning an engine and its IO-context registration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::adios::Adios;
use crate::engine::Engine;
use crate::variable::Variable;

/// The engine of an open file, shared with every vended [`Variable`].
/// Emptied on close, which invalidates all variable handles at once.
pub(crate) type EngineSlot = Arc<Mutex<Option<Box<dyn Engine>>>>;

/// An open data source.
///
/// Dropping the handle closes it as a safety net; call [`File::close`] to
/// observe errors.
pub struct File {
    ctx: Adios,
    path: PathBuf,
    io_name: Option<String>,
    engine: Option<EngineSlot>,
    variables: BTreeSet<String>,
}

impl File {
    /// Open `path` for reading, declaring an IO context named after the
    /// path.
    pub fn open<P>(ctx: &Adios, path: P) -> Result<File, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let io_name = format!("io-{}", path.display());
        ctx.declare_io(&io_name)?;

        let engine = match ctx.open_engine(path) {
            Ok(engine) => engine,
            Err(e) => {
                ctx.remove_io(&io_name);
                return Err(e);
            }
        };
        let variables = engine.available_variables().into_iter().collect();
        debug!("opened {} (io context {})", path.display(), io_name);

        Ok(File {
            ctx: ctx.clone(),
            path: path.into(),
            io_name: Some(io_name),
            engine: Some(Arc::new(Mutex::new(Some(engine)))),
            variables,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Variable names, snapshotted when the file was opened.
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Look up a variable by name.
    ///
    /// Every call vends a new handle; all handles are invalidated when the
    /// file closes.
    pub fn variable(&self, name: &str) -> Result<Variable, anyhow::Error> {
        let slot = self
            .engine
            .as_ref()
            .ok_or_else(|| anyhow!("file is closed"))?;

        let meta = {
            let guard = slot.lock().unwrap();
            let engine = guard.as_ref().ok_or_else(|| anyhow!("file is closed"))?;
            engine.inquire_variable(name)?
        };

        Variable::new(meta, slot.clone())
    }

    /// Close the engine, invalidating every vended variable handle, and
    /// remove the IO context. Fails if the file is already closed.
    pub fn close(&mut self) -> Result<(), anyhow::Error> {
        let slot = self
            .engine
            .take()
            .ok_or_else(|| anyhow!("file is closed"))?;

        let res = match slot.lock().unwrap().take() {
            Some(mut engine) => engine.close(),
            None => Ok(()),
        };

        // The IO name is released even if the engine failed to close.
        if let Some(io_name) = self.io_name.take() {
            self.ctx.remove_io(&io_name);
        }
        debug!("closed {}", self.path.display());

        res
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if self.engine.is_some() {
            if let Err(e) = self.close() {
                warn!("{}: error while closing: {}", self.path.display(), e);
            }
        }
    }
}
