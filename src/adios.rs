//! The IO-context registry.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::trace;

use crate::engine::{Backend, Engine};
use crate::file::File;

/// Entry point of the library: owns a [`Backend`] and the registry of
/// declared IO contexts.
///
/// ADIOS keeps this registry as process-global state. Here it is an explicit
/// object, so its lifetime is scoped and independent registries can coexist.
/// Handles are cheap to clone and share the same registry.
#[derive(Clone)]
pub struct Adios {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Box<dyn Backend>,
    ios: Mutex<HashSet<String>>,
}

impl Adios {
    pub fn new<B>(backend: B) -> Adios
    where
        B: Backend + 'static,
    {
        Adios {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                ios: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Open `path` for reading.
    pub fn open<P>(&self, path: P) -> Result<File, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        File::open(self, path)
    }

    /// Names of the currently declared IO contexts.
    pub fn io_names(&self) -> Vec<String> {
        let ios = self.inner.ios.lock().unwrap();
        ios.iter().cloned().collect()
    }

    /// Declare a new IO context. The name stays reserved until it is removed
    /// by the owning file handle.
    pub(crate) fn declare_io(&self, name: &str) -> Result<(), anyhow::Error> {
        let mut ios = self.inner.ios.lock().unwrap();
        ensure!(
            ios.insert(name.to_string()),
            "io context already declared: {}",
            name
        );
        trace!("declared io context {}", name);

        Ok(())
    }

    pub(crate) fn remove_io(&self, name: &str) {
        let mut ios = self.inner.ios.lock().unwrap();
        ios.remove(name);
        trace!("removed io context {}", name);
    }

    pub(crate) fn open_engine(&self, path: &Path) -> Result<Box<dyn Engine>, anyhow::Error> {
        self.inner.backend.open(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::MemBackend;

    #[test]
    fn io_names_are_unique() {
        let ad = Adios::new(MemBackend::new());

        ad.declare_io("io-a").unwrap();
        assert!(ad.declare_io("io-a").is_err());
        ad.declare_io("io-b").unwrap();

        let mut names = ad.io_names();
        names.sort();
        assert_eq!(names, vec!["io-a".to_string(), "io-b".to_string()]);

        ad.remove_io("io-a");
        assert_eq!(ad.io_names(), vec!["io-b".to_string()]);

        // The registry is shared between handles.
        let ad2 = ad.clone();
        assert!(ad2.declare_io("io-b").is_err());
    }
}
