//! # BPSEL
//!
//! NumPy-style slicing over named array variables in ADIOS2-style BP
//! sources.
//!
//! The substantive I/O (on-disk layout, chunking, compression) lives in an
//! engine behind the [`engine::Backend`] and [`engine::Engine`] traits. This
//! crate translates per-dimension index expressions into (start, count)
//! selections, reverses dimension order between the user-visible row-major
//! convention and the engine's native column-major one, and manages handle
//! lifecycle: a [`File`] owns its engine and IO-context registration, and
//! closing it invalidates every [`Variable`] handle it has vended.
//!
//! An in-memory backend ([`engine::MemBackend`]) is included for tests and
//! as a reference for engine implementations.
//!
//! ## Usage
//!
//! Declare a context with a backend, open a file, then slice its variables:
//!
//! ```
//! use bpsel::prelude::*;
//!
//! let mut f = MemFile::new();
//! // Native shape (2, 3), row i holding 10 i + j.
//! f.push_f64("T", &[2, 3], &[0., 1., 2., 10., 11., 12.]);
//! let mut backend = MemBackend::new();
//! backend.insert("sim.bp", f);
//!
//! let ad = Adios::new(backend);
//! let file = ad.open("sim.bp").unwrap();
//!
//! let t = file.variable("T").unwrap();
//! assert_eq!(t.shape().unwrap(), &[3, 2]);
//!
//! let col = t.values::<f64, _>((0, ..)).unwrap();
//! assert_eq!(col.as_slice_memory_order().unwrap(), &[0., 10.][..]);
//! ```

#[macro_use]
extern crate anyhow;

pub mod adios;
pub mod dtype;
pub mod engine;
pub mod file;
pub mod index;
pub mod variable;

pub use adios::Adios;
pub use dtype::Datatype;
pub use file::File;
pub use index::{IndexExpr, Indices, Selection};
pub use variable::Variable;

pub mod prelude {
    pub use crate::engine::{Backend, Engine, MemBackend, MemFile, VariableMeta};
    pub use crate::{Adios, Datatype, File, IndexExpr, Indices, Variable};
}
