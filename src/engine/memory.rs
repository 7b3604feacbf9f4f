//! An in-memory [`Backend`] keeping variables per path.
//!
//! Serves as the test substrate for the indexing layer and as a reference
//! for engine implementations. Data is stored the way a native engine stores
//! it: native dimension order, last dimension varying fastest.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use byte_slice_cast::AsByteSlice;
use itertools::izip;

use super::{Backend, Engine, VariableMeta};

#[derive(Debug, Clone)]
struct MemVariable {
    meta: VariableMeta,
    dsize: usize,
    data: Vec<u8>,
}

/// A set of named variables making up one in-memory source.
#[derive(Debug, Clone, Default)]
pub struct MemFile {
    vars: BTreeMap<String, MemVariable>,
}

impl MemFile {
    pub fn new() -> MemFile {
        MemFile::default()
    }

    /// Add a variable from raw element bytes. `shape` is in native
    /// (column-major) dimension order and `data` is laid out with the last
    /// native dimension varying fastest.
    pub fn push_raw(&mut self, name: &str, dtype: &str, dsize: usize, shape: &[u64], data: Vec<u8>) {
        assert_eq!(shape.iter().product::<u64>() as usize * dsize, data.len());

        self.vars.insert(
            name.to_string(),
            MemVariable {
                meta: VariableMeta {
                    name: name.to_string(),
                    shape: shape.to_vec(),
                    dtype: dtype.to_string(),
                },
                dsize,
                data,
            },
        );
    }

    pub fn push_f32(&mut self, name: &str, shape: &[u64], values: &[f32]) {
        self.push_raw(name, "float", 4, shape, values.as_byte_slice().to_vec());
    }

    pub fn push_f64(&mut self, name: &str, shape: &[u64], values: &[f64]) {
        self.push_raw(name, "double", 8, shape, values.as_byte_slice().to_vec());
    }
}

/// An in-memory backend mapping paths to [`MemFile`]s.
#[derive(Debug, Clone, Default)]
pub struct MemBackend {
    files: HashMap<PathBuf, MemFile>,
}

impl MemBackend {
    pub fn new() -> MemBackend {
        MemBackend::default()
    }

    pub fn insert<P>(&mut self, path: P, file: MemFile)
    where
        P: Into<PathBuf>,
    {
        self.files.insert(path.into(), file);
    }
}

impl Backend for MemBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn Engine>, anyhow::Error> {
        let file = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("{}: no such source", path.display()))?;

        Ok(Box::new(MemEngine {
            file,
            closed: false,
        }))
    }
}

struct MemEngine {
    file: MemFile,
    closed: bool,
}

impl Engine for MemEngine {
    fn available_variables(&self) -> Vec<String> {
        self.file.vars.keys().cloned().collect()
    }

    fn inquire_variable(&self, name: &str) -> Result<VariableMeta, anyhow::Error> {
        self.file
            .vars
            .get(name)
            .map(|v| v.meta.clone())
            .ok_or_else(|| anyhow!("no such variable: {}", name))
    }

    fn get(
        &mut self,
        name: &str,
        start: &[u64],
        count: &[u64],
        dst: &mut [u8],
    ) -> Result<(), anyhow::Error> {
        ensure!(!self.closed, "engine is closed");

        let var = self
            .file
            .vars
            .get(name)
            .ok_or_else(|| anyhow!("no such variable: {}", name))?;

        let shape = &var.meta.shape;
        ensure!(
            start.len() == shape.len() && count.len() == shape.len(),
            "selection rank does not match variable rank"
        );
        ensure!(
            izip!(start, count, shape).all(|(s, c, z)| s + c <= *z),
            "selection out of bounds: start {:?} count {:?} shape {:?}",
            start,
            count,
            shape
        );

        let n = count.iter().product::<u64>() as usize;
        ensure!(
            dst.len() == n * var.dsize,
            "destination buffer does not match selection size"
        );

        copy_region(shape, var.dsize, &var.data, start, count, dst);

        Ok(())
    }

    fn close(&mut self) -> Result<(), anyhow::Error> {
        ensure!(!self.closed, "engine is closed");
        self.closed = true;

        Ok(())
    }
}

/// Copy the selected region out of a buffer in native layout. The run along
/// the last dimension is contiguous, the outer dimensions are walked with an
/// odometer.
fn copy_region(shape: &[u64], dsize: usize, src: &[u8], start: &[u64], count: &[u64], dst: &mut [u8]) {
    let n = shape.len();
    if n == 0 {
        dst.copy_from_slice(&src[..dsize]);
        return;
    }

    // Element strides per dimension.
    let mut strides = vec![1u64; n];
    for d in (0..n - 1).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }

    let run = count[n - 1] as usize * dsize;
    let mut odo = vec![0u64; n - 1];
    let mut pos = 0;

    loop {
        let off = izip!(&odo, start, &strides)
            .map(|(o, s, st)| (o + s) * st)
            .sum::<u64>()
            + start[n - 1];
        let off = off as usize * dsize;

        dst[pos..pos + run].copy_from_slice(&src[off..off + run]);
        pos += run;

        // Advance the odometer over the outer dimensions.
        let mut d = n - 1;
        loop {
            if d == 0 {
                return;
            }
            d -= 1;
            odo[d] += 1;
            if odo[d] < count[d] {
                break;
            }
            odo[d] = 0;
        }
    }
}
