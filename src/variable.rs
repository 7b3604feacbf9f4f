//! Variable handles: cached metadata and selection reads.

use std::fmt;

use byte_slice_cast::IntoVecOf;
use log::{debug, trace};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use crate::dtype::{Datatype, VarValue};
use crate::engine::VariableMeta;
use crate::file::EngineSlot;
use crate::index::Indices;

/// A handle to one variable of an open [`File`](crate::File).
///
/// The shape is in the user-visible row-major dimension order, the reverse
/// of the engine's native column-major order. Metadata is cached when the
/// handle is constructed and never refreshed.
pub struct Variable {
    name: String,
    shape: Vec<u64>,
    dtype: Datatype,
    engine: Option<EngineSlot>,
}

impl Variable {
    pub(crate) fn new(meta: VariableMeta, engine: EngineSlot) -> Result<Variable, anyhow::Error> {
        let dtype = Datatype::from_type_name(&meta.dtype)?;

        // Native order is reversed exactly here and in `Selection::to_native`.
        let shape: Vec<u64> = meta.shape.iter().rev().copied().collect();
        debug!(
            "variable {}: shape {:?}, {}",
            meta.name,
            shape,
            dtype.type_name()
        );

        Ok(Variable {
            name: meta.name,
            shape,
            dtype,
            engine: Some(engine),
        })
    }

    fn engine(&self) -> Result<&EngineSlot, anyhow::Error> {
        self.engine
            .as_ref()
            .ok_or_else(|| anyhow!("variable is closed"))
    }

    /// Variable name.
    pub fn name(&self) -> Result<&str, anyhow::Error> {
        self.engine()?;
        Ok(&self.name)
    }

    /// Shape in user-visible dimension order.
    pub fn shape(&self) -> Result<&[u64], anyhow::Error> {
        self.engine()?;
        Ok(&self.shape)
    }

    /// Element type.
    pub fn dtype(&self) -> Result<Datatype, anyhow::Error> {
        self.engine()?;
        Ok(self.dtype)
    }

    /// Release the engine reference. Any later access fails.
    pub fn close(&mut self) {
        trace!("variable {} closed", self.name);
        self.engine = None;
    }

    /// Read the selected region into a freshly allocated column-major array.
    ///
    /// Takes one index expression per dimension; integer expressions squeeze
    /// their dimension out of the result. `T` must match the variable
    /// datatype.
    ///
    /// ```no_run
    /// # use bpsel::Variable;
    /// # fn read(v: &Variable) -> anyhow::Result<()> {
    /// let plane = v.values::<f64, _>((0, .., 2..10))?;
    /// # Ok(()) }
    /// ```
    pub fn values<T, I>(&self, indices: I) -> Result<ArrayD<T>, anyhow::Error>
    where
        T: VarValue,
        I: TryInto<Indices>,
        I::Error: Into<anyhow::Error>,
    {
        let slot = self.engine()?;
        ensure!(
            T::DATATYPE == self.dtype,
            "type mismatch: variable {} is {}",
            self.name,
            self.dtype.type_name()
        );

        let indices: Indices = indices.try_into().map_err(|e| e.into())?;
        let sel = indices.resolve(&self.shape)?;
        let (start, count) = sel.to_native();
        debug!(
            "reading {}: start {:?} count {:?}",
            self.name,
            sel.start(),
            sel.count()
        );

        let mut buf = vec![0u8; sel.size() * self.dtype.dsize()];
        {
            let mut guard = slot.lock().unwrap();
            let engine = guard
                .as_mut()
                .ok_or_else(|| anyhow!("variable is closed"))?;
            engine.get(&self.name, &start, &count, &mut buf)?;
        }

        let values = buf.into_vec_of::<T>()?;
        Ok(ArrayD::from_shape_vec(IxDyn(sel.shape()).f(), values)?)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("closed", &self.engine.is_none())
            .finish()
    }
}
