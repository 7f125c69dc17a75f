use crate::error::Error;
use crate::shape::{Lod, Shape};
use ndarray::{ArrayD, IxDyn};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

static TENSOR_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    TENSOR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Element type of a tensor's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum DataType {
    Float32,
    /// IEEE half stored as raw bits
    Float16,
    Int32,
    Int64,
}

/// Typed flat buffer owned by a tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    F16(Vec<u16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
}

impl TensorData {
    pub fn data_type(&self) -> DataType {
        match self {
            TensorData::F32(_) => DataType::Float32,
            TensorData::F16(_) => DataType::Float16,
            TensorData::I32(_) => DataType::Int32,
            TensorData::I64(_) => DataType::Int64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::F16(v) => v.len(),
            TensorData::I32(v) => v.len(),
            TensorData::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct TensorInner {
    pub id: usize,
    pub dims: Shape,
    pub lod: Lod,
    pub data: Option<TensorData>,
}

/// Shared handle to a host-side tensor.
///
/// Cloning the handle shares the underlying tensor, so an op that resizes its
/// output is seen by every holder of that variable.
#[derive(Clone)]
pub struct Tensor {
    inner: Rc<RefCell<TensorInner>>,
}

impl Tensor {
    /// Creates an unallocated tensor with the given dims.
    pub fn new(dims: Shape) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TensorInner {
                id: next_id(),
                dims,
                lod: Lod::new(),
                data: None,
            })),
        }
    }

    pub fn empty() -> Self {
        Self::new(Shape::default())
    }

    /// Creates a tensor from data and dims, checking the element count.
    pub fn from_data(data: TensorData, dims: Shape) -> Result<Self, Error> {
        let expected = dims.production()?;
        if expected != data.len() {
            return Err(Error::ShapeError(format!(
                "shape {} needs {} elements, data has {}",
                dims,
                expected,
                data.len()
            )));
        }
        let tensor = Self::new(dims);
        tensor.inner.borrow_mut().data = Some(data);
        Ok(tensor)
    }

    pub fn from_f32(data: Vec<f32>, shape: &[usize]) -> Result<Self, Error> {
        Self::from_data(TensorData::F32(data), Shape::from_usize(shape))
    }

    pub fn id(&self) -> usize {
        self.inner.borrow().id
    }

    pub fn dims(&self) -> Shape {
        self.inner.borrow().dims.clone()
    }

    /// Replaces the dims. Data allocated under the old dims is dropped when
    /// the element count no longer matches.
    pub fn resize(&self, dims: Shape) {
        let mut inner = self.inner.borrow_mut();
        let keep = match (&inner.data, dims.production()) {
            (Some(data), Ok(n)) => data.len() == n,
            _ => false,
        };
        if !keep {
            inner.data = None;
        }
        inner.dims = dims;
    }

    pub fn lod(&self) -> Lod {
        self.inner.borrow().lod.clone()
    }

    pub fn set_lod(&self, lod: Lod) {
        self.inner.borrow_mut().lod = lod;
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.inner.borrow().data.as_ref().map(TensorData::data_type)
    }

    pub fn numel(&self) -> Result<usize, Error> {
        self.inner.borrow().dims.production()
    }

    /// Borrows the tensor's data, if allocated.
    pub fn data(&self) -> Ref<'_, Option<TensorData>> {
        Ref::map(self.inner.borrow(), |inner| &inner.data)
    }

    /// Returns the f32 buffer, allocating zeros for the current dims when the
    /// tensor holds no f32 data of the right length.
    pub fn mutable_data_f32(&self) -> Result<RefMut<'_, Vec<f32>>, Error> {
        let mut inner = self.inner.try_borrow_mut().map_err(|_| {
            Error::InvalidOperation("tensor is already borrowed; output aliases an input".into())
        })?;
        let n = inner.dims.production()?;
        let reuse = matches!(&inner.data, Some(TensorData::F32(v)) if v.len() == n);
        if !reuse {
            inner.data = Some(TensorData::F32(vec![0.0; n]));
        }
        RefMut::filter_map(inner, |inner| match inner.data.as_mut() {
            Some(TensorData::F32(v)) => Some(v),
            _ => None,
        })
        .map_err(|_| Error::InternalLogicError("f32 buffer missing after allocation".into()))
    }

    /// Mutably borrows the tensor's data slot.
    pub fn data_mut(&self) -> Result<RefMut<'_, Option<TensorData>>, Error> {
        self.inner
            .try_borrow_mut()
            .map(|inner| RefMut::map(inner, |inner| &mut inner.data))
            .map_err(|_| Error::InvalidOperation("tensor is already borrowed".into()))
    }

    pub fn to_vec_f32(&self) -> Result<Vec<f32>, Error> {
        match &*self.data() {
            Some(TensorData::F32(v)) => Ok(v.clone()),
            Some(other) => Err(Error::UnsupportedType {
                op: "to_vec_f32".to_string(),
                dtype: other.data_type(),
            }),
            None => Err(Error::EmptyTensor(format!("#{}", self.id()))),
        }
    }

    /// Copies f32 data into an ndarray shaped by the tensor's dims.
    pub fn to_ndarray(&self) -> Result<ArrayD<f32>, Error> {
        let shape = self.dims().to_usize()?;
        let data = self.to_vec_f32()?;
        ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| Error::ShapeError(e.to_string()))
    }

    /// True when both handles point at the same tensor.
    pub fn same_as(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Tensor")
            .field("id", &inner.id)
            .field("dims", &inner.dims)
            .field("lod", &inner.lod)
            .field("dtype", &inner.data.as_ref().map(TensorData::data_type))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_checks_len() {
        assert!(Tensor::from_f32(vec![1.0, 2.0], &[3]).is_err());
        let t = Tensor::from_f32(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        assert_eq!(t.data_type(), Some(DataType::Float32));
    }

    #[test]
    fn test_resize_drops_mismatched_data() {
        let t = Tensor::from_f32(vec![1.0; 6], &[2, 3]).unwrap();
        t.resize(Shape::new(vec![3, 2]));
        assert!(t.data().is_some());
        t.resize(Shape::new(vec![4]));
        assert!(t.data().is_none());
    }

    #[test]
    fn test_mutable_data_allocates() {
        let t = Tensor::new(Shape::new(vec![2, 2]));
        assert_eq!(t.mutable_data_f32().unwrap().len(), 4);
        let dynamic = Tensor::new(Shape::new(vec![-1, 2]));
        assert!(dynamic.mutable_data_f32().is_err());
    }

    #[test]
    fn test_to_ndarray() {
        let t = Tensor::from_f32(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let arr = t.to_ndarray().unwrap();
        assert_eq!(arr.shape(), &[2, 2]);
        assert_eq!(arr[[1, 0]], 3.0);
    }
}
