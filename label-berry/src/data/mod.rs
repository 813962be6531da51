use std::ops::{Index, IndexMut};

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use crate::consts::ElemType;
use crate::dispatch::{invoke, invoke_by_name, ScalarOp};
use crate::{Idx3d, LabelError, LabelResult, Landmarks, Scalar, ScalarType};
use crate::{VolumeVisitor, VolumeVisitorMut};

mod io;
mod mask;
mod save;

#[cfg(test)]
pub(crate) mod test_utils;

pub use mask::{LabelMask, MaskSlice};
pub use save::{ImgWriteRaw, ImgWriteVis};

/// 三维标量体数据. 元素类型在编译期已知.
///
/// 数据按 `(z, y, x)` 组织, 即 z 变化最慢, x 变化最快 (行优先).
/// 体数据同时携带一个背景值 (默认为 0) 和一个默认的 landmarks 点集.
#[derive(Debug, Clone)]
pub struct Volume<T: Scalar> {
    data: Array3<T>,
    background: T,
    landmarks: Landmarks,
}

impl<T: Scalar> Index<Idx3d> for Volume<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl<T: Scalar> IndexMut<Idx3d> for Volume<T> {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: Scalar> Volume<T> {
    /// 以 `data` 创建体数据, 背景值为 0.
    ///
    /// 非标准内存布局的数据会被复制为标准布局.
    #[inline]
    pub fn new(data: Array3<T>) -> Self {
        Self::with_background(data, T::zero())
    }

    /// 以 `data` 创建体数据, 并指定背景值.
    pub fn with_background(data: Array3<T>, background: T) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        Self {
            data,
            background,
            landmarks: Landmarks::new(),
        }
    }

    /// 从行优先的扁平缓冲区创建体数据. `shape` 为 `(nz, ny, nx)`.
    ///
    /// 如果 `buf.len()` 不等于 `nz * ny * nx`, 返回 `Err`.
    pub fn from_shape_vec(shape: Idx3d, buf: Vec<T>) -> LabelResult<Self> {
        Ok(Self::new(Array3::from_shape_vec(shape, buf)?))
    }

    /// 创建全背景 (全 0) 的体数据.
    #[inline]
    pub fn zeros(shape: Idx3d) -> Self {
        Self::new(Array3::zeros(shape))
    }

    /// 获取数据形状 `(nz, ny, nx)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取各维度大小 `(nx, ny, nz)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        let (z, y, x) = self.shape();
        (x, y, z)
    }

    /// 获取体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否存在长度为 0 的维度.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 运行时类型标签.
    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        T::TYPE
    }

    /// 背景值.
    #[inline]
    pub fn background(&self) -> T {
        self.background
    }

    /// 非背景体素的个数.
    pub fn foreground_count(&self) -> usize {
        let bg = self.background;
        self.data
            .iter()
            .filter(|&&v| ElemType::classify(v, bg).is_foreground())
            .count()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, T> {
        self.data.view_mut()
    }

    /// 附着在体数据上的默认 landmarks.
    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// 附着在体数据上的默认 landmarks, 可变.
    #[inline]
    pub fn landmarks_mut(&mut self) -> &mut Landmarks {
        &mut self.landmarks
    }
}

/// 元素类型在运行时才确定的体数据.
///
/// 每个变体对应 [`ScalarType`] 中的一种类型. 通过 [`DynVolume::dispatch`]
/// 把泛型操作作用到具体类型上.
#[derive(Debug, Clone)]
pub enum DynVolume {
    /// `i8` 体数据.
    I8(Volume<i8>),

    /// `u8` 体数据.
    U8(Volume<u8>),

    /// `i16` 体数据.
    I16(Volume<i16>),

    /// `u16` 体数据.
    U16(Volume<u16>),

    /// `i32` 体数据.
    I32(Volume<i32>),

    /// `u32` 体数据.
    U32(Volume<u32>),

    /// `f32` 体数据.
    F32(Volume<f32>),

    /// `f64` 体数据.
    F64(Volume<f64>),
}

/// 对 `DynVolume` 的每个变体执行同一段代码.
macro_rules! for_each_variant {
    ($value: expr, $v: ident => $body: expr) => {
        match $value {
            DynVolume::I8($v) => $body,
            DynVolume::U8($v) => $body,
            DynVolume::I16($v) => $body,
            DynVolume::U16($v) => $body,
            DynVolume::I32($v) => $body,
            DynVolume::U32($v) => $body,
            DynVolume::F32($v) => $body,
            DynVolume::F64($v) => $body,
        }
    };
}

impl<T: Scalar> From<Volume<T>> for DynVolume {
    #[inline]
    fn from(volume: Volume<T>) -> Self {
        T::into_dyn(volume)
    }
}

impl DynVolume {
    /// 从小端字节缓冲区创建体数据. 元素类型由运行时标签 `tag` 给出,
    /// `shape` 为 `(nz, ny, nx)`.
    ///
    /// 如果 `bytes.len()` 不等于 `nz * ny * nx * tag.size()`, 返回 `Err`.
    pub fn from_raw(tag: ScalarType, shape: Idx3d, bytes: &[u8]) -> LabelResult<Self> {
        invoke(tag, DecodeRaw { shape, bytes })
    }

    /// 与 [`Self::from_raw`] 相同, 但元素类型以名称给出 (如 `"uint16"`, `"float"`).
    /// 未知名称是配置错误.
    pub fn from_raw_named(name: &str, shape: Idx3d, bytes: &[u8]) -> LabelResult<Self> {
        invoke_by_name(name, DecodeRaw { shape, bytes })?
    }

    /// 运行时类型标签.
    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        for_each_variant!(self, v => v.scalar_type())
    }

    /// 获取数据形状 `(nz, ny, nx)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        for_each_variant!(self, v => v.shape())
    }

    /// 获取体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        for_each_variant!(self, v => v.size())
    }

    /// 是否存在长度为 0 的维度.
    #[inline]
    pub fn is_empty(&self) -> bool {
        for_each_variant!(self, v => v.is_empty())
    }

    /// 附着在体数据上的默认 landmarks.
    #[inline]
    pub fn landmarks(&self) -> &Landmarks {
        for_each_variant!(self, v => v.landmarks())
    }

    /// 附着在体数据上的默认 landmarks, 可变.
    #[inline]
    pub fn landmarks_mut(&mut self) -> &mut Landmarks {
        for_each_variant!(self, v => v.landmarks_mut())
    }

    /// 以具体元素类型的体数据执行 `visitor`, 恰好一次.
    #[inline]
    pub fn dispatch<V: VolumeVisitor>(&self, visitor: V) -> V::Output {
        for_each_variant!(self, v => visitor.visit(v))
    }

    /// 以具体元素类型的可变体数据执行 `visitor`, 恰好一次.
    #[inline]
    pub fn dispatch_mut<V: VolumeVisitorMut>(&mut self, visitor: V) -> V::Output {
        for_each_variant!(self, v => visitor.visit_mut(v))
    }
}

/// 把小端字节缓冲区解码为具体类型的体数据.
struct DecodeRaw<'a> {
    shape: Idx3d,
    bytes: &'a [u8],
}

impl ScalarOp for DecodeRaw<'_> {
    type Output = LabelResult<DynVolume>;

    fn call<T: Scalar>(self) -> Self::Output {
        let width = T::TYPE.size();
        let (z, y, x) = self.shape;
        let expected = z.saturating_mul(y).saturating_mul(x).saturating_mul(width);
        if self.bytes.len() != expected {
            return Err(LabelError::BufferLength {
                expected,
                actual: self.bytes.len(),
            });
        }

        let buf: Vec<T> = self.bytes.chunks_exact(width).map(T::from_le_slice).collect();
        Ok(Volume::from_shape_vec(self.shape, buf)?.into())
    }
}
