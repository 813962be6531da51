//! 标量类型分发.
//!
//! 体数据的元素类型只有在运行时才知道 (来自文件头或调用方给出的类型标签),
//! 而逐体素计算需要静态已知的元素类型. 这里用闭集的 `match` 把运行时标签映射到
//! 对应的泛型单态化实现. 分发在每次调用时只发生一次, 不会出现在逐体素的内层循环里.

use crate::{DynVolume, LabelError, LabelResult, Volume};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

/// 支持的标量元素类型. 这是一个闭集.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScalarType {
    /// `i8`.
    I8,

    /// `u8`.
    U8,

    /// `i16`.
    I16,

    /// `u16`.
    U16,

    /// `i32`.
    I32,

    /// `u32`.
    U32,

    /// `f32`.
    F32,

    /// `f64`.
    F64,
}

impl ScalarType {
    /// 全部支持的类型, 按元素大小升序.
    pub const ALL: [ScalarType; 8] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::F32,
        Self::F64,
    ];

    /// 单个元素所占字节数.
    #[inline]
    pub const fn size(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// 类型的规范名称.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::U8 => "uint8",
            Self::I16 => "int16",
            Self::U16 => "uint16",
            Self::I32 => "int32",
            Self::U32 => "uint32",
            Self::F32 => "float32",
            Self::F64 => "float64",
        }
    }

    /// 是否为浮点类型.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 解析类型名称. 大小写不敏感, 同时接受 `i8`/`u8`/`f32` 这类 Rust 风格的简写,
/// 以及 `float`/`double` 这类 C 风格的别名.
///
/// 未知名称返回 [`LabelError::UnsupportedType`], 而不会退化成某个默认类型.
impl FromStr for ScalarType {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "int8" | "i8" | "char" => Self::I8,
            "uint8" | "u8" | "uchar" => Self::U8,
            "int16" | "i16" | "short" => Self::I16,
            "uint16" | "u16" | "ushort" => Self::U16,
            "int32" | "i32" | "int" => Self::I32,
            "uint32" | "u32" | "uint" => Self::U32,
            "float32" | "f32" | "float" => Self::F32,
            "float64" | "f64" | "double" => Self::F64,
            _ => return Err(LabelError::UnsupportedType(s.to_string())),
        };
        Ok(ty)
    }
}

/// nifti 头部的 `datatype` 到标量类型的映射. 64 位整数、复数和 RGB 等类型不受支持.
impl TryFrom<nifti::NiftiType> for ScalarType {
    type Error = LabelError;

    fn try_from(value: nifti::NiftiType) -> Result<Self, Self::Error> {
        use nifti::NiftiType;

        let ty = match value {
            NiftiType::Int8 => Self::I8,
            NiftiType::Uint8 => Self::U8,
            NiftiType::Int16 => Self::I16,
            NiftiType::Uint16 => Self::U16,
            NiftiType::Int32 => Self::I32,
            NiftiType::Uint32 => Self::U32,
            NiftiType::Float32 => Self::F32,
            NiftiType::Float64 => Self::F64,
            other => return Err(LabelError::UnsupportedType(format!("{other:?}"))),
        };
        Ok(ty)
    }
}

/// 可参与计算的体素元素类型. 仅为 [`ScalarType`] 中的 8 种原生类型实现.
pub trait Scalar:
    Copy + PartialEq + Debug + Send + Sync + num::Zero + num::NumCast + 'static
{
    /// 对应的运行时类型标签.
    const TYPE: ScalarType;

    /// 从小端字节序列解码一个元素. `bytes` 长度必须等于元素大小, 否则程序 panic.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// 包装为运行时类型的体数据.
    fn into_dyn(volume: Volume<Self>) -> DynVolume;
}

macro_rules! impl_scalar {
    ($($t: ty => $tag: ident),+ $(,)?) => {
        $(
            impl Scalar for $t {
                const TYPE: ScalarType = ScalarType::$tag;

                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                #[inline]
                fn into_dyn(volume: Volume<Self>) -> DynVolume {
                    DynVolume::$tag(volume)
                }
            }
        )+
    };
}

impl_scalar!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    f64 => F64,
);

/// 只依赖元素类型 (而不依赖具体数据) 的泛型操作.
///
/// 操作以值传入, 携带它自己需要的全部参数.
pub trait ScalarOp {
    /// 操作结果.
    type Output;

    /// 以具体类型 `T` 执行操作.
    fn call<T: Scalar>(self) -> Self::Output;
}

/// 作用于不可变体数据的泛型操作, 由 [`DynVolume::dispatch`] 调用.
pub trait VolumeVisitor {
    /// 操作结果.
    type Output;

    /// 以具体类型的体数据执行操作.
    fn visit<T: Scalar>(self, volume: &Volume<T>) -> Self::Output;
}

/// 作用于可变体数据的泛型操作, 由 [`DynVolume::dispatch_mut`] 调用.
pub trait VolumeVisitorMut {
    /// 操作结果.
    type Output;

    /// 以具体类型的可变体数据执行操作.
    fn visit_mut<T: Scalar>(self, volume: &mut Volume<T>) -> Self::Output;
}

/// 以类型标签 `tag` 对应的具体类型执行 `op`, 同步地、恰好一次.
#[inline]
pub fn invoke<Op: ScalarOp>(tag: ScalarType, op: Op) -> Op::Output {
    match tag {
        ScalarType::I8 => op.call::<i8>(),
        ScalarType::U8 => op.call::<u8>(),
        ScalarType::I16 => op.call::<i16>(),
        ScalarType::U16 => op.call::<u16>(),
        ScalarType::I32 => op.call::<i32>(),
        ScalarType::U32 => op.call::<u32>(),
        ScalarType::F32 => op.call::<f32>(),
        ScalarType::F64 => op.call::<f64>(),
    }
}

/// 与 [`invoke`] 相同, 但类型由名称给出. 未知名称返回 `Err`, 此时 `op` 不会被执行.
pub fn invoke_by_name<Op: ScalarOp>(name: &str, op: Op) -> LabelResult<Op::Output> {
    let tag: ScalarType = name.parse()?;
    Ok(invoke(tag, op))
}
