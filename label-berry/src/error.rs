//! 运行时错误.

use thiserror::Error;

/// 标记 / 质心提取流水线的运行时错误.
///
/// 只有配置类错误 (未知标量类型、不匹配的平面分区等) 和输入数据的构造错误会出现在这里.
/// 空体数据、上限为 0、没有连通域存活等退化输入都不是错误.
#[derive(Debug, Error)]
pub enum LabelError {
    /// 不支持的标量类型标签. 参数为类型的文字描述.
    #[error("不支持的标量类型 `{0}`")]
    UnsupportedType(String),

    /// 裸体素缓冲区长度与 `形状 * 元素大小` 不符.
    #[error("体素缓冲区长度不符: 期望 {expected} 字节, 实际 {actual} 字节")]
    BufferLength {
        /// 期望的字节数.
        expected: usize,

        /// 实际的字节数.
        actual: usize,
    },

    /// 给定的背景值无法用体数据的元素类型表示.
    #[error("背景值 {value} 无法表示为 `{ty}`")]
    InvalidBackground {
        /// 给定的背景值.
        value: f64,

        /// 体数据的元素类型.
        ty: crate::ScalarType,
    },

    /// 数据形状与元素个数不符.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// 读取 nifti 文件失败.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 平面分区中, 标签集合个数与点集个数不一致.
    #[error("平面分区不一致: {label_sets} 个标签集合, {point_lists} 个点集")]
    PartitionMismatch {
        /// 标签集合个数.
        label_sets: usize,

        /// 点集个数.
        point_lists: usize,
    },

    /// 平面分区中出现了非法标签 (标签从 1 开始计数).
    #[error("非法标签 `{0}`, 标签必须为正整数")]
    InvalidLabel(u32),
}

/// 标记 / 质心提取运行时结果.
pub type LabelResult<T> = Result<T, LabelError>;
