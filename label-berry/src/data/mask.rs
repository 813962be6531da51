use std::collections::BTreeMap;
use std::ops::Index;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::consts::label::{is_foreground, U8_MAX_LABEL};
use crate::Idx3d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 重标号后的标签体数据.
///
/// 每个体素的值要么为 0 (背景, 或被抹去的连通域), 要么为 `1..=num_labels` 中的标签.
/// 标签 1 对应体积最大的连通域, 以此类推.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
    data: Array3<u32>,
    num_labels: u32,
}

impl Index<Idx3d> for LabelMask {
    type Output = u32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LabelMask {
    #[inline]
    pub(crate) fn new(data: Array3<u32>, num_labels: u32) -> Self {
        debug_assert!(data.iter().all(|&l| l <= num_labels));
        Self { data, num_labels }
    }

    /// 以已有的标签数据创建实体. `num_labels` 取数据中的最大标签值.
    ///
    /// 本函数不检查标签是否按体积降序排列.
    pub fn from_raw(data: Array3<u32>) -> Self {
        let num_labels = data.iter().copied().max().unwrap_or(0);
        Self { data, num_labels }
    }

    /// 获取数据形状 `(nz, ny, nx)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
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

    /// 最大标签值, 即存活的连通域个数.
    #[inline]
    pub fn num_labels(&self) -> u32 {
        self.num_labels
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u32> {
        self.data.view()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<u32> {
        self.data
    }

    /// 获取标签为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u32) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }

    /// 获取每个前景标签的体素个数, 按标签升序. 不出现的标签不在结果中.
    pub fn sizes(&self) -> BTreeMap<u32, u64> {
        let mut ans = BTreeMap::new();
        for &l in self.data.iter().filter(|&&l| is_foreground(l)) {
            *ans.entry(l).or_insert(0) += 1;
        }
        ans
    }

    /// 收集所有标签为 `label` 的体素下标, 结果按行优先存储.
    pub fn label_pos(&self, label: u32) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &l)| (l == label).then_some(pos))
            .collect()
    }

    /// 非背景体素的个数.
    #[inline]
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&l| is_foreground(l)).count()
    }

    /// 转换为单字节标签数据. 当存在大于 255 的标签时返回 `None`.
    pub fn to_u8(&self) -> Option<ndarray::Array3<u8>> {
        (self.num_labels <= U8_MAX_LABEL).then(|| self.data.mapv(|l| l as u8))
    }

    /// 获取 z 空间的第 `z_index` 层切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice {
            data: self.data.index_axis(Axis(0), z_index),
            num_labels: self.num_labels,
        }
    }

    /// 获取能按升序迭代水平切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = MaskSlice<'_>> {
        let num_labels = self.num_labels;
        self.data
            .axis_iter(Axis(0))
            .map(move |data| MaskSlice { data, num_labels })
    }
}

/// 不可变、借用的二维水平标签切片.
#[derive(Debug, Clone)]
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`LabelMask`].
    data: ArrayView2<'a, u32>,

    /// 整个标签体数据的标签个数, 用于可视化时的灰度映射.
    num_labels: u32,
}

impl Index<(usize, usize)> for MaskSlice<'_> {
    type Output = u32;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[index]
    }
}

impl MaskSlice<'_> {
    /// 获取切片形状 `(ny, nx)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// 整个标签体数据的标签个数.
    #[inline]
    pub fn num_labels(&self) -> u32 {
        self.num_labels
    }

    /// 获取按行优先迭代 `((y, x), 标签)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((usize, usize), &u32)> {
        self.data.indexed_iter()
    }
}
