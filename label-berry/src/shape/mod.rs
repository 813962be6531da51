//! 连通域的形状信息: 体素个数, 质心, 表面体素个数与包围盒.

use std::collections::BTreeMap;

use ndarray::{ArrayView2, Axis};

use crate::consts::label::is_background;
use crate::neighbour::{in_bounds, neighbour26};
use crate::{Idx3d, LabelMask};

/// 单个连通域的统计结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentRecord {
    /// 标签, 从 1 开始.
    pub label: u32,

    /// 体素个数.
    pub voxel_count: u64,

    /// 质心, 索引空间坐标, 按 `[x, y, z]` 排列.
    pub centroid: [f64; 3],

    /// 表面体素个数. 至少有一个 26-邻居不属于本连通域 (含越界) 的体素为表面体素.
    /// 未要求计算时为 `None`.
    pub perimeter: Option<u64>,

    /// 包围盒 `(最小角, 最大角)`, 两端都包含, 按 `(z, y, x)` 排列.
    pub bbox: (Idx3d, Idx3d),
}

impl ComponentRecord {
    /// 包围盒尺寸 `(深, 高, 宽)`.
    #[inline]
    pub fn bbox_dim(&self) -> Idx3d {
        let ((z0, y0, x0), (z1, y1, x1)) = self.bbox;
        (z1 - z0 + 1, y1 - y0 + 1, x1 - x0 + 1)
    }
}

/// 某个标签的累加器.
#[derive(Debug, Clone)]
struct Accumulator {
    count: u64,
    /// `(z, y, x)` 分量之和.
    sum: [u64; 3],
    perimeter: u64,
    min: Idx3d,
    max: Idx3d,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: [0; 3],
            perimeter: 0,
            min: (usize::MAX, usize::MAX, usize::MAX),
            max: (0, 0, 0),
        }
    }
}

impl Accumulator {
    #[inline]
    fn add(&mut self, (z, y, x): Idx3d, on_surface: bool) {
        self.count += 1;
        self.sum[0] += z as u64;
        self.sum[1] += y as u64;
        self.sum[2] += x as u64;
        self.perimeter += on_surface as u64;
        self.min = (self.min.0.min(z), self.min.1.min(y), self.min.2.min(x));
        self.max = (self.max.0.max(z), self.max.1.max(y), self.max.2.max(x));
    }

    #[cfg(feature = "rayon")]
    fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        self.count += other.count;
        for (a, b) in self.sum.iter_mut().zip(other.sum) {
            *a += b;
        }
        self.perimeter += other.perimeter;
        self.min = (
            self.min.0.min(other.min.0),
            self.min.1.min(other.min.1),
            self.min.2.min(other.min.2),
        );
        self.max = (
            self.max.0.max(other.max.0),
            self.max.1.max(other.max.1),
            self.max.2.max(other.max.2),
        );
    }

    fn into_record(self, label: u32, with_perimeter: bool) -> ComponentRecord {
        let n = self.count as f64;
        let [z, y, x] = self.sum.map(|s| s as f64 / n);
        ComponentRecord {
            label,
            voxel_count: self.count,
            centroid: [x, y, z],
            perimeter: with_perimeter.then_some(self.perimeter),
            bbox: (self.min, self.max),
        }
    }
}

/// `pos` 处 (标签为 `label`) 的体素是否为表面体素.
#[inline]
fn on_surface(mask: &LabelMask, pos: Idx3d, label: u32) -> bool {
    let shape = mask.shape();
    neighbour26(pos)
        .into_iter()
        .any(|p| !in_bounds(p, shape) || mask[p] != label)
}

/// 把第 `z` 层切片累加到 `accs` 中.
fn accumulate_slice(
    mask: &LabelMask,
    z: usize,
    slice: ArrayView2<u32>,
    with_perimeter: bool,
    accs: &mut BTreeMap<u32, Accumulator>,
) {
    for ((y, x), &l) in slice.indexed_iter() {
        if is_background(l) {
            continue;
        }
        let pos = (z, y, x);
        let surface = with_perimeter && on_surface(mask, pos, l);
        accs.entry(l).or_default().add(pos, surface);
    }
}

fn collect_records(accs: BTreeMap<u32, Accumulator>, with_perimeter: bool) -> Vec<ComponentRecord> {
    accs.into_iter()
        .map(|(l, acc)| acc.into_record(l, with_perimeter))
        .collect()
}

/// 计算每个连通域的统计结果, 按标签升序返回. 不含任何体素的标签被跳过.
///
/// 标签不必连续. `with_perimeter` 为 `false` 时不计算表面体素, 结果中 `perimeter` 为 `None`.
pub fn extract_components(mask: &LabelMask, with_perimeter: bool) -> Vec<ComponentRecord> {
    let mut accs = BTreeMap::new();
    for (z, slice) in mask.data().axis_iter(Axis(0)).enumerate() {
        accumulate_slice(mask, z, slice, with_perimeter, &mut accs);
    }
    let records = collect_records(accs, with_perimeter);
    log::debug!("提取到 {} 个连通域", records.len());
    records
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 借助 `rayon`, 按水平切片并行地计算每个连通域的统计结果.
///
/// 结果与 [`extract_components`] 完全相同.
#[cfg(feature = "rayon")]
pub fn par_extract_components(mask: &LabelMask, with_perimeter: bool) -> Vec<ComponentRecord> {
    let accs = mask
        .data()
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .fold(BTreeMap::new, |mut accs, (z, slice)| {
            accumulate_slice(mask, z, slice, with_perimeter, &mut accs);
            accs
        })
        .reduce(BTreeMap::new, |mut a, b| {
            for (l, acc) in b {
                a.entry(l).or_default().merge(&acc);
            }
            a
        });
    collect_records(accs, with_perimeter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    /// 一个 `3 x 4 x 5` 的块 (标签 1) 和一个单体素 (标签 2).
    fn block_mask() -> LabelMask {
        let mut data = Array3::zeros((6, 7, 9));
        data.slice_mut(s![1..4, 2..6, 3..8]).fill(1u32);
        data[(5, 0, 0)] = 2;
        LabelMask::from_raw(data)
    }

    #[test]
    fn test_block_centroid() {
        let records = extract_components(&block_mask(), true);
        assert_eq!(records.len(), 2);

        let r = &records[0];
        assert_eq!(r.label, 1);
        assert_eq!(r.voxel_count, 60);
        let [x, y, z] = r.centroid;
        assert!(f64_eq(x, 5.0));
        assert!(f64_eq(y, 3.5));
        assert!(f64_eq(z, 2.0));
        assert_eq!(r.bbox, ((1, 2, 3), (3, 5, 7)));
        assert_eq!(r.bbox_dim(), (3, 4, 5));
        // 内部体素为 1 x 2 x 3.
        assert_eq!(r.perimeter, Some(60 - 6));

        let r = &records[1];
        assert_eq!(r.label, 2);
        assert_eq!(r.centroid, [0.0, 0.0, 5.0]);
        assert_eq!(r.perimeter, Some(1));
    }

    #[test]
    fn test_without_perimeter() {
        let records = extract_components(&block_mask(), false);
        assert!(records.iter().all(|r| r.perimeter.is_none()));
    }

    #[test]
    fn test_border_counts_as_background() {
        // 填满整个体数据: 只有越界邻居才使体素成为表面体素.
        let mask = LabelMask::from_raw(Array3::from_elem((3, 3, 3), 1));
        let records = extract_components(&mask, true);
        assert_eq!(records[0].perimeter, Some(26));
    }

    #[test]
    fn test_skips_missing_labels() {
        let mut data = Array3::zeros((1, 2, 2));
        data[(0, 1, 1)] = 3;
        let records = extract_components(&LabelMask::from_raw(data), true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, 3);

        let empty = LabelMask::from_raw(Array3::zeros((0, 2, 2)));
        assert!(extract_components(&empty, true).is_empty());
    }

    #[test]
    fn test_sparse_labels() {
        let mut data = Array3::zeros((1, 1, 4));
        data[(0, 0, 0)] = 3_000_000_000u32;
        data[(0, 0, 2)] = u32::MAX;
        data[(0, 0, 3)] = u32::MAX;
        let mask = LabelMask::from_raw(data);
        let records = extract_components(&mask, true);
        let labels: Vec<u32> = records.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![3_000_000_000, u32::MAX]);
        assert_eq!(records[1].voxel_count, 2);
        assert_eq!(records[1].centroid, [2.5, 0.0, 0.0]);

        #[cfg(feature = "rayon")]
        assert_eq!(par_extract_components(&mask, true), records);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_matches_sequential() {
        let mut data = Array3::zeros((9, 10, 11));
        for ((z, y, x), l) in data.indexed_iter_mut() {
            *l = ((z * 7 + y * 3 + x) % 5) as u32;
        }
        let mask = LabelMask::from_raw(data);
        for with_perimeter in [true, false] {
            assert_eq!(
                par_extract_components(&mask, with_perimeter),
                extract_components(&mask, with_perimeter)
            );
        }
    }
}
