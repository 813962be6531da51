//! 26-连通域标记.
//!
//! 流程分三步:
//!
//! 1. 行程编码 + 并查集, 得到按光栅顺序编号的原始标签 ([`label_components`]);
//! 2. 强制背景清零 ([`zero_background`]), 保证背景体素的标签一定为 0;
//! 3. 按体积降序重新编号并截断 ([`relabel_components`]).
//!
//! [`label`], [`label_with`] 和 [`label_dyn`] 把三步串起来.

use ndarray::{s, Array3, ArrayView3, Zip};

use crate::consts::label::is_foreground;
use crate::consts::ElemType;
use crate::{DynVolume, LabelError, LabelMask, LabelResult, Scalar, Volume, VolumeVisitor};

mod relabel;
mod runs;
mod union_find;

pub use relabel::relabel_components;
use runs::RunTable;
use union_find::UnionFind;

/// 标记参数.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelSpec {
    /// 最多保留的连通域个数.
    max_label_count: u32,

    /// 背景值. `None` 表示使用体数据自带的背景值.
    background: Option<f64>,
}

impl LabelSpec {
    /// 不限制连通域个数.
    pub const UNLIMITED: u32 = u32::MAX;

    /// 最多保留 `max_label_count` 个连通域, 背景取体数据自带的值.
    #[inline]
    pub fn new(max_label_count: u32) -> Self {
        Self {
            max_label_count,
            background: None,
        }
    }

    /// 覆盖体数据自带的背景值.
    #[inline]
    pub fn with_background(mut self, background: f64) -> Self {
        self.background = Some(background);
        self
    }

    /// 最多保留的连通域个数.
    #[inline]
    pub fn max_label_count(&self) -> u32 {
        self.max_label_count
    }

    /// 覆盖用的背景值.
    #[inline]
    pub fn background(&self) -> Option<f64> {
        self.background
    }
}

impl Default for LabelSpec {
    fn default() -> Self {
        Self::new(Self::UNLIMITED)
    }
}

/// 尚未重标号的标记结果.
#[derive(Debug, Clone)]
pub struct RawLabeling {
    /// 原始标签, 与体数据同形状. 背景为 0, 连通域按首个体素的光栅顺序从 1 编号.
    pub labels: Array3<u32>,

    /// 连通域个数, 即最大的原始标签.
    pub num_labels: u32,
}

/// 对体数据做 26-连通域标记, 得到原始标签. 值不等于背景值的体素为前景.
///
/// 结果已经过 [`zero_background`] 修正.
pub fn label_components<T: Scalar>(volume: &Volume<T>) -> RawLabeling {
    label_view(volume.data(), volume.background())
}

fn label_view<T: Scalar>(data: ArrayView3<T>, background: T) -> RawLabeling {
    let (nz, ny, nx) = data.dim();
    let mut labels = Array3::zeros((nz, ny, nx));
    if labels.is_empty() {
        return RawLabeling {
            labels,
            num_labels: 0,
        };
    }

    let mut uf = UnionFind::new();
    let table = RunTable::build((nz, ny), background, &mut uf, |z, y| {
        data.slice_move(s![z, y, ..])
    });
    let (map, num_labels) = uf.flatten();

    for ((z, y), run) in table.iter() {
        let (start, end) = (run.start as usize, run.end as usize);
        labels
            .slice_mut(s![z, y, start..end])
            .fill(map[run.label as usize]);
    }
    log::debug!("标记完成: {} 个行程, {num_labels} 个连通域", table.len());

    let fixed = zero_background(&mut labels, data, background);
    debug_assert_eq!(fixed, 0);
    RawLabeling { labels, num_labels }
}

/// 把所有背景体素的标签强制置 0, 返回被修正的体素个数.
///
/// 无论标记过程如何实现, 这一步之后 "背景体素标签为 0" 总是成立.
pub fn zero_background<T: Scalar>(
    labels: &mut Array3<u32>,
    data: ArrayView3<T>,
    background: T,
) -> usize {
    assert_eq!(labels.dim(), data.dim(), "标签与体数据形状不一致");

    let mut fixed = 0;
    Zip::from(labels).and(data).for_each(|l, &v| {
        if ElemType::classify(v, background).is_background() && is_foreground(*l) {
            *l = 0;
            fixed += 1;
        }
    });
    if fixed > 0 {
        log::debug!("背景修正: {fixed} 个体素被置 0");
    }
    fixed
}

/// 标记并按体积降序重标号, 最多保留 `max_label_count` 个连通域.
///
/// 标签 1 为体积最大的连通域. 被抹去的连通域和背景的标签为 0.
pub fn label<T: Scalar>(volume: &Volume<T>, max_label_count: u32) -> LabelMask {
    relabel_raw(label_components(volume), max_label_count)
}

/// 与 [`label`] 相同, 参数由 [`LabelSpec`] 给出.
///
/// 如果 `spec` 指定的背景值无法用 `T` 精确表示, 返回 `Err`.
pub fn label_with<T: Scalar>(volume: &Volume<T>, spec: &LabelSpec) -> LabelResult<LabelMask> {
    let background = match spec.background() {
        Some(bg) => cast_background::<T>(bg)?,
        None => volume.background(),
    };
    let raw = label_view(volume.data(), background);
    Ok(relabel_raw(raw, spec.max_label_count()))
}

/// 对运行时类型的体数据调用 [`label`].
pub fn label_dyn(volume: &DynVolume, max_label_count: u32) -> LabelMask {
    volume.dispatch(Labeler(max_label_count))
}

struct Labeler(u32);

impl VolumeVisitor for Labeler {
    type Output = LabelMask;

    #[inline]
    fn visit<T: Scalar>(self, volume: &Volume<T>) -> Self::Output {
        label(volume, self.0)
    }
}

fn relabel_raw(raw: RawLabeling, max_label_count: u32) -> LabelMask {
    let RawLabeling {
        mut labels,
        num_labels,
    } = raw;
    let survivors = relabel_components(&mut labels, num_labels, max_label_count);
    log::debug!("重标号完成: {num_labels} 个连通域, 保留 {survivors} 个");
    LabelMask::new(labels, survivors)
}

/// `bg` 转换为 `T` 后必须能无损转换回来.
fn cast_background<T: Scalar>(bg: f64) -> LabelResult<T> {
    let invalid = || LabelError::InvalidBackground {
        value: bg,
        ty: T::TYPE,
    };
    let v: T = num::NumCast::from(bg).ok_or_else(invalid)?;
    match num::ToPrimitive::to_f64(&v) {
        Some(back) if back == bg => Ok(v),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Idx3d, ScalarType};

    /// 在 `data` 中填充 `[z0, z1) x [y0, y1) x [x0, x1)` 区域.
    fn fill<T: Copy>(data: &mut Array3<T>, (z0, y0, x0): Idx3d, (z1, y1, x1): Idx3d, v: T) {
        data.slice_mut(s![z0..z1, y0..y1, x0..x1]).fill(v);
    }

    /// 三个互不相邻的块, 体积分别为 8, 27, 1.
    fn three_blocks() -> Volume<u8> {
        let mut data = Array3::zeros((5, 8, 12));
        fill(&mut data, (0, 0, 0), (2, 2, 2), 7);
        fill(&mut data, (1, 4, 4), (4, 7, 7), 3);
        fill(&mut data, (4, 0, 10), (5, 1, 11), 1);
        Volume::new(data)
    }

    #[test]
    fn test_raw_labels_raster_order() {
        let raw = label_components(&three_blocks());
        assert_eq!(raw.num_labels, 3);
        assert_eq!(raw.labels[(0, 0, 0)], 1);
        assert_eq!(raw.labels[(1, 4, 4)], 2);
        assert_eq!(raw.labels[(4, 0, 10)], 3);
    }

    #[test]
    fn test_size_ordering() {
        let mask = label(&three_blocks(), 255);
        assert_eq!(mask.num_labels(), 3);
        assert_eq!(mask[(2, 5, 5)], 1);
        assert_eq!(mask[(1, 1, 1)], 2);
        assert_eq!(mask[(4, 0, 10)], 3);
        let sizes: Vec<u64> = mask.sizes().into_values().collect();
        assert_eq!(sizes, vec![27, 8, 1]);
    }

    #[test]
    fn test_background_is_zero() {
        let volume = three_blocks();
        let mask = label(&volume, 255);
        Zip::from(volume.data()).and(mask.data()).for_each(|&v, &l| {
            assert_eq!(v == 0, l == 0);
        });
    }

    #[test]
    fn test_truncation() {
        let mask = label(&three_blocks(), 2);
        assert_eq!(mask.num_labels(), 2);
        assert_eq!(mask[(4, 0, 10)], 0);
        assert_eq!(mask.foreground_count(), 35);
        assert!(mask.data().iter().all(|&l| l <= 2));

        let mask = label(&three_blocks(), 0);
        assert_eq!(mask.num_labels(), 0);
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_equal_sizes_truncated() {
        // 5 个等大的连通域, 保留 3 个.
        let mut data = Array3::zeros((1, 1, 10));
        for i in 0..5 {
            data[(0, 0, 2 * i)] = 1u16;
        }
        let mask = label(&Volume::new(data), 3);
        assert_eq!(mask.num_labels(), 3);
        let row: Vec<u32> = mask.data().iter().copied().collect();
        assert_eq!(row, vec![1, 0, 2, 0, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_and_blank() {
        let mask = label(&Volume::<f32>::zeros((0, 3, 3)), 10);
        assert!(mask.is_empty());
        assert_eq!(mask.num_labels(), 0);

        let mask = label(&Volume::<i32>::zeros((2, 3, 3)), 10);
        assert_eq!(mask.num_labels(), 0);
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_26_connectivity() {
        // 只共享顶点 / 只共享棱的体素属于同一个连通域.
        let mut data = Array3::zeros((3, 3, 5));
        data[(0, 0, 0)] = 1i16;
        data[(1, 1, 1)] = 1;
        data[(2, 2, 1)] = 1;
        data[(0, 0, 4)] = 1; // 与其他体素都不相邻
        let raw = label_components(&Volume::new(data));
        assert_eq!(raw.num_labels, 2);
        assert_eq!(raw.labels[(0, 0, 0)], raw.labels[(2, 2, 1)]);
        assert_ne!(raw.labels[(0, 0, 0)], raw.labels[(0, 0, 4)]);
    }

    #[test]
    fn test_u_shape_merges() {
        // 两条竖臂在底部相连, 扫描时先出现两个临时标签.
        let mut data = Array3::zeros((1, 4, 5));
        fill(&mut data, (0, 0, 0), (1, 4, 1), 1u8);
        fill(&mut data, (0, 0, 4), (1, 4, 5), 1);
        fill(&mut data, (0, 3, 0), (1, 4, 5), 1);
        let raw = label_components(&Volume::new(data));
        assert_eq!(raw.num_labels, 1);
        assert_eq!(raw.labels.iter().filter(|&&l| l == 1).count(), 11);
    }

    #[test]
    fn test_nonzero_background() {
        let mut data = Array3::from_elem((2, 2, 6), -1.0f64);
        data[(0, 0, 0)] = 0.0;
        data[(1, 1, 4)] = 2.5;
        data[(1, 1, 5)] = f64::NAN;
        let volume = Volume::with_background(data, -1.0);
        let mask = label(&volume, 255);
        assert_eq!(mask.num_labels(), 2);
        assert_eq!(mask[(1, 1, 4)], 1);
        assert_eq!(mask[(1, 1, 5)], 1);
        assert_eq!(mask[(0, 0, 0)], 2);
        assert_eq!(mask.foreground_count(), 3);
    }

    #[test]
    fn test_label_with_background() {
        let mut data = Array3::from_elem((1, 2, 3), 5u8);
        data[(0, 1, 2)] = 9;
        let volume = Volume::new(data);

        // 背景 0: 整个体数据是一个连通域.
        assert_eq!(label(&volume, 10).foreground_count(), 6);

        let mask = label_with(&volume, &LabelSpec::new(10).with_background(5.0)).unwrap();
        assert_eq!(mask.num_labels(), 1);
        assert_eq!(mask.foreground_count(), 1);

        for bg in [-1.0, 5.5, 300.0] {
            let err = label_with(&volume, &LabelSpec::default().with_background(bg)).unwrap_err();
            assert!(matches!(
                err,
                LabelError::InvalidBackground { ty: ScalarType::U8, .. }
            ));
        }
    }

    #[test]
    fn test_idempotent() {
        let mask = label(&three_blocks(), 255);
        let again = label(&Volume::new(mask.clone().into_raw()), 255);
        assert_eq!(mask, again);
    }

    #[test]
    fn test_zero_background_fixes() {
        let data = Array3::from_shape_vec((1, 1, 4), vec![0u8, 1, 0, 1]).unwrap();
        let mut labels = Array3::from_elem((1, 1, 4), 4u32);
        assert_eq!(zero_background(&mut labels, data.view(), 0), 2);
        assert_eq!(labels.into_raw_vec(), vec![0, 4, 0, 4]);
    }

    #[test]
    fn test_label_dyn() {
        let bytes: Vec<u8> = [0i16, 3, 3, 0, 0, 7]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let volume = DynVolume::from_raw(ScalarType::I16, (1, 1, 6), &bytes).unwrap();
        let mask = label_dyn(&volume, 255);
        assert_eq!(mask.num_labels(), 2);
        let row: Vec<u32> = mask.data().iter().copied().collect();
        assert_eq!(row, vec![0, 1, 1, 0, 0, 2]);
    }
}
