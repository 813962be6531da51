//! 质心分发.
//!
//! 默认模式下, 所有质心写入体数据自带的 landmarks; 分区模式下, 质心只写入声明了其标签的平面点集.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::labeling::{label, LabelSpec};
use crate::shape::ComponentRecord;
use crate::{DynVolume, LabelError, LabelResult, Landmarks, Point, PointList};
use crate::{Scalar, Volume, VolumeVisitor};

/// 平面分区: 第 `i` 个平面期望的标签集合, 以及接收匹配质心的点集.
///
/// 同一个标签可以出现在多个平面中, 此时对应的质心被写入每一个这样的平面.
#[derive(Debug, Clone, Default)]
pub struct PlanePartition {
    label_sets: Vec<BTreeSet<u32>>,
    point_lists: Vec<PointList>,
}

impl PlanePartition {
    /// 以标签集合与点集创建分区, 两者一一对应.
    ///
    /// 两者长度不同, 或标签集合中含有 0 时, 返回 `Err`.
    pub fn new(label_sets: Vec<BTreeSet<u32>>, point_lists: Vec<PointList>) -> LabelResult<Self> {
        if label_sets.len() != point_lists.len() {
            return Err(LabelError::PartitionMismatch {
                label_sets: label_sets.len(),
                point_lists: point_lists.len(),
            });
        }
        if label_sets.iter().any(|set| set.contains(&0)) {
            return Err(LabelError::InvalidLabel(0));
        }
        Ok(Self {
            label_sets,
            point_lists,
        })
    }

    /// 以标签集合创建分区, 每个平面配一个空点集.
    pub fn with_empty_lists(label_sets: Vec<BTreeSet<u32>>) -> LabelResult<Self> {
        let point_lists = vec![PointList::new(); label_sets.len()];
        Self::new(label_sets, point_lists)
    }

    /// 平面个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.label_sets.len()
    }

    /// 是否没有任何平面.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.label_sets.is_empty()
    }

    /// 各平面的标签集合.
    #[inline]
    pub fn label_sets(&self) -> &[BTreeSet<u32>] {
        &self.label_sets
    }

    /// 各平面的点集.
    #[inline]
    pub fn point_lists(&self) -> &[PointList] {
        &self.point_lists
    }
}

/// 质心的去向.
#[derive(Debug)]
pub enum RouteTarget<'a> {
    /// 默认模式: 写入单个 landmarks 点集.
    Landmarks(&'a mut Landmarks),

    /// 分区模式: 写入声明了对应标签的平面点集.
    Planes(&'a mut PlanePartition),
}

/// 把 `records` 中的质心写入 `target`, 返回写入的点的个数 (分区模式下同一个点可能被计数多次).
///
/// - 默认模式: 先清空点集, 再按标签升序写入全部质心. 第 `i` 个点 (从 0 开始) 的标签为 `i` 的十进制字符串.
///   写入后 landmarks 被设为可见.
/// - 分区模式: 每个质心只创建一个点, 标签为连通域标签 (从 1 开始) 的十进制字符串,
///   并写入所有包含该标签的平面. 不属于任何平面的质心被丢弃. 已有的点保留.
pub fn route_centroids(records: &[ComponentRecord], target: RouteTarget) -> usize {
    match target {
        RouteTarget::Landmarks(landmarks) => {
            let points = landmarks.points_mut();
            points.clear();
            for (i, r) in records.iter().enumerate() {
                points.push(Arc::new(Point::with_label(r.centroid, i.to_string())));
            }
            landmarks.set_visible(true);
            log::debug!("默认模式: 写入 {} 个质心", records.len());
            records.len()
        }
        RouteTarget::Planes(partition) => {
            let mut written = 0;
            let mut dropped = 0;
            for r in records {
                let point = Arc::new(Point::with_label(r.centroid, r.label.to_string()));
                let mut matched = false;
                for (set, list) in partition.label_sets.iter().zip(&mut partition.point_lists) {
                    if set.contains(&r.label) {
                        list.push(Arc::clone(&point));
                        matched = true;
                        written += 1;
                    }
                }
                dropped += !matched as usize;
            }
            log::debug!(
                "分区模式: {} 个平面, 写入 {written} 个点, 丢弃 {dropped} 个质心",
                partition.len()
            );
            written
        }
    }
}

/// 质心计算参数.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentroidSpec {
    /// 最多保留的连通域个数. `None` 表示不限制.
    pub max_label_count: Option<u32>,

    /// 是否统计表面体素个数.
    pub with_perimeter: bool,
}

impl Default for CentroidSpec {
    fn default() -> Self {
        Self {
            max_label_count: None,
            with_perimeter: true,
        }
    }
}

/// 以默认参数调用 [`compute_centroids_with`].
#[inline]
pub fn compute_centroids(
    volume: &mut DynVolume,
    planes: Option<&mut PlanePartition>,
) -> Vec<ComponentRecord> {
    compute_centroids_with(volume, &CentroidSpec::default(), planes)
}

/// 标记 `volume` 中所有非背景体素组成的连通域, 计算质心并分发.
///
/// `planes` 为 `None` 时使用默认模式, 写入 `volume` 自带的 landmarks; 否则使用分区模式.
/// 返回按标签升序排列的全部连通域统计结果, 与分发结果无关.
pub fn compute_centroids_with(
    volume: &mut DynVolume,
    spec: &CentroidSpec,
    planes: Option<&mut PlanePartition>,
) -> Vec<ComponentRecord> {
    let records = volume.dispatch(Extractor {
        max_label_count: spec.max_label_count.unwrap_or(LabelSpec::UNLIMITED),
        with_perimeter: spec.with_perimeter,
    });

    let target = match planes {
        Some(planes) => RouteTarget::Planes(planes),
        None => RouteTarget::Landmarks(volume.landmarks_mut()),
    };
    route_centroids(&records, target);
    records
}

struct Extractor {
    max_label_count: u32,
    with_perimeter: bool,
}

impl VolumeVisitor for Extractor {
    type Output = Vec<ComponentRecord>;

    fn visit<T: Scalar>(self, volume: &Volume<T>) -> Self::Output {
        let mask = label(volume, self.max_label_count);
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                crate::shape::par_extract_components(&mask, self.with_perimeter)
            } else {
                crate::shape::extract_components(&mask, self.with_perimeter)
            }
        }
    }
}
