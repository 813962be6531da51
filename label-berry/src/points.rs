//! 带标签的三维点与点集.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 带可选文字标签的三维点. 坐标按 `[x, y, z]` 排列, 位于索引空间.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    coords: [f64; 3],
    label: Option<String>,
}

impl Point {
    /// 创建不带标签的点.
    #[inline]
    pub fn new(coords: [f64; 3]) -> Self {
        Self {
            coords,
            label: None,
        }
    }

    /// 创建带标签的点.
    #[inline]
    pub fn with_label(coords: [f64; 3], label: impl Into<String>) -> Self {
        Self {
            coords,
            label: Some(label.into()),
        }
    }

    /// 坐标 `[x, y, z]`.
    #[inline]
    pub fn coords(&self) -> [f64; 3] {
        self.coords
    }

    /// 标签.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// 有序点集. 插入顺序有意义.
///
/// 元素以 `Arc` 共享, 同一个点对象可以同时出现在多个点集中.
#[derive(Debug, Clone, Default)]
pub struct PointList {
    points: Vec<Arc<Point>>,
}

impl PointList {
    /// 创建空点集.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 在末尾追加一个点.
    #[inline]
    pub fn push(&mut self, point: Arc<Point>) {
        self.points.push(point);
    }

    /// 清空点集.
    #[inline]
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// 点的个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 获取第 `index` 个点. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<Point>> {
        self.points.get(index)
    }

    /// 按插入顺序迭代所有点.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Point>> {
        self.points.iter()
    }

    /// 按插入顺序收集所有点的标签. 无标签的点对应 `None`.
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.points.iter().map(|p| p.label()).collect()
    }
}

impl FromIterator<Point> for PointList {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointList {
    type Item = &'a Arc<Point>;
    type IntoIter = std::slice::Iter<'a, Arc<Point>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// 附着在体数据上的默认点集, 以及它是否需要被显示.
#[derive(Debug, Clone, Default)]
pub struct Landmarks {
    points: PointList,
    visible: bool,
}

impl Landmarks {
    /// 创建空的、不可见的 landmarks.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 点集.
    #[inline]
    pub fn points(&self) -> &PointList {
        &self.points
    }

    /// 可变点集.
    #[inline]
    pub fn points_mut(&mut self) -> &mut PointList {
        &mut self.points
    }

    /// 是否需要显示.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// 设置是否需要显示.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
