//! 行程编码.
//!
//! 体数据按行 (固定 `z`, `y`, 沿 `x` 方向) 切分为前景行程. 每个行程记录起止位置和标签,
//! 所有行程按光栅顺序存放在同一个数组里, 另有一个按行索引的偏移表定位每行的行程.

use ndarray::ArrayView1;

use super::union_find::UnionFind;
use crate::neighbour::{shifted_row, PREV_ROWS_26};

/// 一行中连续的前景体素.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Run {
    /// 起始 x 坐标 (含).
    pub start: u32,

    /// 结束 x 坐标 (不含).
    pub end: u32,

    /// 临时标签. 0 表示尚未分配.
    pub label: u32,
}

impl Run {
    #[inline]
    fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
            label: 0,
        }
    }

    /// 两个相邻行中的行程是否 26-相邻 (包括对角方向).
    #[inline]
    fn touches(&self, other: &Run) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// 提取一行中所有值不等于 `background` 的行程.
pub(super) fn extract_runs<T: PartialEq + Copy>(
    row: ArrayView1<T>,
    background: T,
    runs: &mut Vec<Run>,
) {
    let mut start = None;
    for (x, &v) in row.iter().enumerate() {
        match (v != background, start) {
            (true, None) => start = Some(x),
            (false, Some(s)) => {
                runs.push(Run::new(s, x));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(Run::new(s, row.len()));
    }
}

/// 为 `curr` 中的每个行程分配临时标签.
///
/// 与 `prev` 中 26-相邻的行程合并, 两个行程列表都按 `start` 升序排列.
fn merge_with_row(curr: &mut [Run], prev: &[Run], uf: &mut UnionFind) {
    let mut first = 0;
    for run in curr.iter_mut() {
        while first < prev.len() && prev[first].end < run.start {
            first += 1;
        }
        for p in prev[first..].iter().take_while(|p| p.start <= run.end) {
            if !p.touches(run) {
                continue;
            }
            match run.label {
                0 => run.label = p.label,
                l if l != p.label => uf.union(l, p.label),
                _ => {}
            }
        }
    }
}

/// 按行组织的全部行程.
#[derive(Debug)]
pub(super) struct RunTable {
    /// 所有行程, 按光栅顺序.
    runs: Vec<Run>,

    /// 第 `r` 行的行程为 `runs[offsets[r]..offsets[r + 1]]`, 其中 `r = z * ny + y`.
    offsets: Vec<usize>,

    /// 行数 `(nz, ny)`.
    rows: (usize, usize),
}

impl RunTable {
    /// 扫描 `rows` 中的每一行, 提取行程并分配临时标签.
    ///
    /// `row_at(z, y)` 返回第 `(z, y)` 行的数据.
    pub fn build<'a, T, F>(
        (nz, ny): (usize, usize),
        background: T,
        uf: &mut UnionFind,
        row_at: F,
    ) -> Self
    where
        T: PartialEq + Copy + 'a,
        F: Fn(usize, usize) -> ArrayView1<'a, T>,
    {
        let mut table = Self {
            runs: Vec::with_capacity(64),
            offsets: Vec::with_capacity(nz * ny + 1),
            rows: (nz, ny),
        };
        table.offsets.push(0);

        for z in 0..nz {
            for y in 0..ny {
                let begin = table.runs.len();
                extract_runs(row_at(z, y), background, &mut table.runs);

                let (done, curr) = table.runs.split_at_mut(begin);
                if !curr.is_empty() {
                    for delta in PREV_ROWS_26 {
                        if let Some(row) = shifted_row((z, y), delta, (nz, ny)) {
                            let r = row.0 * ny + row.1;
                            let prev = &done[table.offsets[r]..table.offsets[r + 1]];
                            merge_with_row(curr, prev, uf);
                        }
                    }
                    for run in curr.iter_mut().filter(|run| run.label == 0) {
                        run.label = uf.make_set();
                    }
                }
                table.offsets.push(table.runs.len());
            }
        }
        log::trace!("共 {} 个行程, {} 个临时标签", table.runs.len(), uf.len());
        table
    }

    /// 第 `(z, y)` 行的所有行程.
    #[inline]
    pub fn row(&self, z: usize, y: usize) -> &[Run] {
        let r = z * self.rows.1 + y;
        &self.runs[self.offsets[r]..self.offsets[r + 1]]
    }

    /// 按光栅顺序迭代 `((z, y), 行程)`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Run)> {
        let (nz, ny) = self.rows;
        (0..nz)
            .flat_map(move |z| (0..ny).map(move |y| (z, y)))
            .flat_map(move |(z, y)| self.row(z, y).iter().map(move |run| ((z, y), run)))
    }

    /// 行程总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.runs.len()
    }
}
