//! 三维邻域.

use crate::Idx3d;

/// 在光栅扫描顺序下, 先于 `(z, y)` 行被扫描、且可能与之 26-相邻的行的偏移 `(dz, dy)`.
pub(crate) const PREV_ROWS_26: [(isize, isize); 4] = [(0, -1), (-1, -1), (-1, 0), (-1, 1)];

/// 获得 `(z, y, x)` 的 26-邻居索引 (共面、共棱、共顶点). 不检查越界.
///
/// 越界的分量会回绕为很大的值, 调用方需要用形状检查过滤.
#[inline]
pub fn neighbour26((z, y, x): Idx3d) -> [Idx3d; 26] {
    let mut ans = [(0, 0, 0); 26];
    let mut i = 0;
    for dz in -1isize..=1 {
        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dz == 0 && dy == 0 && dx == 0 {
                    continue;
                }
                ans[i] = (
                    z.wrapping_add_signed(dz),
                    y.wrapping_add_signed(dy),
                    x.wrapping_add_signed(dx),
                );
                i += 1;
            }
        }
    }
    ans
}

/// 索引是否落在形状 `shape` 内.
#[inline]
pub fn in_bounds((z, y, x): Idx3d, (nz, ny, nx): Idx3d) -> bool {
    z < nz && y < ny && x < nx
}

/// 行 `(z, y)` 偏移 `(dz, dy)` 之后的行. 越界时返回 `None`.
#[inline]
pub(crate) fn shifted_row(
    (z, y): (usize, usize),
    (dz, dy): (isize, isize),
    (nz, ny): (usize, usize),
) -> Option<(usize, usize)> {
    let z = z.checked_add_signed(dz)?;
    let y = y.checked_add_signed(dy)?;
    (z < nz && y < ny).then_some((z, y))
}
