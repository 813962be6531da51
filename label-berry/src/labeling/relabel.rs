//! 按连通域体积重标号.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use ndarray::Array3;

use crate::consts::label::is_foreground;

/// 将标签按体积降序重新编号, 并抹去排名超过 `max_label_count` 的连通域.
///
/// 体积最大的连通域变为标签 1, 第二大的变为 2, 以此类推; 体积相同时原标签较小者优先.
/// 排名超过 `max_label_count` 的连通域的所有体素被改写为 0.
/// 背景 (0) 保持不变, 前景/背景的划分只会因抹去而改变.
///
/// 原标签不必连续, 内存开销只与实际出现的标签个数有关.
/// `num_raw_labels` 为调用方声称的原标签个数, 仅用于日志.
///
/// # 返回值
///
/// 存活的连通域个数, 也就是重标号后的最大标签.
pub fn relabel_components(
    labels: &mut Array3<u32>,
    num_raw_labels: u32,
    max_label_count: u32,
) -> u32 {
    let mut sizes = BTreeMap::<u32, u64>::new();
    for &l in labels.iter().filter(|&&l| is_foreground(l)) {
        *sizes.entry(l).or_insert(0) += 1;
    }
    if sizes.len() != num_raw_labels as usize {
        log::debug!("声称 {num_raw_labels} 个原标签, 实际出现 {} 个", sizes.len());
    }

    let order = sizes
        .iter()
        .sorted_by(|(a, sa), (b, sb)| sb.cmp(sa).then(a.cmp(b)))
        .map(|(&l, _)| l)
        .collect_vec();

    let survivors = order.len().min(max_label_count as usize);
    let map: HashMap<u32, u32> = order
        .iter()
        .take(survivors)
        .enumerate()
        .map(|(rank, &raw)| (raw, rank as u32 + 1))
        .collect();

    if order.len() > survivors {
        let dropped: u64 = order[survivors..].iter().map(|l| sizes[l]).sum();
        log::debug!(
            "保留 {survivors} 个连通域, 抹去 {} 个 (共 {dropped} 个体素)",
            order.len() - survivors
        );
    }

    let relabel = |l: u32| map.get(&l).copied().unwrap_or(0);
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            labels.par_mapv_inplace(relabel);
        } else {
            labels.mapv_inplace(relabel);
        }
    }
    survivors as u32
}
