//! 行程标签的并查集.

/// 顺序并查集. 临时标签从 1 开始分配, 0 保留给背景.
///
/// 合并时总是让较大的根指向较小的根, 因此每个集合的根都是该集合中最早分配的标签.
#[derive(Debug)]
pub(super) struct UnionFind {
    /// `parent[l - 1]` 为标签 `l` 的父节点.
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self {
            parent: Vec::with_capacity(256),
        }
    }

    /// 已分配的临时标签个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// 分配一个新标签.
    ///
    /// 标签个数超出 `u32` 范围时 panic.
    #[inline]
    pub fn make_set(&mut self) -> u32 {
        let label = u32::try_from(self.parent.len() + 1).expect("临时标签个数超出 u32 范围");
        self.parent.push(label);
        label
    }

    /// 查找根节点, 同时做路径压缩.
    pub fn find(&mut self, label: u32) -> u32 {
        debug_assert!(label >= 1 && label as usize <= self.parent.len());

        let mut root = label;
        loop {
            let parent = self.parent[(root - 1) as usize];
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut cur = label;
        while cur != root {
            let idx = (cur - 1) as usize;
            cur = self.parent[idx];
            self.parent[idx] = root;
        }
        root
    }

    #[inline]
    pub fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (small, large) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[(large - 1) as usize] = small;
        }
    }

    /// 将所有临时标签映射为从 1 开始的连续标签.
    ///
    /// 返回 `(映射表, 最终标签个数)`, 映射表下标为临时标签, 第 0 个元素为 0.
    /// 最终标签按集合的根 (即最早出现的临时标签) 升序分配.
    pub fn flatten(&mut self) -> (Vec<u32>, u32) {
        let len = self.parent.len();
        let mut map = vec![0u32; len + 1];
        let mut num = 0u32;
        for l in 1..=len as u32 {
            let root = self.find(l);
            if map[root as usize] == 0 {
                num += 1;
                map[root as usize] = num;
            }
            map[l as usize] = map[root as usize];
        }
        (map, num)
    }
}
