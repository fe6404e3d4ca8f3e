use std::fmt;
use std::mem;

use super::bwt::build_bwt;
use super::suffix_tree::{Node, NodeId, SuffixTree};

/// Preorder walk with children in byte order.
pub struct Preorder<'a, 't> {
    tree: &'a SuffixTree<'t>,
    stack: Vec<NodeId>,
}

impl<'a, 't> Iterator for Preorder<'a, 't> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.node(id).children().rev().map(|(_, c)| c));
        Some(id)
    }
}

/// 最长重复子串：`[start, end)` 以及对应文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSubstring {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl CommonSubstring {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub internal_count: usize,
    pub max_depth: usize,
    pub avg_depth: f64,
    pub estimated_bytes: usize,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Total number of nodes : {}", self.node_count)?;
        writeln!(f, "# Number of leaves : {}", self.leaf_count)?;
        writeln!(f, "# Number of internal nodes : {}", self.internal_count)?;
        writeln!(f, "# Max Depth : {}", self.max_depth)?;
        writeln!(f, "# Average Depth : {}", self.avg_depth)?;
        write!(f, "# Estimate of the SuffixTree (Bytes) : {}", self.estimated_bytes)
    }
}

impl<'t> SuffixTree<'t> {
    pub fn preorder(&self) -> Preorder<'_, 't> {
        Preorder { tree: self, stack: vec![self.root()] }
    }

    /// 先序遍历的节点 ID
    pub fn dfs(&self) -> Vec<usize> {
        self.preorder().map(|id| self.node(id).id()).collect()
    }

    pub fn post_order_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack = vec![(self.root(), false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = self.node(id);
            if expanded || node.is_leaf() {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            stack.extend(node.children().rev().map(|(_, c)| (c, false)));
        }
        out
    }

    /// 后序遍历的节点 ID
    pub fn post_order(&self) -> Vec<usize> {
        self.post_order_ids().into_iter().map(|id| self.node(id).id()).collect()
    }

    pub fn bwt(&self) -> Vec<u8> {
        build_bwt(self.text(), self.leaf_order())
    }

    /// 最近公共祖先：从较深的一侧逐层上爬。
    ///
    /// 任一节点串深度低于 `bound` 时返回 `None`，表示不可能得到更深的公共祖先。
    pub fn lca(&self, u: NodeId, v: NodeId, bound: usize) -> Option<NodeId> {
        let (mut a, mut b) = (u, v);
        loop {
            if a == b {
                return Some(a);
            }
            let (na, nb) = (self.node(a), self.node(b));
            if na.depth() == 0 || nb.depth() == 0 {
                return Some(self.root());
            }
            if a == nb.parent() {
                return Some(a);
            }
            if b == na.parent() {
                return Some(b);
            }
            if na.depth() < bound || nb.depth() < bound {
                return None;
            }
            if na.depth() > nb.depth() {
                a = na.parent();
            } else {
                b = nb.parent();
            }
        }
    }

    /// 最长重复子串：串深度最大的内部节点（并列时取先创建者）。
    pub fn lcs(&self) -> CommonSubstring {
        let mut best = self.root();
        for (id, node) in self.nodes() {
            if !node.is_leaf() && node.depth() > self.node(best).depth() {
                best = id;
            }
        }
        self.substring_at(best)
    }

    /// 与 [`lcs`](Self::lcs) 等价的逐对叶子 LCA 版本，以当前最优深度剪枝。
    pub fn lcs_pairwise(&self) -> CommonSubstring {
        let leaves: Vec<NodeId> = self.nodes().filter(|(_, n)| n.is_leaf()).map(|(id, _)| id).collect();
        let mut best = self.root();
        for (k, &a) in leaves.iter().enumerate() {
            for &b in &leaves[k + 1..] {
                let bound = self.node(best).depth() + 1;
                if let Some(anc) = self.lca(a, b, bound) {
                    if self.node(anc).depth() > self.node(best).depth() {
                        best = anc;
                    }
                }
            }
        }
        self.substring_at(best)
    }

    fn substring_at(&self, id: NodeId) -> CommonSubstring {
        let start = self.leftmost_suffix(id);
        let end = start + self.node(id).depth();
        CommonSubstring {
            start,
            end,
            text: String::from_utf8_lossy(&self.text()[start..end]).into_owned(),
        }
    }

    fn leftmost_suffix(&self, mut id: NodeId) -> usize {
        loop {
            let node = self.node(id);
            if let Some(s) = node.suffix_number() {
                return s;
            }
            match node.children().next() {
                Some((_, c)) => id = c,
                None => return 0,
            }
        }
    }

    /// 查找 read 在参考序列中的候选起点。
    ///
    /// 自根向下逐字符匹配 read，取匹配长度不少于 x 的最深节点，
    /// 返回其子树所有叶子的后缀起点（0-based，按叶子顺序）。
    pub fn find_loc(&self, read: &[u8]) -> Vec<usize> {
        let text = self.text();
        let mut cur = self.root();
        let mut matched = 0usize;
        let mut best = None;

        while matched < read.len() {
            let Some(child) = self.child(cur, read[matched]) else {
                break;
            };
            let edge = &text[self.node(child).edge()];
            let k = edge
                .iter()
                .zip(&read[matched..])
                .take_while(|(a, b)| a == b)
                .count();
            matched += k;
            if matched >= self.min_match_len() {
                best = Some(child);
            }
            if k < edge.len() {
                break;
            }
            cur = child;
        }

        match best.and_then(|id| self.node(id).leaf_range()) {
            Some((first, last)) => self.leaf_order()[first..=last].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn stats(&self) -> TreeStats {
        let node_count = self.node_count();
        let leaf_count = self.leaf_count();
        let internal_count = node_count - leaf_count;

        let mut max_depth = 0usize;
        let mut total_depth = 0usize;
        for (_, node) in self.nodes().filter(|(_, n)| !n.is_leaf()) {
            max_depth = max_depth.max(node.depth());
            total_depth += node.depth();
        }

        let estimated_bytes = mem::size_of::<Node>() * node_count
            + self.text().len()
            + mem::size_of::<(u8, NodeId)>() * node_count.saturating_sub(1)
            + mem::size_of::<usize>() * self.leaf_order().len();

        TreeStats {
            node_count,
            leaf_count,
            internal_count,
            max_depth,
            avg_depth: total_depth as f64 / internal_count as f64,
            estimated_bytes,
        }
    }
}
