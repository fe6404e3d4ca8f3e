use std::collections::BTreeMap;
use std::ops::Range;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::util::SENTINEL;

/// 节点句柄：节点池中的下标，池扩容不会使其失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// 后缀树节点。入边标签以文本中的半开区间 `[start, end)` 表示，从不复制。
#[derive(Debug, Clone)]
pub struct Node {
    id: usize,
    suffix: Option<usize>,
    start: usize,
    end: usize,
    depth: usize,
    parent: NodeId,
    link: Option<NodeId>,
    children: BTreeMap<u8, NodeId>,
    /// 子树叶子在 leaf order 中的闭区间，仅当 depth >= x 时设置
    leaf_range: Option<(usize, usize)>,
}

impl Node {
    fn internal(id: usize, edge: Range<usize>, depth: usize, parent: NodeId) -> Self {
        Self {
            id,
            suffix: None,
            start: edge.start,
            end: edge.end,
            depth,
            parent,
            link: None,
            children: BTreeMap::new(),
            leaf_range: None,
        }
    }

    fn leaf(id: usize, suffix: usize, edge: Range<usize>, depth: usize, parent: NodeId) -> Self {
        Self { suffix: Some(suffix), ..Self::internal(id, edge, depth, parent) }
    }

    /// Creation-order identifier; the root is 1.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn suffix_number(&self) -> Option<usize> {
        self.suffix
    }

    pub fn edge(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn edge_len(&self) -> usize {
        self.end - self.start
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn suffix_link(&self) -> Option<NodeId> {
        self.link
    }

    pub fn leaf_range(&self) -> Option<(usize, usize)> {
        self.leaf_range
    }

    /// 子节点，按首字符升序
    pub fn children(&self) -> impl DoubleEndedIterator<Item = (u8, NodeId)> + '_ {
        self.children.iter().map(|(&c, &id)| (c, id))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// 基于后缀链接的在线线性时间后缀树（McCreight 式逐后缀插入）。
///
/// 文本必须以唯一的终止符 `$` 结尾。树借用文本，生命周期不超过文本。
/// 构建完成后只读，可在多线程间共享查询。
#[derive(Debug)]
pub struct SuffixTree<'t> {
    text: &'t [u8],
    nodes: Vec<Node>,
    /// 按 DFS 顺序排列的叶子后缀编号（即后缀数组）
    leaf_order: Vec<usize>,
    min_depth: usize,
    leaf_count: usize,
}

impl<'t> SuffixTree<'t> {
    /// 构建后缀树；`x` 为叶子区间缓存的最小串深度（FindLoc 的最短匹配长度）。
    pub fn build(text: &'t [u8], x: usize) -> Result<Self> {
        check_text(text)?;

        let mut tree = Self {
            text,
            nodes: Vec::with_capacity(2 * text.len()),
            leaf_order: Vec::with_capacity(text.len()),
            min_depth: x,
            leaf_count: 0,
        };
        let mut root = Node::internal(1, 0..0, 0, NodeId::ROOT);
        root.link = Some(NodeId::ROOT);
        tree.nodes.push(root);

        let started = Instant::now();
        let mut last_leaf = tree.find_path(NodeId::ROOT, 0)?;
        for i in 1..text.len() {
            let start = tree.insertion_start(last_leaf, i)?;
            last_leaf = tree.find_path(start, i)?;
        }
        log::debug!(
            "suffix tree: {} nodes for {} characters built in {:.3?}",
            tree.nodes.len(),
            text.len(),
            started.elapsed()
        );

        let started = Instant::now();
        tree.prepare();
        log::debug!("suffix tree: leaf intervals (x = {}) prepared in {:.3?}", x, started.elapsed());

        Ok(tree)
    }

    pub fn text(&self) -> &'t [u8] {
        self.text
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn min_match_len(&self) -> usize {
        self.min_depth
    }

    /// 叶子后缀编号的 DFS 序
    pub fn leaf_order(&self) -> &[usize] {
        &self.leaf_order
    }

    #[inline]
    pub fn child(&self, id: NodeId, c: u8) -> Option<NodeId> {
        self.nodes[id.index()].children.get(&c).copied()
    }

    fn push_node(&mut self, make: impl FnOnce(usize) -> Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(make(self.nodes.len() + 1));
        id
    }

    /// 根据上一次插入的叶子确定后缀 i 的起始节点，必要时补建其父节点的后缀链接。
    fn insertion_start(&mut self, last_leaf: NodeId, i: usize) -> Result<NodeId> {
        let u = self.node(last_leaf).parent;

        match self.node(u).link {
            // Case IA
            Some(v) if u != NodeId::ROOT => Ok(v),
            // Case IB
            Some(_) => Ok(NodeId::ROOT),
            // Case II: u was created by the previous insertion
            None => {
                let target = self.node(u).depth - 1;
                let mut anc = self.node(u).parent;
                let from = loop {
                    if let Some(link) = self.node(anc).link {
                        break link;
                    }
                    anc = self.node(anc).parent;
                };
                let v = self.node_hop(from, i, target)?;
                self.nodes[u.index()].link = Some(v);
                Ok(v)
            }
        }
    }

    /// 从 `from` 沿后缀 i 整边跳跃直到串深度 `target`，目标落在边内时拆边。
    fn node_hop(&mut self, from: NodeId, i: usize, target: usize) -> Result<NodeId> {
        let mut cur = from;
        loop {
            let depth = self.node(cur).depth;
            if depth == target {
                return Ok(cur);
            }
            let c = self.text[i + depth];
            let child = self.child(cur, c).ok_or_else(|| {
                Error::Invariant(format!(
                    "node hop for suffix {} found no edge '{}' below node {}",
                    i,
                    c as char,
                    self.node(cur).id
                ))
            })?;
            if self.node(child).depth <= target {
                cur = child;
            } else {
                return self.split_edge(child, target - depth);
            }
        }
    }

    /// 从 `start` 逐字符匹配后缀 i，在失配处拆边或直接挂新叶子，返回新叶子。
    fn find_path(&mut self, start: NodeId, i: usize) -> Result<NodeId> {
        let n = self.text.len();
        let mut cur = start;
        let mut pos = i + self.node(cur).depth;

        loop {
            if pos >= n {
                return Err(Error::Invariant(format!(
                    "suffix {} is exhausted at node {}",
                    i,
                    self.node(cur).id
                )));
            }
            let Some(child) = self.child(cur, self.text[pos]) else {
                return self.add_leaf(cur, i, pos);
            };

            let edge = self.node(child).edge();
            let matched = self.text[edge.clone()]
                .iter()
                .zip(&self.text[pos..])
                .take_while(|(a, b)| a == b)
                .count();

            if matched == edge.len() {
                cur = child;
                pos += matched;
                continue;
            }
            if pos + matched >= n || self.text[edge.start + matched] == self.text[pos + matched] {
                return Err(Error::Invariant(format!(
                    "edge split of node {} at offset {} without a mismatch",
                    self.node(child).id,
                    matched
                )));
            }
            let mid = self.split_edge(child, matched)?;
            return self.add_leaf(mid, i, pos + matched);
        }
    }

    /// 在 `child` 入边的第 k 个字符处拆边，返回新的内部节点。
    /// `child` 保留原 ID，作为新节点的子节点重新挂接。
    fn split_edge(&mut self, child: NodeId, k: usize) -> Result<NodeId> {
        let (start, end, parent) = {
            let node = self.node(child);
            (node.start, node.end, node.parent)
        };
        if k == 0 || k >= end - start {
            return Err(Error::Invariant(format!(
                "cannot split edge of node {} (length {}) at offset {}",
                self.node(child).id,
                end - start,
                k
            )));
        }

        let lead = self.text[start];
        let split = self.text[start + k];
        let depth = self.node(parent).depth + k;
        let mid = self.push_node(|id| Node::internal(id, start..start + k, depth, parent));

        let node = &mut self.nodes[child.index()];
        node.start = start + k;
        node.parent = mid;

        self.nodes[mid.index()].children.insert(split, child);
        self.nodes[parent.index()].children.insert(lead, mid);
        Ok(mid)
    }

    fn add_leaf(&mut self, parent: NodeId, suffix: usize, from: usize) -> Result<NodeId> {
        let n = self.text.len();
        let c = self.text[from];
        if self.nodes[parent.index()].children.contains_key(&c) {
            return Err(Error::Invariant(format!(
                "node {} already has a child starting with '{}'",
                self.node(parent).id,
                c as char
            )));
        }
        let depth = self.node(parent).depth + (n - from);
        let leaf = self.push_node(|id| Node::leaf(id, suffix, from..n, depth, parent));
        self.nodes[parent.index()].children.insert(c, leaf);
        self.leaf_count += 1;
        Ok(leaf)
    }

    /// 后序遍历：记录叶子顺序，并为 depth >= x 的节点缓存叶子区间。
    fn prepare(&mut self) {
        let x = self.min_depth;
        let mut stack = vec![(NodeId::ROOT, false)];

        while let Some((id, expanded)) = stack.pop() {
            let node = &self.nodes[id.index()];
            if expanded {
                if node.depth >= x {
                    let first = node.children.values().next().and_then(|c| self.nodes[c.index()].leaf_range);
                    let last = node.children.values().next_back().and_then(|c| self.nodes[c.index()].leaf_range);
                    if let (Some((lo, _)), Some((_, hi))) = (first, last) {
                        self.nodes[id.index()].leaf_range = Some((lo, hi));
                    }
                }
                continue;
            }

            if let Some(suffix) = node.suffix {
                let k = self.leaf_order.len();
                let cached = node.depth >= x;
                self.leaf_order.push(suffix);
                if cached {
                    self.nodes[id.index()].leaf_range = Some((k, k));
                }
                continue;
            }

            stack.push((id, true));
            stack.extend(node.children.values().rev().map(|&c| (c, false)));
        }
    }
}

fn check_text(text: &[u8]) -> Result<()> {
    let (&last, body) = text.split_last().ok_or(Error::EmptySequence)?;
    if last != SENTINEL {
        return Err(Error::MissingSentinel { sentinel: SENTINEL as char });
    }
    if let Some(position) = body.iter().position(|&c| c == SENTINEL) {
        return Err(Error::SentinelNotUnique { position });
    }
    Ok(())
}
