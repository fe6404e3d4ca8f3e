//! 后缀树索引：构建、遍历与查询。

pub mod bwt;
pub mod dot;
pub mod query;
pub mod suffix_tree;

pub use query::{CommonSubstring, Preorder, TreeStats};
pub use suffix_tree::{Node, NodeId, SuffixTree};
