//! # stmap
//!
//! 基于后缀树索引的读段映射器，附带仿射间隙全局 / 局部比对。
//!
//! 本 crate 包括：
//!
//! - **索引构建**：McCreight 式线性时间后缀树（后缀链接 + 节点跳跃），叶子顺序即后缀数组
//! - **索引查询**：DFS / 后序遍历、BWT、最长重复子串、FindLoc 候选位置
//! - **序列比对**：仿射间隙 Needleman-Wunsch / Smith-Waterman，带补齐动作的回溯
//! - **读段映射**：FindLoc 给出候选窗口，局部比对按一致度与覆盖度筛选
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use stmap::align::{map_reads, MapOpt, ScoreTable};
//! use stmap::index::SuffixTree;
//! use stmap::util::Sequence;
//!
//! // 后缀树
//! let tree = SuffixTree::build(b"banana$", 0).unwrap();
//! assert_eq!(tree.lcs().text, "ana");
//!
//! // 读段映射
//! let gene = Sequence::new("gene", b"ACGTACGTAGCTGATCGTAGGATCCA".to_vec());
//! let reads = vec![Sequence::new("r1", b"GCTGATCGTAG".to_vec())];
//! let opt = MapOpt { min_match_len: 5, ..MapOpt::default() };
//! let report = map_reads(&gene, &reads, &ScoreTable::default(), &opt).unwrap();
//! for hit in &report.hits {
//!     println!("{}", hit);
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：序列文件、字母表与打分表读取
//! - [`index`]：后缀树构建与查询（遍历、BWT、LCS、FindLoc、dot 导出）
//! - [`align`]：仿射间隙比对、比对报告与读段映射
//! - [`util`]：序列类型
//! - [`error`]：库错误类型

pub mod align;
pub mod error;
pub mod index;
pub mod io;
pub mod util;

pub use error::{Error, Result};
