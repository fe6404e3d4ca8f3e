use std::borrow::Cow;
use std::fmt;

use rayon::prelude::*;

use super::affine::{align, Action, Mode};
use super::report::AlignmentStats;
use super::score::ScoreTable;
use crate::error::{Error, Result};
use crate::index::SuffixTree;
use crate::util::{Sequence, SENTINEL};

/// 读段映射参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapOpt {
    /// FindLoc 的最短精确匹配长度 x
    pub min_match_len: usize,
    /// 最低一致度 X（0..=1）
    pub min_identity: f64,
    /// 最低覆盖度 Y
    pub min_coverage: f64,
    pub threads: usize,
}

impl Default for MapOpt {
    fn default() -> Self {
        Self { min_match_len: 25, min_identity: 0.90, min_coverage: 0.80, threads: 1 }
    }
}

impl MapOpt {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_identity) {
            return Err(Error::InvalidThreshold(format!("identity must lie in [0, 1], got {}", self.min_identity)));
        }
        if !self.min_coverage.is_finite() || self.min_coverage < 0.0 {
            return Err(Error::InvalidThreshold(format!("coverage must be non-negative, got {}", self.min_coverage)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadHit {
    /// 参考序列上的半开区间 `[start, end)`
    Hit { name: String, start: usize, end: usize },
    NoHit { name: String },
}

impl ReadHit {
    pub fn name(&self) -> &str {
        match self {
            ReadHit::Hit { name, .. } | ReadHit::NoHit { name } => name,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, ReadHit::Hit { .. })
    }
}

impl fmt::Display for ReadHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadHit::Hit { name, start, end } => write!(f, "{} {} {}", name, start, end),
            ReadHit::NoHit { name } => write!(f, "{} No Hit Found", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingReport {
    pub hits: Vec<ReadHit>,
    /// 至少有一个候选位置的读段数
    pub reads_with_candidates: usize,
    pub total_candidates: usize,
}

impl MappingReport {
    pub fn mapped(&self) -> usize {
        self.hits.iter().filter(|h| h.is_hit()).count()
    }

    /// 有候选位置的读段平均候选数
    pub fn avg_candidates(&self) -> f64 {
        if self.reads_with_candidates == 0 {
            return 0.0;
        }
        self.total_candidates as f64 / self.reads_with_candidates as f64
    }
}

/// 以后缀树做种子、局部比对打分的读段映射器。
pub struct ReadMapper<'a, 't> {
    tree: &'a SuffixTree<'t>,
    table: ScoreTable,
    opt: MapOpt,
}

impl<'a, 't> ReadMapper<'a, 't> {
    pub fn new(tree: &'a SuffixTree<'t>, table: ScoreTable, opt: MapOpt) -> Result<Self> {
        table.validate()?;
        opt.validate()?;
        Ok(Self { tree, table, opt })
    }

    /// 映射单条读段，返回结果与候选位置数
    pub fn map_read(&self, read: &Sequence) -> Result<(ReadHit, usize)> {
        let gene = self.tree.text();
        let r = read.len();
        let locations = self.tree.find_loc(read.as_bytes());

        let mut best_coverage = 0.0f64;
        let mut best_start = None;

        for &l in &locations {
            let ws = l.saturating_sub(r);
            let we = (l + r).min(gene.len());
            let aln = align(&gene[ws..we], read.as_bytes(), &self.table, Mode::Local)?;
            let st = AlignmentStats::from_actions(&aln.actions);
            if st.align_len() == 0 {
                continue;
            }

            let identity = st.percent_identity();
            let coverage = st.length_coverage(r);
            // 覆盖度相同时后扫描到的候选胜出
            if identity >= self.opt.min_identity && coverage >= self.opt.min_coverage && best_coverage <= coverage {
                best_coverage = coverage;
                best_start = Some(ws + leading_offset(&aln.actions));
            }
        }

        let name = read.name().to_string();
        let hit = match best_start {
            Some(start) => ReadHit::Hit { name, start, end: start + r },
            None => ReadHit::NoHit { name },
        };
        log::debug!("{} ({} candidates)", hit, locations.len());
        Ok((hit, locations.len()))
    }

    /// 并行映射全部读段，输出顺序与输入一致
    pub fn map_all(&self, reads: &[Sequence]) -> Result<MappingReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.opt.threads.max(1))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let results: Vec<(ReadHit, usize)> =
            pool.install(|| reads.par_iter().map(|r| self.map_read(r)).collect::<Result<Vec<_>>>())?;

        let mut report = MappingReport { hits: Vec::with_capacity(results.len()), ..Default::default() };
        for (hit, candidates) in results {
            if candidates > 0 {
                report.reads_with_candidates += 1;
                report.total_candidates += candidates;
            }
            report.hits.push(hit);
        }
        log::info!(
            "{} of {} reads mapped ({} with candidates, {} threads)",
            report.mapped(),
            reads.len(),
            report.reads_with_candidates,
            self.opt.threads.max(1)
        );
        Ok(report)
    }
}

/// 比对起点相对窗口的偏移：第一个 Match 之前的 PadDeletion 数
fn leading_offset(actions: &[Action]) -> usize {
    actions
        .iter()
        .take_while(|&&a| a != Action::Match)
        .filter(|&&a| a == Action::PadDeletion)
        .count()
}

/// 为参考序列建索引并映射全部读段；参考序列缺少终止符时自动补上。
pub fn map_reads(gene: &Sequence, reads: &[Sequence], table: &ScoreTable, opt: &MapOpt) -> Result<MappingReport> {
    let text: Cow<'_, [u8]> = if gene.ends_with_sentinel() {
        Cow::Borrowed(gene.as_bytes())
    } else {
        let mut v = Vec::with_capacity(gene.len() + 1);
        v.extend_from_slice(gene.as_bytes());
        v.push(SENTINEL);
        Cow::Owned(v)
    };

    let tree = SuffixTree::build(&text, opt.min_match_len)?;
    ReadMapper::new(&tree, *table, *opt)?.map_all(reads)
}
