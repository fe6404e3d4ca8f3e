use std::io::{self, Write};

use super::affine::Action;
use super::score::ScoreTable;

const LINE_WIDTH: usize = 60;

/// 比对统计，补齐动作一律不计入。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: usize,
    pub mismatches: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub gap_opens: usize,
}

impl AlignmentStats {
    pub fn from_actions(actions: &[Action]) -> Self {
        let mut st = Self::default();
        let mut open: Option<Action> = None;
        for &a in actions {
            match a {
                Action::Match => st.matches += 1,
                Action::Mismatch => st.mismatches += 1,
                Action::Insertion => st.insertions += 1,
                Action::Deletion => st.deletions += 1,
                _ => {}
            }
            match a {
                Action::Insertion | Action::Deletion => {
                    if open != Some(a) {
                        st.gap_opens += 1;
                    }
                    open = Some(a);
                }
                _ => open = None,
            }
        }
        st
    }

    pub fn gaps(&self) -> usize {
        self.insertions + self.deletions
    }

    /// 比对列数（不含补齐）
    pub fn columns(&self) -> usize {
        self.matches + self.mismatches + self.gaps()
    }

    /// 读段映射使用的比对长度：Match + Insertion + Deletion
    pub fn align_len(&self) -> usize {
        self.matches + self.gaps()
    }

    pub fn percent_identity(&self) -> f64 {
        match self.align_len() {
            0 => 0.0,
            len => self.matches as f64 / len as f64,
        }
    }

    pub fn length_coverage(&self, read_len: usize) -> f64 {
        if read_len == 0 || self.align_len() == 0 {
            return 0.0;
        }
        self.align_len() as f64 / read_len as f64
    }

    /// 按打分表重新计算的得分
    pub fn score(&self, t: &ScoreTable) -> i64 {
        t.match_score * self.matches as i64
            + t.mismatch * self.mismatches as i64
            + t.h * self.gap_opens as i64
            + t.g * self.gaps() as i64
    }
}

pub fn write_score_table<W: Write>(out: &mut W, t: &ScoreTable) -> io::Result<()> {
    writeln!(out, "Scores:\t\tmatch = {}, mismatch = {}, h = {}, g = {}\n", t.match_score, t.mismatch, t.h, t.g)
}

/// 三行文本渲染，每块 60 列；`|` 表示匹配，`-` 表示间隙。
pub fn write_alignment<W: Write>(
    out: &mut W,
    (name1, s1): (&str, &[u8]),
    (name2, s2): (&str, &[u8]),
    actions: &[Action],
) -> io::Result<()> {
    writeln!(out, "s1 = \"{}\", length = {} characters", name1, s1.len())?;
    writeln!(out, "s2 = \"{}\", length = {} characters\n", name2, s2.len())?;

    let (mut i, mut j) = (0usize, 0usize);
    for block in actions.chunks(LINE_WIDTH) {
        let (mut top, mut mid, mut bottom) = (String::new(), String::new(), String::new());
        let (i_start, j_start) = (i, j);
        for &a in block {
            let c1 = if a.consumes_s1() {
                i += 1;
                s1.get(i - 1).map_or('?', |&b| b as char)
            } else {
                '-'
            };
            let c2 = if a.consumes_s2() {
                j += 1;
                s2.get(j - 1).map_or('?', |&b| b as char)
            } else {
                '-'
            };
            top.push(c1);
            bottom.push(c2);
            mid.push(match a {
                Action::Match => '|',
                a if a.is_padding() => '.',
                _ => ' ',
            });
        }
        writeln!(out, "s1 {:>10} {} {:>10}", i_start + 1, top, i)?;
        writeln!(out, "{:14}{}", "", mid)?;
        writeln!(out, "s2 {:>10} {} {:>10}\n", j_start + 1, bottom, j)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, st: &AlignmentStats, t: &ScoreTable, local: bool) -> io::Result<()> {
    let cols = st.columns();
    let pct = |x: usize| if cols == 0 { 0 } else { 100 * x / cols };
    writeln!(out, "\nReport:\n")?;
    writeln!(out, "{} optimal score = {}\n", if local { "Local" } else { "Global" }, st.score(t))?;
    writeln!(
        out,
        "Number of: matches = {}, mismatches = {}, gaps = {}, opening gaps = {}\n",
        st.matches,
        st.mismatches,
        st.gaps(),
        st.gap_opens
    )?;
    writeln!(
        out,
        "Identities = {}/{} ({}%), Gaps = {}/{} ({}%)",
        st.matches,
        cols,
        pct(st.matches),
        st.gaps(),
        cols,
        pct(st.gaps())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::affine::{align, Mode};

    #[test]
    fn stats_ignore_padding_and_count_openings() {
        use Action::*;
        let actions = [PadDeletion, PadDiagonal, Match, Deletion, Deletion, Match, Insertion, Mismatch, PadInsertion];
        let st = AlignmentStats::from_actions(&actions);
        assert_eq!(st.matches, 2);
        assert_eq!(st.mismatches, 1);
        assert_eq!(st.deletions, 2);
        assert_eq!(st.insertions, 1);
        assert_eq!(st.gap_opens, 2);
        assert_eq!(st.align_len(), 5);
        assert_eq!(st.columns(), 6);
    }

    #[test]
    fn recomputed_score_matches_engine() {
        let t = ScoreTable::default();
        for (a, b) in [(&b"ACGT"[..], &b"AGT"[..]), (b"GATTACA", b"GCATGCT"), (b"AACCGGTT", b"AAGGTT")] {
            let aln = align(a, b, &t, Mode::Global).unwrap();
            assert_eq!(AlignmentStats::from_actions(&aln.actions).score(&t), aln.score);
        }
    }

    #[test]
    fn empty_alignment_has_zero_ratios() {
        let st = AlignmentStats::from_actions(&[Action::PadDiagonal, Action::PadDeletion]);
        assert_eq!(st.align_len(), 0);
        assert_eq!(st.percent_identity(), 0.0);
        assert_eq!(st.length_coverage(10), 0.0);
    }

    #[test]
    fn renders_three_rows() {
        let t = ScoreTable::default();
        let aln = align(b"ACGT", b"AGT", &t, Mode::Global).unwrap();
        let mut buf = Vec::new();
        write_alignment(&mut buf, ("a", b"ACGT"), ("b", b"AGT"), &aln.actions).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("s1          1 ACGT          4"));
        assert!(text.contains("              | ||"));
        assert!(text.contains("s2          1 A-GT          3"));
    }

    #[test]
    fn long_alignments_wrap() {
        let seq = vec![b'A'; 130];
        let aln = align(&seq, &seq, &ScoreTable::default(), Mode::Global).unwrap();
        let mut buf = Vec::new();
        write_alignment(&mut buf, ("x", &seq), ("y", &seq), &aln.actions).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("s1 ") && !l.contains('=')).count(), 3);
        assert!(text.contains("s1        121 "));
    }

    #[test]
    fn summary_lines() {
        let t = ScoreTable::default();
        let st = AlignmentStats { matches: 3, mismatches: 0, insertions: 0, deletions: 1, gap_opens: 1 };
        let mut buf = Vec::new();
        write_summary(&mut buf, &st, &t, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Global optimal score = -4"));
        assert!(text.contains("Identities = 3/4 (75%), Gaps = 1/4 (25%)"));
    }
}
