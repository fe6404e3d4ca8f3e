use std::ops::{Index, IndexMut, Range};

use super::score::ScoreTable;
use crate::error::{Error, Result};

/// 不可达状态的哨兵值，参与加法时保持不变。
pub const IMPOSSIBLE: i64 = i64::MIN;

#[inline]
fn add(score: i64, delta: i64) -> i64 {
    if score == IMPOSSIBLE {
        IMPOSSIBLE
    } else {
        score + delta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Global,
    Local,
}

/// 比对动作。`Pad*` 仅用于局部比对的两端补齐，不计分。
///
/// 以 s1 为行、s2 为列：`Deletion` 只消耗 s1，`Insertion` 只消耗 s2。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Match,
    Mismatch,
    Insertion,
    Deletion,
    PadDiagonal,
    PadInsertion,
    PadDeletion,
}

impl Action {
    #[inline]
    pub fn is_padding(self) -> bool {
        matches!(self, Action::PadDiagonal | Action::PadInsertion | Action::PadDeletion)
    }

    /// 是否消耗 s1 的一个字符
    #[inline]
    pub fn consumes_s1(self) -> bool {
        !matches!(self, Action::Insertion | Action::PadInsertion)
    }

    /// 是否消耗 s2 的一个字符
    #[inline]
    pub fn consumes_s2(self) -> bool {
        !matches!(self, Action::Deletion | Action::PadDeletion)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffineCell {
    pub matched: i64,
    pub insertion: i64,
    pub deletion: i64,
}

impl AffineCell {
    const UNREACHABLE: AffineCell = AffineCell { matched: IMPOSSIBLE, insertion: IMPOSSIBLE, deletion: IMPOSSIBLE };

    #[inline]
    fn best(&self) -> i64 {
        self.matched.max(self.deletion).max(self.insertion)
    }

    #[inline]
    fn get(&self, state: State) -> i64 {
        match state {
            State::Diagonal => self.matched,
            State::Insertion => self.insertion,
            State::Deletion => self.deletion,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Diagonal,
    Insertion,
    Deletion,
}

/// 行优先展平的 DP 矩阵，每次比对单独分配
struct DpMatrix {
    cols: usize,
    cells: Vec<AffineCell>,
}

impl DpMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self { cols, cells: vec![AffineCell::UNREACHABLE; rows * cols] }
    }
}

impl Index<(usize, usize)> for DpMatrix {
    type Output = AffineCell;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &AffineCell {
        &self.cells[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for DpMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut AffineCell {
        &mut self.cells[i * self.cols + j]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub mode: Mode,
    pub score: i64,
    /// 从左到右的动作序列；局部比对时包含两端补齐
    pub actions: Vec<Action>,
    /// 真正参与比对的 s1 区间
    pub s1_span: Range<usize>,
    /// 真正参与比对的 s2 区间
    pub s2_span: Range<usize>,
}

impl Alignment {
    /// 去除补齐后的核心动作
    pub fn core(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied().filter(|a| !a.is_padding())
    }
}

/// 仿射间隙比对（全局 / 局部），返回一条最优路径及其得分。
///
/// 平局规则：全局比对终点按 Match → Deletion → Insertion 严格大于才覆盖；
/// 局部比对取行优先扫描中第一个最大的 Match 单元；
/// 回溯时依次尝试对角、Insertion、Deletion 前驱。
pub fn align(s1: &[u8], s2: &[u8], table: &ScoreTable, mode: Mode) -> Result<Alignment> {
    table.validate()?;

    let m = fill_matrix(s1, s2, table, mode);
    let (i, j, state, score) = optimal_cell(&m, s1.len(), s2.len(), mode);
    let (core, (i0, j0)) = traceback(&m, s1, s2, table, mode, (i, j, state, score))?;

    let actions = match mode {
        Mode::Global => core,
        Mode::Local => pad(core, (i0, j0), (i, j), s1.len(), s2.len()),
    };

    Ok(Alignment { mode, score, actions, s1_span: i0..i, s2_span: j0..j })
}

fn fill_matrix(s1: &[u8], s2: &[u8], t: &ScoreTable, mode: Mode) -> DpMatrix {
    let rows = s1.len() + 1;
    let cols = s2.len() + 1;
    let mut m = DpMatrix::new(rows, cols);

    // 边界：全局比对为前导间隙，局部比对可在任意位置零代价开始
    let (edge_match, edge_gap) = match mode {
        Mode::Global => (IMPOSSIBLE, None),
        Mode::Local => (0, Some(0)),
    };
    m[(0, 0)] = AffineCell { matched: 0, insertion: IMPOSSIBLE, deletion: IMPOSSIBLE };
    for i in 1..rows {
        m[(i, 0)] = AffineCell {
            matched: edge_match,
            insertion: IMPOSSIBLE,
            deletion: edge_gap.unwrap_or(t.h + i as i64 * t.g),
        };
    }
    for j in 1..cols {
        m[(0, j)] = AffineCell {
            matched: edge_match,
            insertion: edge_gap.unwrap_or(t.h + j as i64 * t.g),
            deletion: IMPOSSIBLE,
        };
    }

    let open = t.gap_open();
    for i in 1..rows {
        for j in 1..cols {
            let diag = m[(i - 1, j - 1)];
            let up = m[(i - 1, j)];
            let left = m[(i, j - 1)];

            let mut matched = add(diag.best(), t.substitution(s1[i - 1], s2[j - 1]));
            if mode == Mode::Local {
                matched = matched.max(0);
            }
            let deletion = add(up.matched, open)
                .max(add(up.deletion, t.g))
                .max(add(up.insertion, open));
            let insertion = add(left.matched, open)
                .max(add(left.deletion, open))
                .max(add(left.insertion, t.g));

            m[(i, j)] = AffineCell { matched, insertion, deletion };
        }
    }
    m
}

fn optimal_cell(m: &DpMatrix, n1: usize, n2: usize, mode: Mode) -> (usize, usize, State, i64) {
    match mode {
        Mode::Global => {
            let cell = m[(n1, n2)];
            let mut best = (State::Diagonal, cell.matched);
            if cell.deletion > best.1 {
                best = (State::Deletion, cell.deletion);
            }
            if cell.insertion > best.1 {
                best = (State::Insertion, cell.insertion);
            }
            (n1, n2, best.0, best.1)
        }
        Mode::Local => {
            let mut best = (0, 0, m[(0, 0)].matched);
            for i in 0..=n1 {
                for j in 0..=n2 {
                    let v = m[(i, j)].matched;
                    if v > best.2 {
                        best = (i, j, v);
                    }
                }
            }
            (best.0, best.1, State::Diagonal, best.2)
        }
    }
}

/// 局部比对在边界或当前单元 Match 值为 0 处停止，与回溯所处状态无关
fn stops(m: &DpMatrix, mode: Mode, i: usize, j: usize) -> bool {
    match mode {
        Mode::Global => i == 0 && j == 0,
        Mode::Local => i == 0 || j == 0 || m[(i, j)].matched == 0,
    }
}

/// 回溯最优路径，返回从左到右的动作序列以及比对起点 (i0, j0)。
fn traceback(
    m: &DpMatrix,
    s1: &[u8],
    s2: &[u8],
    t: &ScoreTable,
    mode: Mode,
    start: (usize, usize, State, i64),
) -> Result<(Vec<Action>, (usize, usize))> {
    let (mut i, mut j, mut state, mut score) = start;
    let open = t.gap_open();
    let mut actions = Vec::with_capacity(s1.len() + s2.len());

    while !stops(m, mode, i, j) {
        // 前驱单元以及依次从 Diagonal / Insertion / Deletion 转移过来的代价
        let (pi, pj, costs) = match state {
            State::Diagonal if i > 0 && j > 0 => {
                let sub = t.substitution(s1[i - 1], s2[j - 1]);
                actions.push(if s1[i - 1] == s2[j - 1] { Action::Match } else { Action::Mismatch });
                (i - 1, j - 1, [sub, sub, sub])
            }
            State::Insertion if j > 0 => {
                actions.push(Action::Insertion);
                (i, j - 1, [open, t.g, open])
            }
            State::Deletion if i > 0 => {
                actions.push(Action::Deletion);
                (i - 1, j, [open, open, t.g])
            }
            _ => {
                return Err(Error::Invariant(format!(
                    "traceback left the matrix in state {:?} at ({}, {})",
                    state, i, j
                )))
            }
        };

        let prev = m[(pi, pj)];
        let found = [State::Diagonal, State::Insertion, State::Deletion]
            .into_iter()
            .zip(costs)
            .find(|&(st, cost)| {
                let s = prev.get(st);
                s != IMPOSSIBLE && s + cost == score
            });
        let Some((st, _)) = found else {
            return Err(Error::Invariant(format!(
                "traceback found no predecessor for score {} in state {:?} at ({}, {})",
                score, state, i, j
            )));
        };

        i = pi;
        j = pj;
        state = st;
        score = prev.get(st);
    }

    actions.reverse();
    Ok((actions, (i, j)))
}

/// 局部比对两端补齐，使动作序列覆盖两条完整序列：
/// 先对角补齐两侧共有的未比对长度，再用单侧间隙补齐较长一侧。
fn pad(core: Vec<Action>, (i0, j0): (usize, usize), (i1, j1): (usize, usize), n1: usize, n2: usize) -> Vec<Action> {
    let lead = i0.min(j0);
    let (tail1, tail2) = (n1 - i1, n2 - j1);
    let trail = tail1.min(tail2);

    let mut out = Vec::with_capacity(core.len() + n1.max(n2));
    out.extend(std::iter::repeat(Action::PadDeletion).take(i0 - lead));
    out.extend(std::iter::repeat(Action::PadInsertion).take(j0 - lead));
    out.extend(std::iter::repeat(Action::PadDiagonal).take(lead));
    out.extend(core);
    out.extend(std::iter::repeat(Action::PadDiagonal).take(trail));
    out.extend(std::iter::repeat(Action::PadDeletion).take(tail1 - trail));
    out.extend(std::iter::repeat(Action::PadInsertion).take(tail2 - trail));
    out
}
