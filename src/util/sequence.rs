use std::fmt;
use std::ops::Range;

/// 序列终止符，必须唯一且位于序列末尾。
pub const SENTINEL: u8 = b'$';

/// 带名称的字符序列，加载后只读。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    name: String,
    residues: Vec<u8>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, residues: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), residues: residues.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.residues
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<u8> {
        self.residues.get(pos).copied()
    }

    pub fn window(&self, range: Range<usize>) -> &[u8] {
        &self.residues[range]
    }

    pub fn ends_with_sentinel(&self) -> bool {
        self.residues.last() == Some(&SENTINEL)
    }

    /// 追加终止符（已存在时原样返回）
    pub fn with_sentinel(mut self) -> Self {
        if !self.ends_with_sentinel() {
            self.residues.push(SENTINEL);
        }
        self
    }

    pub fn append_chunk(&mut self, chunk: &[u8]) {
        self.residues.extend_from_slice(chunk);
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, String::from_utf8_lossy(&self.residues))
    }
}
