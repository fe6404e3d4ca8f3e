use anyhow::{Context, Result};
use std::path::Path;

use crate::error::Error;
use crate::util::{Sequence, SENTINEL};

/// 输入字母表；终止符总是合法。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    allowed: [bool; 256],
    size: usize,
}

impl Alphabet {
    /// 以空白分隔的单字节符号，例如 `"A C G T"`
    pub fn parse(text: &str) -> Self {
        let mut allowed = [false; 256];
        let mut size = 0;
        for b in text.split_whitespace().filter_map(|tok| tok.bytes().next()) {
            if !allowed[b as usize] {
                allowed[b as usize] = true;
                size += 1;
            }
        }
        Self { allowed, size }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read alphabet file '{}'", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        b == SENTINEL || self.allowed[b as usize]
    }

    /// 返回第一个不在字母表中的符号
    pub fn validate(&self, seq: &Sequence) -> crate::error::Result<()> {
        match seq.as_bytes().iter().position(|&b| !self.contains(b)) {
            Some(position) => Err(Error::UnknownSymbol { symbol: seq.as_bytes()[position] as char, position }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_separated_symbols() {
        let a = Alphabet::parse("A C\nG\tT  A\n");
        assert_eq!(a.len(), 4);
        assert!(a.contains(b'G'));
        assert!(!a.contains(b'N'));
        assert!(a.contains(SENTINEL));
    }

    #[test]
    fn validate_reports_first_unknown_symbol() {
        let a = Alphabet::parse("A C G T");
        assert!(a.validate(&Sequence::new("ok", b"ACGT$".to_vec())).is_ok());
        match a.validate(&Sequence::new("bad", b"ACNGX$".to_vec())) {
            Err(Error::UnknownSymbol { symbol, position }) => {
                assert_eq!(symbol, 'N');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
