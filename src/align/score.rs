use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 仿射间隙打分表：开启一个长度为 k 的间隙得分为 `h + k * g`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    #[serde(rename = "match")]
    pub match_score: i64,
    pub mismatch: i64,
    pub h: i64,
    pub g: i64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self { match_score: 1, mismatch: -2, h: -5, g: -2 }
    }
}

impl ScoreTable {
    pub fn new(match_score: i64, mismatch: i64, h: i64, g: i64) -> Self {
        Self { match_score, mismatch, h, g }
    }

    /// match 必须为正，其余三项不得为正
    pub fn validate(&self) -> Result<()> {
        if self.match_score <= 0 {
            return Err(Error::InvalidScoreTable(format!("match must be positive, got {}", self.match_score)));
        }
        for (name, value) in [("mismatch", self.mismatch), ("h", self.h), ("g", self.g)] {
            if value > 0 {
                return Err(Error::InvalidScoreTable(format!("{} must not be positive, got {}", name, value)));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i64 {
        if a == b {
            self.match_score
        } else {
            self.mismatch
        }
    }

    #[inline]
    pub fn gap_open(&self) -> i64 {
        self.h + self.g
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let t = ScoreTable::default();
        assert_eq!(t, ScoreTable::new(1, -2, -5, -2));
        assert!(t.validate().is_ok());
        assert_eq!(t.gap_open(), -7);
    }

    #[test]
    fn rejects_wrong_signs() {
        assert!(ScoreTable::new(0, -2, -5, -2).validate().is_err());
        assert!(ScoreTable::new(1, 2, -5, -2).validate().is_err());
        assert!(ScoreTable::new(1, -2, 5, -2).validate().is_err());
        assert!(ScoreTable::new(1, -2, -5, 1).validate().is_err());
        assert!(ScoreTable::new(2, 0, 0, 0).validate().is_ok());
    }
}
