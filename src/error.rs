use thiserror::Error;

/// 索引构建与比对过程中的错误类型。
///
/// 前置条件错误（空序列、缺少终止符、非法打分表……）在算法开始之前返回；
/// `Invariant` 表示内部结构被破坏，整个操作必须中止。
#[derive(Debug, Error)]
pub enum Error {
    #[error("sequence is empty")]
    EmptySequence,

    #[error("sequence does not end with the terminal sentinel '{sentinel}'")]
    MissingSentinel { sentinel: char },

    #[error("terminal sentinel also occurs at position {position}")]
    SentinelNotUnique { position: usize },

    #[error("symbol '{symbol}' at position {position} is not in the alphabet")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("invalid score table: {0}")]
    InvalidScoreTable(String),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("cannot build thread pool: {0}")]
    ThreadPool(String),

    /// Internal consistency failure; the tree or matrix cannot be trusted.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_invariant(&self) -> bool {
        matches!(self, Error::Invariant(_))
    }
}
