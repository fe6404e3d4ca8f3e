use anyhow::{Context, Result};
use std::path::Path;

use crate::align::ScoreTable;

/// 读取 JSON 打分表（`match` / `mismatch` / `h` / `g`）。
///
/// 未给出路径或文件不存在时回退到默认表 {1, -2, -5, -2}。
pub fn load_score_table(path: Option<&Path>) -> Result<ScoreTable> {
    let table = match path {
        Some(p) if p.exists() => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("cannot read score table '{}'", p.display()))?;
            let table: ScoreTable = serde_json::from_str(&text)
                .with_context(|| format!("cannot parse score table '{}'", p.display()))?;
            log::info!("score table loaded from {}", p.display());
            table
        }
        Some(p) => {
            log::warn!("score table '{}' not found, using defaults", p.display());
            ScoreTable::default()
        }
        None => ScoreTable::default(),
    };
    table.validate()?;
    Ok(table)
}
