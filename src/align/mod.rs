pub mod affine;
pub mod mapper;
pub mod report;
pub mod score;

pub use affine::{align, Action, Alignment, Mode, IMPOSSIBLE};
pub use mapper::{map_reads, MapOpt, MappingReport, ReadHit, ReadMapper};
pub use report::{write_alignment, write_score_table, write_summary, AlignmentStats};
pub use score::ScoreTable;
