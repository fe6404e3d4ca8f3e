pub mod alphabet;
pub mod config;
pub mod fasta;

pub use alphabet::Alphabet;
pub use config::load_score_table;
pub use fasta::{read_first, read_sequences, FastaReader};
