use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use stmap::align::{self, MapOpt, Mode};
use stmap::index::{dot, SuffixTree};
use stmap::io::{self as sio, Alphabet};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "stmap", author, version, about = "Suffix-tree indexed read mapper", arg_required_else_help = true)]
struct Cli {
    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a suffix tree and print the requested views
    Tree {
        /// Sequence file; the first record is indexed
        input: PathBuf,
        /// Whitespace-separated alphabet used to validate the input
        #[arg(short, long)]
        alphabet: Option<PathBuf>,
        /// Write the tree in Graphviz dot format
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Write tree statistics
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Write the BWT, one character per line
        #[arg(long)]
        bwt: Option<PathBuf>,
        /// Write post-order node IDs, one per line
        #[arg(long)]
        post: Option<PathBuf>,
        /// Write DFS (preorder) node IDs, one per line
        #[arg(long)]
        dfs: Option<PathBuf>,
        /// Write the longest repeated substring
        #[arg(long)]
        lcs: Option<PathBuf>,
    },
    /// Align the first two sequences of a file
    Align {
        input: PathBuf,
        #[arg(long, conflicts_with = "global")]
        local: bool,
        #[arg(long)]
        global: bool,
        /// JSON score table (match, mismatch, h, g)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Report path (stdout if omitted)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Map reads onto a reference gene
    Map {
        #[arg(short, long)]
        gene: PathBuf,
        #[arg(short, long)]
        reads: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Minimum exact match length for candidate lookup
        #[arg(short = 'x', long = "min-match", default_value_t = 25)]
        min_match_len: usize,
        #[arg(long, default_value_t = 0.90)]
        identity: f64,
        #[arg(long, default_value_t = 0.80)]
        coverage: f64,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    match cli.command {
        Commands::Tree { input, alphabet, dot, stats, bwt, post, dfs, lcs } => {
            let views = TreeViews { dot, stats, bwt, post, dfs, lcs };
            run_tree(&input, alphabet.as_deref(), &views)
        }
        Commands::Align { input, local, global, config, report } => {
            let mode = align_mode(local, global);
            run_align(&input, mode, config.as_deref(), report.as_deref())
        }
        Commands::Map { gene, reads, config, min_match_len, identity, coverage, threads, out } => {
            let opt = MapOpt { min_match_len, min_identity: identity, min_coverage: coverage, threads };
            run_map(&gene, &reads, config.as_deref(), opt, out.as_deref())
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("cannot create '{}'", p.display()))?,
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    })
}

struct TreeViews {
    dot: Option<PathBuf>,
    stats: Option<PathBuf>,
    bwt: Option<PathBuf>,
    post: Option<PathBuf>,
    dfs: Option<PathBuf>,
    lcs: Option<PathBuf>,
}

/// `--global` 为默认；两者互斥由 clap 保证
fn align_mode(local: bool, global: bool) -> Mode {
    if local && !global {
        Mode::Local
    } else {
        Mode::Global
    }
}

/// 每个视图写入各自的文件
fn write_view(path: Option<&Path>, what: &str, body: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let mut out = open_output(Some(path))?;
    body(&mut *out).with_context(|| format!("cannot write {} to '{}'", what, path.display()))?;
    out.flush()?;
    log::info!("{} written to {}", what, path.display());
    Ok(())
}

fn write_lines<T: std::fmt::Display>(out: &mut dyn Write, items: impl IntoIterator<Item = T>) -> std::io::Result<()> {
    for item in items {
        writeln!(out, "{}", item)?;
    }
    Ok(())
}

fn run_tree(input: &Path, alphabet: Option<&Path>, views: &TreeViews) -> Result<()> {
    let seq = sio::read_first(input)?;
    if let Some(path) = alphabet {
        let alphabet = Alphabet::from_file(path)?;
        alphabet.validate(&seq).with_context(|| format!("sequence '{}' rejected", seq.name()))?;
        log::info!("alphabet of {} symbols accepted '{}'", alphabet.len(), seq.name());
    }
    if !seq.ends_with_sentinel() {
        log::info!("appending sentinel to '{}'", seq.name());
    }
    let seq = seq.with_sentinel();

    let t0 = Instant::now();
    let tree = SuffixTree::build(seq.as_bytes(), 0)?;
    let elapsed = t0.elapsed().as_secs_f64();
    log::info!("suffix tree of '{}' ({} chars) built in {:.3}s", seq.name(), seq.len(), elapsed);

    write_view(views.stats.as_deref(), "tree stats", |out| {
        writeln!(out, "# Input : {}", input.display())?;
        writeln!(out, "# Sequence : {} ({} characters)", seq.name(), seq.len())?;
        writeln!(out, "# Built : {}", chrono::Utc::now().to_rfc3339())?;
        writeln!(out, "# Construction time (s) : {:.6}", elapsed)?;
        writeln!(out, "{}", tree.stats())
    })?;
    write_view(views.lcs.as_deref(), "longest repeat", |out| {
        let lcs = tree.lcs();
        writeln!(out, "# Longest repeat : [{}, {}) length {}", lcs.start, lcs.end, lcs.len())?;
        writeln!(out, "{}", lcs.text)
    })?;
    write_view(views.dfs.as_deref(), "DFS order", |out| write_lines(out, tree.dfs()))?;
    write_view(views.post.as_deref(), "post order", |out| write_lines(out, tree.post_order()))?;
    write_view(views.bwt.as_deref(), "BWT", |out| write_lines(out, tree.bwt().into_iter().map(char::from)))?;
    write_view(views.dot.as_deref(), "dot graph", |out| dot::write_dot(&tree, out))?;
    Ok(())
}

fn run_align(input: &Path, mode: Mode, config: Option<&Path>, report: Option<&Path>) -> Result<()> {
    let table = sio::load_score_table(config)?;
    let seqs = sio::read_sequences(input)?;
    let [s1, s2] = match seqs.as_slice() {
        [a, b, ..] => [a, b],
        _ => anyhow::bail!("'{}' must contain two sequences, found {}", input.display(), seqs.len()),
    };

    let t0 = Instant::now();
    let aln = align::align(s1.as_bytes(), s2.as_bytes(), &table, mode)?;
    log::info!(
        "{:?} alignment of {}x{} cells in {:.3}s, score {}",
        mode,
        s1.len() + 1,
        s2.len() + 1,
        t0.elapsed().as_secs_f64(),
        aln.score
    );

    let st = align::AlignmentStats::from_actions(&aln.actions);
    let mut out = open_output(report)?;
    align::write_score_table(&mut out, &table)?;
    align::write_alignment(&mut out, (s1.name(), s1.as_bytes()), (s2.name(), s2.as_bytes()), &aln.actions)?;
    align::write_summary(&mut out, &st, &table, mode == Mode::Local)?;
    out.flush()?;
    Ok(())
}

fn run_map(gene: &Path, reads: &Path, config: Option<&Path>, opt: MapOpt, out: Option<&Path>) -> Result<()> {
    let table = sio::load_score_table(config)?;
    let gene = sio::read_first(gene)?;
    let reads = sio::read_sequences(reads)?;
    log::info!("mapping {} reads onto '{}' ({} chars), x = {}", reads.len(), gene.name(), gene.len(), opt.min_match_len);

    let t0 = Instant::now();
    let report = align::map_reads(&gene, &reads, &table, &opt)?;
    log::info!("mapped {} reads in {:.3}s", reads.len(), t0.elapsed().as_secs_f64());

    let mut fh = open_output(out)?;
    for hit in &report.hits {
        writeln!(fh, "{}", hit)?;
    }
    fh.flush()?;

    let mapped = report.mapped();
    log::info!("reads with candidates: {}", report.reads_with_candidates);
    log::info!("average candidates per read with candidates: {:.2}", report.avg_candidates());
    log::info!("hits: {}, no hits: {}", mapped, report.hits.len() - mapped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stmap-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn tree_views_take_separate_paths() {
        let cli = Cli::try_parse_from(["stmap", "tree", "g.fa", "--dfs", "d.txt", "--post", "p.txt", "--bwt", "b.txt"])
            .unwrap();
        match cli.command {
            Commands::Tree { dfs, post, bwt, stats, lcs, dot, .. } => {
                assert_eq!(dfs, Some(PathBuf::from("d.txt")));
                assert_eq!(post, Some(PathBuf::from("p.txt")));
                assert_eq!(bwt, Some(PathBuf::from("b.txt")));
                assert!(stats.is_none() && lcs.is_none() && dot.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tree_writes_each_view_to_its_own_file() {
        let dir = scratch_dir("tree");
        let input = dir.join("banana.fa");
        std::fs::write(&input, ">banana\nbanana\n").unwrap();
        let views = TreeViews {
            dot: None,
            stats: Some(dir.join("stats.txt")),
            bwt: Some(dir.join("bwt.txt")),
            post: Some(dir.join("post.txt")),
            dfs: Some(dir.join("dfs.txt")),
            lcs: None,
        };
        run_tree(&input, None, &views).unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("bwt.txt")).unwrap(), "a\nn\nn\nb\n$\na\na\n");

        let dfs = std::fs::read_to_string(dir.join("dfs.txt")).unwrap();
        let ids: Vec<usize> = dfs.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(ids.len(), 11);
        assert_eq!(ids[0], 1);

        let post = std::fs::read_to_string(dir.join("post.txt")).unwrap();
        let ids: Vec<usize> = post.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(ids.len(), 11);
        assert_eq!(ids.last(), Some(&1));

        let stats = std::fs::read_to_string(dir.join("stats.txt")).unwrap();
        assert!(stats.contains("# Total number of nodes : 11"));
        assert!(!stats.contains("\na\n"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn alignment_mode_flags() {
        assert!(Cli::try_parse_from(["stmap", "align", "x.fa", "--local", "--global"]).is_err());
        assert_eq!(align_mode(true, false), Mode::Local);
        assert_eq!(align_mode(false, true), Mode::Global);
        assert_eq!(align_mode(false, false), Mode::Global);
    }
}
