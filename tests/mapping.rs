use std::io::Cursor;

use stmap::align::{map_reads, MapOpt, ReadHit, ScoreTable};
use stmap::io::{Alphabet, FastaReader};
use stmap::util::Sequence;

fn make_reference(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            bases[(x >> 16) as usize % 4]
        })
        .collect()
}

fn to_fasta(seqs: &[Sequence]) -> String {
    let mut out = String::new();
    for s in seqs {
        out.push('>');
        out.push_str(s.name());
        out.push('\n');
        for line in s.as_bytes().chunks(60) {
            out.push_str(std::str::from_utf8(line).unwrap());
            out.push('\n');
        }
    }
    out
}

fn parse(text: &str) -> Vec<Sequence> {
    FastaReader::new(Cursor::new(text.as_bytes()))
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn maps_reads_read_from_fasta() {
    let reference = make_reference(2_000, 7);
    let gene = Sequence::new("chrT", reference.clone());

    let mut mutated = reference[900..1000].to_vec();
    mutated[70] = if mutated[70] == b'G' { b'T' } else { b'G' };
    let reads = vec![
        Sequence::new("exact", reference[150..250].to_vec()),
        Sequence::new("mismatch", mutated),
        Sequence::new("absent", vec![b'N'; 100]),
        Sequence::new("tail", reference[1_920..2_000].to_vec()),
    ];

    let gene = parse(&to_fasta(&[gene])).remove(0);
    let reads = parse(&to_fasta(&reads));
    assert_eq!(gene.len(), 2_000);
    assert_eq!(reads.len(), 4);

    let report = map_reads(&gene, &reads, &ScoreTable::default(), &MapOpt::default()).unwrap();
    let lines: Vec<String> = report.hits.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["exact 150 250", "mismatch 900 1000", "absent No Hit Found", "tail 1920 2000"]);
    assert_eq!(report.mapped(), 3);
    assert_eq!(report.reads_with_candidates, 3);
    assert!((report.avg_candidates() - 1.0).abs() < 1e-9);
}

#[test]
fn coverage_threshold_rejects_partial_reads() {
    let reference = make_reference(1_000, 11);
    let gene = Sequence::new("gene", reference.clone());

    // first half from the gene, second half unrelated
    let mut chimera = reference[300..340].to_vec();
    chimera.extend(std::iter::repeat(b'N').take(40));
    let reads = vec![Sequence::new("chimera", chimera)];

    let strict = map_reads(&gene, &reads, &ScoreTable::default(), &MapOpt { min_match_len: 20, ..MapOpt::default() })
        .unwrap();
    assert_eq!(strict.hits[0], ReadHit::NoHit { name: "chimera".into() });
    assert_eq!(strict.reads_with_candidates, 1);

    let lenient = MapOpt { min_match_len: 20, min_coverage: 0.5, ..MapOpt::default() };
    let report = map_reads(&gene, &reads, &ScoreTable::default(), &lenient).unwrap();
    assert_eq!(report.hits[0], ReadHit::Hit { name: "chimera".into(), start: 300, end: 380 });
}

#[test]
fn alphabet_guards_tree_input() {
    let alphabet = Alphabet::parse("A C G T");
    let gene = Sequence::new("gene", make_reference(200, 3)).with_sentinel();
    assert!(alphabet.validate(&gene).is_ok());
    assert!(alphabet.validate(&Sequence::new("bad", b"ACGU$".to_vec())).is_err());
}
