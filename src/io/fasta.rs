use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::util::Sequence;

/// `>name` 头行加若干序列行的读取器；序列行去除空白后拼接，字符大小写保持原样。
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<Sequence>> {
        if self.done {
            return Ok(None);
        }

        // header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    break rest.trim().to_string();
                }
            }
        };

        // name is the first word of the header
        let name = header.split_whitespace().next().unwrap_or("").to_string();

        let mut seq = Sequence::new(name, Vec::new());
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            let line: Vec<u8> = self.buf.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
            seq.append_chunk(&line);
        }

        Ok(Some(seq))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 读取文件中的全部序列
pub fn read_sequences(path: &Path) -> Result<Vec<Sequence>> {
    let fh = File::open(path).with_context(|| format!("cannot open sequence file '{}'", path.display()))?;
    FastaReader::new(BufReader::new(fh))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("cannot parse sequence file '{}'", path.display()))
}

/// 读取文件中的第一条序列
pub fn read_first(path: &Path) -> Result<Sequence> {
    let fh = File::open(path).with_context(|| format!("cannot open sequence file '{}'", path.display()))?;
    FastaReader::new(BufReader::new(fh))
        .next_record()?
        .with_context(|| format!("no sequence found in '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">gene first\nACgTNN\n>read2\nAAA\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name(), "gene");
        assert_eq!(r1.as_bytes(), b"ACgTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.name(), "read2");
        assert_eq!(r2.as_bytes(), b"AAA");

        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn parse_multiline_with_crlf_and_whitespace() {
        let data = b">s1 desc\r\nAC G T\r\n acgt\r\n>s2 \r\n N N N \r\n";
        let seqs: Vec<Sequence> = FastaReader::new(Cursor::new(&data[..])).collect::<Result<_>>().unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].name(), "s1");
        assert_eq!(seqs[0].as_bytes(), b"ACGTacgt");
        assert_eq!(seqs[1].name(), "s2");
        assert_eq!(seqs[1].as_bytes(), b"NNN");
    }

    #[test]
    fn parse_with_leading_empty_lines() {
        let data = b"\n\n>banana\nbanana$\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));
        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.name(), "banana");
        assert!(r1.ends_with_sentinel());
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn empty_record_is_kept() {
        let data = b">empty\n>full\nAC\n";
        let seqs: Vec<Sequence> = FastaReader::new(Cursor::new(&data[..])).collect::<Result<_>>().unwrap();
        assert!(seqs[0].is_empty());
        assert_eq!(seqs[1].as_bytes(), b"AC");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_sequences(Path::new("/nonexistent/reads.fa")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/reads.fa"));
    }
}
