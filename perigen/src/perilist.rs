//! Peripheral list reader.
//!
//! A peripheral list starts with a fixed-size header (copyright text, in any encoding), followed by
//! whitespace-separated peripheral names. A name starting with `#` is a comment marker and is dropped;
//! the words following it on the same line are not.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use thiserror::Error;

/// Number of header lines skipped at the top of a peripheral list.
pub const HEADER_LINES: usize = 8;

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Error)]
pub enum PeriListError {
    #[error("read error: {error}")]
    Io { error: io::Error },

    #[error("expected {expected} header lines, found {found}")]
    MissingHeader { expected: usize, found: usize },
}

/// Single-pass iterator over the peripheral names of a list.
#[derive(Debug)]
pub struct PeriList<R> {
    reader: R,
    pending: VecDeque<String>,
    line: usize,
    done: bool,
}

impl<R: BufRead> PeriList<R> {
    /// Skips the header of the list and returns an iterator over the remaining names.
    pub fn new(mut reader: R) -> Result<Self, PeriListError> {
        let mut buf = vec![];
        for found in 0..HEADER_LINES {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(|error| PeriListError::Io { error })? == 0 {
                return Err(PeriListError::MissingHeader { expected: HEADER_LINES, found });
            }
        }
        log::debug!("skipped {} header lines", HEADER_LINES);

        Ok(Self { reader, pending: VecDeque::new(), line: HEADER_LINES, done: false })
    }

    /// Returns the number of lines consumed so far, header included.
    pub fn line(&self) -> usize { self.line }

    fn fill(&mut self) -> Result<bool, io::Error> {
        let mut buf = vec![];
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(false);
        }
        self.line += 1;
        // Names are ASCII; other bytes survive lossily so the lookup can report them.
        self.pending.extend(
            buf.split(u8::is_ascii_whitespace)
                .filter(|token| !token.is_empty())
                .map(|token| String::from_utf8_lossy(token).into_owned()),
        );
        Ok(true)
    }
}

impl<R: BufRead> Iterator for PeriList<R> {
    type Item = Result<String, PeriListError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                if token.starts_with('#') {
                    log::trace!("line {}: dropped comment marker {}", self.line, token);
                    continue;
                }
                return Some(Ok(token));
            }

            if self.done {
                return None;
            }

            match self.fill() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(PeriListError::Io { error }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor, Read};

    use super::*;

    fn header() -> String { (0..HEADER_LINES).map(|i| format!("// header {}\n", i)).collect() }

    fn names(text: &str) -> Vec<String> {
        PeriList::new(Cursor::new(text.to_string())).unwrap().collect::<Result<Vec<_>, _>>().unwrap()
    }

    #[test]
    fn skips_header_and_splits_on_whitespace() {
        let text = format!("{}basys3\n  out4\tin4  \n\n gpio4", header());
        assert_eq!(names(&text), ["basys3", "out4", "in4", "gpio4"]);
    }

    #[test]
    fn header_words_are_never_names() {
        let text = "out4\n".repeat(HEADER_LINES);
        assert!(names(&text).is_empty());
    }

    #[test]
    fn drops_only_the_comment_token() {
        let text = format!("{}# out4\n#in4 gpio4\ncount4 #x\n", header());
        assert_eq!(names(&text), ["out4", "gpio4", "count4"]);
    }

    #[test]
    fn short_header_is_an_error() {
        let text = "one\ntwo\nthree\n";
        match PeriList::new(Cursor::new(text)) {
            Err(PeriListError::MissingHeader { expected, found }) => {
                assert_eq!(expected, HEADER_LINES);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected result: {:?}", other.map(|list| list.line())),
        }
    }

    #[test]
    fn header_bytes_are_not_decoded() {
        let mut bytes = b"// Copyright \xa9 2022\n".to_vec();
        bytes.extend(b"//\n".repeat(HEADER_LINES - 1));
        bytes.extend(b"out4 caf\xe9\n");
        let names = PeriList::new(Cursor::new(bytes)).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(names, ["out4", "caf\u{fffd}"]);
    }

    #[test]
    fn header_only_list_is_empty() {
        let mut list = PeriList::new(Cursor::new(header())).unwrap();
        assert!(list.next().is_none());
        assert!(list.next().is_none());
        assert_eq!(list.line(), HEADER_LINES);
    }

    /// Yields `data` and then fails.
    struct Faulty {
        data: Cursor<Vec<u8>>,
    }

    impl Read for Faulty {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn read_fault_is_reported_once() {
        let data = format!("{}out4\n", header()).into_bytes();
        let mut list = PeriList::new(BufReader::new(Faulty { data: Cursor::new(data) })).unwrap();
        assert_eq!(list.next().unwrap().unwrap(), "out4");
        assert!(matches!(list.next(), Some(Err(PeriListError::Io { .. }))));
        assert!(list.next().is_none());
    }
}
