// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BenchError, Result};

/// Capacity the sample buffer starts with before any doubling.
pub const INITIAL_CAPACITY: usize = 100;

/// The immutable sequence of samples every worker reads from.
///
/// Cloning is cheap: all clones share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Arc<[i64]>,
}

impl SampleBuffer {
    /// Reads whitespace-separated integers from the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BenchError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let buffer = Self::from_reader(BufReader::new(file))?;
        log::info!("loaded {} samples from {}", buffer.len(), path.display());
        Ok(buffer)
    }

    /// Reads whitespace-separated integers until EOF or the first token that
    /// does not parse as an `i64`.
    ///
    /// A malformed token only ends the input. It is an error only when it
    /// is the very first token. Storage starts at [`INITIAL_CAPACITY`] and
    /// doubles whenever it fills up.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples: Vec<i64> = Vec::new();
        reserve_to(&mut samples, INITIAL_CAPACITY)?;

        let mut tokens = TokenReader::new(reader);
        while let Some(token) = tokens.next_token()? {
            let value = match parse_token(token) {
                Some(value) => value,
                None => {
                    let token = String::from_utf8_lossy(token).into_owned();
                    if samples.is_empty() {
                        return Err(BenchError::Parse { token });
                    }
                    log::warn!(
                        "stopped at malformed token {:?} after {} samples",
                        token,
                        samples.len()
                    );
                    break;
                }
            };

            if samples.len() == samples.capacity() {
                let doubled = samples.capacity().max(1).saturating_mul(2);
                reserve_to(&mut samples, doubled)?;
            }
            samples.push(value);
        }

        Ok(SampleBuffer::from(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.samples.get(index).copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.samples
    }

    /// Handle to the shared storage, for handing to worker threads.
    pub fn shared(&self) -> Arc<[i64]> {
        self.samples.clone()
    }
}

impl From<Vec<i64>> for SampleBuffer {
    fn from(samples: Vec<i64>) -> Self {
        SampleBuffer {
            samples: samples.into(),
        }
    }
}

impl Index<usize> for SampleBuffer {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        &self.samples[index]
    }
}

fn reserve_to(samples: &mut Vec<i64>, capacity: usize) -> Result<()> {
    let additional = capacity.saturating_sub(samples.len());
    samples
        .try_reserve_exact(additional)
        .map_err(|source| BenchError::Allocation {
            requested: capacity,
            source,
        })
}

fn parse_token(token: &[u8]) -> Option<i64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Pulls whitespace-delimited tokens out of a reader without loading the
/// whole input into memory.
struct TokenReader<R> {
    reader: R,
    token: Vec<u8>,
}

impl<R: BufRead> TokenReader<R> {
    fn new(reader: R) -> Self {
        TokenReader {
            reader,
            token: Vec::with_capacity(32),
        }
    }

    /// Returns the next token, or `None` at EOF.
    fn next_token(&mut self) -> Result<Option<&[u8]>> {
        self.token.clear();
        loop {
            let chunk = self.reader.fill_buf()?;
            if chunk.is_empty() {
                break;
            }

            let mut consumed = 0;
            let mut finished = false;
            for &byte in chunk {
                consumed += 1;
                if byte.is_ascii_whitespace() {
                    if !self.token.is_empty() {
                        finished = true;
                        break;
                    }
                } else {
                    self.token.push(byte);
                }
            }
            self.reader.consume(consumed);

            if finished {
                break;
            }
        }

        if self.token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(&self.token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(input: &str) -> Result<SampleBuffer> {
        SampleBuffer::from_reader(Cursor::new(input))
    }

    #[test]
    fn test_reads_whitespace_separated_values() {
        let buffer = read("5 -3\n10\t10   2\n").unwrap();
        assert_eq!(buffer.as_slice(), &[5, -3, 10, 10, 2]);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer[1], -3);
        assert_eq!(buffer.get(5), None);
    }

    #[test]
    fn test_malformed_token_stops_reading() {
        let buffer = read("1 2 x 3").unwrap();
        assert_eq!(buffer.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_malformed_first_token_is_error() {
        match read("abc 1 2") {
            Err(BenchError::Parse { token }) => assert_eq!(token, "abc"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_empty_buffer() {
        assert!(read("").unwrap().is_empty());
        assert!(read(" \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_extreme_and_signed_values() {
        let input = format!("{} {} +7", i64::MAX, i64::MIN);
        let buffer = read(&input).unwrap();
        assert_eq!(buffer.as_slice(), &[i64::MAX, i64::MIN, 7]);
    }

    #[test]
    fn test_out_of_range_token_stops_reading() {
        let buffer = read("4 9223372036854775808 5").unwrap();
        assert_eq!(buffer.as_slice(), &[4]);
    }

    #[test]
    fn test_growth_past_initial_capacity() {
        let input: String = (0..1000).map(|i| format!("{i} ")).collect();
        let buffer = read(&input).unwrap();
        assert_eq!(buffer.len(), 1000);
        assert_eq!(buffer[999], 999);
    }

    #[test]
    fn test_tokens_split_across_reads() {
        // A 1-byte buffer forces every token to span several fill_buf calls.
        let reader = BufReader::with_capacity(1, Cursor::new("123 -45 6"));
        let buffer = SampleBuffer::from_reader(reader).unwrap();
        assert_eq!(buffer.as_slice(), &[123, -45, 6]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SampleBuffer::load("/nonexistent/parreduce/input.txt")
            .unwrap_err();
        assert!(matches!(err, BenchError::Open { .. }));
    }
}
