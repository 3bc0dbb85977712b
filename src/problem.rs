use std::io::{self, BufRead};

use crate::error::{Error, FormatError, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feature {
    pub index: i32,
    pub value: f64,
}

impl Feature {
    pub const fn new(index: i32, value: f64) -> Self {
        Self { index, value }
    }
}

/// Features of one sample, in the order they were written.
pub type FeatureVector = Vec<Feature>;

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub target: f64,
    pub features: FeatureVector,
}

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == ':'
}

/// Parses one line of the sparse format: `<target> <index>:<value> ...`.
///
/// Whitespace and `:` are both separators, so the line is read as a flat
/// token list. Everything after the target is consumed in (index, value)
/// pairs; an unpaired last token is ignored.
pub fn parse_line(line: &str) -> Result<Sample, FormatError> {
    let tokens: Vec<&str> = line.split(is_separator).filter(|t| !t.is_empty()).collect();
    let (target, rest) = tokens.split_first().ok_or(FormatError::MissingTarget)?;
    let target = target
        .parse::<f64>()
        .map_err(|_| FormatError::InvalidTarget(target.to_string()))?;

    let features = rest
        .chunks_exact(2)
        .map(|pair| -> Result<Feature, FormatError> {
            let index = pair[0]
                .parse::<i32>()
                .map_err(|_| FormatError::InvalidIndex(pair[0].to_string()))?;
            let value = pair[1]
                .parse::<f64>()
                .map_err(|_| FormatError::InvalidValue(pair[1].to_string()))?;
            Ok(Feature::new(index, value))
        })
        .collect::<Result<FeatureVector, FormatError>>()?;

    Ok(Sample { target, features })
}

/// Reads samples from a line-oriented stream, one line at a time.
pub struct SampleReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
        }
    }

    /// 1-based number of the last line read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_no += 1;
        let line_no = self.line_no;
        let line = match line {
            Ok(line) => line,
            Err(source) => {
                return Some(Err(Error::Read {
                    line: line_no,
                    source,
                }))
            }
        };
        Some(parse_line(&line).map_err(|source| Error::Format {
            line: line_no,
            source,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_parse_line() {
        let sample = parse_line("+1 1:0.5 3:-2 10:1e-3").unwrap();
        assert_eq!(sample.target, 1.0);
        assert_eq!(
            sample.features,
            vec![
                Feature::new(1, 0.5),
                Feature::new(3, -2.0),
                Feature::new(10, 1e-3),
            ]
        );
    }

    #[test]
    fn test_parse_line_separators() {
        let sample = parse_line("  -1\t2 : 0.25\r\n").unwrap();
        assert_eq!(sample.target, -1.0);
        assert_eq!(sample.features, vec![Feature::new(2, 0.25)]);
    }

    #[test]
    fn test_parse_line_target_only() {
        let sample = parse_line("3.5").unwrap();
        assert_eq!(sample.target, 3.5);
        assert!(sample.features.is_empty());
    }

    #[test]
    fn test_parse_line_keeps_order_and_duplicates() {
        let sample = parse_line("0 5:1 2:2 5:3").unwrap();
        let indices: Vec<_> = sample.features.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![5, 2, 5]);
    }

    #[test]
    fn test_parse_line_drops_unpaired_token() {
        let sample = parse_line("1 1:2 7").unwrap();
        assert_eq!(sample.features, vec![Feature::new(1, 2.0)]);
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(parse_line(""), Err(FormatError::MissingTarget));
        assert_eq!(parse_line(" \t"), Err(FormatError::MissingTarget));
        assert_eq!(
            parse_line("abc 1:2.0"),
            Err(FormatError::InvalidTarget("abc".into()))
        );
        assert_eq!(
            parse_line("1 x:2.0"),
            Err(FormatError::InvalidIndex("x".into()))
        );
        assert_eq!(
            parse_line("1 1.5:2.0"),
            Err(FormatError::InvalidIndex("1.5".into()))
        );
        assert_eq!(
            parse_line("1 1:two"),
            Err(FormatError::InvalidValue("two".into()))
        );
    }

    #[test]
    fn test_pair_count_matches_token_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n_tokens = rng.gen_range(1..40);
            let mut line = format!("{}", rng.gen_range(-3..3));
            for i in 1..n_tokens {
                let sep = if i % 2 == 1 { ' ' } else { ':' };
                line.push(sep);
                if i % 2 == 1 {
                    line.push_str(&(i / 2 + 1).to_string());
                } else {
                    line.push_str(&format!("{}", rng.gen_range(-1.0..1.0)));
                }
            }

            let sample = parse_line(&line).unwrap();
            assert_eq!(sample.features.len(), (n_tokens - 1) / 2, "{}", line);
            for (i, feat) in sample.features.iter().enumerate() {
                assert_eq!(feat.index, i as i32 + 1);
            }
        }
    }

    #[test]
    fn test_sample_reader_reports_line() {
        let input = "1 1:1\n-1 2:1\noops 1:1\n1 1:1\n";
        let mut reader = SampleReader::new(input.as_bytes());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(Error::Format { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(source, FormatError::InvalidTarget("oops".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(reader.line_no(), 3);
    }

    #[test]
    fn test_sample_reader_invalid_utf8() {
        let input: &[u8] = b"1 1:1\n\xff 1:1\n";
        let mut reader = SampleReader::new(input);
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(Error::Read { line, source }) => {
                assert_eq!(line, 2);
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sample_reader_empty_input() {
        let mut reader = SampleReader::new(&b""[..]);
        assert!(reader.next().is_none());
    }
}
