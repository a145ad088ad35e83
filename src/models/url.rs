//! Resource-URL tokenization and pattern classification.
//!
//! A resource URL is broken into its machine (host), path segments and a
//! leaf filename; the leaf is split further on non-alphanumeric runs and at
//! letter/digit boundaries. Each component is then mapped to a [`Lexeme`]:
//! a digit-wildcard pattern or the literal string. The ordered lexeme
//! sequence is the URL's structural signature.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Filename extensions that are kept as literal tokens and never split or
/// wild-carded, so `nc4` or `h5` never masquerade as date fields.
const FILE_EXTENSIONS: &[&str] = &["bz2", "gz", "Z", "nc", "hdf", "HDF", "h5"];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}

/// A resource URL decomposed into host, path segments and leaf sub-tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUrl {
    url: String,
    host: String,
    segments: Vec<String>,
    leaf: String,
    components: Vec<String>,
}

impl ParsedUrl {
    /// Parse a resource URL.
    ///
    /// The scheme and `://` are stripped; the host runs to the next `/`;
    /// the remaining path splits on `/` into segments with the final
    /// element treated as the leaf filename. The leaf is split on runs of
    /// non-alphanumeric characters and additionally at letter-run/digit-run
    /// boundaries, so `sat3a_2011` yields `["sat", "3a", "2011"]`.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| AppError::MalformedUrl(url.to_string()))?;

        let (host, path) = rest
            .split_once('/')
            .ok_or_else(|| AppError::MalformedUrl(url.to_string()))?;

        if host.is_empty() {
            return Err(AppError::MalformedUrl(url.to_string()));
        }

        let (dirs, leaf) = match path.rsplit_once('/') {
            Some((dirs, leaf)) => (dirs, leaf),
            None => ("", path),
        };

        let segments: Vec<String> = dirs
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut components = segments.clone();
        for token in leaf.split(|c: char| !c.is_ascii_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            split_sub_token(token, &mut components);
        }

        Ok(Self {
            url: url.to_string(),
            host: host.to_string(),
            segments,
            leaf: leaf.to_string(),
            components,
        })
    }

    /// The original URL text.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The authority (host) part.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path segments followed by the leaf sub-tokens, in order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The final path element before sub-token splitting.
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// Re-join host, segments and leaf with the original separators.
    /// Reconstructs the path-bearing string the URL was parsed from.
    pub fn path_string(&self) -> String {
        if self.segments.is_empty() {
            format!("{}/{}", self.host, self.leaf)
        } else {
            format!("{}/{}/{}", self.host, self.segments.join("/"), self.leaf)
        }
    }
}

/// Split one leaf sub-token at its first letter-run/digit-run boundary.
///
/// Known file extensions are pushed whole, as are `02jan2011`-shaped
/// tokens: splitting those would destroy the day/month-name/year shape
/// the date classifier recognizes. A token that starts with a letter run
/// followed by a digit splits after the letters; one that starts with a
/// digit run followed by a letter splits after the digits.
fn split_sub_token(token: &str, out: &mut Vec<String>) {
    let digits_alpha3_digits = regex(&DIGITS_ALPHA3_DIGITS, r"^[0-9]{2,}[A-Za-z]{3}[0-9]{2,}$");
    if FILE_EXTENSIONS.contains(&token) || digits_alpha3_digits.is_match(token) {
        out.push(token.to_string());
        return;
    }

    let bytes = token.as_bytes();
    let first_is_digit = bytes[0].is_ascii_digit();
    let run_end = bytes
        .iter()
        .position(|b| b.is_ascii_digit() != first_is_digit)
        .unwrap_or(bytes.len());

    if run_end == bytes.len() {
        out.push(token.to_string());
    } else {
        out.push(token[..run_end].to_string());
        out.push(token[run_end..].to_string());
    }
}

/// One classified URL component: either a literal string or a
/// digit-wildcard pattern (`d` per digit, `c` per letter in mixed shapes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lexeme {
    value: String,
    is_pattern: bool,
}

impl Lexeme {
    /// Build a lexeme from an already-derived value.
    pub fn new(value: impl Into<String>, is_pattern: bool) -> Self {
        Self {
            value: value.into(),
            is_pattern,
        }
    }

    fn literal(value: &str) -> Self {
        Self {
            value: value.to_string(),
            is_pattern: false,
        }
    }

    fn pattern(value: String) -> Self {
        Self {
            value,
            is_pattern: true,
        }
    }

    /// The pattern string (e.g. `dddd`) or the literal component value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when digits were wild-carded into `d` runs.
    pub fn is_pattern(&self) -> bool {
        self.is_pattern
    }
}

static ALL_DIGITS: OnceLock<Regex> = OnceLock::new();
static DIGITS_ALPHA3_DIGITS: OnceLock<Regex> = OnceLock::new();
static DIGITS2_ALPHA_DIGITS: OnceLock<Regex> = OnceLock::new();
static SINGLE_LETTER: OnceLock<Regex> = OnceLock::new();
static ALPHA_DIGITS: OnceLock<Regex> = OnceLock::new();

/// Map every component of a parsed URL to its lexeme, in order.
///
/// First matching rule wins, per component:
/// 1. all digits -> one `d` per digit;
/// 2. a known file extension -> literal;
/// 3. two digit runs bracketing exactly three letters -> `d`/`c` mask
///    (the `02jan2011` shape);
/// 4. two or more leading digits, then letters, then optional trailing
///    digits -> leading run wild-carded, the rest kept literal;
/// 5. a single letter -> `c`;
/// 6. letters (with optional digit prefix) then trailing digits ->
///    letters kept, trailing run wild-carded;
/// 7. anything else -> literal.
///
/// A bare `d` directly after a `dddd` is widened to `dd`: a group that
/// writes months with and without a leading zero would otherwise split
/// into two signatures.
pub fn lexemes(parsed: &ParsedUrl) -> Vec<Lexeme> {
    let all_digits = regex(&ALL_DIGITS, r"^[0-9]+$");
    let digits_alpha3_digits = regex(&DIGITS_ALPHA3_DIGITS, r"^[0-9]{2,}[A-Za-z]{3}[0-9]{2,}$");
    let digits2_alpha_digits = regex(&DIGITS2_ALPHA_DIGITS, r"^[0-9][0-9]+[A-Za-z]+[0-9]*$");
    let single_letter = regex(&SINGLE_LETTER, r"^[A-Za-z]$");
    let alpha_digits = regex(&ALPHA_DIGITS, r"^[0-9]*[A-Za-z]+[0-9]+$");

    let mut result: Vec<Lexeme> = Vec::with_capacity(parsed.components().len());

    for comp in parsed.components() {
        let lexeme = if all_digits.is_match(comp) {
            let mut value = "d".repeat(comp.len());
            if value == "d" && result.last().is_some_and(|p| p.value() == "dddd") {
                value.push('d');
            }
            Lexeme::pattern(value)
        } else if FILE_EXTENSIONS.contains(&comp.as_str()) {
            Lexeme::literal(comp)
        } else if digits_alpha3_digits.is_match(comp) {
            let value = comp
                .chars()
                .map(|c| if c.is_ascii_digit() { 'd' } else { 'c' })
                .collect();
            Lexeme::pattern(value)
        } else if digits2_alpha_digits.is_match(comp) {
            let run_end = comp.find(|c: char| !c.is_ascii_digit()).unwrap_or(0);
            let mut value = "d".repeat(run_end);
            value.push_str(&comp[run_end..]);
            Lexeme::pattern(value)
        } else if single_letter.is_match(comp) {
            Lexeme::pattern("c".to_string())
        } else if alpha_digits.is_match(comp) {
            let letters_end = comp
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(comp.len());
            let mut value = comp[..letters_end].to_string();
            value.push_str(&"d".repeat(comp.len() - letters_end));
            Lexeme::pattern(value)
        } else {
            Lexeme::literal(comp)
        };

        result.push(lexeme);
    }

    result
}

/// Build the structural signature for a parsed URL: the ordered lexeme
/// values, optionally led by the host.
pub fn signature(parsed: &ParsedUrl, include_host: bool) -> Vec<Lexeme> {
    let mut sig = lexemes(parsed);
    if include_host {
        sig.insert(0, Lexeme::literal(parsed.host()));
    }
    sig
}

/// Render a signature as a single string for reports and logs.
pub fn signature_string(sig: &[Lexeme]) -> String {
    sig.iter()
        .map(Lexeme::value)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> ParsedUrl {
        ParsedUrl::parse(url).unwrap()
    }

    fn values(url: &str) -> Vec<String> {
        lexemes(&parse(url))
            .iter()
            .map(|l| l.value().to_string())
            .collect()
    }

    #[test]
    fn test_parse_basic() {
        let p = parse("http://x.org/data/sat_20180101.nc.ddx");
        assert_eq!(p.host(), "x.org");
        assert_eq!(p.leaf(), "sat_20180101.nc.ddx");
        assert_eq!(
            p.components(),
            ["data", "sat", "20180101", "nc", "ddx"]
        );
    }

    #[test]
    fn test_parse_letter_digit_boundary() {
        let p = parse("http://x.org/d/sat3a_2011.nc");
        assert_eq!(p.components(), ["d", "sat", "3a", "2011", "nc"]);
    }

    #[test]
    fn test_parse_no_directories() {
        let p = parse("http://x.org/file.nc");
        assert_eq!(p.components(), ["file", "nc"]);
        assert_eq!(p.path_string(), "x.org/file.nc");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ParsedUrl::parse("not-a-url").is_err());
        assert!(ParsedUrl::parse("http://hostonly").is_err());
    }

    #[test]
    fn test_path_round_trip() {
        let url = "https://example.org/a/b/c/granule_2019.h5";
        let p = parse(url);
        assert!(url.ends_with(&p.path_string()));
    }

    #[test]
    fn test_lexeme_all_digits() {
        // The single-letter segment patternizes to 'c'
        assert_eq!(values("http://x.org/a/20180101.nc"), [
            "c", "dddddddd", "nc"
        ]);
    }

    #[test]
    fn test_lexeme_extension_literal() {
        // 'h5' would otherwise split and wildcard its digit
        assert_eq!(values("http://x.org/a/file.h5"), ["c", "file", "h5"]);
    }

    #[test]
    fn test_lexeme_month_widening() {
        // 'dddd' followed by a bare 'd' widens to 'dd'
        assert_eq!(values("http://x.org/2011/1/f.nc"), [
            "dddd", "dd", "c", "nc"
        ]);
    }

    #[test]
    fn test_lexeme_day_month_string_year() {
        assert_eq!(values("http://x.org/a/02jan2011.nc"), [
            "c", "ddcccdddd", "nc"
        ]);
    }

    #[test]
    fn test_lexeme_single_letter_is_pattern() {
        let sig = lexemes(&parse("http://x.org/a/f.nc"));
        assert_eq!(sig[0].value(), "c");
        assert!(sig[0].is_pattern());
        assert_eq!(sig[1].value(), "c");
        assert!(sig[1].is_pattern());
    }

    #[test]
    fn test_lexeme_letters_then_digits_segment() {
        // Path segments are not sub-split, so the mixed shape survives
        // to the lexeme stage intact.
        assert_eq!(values("http://x.org/goes12/f.nc"), ["goesdd", "c", "nc"]);
    }

    #[test]
    fn test_leaf_mixed_token_splits_first() {
        // In the leaf the same shape splits at the letter/digit boundary.
        assert_eq!(values("http://x.org/a/goes12.nc"), ["c", "goes", "dd", "nc"]);
    }

    #[test]
    fn test_lexeme_idempotent_and_digit_invariant() {
        let a = lexemes(&parse("http://x.org/d/sat_20180101.nc"));
        let b = lexemes(&parse("http://x.org/d/sat_20180101.nc"));
        let c = lexemes(&parse("http://x.org/d/sat_20181231.nc"));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_signature_host_variant() {
        let p = parse("http://x.org/d/f.nc");
        let without = signature(&p, false);
        let with = signature(&p, true);
        assert_eq!(with.len(), without.len() + 1);
        assert_eq!(with[0].value(), "x.org");
        assert!(!with[0].is_pattern());
    }

    #[test]
    fn test_signature_string() {
        let sig = signature(&parse("http://x.org/d/sat_20180101.nc"), false);
        assert_eq!(signature_string(&sig), "c/sat/dddddddd/nc");
    }
}
