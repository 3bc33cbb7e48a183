//! Praat TextGrid reader (long and short text formats).
//!
//! Both formats carry the same sequence of values; the long one merely adds
//! `key =` labels and `[n]:` indices around them. The tokenizer keeps numbers,
//! quoted strings and `<exists>`/`<absent>` flags, and skips everything else.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vt_core::grid::{AnnotationGrid, Interval, Tier};
use vt_core::traits::GridReader;

use crate::error::GridError;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// Token plus the 1-based line it started on.
type Located = (Token, usize);

fn tokenize(src: &str) -> Result<Vec<Located>, GridError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                let start = line;
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            text.push('"');
                        }
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            text.push(ch);
                        }
                        None => {
                            return Err(GridError::Parse {
                                line: start,
                                message: "unterminated string".into(),
                            });
                        }
                    }
                }
                tokens.push((Token::Text(text), start));
            }
            '[' => {
                // `item [3]:`, `intervals [12]:` -- indices are positional, ignore them
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                }
            }
            '!' => {
                // comment until end of line
                while chars.peek().is_some_and(|&ch| ch != '\n') {
                    chars.next();
                }
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || ch == '"' || ch == '[' {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                match word.as_str() {
                    "<exists>" => tokens.push((Token::Flag(true), line)),
                    "<absent>" => tokens.push((Token::Flag(false), line)),
                    w if w.starts_with(|ch: char| ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.') => {
                        if let Ok(v) = w.parse::<f64>() {
                            tokens.push((Token::Number(v), line));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(tokens)
}

struct Cursor {
    tokens: Vec<Located>,
    pos: usize,
}

impl Cursor {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn error(&self, message: String) -> GridError {
        GridError::Parse {
            line: self.line(),
            message,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn number(&mut self, what: &str) -> Result<f64, GridError> {
        match self.peek() {
            Some(Token::Number(v)) => {
                let v = *v;
                self.pos += 1;
                Ok(v)
            }
            Some(other) => Err(self.error(format!("expected {what}, found {other:?}"))),
            None => Err(self.error(format!("expected {what}, found end of file"))),
        }
    }

    /// Item count read from the file. Each item takes at least `per_item`
    /// tokens, so a count the rest of the file cannot hold is rejected.
    fn count(&mut self, what: &str, per_item: usize) -> Result<usize, GridError> {
        let v = self.number(what)?;
        if v < 0.0 || v.fract() != 0.0 {
            return Err(self.error(format!("invalid {what}: {v}")));
        }
        let remaining = self.tokens.len() - self.pos;
        if v > (remaining / per_item) as f64 {
            return Err(self.error(format!(
                "{what} {v} exceeds the remaining {remaining} tokens"
            )));
        }
        Ok(v as usize)
    }

    fn text(&mut self, what: &str) -> Result<String, GridError> {
        match self.tokens.get_mut(self.pos) {
            Some((Token::Text(s), _)) => {
                let s = std::mem::take(s);
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }
}

/// Parse TextGrid source text.
///
/// Point tiers (`TextTier`) are kept as tiers with no intervals so that tier
/// positions match the file.
///
/// # Errors
/// [`GridError::Unsupported`] for another file type or object class,
/// [`GridError::Parse`] for malformed content.
///
/// # Example
/// ```
/// use vt_grid::parse_textgrid;
/// use vt_core::traits::AlignmentGrid;
///
/// let src = "File type = \"ooTextFile\"\nObject class = \"TextGrid\"\n\
///            0\n1\n<exists>\n1\n\"IntervalTier\"\n\"words\"\n0\n1\n1\n0\n1\n\"hello\"\n";
/// let grid = parse_textgrid(src).unwrap();
/// assert_eq!(grid.tier_name(0), Some("words"));
/// assert_eq!(grid.interval(0, 0).unwrap().label, "hello");
/// ```
pub fn parse_textgrid(src: &str) -> Result<AnnotationGrid, GridError> {
    let mut cur = Cursor {
        tokens: tokenize(src)?,
        pos: 0,
    };

    let file_type = cur.text("file type")?;
    if !file_type.starts_with("ooTextFile") {
        return Err(GridError::Unsupported(format!("file type {file_type:?}")));
    }
    let class = cur.text("object class")?;
    if class != "TextGrid" {
        return Err(GridError::Unsupported(format!("object class {class:?}")));
    }

    let mut grid = AnnotationGrid::new(cur.number("xmin")?, cur.number("xmax")?);
    match cur.peek() {
        Some(Token::Flag(false)) | None => return Ok(grid),
        Some(Token::Flag(true)) => cur.pos += 1,
        _ => {}
    }

    // class, name, xmin, xmax, size
    let tier_count = cur.count("tier count", 5)?;
    for index in 0..tier_count {
        let kind = cur.text("tier class")?;
        grid = grid.with_tier(Tier::new(cur.text("tier name")?));
        cur.number("tier xmin")?;
        cur.number("tier xmax")?;
        match kind.as_str() {
            "IntervalTier" => {
                let n = cur.count("interval count", 3)?;
                for _ in 0..n {
                    let start = cur.number("interval xmin")?;
                    let end = cur.number("interval xmax")?;
                    let label = cur.text("interval text")?;
                    grid.push_interval(index, Interval::new(label, start, end))
                        .map_err(|e| cur.error(e.to_string()))?;
                }
            }
            "TextTier" => {
                let n = cur.count("point count", 2)?;
                for _ in 0..n {
                    cur.number("point time")?;
                    cur.text("point mark")?;
                }
            }
            other => return Err(cur.error(format!("unknown tier class {other:?}"))),
        }
    }

    Ok(grid)
}

/// Decode raw TextGrid bytes: UTF-16 (with BOM) or UTF-8 (BOM optional).
///
/// # Errors
/// [`GridError::Encoding`] when the bytes are not valid in the detected encoding.
pub fn decode_text(bytes: &[u8]) -> Result<String, GridError> {
    let utf16 = |body: &[u8], from: fn([u8; 2]) -> u16| {
        if !body.len().is_multiple_of(2) {
            return Err(GridError::Encoding("odd length UTF-16 data".into()));
        }
        let units: Vec<u16> = body.chunks_exact(2).map(|p| from([p[0], p[1]])).collect();
        String::from_utf16(&units).map_err(|e| GridError::Encoding(e.to_string()))
    };

    match bytes {
        [0xFE, 0xFF, body @ ..] => utf16(body, u16::from_be_bytes),
        [0xFF, 0xFE, body @ ..] => utf16(body, u16::from_le_bytes),
        [0xEF, 0xBB, 0xBF, body @ ..] => {
            String::from_utf8(body.to_vec()).map_err(|e| GridError::Encoding(e.to_string()))
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|e| GridError::Encoding(e.to_string())),
    }
}

/// Read and parse the TextGrid file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, decoded or parsed.
pub fn read_textgrid(path: impl AsRef<Path>) -> Result<AnnotationGrid> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Cannot read TextGrid: {}", path.display()))?;
    let text = decode_text(&bytes)
        .with_context(|| format!("Cannot decode TextGrid: {}", path.display()))?;
    let grid = parse_textgrid(&text)
        .with_context(|| format!("Invalid TextGrid: {}", path.display()))?;
    log::debug!("Loaded {} tiers from {}", grid.tiers.len(), path.display());
    Ok(grid)
}

/// [`GridReader`] for Praat TextGrid files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextGridReader;

impl GridReader for TextGridReader {
    type Grid = AnnotationGrid;

    fn load(&self, path: &Path) -> Result<AnnotationGrid> {
        read_textgrid(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_core::traits::AlignmentGrid;

    const LONG: &str = r#"File type = "ooTextFile"
Object class = "TextGrid"

xmin = 0
xmax = 1.5
tiers? <exists>
size = 3
item []:
    item [1]:
        class = "IntervalTier"
        name = "words"
        xmin = 0
        xmax = 1.5
        intervals: size = 3
        intervals [1]:
            xmin = 0
            xmax = 0.15
            text = ""
        intervals [2]:
            xmin = 0.15
            xmax = 0.25
            text = "no"
        intervals [3]:
            xmin = 0.25
            xmax = 1.5
            text = ""
    item [2]:
        class = "TextTier"
        name = "events"
        xmin = 0
        xmax = 1.5
        points: size = 1
        points [1]:
            number = 0.7
            mark = "click"
    item [3]:
        class = "IntervalTier"
        name = "phones"
        xmin = 0
        xmax = 1.5
        intervals: size = 2
        intervals [1]:
            xmin = 0
            xmax = 0.19
            text = "n"
        intervals [2]:
            xmin = 0.19
            xmax = 1.5
            text = "o+"
"#;

    const SHORT: &str = "File type = \"ooTextFile\"
Object class = \"TextGrid\"

0
2.5
<exists>
1
\"IntervalTier\"
\"MAU\"
0
2.5
2
0
1.2
\"a\"
1.2
2.5
\"say \"\"hi\"\"\"
";

    #[test]
    fn parses_long_format() {
        let grid = parse_textgrid(LONG).unwrap();
        assert_eq!(grid.tier_count(), 3);
        assert!((grid.xmax - 1.5).abs() < 1e-12);
        assert_eq!(grid.tier_name(0), Some("words"));
        assert_eq!(grid.interval_count(0), 3);
        assert_eq!(grid.interval(0, 1), Some(&Interval::new("no", 0.15, 0.25)));
        assert_eq!(grid.interval(2, 1).unwrap().label, "o+");
    }

    #[test]
    fn text_tiers_keep_their_position() {
        let grid = parse_textgrid(LONG).unwrap();
        assert_eq!(grid.tier_name(1), Some("events"));
        assert_eq!(grid.interval_count(1), 0);
        assert_eq!(grid.tier_name(2), Some("phones"));
    }

    #[test]
    fn parses_short_format_with_escaped_quotes() {
        let grid = parse_textgrid(SHORT).unwrap();
        assert_eq!(grid.tier_count(), 1);
        assert_eq!(grid.tier_name(0), Some("MAU"));
        assert_eq!(grid.interval(0, 1).unwrap().label, "say \"hi\"");
        assert_eq!(grid.interval_at_time(0, 1.2), Some(1));
    }

    #[test]
    fn absent_tiers_give_empty_grid() {
        let src = "File type = \"ooTextFile\"\nObject class = \"TextGrid\"\n0\n1\n<absent>\n";
        let grid = parse_textgrid(src).unwrap();
        assert_eq!(grid.tier_count(), 0);
    }

    #[test]
    fn truncated_file_reports_line() {
        let src = &LONG[..LONG.find("intervals [3]").unwrap()];
        match parse_textgrid(src) {
            Err(GridError::Parse { line, .. }) => assert!(line > 20, "line {line}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn oversized_counts_are_parse_errors() {
        let header = "File type = \"ooTextFile\"\nObject class = \"TextGrid\"\n0\n1\n<exists>\n";
        let tiers = format!("{header}1e30\n");
        assert!(matches!(parse_textgrid(&tiers), Err(GridError::Parse { .. })));

        let intervals = format!("{header}1\n\"IntervalTier\"\n\"phones\"\n0\n1\n1e30\n0\n1\n\"a\"\n");
        assert!(matches!(parse_textgrid(&intervals), Err(GridError::Parse { .. })));

        let just_over = format!("{header}1\n\"IntervalTier\"\n\"phones\"\n0\n1\n2\n0\n1\n\"a\"\n");
        assert!(matches!(parse_textgrid(&just_over), Err(GridError::Parse { .. })));
    }

    #[test]
    fn rejects_other_object_classes() {
        let src = "File type = \"ooTextFile\"\nObject class = \"Pitch 1\"\n0\n1\n";
        assert!(matches!(parse_textgrid(src), Err(GridError::Unsupported(_))));
        assert!(matches!(parse_textgrid("ooBinaryFile"), Err(GridError::Parse { .. })));
    }

    #[test]
    fn unknown_tier_class_is_a_parse_error() {
        let src = SHORT.replace("IntervalTier", "FancyTier");
        assert!(matches!(parse_textgrid(&src), Err(GridError::Parse { .. })));
    }

    #[test]
    fn decodes_utf16_and_bom() {
        let mut le = vec![0xFF, 0xFE];
        le.extend(SHORT.encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(decode_text(&le).unwrap(), SHORT);

        let mut be = vec![0xFE, 0xFF];
        be.extend("é\"".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode_text(&be).unwrap(), "é\"");

        let mut bom = vec![0xEF, 0xBB, 0xBF];
        bom.extend_from_slice("ŋ".as_bytes());
        assert_eq!(decode_text(&bom).unwrap(), "ŋ");

        assert!(decode_text(&[0xFF, 0xFE, 0x41]).is_err());
        assert!(decode_text(&[0xC3, 0x28]).is_err());
    }

    #[test]
    fn reader_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S001_reading.TextGrid");
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(LONG.encode_utf16().flat_map(u16::to_le_bytes));
        std::fs::write(&path, bytes).unwrap();

        let grid = TextGridReader.load(&path).unwrap();
        assert_eq!(grid.tier_count(), 3);
        assert!(TextGridReader.load(&dir.path().join("missing.TextGrid")).is_err());
    }
}
