//! Input loader: spool to a temporary file, then sniff the format.
//!
//! Order of attempts:
//! 1. JSON lines (one object per non-blank line)
//! 2. delimited text with a header row
//! 3. headerless whitespace pairs named `x`/`y`, when (2) yields < 2 columns

use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::{
    constants::{FALLBACK_COLUMNS, STDIN_NAME},
    data::{Cell, Column, Dataset},
    error::GraphError,
};

/// Where the raw bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Stdin,
    Path(PathBuf),
}

impl Source {
    /// `-` means standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Name shown as the default chart title.
    pub fn name(&self) -> String {
        match self {
            Self::Stdin => STDIN_NAME.to_owned(),
            Self::Path(p) => p.display().to_string(),
        }
    }

    pub fn load(&self) -> Result<Dataset, GraphError> {
        match self {
            Self::Stdin => load(io::stdin().lock()),
            Self::Path(p) => load(File::open(p)?),
        }
    }
}

/// Read `src` to the end and parse it.
///
/// The bytes pass through a scoped temporary file so both parsers can
/// re-read a one-shot stream; the file is removed when this returns,
/// whichever way it returns.
pub fn load<R: Read>(src: R) -> Result<Dataset, GraphError> {
    load_in(src, &env::temp_dir())
}

/// [`load`], spooling inside `dir`.
pub fn load_in<R: Read>(mut src: R, dir: &Path) -> Result<Dataset, GraphError> {
    let mut spool = NamedTempFile::new_in(dir)?;
    let n = io::copy(&mut src, &mut spool)?;
    spool.flush()?;
    debug!(bytes = n, path = %spool.path().display(), "spooled input");

    let mut file = spool.reopen()?;
    if let Some(ds) = parse_json_lines(BufReader::new(&mut file))? {
        debug!(rows = ds.len(), "parsed as JSON lines");
        return Ok(ds);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::with_capacity(usize::try_from(n).unwrap_or(0));
    file.read_to_end(&mut buf)?;
    normalize_unicode_minus(&mut buf);
    let ds = parse_delimited(&buf)?;
    debug!(rows = ds.len(), columns = ds.columns().len(), "parsed as delimited text");
    Ok(ds)
}

/// `Ok(None)` when the first record is not a JSON object, so the next
/// format gets a turn. A later bad line is a hard error.
pub fn parse_json_lines<R: BufRead>(rdr: R) -> Result<Option<Dataset>, GraphError> {
    let mut records = Vec::new();
    for (i, line) in rdr.lines().enumerate() {
        let Ok(line) = line else {
            // not UTF-8 text; let the delimited reader report it
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => {
                records.push(map.into_iter().map(|(k, v)| (k, json_cell(v))).collect());
            }
            Ok(_) if records.is_empty() => return Ok(None),
            Err(_) if records.is_empty() => return Ok(None),
            Ok(_) => return Err(GraphError::NotAnObject(i + 1)),
            Err(source) => return Err(GraphError::Json { line: i + 1, source }),
        }
    }
    if records.is_empty() {
        return Ok(None);
    }
    Dataset::from_records(records).map(Some)
}

fn json_cell(v: Value) -> Cell {
    match v {
        Value::Null => Cell::Null,
        Value::Number(n) => {
            if let Some(i) = n.as_i64().map(i128::from).or(n.as_u64().map(i128::from)) {
                Cell::Integer(i)
            } else {
                n.as_f64().map_or_else(|| Cell::Text(n.to_string()), Cell::Number)
            }
        }
        Value::String(s) => Cell::Text(s),
        other => Cell::Text(other.to_string()),
    }
}

/// Header-row CSV, with the whitespace two-column fallback.
pub fn parse_delimited(buf: &[u8]) -> Result<Dataset, GraphError> {
    let text = trim_leading_blank_lines(buf);
    if text.iter().all(u8::is_ascii_whitespace) {
        return Err(GraphError::UnrecognisedInput);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text);
    let names: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();

    if names.len() < 2 {
        let first = names.first().map_or("", String::as_str);
        if first.split_whitespace().count() == 2 {
            debug!("single column with two tokens; retrying as whitespace pairs");
            return parse_whitespace_pairs(text);
        }
    }

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for rec in rdr.records() {
        let rec = rec?;
        for (col, field) in cells.iter_mut().zip(rec.iter()) {
            col.push(text_cell(field));
        }
    }
    columns_to_dataset(names, cells)
}

fn parse_whitespace_pairs(text: &[u8]) -> Result<Dataset, GraphError> {
    let text = std::str::from_utf8(text).map_err(|_| GraphError::UnrecognisedInput)?;
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(), Vec::new()];
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut it = line.split_whitespace();
        let (Some(x), Some(y), None) = (it.next(), it.next(), it.next()) else {
            return Err(GraphError::UnrecognisedInput);
        };
        cells[0].push(text_cell(x));
        cells[1].push(text_cell(y));
    }
    columns_to_dataset(FALLBACK_COLUMNS.iter().map(|&s| s.to_owned()).collect(), cells)
}

fn columns_to_dataset(names: Vec<String>, cells: Vec<Vec<Cell>>) -> Result<Dataset, GraphError> {
    Dataset::new(
        names
            .into_iter()
            .zip(cells)
            .map(|(n, c)| Column::from_cells(n, c))
            .collect(),
    )
}

/// Classify one delimited field.
pub fn text_cell(field: &str) -> Cell {
    let field = field.trim();
    if field.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = field.parse::<i128>() {
        return Cell::Integer(i);
    }
    match lexical_core::parse::<f64>(field.as_bytes()) {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ if matches!(
            field.to_ascii_lowercase().as_str(),
            "nan" | "na" | "n/a" | "null" | "none"
        ) =>
        {
            Cell::Null
        }
        _ => Cell::Text(field.to_owned()),
    }
}

// --- Helpers ---

fn trim_leading_blank_lines(mut b: &[u8]) -> &[u8] {
    while let Some(end) = b.iter().position(|&c| c == b'\n') {
        if b[..end].iter().all(u8::is_ascii_whitespace) {
            b = &b[end + 1..];
        } else {
            break;
        }
    }
    b
}

/// Replace U+2212 MINUS SIGN with ASCII `-`, in place.
#[inline]
pub fn normalize_unicode_minus(buf: &mut Vec<u8>) {
    let (mut r, mut w) = (0, 0);
    while r < buf.len() {
        if r + 2 < buf.len() && buf[r] == 0xE2 && buf[r + 1] == 0x88 && buf[r + 2] == 0x92 {
            buf[w] = b'-';
            r += 3;
            w += 1;
        } else {
            if r != w {
                buf[w] = buf[r];
            }
            r += 1;
            w += 1;
        }
    }
    buf.truncate(w);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::data::Kind;

    fn records(ds: &Dataset) -> Value {
        Value::Array(ds.to_records().into_iter().map(Value::Object).collect())
    }

    #[test]
    fn json_lines_round_trip() {
        let input = "\n{\"x\": 0.0, \"cos\": 11.3, \"sin\": -0.7}\n{\"x\": 0.06, \"cos\": 10.6, \"sin\": -0.04}\n";
        let ds = load(input.as_bytes()).unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["x", "cos", "sin"]);
        assert_eq!(
            records(&ds),
            json!([
                {"x": 0.0, "cos": 11.3, "sin": -0.7},
                {"x": 0.06, "cos": 10.6, "sin": -0.04},
            ])
        );
    }

    #[test]
    fn csv_round_trip() {
        let input = "\nx,cos,sin\n0.0,11.3,-0.7\n0.06,10.6,-0.04\n";
        let ds = load(input.as_bytes()).unwrap();
        assert_eq!(
            records(&ds),
            json!([
                {"x": 0.0, "cos": 11.3, "sin": -0.7},
                {"x": 0.06, "cos": 10.6, "sin": -0.04},
            ])
        );
    }

    #[test]
    fn csv_integers_stay_integers() {
        let ds = load("x,y\n0,1\n1,2\n2,3\n".as_bytes()).unwrap();
        assert_eq!(records(&ds), json!([{"x": 0, "y": 1}, {"x": 1, "y": 2}, {"x": 2, "y": 3}]));
    }

    #[test]
    fn whitespace_pairs_fall_back_to_x_y() {
        let ds = load("1 10\n2  20\n3\t30\n".as_bytes()).unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column("y").unwrap().numeric_values().unwrap(), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn single_column_csv_is_kept() {
        let ds = load("gauss\n0.1\n-0.3\n".as_bytes()).unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["gauss"]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn unicode_minus_and_missing_cells() {
        let ds = load("t,v\n2022-01-01,\u{2212}1.5\n2022-01-02,\n".as_bytes()).unwrap();
        assert_eq!(ds.column("t").unwrap().kind(), Kind::Temporal);
        let v = ds.column("v").unwrap().numeric_values().unwrap();
        assert_eq!(v[0], -1.5);
        assert!(v[1].is_nan());
    }

    #[test]
    fn broken_json_after_first_record_is_fatal() {
        let err = load("{\"a\": 1}\n{\"a\": \n".as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Json { line: 2, .. }));
    }

    #[test]
    fn empty_input_is_unrecognised() {
        assert!(matches!(load("\n \n".as_bytes()), Err(GraphError::UnrecognisedInput)));
    }

    #[test]
    fn ragged_csv_is_a_csv_error() {
        assert!(matches!(load("a,b\n1,2,3\n".as_bytes()), Err(GraphError::Csv(_))));
    }

    #[test]
    fn large_json_integers_round_trip() {
        let ds = load("{\"id\": 9007199254740993, \"u\": 18446744073709551615}\n".as_bytes()).unwrap();
        assert_eq!(
            records(&ds),
            json!([{"id": 9_007_199_254_740_993_u64, "u": u64::MAX}])
        );
    }

    #[test]
    fn spool_is_removed_on_every_path() {
        let dir = tempfile::tempdir().unwrap();
        let leftovers = || std::fs::read_dir(dir.path()).unwrap().count();

        assert!(load_in("\n \n".as_bytes(), dir.path()).is_err());
        assert_eq!(leftovers(), 0);
        assert!(load_in("{\"a\": 1}\n{\"a\":\n".as_bytes(), dir.path()).is_err());
        assert_eq!(leftovers(), 0);
        assert!(load_in("x,y\n1,2\n".as_bytes(), dir.path()).is_ok());
        assert_eq!(leftovers(), 0);
    }

    #[test]
    fn source_names() {
        assert_eq!(Source::from_arg("-").name(), "<stdin>");
        assert_eq!(Source::from_arg("data/trig.json").name(), "data/trig.json");
    }
}
