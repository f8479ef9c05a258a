//! Serialization for sections
//!
//! Line-oriented text format holding what is needed to rebuild a section
//! without sweeping again: orientation, first position and runs. Ids and
//! relations are not stored; a section read back is unregistered.
//!
//! # Section format
//!
//! ```text
//! \nSection Version 1\n
//! Orientation = H, first-pos = P, Number of runs = N\n
//!   Run[0]: start = S, length = L, level = G\n
//!   ...
//! ```
//!
//! # Section list format
//!
//! ```text
//! \nSections Version 1\n
//! Number of sections = N\n
//! [embedded section]
//! ...
//! ```

use crate::error::{LagError, LagResult};
use crate::section::Section;
use runlag_core::{Orientation, Run};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const SECTION_VERSION: i32 = 1;
const SECTIONS_VERSION: i32 = 1;

/// Maximum number of runs in a section
const MAX_SECTION_RUNS: usize = 1_000_000;
/// Maximum number of sections in a list
const MAX_SECTIONS: usize = 10_000_000;

/// Maximum input size in bytes (~100 MB)
const MAX_INPUT_SIZE: usize = 100_000_000;

impl Section {
    /// Read a section from a reader
    pub fn read_from_reader(reader: &mut impl Read) -> LagResult<Self> {
        let buf = read_limited(reader)?;
        Self::read_from_bytes(buf.as_bytes())
    }

    /// Read a section from a file
    pub fn read_from_file(path: impl AsRef<Path>) -> LagResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        Self::read_from_reader(&mut reader)
    }

    /// Read a section from bytes
    pub fn read_from_bytes(data: &[u8]) -> LagResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| decode_error(format!("invalid UTF-8: {e}")))?;
        let mut lines = text.lines().peekable();
        parse_section(&mut lines)
    }

    /// Write the section to a writer
    pub fn write_to_writer(&self, writer: &mut impl Write) -> LagResult<()> {
        write_section(writer, self)
    }

    /// Write the section to a file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> LagResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the section to bytes
    pub fn write_to_bytes(&self) -> LagResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

/// Write a list of sections
pub fn write_sections<'a, I>(writer: &mut impl Write, sections: I) -> LagResult<()>
where
    I: IntoIterator<Item = &'a Section>,
{
    let sections: Vec<&Section> = sections.into_iter().collect();
    writeln!(writer, "\nSections Version {SECTIONS_VERSION}")?;
    writeln!(writer, "Number of sections = {}", sections.len())?;
    for section in sections {
        write_section(writer, section)?;
    }
    Ok(())
}

/// Read a list of sections from bytes
pub fn read_sections(data: &[u8]) -> LagResult<Vec<Section>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| decode_error(format!("invalid UTF-8: {e}")))?;
    let mut lines = text.lines().peekable();

    let version = find_and_parse_int(&mut lines, "Sections Version ")?;
    if version != SECTIONS_VERSION {
        return Err(decode_error(format!("invalid Sections version: {version}")));
    }
    let n = parse_count(&mut lines, "Number of sections = ", MAX_SECTIONS)?;

    let mut sections = Vec::with_capacity(n);
    for _ in 0..n {
        sections.push(parse_section(&mut lines)?);
    }
    Ok(sections)
}

/// Read a list of sections from a reader
pub fn read_sections_from_reader(reader: &mut impl Read) -> LagResult<Vec<Section>> {
    let buf = read_limited(reader)?;
    read_sections(buf.as_bytes())
}

// --- Internal parsing/writing helpers ---

fn decode_error(message: String) -> LagError {
    runlag_core::Error::DecodeError(message).into()
}

fn read_limited(reader: &mut impl Read) -> LagResult<String> {
    let mut buf = String::new();
    reader
        .take(MAX_INPUT_SIZE as u64)
        .read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_section(writer: &mut impl Write, section: &Section) -> LagResult<()> {
    writeln!(writer, "\nSection Version {SECTION_VERSION}")?;
    writeln!(
        writer,
        "Orientation = {}, first-pos = {}, Number of runs = {}",
        section.orientation().tag(),
        section.first_pos(),
        section.run_count()
    )?;
    for (i, run) in section.runs().iter().enumerate() {
        writeln!(
            writer,
            "  Run[{i}]: start = {}, length = {}, level = {}",
            run.start(),
            run.length(),
            run.level()
        )?;
    }
    Ok(())
}

/// Parse a section, expecting the iterator before its version line
fn parse_section<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
) -> LagResult<Section> {
    let version = find_and_parse_int(lines, "Section Version ")?;
    if version != SECTION_VERSION {
        return Err(decode_error(format!("invalid Section version: {version}")));
    }

    let header = next_line_containing(lines, "Number of runs")?;
    let [orientation, first_pos, count] =
        parse_fields(header, ["Orientation", "first-pos", "Number of runs"])?;
    let orientation = Orientation::from_tag(orientation)?;
    let first_pos = parse_int(first_pos)?;
    let n = parse_int(count)?;
    if n < 1 || n as usize > MAX_SECTION_RUNS {
        return Err(decode_error(format!("invalid number of runs: {n}")));
    }

    let mut runs = Vec::with_capacity(n as usize);
    for _ in 0..n {
        runs.push(parse_run_line(lines)?);
    }
    Section::with_runs(orientation, first_pos, runs)
}

/// Find a line containing `prefix` and parse the integer after it
fn find_and_parse_int<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
    prefix: &str,
) -> LagResult<i32> {
    for line in lines.by_ref() {
        if let Some(rest) = line.trim().strip_prefix(prefix) {
            return rest.trim().parse::<i32>().map_err(|e| {
                decode_error(format!("failed to parse integer after '{prefix}': {e}"))
            });
        }
    }
    Err(decode_error(format!("expected line with '{prefix}' not found")))
}

fn parse_count<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
    prefix: &str,
    max: usize,
) -> LagResult<usize> {
    let n = find_and_parse_int(lines, prefix)?;
    if n < 0 || n as usize > max {
        return Err(decode_error(format!("invalid count after '{prefix}': {n}")));
    }
    Ok(n as usize)
}

/// Skip to the first line starting with `prefix`, returned trimmed
fn next_line_with<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
    prefix: &str,
) -> LagResult<&'a str> {
    for line in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed.starts_with(prefix) {
            return Ok(trimmed);
        }
    }
    Err(decode_error(format!("expected line with '{prefix}' not found")))
}

/// Skip to the first line containing `needle`, returned trimmed
fn next_line_containing<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
    needle: &str,
) -> LagResult<&'a str> {
    for line in lines.by_ref() {
        if line.contains(needle) {
            return Ok(line.trim());
        }
    }
    Err(decode_error(format!("expected line containing '{needle}' not found")))
}

/// Parse a run line like "  Run[0]: start = 4, length = 6, level = 0"
fn parse_run_line<'a>(
    lines: &mut std::iter::Peekable<impl Iterator<Item = &'a str>>,
) -> LagResult<Run> {
    let line = next_line_with(lines, "Run[")?;
    let after_colon = line
        .split_once(": ")
        .ok_or_else(|| decode_error(format!("invalid run line: {line}")))?
        .1;
    let [start, length, level] = parse_fields(after_colon, ["start", "length", "level"])?;
    let start = parse_int(start)?;
    let length = parse_int(length)?;
    let level = level
        .parse::<u8>()
        .map_err(|e| decode_error(format!("invalid level '{level}': {e}")))?;
    Ok(Run::new(start, length, level)?)
}

fn parse_int(value: &str) -> LagResult<i32> {
    value
        .parse::<i32>()
        .map_err(|e| decode_error(format!("failed to parse '{value}': {e}")))
}

/// Split "a = 1, b = 2" into the values of the named keys, in key order
///
/// Rejects unknown, duplicate and missing keys.
fn parse_fields<'s, const N: usize>(s: &'s str, keys: [&str; N]) -> LagResult<[&'s str; N]> {
    let mut values: [Option<&'s str>; N] = [None; N];

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, val) = part
            .split_once('=')
            .ok_or_else(|| decode_error(format!("invalid key/value pair: '{part}'")))?;
        let key = key.trim();

        let slot = keys
            .iter()
            .position(|&k| k == key)
            .ok_or_else(|| decode_error(format!("unknown field '{key}'")))?;
        if values[slot].is_some() {
            return Err(decode_error(format!("duplicate field '{key}'")));
        }
        values[slot] = Some(val.trim());
    }

    let mut out = [""; N];
    for (i, value) in values.into_iter().enumerate() {
        out[i] = value.ok_or_else(|| decode_error(format!("missing field '{}'", keys[i])))?;
    }
    Ok(out)
}
