use crate::libs::error::{MafError, Result};
use std::fmt;
use std::str::FromStr;

pub const GAP: char = '-';
pub const UNKNOWN: char = 'N';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One `s` line of a MAF block.
///
/// `start` is 0-based on `strand`, `size` counts the non-gap characters of
/// `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub start: u64,
    pub size: u64,
    pub strand: Strand,
    pub src_size: u64,
    pub text: String,
}

/// A line of MAF input that belongs to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MafLine {
    /// The `a` line, kept verbatim
    Meta(String),
    Seq(Row),
}

pub fn count_gaps(text: &str) -> usize {
    text.bytes().filter(|b| *b == GAP as u8).count()
}

fn is_gap_or_unknown(b: u8) -> bool {
    matches!(b, b'-' | b'N' | b'n')
}

/// Parses one line of MAF text.
///
/// Returns `None` for lines that are not part of a block (comments, `i`/`e`/`q`
/// lines) and for malformed `s` lines.
///
/// ```
/// use mafstream::libs::block::{parse_line, MafLine};
/// let line = parse_line("s hg38.chr1 100 4 + 1000 AC-GT").unwrap();
/// match line {
///     MafLine::Seq(row) => {
///         assert_eq!(row.name, "hg38.chr1");
///         assert_eq!(row.end(), 104);
///     }
///     _ => unreachable!(),
/// }
/// assert!(parse_line("# comment").is_none());
/// ```
pub fn parse_line(line: &str) -> Option<MafLine> {
    let line = line.trim();
    match line.chars().next() {
        Some('a') => Some(MafLine::Meta(line.to_string())),
        Some('s') => {
            let fields: Vec<&str> = line.split_whitespace().collect();
            Row::from_fields(&fields).map(MafLine::Seq)
        }
        _ => None,
    }
}

impl Row {
    /// Builds a row from already split `s` line fields.
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() != 7 || fields[0] != "s" {
            return None;
        }
        let text = fields[6];
        if !text.is_ascii() {
            return None;
        }

        Some(Self {
            name: fields[1].to_string(),
            start: fields[2].parse().ok()?,
            size: fields[3].parse().ok()?,
            strand: fields[4].parse().ok()?,
            src_size: fields[5].parse().ok()?,
            text: text.to_string(),
        })
    }

    /// An all-gap placeholder row of `width` columns.
    pub fn gap_filled(template: &Row, start: u64, width: usize) -> Self {
        Self {
            name: template.name.clone(),
            start,
            size: 0,
            strand: template.strand,
            src_size: template.src_size,
            text: GAP.to_string().repeat(width),
        }
    }

    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    pub fn width(&self) -> usize {
        self.text.len()
    }

    pub fn ungapped_len(&self) -> u64 {
        (self.text.len() - count_gaps(&self.text)) as u64
    }

    /// Share of columns that are gaps or unknown nucleotides.
    pub fn empty_fraction(&self) -> f64 {
        if self.text.is_empty() {
            return 1.0;
        }
        let empty = self.text.bytes().filter(|b| is_gap_or_unknown(*b)).count();
        empty as f64 / self.text.len() as f64
    }

    /// Columns `start..end` of this row, with the genomic start moved past the
    /// bases left of the cut and the size recounted inside it.
    ///
    /// Both strands use the same arithmetic.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let width = self.text.len();
        if start > end || end > width {
            return Err(MafError::SplitRange { start, end, width });
        }

        let gaps_before = count_gaps(&self.text[..start]);
        let text = self.text[start..end].to_string();
        let gaps_inside = count_gaps(&text);

        Ok(Self {
            name: self.name.clone(),
            start: self.start + (start - gaps_before) as u64,
            size: (end - start - gaps_inside) as u64,
            strand: self.strand,
            src_size: self.src_size,
            text,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s {:<20} {:10} {:10} {} {:10} {}",
            self.name, self.start, self.size, self.strand, self.src_size, self.text
        )
    }
}

/// One MAF block. The first row is the target species, the rest are the
/// other species in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentBlock {
    pub meta: Option<String>,
    rows: Vec<Row>,
    /// Source block numbers folded into this block
    pub provenance: Vec<usize>,
}

impl AlignmentBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: usize) -> Self {
        Self {
            provenance: vec![index],
            ..Self::default()
        }
    }

    /// Adds a parsed MAF line. Returns `false` for lines that were skipped.
    pub fn add_line(&mut self, line: &str) -> bool {
        match parse_line(line) {
            Some(MafLine::Meta(meta)) => {
                self.meta = Some(meta);
                true
            }
            Some(MafLine::Seq(row)) => self.add_row(row),
            None => false,
        }
    }

    /// Appends a row. A row whose species is already present is rejected.
    pub fn add_row(&mut self, row: Row) -> bool {
        if self.rows.iter().any(|r| r.name == row.name) {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of sequence rows, target included.
    pub fn species_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of MAF lines, the `a` line included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + usize::from(self.meta.is_some())
    }

    /// Gapped alignment width.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.width())
    }

    pub fn target(&self) -> Result<&Row> {
        self.rows.first().ok_or(MafError::EmptyBlock)
    }

    pub fn target_end(&self) -> u64 {
        self.rows.first().map_or(0, |r| r.end())
    }

    /// Target interval, `[start, end)`.
    pub fn coordinates(&self) -> Option<(u64, u64)> {
        self.rows.first().map(|r| (r.start, r.end()))
    }

    /// Whether the target interval shares a base with `[start, end)`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.coordinates()
            .is_some_and(|(s, e)| s < end && start < e)
    }

    pub fn ungapped_target_length(&self) -> u64 {
        self.rows.first().map_or(0, |r| r.ungapped_len())
    }

    pub fn row_for_species(&self, name: &str) -> Result<&Row> {
        self.rows
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| MafError::SpeciesNotFound(name.to_string()))
    }

    pub fn has_species(&self, name: &str) -> bool {
        self.rows.iter().any(|r| r.name == name)
    }

    pub fn species_set(&self, exclude_target: bool) -> Vec<&str> {
        let skip = usize::from(exclude_target);
        self.rows.iter().skip(skip).map(|r| r.name.as_str()).collect()
    }

    pub fn delete_species<S: AsRef<str>>(&mut self, names: &[S]) {
        self.rows
            .retain(|r| !names.iter().any(|n| n.as_ref() == r.name));
    }

    pub fn rename_target(&mut self, suffix: &str) {
        if let Some(target) = self.rows.first_mut() {
            target.name.push_str(suffix);
        }
    }

    pub fn set_target_name(&mut self, name: &str) {
        if let Some(target) = self.rows.first_mut() {
            target.name = name.to_string();
        }
    }

    /// Sorts the non-target rows by species name.
    pub fn sort_by_species(&mut self) {
        if self.rows.len() > 2 {
            self.rows[1..].sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Drops the rows for which `keep` returns `false`.
    pub fn retain_rows<F: FnMut(usize, &Row) -> bool>(&mut self, mut keep: F) {
        let mut i = 0;
        self.rows.retain(|r| {
            let kept = keep(i, r);
            i += 1;
            kept
        });
    }

    /// True when all rows have the same gapped width.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|r| r.width() == width)
    }

    /// A new block holding columns `start..end` of every row.
    pub fn slice_columns(&self, start: usize, end: usize) -> Result<Self> {
        let rows = self
            .rows
            .iter()
            .map(|r| r.slice(start, end))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            meta: self.meta.clone(),
            rows,
            provenance: self.provenance.clone(),
        })
    }

    pub(crate) fn from_parts(meta: Option<String>, rows: Vec<Row>, provenance: Vec<usize>) -> Self {
        Self {
            meta,
            rows,
            provenance,
        }
    }
}

/// MAF text of the block, terminated by a blank line.
impl fmt::Display for AlignmentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.meta.as_deref().unwrap_or("a"))?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
pub(crate) fn block_from_str(text: &str) -> AlignmentBlock {
    let mut block = AlignmentBlock::new();
    for line in text.lines() {
        block.add_line(line);
    }
    block
}
