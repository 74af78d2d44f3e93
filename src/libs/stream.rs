//! Sequential block reading and the merge / split / filter pipeline.
//!
//! ```text
//! raw blocks -> trivial merge -> deletion merge -> window split -> trim & filter
//! ```
//!
//! Every stage is an iterator over `Result<AlignmentBlock>` that pulls from
//! the previous one, so a chromosome is processed with a bounded number of
//! blocks in memory.

use crate::libs::block::{parse_line, AlignmentBlock, MafLine};
use crate::libs::config::StreamConfig;
use crate::libs::error::{MafError, Result};
use crate::libs::merge::{merge, DeletionPolicy, MergeOutcome, RatioPolicy};
use crate::libs::split::split;
use crate::libs::trim::{admit, trim};
use itertools::Itertools;
use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

enum Source {
    Path(PathBuf),
    Stdin,
    Memory(Arc<str>),
}

impl Source {
    fn open(&self, offset: u64) -> io::Result<Box<dyn BufRead>> {
        match self {
            Source::Path(path) => crate::libs::io::reader_at(path, offset),
            Source::Stdin => {
                if offset == 0 {
                    crate::libs::io::reader("stdin")
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "standard input can not be rewound",
                    ))
                }
            }
            Source::Memory(text) => {
                let bytes: Vec<u8> = text.as_bytes().to_vec();
                let mut cursor = Cursor::new(bytes);
                cursor.set_position(offset);
                Ok(Box::new(cursor))
            }
        }
    }
}

/// Reads MAF blocks one at a time.
///
/// Blocks are numbered from 0 in file order. The byte offset of every block
/// seen so far is remembered, so [`BlockStream::iterate_from`] can jump back
/// to a known block without parsing the file again.
pub struct BlockStream {
    source: Source,
    reader: Box<dyn BufRead>,
    config: StreamConfig,
    /// Byte offset of block `i` at position `i`
    offsets: Vec<u64>,
    offset: u64,
    next_index: usize,
    peeked: Option<AlignmentBlock>,
    last: Option<usize>,
}

impl BlockStream {
    /// Opens a MAF file, or standard input for `stdin`.
    pub fn open(input: &str, config: StreamConfig) -> Result<Self> {
        let source = if input == "stdin" {
            Source::Stdin
        } else {
            Source::Path(PathBuf::from(input))
        };
        Self::from_source(source, config)
    }

    pub fn from_text(text: &str, config: StreamConfig) -> Result<Self> {
        Self::from_source(Source::Memory(Arc::from(text)), config)
    }

    fn from_source(source: Source, config: StreamConfig) -> Result<Self> {
        let reader = source.open(0)?;
        Ok(Self {
            source,
            reader,
            config,
            offsets: vec![],
            offset: 0,
            next_index: 0,
            peeked: None,
            last: None,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Number of blocks whose start has been located.
    pub fn blocks_seen(&self) -> usize {
        self.offsets.len()
    }

    fn reposition(&mut self, index: usize) -> Result<()> {
        let offset = self.offsets[index];
        self.reader = self.source.open(offset)?;
        self.offset = offset;
        self.next_index = index;
        Ok(())
    }

    /// Positions the stream so that the next block read is block `index`.
    pub fn seek_block(&mut self, index: usize) -> Result<()> {
        self.peeked = None;

        if index < self.offsets.len() {
            if index != self.next_index || self.offset != self.offsets[index] {
                self.reposition(index)?;
            }
            return Ok(());
        }

        // resume from the furthest block located so far
        if let Some(frontier) = self.offsets.len().checked_sub(1) {
            if self.next_index < frontier {
                self.reposition(frontier)?;
            }
        }
        while self.next_index < index {
            if self.read_block()?.is_none() {
                return Err(MafError::IndexOutOfRange(index, self.offsets.len()));
            }
        }
        match self.read_block()? {
            Some(block) => {
                self.peeked = Some(block);
                Ok(())
            }
            None => Err(MafError::IndexOutOfRange(index, self.offsets.len())),
        }
    }

    /// Raw blocks starting at block `index`.
    pub fn iterate_from(&mut self, index: usize) -> Result<&mut Self> {
        self.seek_block(index)?;
        Ok(self)
    }

    /// Limits the stream to blocks `first..=last`.
    pub fn restrict(mut self, first: usize, last: usize) -> Result<Self> {
        if first > 0 {
            self.seek_block(first)?;
        }
        self.last = Some(last);
        Ok(self)
    }

    fn read_block(&mut self) -> Result<Option<AlignmentBlock>> {
        let mut block: Option<AlignmentBlock> = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let line_start = self.offset;
            let n = self.reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            self.offset += n as u64;

            let Ok(line) = std::str::from_utf8(&buf) else {
                log::warn!("Skipping line with invalid UTF-8 near byte {}", line_start);
                continue;
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if block.is_some() {
                    break;
                }
                continue;
            }

            let Some(parsed) = parse_line(trimmed) else {
                if trimmed.starts_with('s') {
                    log::warn!("Skipping malformed row near byte {}: {}", line_start, trimmed);
                }
                continue;
            };

            let current = block.get_or_insert_with(|| {
                if self.next_index == self.offsets.len() {
                    self.offsets.push(line_start);
                }
                AlignmentBlock::with_index(self.next_index)
            });
            match parsed {
                MafLine::Meta(meta) => current.meta = Some(meta),
                MafLine::Seq(row) => {
                    let name = row.name.clone();
                    if !current.add_row(row) {
                        log::warn!(
                            "Skipping duplicate species {} in block {}",
                            name,
                            self.next_index
                        );
                    }
                }
            }
        }

        if block.is_some() {
            self.next_index += 1;
        }
        Ok(block)
    }

    /// Runs the stream through the pipeline up to `stage`.
    pub fn stage(self, stage: Stage) -> Box<dyn Iterator<Item = Result<AlignmentBlock>>> {
        let config = self.config;
        match stage {
            Stage::Raw => Box::new(self),
            Stage::Trivial => Box::new(TrivialMerge::new(self, &config)),
            Stage::Deletion => Box::new(DeletionMerge::new(
                TrivialMerge::new(self, &config),
                &config,
                RatioPolicy::default(),
            )),
            Stage::Split => Box::new(WindowSplit::new(
                DeletionMerge::new(TrivialMerge::new(self, &config), &config, RatioPolicy::default()),
                &config,
            )),
            Stage::Final => Box::new(self.discard_stream()),
        }
    }

    /// The complete pipeline: merged, split, trimmed and filtered blocks.
    pub fn discard_stream(self) -> Pipeline {
        let config = self.config;
        let merged = DeletionMerge::new(TrivialMerge::new(self, &config), &config, RatioPolicy::default());
        TrimFilter::new(WindowSplit::new(merged, &config), &config)
    }
}

impl Iterator for BlockStream {
    type Item = Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = match self.peeked.take() {
                Some(block) => block,
                None => match self.read_block() {
                    Ok(Some(block)) => block,
                    Ok(None) => return None,
                    Err(e) => return Some(Err(e)),
                },
            };

            let index = block.provenance.first().copied().unwrap_or_default();
            if self.last.is_some_and(|last| index > last) {
                return None;
            }
            if block.is_empty() {
                log::warn!("Block {} has no sequence rows", index);
                continue;
            }
            return Some(Ok(block));
        }
    }
}

/// All four stages over a [`BlockStream`].
pub type Pipeline = TrimFilter<WindowSplit<DeletionMerge<TrivialMerge<BlockStream>, RatioPolicy>>>;

/// Blocks that left each stage so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    /// Raw blocks located in the input
    pub read: usize,
    pub trivial: usize,
    pub deletion: usize,
    pub split: usize,
    pub emitted: usize,
}

impl Pipeline {
    pub fn counts(&self) -> StageCounts {
        let split = self.get_ref();
        let deletion = split.get_ref();
        let trivial = deletion.get_ref();
        StageCounts {
            read: trivial.get_ref().blocks_seen(),
            trivial: trivial.emitted(),
            deletion: deletion.emitted(),
            split: split.emitted(),
            emitted: self.emitted(),
        }
    }
}

/// Pipeline stage names, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Trivial,
    Deletion,
    Split,
    Final,
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Stage::Raw),
            "trivial" => Ok(Stage::Trivial),
            "deletion" => Ok(Stage::Deletion),
            "split" => Ok(Stage::Split),
            "final" => Ok(Stage::Final),
            _ => Err(format!("unknown stage: {}", s)),
        }
    }
}

/// Joins neighbouring blocks as long as every shared species is continuous.
pub struct TrivialMerge<I> {
    blocks: I,
    held: Option<AlignmentBlock>,
    allowed_dist: u64,
    emitted: usize,
}

impl<I> TrivialMerge<I> {
    pub fn new(blocks: I, config: &StreamConfig) -> Self {
        Self {
            blocks,
            held: None,
            allowed_dist: config.allowed_dist,
            emitted: 0,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.blocks
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<I: Iterator<Item = Result<AlignmentBlock>>> Iterator for TrivialMerge<I> {
    type Item = Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.advance();
        if matches!(item, Some(Ok(_))) {
            self.emitted += 1;
        }
        item
    }
}

impl<I: Iterator<Item = Result<AlignmentBlock>>> TrivialMerge<I> {
    fn advance(&mut self) -> Option<Result<AlignmentBlock>> {
        loop {
            let block = match self.blocks.next() {
                Some(Ok(block)) => block,
                Some(Err(e)) => return Some(Err(e)),
                None => return self.held.take().map(Ok),
            };

            let Some(held) = self.held.take() else {
                self.held = Some(block);
                continue;
            };

            match merge(&held, &block, 0, self.allowed_dist) {
                Ok(MergeOutcome::Success(merged)) => self.held = Some(merged),
                Ok(_) => {
                    self.held = Some(block);
                    return Some(Ok(held));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Joins neighbouring blocks that are both too short to stand alone, at the
/// cost of the species that `policy` allows to drop.
pub struct DeletionMerge<I, P> {
    blocks: I,
    held: Option<AlignmentBlock>,
    config: StreamConfig,
    policy: P,
    emitted: usize,
}

impl<I, P: DeletionPolicy> DeletionMerge<I, P> {
    pub fn new(blocks: I, config: &StreamConfig, policy: P) -> Self {
        Self {
            blocks,
            held: None,
            config: *config,
            policy,
            emitted: 0,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.blocks
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<I, P> Iterator for DeletionMerge<I, P>
where
    I: Iterator<Item = Result<AlignmentBlock>>,
    P: DeletionPolicy,
{
    type Item = Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.advance();
        if matches!(item, Some(Ok(_))) {
            self.emitted += 1;
        }
        item
    }
}

impl<I, P> DeletionMerge<I, P>
where
    I: Iterator<Item = Result<AlignmentBlock>>,
    P: DeletionPolicy,
{
    fn advance(&mut self) -> Option<Result<AlignmentBlock>> {
        loop {
            let block = match self.blocks.next() {
                Some(Ok(block)) => block,
                Some(Err(e)) => return Some(Err(e)),
                None => return self.held.take().map(Ok),
            };

            let Some(held) = self.held.take() else {
                self.held = Some(block);
                continue;
            };

            if let Some(allowed) = self.policy.allowed_deletions(&held, &block, &self.config) {
                match merge(&held, &block, allowed, self.config.allowed_dist) {
                    Ok(MergeOutcome::Success(merged)) => {
                        log::debug!(
                            "Merged blocks [{}] with [{}] dropping up to {} species",
                            held.provenance.iter().join(","),
                            block.provenance.iter().join(","),
                            allowed
                        );
                        self.held = Some(merged);
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                }
            }

            self.held = Some(block);
            return Some(Ok(held));
        }
    }
}

/// Replaces over-wide blocks by their overlapping windows.
pub struct WindowSplit<I> {
    blocks: I,
    max_width: usize,
    pending: VecDeque<AlignmentBlock>,
    emitted: usize,
}

impl<I> WindowSplit<I> {
    pub fn new(blocks: I, config: &StreamConfig) -> Self {
        Self {
            blocks,
            max_width: config.max_block_width_before_split,
            pending: VecDeque::new(),
            emitted: 0,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.blocks
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<I: Iterator<Item = Result<AlignmentBlock>>> Iterator for WindowSplit<I> {
    type Item = Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(block) = self.pending.pop_front() {
                self.emitted += 1;
                return Some(Ok(block));
            }
            match self.blocks.next()? {
                Ok(block) => {
                    let provenance = block.provenance.clone();
                    match split(block, self.max_width) {
                        Ok(parts) => self.pending.extend(parts),
                        Err(e) => log::warn!("Skipping block {:?}: {}", provenance, e),
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Trims every block and drops the ones that end up too small.
pub struct TrimFilter<I> {
    blocks: I,
    config: StreamConfig,
    emitted: usize,
}

impl<I> TrimFilter<I> {
    pub fn new(blocks: I, config: &StreamConfig) -> Self {
        Self {
            blocks,
            config: *config,
            emitted: 0,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.blocks
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<I: Iterator<Item = Result<AlignmentBlock>>> Iterator for TrimFilter<I> {
    type Item = Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.blocks.next()? {
                Ok(block) => {
                    let provenance = block.provenance.clone();
                    match trim(block) {
                        Ok(block) if admit(&block, &self.config) => {
                            self.emitted += 1;
                            return Some(Ok(block));
                        }
                        Ok(_) => log::debug!("Dropping small block {:?}", provenance),
                        Err(e) => log::warn!("Skipping block {:?}: {}", provenance, e),
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
