use crate::libs::block::AlignmentBlock;
use crate::libs::error::Result;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct MafWriter<W: Write> {
    writer: W,
}

impl<W: Write> MafWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self, program: &str) -> io::Result<()> {
        writeln!(self.writer, "##maf version=1 scoring={}", program)?;
        writeln!(self.writer)
    }

    pub fn write_block(&mut self, block: &AlignmentBlock) -> io::Result<()> {
        write!(self.writer, "{}", block)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Source block numbers of every emitted block, by label.
pub type BlockIndex = IndexMap<String, Vec<usize>>;

/// Packs emitted blocks into `big_block_<n>.maf` files of at most `bb_size`
/// blocks each, or into one `<label>.maf` file per block.
///
/// The target row of each block is renamed to `<chrom>_<i>_<n>`, where `i`
/// counts blocks inside file `n`.
pub struct BigBlockWriter {
    dir: PathBuf,
    chrom: String,
    bb_size: usize,
    single: bool,
    file_no: usize,
    count: usize,
    current: Option<MafWriter<BufWriter<File>>>,
    index: BlockIndex,
}

impl BigBlockWriter {
    pub fn new<P: AsRef<Path>>(dir: P, chrom: &str, bb_size: usize, single: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            chrom: chrom.to_string(),
            bb_size: bb_size.max(1),
            single,
            file_no: 0,
            count: 0,
            current: None,
            index: BlockIndex::new(),
        }
    }

    fn create(&self, name: &str) -> Result<MafWriter<BufWriter<File>>> {
        let file = File::create(self.dir.join(name))?;
        Ok(MafWriter::new(BufWriter::new(file)))
    }

    /// Labels and writes one block; returns the label.
    pub fn push(&mut self, mut block: AlignmentBlock) -> Result<String> {
        if self.file_no == 0 || self.count == self.bb_size {
            if let Some(mut previous) = self.current.take() {
                previous.flush()?;
            }
            self.file_no += 1;
            self.count = 0;
            if !self.single {
                let name = format!("big_block_{}.maf", self.file_no);
                self.current = Some(self.create(&name)?);
            }
        }
        self.count += 1;

        let label = format!("{}_{}_{}", self.chrom, self.count, self.file_no);
        block.set_target_name(&label);

        if self.single {
            let mut writer = self.create(&format!("{}.maf", label))?;
            writer.write_block(&block)?;
            writer.flush()?;
        } else if let Some(writer) = self.current.as_mut() {
            writer.write_block(&block)?;
        }

        self.index.insert(label.clone(), block.provenance);
        Ok(label)
    }

    /// Flushes the open file and hands back the block index.
    pub fn finish(mut self) -> Result<BlockIndex> {
        if let Some(mut writer) = self.current.take() {
            writer.flush()?;
        }
        Ok(self.index)
    }
}

pub fn write_block_index<P: AsRef<Path>>(path: P, index: &BlockIndex) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, index)?;
    writer.flush()?;
    Ok(())
}

/// Whether `name` is a file [`BigBlockWriter`] writes for `chrom`.
fn is_output_name(name: &str, chrom: &str) -> bool {
    let Some(stem) = name.strip_suffix(".maf") else {
        return false;
    };
    let numbered = |rest: &str| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit());
    stem.strip_prefix("big_block_").is_some_and(numbered)
        || stem
            .strip_prefix(chrom)
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|rest| !rest.is_empty())
}

/// Removes the `big_block_<n>.maf` and `<chrom>_*.maf` files left in `dir` by
/// an earlier run; creates `dir` when missing. `input` is never removed.
pub fn prepare_output_dir<P: AsRef<Path>>(dir: P, chrom: &str, input: &Path) -> Result<usize> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
        return Ok(0);
    }

    let input = input.canonicalize().ok();
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_output_name(name, chrom) {
            continue;
        }
        if input.is_some() && path.canonicalize().ok() == input {
            continue;
        }
        std::fs::remove_file(&path)?;
        removed += 1;
    }
    Ok(removed)
}
