use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

fn is_gz(path: &Path) -> bool {
    path.extension() == Some(std::ffi::OsStr::new("gz"))
}

/// Opens `input` for reading; `stdin` reads standard input and `.gz` files are
/// decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = mafstream::reader("tests/maf/continuous.maf").unwrap();
/// let blocks = reader
///     .lines()
///     .filter(|l| l.as_ref().unwrap().starts_with('a'))
///     .count();
/// assert_eq!(blocks, 3);
/// ```
pub fn reader(input: &str) -> io::Result<Box<dyn BufRead>> {
    if input == "stdin" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    reader_at(Path::new(input), 0)
}

/// Opens `path` positioned at byte `offset` of its (decompressed) content.
pub fn reader_at(path: &Path, offset: u64) -> io::Result<Box<dyn BufRead>> {
    let file = std::fs::File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("could not open {}: {}", path.display(), e))
    })?;

    if is_gz(path) {
        let mut reader = BufReader::new(flate2::read::MultiGzDecoder::new(file));
        if offset > 0 {
            io::copy(&mut reader.by_ref().take(offset), &mut io::sink())?;
        }
        Ok(Box::new(reader))
    } else {
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn writer(output: &str) -> io::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(std::fs::File::create(output)?))
    };

    Ok(writer)
}
