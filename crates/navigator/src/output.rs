use crate::error::{NavigatorError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the per-anchor point list
pub const INDICES_FILE_NAME: &str = "pointIndices.txt";
/// File name of the running-total guide
pub const GUIDE_FILE_NAME: &str = "indexGuide.txt";

/// The two derived index streams written during an association pass.
///
/// Owns both sinks, so they are closed together when the value goes out of
/// scope on any path. Buffered data is only guaranteed on disk after
/// [`IndexWriters::flush`]; the engine flushes before it returns, success or
/// not. Write failures name the file they were meant for.
#[derive(Debug)]
pub struct IndexWriters<I: Write, G: Write> {
    indices: I,
    guide: G,
    indices_path: PathBuf,
    guide_path: PathBuf,
    indices_lines: usize,
    guide_lines: usize,
}

/// Index writers backed by real files
pub type FileIndexWriters = IndexWriters<BufWriter<File>, BufWriter<File>>;

impl<I: Write, G: Write> IndexWriters<I, G> {
    /// Wrap two sinks, labelled with the default file names
    pub fn new(indices: I, guide: G) -> Self {
        Self::with_paths(indices, INDICES_FILE_NAME, guide, GUIDE_FILE_NAME)
    }

    /// Wrap two sinks, labelled with the paths they write to
    pub fn with_paths(
        indices: I,
        indices_path: impl Into<PathBuf>,
        guide: G,
        guide_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            indices,
            guide,
            indices_path: indices_path.into(),
            guide_path: guide_path.into(),
            indices_lines: 0,
            guide_lines: 0,
        }
    }

    /// Append one line to the indices file
    pub fn write_indices_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.indices, "{line}")
            .map_err(|source| write_error(&self.indices_path, source))?;
        self.indices_lines += 1;
        Ok(())
    }

    /// Append the running matched-point total to the guide file
    pub fn write_guide_total(&mut self, total: usize) -> Result<()> {
        writeln!(self.guide, "{total}")
            .map_err(|source| write_error(&self.guide_path, source))?;
        self.guide_lines += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.indices
            .flush()
            .map_err(|source| write_error(&self.indices_path, source))?;
        self.guide
            .flush()
            .map_err(|source| write_error(&self.guide_path, source))
    }

    /// Lines written to the indices sink so far
    #[must_use]
    pub const fn indices_lines(&self) -> usize {
        self.indices_lines
    }

    /// Lines written to the guide sink so far
    #[must_use]
    pub const fn guide_lines(&self) -> usize {
        self.guide_lines
    }

    /// Give back the underlying sinks
    pub fn into_inner(self) -> (I, G) {
        (self.indices, self.guide)
    }
}

impl FileIndexWriters {
    /// Create (or truncate) `pointIndices.txt` and `indexGuide.txt` in `dir`.
    ///
    /// `dir` must already exist.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let (indices_path, guide_path) = output_paths(dir.as_ref());
        let indices = create(&indices_path)?;
        let guide = create(&guide_path)?;
        Ok(Self::with_paths(indices, indices_path, guide, guide_path))
    }
}

/// Paths of the indices and guide files inside `dir`
#[must_use]
pub fn output_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(INDICES_FILE_NAME), dir.join(GUIDE_FILE_NAME))
}

fn write_error(path: &Path, source: std::io::Error) -> NavigatorError {
    NavigatorError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| NavigatorError::Create {
            path: path.to_path_buf(),
            source,
        })
}
