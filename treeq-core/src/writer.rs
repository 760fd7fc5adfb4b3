//! Writer providers
//!
//! The printer asks a [`PrinterWriter`] for a sink before every node and once
//! more for the appendix. Providers decide where each node's bytes land.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::node::CandidateNode;

/// Errors while obtaining an output sink
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("no output file has been opened yet")]
    NoDestination,
    #[error("invalid output file name '{0}'")]
    InvalidName(String),
}

/// Hands out a sink per node. `None` requests the sink for trailing content
/// (the appendix), which belongs to no node.
pub trait PrinterWriter {
    fn get_writer(&mut self, node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError>;
}

/// Every node and the appendix go to one buffered stream
pub struct SingleWriter<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> SingleWriter<W> {
    pub fn new(inner: W) -> Self {
        SingleWriter {
            inner: BufWriter::new(inner),
        }
    }

    /// Flush and give back the underlying stream
    pub fn into_inner(self) -> Result<W, WriterError> {
        self.inner.into_inner().map_err(|e| WriterError::Io(e.into_error()))
    }
}

impl<W: Write> PrinterWriter for SingleWriter<W> {
    fn get_writer(&mut self, _node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
        Ok(Box::new(&mut self.inner))
    }
}

/// Shared in-memory buffer, handy for capturing output in tests and
/// for embedding the printer in other tools
#[derive(Clone, Default)]
pub struct InMemorySink {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buffer.borrow().clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }
}

impl Write for InMemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PrinterWriter for InMemorySink {
    fn get_writer(&mut self, _node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
        Ok(Box::new(self.clone()))
    }
}

/// One file per node, named from a template.
///
/// Template placeholders: `{file}` (source file stem, `stdin` for `-`),
/// `{doc}` (document index) and `{index}` (running node count).
pub struct MultiFileWriter {
    directory: PathBuf,
    template: String,
    extension: String,
    index: usize,
    current: Option<BufWriter<File>>,
}

impl MultiFileWriter {
    pub fn new(directory: impl Into<PathBuf>, template: impl Into<String>, extension: impl Into<String>) -> Self {
        MultiFileWriter {
            directory: directory.into(),
            template: template.into(),
            extension: extension.into(),
            index: 0,
            current: None,
        }
    }

    fn file_name(&self, node: &CandidateNode) -> Result<String, WriterError> {
        let stem = match node.filename.as_str() {
            "" | "-" => "stdin".to_string(),
            name => Path::new(name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "stdin".to_string()),
        };
        let name = self
            .template
            .replace("{file}", &stem)
            .replace("{doc}", &node.document().to_string())
            .replace("{index}", &self.index.to_string());

        if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(WriterError::InvalidName(name));
        }
        if self.extension.is_empty() {
            Ok(name)
        } else {
            Ok(format!("{}.{}", name, self.extension))
        }
    }
}

impl PrinterWriter for MultiFileWriter {
    fn get_writer(&mut self, node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
        let node = match node {
            Some(node) => node,
            None => {
                let current = self.current.as_mut().ok_or(WriterError::NoDestination)?;
                return Ok(Box::new(current));
            }
        };

        if let Some(mut previous) = self.current.take() {
            previous.flush()?;
        }

        let path = self.directory.join(self.file_name(node)?);
        debug!(path = %path.display(), "opening split output file");
        let file = File::create(&path).map_err(|source| WriterError::Create { path, source })?;
        self.index += 1;
        let current = self.current.insert(BufWriter::new(file));
        Ok(Box::new(current))
    }
}

impl Drop for MultiFileWriter {
    fn drop(&mut self) {
        if let Some(current) = self.current.as_mut() {
            let _ = current.flush();
        }
    }
}
