//! Result printer
//!
//! Turns an ordered sequence of matched nodes into output. The printer keeps
//! state across calls so document separators are emitted only where the
//! document or file changes, and optionally frames every record with a NUL
//! byte instead of relying on line terminators.

use std::io::{self, BufReader, Read, Write};

use thiserror::Error;
use tracing::{debug, trace};

use crate::encoder::{EncodeError, Encoder};
use crate::explode::{AliasExploder, ExplodeError, Exploder};
use crate::node::CandidateNode;
use crate::writer::{PrinterWriter, WriterError};

/// Errors raised while printing results
#[derive(Error, Debug)]
pub enum PrintError {
    #[error(transparent)]
    Explode(#[from] ExplodeError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("can't serialize value because it contains NUL char and you are using NUL separated output")]
    NulInValue,
}

/// Bookkeeping carried from one `print_results` call to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterState {
    first_time: bool,
    previous_document: usize,
    previous_file_index: usize,
    printed_anything: bool,
}

impl PrinterState {
    pub fn new() -> Self {
        PrinterState {
            first_time: true,
            previous_document: 0,
            previous_file_index: 0,
            printed_anything: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take the document and file index from the first node ever printed
    pub fn prime(&mut self, node: &CandidateNode) {
        if self.first_time {
            self.previous_document = node.document();
            self.previous_file_index = node.file_index();
            self.first_time = false;
        }
    }

    /// Whether `node` starts a new document relative to what was printed last.
    ///
    /// Only the document index is tracked after priming; the file index is
    /// compared against the first node ever printed.
    pub fn crosses_boundary(&self, node: &CandidateNode) -> bool {
        self.previous_document != node.document() || self.previous_file_index != node.file_index()
    }

    pub fn printed_anything(&self) -> bool {
        self.printed_anything
    }
}

impl Default for PrinterState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ResultsPrinter {
    encoder: Box<dyn Encoder>,
    writer: Box<dyn PrinterWriter>,
    exploder: Box<dyn AliasExploder>,
    state: PrinterState,
    appendix: Option<Box<dyn Read>>,
    nul_sep_output: bool,
}

impl ResultsPrinter {
    pub fn new(encoder: Box<dyn Encoder>, writer: Box<dyn PrinterWriter>) -> Self {
        ResultsPrinter {
            encoder,
            writer,
            exploder: Box::new(Exploder::new()),
            state: PrinterState::new(),
            appendix: None,
            nul_sep_output: false,
        }
    }

    /// Replace the alias exploder used for encoders without alias support
    pub fn with_exploder(mut self, exploder: Box<dyn AliasExploder>) -> Self {
        self.exploder = exploder;
        self
    }

    /// Whether any printed node was something other than null or `false`
    pub fn printed_anything(&self) -> bool {
        self.state.printed_anything()
    }

    /// Stream copied verbatim after the results, e.g. the body following a
    /// front-matter header
    pub fn set_appendix(&mut self, appendix: Option<Box<dyn Read>>) {
        self.appendix = appendix;
    }

    pub fn set_nul_sep_output(&mut self, nul_sep_output: bool) {
        debug!(nul_sep_output, "setting NUL separator output");
        self.nul_sep_output = nul_sep_output;
    }

    /// Print one batch of matches
    pub fn print_results(&mut self, matches: Vec<CandidateNode>) -> Result<(), PrintError> {
        debug!(count = matches.len(), "printing results");

        if matches.is_empty() {
            debug!("no matching results, nothing to print");
        } else {
            let matches = if self.encoder.can_handle_aliases() {
                matches
            } else {
                self.exploder.explode(matches)?
            };

            if let Some(first) = matches.first() {
                self.state.prime(first);
            }

            for node in &matches {
                self.print_node(node)?;
            }
        }

        self.pipe_appendix()
    }

    fn print_node(&mut self, node: &CandidateNode) -> Result<(), PrintError> {
        let mut writer = self.writer.get_writer(Some(node))?;

        let needs_separator = self.state.crosses_boundary(node) && !node.starts_with_separator();
        trace!(
            document = node.document(),
            file_index = node.file_index(),
            previous_document = self.state.previous_document,
            needs_separator,
            "separator decision"
        );
        if needs_separator {
            self.encoder.print_document_separator(&mut *writer)?;
        }

        if self.nul_sep_output {
            let mut record = Vec::new();
            self.encoder.print_leading_content(&mut record, &node.leading_content)?;
            self.state.printed_anything |= node.counts_as_output();
            self.encoder.encode(&mut record, node)?;

            strip_last_eol(&mut record);
            if record.contains(&0) {
                return Err(PrintError::NulInValue);
            }
            writer.write_all(&record)?;
            writer.write_all(&[0])?;
        } else {
            self.encoder.print_leading_content(&mut *writer, &node.leading_content)?;
            self.state.printed_anything |= node.counts_as_output();
            self.encoder.encode(&mut *writer, node)?;
        }

        self.state.previous_document = node.document();
        writer.flush()?;
        Ok(())
    }

    fn pipe_appendix(&mut self) -> Result<(), PrintError> {
        let Some(appendix) = self.appendix.as_mut() else {
            return Ok(());
        };

        let mut writer = self.writer.get_writer(None)?;
        debug!("piping appendix");
        let mut reader = BufReader::new(appendix);
        let copied = io::copy(&mut reader, &mut writer)?;
        trace!(bytes = copied, "appendix piped");
        writer.flush()?;
        Ok(())
    }
}

/// Drop one trailing line terminator (`\r\n`, `\r` or `\n`)
pub fn strip_last_eol(buffer: &mut Vec<u8>) {
    if buffer.ends_with(b"\r\n") {
        buffer.truncate(buffer.len() - 2);
    } else if buffer.ends_with(b"\n") || buffer.ends_with(b"\r") {
        buffer.truncate(buffer.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{tags, DOC_SEPARATOR_SENTINEL};
    use crate::writer::InMemorySink;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.0.borrow_mut().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }

        fn count(&self, entry: &str) -> usize {
            self.0.borrow().iter().filter(|e| *e == entry).count()
        }
    }

    /// Writes values verbatim and logs every call
    struct RecordingEncoder {
        log: Log,
        aliases: bool,
    }

    impl Encoder for RecordingEncoder {
        fn encode(&self, writer: &mut dyn Write, node: &CandidateNode) -> Result<(), EncodeError> {
            self.log.push(format!("encode {}", node.value));
            writer.write_all(node.value.as_bytes())?;
            Ok(())
        }

        fn print_document_separator(&self, writer: &mut dyn Write) -> Result<(), EncodeError> {
            self.log.push("separator");
            writer.write_all(b"---\n")?;
            Ok(())
        }

        fn print_leading_content(&self, writer: &mut dyn Write, content: &str) -> Result<(), EncodeError> {
            writer.write_all(content.as_bytes())?;
            Ok(())
        }

        fn can_handle_aliases(&self) -> bool {
            self.aliases
        }
    }

    struct RecordingWriter {
        log: Log,
        sink: InMemorySink,
    }

    impl PrinterWriter for RecordingWriter {
        fn get_writer(&mut self, node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
            match node {
                Some(node) => self.log.push(format!("writer {}", node.value)),
                None => self.log.push("writer appendix"),
            }
            Ok(Box::new(self.sink.clone()))
        }
    }

    /// Hands out `remaining` sinks, then fails
    struct ExhaustedWriter {
        log: Log,
        sink: InMemorySink,
        remaining: usize,
    }

    impl PrinterWriter for ExhaustedWriter {
        fn get_writer(&mut self, node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
            if self.remaining == 0 {
                return Err(WriterError::NoDestination);
            }
            self.remaining -= 1;
            if let Some(node) = node {
                self.log.push(format!("writer {}", node.value));
            }
            Ok(Box::new(self.sink.clone()))
        }
    }

    /// A closed pipe: flushing always fails, writing fails when `fail_write` is set
    struct ClosedPipe {
        fail_write: bool,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_write {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    struct ClosedPipeWriter {
        log: Log,
        fail_write: bool,
    }

    impl PrinterWriter for ClosedPipeWriter {
        fn get_writer(&mut self, node: Option<&CandidateNode>) -> Result<Box<dyn Write + '_>, WriterError> {
            if let Some(node) = node {
                self.log.push(format!("writer {}", node.value));
            }
            Ok(Box::new(ClosedPipe {
                fail_write: self.fail_write,
            }))
        }
    }

    struct RecordingExploder {
        log: Log,
    }

    impl AliasExploder for RecordingExploder {
        fn explode(&self, nodes: Vec<CandidateNode>) -> Result<Vec<CandidateNode>, ExplodeError> {
            self.log.push("explode");
            Exploder::new().explode(nodes)
        }
    }

    fn printer(aliases: bool) -> (ResultsPrinter, Log, InMemorySink) {
        let log = Log::default();
        let sink = InMemorySink::new();
        let printer = ResultsPrinter::new(
            Box::new(RecordingEncoder {
                log: log.clone(),
                aliases,
            }),
            Box::new(RecordingWriter {
                log: log.clone(),
                sink: sink.clone(),
            }),
        )
        .with_exploder(Box::new(RecordingExploder { log: log.clone() }));
        (printer, log, sink)
    }

    fn printer_with_writer(writer: impl FnOnce(Log) -> Box<dyn PrinterWriter>) -> (ResultsPrinter, Log) {
        let log = Log::default();
        let printer = ResultsPrinter::new(
            Box::new(RecordingEncoder {
                log: log.clone(),
                aliases: true,
            }),
            writer(log.clone()),
        );
        (printer, log)
    }

    fn node(value: &str, document: usize, file_index: usize) -> CandidateNode {
        CandidateNode::string(value)
            .with_document(document)
            .with_file_index(file_index)
    }

    #[test]
    fn test_same_document_no_separator() {
        let (mut printer, log, sink) = printer(true);
        printer.print_results(vec![node("a", 0, 0), node("b", 0, 0)]).unwrap();
        assert_eq!(log.count("separator"), 0);
        assert_eq!(sink.to_string_lossy(), "ab");
    }

    #[test]
    fn test_separator_between_documents() {
        let (mut printer, log, sink) = printer(true);
        printer
            .print_results(vec![node("a\n", 0, 0), node("b\n", 1, 0)])
            .unwrap();
        assert_eq!(log.count("separator"), 1);
        assert_eq!(sink.to_string_lossy(), "a\n---\nb\n");
    }

    #[test]
    fn test_separator_count_follows_transitions() {
        let (mut printer, log, _) = printer(true);
        printer
            .print_results(vec![
                node("a", 0, 0),
                node("b", 0, 0),
                node("c", 1, 0),
                node("d", 1, 0),
                node("e", 0, 0),
            ])
            .unwrap();
        assert_eq!(log.count("separator"), 2);
    }

    #[test]
    fn test_file_index_compared_against_first_node() {
        let (mut printer, log, _) = printer(true);
        printer
            .print_results(vec![node("a", 0, 0), node("b", 0, 1), node("c", 0, 1)])
            .unwrap();
        // the file index is never updated after priming
        assert_eq!(log.count("separator"), 2);
    }

    #[test]
    fn test_sentinel_suppresses_separator() {
        let (mut printer, log, sink) = printer(true);
        let second = node("b", 1, 0).with_leading_content(format!("{}\n", DOC_SEPARATOR_SENTINEL));
        printer.print_results(vec![node("a", 0, 0), second]).unwrap();
        assert_eq!(log.count("separator"), 0);
        assert_eq!(sink.to_string_lossy(), format!("a{}\nb", DOC_SEPARATOR_SENTINEL));
    }

    #[test]
    fn test_state_persists_across_calls() {
        let (mut printer, log, _) = printer(true);
        printer.print_results(vec![node("a", 0, 0)]).unwrap();
        printer.print_results(vec![node("b", 0, 0)]).unwrap();
        assert_eq!(log.count("separator"), 0);
        printer.print_results(vec![node("c", 1, 0)]).unwrap();
        assert_eq!(log.count("separator"), 1);
    }

    #[test]
    fn test_printed_anything() {
        let (mut printer, _, _) = printer(true);
        printer
            .print_results(vec![CandidateNode::null(), CandidateNode::boolean(false)])
            .unwrap();
        assert!(!printer.printed_anything());

        printer.print_results(vec![CandidateNode::scalar(tags::BOOL, "true")]).unwrap();
        assert!(printer.printed_anything());
    }

    #[test]
    fn test_nul_output_strips_one_line_ending() {
        let (mut printer, _, sink) = printer(true);
        printer.set_nul_sep_output(true);
        printer
            .print_results(vec![node("value\r\n", 0, 0), node("two\n\n", 0, 0), node("three", 0, 0)])
            .unwrap();
        assert_eq!(sink.contents(), b"value\0two\n\0three\0");
    }

    #[test]
    fn test_nul_output_separator_outside_record() {
        let (mut printer, _, sink) = printer(true);
        printer.set_nul_sep_output(true);
        printer.print_results(vec![node("a\n", 0, 0), node("b\n", 1, 0)]).unwrap();
        assert_eq!(sink.contents(), b"a\0---\nb\0");
    }

    #[test]
    fn test_nul_in_value_fails() {
        let (mut printer, log, sink) = printer(true);
        printer.set_nul_sep_output(true);
        let err = printer
            .print_results(vec![node("ok", 0, 0), node("x\0y", 0, 0), node("never", 0, 0)])
            .unwrap_err();

        assert!(matches!(err, PrintError::NulInValue));
        assert_eq!(
            err.to_string(),
            "can't serialize value because it contains NUL char and you are using NUL separated output"
        );
        assert_eq!(sink.contents(), b"ok\0");
        assert!(!log.entries().iter().any(|e| e.contains("never")));
    }

    #[test]
    fn test_nul_allowed_without_nul_mode() {
        let (mut printer, _, sink) = printer(true);
        printer.print_results(vec![node("x\0y", 0, 0)]).unwrap();
        assert_eq!(sink.contents(), b"x\0y");
    }

    #[test]
    fn test_empty_matches_without_appendix() {
        let (mut printer, log, sink) = printer(false);
        printer.print_results(vec![]).unwrap();
        assert!(log.entries().is_empty());
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_empty_matches_still_pipe_appendix() {
        let (mut printer, log, sink) = printer(true);
        printer.set_appendix(Some(Box::new(Cursor::new(b"body text\n".to_vec()))));
        printer.print_results(vec![]).unwrap();
        assert_eq!(log.entries(), vec!["writer appendix"]);
        assert_eq!(sink.to_string_lossy(), "body text\n");
    }

    #[test]
    fn test_appendix_consumed_once() {
        let (mut printer, log, sink) = printer(true);
        printer.set_appendix(Some(Box::new(Cursor::new(b"tail".to_vec()))));
        printer.print_results(vec![node("a", 0, 0)]).unwrap();
        printer.print_results(vec![node("b", 0, 0)]).unwrap();
        assert_eq!(sink.to_string_lossy(), "atailb");
        assert_eq!(log.count("writer appendix"), 2);
    }

    #[test]
    fn test_explode_before_any_writer() {
        let (mut printer, log, _) = printer(false);
        printer.print_results(vec![node("a", 0, 0), node("b", 0, 0)]).unwrap();
        let entries = log.entries();
        assert_eq!(entries[0], "explode");
        assert_eq!(log.count("explode"), 1);
        assert_eq!(entries[1], "writer a");
    }

    #[test]
    fn test_alias_capable_encoder_skips_explode() {
        let (mut printer, log, _) = printer(true);
        printer.print_results(vec![node("a", 0, 0)]).unwrap();
        assert_eq!(log.count("explode"), 0);
    }

    #[test]
    fn test_explode_error_propagates() {
        let (mut printer, log, _) = printer(false);
        let bad = CandidateNode::mapping(vec![(
            CandidateNode::scalar(tags::MERGE, "<<"),
            CandidateNode::int(1),
        )]);
        let err = printer.print_results(vec![bad]).unwrap_err();
        assert!(matches!(err, PrintError::Explode(ExplodeError::InvalidMerge)));
        assert_eq!(log.entries(), vec!["explode"]);
    }

    #[test]
    fn test_writer_error_stops_printing() {
        let sink = InMemorySink::new();
        let (mut printer, log) = printer_with_writer(|log| {
            Box::new(ExhaustedWriter {
                log,
                sink: sink.clone(),
                remaining: 1,
            })
        });
        let err = printer
            .print_results(vec![node("a", 0, 0), node("b", 0, 0), node("c", 0, 0)])
            .unwrap_err();

        assert!(matches!(err, PrintError::Writer(WriterError::NoDestination)));
        assert_eq!(err.to_string(), "no output file has been opened yet");
        assert_eq!(log.entries(), vec!["writer a", "encode a"]);
        assert_eq!(sink.to_string_lossy(), "a");
    }

    #[test]
    fn test_write_error_stops_printing() {
        let (mut printer, log) = printer_with_writer(|log| {
            Box::new(ClosedPipeWriter {
                log,
                fail_write: true,
            })
        });
        let err = printer
            .print_results(vec![node("a", 0, 0), node("b", 0, 0)])
            .unwrap_err();

        match err {
            PrintError::Encode(EncodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(log.entries(), vec!["writer a", "encode a"]);
    }

    #[test]
    fn test_flush_error_stops_printing() {
        let (mut printer, log) = printer_with_writer(|log| {
            Box::new(ClosedPipeWriter {
                log,
                fail_write: false,
            })
        });
        let err = printer
            .print_results(vec![node("a", 0, 0), node("b", 0, 0)])
            .unwrap_err();

        match err {
            PrintError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(log.entries(), vec!["writer a", "encode a"]);
    }

    #[test]
    fn test_nul_mode_write_error_is_io() {
        let (mut printer, log) = printer_with_writer(|log| {
            Box::new(ClosedPipeWriter {
                log,
                fail_write: true,
            })
        });
        printer.set_nul_sep_output(true);
        let err = printer.print_results(vec![node("a", 0, 0), node("b", 0, 0)]).unwrap_err();

        assert!(matches!(err, PrintError::Io(_)));
        assert_eq!(log.count("encode b"), 0);
    }

    #[test]
    fn test_state_reset() {
        let mut state = PrinterState::new();
        state.prime(&node("a", 4, 2));
        assert!(!state.crosses_boundary(&node("b", 4, 2)));
        assert!(state.crosses_boundary(&node("c", 4, 3)));
        state.reset();
        assert_eq!(state, PrinterState::default());
    }

    #[test]
    fn test_strip_last_eol() {
        fn stripped(input: &[u8]) -> Vec<u8> {
            let mut buffer = input.to_vec();
            strip_last_eol(&mut buffer);
            buffer
        }
        assert_eq!(stripped(b"a\r\n"), b"a");
        assert_eq!(stripped(b"a\n\n"), b"a\n");
        assert_eq!(stripped(b"a\r"), b"a");
        assert_eq!(stripped(b"a\n\r"), b"a\n");
        assert_eq!(stripped(b"a"), b"a");
        assert!(stripped(b"").is_empty());
    }
}
