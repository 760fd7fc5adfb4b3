/// Integration tests for treeq-core
///
/// These tests drive the full pipeline:
/// 1. Decoding YAML/JSON input into nodes
/// 2. Printing through registry-built encoders
/// 3. Writing to in-memory and split-file destinations

use std::fs;
use std::io::Cursor;
use std::rc::Rc;

use tempfile::TempDir;
use treeq_core::encoder::Preferences;
use treeq_core::format::{self, JSON_OUTPUT_FORMAT, PROPS_OUTPUT_FORMAT, YAML_OUTPUT_FORMAT};
use treeq_core::{
    decode_documents, split_front_matter, CandidateNode, InMemorySink, MultiFileWriter,
    PrintError, ResultsPrinter,
};

fn printer_for(name: &str, prefs: &Preferences) -> (ResultsPrinter, InMemorySink) {
    let format = format::resolve(name).expect("known format");
    let encoder = format.construct(prefs).expect("format has an encoder");
    let sink = InMemorySink::new();
    (ResultsPrinter::new(encoder, Box::new(sink.clone())), sink)
}

/// Decode each source as its own file and print everything
fn convert(sources: &[&str], name: &str, prefs: &Preferences) -> String {
    let (mut printer, sink) = printer_for(name, prefs);
    for (file_index, source) in sources.iter().enumerate() {
        let nodes = decode_documents(source, file_index, "test.yaml").expect("valid input");
        printer.print_results(nodes).expect("printable");
    }
    sink.to_string_lossy()
}

#[test]
fn test_yaml_roundtrip_keeps_separators() {
    let input = "a: 1\n---\nb: 2\n";
    assert_eq!(convert(&[input], "yaml", &Preferences::new()), input);
}

#[test]
fn test_yaml_keeps_leading_comments() {
    let input = "# settings\nname: app\n---\n# second\nname: other\n";
    assert_eq!(convert(&[input], "y", &Preferences::new()), input);
}

#[test]
fn test_yaml_moves_comment_before_separator_below_it() {
    let input = "a: 1\n# about b\n---\nb: 2\n";
    assert_eq!(
        convert(&[input], "yaml", &Preferences::new()),
        "a: 1\n---\n# about b\nb: 2\n"
    );
}

#[test]
fn test_yaml_no_doc_separators() {
    let prefs = Preferences::new().with_doc_separators(false);
    assert_eq!(convert(&["a: 1\n---\nb: 2\n"], "yaml", &prefs), "a: 1\nb: 2\n");
}

#[test]
fn test_separator_between_files() {
    let out = convert(&["a: 1\n", "b: 2\n"], "yaml", &Preferences::new());
    assert_eq!(out, "a: 1\n---\nb: 2\n");
}

#[test]
fn test_json_output_has_no_separators() {
    let prefs = Preferences::new().with_indent(0);
    let out = convert(&["a: 1\n---\nb: [x, true]\n"], "json", &prefs);
    assert_eq!(out, "{\"a\":1}\n{\"b\":[\"x\",true]}\n");
}

#[test]
fn test_json_input_to_properties() {
    let out = convert(&["{\"app\": {\"ports\": [80, 443]}}\n"], "props", &Preferences::new());
    assert_eq!(out, "app.ports.0 = 80\napp.ports.1 = 443\n");
}

#[test]
fn test_csv_from_sequence_of_mappings() {
    let input = "- name: a\n  size: 1\n- name: b\n  size: 2\n";
    assert_eq!(convert(&[input], "csv", &Preferences::new()), "name,size\na,1\nb,2\n");
}

#[test]
fn test_front_matter_body_is_appended() {
    let source = "---\ntitle: Hello\ntags: [a, b]\n---\n# Heading\n\nSome *markdown*.\n";
    let front_matter = split_front_matter(source).unwrap();
    let (mut printer, sink) = printer_for("yaml", &Preferences::new());

    let nodes = decode_documents(&front_matter.header, 0, "post.md").unwrap();
    printer.set_appendix(Some(Box::new(Cursor::new(front_matter.body.into_bytes()))));
    printer.print_results(nodes).unwrap();

    assert_eq!(
        sink.to_string_lossy(),
        "---\ntitle: Hello\ntags:\n  - a\n  - b\n---\n# Heading\n\nSome *markdown*.\n"
    );
}

#[test]
fn test_nul_separated_scalars() {
    let prefs = Preferences::new().with_doc_separators(false);
    let (mut printer, sink) = printer_for("yaml", &prefs);
    printer.set_nul_sep_output(true);

    let nodes = decode_documents("first value\n---\nsecond\n", 0, "-").unwrap();
    printer.print_results(nodes).unwrap();
    assert_eq!(sink.contents(), b"first value\0second\0");
}

#[test]
fn test_nul_separated_rejects_embedded_nul() {
    let (mut printer, sink) = printer_for("yaml", &Preferences::new());
    printer.set_nul_sep_output(true);

    let err = printer
        .print_results(vec![CandidateNode::string("a\0b")])
        .unwrap_err();
    assert!(matches!(err, PrintError::NulInValue));
    assert!(sink.contents().is_empty());
}

#[test]
fn test_printed_anything_for_exit_status() {
    let (mut printer, _) = printer_for("yaml", &Preferences::new());
    printer
        .print_results(decode_documents("null\n---\nfalse\n", 0, "-").unwrap())
        .unwrap();
    assert!(!printer.printed_anything());

    printer
        .print_results(decode_documents("0\n", 1, "-").unwrap())
        .unwrap();
    assert!(printer.printed_anything());
}

#[test]
fn test_aliases_kept_in_yaml_exploded_in_json() {
    let base = Rc::new(
        CandidateNode::mapping(vec![(CandidateNode::string("x"), CandidateNode::int(1))])
            .with_anchor("b"),
    );
    let root = CandidateNode::mapping(vec![
        (CandidateNode::string("base"), (*base).clone()),
        (CandidateNode::string("copy"), CandidateNode::alias("b", base.clone())),
    ]);

    let (mut yaml, yaml_out) = printer_for("yaml", &Preferences::new());
    yaml.print_results(vec![root.clone()]).unwrap();
    assert_eq!(yaml_out.to_string_lossy(), "base: &b\n  x: 1\ncopy: *b\n");

    let (mut json, json_out) = printer_for("json", &Preferences::new().with_indent(0));
    json.print_results(vec![root]).unwrap();
    assert_eq!(json_out.to_string_lossy(), "{\"base\":{\"x\":1},\"copy\":{\"x\":1}}\n");
}

#[test]
fn test_split_into_files() {
    let dir = TempDir::new().unwrap();
    let prefs = Preferences::new().with_indent(0);
    let encoder = JSON_OUTPUT_FORMAT.construct(&prefs).unwrap();
    let writer = MultiFileWriter::new(dir.path(), "{file}_{doc}", JSON_OUTPUT_FORMAT.extension());
    let mut printer = ResultsPrinter::new(encoder, Box::new(writer));

    let nodes = decode_documents("a: 1\n---\nb: 2\n", 0, "data/input.yaml").unwrap();
    printer.print_results(nodes).unwrap();
    drop(printer);

    assert_eq!(fs::read_to_string(dir.path().join("input_0.json")).unwrap(), "{\"a\":1}\n");
    assert_eq!(fs::read_to_string(dir.path().join("input_1.json")).unwrap(), "{\"b\":2}\n");
}

#[test]
fn test_registry_aliases_share_descriptor() {
    assert!(std::ptr::eq(format::resolve("yml").unwrap(), &YAML_OUTPUT_FORMAT));
    assert!(std::ptr::eq(format::resolve("properties").unwrap(), &PROPS_OUTPUT_FORMAT));
    assert!(format::resolve("base64").is_err());
}
