//! Tests for CSV input parsing.

use std::io::Write;

use pcq::error::Error;
use pcq::input::{Record, parse_items, parse_line, parse_records, read_items, read_records};
use pcq::model::{LaneKind, QueueItem};

#[test]
fn parses_both_kinds_in_order() {
    let items = parse_items("file,row1\nConsole,hello\nFILE,row2\n").unwrap();
    assert_eq!(
        items,
        vec![
            QueueItem::file("row1"),
            QueueItem::console("hello"),
            QueueItem::file("row2"),
        ]
    );
    assert_eq!(items[1].lane(), LaneKind::Console);
}

#[test]
fn skips_blank_lines_empty_and_unknown_types() {
    let items = parse_items("\n,orphan\nprinter,page\nconsole,ok\n").unwrap();
    assert_eq!(items, vec![QueueItem::console("ok")]);
}

#[test]
fn unknown_types_are_kept_as_records() {
    let records = parse_records("\n,orphan\nprinter,page\nconsole,ok\n").unwrap();
    assert_eq!(
        records,
        vec![
            Record::Unknown {
                line: 3,
                kind: "printer".to_string(),
            },
            Record::Item(QueueItem::console("ok")),
        ]
    );
}

#[test]
fn only_the_second_field_is_the_payload() {
    let item = parse_line(1, "file,a,b,c").unwrap().unwrap();
    assert_eq!(item, QueueItem::file("a"));
}

#[test]
fn line_without_comma_is_an_error() {
    match parse_items("console,ok\njustonefield\n") {
        Err(Error::Input { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected input error, got {other:?}"),
    }
}

#[test]
fn reads_items_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "file,one").unwrap();
    writeln!(file, "console,two").unwrap();

    writeln!(file, "fax,three").unwrap();

    assert_eq!(read_records(file.path()).unwrap().len(), 3);
    assert_eq!(read_items(file.path()).unwrap().len(), 2);
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_items(&dir.path().join("nope.csv"));
    assert!(matches!(result, Err(Error::Config(_))));
}
