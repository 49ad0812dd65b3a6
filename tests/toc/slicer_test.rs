use relmeta::toc::{
    slice_buffer, texts_match_ignoring_whitespace, MalformedSpan, MetadataEntry, ScriptBuffer, Toc,
};

const FOO: &str = "CREATE TABLE foo (i int);";
const BAR: &str = "CREATE TABLE bar (j int);";

fn table(start: u64, end: u64) -> MetadataEntry {
    MetadataEntry::new("schema", "name", "TABLE", start, end)
}

// ============================================================================
// slice_buffer
// ============================================================================

#[test]
fn test_one_item_slice() {
    let mut buffer = ScriptBuffer::new();
    let len = buffer.write_str(FOO);

    let sliced = slice_buffer(&[table(0, len)], &buffer);

    assert_eq!(sliced.remainder, "");
    assert_eq!(sliced.texts, vec![FOO]);
    assert!(sliced.warnings.is_empty());
}

#[test]
fn test_multi_item_slice() {
    let mut buffer = ScriptBuffer::new();
    let first = buffer.write_str(FOO);
    let second = buffer.write_str(BAR);

    let sliced = slice_buffer(&[table(0, first), table(first, first + second)], &buffer);

    assert_eq!(sliced.remainder, "");
    assert_eq!(sliced.texts, vec![FOO, BAR]);
}

#[test]
fn test_end_outside_buffer_is_truncated() {
    let mut buffer = ScriptBuffer::new();
    let len = buffer.write_str(FOO);

    let sliced = slice_buffer(&[table(0, len + 10)], &buffer);

    assert_eq!(sliced.remainder, "");
    assert_eq!(sliced.texts, vec![FOO]);
    assert_eq!(
        sliced.warnings,
        vec![MalformedSpan::EndBeyondBuffer {
            index: 0,
            fqn: "schema.name".into(),
            end_byte: len + 10,
            buffer_len: len,
        }]
    );
}

#[test]
fn test_start_outside_buffer_is_empty() {
    let mut buffer = ScriptBuffer::new();
    let len = buffer.write_str(FOO);

    let sliced = slice_buffer(&[table(0, len + 10), table(len + 10, len + 40)], &buffer);

    assert_eq!(sliced.remainder, "");
    assert_eq!(sliced.texts, vec![FOO, ""]);
    assert_eq!(sliced.warnings.len(), 2);
    assert!(matches!(
        sliced.warnings[1],
        MalformedSpan::StartBeyondBuffer { index: 1, .. }
    ));
}

#[test]
fn test_extra_buffer_contents_are_the_remainder() {
    let mut buffer = ScriptBuffer::new();
    let len = buffer.write_str(FOO);
    buffer.write_str("More extra stuff");

    let sliced = slice_buffer(&[table(0, len)], &buffer);

    assert_eq!(sliced.remainder, "More extra stuff");
}

#[test]
fn test_no_entries_leaves_whole_buffer() {
    let sliced = slice_buffer(&[], FOO);
    assert!(sliced.texts.is_empty());
    assert_eq!(sliced.remainder, FOO);
}

// ============================================================================
// Toc
// ============================================================================

#[test]
fn test_recorded_toc_reconstructs_buffer() {
    let mut buffer = ScriptBuffer::new();
    let mut toc = Toc::new();
    toc.record(&mut buffer, "public", "foo", "TABLE", FOO);
    toc.record(&mut buffer, "public", "Bar", "TABLE", BAR);
    toc.record(&mut buffer, "public", "empty", "COMMENT", "");

    let sliced = toc.slice(&buffer);

    assert_eq!(sliced.texts, vec![FOO, BAR, ""]);
    assert_eq!(sliced.texts.concat().as_bytes(), buffer.as_bytes());
    assert_eq!(toc.entries()[1].fqn(), "public.\"Bar\"");
    assert!(sliced.warnings.is_empty());
}

#[test]
fn test_toc_survives_json() {
    let mut buffer = ScriptBuffer::new();
    let mut toc = Toc::new();
    toc.record(&mut buffer, "public", "foo", "TABLE", FOO);

    let restored = Toc::from_json(&toc.to_json().unwrap()).unwrap();

    assert_eq!(restored.slice(&buffer), toc.slice(&buffer));
}

// ============================================================================
// texts_match_ignoring_whitespace
// ============================================================================

#[test]
fn test_equal_texts_match() {
    assert!(texts_match_ignoring_whitespace(&[FOO], &[FOO]));
}

#[test]
fn test_texts_equal_other_than_whitespace_match() {
    assert!(texts_match_ignoring_whitespace(
        &["\n\t  CREATE TABLE foo (i int);\n"],
        &[FOO]
    ));
}

#[test]
fn test_different_lengths_do_not_match() {
    let actual: [&str; 0] = [];
    assert!(!texts_match_ignoring_whitespace(&actual, &[FOO]));
}
