use super::{Document, LoadOptions};
use crate::catalog::{AllowlistPolicy, Catalog};
use crate::encoding::TextEncoding;
use crate::error::EditorError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_sjis(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    let bytes = TextEncoding::shift_jis().encode(text).unwrap();
    fs::write(&path, &bytes).unwrap();
    path
}

fn permissive() -> LoadOptions {
    LoadOptions {
        catalog: Catalog::new(AllowlistPolicy::Permissive),
        ..LoadOptions::default()
    }
}

const WING_TAIL: &str = "[S1]\r\nPartsName=Wing\r\nWeight=10\r\n\r\n[S2]\r\nPartsName=Tail\r\nWeight=5\r\n";

#[test]
fn test_end_to_end_label_and_edit() {
    let dir = TempDir::new().unwrap();
    let path = write_sjis(dir.path(), "Head.txt", WING_TAIL);

    let mut doc = Document::load(&path, &LoadOptions::default()).unwrap();
    let labels: Vec<&str> = doc
        .display_labels()
        .iter()
        .map(|l| l.label.as_str())
        .collect();
    assert_eq!(labels, ["S1: Wing", "S2: Tail"]);

    let written = doc.set_value_and_persist("S1", "Weight", "12").unwrap();
    assert_eq!(written, "12");

    let reloaded = Document::load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.value("S1", "Weight").unwrap(), Some("12"));
    assert_eq!(reloaded.value("S1", "PartsName").unwrap(), Some("Wing"));
    assert_eq!(reloaded.section("S2"), doc.section("S2"));
    assert_eq!(reloaded.value("S2", "Weight").unwrap(), Some("5"));

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Weight=12\r\n"), "S1 should read Weight=12: {raw:?}");
}

#[test]
fn test_duplicate_keys_first_wins() {
    let text = "[S]\nK=v1\nk=v2\nK=v3\nOther=x\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    let section = doc.section("S").unwrap();
    assert_eq!(section.entries.len(), 2);
    assert_eq!(section.entries[0].key, "K");
    assert_eq!(section.entries[0].value, "v1");
    assert_eq!(section.get("k"), Some("v1"));
}

#[test]
fn test_repeated_header_merges_into_first() {
    let text = "[A]\nx=1\n[B]\ny=2\n[A]\nX=9\nz=3\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    let names: Vec<&str> = doc.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    let a = doc.section("A").unwrap();
    assert_eq!(a.get("x"), Some("1"));
    assert_eq!(a.get("z"), Some("3"));
}

#[test]
fn test_section_cap_keeps_leading_sections() {
    let dir = TempDir::new().unwrap();
    let mut text = String::new();
    for i in 0..20 {
        write!(text, "[OP{i:02}]\r\nPartsName=Part{i}\r\n").unwrap();
    }
    let path = write_sjis(dir.path(), "Option.txt", &text);

    let doc = Document::load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(doc.sections().len(), 16, "Option.txt is capped at 16");
    assert_eq!(doc.sections()[0].name, "OP00");
    assert_eq!(doc.sections()[15].name, "OP15");
    assert!(doc.section("OP16").is_none());
}

#[test]
fn test_sections_past_cap_survive_an_edit() {
    let dir = TempDir::new().unwrap();
    let mut text = String::new();
    for i in 0..20 {
        write!(text, "[OP{i:02}]\r\nPartsName=Part{i}\r\n").unwrap();
    }
    let path = write_sjis(dir.path(), "Option.txt", &text);

    let mut doc = Document::load(&path, &LoadOptions::default()).unwrap();
    assert!(matches!(
        doc.set_value_and_persist("OP19", "PartsName", "X"),
        Err(EditorError::UnresolvedSection { .. })
    ));
    doc.set_value_and_persist("OP00", "PartsName", "X").unwrap();

    let bytes = fs::read(&path).unwrap();
    let saved = TextEncoding::shift_jis().decode(&bytes).unwrap();
    let uncapped = Document::parse(&path, &saved, TextEncoding::shift_jis(), None).unwrap();
    assert_eq!(uncapped.sections().len(), 20, "hidden sections must stay on disk");
    assert_eq!(uncapped.value("OP00", "PartsName").unwrap(), Some("X"));
    assert_eq!(uncapped.value("OP19", "PartsName").unwrap(), Some("Part19"));
}

#[test]
fn test_cap_larger_than_file_keeps_everything() {
    let doc =
        Document::parse(Path::new("x.txt"), WING_TAIL, TextEncoding::shift_jis(), Some(5)).unwrap();
    assert_eq!(doc.sections().len(), 2);
}

#[test]
fn test_bare_keys_and_colon_separator() {
    let text = "[S]\nFlag\nName: Zero\nPath=a:b\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    assert_eq!(doc.value("S", "Flag").unwrap(), Some(""));
    assert_eq!(doc.value("S", "Name").unwrap(), Some("Zero"));
    assert_eq!(doc.value("S", "Path").unwrap(), Some("a:b"));
}

#[test]
fn test_header_ignores_trailing_text() {
    let text = "[S] ; note\nWeight=1\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    let names: Vec<&str> = doc.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["S"]);
    assert_eq!(doc.value("S", "Weight").unwrap(), Some("1"));
}

#[test]
fn test_empty_sections_are_written_back() {
    let doc = Document::parse(
        Path::new("x.txt"),
        "[T]\n[S]\nA=1\n",
        TextEncoding::shift_jis(),
        None,
    )
    .unwrap();
    let text = doc.to_text().unwrap();
    assert!(text.trim_start().starts_with("[T]\r\n"), "empty header dropped: {text:?}");

    let again = Document::parse(Path::new("x.txt"), &text, TextEncoding::shift_jis(), None).unwrap();
    assert_eq!(again.sections(), doc.sections());

    let lone = Document::parse(Path::new("x.txt"), "[E]\n", TextEncoding::shift_jis(), None).unwrap();
    assert_eq!(lone.to_text().unwrap().trim(), "[E]");
}

#[test]
fn test_missing_parts_name_falls_back() {
    let text = "[S1]\nWeight=1\n[S2]\nPartsName=\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    let labels: Vec<&str> = doc
        .display_labels()
        .iter()
        .map(|l| l.label.as_str())
        .collect();
    assert_eq!(labels, ["S1: Unknown", "S2: Unknown"]);
}

#[test]
fn test_label_collision_keeps_sections_apart() {
    // both sections render as "A: B: C"
    let text = "[A]\nPartsName=B: C\nWeight=1\n[A: B]\nPartsName=C\nWeight=2\n";
    let doc = Document::parse(Path::new("x.txt"), text, TextEncoding::shift_jis(), None).unwrap();

    let labels = doc.display_labels();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].label, labels[1].label);
    assert_eq!(labels[0].section, "A");
    assert_eq!(labels[1].section, "A: B");

    assert_eq!(doc.value(&labels[1].section, "Weight").unwrap(), Some("2"));
    assert!(matches!(
        doc.resolve("A: B: C"),
        Err(EditorError::UnresolvedSection { .. })
    ));
}

#[test]
fn test_resolve_by_unique_label() {
    let doc =
        Document::parse(Path::new("x.txt"), WING_TAIL, TextEncoding::shift_jis(), None).unwrap();
    assert_eq!(doc.resolve("S2: Tail").unwrap().name, "S2");
    assert_eq!(doc.value("S2: Tail", "weight").unwrap(), Some("5"));
}

#[test]
fn test_missing_key_is_empty_missing_section_is_error() {
    let doc =
        Document::parse(Path::new("x.txt"), WING_TAIL, TextEncoding::shift_jis(), None).unwrap();
    assert_eq!(doc.value("S1", "Armor").unwrap(), None);
    assert!(matches!(
        doc.value("S9", "Weight"),
        Err(EditorError::UnresolvedSection { .. })
    ));
}

#[test]
fn test_round_trip_without_edits() {
    let dir = TempDir::new().unwrap();
    let text = "Version=3\r\n[S1]\r\nPartsName=ヘッド\r\nWeight=10\r\nFlag=\r\n[Empty]\r\n[S2]\r\nPartsName=Tail\r\n";
    let path = write_sjis(dir.path(), "Head.txt", text);

    let doc = Document::load(&path, &LoadOptions::default()).unwrap();
    doc.save().unwrap();
    let reloaded = Document::load(&path, &LoadOptions::default()).unwrap();

    assert_eq!(reloaded.sections(), doc.sections());
    assert_eq!(reloaded.value("S1", "PartsName").unwrap(), Some("ヘッド"));
    assert_eq!(reloaded.display_labels()[0].label, "S1: ヘッド");
    assert!(reloaded.to_text().unwrap().starts_with("Version=3"));
}

#[test]
fn test_idempotent_edit() {
    let dir = TempDir::new().unwrap();
    let path = write_sjis(dir.path(), "Head.txt", WING_TAIL);

    let mut doc = Document::load(&path, &LoadOptions::default()).unwrap();
    let before = doc.sections().to_vec();
    doc.set_value_and_persist("S2", "Weight", "5").unwrap();

    let reloaded = Document::load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.sections(), before.as_slice());
}

#[test]
fn test_invalid_edit_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let path = write_sjis(dir.path(), "Head.txt", WING_TAIL);
    let before = fs::read(&path).unwrap();

    let mut doc = Document::load(&path, &LoadOptions::default()).unwrap();
    for (section, key, value) in [
        ("S1", "Weight", ""),
        ("S1", "", "12"),
        ("", "Weight", "12"),
        ("S1", "Weight", "1\n2"),
        ("S1", "We=ight", "12"),
    ] {
        assert!(
            matches!(
                doc.set_value_and_persist(section, key, value),
                Err(EditorError::InvalidEdit)
            ),
            "{section:?}/{key:?}/{value:?} should be rejected"
        );
    }

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(doc.value("S1", "Weight").unwrap(), Some("10"));
}

#[test]
fn test_new_key_is_appended_and_casing_kept() {
    let mut doc =
        Document::parse(Path::new("x.txt"), WING_TAIL, TextEncoding::shift_jis(), None).unwrap();
    doc.set_value("S1", "weight", "11").unwrap();
    doc.set_value("S1", "Armor", "300").unwrap();

    let keys: Vec<&str> = doc.section("S1").unwrap().keys().collect();
    assert_eq!(keys, ["PartsName", "Weight", "Armor"]);
    assert_eq!(doc.value("S1", "WEIGHT").unwrap(), Some("11"));
}

#[test]
fn test_edit_refreshes_label() {
    let mut doc =
        Document::parse(Path::new("x.txt"), WING_TAIL, TextEncoding::shift_jis(), None).unwrap();
    doc.set_value("S1", "PartsName", "Canard").unwrap();
    assert_eq!(doc.display_labels()[0].label, "S1: Canard");
}

#[test]
fn test_malformed_bytes_are_an_encoding_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Head.txt");
    // 0x82 is a lead byte; 0x20 cannot follow it
    fs::write(&path, b"[S1]\r\nPartsName=\x82\x20\r\n").unwrap();

    assert!(matches!(
        Document::load(&path, &LoadOptions::default()),
        Err(EditorError::Encoding { .. })
    ));
}

#[test]
fn test_missing_file_is_an_access_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Head.txt");
    assert!(matches!(
        Document::load(&path, &LoadOptions::default()),
        Err(EditorError::FileAccess { .. })
    ));
}

#[test]
fn test_unrecognized_file_depends_on_policy() {
    let dir = TempDir::new().unwrap();
    let path = write_sjis(dir.path(), "notes.txt", WING_TAIL);

    assert!(matches!(
        Document::load(&path, &LoadOptions::default()),
        Err(EditorError::UnrecognizedFile { .. })
    ));
    let doc = Document::load(&path, &permissive()).unwrap();
    assert_eq!(doc.sections().len(), 2);
}

#[test]
fn test_unmappable_value_is_a_write_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_sjis(dir.path(), "Head.txt", WING_TAIL);
    let before = fs::read(&path).unwrap();

    let mut doc = Document::load(&path, &LoadOptions::default()).unwrap();
    let result = doc.set_value_and_persist("S1", "PartsName", "Wing 🚀");

    assert!(matches!(result, Err(EditorError::WriteFailure { .. })));
    assert_eq!(fs::read(&path).unwrap(), before);
}
