use std::path::{Path, PathBuf};
use tagsplit_core::{
    Command, ConfigStore, CoreError, Outcome, RuleDraft, Session, Settings, ValidationError,
};
use tagsplit_sheet::{Book, Sheet};
use tempfile::{tempdir, TempDir};

fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut book = Book::new();
    book.add_sheet(
        "Products",
        Sheet::from_data(vec![
            vec!["Item", "Tags", "Price"],
            vec!["lamp", "red, metal", "10"],
            vec!["chair", "blue,\nwood", "25"],
            vec!["stool", "", "8"],
            vec!["desk", "red, blue, wood", "99"],
        ]),
    )
    .unwrap();
    book.save(&path).unwrap();
    path
}

fn session_in(dir: &TempDir) -> Session {
    let settings = Settings::default().with_config_path(dir.path().join("config.json"));
    Session::new(settings)
}

fn validation(err: CoreError) -> ValidationError {
    match err {
        CoreError::Validation(e) => e,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ===== Selection =====

#[test]
fn test_select_column_classifies_tags() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);

    session.apply(Command::OpenWorkbook(input)).unwrap();
    assert_eq!(session.columns(), vec!["A", "B", "C"]);
    assert_eq!(session.headers(), vec!["Item", "Tags", "Price"]);

    let outcome = session.apply(Command::SelectColumn("b".to_string())).unwrap();
    assert_eq!(
        outcome,
        Outcome::ColumnSelected {
            letter: "B".to_string(),
            new_tags: 4,
            known_unused: 0,
        }
    );
    assert_eq!(session.pending_new(), ["blue", "metal", "red", "wood"]);
    assert_eq!(session.selected_column().as_deref(), Some("B"));
}

#[test]
fn test_select_column_out_of_range() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();

    for letter in ["D", "", "1"] {
        let err = session
            .apply(Command::SelectColumn(letter.to_string()))
            .unwrap_err();
        assert!(matches!(
            validation(err),
            ValidationError::InvalidColumn { last, .. } if last == "C"
        ));
    }
    assert!(session.selected_column().is_none());
}

#[test]
fn test_commands_need_a_workbook_and_column() {
    let dir = tempdir().unwrap();
    let mut session = session_in(&dir);

    let err = session.apply(Command::SelectColumn("A".to_string())).unwrap_err();
    assert_eq!(validation(err), ValidationError::NoWorkbook);
    let err = session.apply(Command::SaveSession).unwrap_err();
    assert_eq!(validation(err), ValidationError::NoWorkbook);

    let input = write_input(dir.path(), "products.xlsx");
    session.apply(Command::OpenWorkbook(input)).unwrap();
    let err = session.apply(Command::SaveSession).unwrap_err();
    assert_eq!(validation(err), ValidationError::NoColumnSelected);
}

#[test]
fn test_select_tag_toggles() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();

    session.apply(Command::SelectTag("red".to_string())).unwrap();
    assert_eq!(session.selected_tag(), Some("red"));
    let outcome = session.apply(Command::SelectTag("red".to_string())).unwrap();
    assert_eq!(outcome, Outcome::TagSelected(None));
    assert_eq!(session.selected_tag(), None);

    let err = session
        .apply(Command::SelectTag("ghost".to_string()))
        .unwrap_err();
    assert_eq!(
        validation(err),
        ValidationError::TagNotAvailable("ghost".to_string())
    );
}

#[test]
fn test_assign_requires_selection() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();
    session
        .apply(Command::EditRule(RuleDraft::create("Color", "none", "[all]")))
        .unwrap();

    let err = session
        .apply(Command::AssignTag {
            rule: "Color".to_string(),
        })
        .unwrap_err();
    assert_eq!(validation(err), ValidationError::NoTagSelected);
}

// ===== End to end =====

#[test]
fn test_full_session_writes_output_and_config() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();

    session
        .apply(Command::EditRule(RuleDraft::create("Color", "none", "[all]")))
        .unwrap();
    session
        .apply(Command::EditRule(RuleDraft::create("material", "?", "mixed")))
        .unwrap();
    for (tag, rule) in [("red", "Color"), ("blue", "Color"), ("wood", "material")] {
        session.apply(Command::SelectTag(tag.to_string())).unwrap();
        session
            .apply(Command::AssignTag {
                rule: rule.to_string(),
            })
            .unwrap();
    }
    assert_eq!(session.pending_new(), ["metal"]);

    let outcome = session.apply(Command::SaveSession).unwrap();
    let output = dir.path().join("products_updated.xlsx");
    assert_eq!(
        outcome,
        Outcome::Saved {
            output: output.clone(),
            rows: 3,
        }
    );

    let book = Book::open(&output).unwrap();
    let sheet = book.get_sheet_by_index(0).unwrap();
    assert_eq!(sheet.name(), "Products");
    let header: Vec<String> = sheet.row(0).unwrap().iter().map(|c| c.as_str()).collect();
    assert_eq!(header, vec!["Item", "Tags", "Color", "material", "Price"]);
    assert_eq!(sheet.cell(1, 2).as_str(), "red");
    assert_eq!(sheet.cell(1, 3).as_str(), "?");
    assert_eq!(sheet.cell(2, 2).as_str(), "blue");
    assert_eq!(sheet.cell(2, 3).as_str(), "wood");
    assert!(sheet.cell(3, 2).is_blank());
    assert_eq!(sheet.cell(4, 2).as_str(), "blue, red");
    assert_eq!(sheet.cell(4, 4).as_str(), "99");

    // unassigned new tags are remembered as known
    let stored = ConfigStore::new(dir.path().join("config.json")).load().unwrap();
    assert!(stored.unused().contains("metal"));
    assert_eq!(stored.rules().names(), vec!["Color", "material"]);
    assert!(session.pending_new().is_empty());
    assert_eq!(session.known_unused(), ["metal"]);
}

#[test]
fn test_saving_twice_does_not_duplicate_columns() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();
    session
        .apply(Command::EditRule(RuleDraft::create("Color", "none", "[all]")))
        .unwrap();

    session.apply(Command::SaveSession).unwrap();
    session.apply(Command::SaveSession).unwrap();

    let book = Book::open(dir.path().join("products_updated.xlsx")).unwrap();
    assert_eq!(book.get_sheet_by_index(0).unwrap().col_count(), 4);
}

#[test]
fn test_next_session_sees_known_tags() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");

    let mut first = session_in(&dir);
    first.apply(Command::OpenWorkbook(input.clone())).unwrap();
    first.apply(Command::SelectColumn("B".to_string())).unwrap();
    first
        .apply(Command::EditRule(RuleDraft::create("Color", "none", "[all]")))
        .unwrap();
    first.apply(Command::SelectTag("red".to_string())).unwrap();
    first
        .apply(Command::AssignTag {
            rule: "Color".to_string(),
        })
        .unwrap();
    first.apply(Command::SaveSession).unwrap();

    let mut second = session_in(&dir);
    second.apply(Command::OpenWorkbook(input)).unwrap();
    second.apply(Command::SelectColumn("B".to_string())).unwrap();
    assert!(second.pending_new().is_empty());
    assert_eq!(second.known_unused(), ["blue", "metal", "wood"]);

    // deleting the rule sends its known tag back to unused
    second.apply(Command::DeleteRule("Color".to_string())).unwrap();
    assert!(second.universe().unused().contains("red"));
    assert_eq!(second.known_unused(), ["blue", "metal", "red", "wood"]);
}

#[test]
fn test_csv_session() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.csv");
    std::fs::write(&input, "Name,Tags\nlamp,\"red, metal\"\nchair,wood\n").unwrap();

    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();
    session
        .apply(Command::EditRule(RuleDraft::create("Material", "", "N/A")))
        .unwrap();
    for tag in ["metal", "wood"] {
        session.apply(Command::SelectTag(tag.to_string())).unwrap();
        session
            .apply(Command::AssignTag {
                rule: "Material".to_string(),
            })
            .unwrap();
    }
    session.apply(Command::SaveSession).unwrap();

    let written = std::fs::read_to_string(dir.path().join("list_updated.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "Name,Tags,Material");
    assert_eq!(lines[1], "lamp,\"red, metal\",metal");
    assert_eq!(lines[2], "chair,wood,wood");
}

#[test]
fn test_output_suffix_from_settings() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("list.csv");
    std::fs::write(&input, "Name,Tags\nlamp,red\n").unwrap();

    let settings = Settings::default()
        .with_config_path(dir.path().join("config.json"))
        .with_output_suffix("_tagged");
    let mut session = Session::new(settings);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();

    let outcome = session.apply(Command::SaveSession).unwrap();
    assert_eq!(
        outcome,
        Outcome::Saved {
            output: dir.path().join("list_tagged.csv"),
            rows: 1,
        }
    );
    assert!(!dir.path().join("list_updated.csv").exists());
}

#[test]
fn test_select_column_on_sheet_without_columns() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    std::fs::write(&input, "").unwrap();

    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input)).unwrap();
    assert!(session.columns().is_empty());

    let err = session
        .apply(Command::SelectColumn("A".to_string()))
        .unwrap_err();
    assert!(matches!(validation(err), ValidationError::NoColumns));
}

#[test]
fn test_corrupt_config_starts_empty() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "[1, 2").unwrap();

    let session = session_in(&dir);
    assert!(session.rules().is_empty());
    assert!(dir.path().join("config.json.corrupt").exists());
}

#[test]
fn test_open_unsupported_file_keeps_state() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), "products.xlsx");
    let mut session = session_in(&dir);
    session.apply(Command::OpenWorkbook(input.clone())).unwrap();
    session.apply(Command::SelectColumn("B".to_string())).unwrap();

    let err = session
        .apply(Command::OpenWorkbook(dir.path().join("notes.txt")))
        .unwrap_err();
    assert!(matches!(err, CoreError::Sheet(_)));
    assert_eq!(session.workbook_path(), Some(input.as_path()));
    assert_eq!(session.selected_column().as_deref(), Some("B"));
}
