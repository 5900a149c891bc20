use arbitrem_navigator::{
    output_paths, AssociationConfig, AssociationEngine, AssociationReport, FileIndexWriters,
    IndicesLayout, NavigatorError, NavigatorParser,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SESSION: &str = "AdocVersion = 2.00\r\n\
LastSavedAs = D:\\session\\specimen_X\\nav.nav\r\n\
\r\n\
[Item = grid]\r\n\
Color = 0\r\n\
StageXYZ = -200.5 310.25 0\r\n\
Type = 2\r\n\
MapFile = D:\\session\\specimen_X\\atlas.mrc\r\n\
\r\n\
[Item = hole-1]\r\n\
Color = 0\r\n\
StageXYZ = 10 10 0\r\n\
Type = 2\r\n\
Acquire = 1\r\n\
\r\n\
[Item = p1]\r\n\
StageXYZ = 10.4 10 0\r\n\
Type = 0\r\n\
\r\n\
[Item = p2]\r\n\
StageXYZ = 10 9.3 0\r\n\
Type = 0\r\n\
\r\n\
[Item = hole-2]\r\n\
StageXYZ = 40 10 0\r\n\
Type = 2\r\n\
Acquire = 1\r\n\
\r\n\
[Item = p3]\r\n\
StageXYZ = 40.5 10.5 0\r\n\
Type = 0\r\n\
\r\n\
[Item = far]\r\n\
StageXYZ = 90 90 0\r\n\
Type = 0\r\n\
\r\n\
[Item = p4]\r\n\
StageXYZ = 40 10 0\r\n\
Type = 0\r\n";

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn run_session(dir: &Path, layout: IndicesLayout) -> arbitrem_navigator::Result<AssociationReport> {
    let nav = dir.join("session.nav");
    fs::write(&nav, SESSION).unwrap();

    let records = NavigatorParser::parse_file(&nav)?;
    let engine = AssociationEngine::new(AssociationConfig {
        view_map_diameter_um: 2.0,
        indices_layout: layout,
    })?;
    let mut out = FileIndexWriters::create_in(dir)?;
    engine.run(&records, &mut out)
}

#[test]
fn session_file_produces_indices_and_guide() {
    let temp = tempdir().unwrap();
    let report = run_session(temp.path(), IndicesLayout::PerAnchor).unwrap();

    // p4 is the last item and never makes it out of the parser.
    assert_eq!(report.total_points, 3);

    let (indices, guide) = output_paths(temp.path());
    assert_eq!(read_lines(&indices), vec![" 3 4", " 6"]);
    assert_eq!(read_lines(&guide), vec!["0", "2", "2", "2", "3", "3", "3"]);
    assert_eq!(report.indices_lines, 2);
    assert_eq!(report.guide_lines, report.records);
}

#[test]
fn per_record_layout_aligns_indices_with_guide() {
    let temp = tempdir().unwrap();
    let report = run_session(temp.path(), IndicesLayout::PerRecord).unwrap();

    let (indices, guide) = output_paths(temp.path());
    let indices = read_lines(&indices);
    assert_eq!(indices.len(), read_lines(&guide).len());
    assert_eq!(indices, vec!["", " 3 4", "", "", " 6", "", ""]);
    assert_eq!(report.indices_lines, indices.len());
    assert_eq!(report.guide_lines, indices.len());
}

#[test]
fn no_anchor_session_leaves_written_files_in_place() {
    let temp = tempdir().unwrap();
    let nav = temp.path().join("plain.nav");
    fs::write(
        &nav,
        "[Item = a]\nType = 0\nStageXYZ = 0 0 0\n[Item = b]\nType = 0\nStageXYZ = 1 1 0\n[Item = c]\n",
    )
    .unwrap();

    let records = NavigatorParser::parse_file(&nav).unwrap();
    let engine = AssociationEngine::new(AssociationConfig::with_diameter(2.0)).unwrap();
    let mut out = FileIndexWriters::create_in(temp.path()).unwrap();
    let err = engine.run(&records, &mut out).unwrap_err();
    drop(out);

    assert!(matches!(err, NavigatorError::NoAnchors { records: 2 }), "{err:?}");
    let (indices, guide) = output_paths(temp.path());
    assert_eq!(fs::read_to_string(indices).unwrap(), "");
    assert_eq!(read_lines(&guide), vec!["0", "0"]);
}

#[test]
fn unreadable_navigator_is_reported_with_its_name() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing.nav");
    let err = NavigatorParser::parse_file(&missing).unwrap_err();
    assert!(matches!(err, NavigatorError::Open { .. }));
    assert!(err.to_string().contains("missing.nav"), "{err}");
}
