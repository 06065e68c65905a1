use shuffler::document::Project;
use shuffler::loader::{LoadWarning, ProjectLoader};
use shuffler::model::{Position, Section, WorkflowLabel};
use shuffler::parser;
use shuffler::store::fs::FsStorage;
use shuffler::writer::ProjectWriter;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn load(dir: &std::path::Path) -> (Project, Vec<LoadWarning>) {
    let mut result = ProjectLoader::new(FsStorage::new()).load(dir).unwrap();
    let warnings = std::mem::take(&mut result.warnings);
    (Project::from_load_result(result), warnings)
}

#[test]
fn test_save_and_load_preserves_tree() {
    let temp = TempDir::new().unwrap();
    let mut project = Project::new(Section::new("Novel"));
    let root = project.root_id();
    let plot = project.add_category("Plot", "Red");

    let act = project.create_section(root, "Act One").unwrap();
    let storm = project
        .create_card(act, "Storm", "Rain hits the glass.\nThunder.\n")
        .unwrap();
    let calm = project.create_card(act, "Calm", "").unwrap();
    let coda = project.create_card(root, "Coda", "fin").unwrap();
    project.set_category(storm, Some(plot)).unwrap();
    project.set_position(storm, Position::new(40.5, -12.0)).unwrap();
    project.set_label(calm, WorkflowLabel::Done).unwrap();
    project
        .set_notes(act, Some("needs a stronger hook".into()))
        .unwrap();

    ProjectWriter::new(FsStorage::new())
        .save(&mut project, temp.path())
        .unwrap();
    assert!(!project.has_unsaved_changes());

    let (loaded, warnings) = load(temp.path());
    assert!(warnings.is_empty(), "{:?}", warnings);
    assert_eq!(loaded.root(), project.root());
    assert_eq!(loaded.categories(), project.categories());
    assert_eq!(loaded.card(coda).unwrap().content, "fin");
    assert_eq!(
        loaded
            .ordered_cards(root)
            .unwrap()
            .iter()
            .map(|c| c.id())
            .collect::<Vec<_>>(),
        vec![storm, calm, coda]
    );
}

#[test]
fn test_detached_entities_survive_save() {
    let temp = TempDir::new().unwrap();
    let mut project = Project::new(Section::new("Novel"));
    let root = project.root_id();
    let act = project.create_section(root, "Act One").unwrap();
    let scene = project.create_card(act, "Scene", "text\n").unwrap();
    let loose = project.create_card(root, "Loose", "").unwrap();
    project.detach(act).unwrap();
    project.detach(loose).unwrap();

    ProjectWriter::new(FsStorage::new())
        .save(&mut project, temp.path())
        .unwrap();
    let (loaded, warnings) = load(temp.path());
    assert!(warnings.is_empty(), "{:?}", warnings);

    let detached: HashSet<_> = loaded.detached().iter().map(|e| e.id()).collect();
    assert_eq!(detached, HashSet::from([act, loose]));
    assert!(!loaded.is_attached(scene));
    assert!(loaded.contains(scene));
    assert!(loaded.root().children.is_empty());
}

#[test]
fn test_every_file_is_loaded_somewhere() {
    let temp = TempDir::new().unwrap();
    let mut project = Project::new(Section::new("Novel"));
    let root = project.root_id();
    let act = project.create_section(root, "Act One").unwrap();
    let scene = project.create_card(act, "Scene", "").unwrap();
    ProjectWriter::new(FsStorage::new())
        .save(&mut project, temp.path())
        .unwrap();

    // Drop the section file: its card is orphaned but still loaded.
    fs::remove_file(
        temp.path()
            .join("sections")
            .join(format!("{}.yaml", act)),
    )
    .unwrap();

    let (loaded, warnings) = load(temp.path());
    assert!(warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::DanglingReference { child, .. } if *child == act)));
    assert!(loaded.contains(scene));
    assert!(!loaded.is_attached(scene));
    assert!(!loaded.contains(act));
}

#[test]
fn test_import_save_load() {
    let temp = TempDir::new().unwrap();
    let text = "<!-- chapter 1::Arrival -->\n\
                <!-- section l2::The Station -->\n\
                <!-- card::Platform -->\n\
                Steam everywhere.\n\
                <!-- chapter 2::Departure -->\n\
                <!-- card::Whistle -->\n\
                Too late.\n";
    let parsed = parser::parse(text);
    assert_eq!(parsed.entity_count(), 5);

    let mut project = Project::new(Section::new("Novel"));
    let report = project.merge(parsed).unwrap();
    assert_eq!(report.attached.len(), 2);

    ProjectWriter::new(FsStorage::new())
        .save(&mut project, temp.path())
        .unwrap();
    let (loaded, warnings) = load(temp.path());
    assert!(warnings.is_empty(), "{:?}", warnings);
    assert_eq!(loaded.root(), project.root());
    let contents: Vec<_> = loaded
        .ordered_cards(loaded.root_id())
        .unwrap()
        .iter()
        .map(|c| c.content.clone())
        .collect();
    assert_eq!(contents, vec!["Steam everywhere.\n", "Too late.\n"]);
}
