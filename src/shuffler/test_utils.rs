use crate::categories::CategoryId;
use crate::document::Project;
use crate::model::{Card, EntityId, Position};
use crate::store::memory::MemoryStorage;
use crate::writer::ProjectWriter;
use std::path::{Path, PathBuf};

pub const SAMPLE_PATH: &str = "book";

/// A small saved-state project:
///
/// ```text
/// root
/// ├── Act One
/// │   ├── The storm   (category "Plot", at 40,20)
/// │   └── The calm
/// └── Act Two
/// detached: Loose idea
/// ```
pub struct SampleProject {
    pub project: Project,
    pub act_one: EntityId,
    pub storm: EntityId,
    pub calm: EntityId,
    pub act_two: EntityId,
    pub loose: EntityId,
    pub plot: CategoryId,
}

pub fn sample_project() -> SampleProject {
    let mut project = Project::default();
    let root = project.root_id();
    let plot = project.add_category("Plot", "Red");

    let act_one = project
        .create_section(root, "Act One")
        .expect("root accepts children");
    let mut storm = Card::new("The storm", "Rain hits the glass.\n");
    storm.category = Some(plot);
    storm.meta.position = Position::new(40.0, 20.0);
    let storm = project.create(act_one, storm).expect("fresh card");
    let calm = project
        .create_card(act_one, "The calm", "Silence after.\n")
        .expect("fresh card");
    let act_two = project
        .create_section(root, "Act Two")
        .expect("root accepts children");
    let loose = project
        .create_card(root, "Loose idea", "Maybe a dream sequence.\n")
        .expect("fresh card");
    project.detach(loose).expect("loose is attached");
    project.mark_saved();

    SampleProject {
        project,
        act_one,
        storm,
        calm,
        act_two,
        loose,
        plot,
    }
}

/// Saves the sample project into fresh in-memory storage under [`SAMPLE_PATH`].
pub fn saved_sample() -> (MemoryStorage, SampleProject, PathBuf) {
    let storage = MemoryStorage::new();
    let mut sample = sample_project();
    let path = Path::new(SAMPLE_PATH).to_path_buf();
    ProjectWriter::new(&storage)
        .save(&mut sample.project, &path)
        .expect("memory storage accepts writes");
    (storage, sample, path)
}
