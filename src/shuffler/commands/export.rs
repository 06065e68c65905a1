//! Renders a section back into tagged text.
//!
//! Direct sections of the exported section become chapters, deeper ones `section lN`
//! markers, and every card a `card` marker followed by its content. The output re-imports
//! into the same shape with two exceptions. Within any section, cards are written before
//! its subsections, so a card that followed a subsection re-imports ahead of it. Cards that
//! sit directly in the exported section therefore come out ahead of the first chapter, and
//! those re-import detached.

use crate::commands::CmdResult;
use crate::document::Project;
use crate::error::Result;
use crate::model::{Entity, EntityId, Section};
use once_cell::sync::Lazy;
use regex::Regex;

static CHAPTER_SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.+?)\]\s*(.*)$").expect("valid chapter summary regex"));

pub fn run(project: &Project, section_id: EntityId) -> Result<CmdResult> {
    let section = project.section(section_id)?;
    let mut out = String::new();
    if section_id == project.root_id() {
        render_children(section, 0, &mut out);
    } else {
        render_section(section, 0, 1, &mut out);
    }
    Ok(CmdResult::default().with_export(out))
}

fn render_children(section: &Section, depth: usize, out: &mut String) {
    let mut chapter_number = 0;
    for child in &section.children {
        if let Entity::Card(card) = child {
            out.push_str(&format!("<!-- card::{} -->\n", card.meta.summary));
            out.push_str(&card.content);
            if !card.content.is_empty() && !card.content.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    for child in &section.children {
        if let Entity::Section(inner) = child {
            chapter_number += 1;
            render_section(inner, depth, chapter_number, out);
        }
    }
}

fn render_section(section: &Section, depth: usize, chapter_number: usize, out: &mut String) {
    if depth == 0 {
        let summary = &section.meta.summary;
        let (name, title) = match CHAPTER_SUMMARY_RE.captures(summary) {
            Some(caps) => (caps[1].to_string(), caps[2].to_string()),
            None => (chapter_number.to_string(), summary.clone()),
        };
        out.push_str(&format!("<!-- chapter {}::{} -->\n", name, title));
    } else {
        out.push_str(&format!(
            "<!-- section l{}::{} -->\n",
            depth, section.meta.summary
        ));
    }
    render_children(section, depth + 1, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::test_utils::sample_project;

    #[test]
    fn test_export_root() {
        let sample = sample_project();
        let text = run(&sample.project, sample.project.root_id())
            .unwrap()
            .export
            .unwrap();
        assert_eq!(
            text,
            "<!-- chapter 1::Act One -->\n\
             <!-- card::The storm -->\nRain hits the glass.\n\
             <!-- card::The calm -->\nSilence after.\n\
             <!-- chapter 2::Act Two -->\n"
        );
    }

    #[test]
    fn test_export_reimports_to_same_shape() {
        let mut sample = sample_project();
        let scene = sample
            .project
            .create_section(sample.act_two, "[x] Night")
            .unwrap();
        sample
            .project
            .create_card(scene, "Stars", "So many.")
            .unwrap();
        let text = run(&sample.project, sample.project.root_id())
            .unwrap()
            .export
            .unwrap();

        let load = parse(&text).into_load_result();
        assert!(load.unattached.is_empty());
        let chapters: Vec<_> = load
            .root
            .children
            .iter()
            .map(|c| c.meta().summary.clone())
            .collect();
        assert_eq!(chapters, vec!["[1] Act One", "[2] Act Two"]);
        let act_two = load.root.children[1].as_section().unwrap();
        let night = act_two.children[0].as_section().unwrap();
        assert_eq!(night.meta.summary, "[x] Night");
        assert_eq!(night.ordered_cards()[0].content, "So many.\n");
    }

    #[test]
    fn test_export_single_section_as_chapter() {
        let sample = sample_project();
        let text = run(&sample.project, sample.act_one).unwrap().export.unwrap();
        assert!(text.starts_with("<!-- chapter 1::Act One -->\n"));
        assert!(run(&sample.project, sample.storm).is_err());
    }

    #[test]
    fn test_cards_are_written_before_subsections() {
        let mut project = Project::default();
        let root = project.root_id();
        let chapter = project.create_section(root, "[1] Ch").unwrap();
        project.create_section(chapter, "Sub").unwrap();
        project.create_card(chapter, "After", "a\n").unwrap();

        let text = run(&project, root).unwrap().export.unwrap();
        assert_eq!(
            text,
            "<!-- chapter 1::Ch -->\n<!-- card::After -->\na\n<!-- section l1::Sub -->\n"
        );

        let mut reimported = Project::default();
        let report = reimported.merge(parse(&text)).unwrap();
        let order: Vec<_> = reimported
            .section(report.attached[0])
            .unwrap()
            .children
            .iter()
            .map(|c| c.meta().summary.clone())
            .collect();
        assert_eq!(order, vec!["After", "Sub"]);
        assert!(matches!(
            reimported.section(report.attached[0]).unwrap().children[1],
            Entity::Section(_)
        ));
    }
}
