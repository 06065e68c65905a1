use colored::Colorize;
use shuffler::api::{CmdMessage, EntityView, MessageLevel, OutlineRow};
use shuffler::categories::Category;
use shuffler::commands::helpers::short_id;
use shuffler::config::ShufflerConfig;
use shuffler::document::Location;
use shuffler::model::{EntityKind, WorkflowLabel};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const LABEL_WIDTH: usize = 12;
const INDENT: &str = "  ";
const SECTION_MARKER: &str = "▸";
const CARD_MARKER: &str = "·";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_outline(rows: &[OutlineRow]) {
    let mut in_detached = false;
    for row in rows {
        if row.detached && !in_detached {
            println!();
            println!("{}", "Detached:".dimmed());
            in_detached = true;
        }
        println!("{}", format_row(row));
    }
}

fn format_row(row: &OutlineRow) -> String {
    let marker = match row.kind {
        EntityKind::Section => SECTION_MARKER,
        EntityKind::Card => CARD_MARKER,
    };
    let left = format!("{}{} {} ", INDENT.repeat(row.depth), marker, short_id(row.id));

    let summary = match &row.category {
        Some(category) => format!("{} [{}]", row.summary, category),
        None => row.summary.clone(),
    };
    let available = LINE_WIDTH.saturating_sub(left.width() + LABEL_WIDTH);
    let summary = truncate_to_width(&summary, available);
    let padding = available.saturating_sub(summary.width());

    let label = format!("{:>width$}", row.label.to_string(), width = LABEL_WIDTH);
    let summary = match row.kind {
        EntityKind::Section => summary.bold(),
        EntityKind::Card => summary.normal(),
    };

    format!(
        "{}{}{}{}",
        left.dimmed(),
        summary,
        " ".repeat(padding),
        color_label(row.label, &label)
    )
}

fn color_label(label: WorkflowLabel, text: &str) -> colored::ColoredString {
    match label {
        WorkflowLabel::ToDo => text.dimmed(),
        WorkflowLabel::InProgress => text.yellow(),
        WorkflowLabel::Review => text.cyan(),
        WorkflowLabel::Done => text.green(),
    }
}

pub(super) fn print_entity(view: &EntityView) {
    println!(
        "{} {}",
        short_id(view.id).yellow(),
        view.summary.bold()
    );
    println!("--------------------------------");
    println!("id:       {}", view.id);
    println!("kind:     {}", view.kind);
    println!("label:    {}", view.label);
    println!("position: {}, {}", view.position.x, view.position.y);
    println!("location: {}", describe_location(&view.location));
    if view.kind == EntityKind::Section {
        println!("children: {}", view.children);
    }
    if let Some(category) = &view.category {
        println!("category: {} ({})", category.name, category.color_name);
    }
    if let Some(notes) = &view.notes {
        println!("notes:    {}", notes);
    }
    if let Some(content) = &view.content {
        println!("--------------------------------");
        print!("{}", content);
        if !content.is_empty() && !content.ends_with('\n') {
            println!();
        }
    }
}

fn describe_location(location: &Location) -> String {
    match location {
        Location::Root => "root".to_string(),
        Location::Attached { parent } => format!("under {}", short_id(*parent)),
        Location::Detached { parent: None } => "detached".to_string(),
        Location::Detached {
            parent: Some(parent),
        } => format!("detached, under {}", short_id(*parent)),
    }
}

pub(super) fn print_categories(categories: &[Category]) {
    for category in categories {
        println!(
            "{:>4}  {}  {}",
            category.id.to_string().yellow(),
            category.name,
            category.color_name.dimmed()
        );
    }
}

pub(super) fn print_config(config: &ShufflerConfig) {
    for key in ShufflerConfig::KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
