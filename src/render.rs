//! Terminal rendering for materials, sessions and prerequisite trees

use colored::Colorize;
use prettytable::{format, row, Table};

use crate::models::{Material, SessionDetail, SessionSummary};
use crate::tree::TreeNode;

const INDENT: &str = "  ";

/// Render a forest as an indented outline.
///
/// Each node prints its name, then its description and encyclopedia
/// summary (with link) on following lines when present. Children are
/// indented one level deeper than their parent.
pub fn render_forest(forest: &[TreeNode]) -> String {
    let mut out = String::new();
    for root in forest {
        root.walk(|tree, depth| render_node(tree, depth, &mut out));
    }
    out
}

fn render_node(tree: &TreeNode, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    let node = &tree.node;

    out.push_str(&format!("{}- {}\n", pad, node.name.bold()));
    if let Some(description) = &node.description {
        out.push_str(&format!("{}  {}\n", pad, description));
    }
    if let Some(summary) = &node.wikipedia_summary {
        let mut line = format!("{}  {}", pad, summary.dimmed());
        if let Some(url) = &node.wikipedia_url {
            line.push_str(&format!(" ({})", url.cyan()));
        }
        out.push_str(&line);
        out.push('\n');
    }
}

/// Print a session header followed by its prerequisite tree.
pub fn print_session(detail: &SessionDetail, forest: &[TreeNode]) {
    println!("\n{} {}", format!("#{}", detail.id).cyan(), detail.title.bold());
    if let Some(objective) = &detail.objective {
        println!("Objective: {}", objective);
    }
    println!("{} materials linked", detail.materials.len());
    println!();

    if forest.is_empty() {
        println!("{}", "No prerequisites were generated yet.".yellow());
    } else {
        print!("{}", render_forest(forest));
    }
    println!();
}

/// Print materials as a table; `selected` marks rows with a check.
pub fn print_materials<F>(materials: &[Material], selected: F)
where
    F: Fn(i64) -> bool,
{
    if materials.is_empty() {
        println!(
            "{}",
            "Upload materials first to build a session.".yellow()
        );
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["", "ID".bold(), "Filename".bold(), "Status".bold()]);

    for material in materials {
        let mark = if selected(material.id) { "[x]" } else { "[ ]" };
        let status = if material.status.is_ready() {
            material.status.to_string().green()
        } else {
            material.status.to_string().yellow()
        };
        table.add_row(row![mark, material.id, material.filename, status]);
    }

    table.printstd();
}

/// Print sessions as a table; `active` is highlighted.
pub fn print_sessions(sessions: &[SessionSummary], active: Option<i64>) {
    if sessions.is_empty() {
        println!("{}", "No sessions yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "ID".bold(),
        "Title".bold(),
        "Materials".bold(),
        "Nodes".bold()
    ]);

    for session in sessions {
        let title = truncate(&session.title, 40);
        let title = if active == Some(session.id) {
            title.reversed()
        } else {
            title.normal()
        };
        table.add_row(row![
            session.id.to_string().cyan(),
            title,
            session.material_count,
            session.prerequisite_count
        ]);
    }

    table.printstd();
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
