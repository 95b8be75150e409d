//! Hierarchical validation reports.
//!
//! A journal is built by walking the tree with `Inspect::fill_report`. Each
//! node that has something to say writes notes into its own journal, and
//! each nested node gets a child journal titled after the field or index it
//! lives at. Nothing in this process stops early, so one pass reports every
//! problem in the document.

use crate::node::Inspect;
use std::fmt::{self, Formatter, Display, Write as _};
use serde::{Serialize, Deserialize};


#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNote {
    pub severity: Severity,
    pub message: String,
}


#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorJournal {
    title: String,
    notes: Vec<ErrorNote>,
    children: Vec<ErrorJournal>,
}

impl ErrorJournal {
    pub fn new(title: impl Into<String>) -> Self {
        ErrorJournal {
            title: title.into(),
            notes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &[ErrorNote] {
        &self.notes
    }

    pub fn children(&self) -> &[ErrorJournal] {
        &self.children
    }

    pub fn note(&mut self, severity: Severity, message: impl Into<String>) {
        self.notes.push(ErrorNote {
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.note(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.note(Severity::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.note(Severity::Error, message);
    }

    /// Attach a child report. Children with no notes anywhere in their
    /// subtree are dropped.
    pub fn add_child(&mut self, child: ErrorJournal) {
        if !child.is_empty() {
            self.children.push(child);
        }
    }

    /// Inspect `node` into a fresh child journal titled `title` and attach it.
    pub fn inspect_child<N: Inspect + ?Sized>(&mut self, title: impl Into<String>, node: &N) {
        let mut child = ErrorJournal::new(title);
        node.fill_report(&mut child);
        self.add_child(child);
    }

    /// Most severe note in the whole subtree.
    pub fn worst(&self) -> Option<Severity> {
        self.notes
            .iter()
            .map(|n| n.severity)
            .chain(self.children.iter().filter_map(ErrorJournal::worst))
            .max()
    }

    pub fn has_error(&self) -> bool {
        self.worst() == Some(Severity::Error)
    }

    pub fn has_warn_or_worse(&self) -> bool {
        self.worst() >= Some(Severity::Warn)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.children.iter().all(ErrorJournal::is_empty)
    }

    /// Number of notes in the whole subtree.
    pub fn note_count(&self) -> usize {
        self.notes.len() + self.children.iter().map(ErrorJournal::note_count).sum::<usize>()
    }

    fn count_at_least(&self, threshold: Severity) -> usize {
        self.notes.iter().filter(|n| n.severity >= threshold).count()
            + self.children
                .iter()
                .map(|c| c.count_at_least(threshold))
                .sum::<usize>()
    }

    /// Render as tab-indented text, one line per note. Notes below
    /// `threshold` are omitted, as are children left with nothing to show.
    /// Returns the text and the number of notes rendered.
    pub fn render(&self, threshold: Severity) -> (String, usize) {
        let mut out = String::new();
        let count = self.render_into(&mut out, threshold, 0);
        (out, count)
    }

    fn render_into(&self, out: &mut String, threshold: Severity, indent: usize) -> usize {
        let mut count = 0;
        push_indent(out, indent);
        out.push_str(&self.title);
        out.push('\n');
        for note in self.notes.iter().filter(|n| n.severity >= threshold) {
            push_indent(out, indent + 1);
            // writing to a String cannot fail
            let _ = writeln!(out, "[{}] {}", note.severity, note.message);
            count += 1;
        }
        for child in &self.children {
            if child.count_at_least(threshold) > 0 {
                count += child.render_into(out, threshold, indent + 1);
            }
        }
        count
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push('\t');
    }
}

impl Display for ErrorJournal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.render(Severity::Info).0)
    }
}


#[test]
fn test_empty_children_are_dropped() {
    let mut root = ErrorJournal::new("map");
    root.add_child(ErrorJournal::new("quiet"));
    assert!(root.is_empty());
    assert!(root.children().is_empty());

    let mut loud = ErrorJournal::new("loud");
    loud.info("just so you know");
    root.add_child(loud);
    assert!(!root.is_empty());
    assert!(!root.has_warn_or_worse());
    assert_eq!(root.note_count(), 1);
}

#[test]
fn test_severity_queries_see_whole_subtree() {
    let mut leaf = ErrorJournal::new("material");
    leaf.error("diffuse map is not defined");
    let mut mid = ErrorJournal::new("render unit");
    mid.add_child(leaf);
    let mut root = ErrorJournal::new("model");
    root.warn("name is empty");
    root.add_child(mid);

    assert!(root.has_error());
    assert!(root.has_warn_or_worse());
    assert_eq!(root.worst(), Some(Severity::Error));
    assert_eq!(root.note_count(), 2);
}

#[test]
fn test_render_threshold() {
    let mut actors = ErrorJournal::new("static_actors");
    actors.info("no actors");
    let mut units = ErrorJournal::new("render_units");
    units.error("no render units");
    let mut root = ErrorJournal::new("model");
    root.warn("name is empty");
    root.add_child(actors);
    root.add_child(units);

    let (text, count) = root.render(Severity::Warn);
    assert_eq!(count, 2);
    assert_eq!(
        text,
        "model\n\t[WARN] name is empty\n\trender_units\n\t\t[ERROR] no render units\n",
    );

    let (text, count) = root.render(Severity::Info);
    assert_eq!(count, 3);
    assert!(text.contains("\tstatic_actors\n\t\t[INFO] no actors\n"));
    assert_eq!(text, root.to_string());
}
