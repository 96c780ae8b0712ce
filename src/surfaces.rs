//! Document surfaces rendered from a record, and the shared layout
//! container that holds them.
//!
//! The container is the one piece of mutable presentation state shared
//! between steady-state display and export. Export code only touches its
//! style through [`crate::export::guard`].

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::format::{gpa, hours, us_date, usd};
use crate::generator::{StudentRecord, TermCourseSet};
use crate::ExportConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SurfaceKind {
    TuitionStatement,
    Transcript,
    Schedule,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 3] = [
        SurfaceKind::TuitionStatement,
        SurfaceKind::Transcript,
        SurfaceKind::Schedule,
    ];

    /// Stable identifier, also used as the capture region id
    pub fn id(&self) -> &'static str {
        match self {
            SurfaceKind::TuitionStatement => "tuition_statement",
            SurfaceKind::Transcript => "transcript",
            SurfaceKind::Schedule => "schedule",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SurfaceKind::TuitionStatement => "Tuition Statement",
            SurfaceKind::Transcript => "Unofficial Transcript",
            SurfaceKind::Schedule => "Class Schedule",
        }
    }

    /// Entry name inside an archived export
    pub fn entry_name(&self) -> String {
        format!("{}.png", self.id())
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A renderable document: a title and its text lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSurface {
    pub kind: SurfaceKind,
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementContent {
    Surface(DocumentSurface),
    /// Caption shown above a surface on screen; not document content
    Caption(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tags: Vec<String>,
    pub content: ElementContent,
}

impl Element {
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Grid { columns: u32 },
    Row,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub flow: Flow,
    pub gap: u32,
    pub surface_width: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutContainer {
    pub id: String,
    pub style: LayoutStyle,
    /// Identity markers (class-like names) currently applied
    pub markers: Vec<String>,
    pub elements: Vec<Element>,
    /// Set while an export override owns the style; at most one at a time
    pub override_active: bool,
}

pub type SharedContainer = Arc<Mutex<LayoutContainer>>;

impl LayoutContainer {
    /// Content surfaces in display order
    pub fn surfaces(&self) -> Vec<DocumentSurface> {
        self.elements
            .iter()
            .filter_map(|e| match &e.content {
                ElementContent::Surface(s) => Some(s.clone()),
                ElementContent::Caption(_) => None,
            })
            .collect()
    }

    pub fn shared(self) -> SharedContainer {
        Arc::new(Mutex::new(self))
    }
}

/// Lay the three documents for `record` out in the steady-state grid, each
/// preceded by a caption label.
pub fn build_container(record: &StudentRecord, config: &ExportConfig) -> LayoutContainer {
    let mut elements = Vec::with_capacity(SurfaceKind::ALL.len() * 2);
    for kind in SurfaceKind::ALL {
        elements.push(Element {
            tags: vec![config.label_tag.clone()],
            content: ElementContent::Caption(kind.title().to_string()),
        });
        elements.push(Element {
            tags: vec!["document".to_string()],
            content: ElementContent::Surface(build_surface(kind, record)),
        });
    }
    LayoutContainer {
        id: "documents".to_string(),
        style: LayoutStyle {
            flow: Flow::Grid {
                columns: config.grid_columns,
            },
            gap: config.gap,
            surface_width: config.surface_width,
        },
        markers: vec!["documents-grid".to_string()],
        elements,
        override_active: false,
    }
}

pub fn build_surface(kind: SurfaceKind, record: &StudentRecord) -> DocumentSurface {
    let lines = match kind {
        SurfaceKind::TuitionStatement => tuition_lines(record),
        SurfaceKind::Transcript => transcript_lines(record),
        SurfaceKind::Schedule => schedule_lines(record),
    };
    DocumentSurface {
        kind,
        title: kind.title().to_string(),
        lines,
    }
}

fn header_lines(record: &StudentRecord) -> Vec<String> {
    let id = &record.identity;
    vec![
        format!("Name: {}", id.full_name()),
        format!("Student ID: {}", id.student_id),
        id.address.street.clone(),
        id.address.locality(),
    ]
}

fn tuition_lines(record: &StudentRecord) -> Vec<String> {
    let t = &record.tuition;
    let mut lines = header_lines(record);
    lines.push(format!("Statement Date: {}", us_date(record.statement_date)));
    lines.push(format!("Due Date: {}", us_date(record.due_date)));
    lines.push(format!("Term: {}", record.current_term.term));
    lines.push(format!("College: {}", record.college));
    lines.push(format!("Tuition: {}", usd(t.base)));
    lines.push(format!("Differential Tuition: {}", usd(t.differential)));
    for fee in &t.fees {
        lines.push(format!("{}: {}", fee.name, usd(fee.amount)));
    }
    lines.push(format!("Total Fees: {}", usd(t.fee_total)));
    lines.push(format!("Amount Due: {}", usd(t.total)));
    lines
}

fn term_lines(term: &TermCourseSet) -> Vec<String> {
    let mut lines = vec![term.term.clone()];
    for c in &term.courses {
        lines.push(format!(
            "{} {} {} {} {:.2}",
            c.course.code,
            c.course.name,
            hours(c.course.credit_hours),
            c.grade,
            c.quality_points
        ));
    }
    let s = &term.stats;
    lines.push(format!(
        "Attempted {} Earned {} Points {:.2} GPA {}",
        hours(s.attempted_hours),
        hours(s.earned_hours),
        s.quality_points,
        gpa(s.gpa)
    ));
    lines
}

fn transcript_lines(record: &StudentRecord) -> Vec<String> {
    let mut lines = header_lines(record);
    lines.push(format!("Issued: {}", us_date(record.issue_date)));
    lines.push(format!("Program: {}", record.program));
    lines.push(format!("Major: {}", record.major));
    lines.push(format!("College: {}", record.college));
    for term in record.terms() {
        lines.extend(term_lines(term));
    }
    let c = &record.cumulative;
    lines.push(format!(
        "Cumulative: Attempted {} Earned {} Points {:.2} GPA {}",
        hours(c.attempted_hours),
        hours(c.earned_hours),
        c.quality_points,
        gpa(c.gpa)
    ));
    lines
}

fn schedule_lines(record: &StudentRecord) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", record.identity.full_name()),
        format!("Student ID: {}", record.identity.student_id),
        format!("Term: {}", record.next_term.term),
        format!("Major: {}", record.major),
    ];
    for c in &record.next_term.courses {
        lines.push(format!(
            "{} {} ({} cr)",
            c.course.code,
            c.course.name,
            hours(c.course.credit_hours)
        ));
    }
    lines.push(format!(
        "Total Credit Hours: {}",
        hours(record.next_term.stats.attempted_hours)
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;
    use crate::{GeneratorConfig, RecordGenerator, Track};
    use chrono::NaiveDate;

    fn record() -> StudentRecord {
        let generator = RecordGenerator::new(GeneratorConfig {
            base_tuition_range: (9600, 9600),
            ..Default::default()
        })
        .unwrap();
        let mut rng = SeededRng::from_seed(17);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        generator
            .generate_for_track(Track::ComputerScience, &mut rng, today)
            .unwrap()
    }

    #[test]
    fn container_holds_three_surfaces_with_captions() {
        let container = build_container(&record(), &ExportConfig::default());
        let kinds: Vec<SurfaceKind> = container.surfaces().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SurfaceKind::ALL.to_vec());
        let labels = container
            .elements
            .iter()
            .filter(|e| e.has_any_tag(&["label".to_string()]))
            .count();
        assert_eq!(labels, 3);
        assert_eq!(container.style.flow, Flow::Grid { columns: 2 });
    }

    #[test]
    fn tuition_surface_shows_formatted_amounts() {
        let r = record();
        let s = build_surface(SurfaceKind::TuitionStatement, &r);
        assert!(s.lines.iter().any(|l| l == "Amount Due: $13,775.00"));
        assert!(s.lines.iter().any(|l| l == &format!("Due Date: {}", us_date(r.due_date))));
    }

    #[test]
    fn entry_names_are_fixed() {
        let names: Vec<String> = SurfaceKind::ALL.iter().map(|k| k.entry_name()).collect();
        assert_eq!(names, vec!["tuition_statement.png", "transcript.png", "schedule.png"]);
    }
}
