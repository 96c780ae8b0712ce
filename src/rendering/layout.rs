/// Block layout for document surfaces and the container that arranges them

use crate::surfaces::{DocumentSurface, ElementContent, Flow, LayoutContainer};

/// Pixel size of one text cell at scale 1
pub const CHAR_W: u32 = 8;
pub const LINE_H: u32 = 10;
const PAGE_MARGIN: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Per-side insets, applied equally on all four sides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxModel {
    pub border: u32,
    pub padding: u32,
}

impl BoxModel {
    pub fn inset(&self) -> u32 {
        self.border + self.padding
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    /// Box with no border or padding
    pub fn plain(rect: Rect) -> Self {
        Self { rect, box_model: BoxModel::default() }
    }

    /// Area left for content once border and padding are taken off both sides.
    pub fn content_rect(&self) -> Rect {
        let inset = self.box_model.inset();
        Rect {
            x: self.rect.x + inset as i32,
            y: self.rect.y + inset as i32,
            width: self.rect.width.saturating_sub(inset * 2),
            height: self.rect.height.saturating_sub(inset * 2),
        }
    }

    pub fn content_width(&self) -> u32 {
        self.content_rect().width
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// Bordered frame around one document
    Frame,
    Title,
    Paragraph,
    Caption,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
}

/// Laid-out page ready for painting
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

/// Greedy word wrap to `chars_per_line`; words longer than a line are split.
pub fn wrap(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > chars_per_line {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            let head: String = word.chars().take(chars_per_line).collect();
            word = word.chars().skip(chars_per_line).collect();
            lines.push(head);
        }
        if cur.chars().count() + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Stack a surface's title and lines vertically inside a frame at `(x, y)`.
/// Returns the nodes and the frame height.
pub fn layout_surface(surface: &DocumentSurface, x: i32, y: i32, width: u32) -> (Vec<LayoutNode>, u32) {
    let mut frame = LayoutBox {
        rect: Rect { x, y, width, height: 0 },
        box_model: BoxModel { border: 1, padding: 8 },
    };
    let content = frame.content_rect();
    let inner_x = content.x;
    let inner_w = frame.content_width();
    let mut cursor = content.y as u32;
    let mut nodes = Vec::new();

    let title_lines = wrap(&surface.title, (inner_w / (CHAR_W * 2)) as usize);
    let title_h = title_lines.len().max(1) as u32 * LINE_H * 2;
    nodes.push(LayoutNode {
        lb: LayoutBox::plain(Rect { x: inner_x, y: cursor as i32, width: inner_w, height: title_h }),
        text: title_lines.join("\n"),
        elem_type: ElementType::Title,
        scale: 2,
    });
    cursor += title_h + 6;

    for line in &surface.lines {
        let wrapped = wrap(line, (inner_w / CHAR_W) as usize);
        let box_h = wrapped.len().max(1) as u32 * LINE_H;
        nodes.push(LayoutNode {
            lb: LayoutBox::plain(Rect { x: inner_x, y: cursor as i32, width: inner_w, height: box_h }),
            text: wrapped.join("\n"),
            elem_type: ElementType::Paragraph,
            scale: 1,
        });
        cursor += box_h + 2;
    }

    let height = cursor + frame.box_model.inset() - y as u32;
    frame.rect.height = height;
    let frame = LayoutNode {
        lb: frame,
        text: String::new(),
        elem_type: ElementType::Frame,
        scale: 1,
    };
    nodes.insert(0, frame);
    (nodes, height)
}

struct Cell<'a> {
    caption: Option<&'a str>,
    surface: &'a DocumentSurface,
}

/// Arrange the container's surfaces per its flow, skipping any element
/// carrying one of `exclude_tags`. Captions attach to the surface after them.
pub fn layout_container(container: &LayoutContainer, exclude_tags: &[String]) -> PageLayout {
    let mut cells = Vec::new();
    let mut pending_caption = None;
    for element in container.elements.iter().filter(|e| !e.has_any_tag(exclude_tags)) {
        match &element.content {
            ElementContent::Caption(text) => pending_caption = Some(text.as_str()),
            ElementContent::Surface(surface) => cells.push(Cell {
                caption: pending_caption.take(),
                surface,
            }),
        }
    }

    let columns = match container.style.flow {
        Flow::Grid { columns } => columns.max(1) as usize,
        Flow::Row => cells.len().max(1),
    };
    let style = &container.style;
    let cell_w = style.surface_width;
    let mut nodes = Vec::new();
    let mut y = PAGE_MARGIN;
    let mut max_right = 0u32;

    for row in cells.chunks(columns) {
        let mut row_h = 0u32;
        for (col, cell) in row.iter().enumerate() {
            let x = PAGE_MARGIN + col as u32 * (cell_w + style.gap);
            let mut top = y;
            if let Some(caption) = cell.caption {
                nodes.push(LayoutNode {
                    lb: LayoutBox::plain(Rect { x: x as i32, y: top as i32, width: cell_w, height: LINE_H }),
                    text: caption.to_string(),
                    elem_type: ElementType::Caption,
                    scale: 1,
                });
                top += LINE_H + 4;
            }
            let (surface_nodes, h) = layout_surface(cell.surface, x as i32, top as i32, cell_w);
            nodes.extend(surface_nodes);
            row_h = row_h.max(top - y + h);
            max_right = max_right.max(x + cell_w);
        }
        y += row_h + style.gap;
    }

    let width = (max_right + PAGE_MARGIN).max(PAGE_MARGIN * 2 + 1);
    let height = (y.saturating_sub(style.gap) + PAGE_MARGIN).max(PAGE_MARGIN * 2 + 1);
    PageLayout { width, height, nodes }
}

/// A single surface on its own page
pub fn layout_single(surface: &DocumentSurface, width: u32) -> PageLayout {
    let (nodes, h) = layout_surface(surface, PAGE_MARGIN as i32, PAGE_MARGIN as i32, width);
    PageLayout {
        width: width + PAGE_MARGIN * 2,
        height: h + PAGE_MARGIN * 2,
        nodes,
    }
}
