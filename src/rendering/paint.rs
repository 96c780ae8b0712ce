/// Paint commands produced from a page layout

use crate::rendering::layout::{ElementType, PageLayout};

pub const WHITE: (u8, u8, u8, u8) = (255, 255, 255, 255);
pub const INK: (u8, u8, u8, u8) = (0, 0, 0, 255);
const BORDER: (u8, u8, u8, u8) = (160, 160, 168, 255);
const CAPTION: (u8, u8, u8, u8) = (90, 90, 110, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: (u8, u8, u8, u8),
    },
}

/// Background first, then frames, then text, so text always lands on top.
pub fn paint_page(page: &PageLayout) -> Vec<PaintCommand> {
    let mut cmds = vec![PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: page.width,
        height: page.height,
        rgba: WHITE,
    }];

    for node in page.nodes.iter().filter(|n| n.elem_type == ElementType::Frame) {
        let r = &node.lb.rect;
        let b = node.lb.box_model.border;
        cmds.push(PaintCommand::SolidRect { x: r.x, y: r.y, width: r.width, height: r.height, rgba: BORDER });
        cmds.push(PaintCommand::SolidRect {
            x: r.x + b as i32,
            y: r.y + b as i32,
            width: r.width.saturating_sub(b * 2),
            height: r.height.saturating_sub(b * 2),
            rgba: WHITE,
        });
    }

    for node in page.nodes.iter().filter(|n| n.elem_type != ElementType::Frame) {
        let rgba = if node.elem_type == ElementType::Caption { CAPTION } else { INK };
        cmds.push(PaintCommand::Text {
            x: node.lb.rect.x,
            y: node.lb.rect.y,
            text: node.text.clone(),
            scale: node.scale,
            rgba,
        });
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::layout_single;
    use crate::surfaces::{DocumentSurface, SurfaceKind};

    #[test]
    fn background_comes_first_and_text_last() {
        let s = DocumentSurface {
            kind: SurfaceKind::Transcript,
            title: "Transcript".into(),
            lines: vec!["GPA 3.80".into()],
        };
        let cmds = paint_page(&layout_single(&s, 200));
        match &cmds[0] {
            PaintCommand::SolidRect { rgba, .. } => assert_eq!(*rgba, WHITE),
            _ => panic!("unexpected"),
        }
        assert!(matches!(cmds.last(), Some(PaintCommand::Text { .. })));
    }
}
