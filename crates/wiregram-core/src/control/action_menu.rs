//! Action menu items: clickable icons placed around an element.

use crate::geometry::{Point, Rectangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalEdge {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalEdge {
    Left,
    Center,
    Right,
}

/// Where a group of items sits relative to the element's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub vertical: VerticalEdge,
    pub horizontal: HorizontalEdge,
}

impl Alignment {
    pub const fn new(vertical: VerticalEdge, horizontal: HorizontalEdge) -> Self {
        Self { vertical, horizontal }
    }

    /// Parse a two-letter code such as `"tl"` or `"cr"`: vertical
    /// `t|c|b`, then horizontal `l|c|r`.
    pub fn parse(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let vertical = match chars.next()? {
            't' => VerticalEdge::Top,
            'c' => VerticalEdge::Center,
            'b' => VerticalEdge::Bottom,
            _ => return None,
        };
        let horizontal = match chars.next()? {
            'l' => HorizontalEdge::Left,
            'c' => HorizontalEdge::Center,
            'r' => HorizontalEdge::Right,
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(vertical, horizontal))
    }

    pub fn code(&self) -> String {
        let v = match self.vertical {
            VerticalEdge::Top => 't',
            VerticalEdge::Center => 'c',
            VerticalEdge::Bottom => 'b',
        };
        let h = match self.horizontal {
            HorizontalEdge::Left => 'l',
            HorizontalEdge::Center => 'c',
            HorizontalEdge::Right => 'r',
        };
        format!("{v}{h}")
    }

    /// Unit direction away from the bounds' center.
    pub fn direction(&self) -> (f64, f64) {
        let dx = match self.horizontal {
            HorizontalEdge::Left => -1.0,
            HorizontalEdge::Center => 0.0,
            HorizontalEdge::Right => 1.0,
        };
        let dy = match self.vertical {
            VerticalEdge::Top => -1.0,
            VerticalEdge::Center => 0.0,
            VerticalEdge::Bottom => 1.0,
        };
        (dx, dy)
    }

    /// The point of `bounds` this alignment refers to.
    pub fn anchor(&self, bounds: &Rectangle) -> Point {
        let (dx, dy) = self.direction();
        let center = bounds.center();
        Point::new(
            center.x + dx * bounds.width() / 2.0,
            center.y + dy * bounds.height() / 2.0,
        )
    }

    /// Top and bottom rows spread along x; middle rows along y.
    pub fn is_row(&self) -> bool {
        self.vertical != VerticalEdge::Center
    }
}

/// A clickable icon that fires the scene's `action` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMenuItem {
    pub action: String,
    /// Image name resolved through the canvas' image store.
    pub icon: String,
    pub alignment: Alignment,
}

impl ActionMenuItem {
    pub fn new(action: impl Into<String>, icon: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            action: action.into(),
            icon: icon.into(),
            alignment,
        }
    }
}

/// Offset in screen pixels of the item with `before` earlier siblings in a
/// group of `total` items sharing `alignment`.
///
/// Centered groups are spread symmetrically around the anchor. Groups on a
/// left or right edge (top and bottom rows only) grow inward from it.
pub fn sibling_offset(alignment: Alignment, before: usize, total: usize, radius: f64) -> Point {
    let step = radius * 2.0;
    let before = before as f64;
    let centered = step * (before - (total.saturating_sub(1)) as f64 / 2.0);
    if alignment.is_row() {
        let x = match alignment.horizontal {
            HorizontalEdge::Center => centered,
            HorizontalEdge::Left => step * before,
            HorizontalEdge::Right => -step * before,
        };
        Point::new(x, 0.0)
    } else {
        Point::new(0.0, centered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        let tl = Alignment::parse("tl").unwrap();
        assert_eq!(tl, Alignment::new(VerticalEdge::Top, HorizontalEdge::Left));
        assert_eq!(tl.code(), "tl");
        assert!(Alignment::parse("xl").is_none());
        assert!(Alignment::parse("t").is_none());
        assert!(Alignment::parse("tlc").is_none());
    }

    #[test]
    fn test_centered_row_spreads_symmetrically() {
        let tc = Alignment::parse("tc").unwrap();
        let xs: Vec<f64> = (0..3).map(|i| sibling_offset(tc, i, 3, 10.0).x).collect();
        assert_eq!(xs, vec![-20.0, 0.0, 20.0]);
        assert!((sibling_offset(tc, 0, 2, 10.0).x + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edge_rows_grow_inward() {
        let bl = Alignment::parse("bl").unwrap();
        assert_eq!(sibling_offset(bl, 2, 3, 10.0), Point::new(40.0, 0.0));
        let tr = Alignment::parse("tr").unwrap();
        assert_eq!(sibling_offset(tr, 1, 2, 10.0), Point::new(-20.0, 0.0));
    }

    #[test]
    fn test_middle_rows_spread_along_y() {
        let cr = Alignment::parse("cr").unwrap();
        assert_eq!(sibling_offset(cr, 0, 2, 10.0), Point::new(0.0, -10.0));
        assert_eq!(sibling_offset(cr, 1, 2, 10.0), Point::new(0.0, 10.0));
    }

    #[test]
    fn test_anchor_on_bounds() {
        let bounds = Rectangle::new(-50.0, -20.0, 50.0, 20.0);
        assert_eq!(Alignment::parse("br").unwrap().anchor(&bounds), Point::new(50.0, 20.0));
        assert_eq!(Alignment::parse("cl").unwrap().anchor(&bounds), Point::new(-50.0, 0.0));
    }
}
