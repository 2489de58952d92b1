//! Greedy word-wrapping text layout.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rectangle};
use crate::style::TextStyle;

use super::TextMeasure;

/// Horizontal justification of laid out lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical justification of the whole block of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// One laid out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Character offset of the first character in the source text.
    pub start: usize,
    /// Box occupied by the line. `fill_text` is issued at its top-left corner.
    pub bounds: Rectangle,
    /// X offsets of every character boundary relative to `bounds.x1`,
    /// one more entry than there are characters.
    boundaries: Vec<f64>,
}

impl TextLine {
    /// Number of characters on the line.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the last character offset.
    pub fn end(&self) -> usize {
        self.start + self.len()
    }
}

/// Result of [`layout_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<TextLine>,
    pub line_height: f64,
}

impl TextLayout {
    /// Union of all line boxes.
    pub fn bounds(&self) -> Rectangle {
        let mut iter = self.lines.iter().map(|l| l.bounds);
        let Some(first) = iter.next() else {
            return Rectangle::ZERO;
        };
        iter.fold(first, |acc, r| acc.union(&r))
    }

    /// Character offset nearest to `point`. Points above or below the text
    /// resolve to the first or last line.
    pub fn cursor_at(&self, point: Point) -> usize {
        let Some(line) = self
            .lines
            .iter()
            .find(|l| point.y < l.bounds.y2)
            .or_else(|| self.lines.last())
        else {
            return 0;
        };
        let local_x = point.x - line.bounds.x1;
        let index = line
            .boundaries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - local_x).abs().total_cmp(&(*b - local_x).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        line.start + index
    }

    /// Top of the caret placed before character `offset`, and the line
    /// height. Offsets past the end clamp to the end of the text.
    pub fn cursor_position(&self, offset: usize) -> Point {
        let Some(last) = self.lines.last() else {
            return Point::ZERO;
        };
        let line = self
            .lines
            .iter()
            .find(|l| offset <= l.end())
            .unwrap_or(last);
        let index = offset.saturating_sub(line.start).min(line.len());
        Point::new(line.bounds.x1 + line.boundaries[index], line.bounds.y1)
    }
}

/// Break `text` into lines no wider than `bounds` (a single word wider than
/// the box gets a line of its own), honoring explicit newlines, and place
/// each line according to the style's justification.
pub fn layout_text(
    text: &str,
    bounds: Rectangle,
    style: &TextStyle,
    measure: &dyn TextMeasure,
) -> TextLayout {
    let width = bounds.width();
    let mut raw_lines: Vec<(String, usize)> = Vec::new();
    let mut offset = 0;

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_start = offset;
        for (i, word) in paragraph.split(' ').enumerate() {
            if i == 0 {
                current.push_str(word);
                offset += word.chars().count();
                continue;
            }
            let candidate = format!("{current} {word}");
            if current.is_empty() || measure.measure_text(&candidate, &style.font) <= width {
                current = candidate;
            } else {
                raw_lines.push((std::mem::take(&mut current), current_start));
                current.push_str(word);
                current_start = offset + 1;
            }
            offset += 1 + word.chars().count();
        }
        raw_lines.push((current, current_start));
        // The newline itself.
        offset += 1;
    }

    let line_height = style.font.size * style.line_height;
    let total_height = line_height * raw_lines.len() as f64;
    let top = match style.vertical_align {
        VerticalAlign::Top => bounds.y1,
        VerticalAlign::Middle => bounds.center().y - total_height / 2.0,
        VerticalAlign::Bottom => bounds.y2 - total_height,
    };

    let lines = raw_lines
        .into_iter()
        .enumerate()
        .map(|(i, (text, start))| {
            let mut boundaries = vec![0.0];
            let mut prefix = String::new();
            for c in text.chars() {
                prefix.push(c);
                boundaries.push(measure.measure_text(&prefix, &style.font));
            }
            let line_width = boundaries.last().copied().unwrap_or(0.0);
            let x = match style.align {
                HorizontalAlign::Left => bounds.x1,
                HorizontalAlign::Center => bounds.center().x - line_width / 2.0,
                HorizontalAlign::Right => bounds.x2 - line_width,
            };
            let y = top + line_height * i as f64;
            TextLine {
                text,
                start,
                bounds: Rectangle::new(x, y, x + line_width, y + line_height),
                boundaries,
            }
        })
        .collect();

    TextLayout { lines, line_height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Font, RecordingSurface};

    fn style(align: HorizontalAlign, vertical_align: VerticalAlign) -> TextStyle {
        TextStyle {
            font: Font::new("mono", 10.0),
            line_height: 1.0,
            align,
            vertical_align,
            ..TextStyle::default()
        }
    }

    #[test]
    fn test_greedy_wrap() {
        // 6 units per character.
        let measure = RecordingSurface::new();
        let layout = layout_text(
            "hello world foo",
            Rectangle::new(0.0, 0.0, 70.0, 100.0),
            &style(HorizontalAlign::Left, VerticalAlign::Top),
            &measure,
        );
        let texts: Vec<_> = layout.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["hello world", "foo"]);
        assert_eq!(layout.lines[1].start, 12);
        assert!((layout.lines[1].bounds.y1 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_newlines_and_long_words() {
        let measure = RecordingSurface::new();
        let layout = layout_text(
            "a\n\nsupercalifragilistic",
            Rectangle::new(0.0, 0.0, 30.0, 100.0),
            &style(HorizontalAlign::Left, VerticalAlign::Top),
            &measure,
        );
        let texts: Vec<_> = layout.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "supercalifragilistic"]);
        assert_eq!(layout.lines[2].start, 3);
    }

    #[test]
    fn test_justification() {
        let measure = RecordingSurface::new();
        let layout = layout_text(
            "foo",
            Rectangle::new(0.0, 0.0, 100.0, 100.0),
            &style(HorizontalAlign::Center, VerticalAlign::Middle),
            &measure,
        );
        let line = &layout.lines[0];
        assert!((line.bounds.x1 - 41.0).abs() < 1e-9);
        assert!((line.bounds.y1 - 45.0).abs() < 1e-9);

        let layout = layout_text(
            "foo",
            Rectangle::new(0.0, 0.0, 100.0, 100.0),
            &style(HorizontalAlign::Right, VerticalAlign::Bottom),
            &measure,
        );
        assert_eq!(layout.lines[0].bounds, Rectangle::new(82.0, 90.0, 100.0, 100.0));
    }

    #[test]
    fn test_cursor_hit_testing() {
        let measure = RecordingSurface::new();
        let layout = layout_text(
            "hello world foo",
            Rectangle::new(0.0, 0.0, 70.0, 100.0),
            &style(HorizontalAlign::Left, VerticalAlign::Top),
            &measure,
        );
        assert_eq!(layout.cursor_at(Point::new(13.0, 5.0)), 2);
        assert_eq!(layout.cursor_at(Point::new(500.0, 15.0)), 15);
        assert_eq!(layout.cursor_at(Point::new(-5.0, 500.0)), 12);
        assert_eq!(layout.cursor_position(13), Point::new(6.0, 10.0));
    }
}
