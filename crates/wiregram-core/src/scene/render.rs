//! Drawing the scene onto a [`Canvas`].

use std::f64::consts::TAU;

use crate::canvas::Canvas;
use crate::connector::SocketRef;
use crate::control::{ControlPointKind, ControlPointPainter, ControlPointRef, FocusType};
use crate::error::SceneResult;
use crate::geometry::{Point, Polygon, Rectangle};
use crate::transform::TransformSet;

use super::{ElementId, ElementKind, Scene};

/// Half-angle between an arrow head's wings.
const ARROW_SPREAD: f64 = 0.45;

impl Scene {
    /// Draw every element back to front, then selection and socket
    /// overlays.
    pub fn draw(&mut self, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        for id in self.children(self.root())?.to_vec() {
            self.draw_element(id, canvas)?;
        }
        if let Some(hovered) = self.hovered_socket_element {
            self.draw_sockets(hovered, canvas)?;
        }
        for id in self.selection.clone() {
            self.draw_selection(id, canvas)?;
        }
        Ok(())
    }

    /// Draw one element (and, for containers, its children).
    pub fn draw_element(&self, id: ElementId, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        let element = self.element(id)?;
        let transform = self.transform_set_for(id)?;
        let bounds = element.local_bounds();
        let stroke = self.styles.stroke(&element.stroke_style);
        let fill = element.fill_style.as_deref().map(|name| self.styles.fill(name));

        match &element.kind {
            ElementKind::Rectangle => {
                canvas.draw_rect(bounds);
                canvas.paint(Some(stroke), fill, &transform);
            }
            ElementKind::Ellipse => {
                canvas.draw_arc(Point::ZERO, bounds.width() / 2.0, bounds.height() / 2.0, 0.0, TAU, false);
                canvas.paint(Some(stroke), fill, &transform);
            }
            ElementKind::Polygon { points, closed } => {
                canvas.draw_poly(&Polygon::new(points.clone()), *closed);
                canvas.paint(Some(stroke), fill.filter(|_| *closed), &transform);
            }
            ElementKind::Connector { points, arrow } => {
                canvas.draw_poly(&Polygon::new(points.clone()), false);
                if let (true, [.., before, last]) = (*arrow, points.as_slice()) {
                    let back = last.angle_to(*before);
                    let length = stroke.line_width * 4.0 + 6.0;
                    canvas.draw_line(*last, last.point_at(back + ARROW_SPREAD, length));
                    canvas.draw_line(*last, last.point_at(back - ARROW_SPREAD, length));
                }
                canvas.paint(Some(stroke), None, &transform);
            }
            ElementKind::Text { text } => {
                if fill.is_some() {
                    canvas.draw_rect(bounds);
                    canvas.paint(None, fill, &transform);
                }
                let style = self.styles.text(&element.text_style);
                canvas.draw_text(text, bounds, style, &transform);
            }
            ElementKind::Image { name } => {
                canvas.draw_image(name, bounds, &transform);
            }
            ElementKind::Container { children } => {
                for child in children {
                    self.draw_element(*child, canvas)?;
                }
            }
        }
        Ok(())
    }

    /// Parent coordinates of `id` -> window.
    fn parent_transform_set(&self, id: ElementId) -> SceneResult<TransformSet> {
        match self.element(id)?.parent {
            Some(parent) => self.transform_set_for(parent),
            None => Ok(self.viewport.transform_set()),
        }
    }

    fn draw_selection(&mut self, id: ElementId, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        let transform = self.transform_set_for(id)?;
        let bounds = self.local_bounds(id)?;
        canvas.draw_rect(bounds);
        canvas.paint(Some(self.styles.stroke("selection")), None, &transform);

        let parent_transform = self.parent_transform_set(id)?;
        let rotation = self.element(id)?.rotation;
        let zoom = self.viewport.zoom;
        let stroke = self.styles.stroke("control-point").clone();
        let fill = self.styles.fill("control-point").clone();
        let connected_fill = self.styles.fill("socket").clone();

        for index in 0..self.element(id)?.control_points.len() {
            let cp = ControlPointRef::new(id, index);
            let anchor = self.control_point_anchor(cp)?;
            let control = self.control_point(cp)?;
            let mut radius = self.control_point_radius(&control.kind);
            if control.focus == FocusType::Hovered {
                radius *= 1.3;
            }
            let kind = control.kind.clone();
            let mut painter = ControlPointPainter::new(
                canvas,
                anchor,
                zoom,
                kind.is_drawn_rotated().then_some(rotation),
                parent_transform.clone(),
            );
            match &kind {
                ControlPointKind::Resize(_) | ControlPointKind::Proportional(_) => {
                    painter.draw_rect(Rectangle::new(-radius, -radius, radius, radius));
                    painter.paint(Some(&stroke), Some(&fill));
                }
                ControlPointKind::Rotate | ControlPointKind::Vertex(_) => {
                    painter.draw_arc(Point::ZERO, radius, radius, 0.0, TAU, false);
                    painter.paint(Some(&stroke), Some(&fill));
                }
                ControlPointKind::EndPoint { socket, .. } => {
                    painter.draw_arc(Point::ZERO, radius, radius, 0.0, TAU, false);
                    let fill = if socket.is_some() { &connected_fill } else { &fill };
                    painter.paint(Some(&stroke), Some(fill));
                }
                ControlPointKind::ActionMenu(item) => {
                    painter.draw_arc(Point::ZERO, radius, radius, 0.0, TAU, false);
                    painter.paint(Some(&stroke), Some(&fill));
                    let icon = radius * 0.7;
                    painter.draw_image(&item.icon, Rectangle::new(-icon, -icon, icon, icon));
                }
            }
        }
        Ok(())
    }

    /// Highlight the sockets of the element an end point is dragged over.
    fn draw_sockets(&mut self, id: ElementId, canvas: &mut Canvas<'_>) -> SceneResult<()> {
        if !self.contains(id) {
            return Ok(());
        }
        let parent_transform = self.parent_transform_set(id)?;
        let zoom = self.viewport.zoom;
        let radius = self.settings.socket_radius;
        let stroke = self.styles.stroke("control-point").clone();
        let fill = self.styles.fill("socket").clone();
        for index in 0..self.element(id)?.sockets.len() {
            let anchor = self.socket_anchor(SocketRef::new(id, index))?;
            let mut painter = ControlPointPainter::new(canvas, anchor, zoom, None, parent_transform.clone());
            painter.draw_arc(Point::ZERO, radius, radius, 0.0, TAU, false);
            painter.paint(Some(&stroke), Some(&fill));
        }
        Ok(())
    }
}
