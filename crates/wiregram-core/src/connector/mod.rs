//! Binding of connector end points to element sockets.
//!
//! An end point and a socket reference each other through arena handles:
//! `EndPoint { socket: Some(s) }` holds exactly when `s`'s end point list
//! contains the end point. Every transition here keeps both sides in step
//! and fires the socket, end point and connector events once per side.

mod serialize;
mod socket;

pub use serialize::{Connection, ConnectionRecord, ElementLookup};
pub use socket::{Socket, SocketAnchor, SocketRef};

use crate::control::{ControlPointKind, ControlPointRef};
use crate::error::{SceneError, SceneResult};
use crate::geometry::Point;
use crate::scene::{ElementId, InteractionKind, Scene, SceneChange};

/// Payload of every connect and disconnect event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub socket: SocketRef,
    pub end_point: ControlPointRef,
}

impl Scene {
    pub fn socket(&self, socket: SocketRef) -> SceneResult<&Socket> {
        self.element(socket.element)?
            .sockets
            .get(socket.index)
            .ok_or(SceneError::SocketNotFound {
                element: socket.element,
                index: socket.index,
            })
    }

    fn socket_mut(&mut self, socket: SocketRef) -> SceneResult<&mut Socket> {
        self.element_mut(socket.element)?
            .sockets
            .get_mut(socket.index)
            .ok_or(SceneError::SocketNotFound {
                element: socket.element,
                index: socket.index,
            })
    }

    /// Socket anchor in the parent coordinates of its element.
    pub fn socket_anchor(&mut self, socket: SocketRef) -> SceneResult<Point> {
        if let Some(anchor) = self.socket(socket)?.cached_anchor() {
            return Ok(anchor);
        }
        let anchor = {
            let element = self.element(socket.element)?;
            let bounds = self.local_bounds(socket.element)?;
            let local = self.socket(socket)?.anchor_fn.compute(element, bounds);
            element.transform_direct(local)
        };
        self.socket_mut(socket)?.set_anchor(anchor);
        Ok(anchor)
    }

    /// Whether `point` (parent coordinates of the socket's element) is
    /// within the socket's hit radius.
    pub fn socket_contains(&mut self, socket: SocketRef, point: Point) -> SceneResult<bool> {
        let anchor = self.socket_anchor(socket)?;
        Ok(anchor.distance_to(point) <= self.viewport.pixels(self.settings.socket_radius))
    }

    /// The end points of a connector, first to last.
    pub fn end_points(&self, connector: ElementId) -> SceneResult<Vec<ControlPointRef>> {
        Ok(self
            .element(connector)?
            .control_points
            .iter()
            .enumerate()
            .filter(|(_, cp)| matches!(cp.kind, ControlPointKind::EndPoint { .. }))
            .map(|(index, _)| ControlPointRef::new(connector, index))
            .collect())
    }

    /// The socket an end point is connected to. `None` for control points
    /// that are not end points.
    pub fn end_point_socket(&self, end_point: ControlPointRef) -> SceneResult<Option<SocketRef>> {
        Ok(match self.control_point(end_point)?.kind {
            ControlPointKind::EndPoint { socket, .. } => socket,
            _ => None,
        })
    }

    fn end_point_vertex(&self, end_point: ControlPointRef) -> SceneResult<Option<usize>> {
        Ok(match self.control_point(end_point)?.kind {
            ControlPointKind::EndPoint { vertex, .. } => Some(vertex),
            _ => None,
        })
    }

    fn set_end_point_socket(&mut self, end_point: ControlPointRef, socket: Option<SocketRef>) -> SceneResult<()> {
        if let ControlPointKind::EndPoint { socket: current, .. } = &mut self.control_point_mut(end_point)?.kind {
            *current = socket;
        }
        Ok(())
    }

    /// Whether any end point of `connector` is connected.
    pub fn has_connections(&self, connector: ElementId) -> SceneResult<bool> {
        Ok(self
            .element(connector)?
            .control_points
            .iter()
            .any(|cp| cp.is_connected()))
    }

    /// Attach an end point to a socket and snap its vertex onto the anchor.
    /// Connecting an already connected pair does nothing.
    pub fn connect(&mut self, socket: SocketRef, end_point: ControlPointRef) -> SceneResult<()> {
        self.socket(socket)?;
        let Some(vertex) = self.end_point_vertex(end_point)? else {
            log::debug!("Control point {} of {} is not an end point", end_point.index, end_point.element);
            return Ok(());
        };
        match self.end_point_socket(end_point)? {
            Some(current) if current == socket => {
                log::debug!("End point already connected to socket {}", socket.index);
                return Ok(());
            }
            Some(current) => self.disconnect(current, Some(end_point))?,
            None => {}
        }

        self.set_end_point_socket(end_point, Some(socket))?;
        self.socket_mut(socket)?.end_points.push(end_point);
        self.snap_end_point(end_point, vertex, socket)?;

        let event = ConnectionEvent { socket, end_point };
        self.events.socket_connect.trigger(&event);
        self.events.end_point_connect.trigger(&event);
        self.events.connector_connect.trigger(&event);
        self.notify(SceneChange::Interact {
            element: end_point.element,
            kind: InteractionKind::Connect,
        });
        log::debug!(
            "Connected {} end point {} to {} socket {}",
            end_point.element,
            end_point.index,
            socket.element,
            socket.index
        );
        debug_assert!(self.connections_consistent(), "connection cross references diverged");
        Ok(())
    }

    /// Detach one end point from a socket, or all of them with `None`.
    /// Detaching an end point that is not connected to the socket does
    /// nothing.
    pub fn disconnect(&mut self, socket: SocketRef, end_point: Option<ControlPointRef>) -> SceneResult<()> {
        let connected = self.socket(socket)?.end_points.clone();
        let targets = match end_point {
            Some(ep) if connected.contains(&ep) => vec![ep],
            Some(ep) => {
                log::debug!("End point {} of {} is not connected to socket {}", ep.index, ep.element, socket.index);
                return Ok(());
            }
            None => connected,
        };

        for ep in targets {
            self.socket_mut(socket)?.end_points.retain(|e| *e != ep);
            if self.contains(ep.element) {
                self.set_end_point_socket(ep, None)?;
            }
            let event = ConnectionEvent { socket, end_point: ep };
            self.events.socket_disconnect.trigger(&event);
            self.events.end_point_disconnect.trigger(&event);
            self.events.connector_disconnect.trigger(&event);
            self.notify(SceneChange::Interact {
                element: ep.element,
                kind: InteractionKind::Disconnect,
            });
            log::debug!("Disconnected {} end point {} from socket {}", ep.element, ep.index, socket.index);
        }
        debug_assert!(self.connections_consistent(), "connection cross references diverged");
        Ok(())
    }

    pub fn disconnect_end_point(&mut self, end_point: ControlPointRef) -> SceneResult<()> {
        match self.end_point_socket(end_point)? {
            Some(socket) => self.disconnect(socket, Some(end_point)),
            None => Ok(()),
        }
    }

    /// Detach every end point of a connector.
    pub fn disconnect_connector(&mut self, connector: ElementId) -> SceneResult<()> {
        for end_point in self.end_points(connector)? {
            self.disconnect_end_point(end_point)?;
        }
        Ok(())
    }

    /// Map a point from the parent space of `from` to the parent space of
    /// `to`.
    fn between_parents(&self, from: ElementId, to: ElementId, point: Point) -> SceneResult<Point> {
        if self.element(from)?.parent == self.element(to)?.parent {
            return Ok(point);
        }
        let root = self.parent_to_root(from, point)?;
        self.root_to_parent(to, root)
    }

    /// Put a connected vertex exactly on its socket's anchor.
    fn snap_end_point(&mut self, end_point: ControlPointRef, vertex: usize, socket: SocketRef) -> SceneResult<()> {
        let anchor = self.socket_anchor(socket)?;
        let anchor = self.between_parents(socket.element, end_point.element, anchor)?;
        let local = self.element(end_point.element)?.transform_inverse(anchor);
        self.set_vertex(end_point.element, vertex, local)
    }

    /// Re-snap every end point connected to the sockets of `id` (and of
    /// its descendants) after `id` changed shape or position.
    pub fn update_connections(&mut self, id: ElementId) -> SceneResult<()> {
        let element = self.element(id)?;
        let children = element.children().map(<[_]>::to_vec).unwrap_or_default();
        let socket_count = element.sockets.len();
        for index in 0..socket_count {
            let socket = SocketRef::new(id, index);
            self.socket_mut(socket)?.invalidate_anchor();
            for end_point in self.socket(socket)?.end_points.clone() {
                if let Some(vertex) = self.end_point_vertex(end_point)? {
                    self.snap_end_point(end_point, vertex, socket)?;
                }
            }
        }
        for child in children {
            self.update_connections(child)?;
        }
        Ok(())
    }

    /// Connect, keep or drop an end point's connection after it moved.
    ///
    /// The current socket wins while the end point stays inside it. Other
    /// sockets are searched among the connector's siblings, top-most
    /// first.
    pub(crate) fn check_connect(&mut self, end_point: ControlPointRef) -> SceneResult<()> {
        let Some(vertex) = self.end_point_vertex(end_point)? else {
            return Ok(());
        };
        let point = {
            let connector = self.element(end_point.element)?;
            let local = connector
                .points()
                .and_then(|points| points.get(vertex).copied())
                .unwrap_or(Point::ZERO);
            connector.transform_direct(local)
        };

        let current = self.end_point_socket(end_point)?;
        let kept = match current {
            Some(socket) => {
                let p = self.between_parents(end_point.element, socket.element, point)?;
                self.socket_contains(socket, p)?.then_some(socket)
            }
            None => None,
        };
        let target = match kept {
            Some(socket) => Some(socket),
            None => self.socket_at(end_point.element, point)?,
        };
        self.hovered_socket_element = match target {
            Some(socket) => Some(socket.element),
            None => self.hoverable_element_at(end_point.element, point),
        };

        match (current, target) {
            (Some(current), Some(target)) if current == target => {
                self.snap_end_point(end_point, vertex, target)
            }
            (_, Some(target)) => self.connect(target, end_point),
            (Some(current), None) => self.disconnect(current, Some(end_point)),
            (None, None) => Ok(()),
        }
    }

    /// Top-most sibling socket of `connector` containing `point`.
    fn socket_at(&mut self, connector: ElementId, point: Point) -> SceneResult<Option<SocketRef>> {
        let Some(parent) = self.element(connector)?.parent else {
            return Ok(None);
        };
        for sibling in self.children(parent)?.to_vec().into_iter().rev() {
            if sibling == connector {
                continue;
            }
            for index in 0..self.element(sibling)?.sockets.len() {
                let socket = SocketRef::new(sibling, index);
                if self.socket_contains(socket, point)? {
                    return Ok(Some(socket));
                }
            }
        }
        Ok(None)
    }

    /// Top-most sibling with sockets whose outline is near `point`.
    fn hoverable_element_at(&self, connector: ElementId, point: Point) -> Option<ElementId> {
        let parent = self.get(connector)?.parent?;
        let tolerance = self.viewport.pixels(self.settings.socket_radius);
        self.children(parent)
            .ok()?
            .iter()
            .rev()
            .filter(|id| **id != connector)
            .filter_map(|id| self.get(*id))
            .find(|e| !e.sockets.is_empty() && e.contains_point(point, tolerance))
            .map(|e| e.id)
    }

    /// Whether every end point / socket pair references each other.
    pub fn connections_consistent(&self) -> bool {
        self.elements.values().all(|element| {
            let end_points_ok = element.control_points.iter().enumerate().all(|(index, cp)| match cp.kind {
                ControlPointKind::EndPoint { socket: Some(socket), .. } => self
                    .socket(socket)
                    .is_ok_and(|s| s.end_points.contains(&ControlPointRef::new(element.id, index))),
                _ => true,
            });
            let sockets_ok = element.sockets.iter().enumerate().all(|(index, socket)| {
                socket.end_points.iter().all(|ep| {
                    self.end_point_socket(*ep)
                        .is_ok_and(|s| s == Some(SocketRef::new(element.id, index)))
                })
            });
            end_points_ok && sockets_ok
        })
    }
}
