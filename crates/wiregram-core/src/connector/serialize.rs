//! Persisted connector state.
//!
//! A connector stores its connections as
//! `[{"element": "<id>", "endPointIndex": n, "socketIndex": n}]`. Restoring
//! diffs the stored set against the live one and only touches the
//! difference, so unchanged connections fire no events.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::SocketRef;
use crate::error::SceneResult;
use crate::scene::{ElementId, Scene};

/// One stored connection with the socket owner named by a string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub element: String,
    /// Position among the connector's end points, first to last.
    pub end_point_index: usize,
    pub socket_index: usize,
}

/// A resolved connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub element: ElementId,
    pub end_point_index: usize,
    pub socket_index: usize,
}

impl From<Connection> for ConnectionRecord {
    fn from(connection: Connection) -> Self {
        Self {
            element: connection.element.to_string(),
            end_point_index: connection.end_point_index,
            socket_index: connection.socket_index,
        }
    }
}

/// Resolves stored element keys to live ids.
pub trait ElementLookup {
    fn resolve(&self, key: &str) -> Option<ElementId>;
}

impl ElementLookup for Scene {
    fn resolve(&self, key: &str) -> Option<ElementId> {
        key.parse::<ElementId>().ok().filter(|id| self.contains(*id))
    }
}

/// Explicit key -> id tables, e.g. when pasting with fresh ids.
impl ElementLookup for HashMap<String, ElementId> {
    fn resolve(&self, key: &str) -> Option<ElementId> {
        self.get(key).copied()
    }
}

/// Parse the stored array, skipping entries that do not form a record. Only
/// a document that is not an array at all is an error.
fn parse_records(json: &str) -> SceneResult<Vec<ConnectionRecord>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<ConnectionRecord>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed connection entry: {e}");
                None
            }
        })
        .collect())
}

fn resolve_records(records: &[ConnectionRecord], lookup: &dyn ElementLookup) -> Vec<Connection> {
    records
        .iter()
        .filter_map(|record| match lookup.resolve(&record.element) {
            Some(element) => Some(Connection {
                element,
                end_point_index: record.end_point_index,
                socket_index: record.socket_index,
            }),
            None => {
                log::warn!("Skipping connection to unknown element '{}'", record.element);
                None
            }
        })
        .collect()
}

impl Scene {
    /// Live connections of a connector.
    pub fn connections(&self, connector: ElementId) -> SceneResult<Vec<Connection>> {
        let mut connections = Vec::new();
        for (end_point_index, end_point) in self.end_points(connector)?.into_iter().enumerate() {
            if let Some(socket) = self.end_point_socket(end_point)? {
                connections.push(Connection {
                    element: socket.element,
                    end_point_index,
                    socket_index: socket.index,
                });
            }
        }
        Ok(connections)
    }

    pub fn connections_to_json(&self, connector: ElementId) -> SceneResult<String> {
        let records: Vec<ConnectionRecord> = self
            .connections(connector)?
            .into_iter()
            .map(ConnectionRecord::from)
            .collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Restore connections, resolving element keys against this scene.
    pub fn connections_from_json(&mut self, connector: ElementId, json: &str) -> SceneResult<()> {
        let records = parse_records(json)?;
        let desired = resolve_records(&records, &*self);
        self.set_connections(connector, &desired)
    }

    /// Restore connections, resolving element keys through `lookup`.
    pub fn connections_from_json_with(
        &mut self,
        connector: ElementId,
        json: &str,
        lookup: &dyn ElementLookup,
    ) -> SceneResult<()> {
        let records = parse_records(json)?;
        let desired = resolve_records(&records, lookup);
        self.set_connections(connector, &desired)
    }

    /// Make the connector's connections equal `desired`. Entries naming a
    /// missing end point or socket are skipped.
    pub fn set_connections(&mut self, connector: ElementId, desired: &[Connection]) -> SceneResult<()> {
        let end_points = self.end_points(connector)?;
        let desired: Vec<Connection> = desired
            .iter()
            .filter(|c| {
                let valid = c.end_point_index < end_points.len()
                    && self.socket(SocketRef::new(c.element, c.socket_index)).is_ok();
                if !valid {
                    log::warn!(
                        "Skipping connection of end point {} to socket {} of {}",
                        c.end_point_index,
                        c.socket_index,
                        c.element
                    );
                }
                valid
            })
            .copied()
            .collect();
        let current = self.connections(connector)?;

        for stale in current.iter().filter(|c| !desired.contains(c)) {
            self.disconnect(
                SocketRef::new(stale.element, stale.socket_index),
                Some(end_points[stale.end_point_index]),
            )?;
        }
        for added in desired.iter().filter(|c| !current.contains(c)) {
            self.connect(
                SocketRef::new(added.element, added.socket_index),
                end_points[added.end_point_index],
            )?;
        }
        Ok(())
    }
}
