//! Scene-wide settings supplied by the host.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, snapped_angle};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Tunables read by the interaction core. Angles are stored in degrees and
/// radii in screen pixels; helpers convert to radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    /// Snap created and moved elements to the grid.
    #[serde(default)]
    pub snap_to_grid: bool,
    /// Rotation snaps to multiples of this angle.
    #[serde(default = "default_snap_angle")]
    pub snap_angle: f64,
    /// Width of the window around each multiple in which snapping applies.
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    #[serde(default = "default_control_point_radius")]
    pub control_point_radius: f64,
    #[serde(default = "default_end_point_radius")]
    pub end_point_radius: f64,
    #[serde(default = "default_socket_radius")]
    pub socket_radius: f64,
    #[serde(default = "default_action_menu_radius")]
    pub action_menu_radius: f64,
    /// Distance of the rotation handle above the element's top edge.
    #[serde(default = "default_rotation_handle_distance")]
    pub rotation_handle_distance: f64,
    /// Smallest width or height a resize can produce, in scene units.
    #[serde(default = "default_min_element_size")]
    pub min_element_size: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

fn default_grid_size() -> f64 {
    GRID_SIZE
}

fn default_snap_angle() -> f64 {
    15.0
}

fn default_snap_threshold() -> f64 {
    6.0
}

fn default_control_point_radius() -> f64 {
    4.5
}

fn default_end_point_radius() -> f64 {
    5.0
}

fn default_socket_radius() -> f64 {
    8.0
}

fn default_action_menu_radius() -> f64 {
    10.0
}

fn default_rotation_handle_distance() -> f64 {
    25.0
}

fn default_min_element_size() -> f64 {
    5.0
}

fn default_min_zoom() -> f64 {
    0.1
}

fn default_max_zoom() -> f64 {
    10.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            snap_to_grid: false,
            snap_angle: default_snap_angle(),
            snap_threshold: default_snap_threshold(),
            control_point_radius: default_control_point_radius(),
            end_point_radius: default_end_point_radius(),
            socket_radius: default_socket_radius(),
            action_menu_radius: default_action_menu_radius(),
            rotation_handle_distance: default_rotation_handle_distance(),
            min_element_size: default_min_element_size(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Snap `angle` (radians) to the configured multiple, if close enough.
    pub fn snap_rotation(&self, angle: f64) -> Option<f64> {
        snapped_angle(angle, self.snap_angle.to_radians(), self.snap_threshold.to_radians())
    }

    /// Round to the nearest grid intersection when grid snapping is on.
    pub fn snap_point(&self, point: Point) -> Point {
        if !self.snap_to_grid || self.grid_size <= 0.0 {
            return point;
        }
        Point::new(
            (point.x / self.grid_size).round() * self.grid_size,
            (point.y / self.grid_size).round() * self.grid_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!((settings.grid_size - GRID_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_overrides() {
        let settings = Settings::from_json(r#"{ "socket_radius": 12.0, "snap_to_grid": true }"#).unwrap();
        assert!((settings.socket_radius - 12.0).abs() < f64::EPSILON);
        assert!(settings.snap_to_grid);
        assert!((settings.end_point_radius - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = Settings::default();
        settings.snap_angle = 45.0;
        let restored = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_snap_point() {
        let mut settings = Settings::default();
        let p = Point::new(27.0, 33.0);
        assert_eq!(settings.snap_point(p), p);
        settings.snap_to_grid = true;
        assert_eq!(settings.snap_point(p), Point::new(20.0, 40.0));
    }

    #[test]
    fn test_snap_rotation() {
        let settings = Settings::default();
        let snapped = settings.snap_rotation(31.0_f64.to_radians()).unwrap();
        assert!((snapped - 30.0_f64.to_radians()).abs() < 1e-9);
        assert_eq!(settings.snap_rotation(37.0_f64.to_radians()), None);
    }
}
