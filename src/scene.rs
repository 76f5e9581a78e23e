//! Layout output: everything needed to draw a timeline, already in canvas
//! coordinates.

use std::fmt::Write;

use crate::model::{EventId, TagId};

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One event placed on a lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneEntry {
    pub event_id: EventId,
    /// Linearized date (chronological) or story-order column (sequential).
    pub position: i64,
    pub point: Point,
}

/// One horizontal track, one per tag of the grouped tag type.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub tag_id: TagId,
    pub name: String,
    pub color: String,
    pub y: f64,
    pub entries: Vec<LaneEntry>,
}

/// A smoothed polyline joining a lane's events.
#[derive(Debug, Clone, PartialEq)]
pub struct LanePath {
    pub tag_id: TagId,
    pub color: String,
    pub points: Vec<Point>,
}

impl LanePath {
    /// SVG path data for the lane, see [`smooth_path`].
    pub fn path_data(&self) -> String {
        smooth_path(&self.points)
    }
}

/// A clickable event dot.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub event_id: EventId,
    pub tag_id: TagId,
    pub center: Point,
    pub radius: f64,
    pub hover_radius: f64,
    pub fill: String,
    pub title: String,
}

impl PointMarker {
    pub fn radius_for(&self, state: MarkerState) -> f64 {
        match state {
            MarkerState::Idle => self.radius,
            MarkerState::Hovered => self.hover_radius,
        }
    }

    pub fn contains(&self, point: Point, state: MarkerState) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let r = self.radius_for(state);
        dx * dx + dy * dy <= r * r
    }
}

/// Caller-owned pointer state of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerState {
    #[default]
    Idle,
    Hovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    /// Vertical line at a year (chronological) or story column (sequential).
    Grid,
    /// Horizontal time axis.
    Axis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub kind: GuideKind,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Top-level segment value under a year gridline.
    Year,
    /// First/last date of the shown range.
    Range,
    /// Event title above a sequential column.
    Column,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuideLabel {
    pub kind: LabelKind,
    pub text: String,
    pub at: Point,
    pub anchor: TextAnchor,
    /// Rotation in degrees around `at`.
    pub rotation: f64,
}

/// A fully laid out timeline.
///
/// An empty `lanes` list means there is nothing to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub lanes: Vec<Lane>,
    pub paths: Vec<LanePath>,
    pub markers: Vec<PointMarker>,
    pub lines: Vec<GuideLine>,
    pub labels: Vec<GuideLabel>,
}

impl Scene {
    pub fn empty(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            lanes: Vec::new(),
            paths: Vec::new(),
            markers: Vec::new(),
            lines: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Topmost marker under `point`, if any.
    ///
    /// `hovered` is the caller's currently hovered event so its enlarged
    /// radius is honoured. Markers drawn later sit on top and win.
    pub fn hit_test(&self, point: Point, hovered: Option<EventId>) -> Option<&PointMarker> {
        self.markers.iter().rev().find(|marker| {
            let state = if hovered == Some(marker.event_id) {
                MarkerState::Hovered
            } else {
                MarkerState::Idle
            };
            marker.contains(point, state)
        })
    }
}

/// Builds one continuous path through `points`, each segment a cubic whose
/// control points sit a third of the horizontal gap inward at the segment's
/// end heights: `M x1 y1 C (x1+off) y1, (x2-off) y2, x2 y2 ...`.
///
/// Fewer than two points produce an empty string.
pub fn smooth_path(points: &[Point]) -> String {
    let mut d = String::new();
    if points.len() < 2 {
        return d;
    }

    for (i, pair) in points.windows(2).enumerate() {
        let (p1, p2) = (pair[0], pair[1]);
        let offset = (p2.x - p1.x) / 3.0;
        if i == 0 {
            let _ = write!(d, "M {} {} ", p1.x, p1.y);
        }
        let _ = write!(
            d,
            "C {} {}, {} {}, {} {} ",
            p1.x + offset,
            p1.y,
            p2.x - offset,
            p2.y,
            p2.x,
            p2.y
        );
    }

    d.truncate(d.trim_end().len());
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(event_id: EventId, x: f64, y: f64) -> PointMarker {
        PointMarker {
            event_id,
            tag_id: 1,
            center: Point::new(x, y),
            radius: 8.0,
            hover_radius: 13.0,
            fill: "#f00".to_string(),
            title: String::new(),
        }
    }

    #[test]
    fn smooth_path_uses_third_offsets() {
        let d = smooth_path(&[Point::new(50.0, 30.0), Point::new(80.0, 30.0)]);
        assert_eq!(d, "M 50 30 C 60 30, 70 30, 80 30");
    }

    #[test]
    fn smooth_path_chains_segments() {
        let d = smooth_path(&[
            Point::new(0.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(90.0, 10.0),
        ]);
        assert_eq!(d, "M 0 10 C 10 10, 20 10, 30 10 C 50 10, 70 10, 90 10");
        assert_eq!(d.matches('M').count(), 1);
    }

    #[test]
    fn smooth_path_needs_two_points() {
        assert!(smooth_path(&[]).is_empty());
        assert!(smooth_path(&[Point::new(1.0, 2.0)]).is_empty());
    }

    #[test]
    fn hover_enlarges_hit_area() {
        let m = marker(1, 100.0, 30.0);
        let pointer = Point::new(110.0, 30.0);
        assert!(!m.contains(pointer, MarkerState::Idle));
        assert!(m.contains(pointer, MarkerState::Hovered));
    }

    #[test]
    fn hit_test_prefers_topmost_marker() {
        let mut scene = Scene::empty(200.0, 100.0);
        scene.lanes.push(Lane {
            tag_id: 1,
            name: "a".to_string(),
            color: "#f00".to_string(),
            y: 30.0,
            entries: Vec::new(),
        });
        scene.markers.push(marker(1, 100.0, 30.0));
        scene.markers.push(marker(2, 104.0, 30.0));

        let hit = scene.hit_test(Point::new(102.0, 30.0), None).unwrap();
        assert_eq!(hit.event_id, 2);
        assert!(scene.hit_test(Point::new(150.0, 30.0), None).is_none());
        assert_eq!(
            scene.hit_test(Point::new(116.0, 30.0), Some(2)).map(|m| m.event_id),
            Some(2)
        );
    }
}
