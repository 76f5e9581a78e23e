//! SVG output for a laid-out [`Scene`].

use std::fmt::Write;

use crate::model::EventId;
use crate::scene::{GuideKind, LabelKind, MarkerState, Scene};
use crate::theme::Theme;
use crate::xml::escape_xml;

const EMPTY_MESSAGE: &str = "No events to display.";

/// Colors and strokes used when drawing a scene.
#[derive(Debug, Clone)]
pub struct TimelineStyle {
    pub background: String,
    pub text: String,
    pub muted_text: String,
    pub grid_stroke: String,
    pub axis_stroke: String,
    pub highlight_stroke: String,
    pub font_family: String,
    pub font_size: f64,
    pub path_width: f64,
    pub grid_width: f64,
    pub highlight_width: f64,
    pub empty_message: String,
}

impl Default for TimelineStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#000000".to_string(),
            muted_text: "#666666".to_string(),
            grid_stroke: "#cccccc".to_string(),
            axis_stroke: "#000000".to_string(),
            highlight_stroke: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
            path_width: 3.0,
            grid_width: 1.0,
            highlight_width: 2.0,
            empty_message: EMPTY_MESSAGE.to_string(),
        }
    }
}

impl TimelineStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        let background = theme.background_color.as_str();
        // Gridlines stay subtle; the axis and hover ring must stand out.
        let grid = pick_lower_contrast(background, &theme.neutral_light, &theme.neutral_dark);
        let strong = pick_higher_contrast(background, &theme.text_color, &theme.neutral_dark);

        Self {
            background: theme.background_color.clone(),
            text: theme.text_color.clone(),
            muted_text: theme.muted_text_color.clone(),
            grid_stroke: grid,
            axis_stroke: strong.clone(),
            highlight_stroke: strong,
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            ..Self::default()
        }
    }
}

fn parse_hex_rgb(value: &str) -> Option<(f64, f64, f64)> {
    let hex = value.trim_start_matches('#');
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(expanded.get(range)?, 16)
            .ok()
            .map(|v| v as f64 / 255.0)
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn relative_luminance(color: (f64, f64, f64)) -> f64 {
    let linear = |v: f64| {
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let (r, g, b) = color;
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

fn contrast_ratio(a: &str, b: &str) -> Option<f64> {
    let l1 = relative_luminance(parse_hex_rgb(a)?);
    let l2 = relative_luminance(parse_hex_rgb(b)?);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    Some((hi + 0.05) / (lo + 0.05))
}

fn pick_higher_contrast(base: &str, primary: &str, secondary: &str) -> String {
    let p = contrast_ratio(base, primary).unwrap_or(0.0);
    let s = contrast_ratio(base, secondary).unwrap_or(0.0);

    if s > p {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

fn pick_lower_contrast(base: &str, primary: &str, secondary: &str) -> String {
    let p = contrast_ratio(base, primary).unwrap_or(f64::MAX);
    let s = contrast_ratio(base, secondary).unwrap_or(f64::MAX);

    if s < p {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

/// Renders `scene` as a standalone SVG document.
///
/// `hovered` is the caller's hover state: that event's markers are drawn at
/// their enlarged radius with a highlight ring. Markers carry
/// `data-event-id` so a host page can route clicks back to the event.
pub fn render_scene(scene: &Scene, style: &TimelineStyle, hovered: Option<EventId>) -> String {
    let mut svg = String::new();
    let (w, h) = (scene.width, scene.height);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{w}" height="{h}" fill="{}"/>"#,
        style.background
    );

    if scene.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
            w / 2.0,
            h / 2.0,
            style.font_family,
            style.font_size * 1.4,
            style.muted_text,
            escape_xml(&style.empty_message)
        );
        svg.push_str("</svg>");
        return svg;
    }

    if let Some(marker) = scene.markers.first() {
        let _ = write!(
            svg,
            "<style>.marker{{cursor:pointer}}.marker:hover{{r:{}px;stroke:{};stroke-width:{}}}</style>",
            marker.hover_radius, style.highlight_stroke, style.highlight_width
        );
    }

    for line in &scene.lines {
        let (stroke, width) = match line.kind {
            GuideKind::Grid => (&style.grid_stroke, style.grid_width),
            GuideKind::Axis => (&style.axis_stroke, style.grid_width),
        };
        let _ = write!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
            line.from.x, line.from.y, line.to.x, line.to.y, stroke, width
        );
    }

    for label in &scene.labels {
        let fill = match label.kind {
            LabelKind::Year => &style.muted_text,
            LabelKind::Range | LabelKind::Column => &style.text,
        };
        let transform = if label.rotation != 0.0 {
            format!(
                r#" transform="rotate({} {:.2} {:.2})""#,
                label.rotation, label.at.x, label.at.y
            )
        } else {
            String::new()
        };
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="{}"{}>{}</text>"#,
            label.at.x,
            label.at.y,
            style.font_family,
            style.font_size,
            fill,
            label.anchor.as_svg(),
            transform,
            escape_xml(&label.text)
        );
    }

    for path in &scene.paths {
        let _ = write!(
            svg,
            r#"<path d="{}" stroke="{}" stroke-width="{}" fill="none"/>"#,
            path.path_data(),
            escape_xml(&path.color),
            style.path_width
        );
    }

    for marker in &scene.markers {
        let state = if hovered == Some(marker.event_id) {
            MarkerState::Hovered
        } else {
            MarkerState::Idle
        };
        let ring = match state {
            MarkerState::Hovered => format!(
                r#" stroke="{}" stroke-width="{}""#,
                style.highlight_stroke, style.highlight_width
            ),
            MarkerState::Idle => String::new(),
        };
        let _ = write!(
            svg,
            r#"<circle class="marker" data-event-id="{}" data-tag-id="{}" cx="{:.2}" cy="{:.2}" r="{}" fill="{}"{}><title>{}</title></circle>"#,
            marker.event_id,
            marker.tag_id,
            marker.center.x,
            marker.center.y,
            marker.radius_for(state),
            escape_xml(&marker.fill),
            ring,
            escape_xml(&marker.title)
        );
    }

    svg.push_str("</svg>");
    svg
}
