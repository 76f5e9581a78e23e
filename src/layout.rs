//! Timeline layout engine.
//!
//! [`compute_scene`] turns a story's tagged events into a [`Scene`]: one lane
//! per tag of the grouped tag type, events placed either on a shared time
//! axis (chronological) or in story order (sequential). The function is pure;
//! identical inputs always give identical scenes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::date::DateFormat;
use crate::error::LayoutError;
use crate::model::{Event, TagAssociation, TagId, TagTypeId};
use crate::scene::{
    GuideKind, GuideLabel, GuideLine, LabelKind, Lane, LaneEntry, LanePath, Point, PointMarker,
    Scene, TextAnchor,
};

const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 50.0;
const CHRONOLOGICAL_TOP: f64 = 0.0;
const SEQUENTIAL_TOP: f64 = 60.0;
const CHRONOLOGICAL_LANE_HEIGHT: f64 = 30.0;
const SEQUENTIAL_LANE_HEIGHT: f64 = 40.0;
const MARKER_RADIUS: f64 = 8.0;
const HOVER_RADIUS: f64 = 13.0;
const AXIS_OFFSET: f64 = 20.0;
const LABEL_OFFSET: f64 = 5.0;
const MAX_YEAR_LABELS: usize = 10;
const MAX_YEAR_GRIDLINES: usize = 2000;
const COLUMN_LABEL_GAP: f64 = 10.0;
const COLUMN_LABEL_ROTATION: f64 = -45.0;
const DEGENERATE_SPAN: i64 = 1;

/// How events are ordered along the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Shared time axis built from linearized dates.
    #[default]
    Chronological,
    /// One column per qualifying event, in story order; dates are ignored.
    Sequential,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chronological" | "date" => Ok(SortMode::Chronological),
            "sequential" | "story" | "plot" => Ok(SortMode::Sequential),
            other => Err(format!(
                "unknown sort mode '{}' (use chronological or sequential)",
                other
            )),
        }
    }
}

/// Inclusive linearized-date window, applied in chronological mode only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateBounds {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DateBounds {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start.is_none_or(|start| value >= start) && self.end.is_none_or(|end| value <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Keep events carrying at least one selected tag.
    #[default]
    Any,
    /// Keep events carrying every selected tag.
    All,
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "or" => Ok(FilterMode::Any),
            "all" | "and" => Ok(FilterMode::All),
            other => Err(format!("unknown filter mode '{}' (use any or all)", other)),
        }
    }
}

/// Tag selection applied to events before lanes are built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilter {
    pub mode: FilterMode,
    pub tags: BTreeSet<TagId>,
}

impl TagFilter {
    pub fn new(mode: FilterMode, tags: impl IntoIterator<Item = TagId>) -> Self {
        Self {
            mode,
            tags: tags.into_iter().collect(),
        }
    }

    pub fn accepts(&self, event: &Event) -> bool {
        match self.mode {
            FilterMode::Any => self.tags.iter().any(|tag| event.has_tag(*tag)),
            FilterMode::All => self.tags.iter().all(|tag| event.has_tag(*tag)),
        }
    }
}

/// Geometry constants. Every field can be overridden from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_margin_left")]
    pub margin_left: f64,
    #[serde(default = "default_margin_right")]
    pub margin_right: f64,
    #[serde(default = "default_chronological_top")]
    pub chronological_top: f64,
    #[serde(default = "default_sequential_top")]
    pub sequential_top: f64,
    #[serde(default = "default_chronological_lane_height")]
    pub chronological_lane_height: f64,
    #[serde(default = "default_sequential_lane_height")]
    pub sequential_lane_height: f64,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,
    #[serde(default = "default_hover_radius")]
    pub hover_radius: f64,
    /// Distance of the time axis from the bottom edge.
    #[serde(default = "default_axis_offset")]
    pub axis_offset: f64,
    /// Distance of axis labels from the bottom edge.
    #[serde(default = "default_label_offset")]
    pub label_offset: f64,
    #[serde(default = "default_max_year_labels")]
    pub max_year_labels: usize,
    #[serde(default = "default_max_year_gridlines")]
    pub max_year_gridlines: usize,
    #[serde(default = "default_column_label_gap")]
    pub column_label_gap: f64,
    #[serde(default = "default_column_label_rotation")]
    pub column_label_rotation: f64,
    /// Range used when every shown event has the same linearized date.
    #[serde(default = "default_degenerate_span")]
    pub degenerate_span: i64,
}

fn default_margin_left() -> f64 {
    MARGIN_LEFT
}
fn default_margin_right() -> f64 {
    MARGIN_RIGHT
}
fn default_chronological_top() -> f64 {
    CHRONOLOGICAL_TOP
}
fn default_sequential_top() -> f64 {
    SEQUENTIAL_TOP
}
fn default_chronological_lane_height() -> f64 {
    CHRONOLOGICAL_LANE_HEIGHT
}
fn default_sequential_lane_height() -> f64 {
    SEQUENTIAL_LANE_HEIGHT
}
fn default_marker_radius() -> f64 {
    MARKER_RADIUS
}
fn default_hover_radius() -> f64 {
    HOVER_RADIUS
}
fn default_axis_offset() -> f64 {
    AXIS_OFFSET
}
fn default_label_offset() -> f64 {
    LABEL_OFFSET
}
fn default_max_year_labels() -> usize {
    MAX_YEAR_LABELS
}
fn default_max_year_gridlines() -> usize {
    MAX_YEAR_GRIDLINES
}
fn default_column_label_gap() -> f64 {
    COLUMN_LABEL_GAP
}
fn default_column_label_rotation() -> f64 {
    COLUMN_LABEL_ROTATION
}
fn default_degenerate_span() -> i64 {
    DEGENERATE_SPAN
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_left: MARGIN_LEFT,
            margin_right: MARGIN_RIGHT,
            chronological_top: CHRONOLOGICAL_TOP,
            sequential_top: SEQUENTIAL_TOP,
            chronological_lane_height: CHRONOLOGICAL_LANE_HEIGHT,
            sequential_lane_height: SEQUENTIAL_LANE_HEIGHT,
            marker_radius: MARKER_RADIUS,
            hover_radius: HOVER_RADIUS,
            axis_offset: AXIS_OFFSET,
            label_offset: LABEL_OFFSET,
            max_year_labels: MAX_YEAR_LABELS,
            max_year_gridlines: MAX_YEAR_GRIDLINES,
            column_label_gap: COLUMN_LABEL_GAP,
            column_label_rotation: COLUMN_LABEL_ROTATION,
            degenerate_span: DEGENERATE_SPAN,
        }
    }
}

impl LayoutConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn plot_width(&self, canvas_width: f64) -> f64 {
        canvas_width - self.margin_left - self.margin_right
    }
}

/// Everything [`compute_scene`] needs besides the events themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub group_by: TagTypeId,
    pub sort_mode: SortMode,
    pub date_format: Option<DateFormat>,
    pub width: f64,
    pub height: f64,
    pub bounds: DateBounds,
    pub filter: Option<TagFilter>,
    pub config: LayoutConfig,
}

impl LayoutOptions {
    pub fn new(group_by: TagTypeId, sort_mode: SortMode, width: f64, height: f64) -> Self {
        Self {
            group_by,
            sort_mode,
            date_format: None,
            width,
            height,
            bounds: DateBounds::default(),
            filter: None,
            config: LayoutConfig::default(),
        }
    }

    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = Some(format);
        self
    }

    pub fn with_bounds(mut self, bounds: DateBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }
}

/// An event's membership in one lane before coordinates are assigned.
struct Placement<'a> {
    event: &'a Event,
    tag: &'a TagAssociation,
    position: i64,
}

struct LaneDraft<'a> {
    tag_id: TagId,
    placements: Vec<Placement<'a>>,
}

impl LaneDraft<'_> {
    fn name(&self) -> &str {
        &self.placements[0].tag.tag_name
    }
}

/// Lays out `events` as a timeline scene.
///
/// # Errors
/// - [`LayoutError::InvalidCanvas`] when the canvas is not finite and positive.
/// - [`LayoutError::MissingDateFormat`] for chronological mode without a format.
pub fn compute_scene(events: &[Event], options: &LayoutOptions) -> Result<Scene, LayoutError> {
    let (width, height) = (options.width, options.height);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LayoutError::InvalidCanvas { width, height });
    }

    let visible: Vec<&Event> = events
        .iter()
        .filter(|event| options.filter.as_ref().is_none_or(|f| f.accepts(event)))
        .collect();

    let scene = match options.sort_mode {
        SortMode::Chronological => {
            let format = options
                .date_format
                .as_ref()
                .ok_or(LayoutError::MissingDateFormat)?;
            chronological(&visible, format, options)
        }
        SortMode::Sequential => sequential(&visible, options),
    };

    debug!(
        mode = ?options.sort_mode,
        events = events.len(),
        lanes = scene.lanes.len(),
        markers = scene.markers.len(),
        "computed timeline scene"
    );
    Ok(scene)
}

fn chronological(events: &[&Event], format: &DateFormat, options: &LayoutOptions) -> Scene {
    let config = &options.config;
    let mut placements = Vec::new();

    for &event in events {
        let Some(date) = event.date() else {
            continue;
        };
        let Some(value) = format.linearize(date) else {
            debug!(event_id = event.id, date, "skipping event with unparseable date");
            continue;
        };
        if !options.bounds.contains(value) {
            continue;
        }
        placements.extend(event.tags_of_type(options.group_by).map(|tag| Placement {
            event,
            tag,
            position: value,
        }));
    }

    let (Some(min_date), Some(max_date)) = (
        placements.iter().map(|p| p.position).min(),
        placements.iter().map(|p| p.position).max(),
    ) else {
        return Scene::empty(options.width, options.height);
    };

    // Widened: two dates that each fit in i64 can still be further apart.
    let mut date_range = max_date as i128 - min_date as i128;
    if date_range == 0 {
        warn!(date = min_date, "all events share one date; using fallback span");
        date_range = config.degenerate_span.max(1) as i128;
    }

    let plot_width = config.plot_width(options.width);
    let x_of = |date: i64| {
        let offset = date as i128 - min_date as i128;
        config.margin_left + offset as f64 / date_range as f64 * plot_width
    };

    let drafts = group_into_lanes(placements);
    let mut scene = assemble(
        drafts,
        &x_of,
        config.chronological_top,
        config.chronological_lane_height,
        options,
    );

    let top = config.chronological_top;
    let axis_y = options.height - config.axis_offset;
    let label_y = options.height - config.label_offset;

    let min_year = format.top_level(min_date);
    let max_year = format.top_level(max_date);
    let total_years =
        usize::try_from(max_year as i128 - min_year as i128 + 1).unwrap_or(usize::MAX);
    let label_step = if total_years > config.max_year_labels {
        total_years.div_ceil(config.max_year_labels.max(1))
    } else {
        1
    };
    let line_step = if total_years > config.max_year_gridlines {
        label_step
    } else {
        1
    };

    for year in (min_year..=max_year).step_by(line_step) {
        let labelled = (year as i128 - min_year as i128) % label_step as i128 == 0;
        let year_start = format.top_level_start(year);
        if year_start < min_date || year_start > max_date {
            continue;
        }
        let x = x_of(year_start);
        scene.lines.push(GuideLine {
            kind: GuideKind::Grid,
            from: Point::new(x, top),
            to: Point::new(x, axis_y),
        });
        if labelled {
            scene.labels.push(GuideLabel {
                kind: LabelKind::Year,
                text: year.to_string(),
                at: Point::new(x, label_y),
                anchor: TextAnchor::Middle,
                rotation: 0.0,
            });
        }
    }

    let axis_start = config.margin_left;
    let axis_end = options.width - config.margin_right;
    scene.lines.push(GuideLine {
        kind: GuideKind::Axis,
        from: Point::new(axis_start, axis_y),
        to: Point::new(axis_end, axis_y),
    });
    scene.labels.push(GuideLabel {
        kind: LabelKind::Range,
        text: format.format(min_date),
        at: Point::new(axis_start, label_y),
        anchor: TextAnchor::Start,
        rotation: 0.0,
    });
    scene.labels.push(GuideLabel {
        kind: LabelKind::Range,
        text: format.format(max_date),
        at: Point::new(axis_end, label_y),
        anchor: TextAnchor::End,
        rotation: 0.0,
    });

    scene
}

fn sequential(events: &[&Event], options: &LayoutOptions) -> Scene {
    let config = &options.config;
    let columns: Vec<&Event> = events
        .iter()
        .copied()
        .filter(|event| event.tags_of_type(options.group_by).next().is_some())
        .collect();

    if columns.is_empty() {
        return Scene::empty(options.width, options.height);
    }

    let step = if columns.len() > 1 {
        config.plot_width(options.width) / (columns.len() - 1) as f64
    } else {
        0.0
    };
    let x_of = |column: i64| config.margin_left + column as f64 * step;

    let placements = columns
        .iter()
        .enumerate()
        .flat_map(|(column, &event)| {
            event.tags_of_type(options.group_by).map(move |tag| Placement {
                event,
                tag,
                position: column as i64,
            })
        })
        .collect();

    let drafts = group_into_lanes(placements);
    let top = config.sequential_top;
    let mut scene = assemble(
        drafts,
        &x_of,
        top,
        config.sequential_lane_height,
        options,
    );

    let bottom = options.height - config.axis_offset;
    for (column, event) in columns.iter().enumerate() {
        let x = x_of(column as i64);
        scene.lines.push(GuideLine {
            kind: GuideKind::Grid,
            from: Point::new(x, top),
            to: Point::new(x, bottom),
        });
        if !event.title.is_empty() {
            scene.labels.push(GuideLabel {
                kind: LabelKind::Column,
                text: event.title.clone(),
                at: Point::new(x, top - config.column_label_gap),
                anchor: TextAnchor::Start,
                rotation: config.column_label_rotation,
            });
        }
    }

    scene
}

/// Groups placements by tag, orders each lane by position (ties keep story
/// order) and orders lanes by display name.
fn group_into_lanes(placements: Vec<Placement<'_>>) -> Vec<LaneDraft<'_>> {
    let mut by_tag: BTreeMap<TagId, Vec<Placement<'_>>> = BTreeMap::new();
    for placement in placements {
        by_tag.entry(placement.tag.tag_id).or_default().push(placement);
    }

    let mut drafts: Vec<LaneDraft<'_>> = by_tag
        .into_iter()
        .map(|(tag_id, mut placements)| {
            placements.sort_by_key(|p| p.position);
            LaneDraft { tag_id, placements }
        })
        .collect();

    drafts.sort_by(|a, b| compare_names(a.name(), b.name()).then(a.tag_id.cmp(&b.tag_id)));
    drafts
}

/// Dictionary order for lane names.
///
/// Compares base letters first (accents and case ignored), then accents,
/// then case with lowercase first, then raw bytes. `Élodie` sorts between
/// `Dana` and `Frank`, `alice` before `Alice`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let base = |s: &str| -> Vec<char> {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect()
    };
    let accented = |s: &str| -> Vec<char> { s.nfd().flat_map(char::to_lowercase).collect() };
    let cased = |s: &str| -> Vec<(bool, char)> {
        s.nfd().map(|c| (c.is_uppercase(), c)).collect()
    };

    base(a)
        .cmp(&base(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| cased(a).cmp(&cased(b)))
        .then_with(|| a.cmp(b))
}

fn assemble(
    drafts: Vec<LaneDraft<'_>>,
    x_of: &dyn Fn(i64) -> f64,
    top: f64,
    lane_height: f64,
    options: &LayoutOptions,
) -> Scene {
    let config = &options.config;
    let mut scene = Scene::empty(options.width, options.height);

    for (index, draft) in drafts.into_iter().enumerate() {
        let first = draft.placements[0].tag;
        let y = top + lane_height * (index + 1) as f64;

        let entries: Vec<LaneEntry> = draft
            .placements
            .iter()
            .map(|p| LaneEntry {
                event_id: p.event.id,
                position: p.position,
                point: Point::new(x_of(p.position), y),
            })
            .collect();

        scene
            .markers
            .extend(draft.placements.iter().zip(&entries).map(|(p, entry)| PointMarker {
                event_id: p.event.id,
                tag_id: draft.tag_id,
                center: entry.point,
                radius: config.marker_radius,
                hover_radius: config.hover_radius,
                fill: first.color.clone(),
                title: p.event.title.clone(),
            }));

        if entries.len() >= 2 {
            scene.paths.push(LanePath {
                tag_id: draft.tag_id,
                color: first.color.clone(),
                points: entries.iter().map(|entry| entry.point).collect(),
            });
        }

        scene.lanes.push(Lane {
            tag_id: draft.tag_id,
            name: first.tag_name.clone(),
            color: first.color.clone(),
            y,
            entries,
        });
    }

    scene
}
