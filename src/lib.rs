//! Story timeline ("plotline") layout and rendering.
//!
//! Events tagged with characters, locations or plotlines are laid out as one
//! lane per tag of a chosen tag type, either on a shared time axis built from
//! the story's own date format or in plain story order.

pub mod date;
pub mod error;
pub mod export;
pub mod layout;
pub mod logging;
pub mod model;
pub mod render;
pub mod scene;
pub mod theme;
pub mod xml;

pub use date::DateFormat;
pub use error::{DateFormatError, Error, LayoutError, Result};
pub use layout::{
    DateBounds, FilterMode, LayoutConfig, LayoutOptions, SortMode, TagFilter, compute_scene,
};
pub use model::{Event, Story, Tag, TagAssociation, TagType};
pub use render::{TimelineStyle, render_scene};
pub use scene::{MarkerState, Point, Scene};
pub use theme::Theme;
