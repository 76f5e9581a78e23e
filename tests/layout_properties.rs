use std::cmp::Ordering;

use proptest::prelude::*;

use plotline::layout::compare_names;
use plotline::{DateFormat, Event, LayoutOptions, SortMode, TagAssociation, compute_scene};

const TAG_POOL: &[(i64, i64, &str)] = &[
    (1, 2, "Alice"),
    (2, 2, "bram"),
    (3, 2, "Cora"),
    (4, 2, "alice"),
    (5, 2, "Élodie"),
    (6, 1, "Harbor"),
    (7, 1, "Keep"),
];

/// Grouped tags of `TAG_POOL` in dictionary order.
const LANE_ORDER: &[&str] = &["alice", "Alice", "bram", "Cora", "Élodie"];

fn date_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => (1000i64..1010, 1i64..=12, 1i64..=31)
            .prop_map(|(y, m, d)| Some(format!("{y}.{m:02}.{d:02}"))),
        1 => Just(None),
        1 => Just(Some("1500.06".to_string())),
        1 => Just(Some("soon".to_string())),
    ]
}

fn events_strategy() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(
        (date_strategy(), prop::sample::subsequence(TAG_POOL.to_vec(), 0..=4)),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (date, tags))| Event {
                id: i as i64 + 1,
                title: format!("Event {}", i + 1),
                date,
                description: None,
                tags: tags
                    .into_iter()
                    .map(|(tag_id, tag_type_id, name)| TagAssociation {
                        tag_id,
                        tag_type_id,
                        tag_name: name.to_string(),
                        tag_type_name: None,
                        color: format!("#{:02x}{:02x}00", tag_id * 30, tag_type_id * 60),
                    })
                    .collect(),
            })
            .collect()
    })
}

fn options(mode: SortMode) -> LayoutOptions {
    LayoutOptions::new(2, mode, 640.0, 320.0)
        .with_date_format(DateFormat::parse("9999.12.31").unwrap())
}

fn modes() -> impl Strategy<Value = SortMode> {
    prop_oneof![Just(SortMode::Chronological), Just(SortMode::Sequential)]
}

proptest! {
    #[test]
    fn layout_is_deterministic(events in events_strategy(), mode in modes()) {
        let first = compute_scene(&events, &options(mode)).unwrap();
        let second = compute_scene(&events, &options(mode)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn lanes_follow_name_order(events in events_strategy(), mode in modes()) {
        let scene = compute_scene(&events, &options(mode)).unwrap();
        for pair in scene.lanes.windows(2) {
            let order = compare_names(&pair[0].name, &pair[1].name)
                .then(pair[0].tag_id.cmp(&pair[1].tag_id));
            prop_assert_eq!(order, Ordering::Less);
        }
    }

    #[test]
    fn lanes_match_dictionary_order(events in events_strategy(), mode in modes()) {
        let scene = compute_scene(&events, &options(mode)).unwrap();
        let ranks: Vec<usize> = scene
            .lanes
            .iter()
            .map(|lane| LANE_ORDER.iter().position(|name| *name == lane.name).unwrap())
            .collect();
        prop_assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn paths_only_for_lanes_with_two_events(events in events_strategy(), mode in modes()) {
        let scene = compute_scene(&events, &options(mode)).unwrap();
        let multi: Vec<i64> = scene
            .lanes
            .iter()
            .filter(|lane| lane.entries.len() >= 2)
            .map(|lane| lane.tag_id)
            .collect();
        let with_paths: Vec<i64> = scene.paths.iter().map(|p| p.tag_id).collect();
        prop_assert_eq!(multi, with_paths);

        let entries: usize = scene.lanes.iter().map(|lane| lane.entries.len()).sum();
        prop_assert_eq!(entries, scene.markers.len());
    }

    #[test]
    fn coordinates_stay_finite_and_on_canvas(events in events_strategy(), mode in modes()) {
        let scene = compute_scene(&events, &options(mode)).unwrap();
        for marker in &scene.markers {
            prop_assert!(marker.center.x.is_finite() && marker.center.y.is_finite());
            prop_assert!(marker.center.x >= 50.0 && marker.center.x <= 590.0 + 1e-9);
        }
        for lane in &scene.lanes {
            for pair in lane.entries.windows(2) {
                prop_assert!(pair[0].position <= pair[1].position);
                prop_assert!(pair[0].point.x <= pair[1].point.x);
            }
        }
    }

    #[test]
    fn removing_grouped_tags_empties_scene(events in events_strategy(), mode in modes()) {
        let stripped: Vec<Event> = events
            .into_iter()
            .map(|mut event| {
                event.tags.retain(|tag| tag.tag_type_id != 2);
                event
            })
            .collect();
        let scene = compute_scene(&stripped, &options(mode)).unwrap();
        prop_assert!(scene.is_empty());
        prop_assert!(scene.markers.is_empty());
    }
}
