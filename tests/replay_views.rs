use spurtwall_lib::{
    projection::{self, GapIndicator, Projection, WallItem},
    replay::{Replay, ReplayScript},
    ViewMode,
};

fn run(json: &str) -> Replay {
    Replay::run(&ReplayScript::from_json(json).unwrap()).unwrap()
}

/// Two paragraphs in the first stream, one spurt in a second stream.
const SESSION: &str = r#"{
    "config": { "cutThresholdMs": 1000, "paragraphThresholdMs": 3000 },
    "events": [
        { "at": 0,     "type": "input", "text": "T" },
        { "at": 200,   "type": "input", "text": "The" },
        { "at": 500,   "type": "input", "text": "The cat" },
        { "at": 2000,  "type": "input", "text": "s" },
        { "at": 2400,  "type": "input", "text": "sat" },
        { "at": 9000,  "type": "input", "text": "L" },
        { "at": 9500,  "type": "input", "text": "Later" },
        { "at": 12000, "type": "createStream" },
        { "at": 12000, "type": "input", "text": "elsewhere" },
        { "at": 14000, "type": "setActive", "stream": { "index": 0 } }
    ]
}"#;

#[test]
fn spurts_are_routed_and_flagged() {
    let replay = run(SESSION);
    let streams = replay.registry().streams();
    assert_eq!(streams.len(), 2);

    let first: Vec<(&str, bool)> = streams[0]
        .spurts
        .iter()
        .map(|s| (s.text.as_str(), s.is_paragraph_start))
        .collect();
    // "The cat": created 1500, 0.5s -> ends 2000.
    // "sat": created 3400, gap 1400. "Later": created 10500, gap 6700.
    assert_eq!(first, vec![("The cat", true), ("sat", false), ("Later", true)]);

    assert_eq!(streams[1].spurts.len(), 1);
    assert_eq!(streams[1].spurts[0].text, "elsewhere");
    assert_eq!(replay.registry().active_stream_id(), streams[0].id);
}

#[test]
fn wall_view_breaks_once_per_later_paragraph() {
    let replay = run(SESSION);
    let stream = &replay.registry().streams()[0];
    let items = projection::wall(&stream.spurts);
    let breaks = items
        .iter()
        .filter(|item| matches!(item, WallItem::ParagraphBreak))
        .count();
    assert_eq!(breaks, 1);
    assert!(matches!(items[0], WallItem::Spurt { .. }));
    assert!(matches!(items[2], WallItem::ParagraphBreak));
}

#[test]
fn ordered_and_reversed_place_dividers_differently() {
    let replay = run(SESSION);
    let stream = &replay.registry().streams()[0];

    let ordered = projection::ordered(&stream.spurts, 3000);
    assert!(matches!(ordered[0].gap_after, Some(GapIndicator::Pause { .. })));
    assert!(matches!(ordered[1].gap_after, Some(GapIndicator::ParagraphBreak { .. })));

    let reversed = projection::reversed(&stream.spurts, 3000);
    let order: Vec<&str> = reversed.iter().map(|e| e.spurt.text.as_str()).collect();
    assert_eq!(order, vec!["Later", "sat", "The cat"]);
    // Divider hangs under "Later", the spurt that opened the paragraph.
    assert!(matches!(reversed[0].gap_after, Some(GapIndicator::ParagraphBreak { .. })));
    assert!(matches!(reversed[1].gap_after, Some(GapIndicator::Pause { .. })));
    assert!(reversed[2].gap_after.is_none());
}

#[test]
fn cycling_view_mode_does_not_touch_segmentation() {
    let mut json: serde_json::Value = serde_json::from_str(SESSION).unwrap();
    let events = json["events"].as_array_mut().unwrap();
    for _ in 0..2 {
        events.push(serde_json::json!({
            "at": 15000, "type": "cycleViewMode", "stream": { "index": 0 }
        }));
    }
    let with_cycles = run(&json.to_string());
    let plain = run(SESSION);

    let stream = &with_cycles.registry().streams()[0];
    assert_eq!(stream.view_mode, ViewMode::Reversed);
    let flags = |s: &spurtwall_lib::Stream| -> Vec<bool> {
        s.spurts.iter().map(|x| x.is_paragraph_start).collect()
    };
    assert_eq!(flags(stream), flags(&plain.registry().streams()[0]));

    let projected = projection::project(stream, 3000);
    assert!(matches!(projected, Projection::Reversed(_)));
}

#[test]
fn deleting_last_stream_via_script_is_ignored() {
    let replay = run(
        r#"{ "events": [
            { "at": 0, "type": "deleteStream", "stream": { "index": 0 } },
            { "at": 0, "type": "input", "text": "still here" }
        ] }"#,
    );
    assert_eq!(replay.registry().streams().len(), 1);
    assert_eq!(replay.registry().streams()[0].spurts.len(), 1);
}

#[test]
fn example_from_end_to_start_gap() {
    // A: created 0, 2s. B: created 5000. Gap is 3000ms.
    for (threshold, expected) in [(1000, true), (5000, false)] {
        let mut registry = spurtwall_lib::StreamRegistry::new(
            spurtwall_lib::SegmentationConfig::new(1000, threshold),
        );
        registry.append_spurt(spurtwall_lib::SpurtCandidate {
            text: "A".into(),
            created_at: 0,
            duration: 2.0,
        });
        let b = registry
            .append_spurt(spurtwall_lib::SpurtCandidate {
                text: "B".into(),
                created_at: 5000,
                duration: 1.0,
            })
            .unwrap();
        assert_eq!(b.is_paragraph_start, expected);
    }
}
