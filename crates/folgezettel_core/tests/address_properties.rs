use folgezettel_core::markdown::section::insert_under_heading;
use folgezettel_core::model::address::{next_letter_sequence, render};
use folgezettel_core::service::suggestion::suggest_next_child;
use folgezettel_core::{Address, Segment, SegmentKind};
use proptest::prelude::*;

/// Well-formed segment lists: numeric first, letter runs never adjacent.
fn arb_segments() -> impl Strategy<Value = Vec<Segment>> {
    (
        0..10_000u64,
        prop::collection::vec((any::<bool>(), 0..1_000u64, "[a-z]{1,3}"), 0..6),
    )
        .prop_map(|(first, rest)| {
            let mut segments = vec![Segment::Number(first)];
            for (letters, number, run) in rest {
                let after_letters = matches!(segments.last(), Some(Segment::Letters(_)));
                if letters && !after_letters {
                    segments.push(Segment::Letters(run));
                } else {
                    segments.push(Segment::Number(number));
                }
            }
            segments
        })
}

fn arb_raw_address() -> impl Strategy<Value = String> {
    "[0-9]{1,4}([.][0-9]{1,4}|[a-zA-Z]{1,3}){0,5}"
}

fn arb_document() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("## Related Notes".to_string()),
            Just("## Child Notes".to_string()),
            Just("### Related Notes".to_string()),
            Just(String::new()),
            "[a-z ]{0,12}",
            "- \\[\\[[A-Z][a-z]{0,4}\\]\\]",
        ],
        0..10,
    )
    .prop_map(|lines| lines.join("\n"))
}

/// Independent bijective base-26 rendering: 1 -> "a", 26 -> "z", 27 -> "aa".
fn base26(mut n: u64) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

fn heading_lines(text: &str, heading: &str) -> usize {
    text.lines().filter(|line| *line == heading).count()
}

proptest! {
    #[test]
    fn render_then_parse_restores_segments(segments in arb_segments()) {
        let parsed = Address::parse(&render(&segments)).unwrap();
        prop_assert_eq!(parsed.segments(), segments.as_slice());
    }

    #[test]
    fn canonicalization_is_idempotent(raw in arb_raw_address()) {
        let address = Address::parse(&raw).unwrap();
        let reparsed = Address::parse(&address.canonical()).unwrap();
        prop_assert_eq!(reparsed.segments(), address.segments());
        prop_assert_eq!(reparsed.canonical(), address.canonical());
    }

    #[test]
    fn parent_renders_all_but_the_last_segment(segments in arb_segments()) {
        let address = Address::parse(&render(&segments)).unwrap();
        match address.parent() {
            Some(parent) => {
                prop_assert!(segments.len() >= 2);
                prop_assert_eq!(parent.canonical(), render(&segments[..segments.len() - 1]));
            }
            None => prop_assert_eq!(segments.len(), 1),
        }
    }

    #[test]
    fn suggested_child_alternates_segment_kind(
        segments in arb_segments(),
        numbers in prop::collection::vec(0..500u64, 0..6),
        runs in prop::collection::vec("[a-z]{1,2}", 0..6),
    ) {
        let parent = Address::parse(&render(&segments)).unwrap();
        let children: Vec<Address> = match parent.last_segment_kind() {
            SegmentKind::Number => runs
                .into_iter()
                .map(|run| parent.child(Segment::Letters(run)))
                .collect(),
            SegmentKind::Letters => numbers
                .into_iter()
                .map(|n| parent.child(Segment::Number(n)))
                .collect(),
        };

        let child = suggest_next_child(&parent, &children);
        prop_assert_ne!(child.last_segment_kind(), parent.last_segment_kind());
        prop_assert_eq!(child.parent().map(|p| p.canonical()), Some(parent.canonical()));
        if parent.last_segment_kind() == SegmentKind::Letters {
            prop_assert!(children.iter().all(|existing| existing.canonical() != child.canonical()));
        }
    }

    #[test]
    fn next_letter_sequence_counts_in_bijective_base_26(n in 0..20_000u64) {
        prop_assert_eq!(next_letter_sequence(&base26(n)), base26(n + 1));
    }

    #[test]
    fn insert_under_heading_is_idempotent(doc in arb_document(), target in "[A-Z][a-z]{1,5}") {
        let first = insert_under_heading(&doc, &target, "Related Notes", "Parent");
        let second = insert_under_heading(&first.text, &target, "Related Notes", "Parent");
        prop_assert!(!second.inserted);
        prop_assert_eq!(&second.text, &first.text);

        let link = format!("[[{target}]]");
        prop_assert_eq!(first.inserted, !doc.contains(&link));
        prop_assert!(first.text.contains(&link));
        if first.inserted {
            let before = heading_lines(&doc, "## Related Notes");
            prop_assert_eq!(heading_lines(&first.text, "## Related Notes"), before.max(1));
        }
    }
}
