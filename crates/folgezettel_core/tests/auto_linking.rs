use folgezettel_core::{LinkService, MemoryVault, NoteStore, Settings};
use std::rc::Rc;

type VaultService = LinkService<Rc<MemoryVault>, Rc<MemoryVault>>;

fn attach(vault: &Rc<MemoryVault>, settings: Settings) -> Rc<VaultService> {
    let service = Rc::new(LinkService::new(
        Rc::clone(vault),
        Rc::clone(vault),
        settings,
    ));
    vault.set_observer(service.event_handler());
    service
}

#[test]
fn creating_a_child_links_both_ways_exactly_once() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1.2 Topic.md", "# Topic\n");
    let service = attach(&vault, Settings::default());

    let child = vault.create_note("1.2a.md", "").unwrap();
    assert_eq!(
        vault.content("1.2a.md").as_deref(),
        Some("## Related Notes\n- [[1.2 Topic]] (Parent)\n")
    );
    assert_eq!(
        vault.content("1.2 Topic.md").as_deref(),
        Some("# Topic\n\n## Child Notes\n- [[1.2a]] (Child)\n")
    );
    assert_eq!(vault.writes(), vec!["1.2a.md", "1.2 Topic.md"]);
    assert!(vault
        .notices()
        .contains(&"Folgezettel links created for 1.2a".to_string()));

    // A second delivery of the same event changes nothing.
    service.on_created(&child).unwrap();
    assert_eq!(vault.writes().len(), 2);
    assert_eq!(
        vault.content("1.2 Topic.md").unwrap().matches("[[1.2a]]").count(),
        1
    );
    assert!(!service.is_in_flight("1.2a.md"));
    assert!(!service.is_in_flight("1.2 Topic.md"));
}

#[test]
fn later_edits_of_linked_notes_add_no_cross_links() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1.2 Topic.md", "# Topic\n");
    let _service = attach(&vault, Settings::default());
    vault.create_note("1.2a.md", "").unwrap();

    let parent = vault.content("1.2 Topic.md").unwrap();
    vault
        .edit("1.2 Topic.md", &format!("{parent}\nMore thoughts.\n"))
        .unwrap();
    let child = vault.content("1.2a.md").unwrap();
    vault.edit("1.2a.md", &format!("Body\n\n{child}")).unwrap();

    assert!(!vault.content("1.2a.md").unwrap().contains("Cross-reference"));
    assert!(!vault
        .content("1.2 Topic.md")
        .unwrap()
        .contains("Cross-reference"));
}

#[test]
fn manual_link_is_reciprocated_once_without_loops() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("NoteA.md", "# A\n");
    vault.insert("NoteB.md", "# B\n");
    let _service = attach(&vault, Settings::default());

    vault.edit("NoteA.md", "# A\nSee [[NoteB]].\n").unwrap();

    assert_eq!(
        vault.content("NoteB.md").as_deref(),
        Some("# B\n\n## Related Notes\n- [[NoteA]] (Cross-reference)\n")
    );
    assert_eq!(vault.content("NoteA.md").as_deref(), Some("# A\nSee [[NoteB]].\n"));
    assert_eq!(vault.writes(), vec!["NoteA.md", "NoteB.md"]);
    assert!(vault
        .notices()
        .contains(&"Reciprocal link added: NoteA → NoteB".to_string()));

    // The user touching NoteB afterwards finds NoteA already linked back.
    let b = vault.content("NoteB.md").unwrap();
    vault.edit("NoteB.md", &format!("{b}Extra line\n")).unwrap();
    assert_eq!(vault.content("NoteA.md").as_deref(), Some("# A\nSee [[NoteB]].\n"));
    assert_eq!(vault.writes(), vec!["NoteA.md", "NoteB.md", "NoteB.md"]);
}

#[test]
fn only_newly_added_links_are_reciprocated() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("Hub.md", "");
    vault.insert("Left.md", "");
    vault.insert("Right.md", "");
    let _service = attach(&vault, Settings::default());

    vault.edit("Hub.md", "[[Left|the left one]]\n").unwrap();
    assert!(vault.content("Left.md").unwrap().contains("[[Hub]]"));

    // Left is unlinked by hand; re-saving Hub must not restore it.
    vault.edit("Left.md", "").unwrap();
    vault
        .edit("Hub.md", "[[Left|the left one]]\n[[Right#Intro]]\n")
        .unwrap();
    assert_eq!(vault.content("Left.md").as_deref(), Some(""));
    assert!(vault.content("Right.md").unwrap().contains("- [[Hub]] (Cross-reference)"));
}

#[test]
fn self_links_and_unknown_targets_are_ignored() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("Solo.md", "");
    let _service = attach(&vault, Settings::default());

    vault.edit("Solo.md", "[[Solo]] and [[Nowhere]]\n").unwrap();
    assert_eq!(vault.writes(), vec!["Solo.md"]);
    assert_eq!(vault.content("Solo.md").as_deref(), Some("[[Solo]] and [[Nowhere]]\n"));
}

#[test]
fn cross_link_targets_resolve_case_insensitively() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("notes/Deep Note.md", "");
    vault.insert("Source.md", "");
    let _service = attach(&vault, Settings::default());

    vault.edit("Source.md", "[[deep note]]\n").unwrap();
    assert_eq!(
        vault.content("notes/Deep Note.md").as_deref(),
        Some("## Related Notes\n- [[Source]] (Cross-reference)\n")
    );
}

#[test]
fn renaming_into_an_address_links_to_the_parent() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1.2 Parent.md", "");
    vault.insert("Untitled.md", "draft");
    let _service = attach(&vault, Settings::default());

    vault.rename_note("Untitled.md", "1.2a Topic.md").unwrap();
    assert_eq!(
        vault.content("1.2a Topic.md").as_deref(),
        Some("draft\n\n## Related Notes\n- [[1.2 Parent]] (Parent)\n")
    );
    assert_eq!(
        vault.content("1.2 Parent.md").as_deref(),
        Some("## Child Notes\n- [[1.2a Topic]] (Child)\n")
    );
}

#[test]
fn snapshot_follows_a_renamed_note() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("Draft.md", "");
    vault.insert("Target.md", "");
    let _service = attach(&vault, Settings::default());

    vault.edit("Draft.md", "[[Target]]\n").unwrap();
    // Unlink by hand, then rename the source; the link was already seen.
    vault.edit("Target.md", "").unwrap();
    vault.rename_note("Draft.md", "Final.md").unwrap();
    vault.edit("Final.md", "[[Target]]\nmore\n").unwrap();
    assert_eq!(vault.content("Target.md").as_deref(), Some(""));
}

#[test]
fn duplicate_addresses_are_always_reported() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1.3 First.md", "");
    vault.insert("draft.md", "");
    let settings = Settings {
        show_notifications: false,
        ..Settings::default()
    };
    let _service = attach(&vault, settings);

    vault.rename_note("draft.md", "1.3 Second.md").unwrap();
    let notices = vault.notices();
    assert_eq!(notices.len(), 1, "parent miss stays silent: {notices:?}");
    assert!(notices[0].starts_with("Duplicate folgezettel address!"));
    assert!(notices[0].contains("\"1.3\" is already used by:\n1.3 First.md"));
}

#[test]
fn missing_parent_is_reported_when_notifications_are_on() {
    let vault = Rc::new(MemoryVault::new());
    let _service = attach(&vault, Settings::default());

    vault.create_note("4.1b.md", "").unwrap();
    assert_eq!(
        vault.notices(),
        vec!["Parent note not found for address: 4.1".to_string()]
    );
    assert_eq!(vault.content("4.1b.md").as_deref(), Some(""));
}

#[test]
fn disabled_features_leave_notes_untouched() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1 Root.md", "");
    vault.insert("Other.md", "");
    let settings = Settings {
        auto_process: false,
        auto_bidirectional_links: false,
        ..Settings::default()
    };
    let _service = attach(&vault, settings);

    vault.create_note("1a.md", "").unwrap();
    vault.edit("1a.md", "[[Other]]\n").unwrap();
    assert_eq!(vault.content("1 Root.md").as_deref(), Some(""));
    assert_eq!(vault.content("Other.md").as_deref(), Some(""));
    assert_eq!(vault.writes(), vec!["1a.md"]);
}

#[test]
fn custom_headings_and_descriptions_are_used() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("7 Root.md", "");
    let settings = Settings {
        backlink_heading: "Up".to_string(),
        forward_link_heading: "Down".to_string(),
        parent_link_description: String::new(),
        child_link_description: "branch".to_string(),
        ..Settings::default()
    };
    let _service = attach(&vault, settings);

    vault.create_note("7a.md", "").unwrap();
    assert_eq!(vault.content("7a.md").as_deref(), Some("## Up\n- [[7 Root]]\n"));
    assert_eq!(
        vault.content("7 Root.md").as_deref(),
        Some("## Down\n- [[7a]] (branch)\n")
    );
}

#[test]
fn failed_write_is_reported_and_recoverable() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("1.2 Topic.md", "");
    vault.fail_writes_to(Some("1.2 Topic.md"));
    let service = attach(&vault, Settings::default());

    let child = vault.create_note("1.2a.md", "").unwrap();
    assert!(vault
        .notices()
        .iter()
        .any(|notice| notice.starts_with("Folgezettel update failed for 1.2a.md")));
    assert!(!service.is_in_flight("1.2 Topic.md"));
    assert_eq!(vault.content("1.2 Topic.md").as_deref(), Some(""));

    vault.fail_writes_to(None);
    service.on_created(&child).unwrap();
    assert_eq!(
        vault.content("1.2 Topic.md").as_deref(),
        Some("## Child Notes\n- [[1.2a]] (Child)\n")
    );
    assert_eq!(vault.content("1.2a.md").unwrap().matches("[[1.2 Topic]]").count(), 1);
}

#[test]
fn replaced_settings_apply_to_later_events() {
    let vault = Rc::new(MemoryVault::new());
    vault.insert("A.md", "");
    vault.insert("B.md", "");
    let service = attach(&vault, Settings::default());

    let mut settings = service.settings();
    settings.cross_link_heading = "See Also".to_string();
    service.replace_settings(settings);

    vault.edit("A.md", "[[B]]").unwrap();
    assert_eq!(
        vault.content("B.md").as_deref(),
        Some("## See Also\n- [[A]] (Cross-reference)\n")
    );
}
