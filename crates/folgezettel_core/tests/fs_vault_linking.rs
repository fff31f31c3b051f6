use folgezettel_core::{
    ChildCreation, CollectionIndex, FsVault, HostUi, LinkService, Note, NoteStore, Settings,
};
use std::cell::RefCell;
use std::fs;
use std::time::Duration;

#[derive(Default)]
struct RecordingUi {
    notices: RefCell<Vec<String>>,
}

impl HostUi for RecordingUi {
    fn notify(&self, message: &str, _duration: Option<Duration>) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, _prompt: &str) -> bool {
        false
    }

    fn open_note(&self, _note: &Note) {}
}

fn vault_with(files: &[(&str, &str)]) -> (tempfile::TempDir, FsVault) {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let target = dir.path().join(path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }
    let vault = FsVault::open(dir.path()).unwrap();
    (dir, vault)
}

#[test]
fn processing_a_note_on_disk_links_parent_and_child() {
    let (dir, vault) = vault_with(&[
        ("zettel/1.2 Topic.md", "# Topic\n"),
        ("zettel/1.2a Detail.md", "Body\n"),
    ]);
    let ui = RecordingUi::default();
    let service = LinkService::new(&vault, &ui, Settings::default());

    let child = Note::from_path("zettel/1.2a Detail.md");
    service.on_created(&child).unwrap();
    service.on_created(&child).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("zettel/1.2a Detail.md")).unwrap(),
        "Body\n\n## Related Notes\n- [[1.2 Topic]] (Parent)\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("zettel/1.2 Topic.md")).unwrap(),
        "# Topic\n\n## Child Notes\n- [[1.2a Detail]] (Child)\n"
    );
    assert_eq!(
        *ui.notices.borrow(),
        vec!["Folgezettel links created for 1.2a Detail".to_string()]
    );
}

#[test]
fn creating_a_child_on_disk_then_processing_it() {
    let (dir, vault) = vault_with(&[("3 Root.md", ""), ("3a First.md", "")]);
    let ui = RecordingUi::default();
    let service = LinkService::new(&vault, &ui, Settings::default());

    let created = match service
        .create_next_child(&Note::from_path("3 Root.md"))
        .unwrap()
    {
        ChildCreation::Created(note) => note,
        other => panic!("expected creation, got {other:?}"),
    };
    assert_eq!(created.path, "3b.md");
    assert!(dir.path().join("3b.md").is_file());

    service.on_created(&created).unwrap();
    assert_eq!(
        vault.read_note(&created).unwrap(),
        "## Related Notes\n- [[3 Root]] (Parent)\n"
    );
}

#[test]
fn reciprocal_links_on_disk() {
    let (_dir, vault) = vault_with(&[("a/Alpha.md", "[[Beta]]\n"), ("b/Beta.md", "")]);
    let ui = RecordingUi::default();
    let service = LinkService::new(&vault, &ui, Settings::default());

    service.on_modified(&Note::from_path("a/Alpha.md")).unwrap();
    assert_eq!(
        vault.read_note(&Note::from_path("b/Beta.md")).unwrap(),
        "## Related Notes\n- [[Alpha]] (Cross-reference)\n"
    );
}

#[test]
fn duplicate_groups_on_disk() {
    let (_dir, vault) = vault_with(&[
        ("1.2 One.md", ""),
        ("nested/1.2 Two.md", ""),
        ("1.3 Three.md", ""),
    ]);
    let groups = CollectionIndex::new(&vault).duplicate_groups().unwrap();
    assert_eq!(groups.len(), 1);
    let paths: Vec<&str> = groups[0].notes.iter().map(|n| n.path.as_str()).collect();
    assert_eq!(paths, vec!["1.2 One.md", "nested/1.2 Two.md"]);
}
