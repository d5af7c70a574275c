//! Integration tests: history recording and whole-scene restore.

mod common;

use common::harness;
use pretty_assertions::assert_eq;
use tc_core::color::Color;
use tc_core::model::{AttrChange, MediaType, TextAlign};
use tc_core::snapshot::Snapshot;
use tc_editor::{EditorEvent, PanelDescription};

// ─── Round trips ─────────────────────────────────────────────────────────

#[test]
fn hello_fill_then_two_undos() {
    let mut h = harness();
    let ed = &mut h.editor;

    let id = ed.add_text("Hello", 24.0, Color::WHITE, 50.0, 50.0, TextAlign::Left);
    ed.commit();
    assert!(ed.select(id));
    ed.set_attr(AttrChange::Fill(Color::rgb8(0xFF, 0xB5, 0x31)));

    assert!(ed.undo());
    let text = ed.scene().get(id).and_then(|n| n.as_text()).unwrap();
    assert_eq!(text.fill, Color::WHITE);
    assert_eq!(ed.selected(), None);

    assert!(ed.undo());
    assert!(!ed.scene().contains(id));
    assert!(ed.welcome().is_some());
    assert!(!ed.undo());
}

#[test]
fn undo_then_redo_is_identity() {
    let mut h = harness();
    let ed = &mut h.editor;
    ed.add_heading();
    ed.add_rect(10.0, 10.0, 80.0, 40.0, Color::BLACK);
    ed.add_body();
    ed.set_attr(AttrChange::Rotation(30.0));
    let before = Snapshot::encode(ed.scene()).unwrap();

    assert!(ed.undo());
    assert_ne!(Snapshot::encode(ed.scene()).unwrap(), before);
    assert!(ed.redo());
    assert_eq!(Snapshot::encode(ed.scene()).unwrap(), before);
    assert_eq!(ed.selected(), None);
}

#[test]
fn new_commit_after_undo_drops_redo_branch() {
    let mut h = harness();
    let ed = &mut h.editor;
    ed.add_heading();
    ed.add_body();
    ed.undo();
    assert!(ed.history().can_redo());
    ed.add_emoji("🔥");
    assert!(!ed.history().can_redo());
    assert!(!ed.redo());
}

#[test]
fn history_is_capped_at_fifty() {
    let mut h = harness();
    let ed = &mut h.editor;
    ed.add_heading();
    for i in 0..80 {
        ed.set_attr(AttrChange::Opacity(i as f32 / 100.0));
    }
    assert_eq!(ed.history().len(), 50);
    assert_eq!(ed.history().pointer(), Some(49));

    let mut undos = 0;
    while ed.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
}

#[test]
fn restore_emits_history_state() {
    let mut h = harness();
    let ed = &mut h.editor;
    ed.add_heading();
    ed.drain_events();
    ed.undo();
    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::HistoryChanged {
        can_undo: false,
        can_redo: true,
    }));
}

// ─── Media across restore ────────────────────────────────────────────────

#[test]
fn deleting_media_releases_its_element() {
    let mut h = harness();
    let id = h.editor.add_audio("loop.mp3");
    assert!(!h.media.element_state(0).paused);

    assert_eq!(h.editor.selected(), Some(id));
    assert!(h.editor.delete_selected());

    let state = h.media.element_state(0);
    assert!(state.paused);
    assert_eq!(state.source, None);
    assert_eq!(state.loads, 1);
    assert!(!h.editor.media().contains(id));
}

#[test]
fn restored_media_comes_back_paused() {
    let mut h = harness();
    let id = h.editor.add_audio("loop.mp3");
    h.editor.add_heading();

    assert!(h.editor.undo());
    assert_eq!(h.media.count(), 2);
    let old = h.media.element_state(0);
    assert!(old.paused);
    assert_eq!(old.source, None);

    let fresh = h.media.element_state(1);
    assert!(fresh.paused);
    assert_eq!(fresh.source.as_deref(), Some("loop.mp3"));
    assert!(h.editor.media().contains(id));
    assert_eq!(
        h.editor.scene().get(id).and_then(|n| n.media_type()),
        Some(MediaType::Audio)
    );
    assert!(h.editor.profile(id).is_some_and(|p| p.click_select));
}

#[test]
fn duplicated_media_gets_its_own_element() {
    let mut h = harness();
    let id = h.editor.add_audio("loop.mp3");
    let copy = h.editor.duplicate_selected().unwrap();
    assert_ne!(copy, id);
    assert_eq!(h.media.count(), 2);
    assert!(h.media.element_state(1).paused);

    let idx = h.editor.scene().index_of(copy).unwrap();
    assert_eq!(h.editor.scene().children(idx).len(), 2);
}

// ─── Panel protocol ──────────────────────────────────────────────────────

#[test]
fn panel_follows_selection() {
    let mut h = harness();
    let id = h.editor.add_heading();
    match h.panel.borrow().descriptions.last() {
        Some(PanelDescription::Node { id: shown, text, .. }) => {
            assert_eq!(*shown, id);
            assert!(text.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }

    let clears = h.panel.borrow().clears;
    h.editor.deselect();
    let log = h.panel.borrow();
    assert!(matches!(
        log.descriptions.last(),
        Some(PanelDescription::Canvas { .. })
    ));
    assert_eq!(log.clears, clears + 1);
}
