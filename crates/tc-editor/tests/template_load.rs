//! Integration tests: asynchronous template loading.

mod common;

use common::{Gate, GatedDecoder, bitmap, harness};
use futures::FutureExt;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use tc_core::id::NodeId;
use tc_core::template::Template;
use tc_editor::{EditorEvent, LoadReport, SharedEditor, load_template};

const GALLERY: &str = include_str!("fixtures/gallery.json");
const SOURCES: [&str; 3] = ["gallery/left.png", "gallery/bg.jpg", "gallery/right.png"];

struct Load {
    pool: LocalPool,
    editor: SharedEditor,
    gates: Vec<Option<Gate>>,
    report: Rc<RefCell<Option<LoadReport>>>,
    entries_before: usize,
}

fn start_gallery_load() -> Load {
    let editor = harness().editor.into_shared();
    let decoder = Rc::new(GatedDecoder::default());
    let gates = SOURCES.iter().map(|s| Some(decoder.gate(s))).collect();
    let entries_before = editor.borrow().history().len();
    let template = Template::from_json(GALLERY).unwrap();

    let pool = LocalPool::new();
    let report = Rc::new(RefCell::new(None));
    let slot = report.clone();
    pool.spawner()
        .spawn_local(
            load_template(editor.clone(), decoder, template)
                .map(move |r| *slot.borrow_mut() = Some(r.unwrap())),
        )
        .unwrap();

    Load {
        pool,
        editor,
        gates,
        report,
        entries_before,
    }
}

fn release(load: &mut Load, n: usize, ok: bool) {
    let gate = load.gates[n].take().unwrap();
    let result = if ok {
        Ok(bitmap(SOURCES[n], 600.0, 800.0))
    } else {
        Err(tc_core::EditorError::resource_load(SOURCES[n], "corrupt"))
    };
    gate.send(result).unwrap();
    load.pool.run_until_stalled();
}

const ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

#[test]
fn all_nodes_and_one_commit_in_every_order() {
    for order in ORDERS {
        let mut load = start_gallery_load();
        load.pool.run_until_stalled();

        // Non-image nodes are in before any decode resolves.
        assert_eq!(load.editor.borrow().scene().len(), 3);

        for (step, n) in order.into_iter().enumerate() {
            assert!(load.report.borrow().is_none(), "finished early in {order:?}");
            assert_eq!(
                load.editor.borrow().history().len(),
                load.entries_before,
                "committed before the barrier at step {step} of {order:?}"
            );
            release(&mut load, n, true);
        }

        let report = load.report.borrow_mut().take().unwrap();
        assert_eq!(report.inserted, 6);
        assert_eq!(report.failed, 0);

        let mut ed = load.editor.borrow_mut();
        assert_eq!(ed.scene().len(), 6);
        assert_eq!(ed.history().len(), load.entries_before + 1);
        assert_eq!(ed.scene().z_index(NodeId::intern("g_bg")), Some(0));
        assert_eq!(ed.selected(), Some(NodeId::intern("g_title")));
        assert!(ed.drain_events().contains(&EditorEvent::TemplateLoaded {
            key: "gallery".into(),
            inserted: 6,
            failed: 0,
        }));
    }
}

#[test]
fn failed_decode_keeps_siblings() {
    let mut load = start_gallery_load();
    load.pool.run_until_stalled();
    release(&mut load, 1, true);
    release(&mut load, 0, false);
    release(&mut load, 2, true);

    let report = load.report.borrow_mut().take().unwrap();
    assert_eq!((report.inserted, report.failed), (5, 1));

    let ed = load.editor.borrow();
    assert_eq!(ed.scene().len(), 5);
    assert!(!ed.scene().contains(NodeId::intern("g_left")));
    assert!(ed.scene().contains(NodeId::intern("g_right")));
    assert_eq!(ed.history().len(), load.entries_before + 1);
}

#[test]
fn declared_size_wins_over_bitmap() {
    let mut load = start_gallery_load();
    load.pool.run_until_stalled();
    for n in 0..3 {
        release(&mut load, n, true);
    }
    let ed = load.editor.borrow();
    let left = ed.scene().get(NodeId::intern("g_left")).unwrap();
    assert_eq!((left.width, left.height), (120.0, 160.0));
    assert_eq!(
        ed.bitmap("gallery/left.png").map(|b| (b.width, b.height)),
        Some((600.0, 800.0))
    );
}
