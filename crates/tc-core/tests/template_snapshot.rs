//! Integration tests: template JSON → scene nodes → history snapshot.

use pretty_assertions::assert_eq;
use tc_core::id::NodeId;
use tc_core::model::{BitmapInfo, FontStyle, NodeKind, TextAlign};
use tc_core::scene::SceneGraph;
use tc_core::snapshot::Snapshot;
use tc_core::template::Template;

fn promo() -> Template {
    Template::from_json(include_str!("fixtures/promo.json")).expect("promo fixture parses")
}

fn bitmap(src: &str) -> BitmapInfo {
    BitmapInfo {
        source: src.to_string(),
        width: 64.0,
        height: 32.0,
    }
}

/// Expand the template the way the loader does: others first, images after.
fn expand(template: &Template) -> SceneGraph {
    let (images, others) = template.partition();
    let mut scene = SceneGraph::new();
    for d in others {
        scene.add(d.build().unwrap());
    }
    for d in images.iter().rev() {
        let node = d.build_image(&bitmap(d.source().unwrap()));
        let background = node.is_background();
        let id = node.id;
        scene.add(node);
        if background {
            scene.pin_to_bottom(id);
        }
    }
    scene
}

#[test]
fn partition_keeps_document_order() {
    let t = promo();
    let (images, others) = t.partition();
    let image_ids: Vec<_> = images.iter().map(|d| d.id.clone().unwrap()).collect();
    assert_eq!(image_ids, vec!["promo_bg", "promo_badge"]);
    assert_eq!(others.len(), 3);
}

#[test]
fn expansion_puts_background_lowest() {
    let scene = expand(&promo());
    assert_eq!(scene.len(), 5);
    assert_eq!(scene.z_index(NodeId::intern("promo_bg")), Some(0));
    assert_eq!(scene.background(), Some(NodeId::intern("promo_bg")));
    assert_eq!(scene.editable_ids().len(), 4);
}

#[test]
fn attributes_reach_variant_payloads() {
    let scene = expand(&promo());

    let title = scene.get(NodeId::intern("promo_title")).unwrap();
    let text = title.as_text().unwrap();
    assert_eq!(text.font_style, FontStyle::Bold);
    assert_eq!(text.align, TextAlign::Center);
    assert_eq!(text.font_family, "Anton");

    let badge = scene.get(NodeId::intern("promo_badge")).unwrap();
    assert_eq!((badge.width, badge.height), (64.0, 32.0));
    assert_eq!(badge.opacity, 0.9);

    let button = scene.get(NodeId::intern("promo_button")).unwrap();
    match &button.kind {
        NodeKind::Rect(r) => {
            assert_eq!(r.fill.to_hex(), "#FFB531");
            assert_eq!(r.stroke.map(|c| c.to_hex()), Some("#000000".to_string()));
            assert_eq!(r.stroke_width, 2.0);
        }
        other => panic!("expected rect, got {other:?}"),
    }
}

#[test]
fn expanded_scene_survives_a_snapshot() {
    let scene = expand(&promo());
    let snap = Snapshot::encode(&scene).unwrap();
    let rebuilt = snap.decode().unwrap().rebuild();
    assert_eq!(rebuilt.ids(), scene.ids());
    for id in scene.ids() {
        assert_eq!(rebuilt.get(id), scene.get(id));
    }
}
