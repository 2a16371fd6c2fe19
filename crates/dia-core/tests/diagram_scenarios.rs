//! Integration tests: load a `.dia` fixture, edit it through the public
//! API, and check that links, text and geometry stay consistent.

use dia_core::change::ObjectChange;
use dia_core::file::{load_file, load_str, save_file, save_string};
use dia_core::{
    Attributes, ConnectionTarget, Diagram, HandleMoveReason, Key, LinkRecord, ModifierKeys, ObjectId, ObjectRegistry,
    Point, Rect,
};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn fixture() -> Diagram {
    let _ = env_logger::builder().is_test(true).try_init();
    load_str(
        include_str!("fixtures/connected.dia"),
        &ObjectRegistry::with_standard_shapes(),
        &Attributes::default(),
    )
    .expect("fixture failed to load")
}

fn id(s: &str) -> ObjectId {
    ObjectId::intern(s)
}

fn line_end(dia: &Diagram) -> Point {
    dia.get(id("O1")).expect("line missing").handles()[1].pos
}

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn fixture_loads_known_objects_and_valid_links() {
    let dia = fixture();
    assert_eq!(dia.len(), 4);
    assert!(!dia.contains(id("O4")), "unknown type should be skipped");
    assert_eq!(
        dia.links(),
        vec![LinkRecord {
            object: id("O1"),
            handle: 1,
            target: ConnectionTarget {
                object: id("O0"),
                point: 3,
            },
        }]
    );
    assert!(dia.check_links().is_empty());
    assert_eq!(dia.dependents(id("O0")), vec![id("O1")]);
}

#[test]
fn circle_aspect_applies_on_load() {
    let dia = fixture();
    let e = dia.get(id("O3")).unwrap().element().unwrap().geometry();
    assert_eq!((e.width, e.height), (2.0, 2.0));
}

// ─── Connected moves ─────────────────────────────────────────────────────

#[test]
fn moving_anchor_drags_line_end() {
    let mut dia = fixture();
    assert_eq!(line_end(&dia), Point::new(2.0, 3.0));
    dia.move_objects(&[id("O0")], Point::new(1.0, 1.0)).unwrap();
    assert_eq!(line_end(&dia), Point::new(3.0, 4.0));
    // the free end stays put
    assert_eq!(dia.get(id("O1")).unwrap().handles()[0].pos, Point::ZERO);
}

#[test]
fn moving_both_keeps_them_together() {
    let mut dia = fixture();
    dia.move_objects(&[id("O0"), id("O1")], Point::new(-2.0, 0.5)).unwrap();
    assert_eq!(line_end(&dia), Point::new(0.0, 3.5));
    assert_eq!(dia.get(id("O1")).unwrap().handles()[0].pos, Point::new(-2.0, 0.5));
}

#[test]
fn resizing_anchor_drags_line_end() {
    let mut dia = fixture();
    let before = dia
        .move_handle(id("O0"), 3, Point::new(1.0, 3.0), HandleMoveReason::UserMoveFinal, ModifierKeys::NONE)
        .unwrap();
    assert_eq!(before, Point::new(2.0, 3.0));
    assert_eq!(dia.get(id("O0")).unwrap().connection_points()[3].pos, Point::new(1.0, 3.0));
    assert_eq!(line_end(&dia), Point::new(1.0, 3.0));
}

#[test]
fn deleting_anchor_clears_links_and_undo_restores_them() {
    let mut dia = fixture();
    let mut change = ObjectChange::delete(&mut dia, id("O0")).unwrap();
    assert_eq!(dia.get(id("O1")).unwrap().handles()[1].connected_to(), None);
    assert!(dia.links().is_empty());
    assert!(dia.check_links().is_empty());

    change.revert(&mut dia).unwrap();
    assert_eq!(dia.links().len(), 1);
    assert!(dia.check_links().is_empty());
}

// ─── Text ────────────────────────────────────────────────────────────────

#[test]
fn backspace_at_row_start_joins_rows() {
    let mut dia = fixture();
    let t = id("O2");
    let text = dia.get_mut(t).unwrap().text_mut().unwrap();
    text.place_cursor(1, 0);
    let edits = text.key_event(&Key::Backspace, ModifierKeys::NONE);
    assert_eq!(text.get_string(), "HelloWorld");
    assert_eq!(text.cursor(), (0, 5));
    dia.update_object(t).unwrap();

    let mut change = ObjectChange::text(t, edits);
    change.revert(&mut dia).unwrap();
    let text = dia.get(t).unwrap().text().unwrap();
    assert_eq!(text.get_string(), "Hello\nWorld");
    assert_eq!(text.cursor(), (1, 0));
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[test]
fn dragging_a_line_end_updates_its_box() {
    let attrs = Attributes {
        line_width: 0.0,
        ..Attributes::default()
    };
    let mut dia = Diagram::new();
    let oid = dia.next_id();
    let created = ObjectRegistry::with_standard_shapes()
        .create("Standard - Line", Point::ZERO, &attrs, oid)
        .unwrap();
    let line = dia.add_object(created.object).unwrap();
    dia.move_handle(line, 1, Point::new(10.0, 5.0), HandleMoveReason::UserMove, ModifierKeys::NONE)
        .unwrap();
    assert_eq!(dia.get(line).unwrap().bounding_box(), Rect::new(0.0, 0.0, 10.0, 5.0));
}

#[test]
fn extents_cover_every_visible_object() {
    let dia = fixture();
    let ext = dia.extents();
    for obj in dia.objects() {
        let bb = obj.bounding_box();
        assert!(ext.contains_rect(&bb), "{} not inside extents", obj.id());
    }
}

// ─── Persistence ─────────────────────────────────────────────────────────

#[test]
fn save_is_stable_across_reload() {
    let first = save_string(&fixture()).unwrap();
    let reloaded = load_str(&first, &ObjectRegistry::with_standard_shapes(), &Attributes::default()).unwrap();
    assert_eq!(save_string(&reloaded).unwrap(), first);
}

fn single_line(numcp: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<dia:diagram xmlns:dia="http://www.lysator.liu.se/~alla/dia/">
  <dia:layer name="Background" visible="true">
    <dia:object type="Standard - Line" version="0" id="O0">
      <dia:attribute name="conn_endpoints">
        <dia:point val="0,0"/>
        <dia:point val="4,0"/>
      </dia:attribute>
      <dia:attribute name="numcp">
        <dia:int val="{numcp}"/>
      </dia:attribute>
    </dia:object>
  </dia:layer>
</dia:diagram>
"#
    )
}

#[test]
fn out_of_range_numcp_falls_back_to_one_point() {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = ObjectRegistry::with_standard_shapes();
    for bad in ["9223372036854775807", "100000", "-3"] {
        let dia = load_str(&single_line(bad), &registry, &Attributes::default()).unwrap();
        let line = dia.get(id("O0")).unwrap();
        assert_eq!(line.connection_points().len(), 1, "numcp {bad}");
        assert_eq!(line.connection_points()[0].pos, Point::new(2.0, 0.0));
    }
    let dia = load_str(&single_line("3"), &registry, &Attributes::default()).unwrap();
    assert_eq!(dia.get(id("O0")).unwrap().connection_points().len(), 3);
}

#[test]
fn compressed_file_roundtrip() {
    let dia = fixture();
    let path = std::env::temp_dir().join(format!("dia-core-roundtrip-{}.dia", std::process::id()));
    save_file(&path, &dia, true).unwrap();
    let back = load_file(&path, &ObjectRegistry::with_standard_shapes(), &Attributes::default()).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(back.len(), dia.len());
    assert_eq!(back.links(), dia.links());
}
