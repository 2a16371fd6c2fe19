//! Loading and saving whole diagrams.
//!
//! Loading runs in two passes: every object is built first, then the
//! saved links are replayed through [`Diagram::connect`] so both ends of
//! each link exist. Objects of unknown type and links that no longer
//! resolve are logged and skipped; the rest of the file still loads.

use crate::attributes::Attributes;
use crate::data::{AttributeSet, Composite, ConnectionRecord, ObjectNode};
use crate::diagram::Diagram;
use crate::emitter::emit_document;
use crate::error::DiaResult;
use crate::handle::ConnectionTarget;
use crate::object::ObjectRegistry;
use crate::parser::{DiagramDocument, LayerNode, parse_document};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ─── Document <-> Diagram ────────────────────────────────────────────────

/// Build a live diagram from a parsed document.
pub fn diagram_from_document(
    doc: &DiagramDocument,
    registry: &ObjectRegistry,
    attrs: &Attributes,
) -> DiaResult<Diagram> {
    let mut dia = Diagram::new();
    if let Some(bg) = doc.data.get_color("background") {
        dia.background = bg;
    }

    // Pass 1: objects.
    let mut active = None;
    for (li, layer) in doc.layers.iter().enumerate() {
        if li == 0 {
            dia.rename_layer(0, layer.name.as_str());
        } else {
            dia.add_layer(layer.name.as_str());
        }
        dia.set_layer_visible(li, layer.visible);
        if layer.active {
            active = Some(li);
        }
        for node in &layer.objects {
            let object = match registry.load(node, attrs) {
                Ok(o) => o,
                Err(e) => {
                    log::warn!("{}: not loaded: {e}", node.id);
                    continue;
                }
            };
            if let Err(e) = dia.insert_object(object, li, None) {
                log::warn!("{}: not loaded: {e}", node.id);
            }
        }
    }
    if let Some(li) = active {
        dia.set_active_layer(li);
    }

    // Pass 2: links.
    for node in doc.layers.iter().flat_map(|l| &l.objects) {
        if !dia.contains(node.id) {
            continue;
        }
        for rec in &node.connections {
            let target = ConnectionTarget {
                object: rec.to,
                point: rec.point,
            };
            if let Err(e) = dia.connect(node.id, rec.handle, target) {
                log::warn!("{}: link #{} -> {}@{} dropped: {e}", node.id, rec.handle, rec.to, rec.point);
            }
        }
    }
    Ok(dia)
}

/// Snapshot a diagram as a document: layers in order, objects in draw
/// order, each handle link as a connection record.
pub fn document_from_diagram(dia: &Diagram) -> DiagramDocument {
    let mut data = Composite::new("diagramdata");
    data.add_color("background", dia.background);
    let layers = dia
        .layers()
        .iter()
        .enumerate()
        .map(|(li, layer)| LayerNode {
            name: layer.name.clone(),
            visible: layer.visible,
            active: li == dia.active_layer(),
            objects: layer
                .objects()
                .iter()
                .filter_map(|&id| dia.get(id))
                .map(|obj| {
                    let ty = obj.object_type();
                    let mut node = ObjectNode::new(ty.name, ty.version, obj.id());
                    obj.save(&mut node);
                    node.connections = obj
                        .handles()
                        .iter()
                        .enumerate()
                        .filter_map(|(i, h)| {
                            h.connected_to().map(|t| ConnectionRecord {
                                handle: i,
                                to: t.object,
                                point: t.point,
                            })
                        })
                        .collect();
                    node
                })
                .collect(),
        })
        .collect();
    DiagramDocument { data, layers }
}

// ─── Bytes and files ─────────────────────────────────────────────────────

/// Load from raw file contents, gunzipping when the data starts with the
/// gzip magic.
pub fn load_bytes(bytes: &[u8], registry: &ObjectRegistry, attrs: &Attributes) -> DiaResult<Diagram> {
    let xml = if bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out)?;
        String::from_utf8(out)?
    } else {
        String::from_utf8(bytes.to_vec())?
    };
    load_str(&xml, registry, attrs)
}

pub fn load_str(xml: &str, registry: &ObjectRegistry, attrs: &Attributes) -> DiaResult<Diagram> {
    diagram_from_document(&parse_document(xml)?, registry, attrs)
}

pub fn load_file(path: impl AsRef<Path>, registry: &ObjectRegistry, attrs: &Attributes) -> DiaResult<Diagram> {
    let path = path.as_ref();
    log::debug!("loading {}", path.display());
    load_bytes(&std::fs::read(path)?, registry, attrs)
}

pub fn save_string(dia: &Diagram) -> DiaResult<String> {
    emit_document(&document_from_diagram(dia))
}

pub fn save_bytes(dia: &Diagram, compress: bool) -> DiaResult<Vec<u8>> {
    let xml = save_string(dia)?;
    if !compress {
        return Ok(xml.into_bytes());
    }
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(xml.as_bytes())?;
    Ok(enc.finish()?)
}

pub fn save_file(path: impl AsRef<Path>, dia: &Diagram, compress: bool) -> DiaResult<()> {
    let path = path.as_ref();
    log::debug!("saving {} (compressed: {compress})", path.display());
    std::fs::write(path, save_bytes(dia, compress)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::Point;
    use pretty_assertions::assert_eq;

    fn linked() -> Diagram {
        let reg = ObjectRegistry::with_standard_shapes();
        let attrs = Attributes::default();
        let mut dia = Diagram::new();
        let id = dia.next_id();
        let b = dia
            .add_object(reg.create("Standard - Box", Point::new(4.0, 4.0), &attrs, id).unwrap().object)
            .unwrap();
        let id = dia.next_id();
        let l = dia
            .add_object(reg.create("Standard - Line", Point::ZERO, &attrs, id).unwrap().object)
            .unwrap();
        dia.connect(l, 1, ConnectionTarget { object: b, point: 3 }).unwrap();
        dia
    }

    #[test]
    fn gzip_is_detected() {
        let dia = linked();
        let plain = save_bytes(&dia, false).unwrap();
        let packed = save_bytes(&dia, true).unwrap();
        assert!(packed.starts_with(&GZIP_MAGIC));
        let reg = ObjectRegistry::with_standard_shapes();
        let a = load_bytes(&plain, &reg, &Attributes::default()).unwrap();
        let b = load_bytes(&packed, &reg, &Attributes::default()).unwrap();
        assert_eq!(save_string(&a).unwrap(), save_string(&b).unwrap());
    }

    #[test]
    fn links_survive_reload() {
        let dia = linked();
        let reg = ObjectRegistry::with_standard_shapes();
        let back = load_str(&save_string(&dia).unwrap(), &reg, &Attributes::default()).unwrap();
        assert_eq!(back.links(), dia.links());
        assert!(back.check_links().is_empty());
    }

    #[test]
    fn unknown_type_skips_only_that_object() {
        let mut doc = document_from_diagram(&linked());
        doc.layers[0].objects[0].type_name = "Flowchart - Nope".into();
        let reg = ObjectRegistry::with_standard_shapes();
        let dia = diagram_from_document(&doc, &reg, &Attributes::default()).unwrap();
        assert_eq!(dia.len(), 1);
        assert!(dia.links().is_empty());
    }

    #[test]
    fn layers_roundtrip() {
        let mut dia = linked();
        let top = dia.add_layer("Notes");
        dia.set_layer_visible(top, false);
        dia.set_active_layer(top);
        let reg = ObjectRegistry::with_standard_shapes();
        let back = load_str(&save_string(&dia).unwrap(), &reg, &Attributes::default()).unwrap();
        assert_eq!(back.layers().len(), 2);
        assert_eq!(back.layers()[1].name, "Notes");
        assert!(!back.layers()[1].visible);
        assert_eq!(back.active_layer(), 1);
        assert_eq!(back.background, Color::WHITE);
    }
}
