//! Post-processing applied while building a document from compute output.

use shared::{DataItem, EvaluationResponse};

use crate::error::{DecodeError, EvaluationError};
use crate::geometry::{decode_item, Decoded};
use crate::state::document::{Document, Geometry, Layer, ObjectAttributes};

/// What a compute request does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Run the loaded definition with the slider values
    #[default]
    Evaluate,
    /// Union every mesh of the current document on the server
    MeshBooleanUnion,
}

/// Per-preset decoding policy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Policy {
    /// Copy the first geometry user string onto the object attributes
    pub propagate_user_strings: bool,
    /// Layers declared on every new document; when non-empty, objects of
    /// output `i` go to layer `i + 1`
    pub layers: Vec<Layer>,
}

impl Policy {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn with_user_strings(mut self) -> Self {
        self.propagate_user_strings = true;
        self
    }

    pub fn with_layers(mut self, layers: Vec<Layer>) -> Self {
        self.layers = layers;
        self
    }

    /// Empty document with the declared layers
    pub fn new_document(&self) -> Document {
        let mut doc = Document::new();
        for layer in &self.layers {
            doc.add_layer(layer.clone());
        }
        doc
    }

    /// Apply the policy to the attributes of an object from output `output_index`
    pub fn apply(&self, output_index: usize, geometry: &Geometry, attributes: &mut ObjectAttributes) {
        if !self.layers.is_empty() {
            attributes.layer_index = output_index + 1;
        }
        if self.propagate_user_strings {
            if let Some((key, value)) = geometry.user_strings().first() {
                attributes.set_user_string(key, value);
            }
        }
    }
}

/// Decode every output leaf into a fresh document.
///
/// Outputs are visited in response order, branches in ascending path order
/// and values in received order. The first undecodable leaf aborts the build.
pub fn build_document(response: &EvaluationResponse, policy: &Policy) -> Result<Document, DecodeError> {
    let mut doc = policy.new_document();

    for (output_index, tree) in response.values.iter().enumerate() {
        for (path, items) in tree.branches() {
            tracing::trace!(output = %tree.param_name, %path, items = items.len(), "Decoding branch");
            for item in items {
                match decode_item(item)? {
                    Decoded::Object(geometry) => {
                        let mut attributes = ObjectAttributes::default();
                        policy.apply(output_index, &geometry, &mut attributes);
                        doc.add(geometry, attributes);
                    }
                    Decoded::Document(inner) => {
                        for object in inner.into_objects() {
                            let mut attributes = object.attributes;
                            // Inner layer indices mean nothing in this document
                            attributes.layer_index = 0;
                            policy.apply(output_index, &object.geometry, &mut attributes);
                            doc.add(object.geometry, attributes);
                        }
                    }
                }
            }
        }
    }

    Ok(doc)
}

/// Build the replacement document from a boolean union result.
pub fn build_union_document(items: &[DataItem]) -> Result<Document, EvaluationError> {
    let mut doc = Document::new();
    for item in items {
        match decode_item(item)? {
            Decoded::Object(geometry @ Geometry::Mesh(_)) => {
                doc.add(geometry, ObjectAttributes::default());
            }
            Decoded::Object(other) => {
                return Err(EvaluationError::MalformedResponse(format!(
                    "boolean union returned a {}",
                    other.kind_name()
                )));
            }
            Decoded::Document(_) => {
                return Err(EvaluationError::MalformedResponse(
                    "boolean union returned a document".to_string(),
                ));
            }
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::document::Color;
    use shared::{BranchPath, DataTree, MeshPayload};

    fn curve_item(x: f64, color: Option<&str>) -> DataItem {
        let user_strings = match color {
            Some(c) => format!(r#", "userStrings": [["color", "{c}"]]"#),
            None => String::new(),
        };
        DataItem::new(
            "Rhino.Geometry.PolylineCurve",
            format!(r#"{{"points": [[{x},0,0],[{x},1,0]]{user_strings}}}"#),
        )
    }

    fn curve_x(doc: &Document, i: usize) -> f64 {
        match &doc.objects()[i].geometry {
            Geometry::Curve(c) => c.points[0][0],
            other => panic!("Expected curve, got {:?}", other),
        }
    }

    fn response(trees: Vec<DataTree>) -> EvaluationResponse {
        EvaluationResponse {
            values: trees,
            ..Default::default()
        }
    }

    #[test]
    fn test_branch_then_value_order() {
        let mut tree = DataTree::new("out");
        tree.append(BranchPath::new(vec![1]), vec![curve_item(2.0, None)]);
        tree.append(BranchPath::new(vec![0]), vec![curve_item(0.0, None), curve_item(1.0, None)]);

        let doc = build_document(&response(vec![tree]), &Policy::plain()).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(curve_x(&doc, 0), 0.0);
        assert_eq!(curve_x(&doc, 1), 1.0);
        assert_eq!(curve_x(&doc, 2), 2.0);
    }

    #[test]
    fn test_layers_follow_output_index() {
        let layers = vec![
            Layer::new("crvs", Color::rgb(0, 255, 0)),
            Layer::new("crvs2", Color::rgb(255, 0, 0)),
        ];
        let mut a = DataTree::new("a");
        a.append(BranchPath::root(), vec![curve_item(0.0, None)]);
        let mut b = DataTree::new("b");
        b.append(BranchPath::root(), vec![curve_item(1.0, None)]);

        let doc = build_document(&response(vec![a, b]), &Policy::plain().with_layers(layers)).unwrap();
        assert_eq!(doc.layers().len(), 3);
        assert_eq!(doc.objects()[0].attributes.layer_index, 1);
        assert_eq!(doc.objects()[1].attributes.layer_index, 2);
    }

    #[test]
    fn test_plain_policy_keeps_default_layer() {
        let mut a = DataTree::new("a");
        a.append(BranchPath::root(), vec![curve_item(0.0, Some("1,2,3"))]);
        let doc = build_document(&response(vec![a]), &Policy::plain()).unwrap();
        assert_eq!(doc.objects()[0].attributes.layer_index, 0);
        assert!(doc.objects()[0].attributes.user_strings.is_empty());
    }

    #[test]
    fn test_user_string_propagation_copies_first_entry() {
        let mut a = DataTree::new("a");
        a.append(BranchPath::root(), vec![curve_item(0.0, Some("255,0,0")), curve_item(1.0, None)]);
        let doc = build_document(&response(vec![a]), &Policy::plain().with_user_strings()).unwrap();
        assert_eq!(doc.objects()[0].attributes.user_string("color"), Some("255,0,0"));
        assert!(doc.objects()[1].attributes.user_strings.is_empty());
    }

    #[test]
    fn test_bad_leaf_aborts_build() {
        let mut a = DataTree::new("a");
        a.append(
            BranchPath::root(),
            vec![curve_item(0.0, None), DataItem::new("Unknown.Type", "{}")],
        );
        assert!(build_document(&response(vec![a]), &Policy::plain()).is_err());
    }

    #[test]
    fn test_union_document_rejects_non_mesh() {
        let mesh = MeshPayload {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
            user_strings: Vec::new(),
        };
        let doc = build_union_document(&[mesh.to_item()]).unwrap();
        assert_eq!(doc.len(), 1);

        let err = build_union_document(&[curve_item(0.0, None)]).unwrap_err();
        assert!(matches!(err, EvaluationError::MalformedResponse(_)));
    }
}
