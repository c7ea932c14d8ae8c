//! Decoding of geometry records returned by the compute service.

use base64::Engine;
use serde::de::DeserializeOwned;
use shared::{CurvePayload, DataItem, DocumentPayload, GeometryKind, MeshPayload, PointPayload};

use crate::error::DecodeError;
use crate::state::document::{Document, Geometry};

/// Result of decoding one leaf
#[derive(Debug)]
pub enum Decoded {
    Object(Geometry),
    /// A document container; its objects are appended in order
    Document(Document),
}

/// Decode a single tree leaf into geometry.
pub fn decode_item(item: &DataItem) -> Result<Decoded, DecodeError> {
    let type_name = item.type_name.as_str();
    let kind =
        GeometryKind::from_tag(type_name).ok_or_else(|| DecodeError::UnknownType(type_name.to_string()))?;

    let mut value: serde_json::Value =
        serde_json::from_str(&item.data).map_err(|source| DecodeError::InvalidJson {
            type_name: type_name.to_string(),
            source,
        })?;
    // Some services double-encode the payload as a JSON string
    if let serde_json::Value::String(inner) = &value {
        value = serde_json::from_str(inner).map_err(|source| DecodeError::InvalidJson {
            type_name: type_name.to_string(),
            source,
        })?;
    }

    match kind {
        GeometryKind::Mesh => {
            let mesh: MeshPayload = payload(type_name, value)?;
            validate_mesh(&mesh).map_err(|reason| invalid(type_name, reason))?;
            Ok(Decoded::Object(Geometry::Mesh(mesh)))
        }
        GeometryKind::Curve => {
            let curve: CurvePayload = payload(type_name, value)?;
            if curve.points.len() < 2 {
                return Err(invalid(type_name, "curve needs at least two points".into()));
            }
            Ok(Decoded::Object(Geometry::Curve(curve)))
        }
        GeometryKind::Point => {
            let point: PointPayload = payload(type_name, value)?;
            Ok(Decoded::Object(Geometry::Point(point)))
        }
        GeometryKind::Generic => {
            if !value.is_object() {
                return Err(invalid(type_name, "expected a JSON object".into()));
            }
            let user_strings = match value.get("userStrings") {
                Some(us) => serde_json::from_value(us.clone())
                    .map_err(|e| invalid(type_name, format!("userStrings: {e}")))?,
                None => Vec::new(),
            };
            Ok(Decoded::Object(Geometry::Generic {
                type_name: type_name.to_string(),
                data: value,
                user_strings,
            }))
        }
        GeometryKind::Document => {
            let container: DocumentPayload = payload(type_name, value)?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(container.archive.as_bytes())
                .map_err(|e| DecodeError::Document(e.to_string()))?;
            let document = Document::from_bytes(&bytes).map_err(|e| DecodeError::Document(e.to_string()))?;
            Ok(Decoded::Document(document))
        }
    }
}

fn payload<T: DeserializeOwned>(type_name: &str, value: serde_json::Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| invalid(type_name, e.to_string()))
}

fn invalid(type_name: &str, reason: String) -> DecodeError {
    DecodeError::InvalidPayload {
        type_name: type_name.to_string(),
        reason,
    }
}

fn validate_mesh(mesh: &MeshPayload) -> Result<(), String> {
    let vertex_count = mesh.vertices.len();
    for (i, face) in mesh.faces.iter().enumerate() {
        if face.len() != 3 && face.len() != 4 {
            return Err(format!("face {i} has {} vertices", face.len()));
        }
        if let Some(bad) = face.iter().find(|&&idx| idx as usize >= vertex_count) {
            return Err(format!("face {i} references vertex {bad} of {vertex_count}"));
        }
    }
    Ok(())
}
