//! In-memory document of decoded geometry, and its file format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{CurvePayload, MeshPayload, PointPayload, UserStrings};
use uuid::Uuid;

use crate::error::LoadError;

/// Format identifier written into every saved document.
pub const FORMAT_NAME: &str = "compute-gui-document";
/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;
/// File extension for saved documents. The content is JSON, not an opennurbs archive.
pub const DOCUMENT_EXTENSION: &str = "json";

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `"r,g,b"` (as written into user strings by definitions).
    pub fn parse_rgb(text: &str) -> Option<Self> {
        let mut parts = text.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::rgb(r, g, b))
    }
}

/// Named, colored layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub color: Color,
}

impl Layer {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Per-object attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectAttributes {
    /// Index into the document layer table; 0 is the default layer
    #[serde(default)]
    pub layer_index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_strings: UserStrings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectAttributes {
    /// Set a user string, replacing an existing value for the same key
    pub fn set_user_string(&mut self, key: &str, value: &str) {
        match self.user_strings.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.user_strings.push((key.to_string(), value.to_string())),
        }
    }

    pub fn user_string(&self, key: &str) -> Option<&str> {
        self.user_strings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Decoded geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Mesh(MeshPayload),
    Curve(CurvePayload),
    Point(PointPayload),
    /// Geometry the viewer can carry but not display (breps, surfaces, ...)
    Generic {
        type_name: String,
        data: serde_json::Value,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        user_strings: UserStrings,
    },
}

impl Geometry {
    /// User strings attached to the geometry itself
    pub fn user_strings(&self) -> &[(String, String)] {
        match self {
            Geometry::Mesh(m) => &m.user_strings,
            Geometry::Curve(c) => &c.user_strings,
            Geometry::Point(p) => &p.user_strings,
            Geometry::Generic { user_strings, .. } => user_strings,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshPayload> {
        match self {
            Geometry::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Geometry::Mesh(_) => "mesh",
            Geometry::Curve(_) => "curve",
            Geometry::Point(_) => "point",
            Geometry::Generic { type_name, .. } => type_name,
        }
    }
}

/// Document object: geometry plus attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocObject {
    pub id: Uuid,
    pub geometry: Geometry,
    #[serde(default)]
    pub attributes: ObjectAttributes,
}

/// Container of decoded geometry for one evaluation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    layers: Vec<Layer>,
    objects: Vec<DocObject>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct DocumentFileRef<'a> {
    format: &'a str,
    version: u32,
    layers: &'a [Layer],
    objects: &'a [DocObject],
}

#[derive(Deserialize)]
struct DocumentFile {
    format: String,
    version: u32,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    objects: Vec<DocObject>,
}

impl Document {
    /// Empty document with only the default layer
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::new("Default", Color::rgb(0, 0, 0))],
            objects: Vec::new(),
        }
    }

    /// Append a layer, returning its index
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Append an object, returning its id
    pub fn add(&mut self, geometry: Geometry, attributes: ObjectAttributes) -> Uuid {
        let id = Uuid::new_v4();
        self.objects.push(DocObject {
            id,
            geometry,
            attributes,
        });
        id
    }

    pub fn objects(&self) -> &[DocObject] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<DocObject> {
        self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Mesh geometry in object order
    pub fn meshes(&self) -> impl Iterator<Item = &MeshPayload> {
        self.objects.iter().filter_map(|o| o.geometry.as_mesh())
    }

    /// Serialize to the on-disk blob
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&DocumentFileRef {
            format: FORMAT_NAME,
            version: FORMAT_VERSION,
            layers: &self.layers,
            objects: &self.objects,
        })
    }

    /// Parse a blob produced by [`Document::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let file: DocumentFile = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::InvalidDocument(e.to_string()))?;

        if file.format != FORMAT_NAME {
            return Err(LoadError::UnknownFormat(file.format));
        }
        if file.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion {
                file_version: file.version,
                supported_version: FORMAT_VERSION,
            });
        }

        let mut layers = file.layers;
        if layers.is_empty() {
            layers = Document::new().layers;
        }
        Ok(Self {
            layers,
            objects: file.objects,
        })
    }

    /// Write the serialized document to `path`
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let bytes = self.to_bytes().map_err(std::io::Error::other)?;
        std::fs::write(path, bytes)
    }
}
