//! Viewport scene graph.
//!
//! Every node carries an explicit [`Ownership`] tag. The client only ever
//! removes `Managed` nodes; lights and anything else set up by the viewer
//! are `External` and survive republishing.

use glam::Vec3;

use super::mesh::MeshData;
use crate::state::document::{Color, DocObject, Document, Geometry};

const DEFAULT_COLOR: Color = Color::rgb(200, 200, 200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Added by the evaluation client; replaced on every republish
    Managed,
    /// Owned by the viewer itself
    External,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional { direction: Vec3, intensity: f32 },
    Ambient { intensity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Light(Light),
    Mesh(MeshData),
    Polyline { points: Vec<Vec3>, closed: bool },
    Point(Vec3),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: u64,
    pub name: String,
    pub kind: NodeKind,
    pub color: Color,
    pub ownership: Ownership,
}

impl SceneNode {
    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene with a directional and an ambient light
    pub fn with_default_lights() -> Self {
        let mut scene = Self::new();
        scene.add(
            "directional light",
            NodeKind::Light(Light::Directional {
                direction: Vec3::new(-1.0, -1.0, -1.0).normalize(),
                intensity: 2.0,
            }),
            Color::rgb(255, 255, 255),
            Ownership::External,
        );
        scene.add(
            "ambient light",
            NodeKind::Light(Light::Ambient { intensity: 1.0 }),
            Color::rgb(255, 255, 255),
            Ownership::External,
        );
        scene
    }

    pub fn add(&mut self, name: impl Into<String>, kind: NodeKind, color: Color, ownership: Ownership) -> u64 {
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id: self.next_id,
            name: name.into(),
            kind,
            color,
            ownership,
        });
        self.next_id
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn managed_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.ownership == Ownership::Managed)
            .count()
    }

    /// Remove all managed nodes (never lights). Returns how many were removed.
    pub fn clear_managed(&mut self) -> usize {
        let before = self.nodes.len();
        self.nodes
            .retain(|n| n.ownership == Ownership::External || n.is_light());
        before - self.nodes.len()
    }

    /// Replace the managed nodes with the contents of `document`.
    /// Returns the number of nodes added.
    pub fn republish(&mut self, document: &Document) -> usize {
        let removed = self.clear_managed();
        let mut added = 0;
        for object in document.objects() {
            let color = resolve_color(object, document);
            if let Some(kind) = node_kind(&object.geometry, color) {
                let name = object
                    .attributes
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", object.geometry.kind_name(), object.id));
                self.add(name, kind, color, Ownership::Managed);
                added += 1;
            }
        }
        tracing::debug!(removed, added, "Republished scene");
        added
    }

    /// Bounds of all drawable nodes
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut acc: Option<(Vec3, Vec3)> = None;
        let mut grow = |min: Vec3, max: Vec3| {
            acc = Some(match acc {
                None => (min, max),
                Some((a, b)) => (a.min(min), b.max(max)),
            });
        };
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Light(_) => {}
                NodeKind::Mesh(mesh) => {
                    if let Some((min, max)) = mesh.bounds() {
                        grow(min, max);
                    }
                }
                NodeKind::Polyline { points, .. } => {
                    for p in points {
                        grow(*p, *p);
                    }
                }
                NodeKind::Point(p) => grow(*p, *p),
            }
        }
        acc
    }
}

/// Attribute user-string color, then layer color, then the default
pub fn resolve_color(object: &DocObject, document: &Document) -> Color {
    if let Some(color) = object
        .attributes
        .user_strings
        .first()
        .and_then(|(_, value)| Color::parse_rgb(value))
    {
        return color;
    }
    if object.attributes.layer_index > 0 {
        if let Some(layer) = document.layer(object.attributes.layer_index) {
            return layer.color;
        }
    }
    DEFAULT_COLOR
}

fn node_kind(geometry: &Geometry, color: Color) -> Option<NodeKind> {
    let to_vec = |p: &[f64; 3]| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32);
    match geometry {
        Geometry::Mesh(mesh) => {
            let rgb = [
                color.r as f32 / 255.0,
                color.g as f32 / 255.0,
                color.b as f32 / 255.0,
            ];
            Some(NodeKind::Mesh(MeshData::from_payload(mesh, rgb)))
        }
        Geometry::Curve(curve) => Some(NodeKind::Polyline {
            points: curve.points.iter().map(to_vec).collect(),
            closed: curve.closed,
        }),
        Geometry::Point(point) => Some(NodeKind::Point(to_vec(&point.location))),
        Geometry::Generic { .. } => None,
    }
}
