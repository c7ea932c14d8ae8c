use serde::{Deserialize, Serialize};

use crate::DataItem;

/// Пользовательские строки: упорядоченные пары ключ/значение
pub type UserStrings = Vec<(String, String)>;

pub const TYPE_MESH: &str = "Rhino.Geometry.Mesh";
pub const TYPE_POINT: &str = "Rhino.Geometry.Point";
pub const TYPE_DOCUMENT: &str = "Rhino.FileIO.File3dm";
pub const TYPE_POLYLINE_CURVE: &str = "Rhino.Geometry.PolylineCurve";

const CURVE_TYPES: &[&str] = &[
    "Rhino.Geometry.Curve",
    "Rhino.Geometry.PolylineCurve",
    "Rhino.Geometry.NurbsCurve",
    "Rhino.Geometry.LineCurve",
    "Rhino.Geometry.ArcCurve",
    "Rhino.Geometry.PolyCurve",
];

const GENERIC_TYPES: &[&str] = &[
    "Rhino.Geometry.GeometryBase",
    "Rhino.Geometry.Brep",
    "Rhino.Geometry.Extrusion",
    "Rhino.Geometry.Surface",
    "Rhino.Geometry.NurbsSurface",
    "Rhino.Geometry.SubD",
];

/// Класс геометрии по тегу типа
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Mesh,
    Curve,
    Point,
    Generic,
    Document,
}

impl GeometryKind {
    /// `None` для неизвестного тега
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TYPE_MESH => Some(GeometryKind::Mesh),
            TYPE_POINT => Some(GeometryKind::Point),
            TYPE_DOCUMENT => Some(GeometryKind::Document),
            t if CURVE_TYPES.contains(&t) => Some(GeometryKind::Curve),
            t if GENERIC_TYPES.contains(&t) => Some(GeometryKind::Generic),
            _ => None,
        }
    }
}

/// Полигональная сетка: треугольники и четырёхугольники
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MeshPayload {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_strings: UserStrings,
}

/// Кривая, аппроксимированная ломаной
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurvePayload {
    pub points: Vec<[f64; 3]>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_strings: UserStrings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointPayload {
    pub location: [f64; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_strings: UserStrings,
}

/// Вложенный документ: сериализованный документ в base64
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub archive: String,
}

impl MeshPayload {
    pub fn to_item(&self) -> DataItem {
        DataItem::new(TYPE_MESH, to_json(self))
    }
}

impl CurvePayload {
    pub fn to_item(&self) -> DataItem {
        DataItem::new(TYPE_POLYLINE_CURVE, to_json(self))
    }
}

impl PointPayload {
    pub fn to_item(&self) -> DataItem {
        DataItem::new(TYPE_POINT, to_json(self))
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
