use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod tree;

pub use geometry::{
    CurvePayload, DocumentPayload, GeometryKind, MeshPayload, PointPayload, UserStrings,
};
pub use tree::{BranchPath, DataTree, PathError};

/// Тег типа для скалярных значений
pub const TYPE_DOUBLE: &str = "System.Double";
pub const TYPE_INT: &str = "System.Int32";
pub const TYPE_BOOL: &str = "System.Boolean";
pub const TYPE_STRING: &str = "System.String";

/// Элемент ветки дерева данных: тег типа + JSON-текст значения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    #[serde(rename = "type")]
    pub type_name: String,
    /// JSON, сериализованный в строку
    pub data: String,
}

impl DataItem {
    pub fn new(type_name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            data: data.into(),
        }
    }
}

/// Значение входного параметра
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    /// Уже закодированная геометрия
    Geometry(DataItem),
}

impl ParamValue {
    /// Закодировать значение в элемент дерева
    pub fn to_item(&self) -> DataItem {
        match self {
            ParamValue::Number(v) => DataItem::new(TYPE_DOUBLE, json_text(v)),
            ParamValue::Integer(v) => DataItem::new(TYPE_INT, v.to_string()),
            ParamValue::Boolean(v) => DataItem::new(TYPE_BOOL, v.to_string()),
            ParamValue::Text(v) => DataItem::new(TYPE_STRING, json_text(v)),
            ParamValue::Geometry(item) => item.clone(),
        }
    }

    /// Восстановить скалярное значение из элемента дерева.
    /// Геометрия возвращается как есть.
    pub fn from_item(item: &DataItem) -> Result<Self, serde_json::Error> {
        Ok(match item.type_name.as_str() {
            TYPE_DOUBLE => ParamValue::Number(serde_json::from_str(&item.data)?),
            TYPE_INT => ParamValue::Integer(serde_json::from_str(&item.data)?),
            TYPE_BOOL => ParamValue::Boolean(serde_json::from_str(&item.data)?),
            TYPE_STRING => ParamValue::Text(serde_json::from_str(&item.data)?),
            _ => ParamValue::Geometry(item.clone()),
        })
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Boolean(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

fn json_text<T: Serialize + ?Sized>(value: &T) -> String {
    // f64 и String всегда сериализуются; NaN превращается в null
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Запрос на вычисление определения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Определение в base64
    pub algo: String,
    /// URL определения вместо `algo` (не используется клиентом)
    pub pointer: Option<String>,
    pub values: Vec<DataTree>,
}

/// Ответ сервиса вычислений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EvaluationResponse {
    pub values: Vec<DataTree>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Тип файла на сервере ассетов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Definition,
    Model,
    Other,
}

impl AssetKind {
    /// Определить тип по расширению файла
    pub fn from_file_name(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "gh" | "ghx" => AssetKind::Definition,
            "3dm" | "json" => AssetKind::Model,
            _ => AssetKind::Other,
        }
    }
}

/// Запись в списке ассетов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub name: String,
    pub size: u64,
    pub kind: AssetKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_item_roundtrip() {
        let item = ParamValue::Number(5.0).to_item();
        assert_eq!(item.type_name, TYPE_DOUBLE);
        assert_eq!(ParamValue::from_item(&item).unwrap(), ParamValue::Number(5.0));
    }

    #[test]
    fn test_text_item_is_json_quoted() {
        let item = ParamValue::from("abc").to_item();
        assert_eq!(item.data, "\"abc\"");
    }

    #[test]
    fn test_data_item_wire_names() {
        let json = serde_json::to_value(DataItem::new(TYPE_INT, "3")).unwrap();
        assert_eq!(json["type"], "System.Int32");
        assert_eq!(json["data"], "3");
    }

    #[test]
    fn test_response_defaults_errors() {
        let resp: EvaluationResponse = serde_json::from_str(r#"{"values": []}"#).unwrap();
        assert!(resp.errors.is_empty());
        assert!(resp.warnings.is_empty());
    }

    #[test]
    fn test_asset_kind() {
        assert_eq!(AssetKind::from_file_name("weav.gh"), AssetKind::Definition);
        assert_eq!(AssetKind::from_file_name("meshes.3DM"), AssetKind::Model);
        assert_eq!(AssetKind::from_file_name("meshes.json"), AssetKind::Model);
        assert_eq!(AssetKind::from_file_name("README"), AssetKind::Other);
    }
}
