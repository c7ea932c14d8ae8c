use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DataItem, ParamValue};

/// Путь ветки дерева: `{0;1;2}`.
///
/// Сравнение идёт по числам, а не по строке, поэтому `{0;2}` < `{0;10}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchPath(Vec<u32>);

/// Ошибка разбора пути ветки
#[derive(Debug, Clone, PartialEq)]
pub struct PathError(pub String);

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid branch path: {}", self.0)
    }
}

impl std::error::Error for PathError {}

impl BranchPath {
    pub fn new(indices: impl Into<Vec<u32>>) -> Self {
        Self(indices.into())
    }

    /// Корневая ветка `{0}`
    pub fn root() -> Self {
        Self(vec![0])
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{{{}}}", parts.join(";"))
    }
}

impl FromStr for BranchPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        if inner.trim().is_empty() {
            return Err(PathError(s.to_string()));
        }
        let indices = inner
            .split(';')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| PathError(s.to_string()))?;
        Ok(Self(indices))
    }
}

impl Serialize for BranchPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BranchPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Дерево данных одного параметра (входного или выходного)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DataTree {
    #[serde(rename = "ParamName")]
    pub param_name: String,
    #[serde(rename = "InnerTree", default)]
    pub inner_tree: BTreeMap<BranchPath, Vec<DataItem>>,
}

impl DataTree {
    pub fn new(param_name: impl Into<String>) -> Self {
        Self {
            param_name: param_name.into(),
            inner_tree: BTreeMap::new(),
        }
    }

    /// Дерево с единственной корневой веткой `{0}`
    pub fn single(param_name: impl Into<String>, values: &[ParamValue]) -> Self {
        let mut tree = Self::new(param_name);
        tree.append(BranchPath::root(), values.iter().map(ParamValue::to_item));
        tree
    }

    /// Добавить элементы в конец ветки (создаёт ветку при необходимости)
    pub fn append(&mut self, path: BranchPath, items: impl IntoIterator<Item = DataItem>) {
        self.inner_tree.entry(path).or_default().extend(items);
    }

    pub fn branch(&self, path: &BranchPath) -> Option<&[DataItem]> {
        self.inner_tree.get(path).map(Vec::as_slice)
    }

    /// Ветки в порядке возрастания пути
    pub fn branches(&self) -> impl Iterator<Item = (&BranchPath, &[DataItem])> {
        self.inner_tree.iter().map(|(p, items)| (p, items.as_slice()))
    }

    /// Все листья: сначала по веткам, затем по порядку внутри ветки
    pub fn leaves(&self) -> impl Iterator<Item = &DataItem> {
        self.inner_tree.values().flatten()
    }

    pub fn leaf_count(&self) -> usize {
        self.inner_tree.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }
}
