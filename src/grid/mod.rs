//! Hyperparameter combinations and grids
//!
//! A [`HyperparamGrid`] is an ordered list of [`Combination`]s; grid position
//! is the tie-breaker when two combinations score the same.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, Result};

/// A single hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Categorical(String),
}

impl ParameterValue {
    /// Get as int; floats only when they hold a whole number
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Parse a CLI token: integer, then float, then categorical.
    pub fn parse_token(token: &str) -> Self {
        let token = token.trim();
        if let Ok(i) = token.parse::<i64>() {
            ParameterValue::Int(i)
        } else if let Ok(f) = token.parse::<f64>() {
            ParameterValue::Float(f)
        } else {
            ParameterValue::Categorical(token.to_string())
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Float(v) => write!(f, "{v}"),
            ParameterValue::Categorical(s) => f.write_str(s),
        }
    }
}

/// Ordered mapping from hyperparameter name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    params: Vec<(String, ParameterValue)>,
}

impl Combination {
    /// Empty combination; every family default applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value, keeping first-insertion order.
    pub fn with(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        let name = name.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Names and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return f.write_str("(defaults)");
        }
        let parts: Vec<String> = self.params.iter().map(|(n, v)| format!("{n}={v}")).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Ordered collection of combinations to evaluate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparamGrid {
    combinations: Vec<Combination>,
}

impl HyperparamGrid {
    /// Grid from explicit combinations, in the given order.
    pub fn new(combinations: Vec<Combination>) -> Self {
        Self { combinations }
    }

    /// Grid with one empty combination, for families without tuning.
    pub fn single() -> Self {
        Self::new(vec![Combination::new()])
    }

    /// Cartesian product of per-parameter value lists.
    ///
    /// The first axis varies slowest, so `[(a, [1, 2]), (b, [x, y])]` yields
    /// `a=1,b=x; a=1,b=y; a=2,b=x; a=2,b=y`.
    pub fn from_axes(axes: &[(String, Vec<ParameterValue>)]) -> Self {
        Self::new(cartesian_product(axes))
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Fail with [`EvalError::InvalidConfiguration`] on an empty grid.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(EvalError::invalid("hyperparameter grid has no combinations"));
        }
        Ok(())
    }
}

fn cartesian_product(axes: &[(String, Vec<ParameterValue>)]) -> Vec<Combination> {
    let Some(((name, values), rest)) = axes.split_first() else {
        return vec![Combination::new()];
    };
    let rest_combinations = cartesian_product(rest);

    values
        .iter()
        .flat_map(|v| {
            rest_combinations.iter().map(move |tail| {
                let mut combination = Combination::new().with(name.clone(), v.clone());
                for (n, value) in tail.iter() {
                    combination.insert(n, value.clone());
                }
                combination
            })
        })
        .collect()
}

impl FromStr for HyperparamGrid {
    type Err = EvalError;

    /// Parse `"neighbors=3,5,10;weight=uniform"` into the product grid.
    fn from_str(s: &str) -> Result<Self> {
        Ok(s.parse::<GridAxes>()?.to_grid())
    }
}

/// Named value lists whose product forms a grid, in declaration order.
///
/// Deserializes from a map (`neighbors: [3, 5, 10]`) keeping key order, and
/// parses from the CLI form `"neighbors=3,5,10;weight=uniform"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridAxes {
    axes: Vec<(String, Vec<ParameterValue>)>,
}

impl GridAxes {
    /// Append an axis; a repeated name or empty value list is rejected.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<ParameterValue>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(EvalError::invalid("grid axis has no name"));
        }
        if self.axes.iter().any(|(n, _)| *n == name) {
            return Err(EvalError::invalid(format!("grid axis '{name}' given twice")));
        }
        if values.is_empty() {
            return Err(EvalError::invalid(format!("grid axis '{name}' has no values")));
        }
        self.axes.push((name, values));
        Ok(())
    }

    pub fn axes(&self) -> &[(String, Vec<ParameterValue>)] {
        &self.axes
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Cartesian product of the axes.
    pub fn to_grid(&self) -> HyperparamGrid {
        HyperparamGrid::from_axes(&self.axes)
    }
}

impl FromStr for GridAxes {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let mut axes = GridAxes::default();
        for axis in s.split(';').map(str::trim).filter(|a| !a.is_empty()) {
            let (name, values) = axis.split_once('=').ok_or_else(|| {
                EvalError::invalid(format!("grid axis '{axis}' must look like name=v1,v2"))
            })?;
            let values = values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ParameterValue::parse_token)
                .collect();
            axes.push(name.trim(), values)?;
        }
        Ok(axes)
    }
}

impl Serialize for GridAxes {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.axes.len()))?;
        for (name, values) in &self.axes {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

struct AxesVisitor;

impl<'de> Visitor<'de> for AxesVisitor {
    type Value = GridAxes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from hyperparameter name to a list of values")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<GridAxes, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut axes = GridAxes::default();
        while let Some((name, values)) = access.next_entry::<String, Vec<ParameterValue>>()? {
            axes.push(name, values).map_err(de::Error::custom)?;
        }
        Ok(axes)
    }
}

impl<'de> Deserialize<'de> for GridAxes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(AxesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_axes_give_one_combination() {
        let grid = HyperparamGrid::from_axes(&[]);
        assert_eq!(grid.len(), 1);
        assert!(grid.combinations()[0].is_empty());
    }

    #[test]
    fn test_product_order() {
        let grid: HyperparamGrid = "min_n=2,5;tree_depth=4,8,16".parse().unwrap();
        assert_eq!(grid.len(), 6);
        let first = &grid.combinations()[0];
        assert_eq!(first.to_string(), "min_n=2, tree_depth=4");
        let second = &grid.combinations()[1];
        assert_eq!(second.get("tree_depth"), Some(&ParameterValue::Int(8)));
        assert_eq!(grid.combinations()[3].get("min_n"), Some(&ParameterValue::Int(5)));
    }

    #[test]
    fn test_parse_value_kinds() {
        assert_eq!(ParameterValue::parse_token("3"), ParameterValue::Int(3));
        assert_eq!(ParameterValue::parse_token("0.5"), ParameterValue::Float(0.5));
        assert_eq!(
            ParameterValue::parse_token("uniform"),
            ParameterValue::Categorical("uniform".into())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("neighbors".parse::<HyperparamGrid>().is_err());
        assert!("neighbors=".parse::<HyperparamGrid>().is_err());
        assert!("=3".parse::<HyperparamGrid>().is_err());
        assert!("k=1;k=2".parse::<HyperparamGrid>().is_err());
    }

    #[test]
    fn test_insert_replaces() {
        let mut c = Combination::new().with("neighbors", ParameterValue::Int(3));
        c.insert("neighbors", ParameterValue::Int(7));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("neighbors").and_then(ParameterValue::as_int), Some(7));
    }

    #[test]
    fn test_as_int_rejects_fractions() {
        assert_eq!(ParameterValue::Float(4.0).as_int(), Some(4));
        assert_eq!(ParameterValue::Float(4.5).as_int(), None);
    }

    #[test]
    fn test_ensure_not_empty() {
        assert!(HyperparamGrid::new(vec![]).ensure_not_empty().is_err());
        assert!(HyperparamGrid::single().ensure_not_empty().is_ok());
    }

    #[test]
    fn test_display_defaults() {
        assert_eq!(Combination::new().to_string(), "(defaults)");
    }

    #[test]
    fn test_axes_keep_declaration_order() {
        let axes: GridAxes = serde_yaml::from_str("tree_depth: [4, 8]\nmin_n: [2]\n").unwrap();
        let names: Vec<&str> = axes.axes().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["tree_depth", "min_n"]);
        assert_eq!(axes.to_grid().len(), 2);
    }

    #[test]
    fn test_axes_yaml_rejects_empty_values() {
        assert!(serde_yaml::from_str::<GridAxes>("neighbors: []\n").is_err());
    }

    #[test]
    fn test_json_shape() {
        let c = Combination::new().with("neighbors", ParameterValue::Int(5));
        assert_eq!(serde_json::to_string(&c).unwrap(), r#"[["neighbors",5]]"#);
    }
}
