//! Tabular datasets, model formulas, and dense design matrices
//!
//! A [`Dataset`] is an ordered collection of records over a fixed set of
//! named numeric fields. Cells may be missing; a [`Formula`] names the
//! fields a model uses, and [`Dataset::design`] turns the records into the
//! dense `ndarray` form model families consume.

mod load;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, Result};

/// One row of a dataset; `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<Option<f64>>,
}

impl Record {
    /// Build a record from raw cell values.
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Value at a field position.
    pub fn get(&self, field: usize) -> Option<f64> {
        self.values.get(field).copied().flatten()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of records sharing one schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    fields: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset with the given field names.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields, records: Vec::new() }
    }

    /// Build a fully-observed dataset from numeric rows.
    pub fn from_rows(fields: &[&str], rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut dataset = Self::new(fields.iter().map(|f| (*f).to_string()).collect());
        for row in rows {
            dataset.push(Record::new(row.into_iter().map(Some).collect()))?;
        }
        Ok(dataset)
    }

    /// Append a record; its width must match the schema.
    pub fn push(&mut self, record: Record) -> Result<()> {
        if record.len() != self.fields.len() {
            return Err(EvalError::insufficient(format!(
                "record {} has {} values but the schema has {} fields",
                self.records.len(),
                record.len(),
                self.fields.len()
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// Field names in schema order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of a field in the schema.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// All records in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset holding the records at `indices`, in that order.
    ///
    /// Indices must be in range.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            fields: self.fields.clone(),
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    fn formula_columns(&self, formula: &Formula) -> Result<(Vec<usize>, usize)> {
        let lookup = |name: &str| {
            self.field_index(name).ok_or_else(|| {
                EvalError::insufficient(format!(
                    "field '{name}' required by formula '{formula}' is absent from the dataset"
                ))
            })
        };
        let predictors = formula
            .predictors
            .iter()
            .map(|p| lookup(p))
            .collect::<Result<Vec<_>>>()?;
        let target = lookup(&formula.target)?;
        Ok((predictors, target))
    }

    /// Drop records missing any field the formula uses.
    pub fn complete_cases(&self, formula: &Formula) -> Result<Self> {
        let (predictors, target) = self.formula_columns(formula)?;
        let records = self
            .records
            .iter()
            .filter(|r| r.get(target).is_some() && predictors.iter().all(|&c| r.get(c).is_some()))
            .cloned()
            .collect();
        Ok(Self { fields: self.fields.clone(), records })
    }

    /// Dense predictor matrix and target vector for `formula`.
    ///
    /// Fails with [`EvalError::InsufficientData`] on the first record that
    /// lacks a value for a formula field.
    pub fn design(&self, formula: &Formula) -> Result<Design> {
        let (predictors, target) = self.formula_columns(formula)?;
        let mut x = Array2::zeros((self.len(), predictors.len()));
        let mut y = Array1::zeros(self.len());

        for (i, record) in self.records.iter().enumerate() {
            let missing = |column: usize| {
                EvalError::insufficient(format!(
                    "record {i} has no value for field '{}'",
                    self.fields[column]
                ))
            };
            for (j, &column) in predictors.iter().enumerate() {
                x[[i, j]] = record.get(column).ok_or_else(|| missing(column))?;
            }
            y[i] = record.get(target).ok_or_else(|| missing(target))?;
        }

        Ok(Design { x, y, predictors: formula.predictors.clone() })
    }
}

/// Target field plus ordered predictor fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub target: String,
    pub predictors: Vec<String>,
}

impl Formula {
    /// Build a formula, rejecting empty or self-referencing predictor lists.
    pub fn new(target: impl Into<String>, predictors: Vec<String>) -> Result<Self> {
        let target = target.into();
        if target.is_empty() {
            return Err(EvalError::invalid("formula target is empty"));
        }
        if predictors.is_empty() {
            return Err(EvalError::invalid(format!("formula for '{target}' has no predictors")));
        }
        if predictors.contains(&target) {
            return Err(EvalError::invalid(format!(
                "target '{target}' also appears as a predictor"
            )));
        }
        for (i, p) in predictors.iter().enumerate() {
            if predictors[..i].contains(p) {
                return Err(EvalError::invalid(format!("predictor '{p}' listed twice")));
            }
        }
        Ok(Self { target, predictors })
    }
}

impl FromStr for Formula {
    type Err = EvalError;

    /// Parse `"target ~ a + b + c"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lhs, rhs) = s.split_once('~').ok_or_else(|| {
            EvalError::invalid(format!("formula '{s}' must look like 'y ~ a + b'"))
        })?;
        let predictors = rhs
            .split('+')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(lhs.trim(), predictors)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.target, self.predictors.join(" + "))
    }
}

/// Dense model input: one row per record, one column per predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub predictors: Vec<String>,
}

impl Design {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.y.len()
    }

    /// Number of predictor columns.
    pub fn n_predictors(&self) -> usize {
        self.x.ncols()
    }

    /// Predictor row `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.x.row(i)
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            predictors: self.predictors.clone(),
        }
    }
}
