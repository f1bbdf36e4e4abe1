//! Typed dataset container.
//!
//! A [`Container`] holds named datasets. Each [`Dataset`] is a row-major
//! N-dimensional [`RecordArray`] whose elements are records with named,
//! typed fields, plus an ordered set of [`Attributes`]. The container is
//! assembled in memory and persisted as a dataset bundle by [`bundle`].

pub mod bundle;

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Float32,
    Int8,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Float32 => f.write_str("f32"),
            FieldType::Int8 => f.write_str("i8"),
        }
    }
}

/// Flattened storage of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Float32(Vec<f32>),
    Int8(Vec<i8>),
}

impl FieldData {
    fn zeroed(field_type: FieldType, len: usize) -> Self {
        match field_type {
            FieldType::Float32 => FieldData::Float32(vec![0.0; len]),
            FieldType::Int8 => FieldData::Int8(vec![0; len]),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldData::Float32(_) => FieldType::Float32,
            FieldData::Int8(_) => FieldType::Int8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldData::Float32(values) => values.len(),
            FieldData::Int8(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named field of a record array
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data: FieldData,
}

/// Row-major N-dimensional array of records
#[derive(Debug, Clone, PartialEq)]
pub struct RecordArray {
    shape: Vec<usize>,
    fields: Vec<Field>,
}

impl RecordArray {
    /// Create a zero-filled array with the given shape and field layout
    pub fn zeroed(shape: Vec<usize>, layout: &[(String, FieldType)]) -> Self {
        let len = shape.iter().product();
        let fields = layout
            .iter()
            .map(|(name, field_type)| Field {
                name: name.clone(),
                data: FieldData::zeroed(*field_type, len),
            })
            .collect();
        Self { shape, fields }
    }

    /// Assemble an array from already-flattened fields
    pub fn from_fields(shape: Vec<usize>, fields: Vec<Field>) -> Result<Self> {
        let len: usize = shape.iter().product();
        for field in &fields {
            if field.data.len() != len {
                return Err(ConversionError::invalid_format(
                    &field.name,
                    format!(
                        "field holds {} elements but shape {:?} needs {}",
                        field.data.len(),
                        shape,
                        len
                    ),
                ));
            }
        }
        Ok(Self { shape, fields })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldData> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.data)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldData> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.data)
    }

    /// Flat offset of a multi-dimensional index, if in bounds
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        Some(offset)
    }

    pub fn get_f32(&self, field: &str, index: &[usize]) -> Option<f32> {
        let offset = self.offset(index)?;
        match self.field(field)? {
            FieldData::Float32(values) => values.get(offset).copied(),
            FieldData::Int8(_) => None,
        }
    }

    pub fn get_i8(&self, field: &str, index: &[usize]) -> Option<i8> {
        let offset = self.offset(index)?;
        match self.field(field)? {
            FieldData::Int8(values) => values.get(offset).copied(),
            FieldData::Float32(_) => None,
        }
    }
}

/// Value of a dataset attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Float(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Float(value) => write!(f, "{}", value),
            AttributeValue::Text(text) => write!(f, "\"{}\"", text),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Ordered dataset attributes; setting an existing key overwrites it in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Float(_) => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            AttributeValue::Float(value) => Some(*value),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named record array with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub data: RecordArray,
    pub attributes: Attributes,
}

/// Ordered collection of named datasets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    datasets: Vec<Dataset>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset; names are unique within a container
    pub fn create_dataset(&mut self, name: &str, data: RecordArray) -> Result<&mut Dataset> {
        if self.get(name).is_some() {
            return Err(ConversionError::DatasetExists {
                name: name.to_string(),
            });
        }
        self.datasets.push(Dataset {
            name: name.to_string(),
            data,
            attributes: Attributes::default(),
        });
        let last = self.datasets.len() - 1;
        Ok(&mut self.datasets[last])
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
