// src/normalize/year_table.rs
use anyhow::{ensure, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::{collections::BTreeSet, sync::Arc};

/// A table with one row per year and one nullable Float64 column per crime
/// category. The year index is nullable: rows whose year failed coercion are
/// kept, they just cannot be looked up by year.
#[derive(Debug, Clone)]
pub struct YearTable {
    years: Int64Array,
    batch: RecordBatch,
}

impl YearTable {
    pub fn new(years: Int64Array, batch: RecordBatch) -> Result<Self> {
        ensure!(
            years.len() == batch.num_rows(),
            "year index has {} entries but batch has {} rows",
            years.len(),
            batch.num_rows()
        );
        for field in batch.schema().fields() {
            ensure!(
                field.data_type() == &DataType::Float64,
                "column '{}' is {}, expected Float64",
                field.name(),
                field.data_type()
            );
        }
        Ok(Self { years, batch })
    }

    /// Assemble a table from a year index and named Float64 columns.
    pub fn from_columns(years: Int64Array, columns: Vec<(String, Float64Array)>) -> Result<Self> {
        let rows = years.len();
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, _)| Field::new(name, DataType::Float64, true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|(_, arr)| Arc::new(arr) as ArrayRef)
            .collect();
        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
            .context("building year table batch")?;
        Self::new(years, batch)
    }

    pub fn years(&self) -> &Int64Array {
        &self.years
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn categories(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column(&self, category: &str) -> Option<&Float64Array> {
        self.batch
            .column_by_name(category)
            .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
    }

    pub fn year_at(&self, row: usize) -> Option<i64> {
        (row < self.years.len() && self.years.is_valid(row)).then(|| self.years.value(row))
    }

    /// Row holding `year`, if any.
    pub fn row_of(&self, year: i64) -> Option<usize> {
        (0..self.years.len()).rev().find(|&i| self.year_at(i) == Some(year))
    }

    pub fn value(&self, year: i64, category: &str) -> Option<f64> {
        let row = self.row_of(year)?;
        let col = self.column(category)?;
        col.is_valid(row).then(|| col.value(row))
    }

    /// Distinct non-missing years, ascending.
    pub fn available_years(&self) -> Vec<i64> {
        self.years
            .iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
