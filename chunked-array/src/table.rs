// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! A schema plus equal-length chunked columns

use crate::ChunkedArray;
use arrow_schema::{ArrowError, SchemaRef};

/// A collection of equal-length [`ChunkedArray`] columns conforming to a
/// schema; the chunked counterpart of [`RecordBatch`]
///
/// Columns may be chunked differently from one another, the table only
/// requires that their logical lengths agree.
///
/// [`RecordBatch`]: arrow_array::RecordBatch
#[derive(Clone, Debug)]
pub struct Table {
    schema: SchemaRef,
    columns: Vec<ChunkedArray>,
    num_rows: usize,
}

impl Table {
    /// Creates a [`Table`] from a schema and matching columns
    ///
    /// # Errors
    /// Errors if the column count, any column type, or any column length
    /// does not match the schema and the other columns
    pub fn try_new(schema: SchemaRef, columns: Vec<ChunkedArray>) -> Result<Self, ArrowError> {
        if schema.fields().len() != columns.len() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "number of columns ({}) must match number of fields ({}) in schema",
                columns.len(),
                schema.fields().len()
            )));
        }
        for (field, column) in schema.fields().iter().zip(&columns) {
            if field.data_type() != column.data_type() {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "column types must match schema types, expected {} but found {} at column index {}",
                    field.data_type(),
                    column.data_type(),
                    schema.index_of(field.name()).unwrap_or_default()
                )));
            }
        }
        let num_rows = columns.first().map(|c| c.len()).unwrap_or_default();
        for (i, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "all columns in a table must have the same length ({}), column {} has length {}",
                    num_rows,
                    i,
                    column.len()
                )));
            }
        }
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// Returns the schema of this table
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Returns the number of logical rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at index `i`
    ///
    /// # Panics
    /// Panics if `i` is out of bounds
    pub fn column(&self, i: usize) -> &ChunkedArray {
        &self.columns[i]
    }

    /// Returns the columns of this table
    pub fn columns(&self) -> &[ChunkedArray] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{ArrayRef, Int32Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn test_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]))
    }

    #[test]
    fn test_try_new() {
        let a = ChunkedArray::try_new(
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Int32Array::from(vec![3])),
            ],
            DataType::Int32,
        )
        .unwrap();
        let b = ChunkedArray::from(Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef);
        let table = Table::try_new(test_schema(), vec![a, b]).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.column(0).num_chunks(), 2);
    }

    #[test]
    fn test_try_new_length_mismatch() {
        let a = ChunkedArray::from(Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef);
        let b = ChunkedArray::from(Arc::new(StringArray::from(vec!["x"])) as ArrayRef);
        let err = Table::try_new(test_schema(), vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_try_new_type_mismatch() {
        let a = ChunkedArray::from(Arc::new(StringArray::from(vec!["x"])) as ArrayRef);
        let b = ChunkedArray::from(Arc::new(StringArray::from(vec!["y"])) as ArrayRef);
        let err = Table::try_new(test_schema(), vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("column types must match"));
    }
}
