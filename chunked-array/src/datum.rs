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

//! A variant over the columnar value shapes accepted by chunk-aware kernels

use crate::{ChunkedArray, Table};
use arrow_array::{ArrayRef, RecordBatch};

/// A columnar value of one of the four shapes chunk-aware kernels operate on
#[derive(Clone, Debug)]
pub enum Datum {
    /// A contiguous array
    Array(ArrayRef),
    /// A chunked array
    Chunked(ChunkedArray),
    /// A record batch of contiguous columns
    RecordBatch(RecordBatch),
    /// A table of chunked columns
    Table(Table),
}

impl Datum {
    /// Returns the number of logical rows
    pub fn len(&self) -> usize {
        match self {
            Datum::Array(array) => array.len(),
            Datum::Chunked(chunked) => chunked.len(),
            Datum::RecordBatch(batch) => batch.num_rows(),
            Datum::Table(table) => table.num_rows(),
        }
    }

    /// Returns true if this value contains no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the name of this shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Array(_) => "Array",
            Datum::Chunked(_) => "ChunkedArray",
            Datum::RecordBatch(_) => "RecordBatch",
            Datum::Table(_) => "Table",
        }
    }
}

impl From<ArrayRef> for Datum {
    fn from(array: ArrayRef) -> Self {
        Datum::Array(array)
    }
}

impl From<ChunkedArray> for Datum {
    fn from(chunked: ChunkedArray) -> Self {
        Datum::Chunked(chunked)
    }
}

impl From<RecordBatch> for Datum {
    fn from(batch: RecordBatch) -> Self {
        Datum::RecordBatch(batch)
    }
}

impl From<Table> for Datum {
    fn from(table: Table) -> Self {
        Datum::Table(table)
    }
}
