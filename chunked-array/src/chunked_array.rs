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

//! An ordered sequence of same-type array chunks addressed as one column

use arrow_array::{new_empty_array, Array, ArrayRef};
use arrow_schema::{ArrowError, DataType};

/// An ordered concatenation of [`Array`] chunks sharing a logical type.
///
/// Logical row `r` lives in the chunk whose cumulative length range contains
/// `r`; chunk boundaries are otherwise invisible to readers. Chunks may be
/// empty, and an empty chunked array holds a single empty chunk so that
/// consumers always have a typed chunk to inspect.
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::Int32Array;
/// # use arrow_schema::DataType;
/// # use chunked_array::ChunkedArray;
/// let chunked = ChunkedArray::try_new(
///     vec![
///         Arc::new(Int32Array::from(vec![1, 2])),
///         Arc::new(Int32Array::from(vec![3])),
///     ],
///     DataType::Int32,
/// )
/// .unwrap();
/// assert_eq!(chunked.len(), 3);
/// assert_eq!(chunked.num_chunks(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct ChunkedArray {
    chunks: Vec<ArrayRef>,
    data_type: DataType,
    len: usize,
    null_count: usize,
}

impl ChunkedArray {
    /// Creates a [`ChunkedArray`] from `chunks`, all of which must have
    /// data type `data_type`
    ///
    /// # Errors
    /// Errors if any chunk has a different data type
    pub fn try_new(chunks: Vec<ArrayRef>, data_type: DataType) -> Result<Self, ArrowError> {
        for chunk in &chunks {
            if chunk.data_type() != &data_type {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "chunk has data type {} but the chunked array has data type {}",
                    chunk.data_type(),
                    data_type
                )));
            }
        }
        let len = chunks.iter().map(|c| c.len()).sum();
        let null_count = chunks.iter().map(|c| c.null_count()).sum();
        Ok(Self {
            chunks,
            data_type,
            len,
            null_count,
        })
    }

    /// Creates an empty [`ChunkedArray`] of `data_type` holding a single
    /// empty chunk
    pub fn new_empty(data_type: DataType) -> Self {
        let chunks = vec![new_empty_array(&data_type)];
        Self {
            chunks,
            data_type,
            len: 0,
            null_count: 0,
        }
    }

    /// Returns the total number of logical rows
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if this chunked array contains no rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the total number of null rows across all chunks
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Returns the number of chunks
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the chunk at index `i`
    ///
    /// # Panics
    /// Panics if `i` is out of bounds
    pub fn chunk(&self, i: usize) -> &ArrayRef {
        &self.chunks[i]
    }

    /// Returns the chunks of this chunked array
    pub fn chunks(&self) -> &[ArrayRef] {
        &self.chunks
    }

    /// Returns the data type shared by all chunks
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

impl From<ArrayRef> for ChunkedArray {
    fn from(array: ArrayRef) -> Self {
        let data_type = array.data_type().clone();
        let len = array.len();
        let null_count = array.null_count();
        Self {
            chunks: vec![array],
            data_type,
            len,
            null_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Int32Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn test_try_new() {
        let chunked = ChunkedArray::try_new(
            vec![
                Arc::new(Int32Array::from(vec![Some(1), None])),
                Arc::new(Int32Array::from(vec![3, 4, 5])),
            ],
            DataType::Int32,
        )
        .unwrap();
        assert_eq!(chunked.len(), 5);
        assert_eq!(chunked.num_chunks(), 2);
        assert_eq!(chunked.null_count(), 1);
        assert_eq!(chunked.data_type(), &DataType::Int32);
        assert_eq!(chunked.chunk(1).len(), 3);
    }

    #[test]
    fn test_try_new_type_mismatch() {
        let err = ChunkedArray::try_new(
            vec![
                Arc::new(Int32Array::from(vec![1])),
                Arc::new(StringArray::from(vec!["a"])),
            ],
            DataType::Int32,
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("chunk has data type Utf8 but the chunked array has data type Int32"));
    }

    #[test]
    fn test_new_empty() {
        let chunked = ChunkedArray::new_empty(DataType::Utf8);
        assert!(chunked.is_empty());
        assert_eq!(chunked.num_chunks(), 1);
        assert_eq!(chunked.chunk(0).len(), 0);
        assert_eq!(chunked.data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_from_array() {
        let chunked = ChunkedArray::from(Arc::new(Int32Array::from(vec![1, 2, 3])) as ArrayRef);
        assert_eq!(chunked.len(), 3);
        assert_eq!(chunked.num_chunks(), 1);
    }
}
