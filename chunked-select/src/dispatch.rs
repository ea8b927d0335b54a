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

//! Extends the take kernel over chunked values, chunked indices, record
//! batches and tables

use arrow_array::cast::AsArray;
use arrow_array::types::ArrowPrimitiveType;
use arrow_array::{
    downcast_integer, make_array, new_empty_array, new_null_array, Array,
    PrimitiveArray, RecordBatch, RecordBatchOptions, UInt64Array,
};
use arrow_buffer::ArrowNativeType;
use arrow_data::ArrayData;
use arrow_data::transform::MutableArrayData;
use arrow_schema::ArrowError;
use arrow_select::concat::concat;
use chunked_array::{ChunkResolver, ChunkedArray, Datum, Table};

use crate::take::{take, TakeOptions};

/// Marks positions whose index is null in the per-index chunk assignment
const NULL_CHUNK: usize = usize::MAX;

/// Take rows by index from any supported combination of value and index
/// shapes
///
/// The supported combinations are contiguous or chunked indices against
/// contiguous, chunked, record-batch or table values; a record batch with
/// chunked indices is not supported. The output shape follows the inputs:
/// chunked values or indices produce a chunked (or table) output.
///
/// # Errors
/// [`ArrowError::NotYetImplemented`] for an unsupported shape combination,
/// otherwise as the shape-specific functions in this module.
pub fn take_datum(
    values: &Datum,
    indices: &Datum,
    options: Option<TakeOptions>,
) -> Result<Datum, ArrowError> {
    match (values, indices) {
        (Datum::Array(values), Datum::Array(indices)) => Ok(Datum::Array(take(
            values.as_ref(),
            indices.as_ref(),
            options,
        )?)),
        (Datum::Array(values), Datum::Chunked(indices)) => Ok(Datum::Chunked(
            take_array_chunked(values.as_ref(), indices, options)?,
        )),
        (Datum::Chunked(values), Datum::Array(indices)) => Ok(Datum::Chunked(take_chunked(
            values,
            indices.as_ref(),
            options,
        )?)),
        (Datum::Chunked(values), Datum::Chunked(indices)) => Ok(Datum::Chunked(
            take_chunked_chunked(values, indices, options)?,
        )),
        (Datum::RecordBatch(values), Datum::Array(indices)) => Ok(Datum::RecordBatch(
            take_record_batch(values, indices.as_ref(), options)?,
        )),
        (Datum::Table(values), Datum::Array(indices)) => Ok(Datum::Table(take_table(
            values,
            indices.as_ref(),
            options,
        )?)),
        (Datum::Table(values), Datum::Chunked(indices)) => Ok(Datum::Table(
            take_table_chunked(values, indices, options)?,
        )),
        (values, indices) => Err(ArrowError::NotYetImplemented(format!(
            "Unsupported types for take operation: values={}, indices={}",
            values.kind(),
            indices.kind()
        ))),
    }
}

/// Take rows of a [`ChunkedArray`] by a contiguous array of indices
///
/// Each index addresses the chunked values as one logical sequence. Indices
/// are resolved to their chunk once, grouped so each touched chunk is
/// gathered exactly once, and the gathered pieces are reassembled in the
/// input index order. The result holds a single chunk.
///
/// # Errors
/// An index beyond the logical length reports
/// [`ArrowError::ComputeError`] regardless of
/// [`TakeOptions::check_bounds`]: chunk resolution has to account for every
/// index anyway.
pub fn take_chunked(
    values: &ChunkedArray,
    indices: &dyn Array,
    options: Option<TakeOptions>,
) -> Result<ChunkedArray, ArrowError> {
    macro_rules! index_helper {
        ($t:ty, $values:expr, $indices:expr, $options:expr) => {
            take_chunked_impl($values, $indices.as_primitive::<$t>(), $options)
        };
    }
    downcast_integer! {
        indices.data_type() => (index_helper, values, indices, options),
        t => Err(ArrowError::InvalidArgumentError(format!(
            "Take only supports integer indices, got {t}"
        )))
    }
}

fn take_chunked_impl<I: ArrowPrimitiveType>(
    values: &ChunkedArray,
    indices: &PrimitiveArray<I>,
    options: Option<TakeOptions>,
) -> Result<ChunkedArray, ArrowError> {
    let num_chunks = values.num_chunks();
    if indices.is_empty() {
        // No indices were provided, nothing to take
        return Ok(ChunkedArray::new_empty(values.data_type().clone()));
    }
    if num_chunks < 2 {
        let chunk = match values.chunks().first() {
            Some(chunk) => chunk.clone(),
            None => new_empty_array(values.data_type()),
        };
        let taken = take(chunk.as_ref(), indices, options)?;
        return ChunkedArray::try_new(vec![taken], values.data_type().clone());
    }

    // Resolve every index to its chunk. The indices are not necessarily
    // sorted, so chunks cannot simply be sliced in order.
    let resolver = ChunkResolver::new(values.chunks());
    let mut in_chunk_offsets: Vec<Vec<u64>> = vec![Vec::new(); num_chunks];
    let mut chunk_of: Vec<usize> = Vec::with_capacity(indices.len());
    for position in 0..indices.len() {
        if indices.is_null(position) {
            // A null index produces a null output row; its payload is
            // unspecified and must not be resolved
            chunk_of.push(NULL_CHUNK);
            continue;
        }
        let index = indices.value(position).as_usize();
        let location = resolver.resolve(index);
        if location.chunk_index >= num_chunks {
            return Err(ArrowError::ComputeError(format!(
                "Array index out of bounds, cannot get item at index {} from {} entries",
                index,
                values.len()
            )));
        }
        in_chunk_offsets[location.chunk_index].push(location.index_in_chunk as u64);
        chunk_of.push(location.chunk_index);
    }

    // One gather per chunk that any index resolved to. The resolved offsets
    // are in range by construction, so the per-chunk gathers skip the
    // bounds pass.
    let unchecked = Some(TakeOptions {
        check_bounds: false,
    });
    let mut gathered: Vec<Option<ArrayData>> = vec![None; num_chunks];
    for (chunk_index, offsets) in in_chunk_offsets.into_iter().enumerate() {
        if offsets.is_empty() {
            continue;
        }
        let offsets = UInt64Array::from(offsets);
        let taken = take(values.chunk(chunk_index).as_ref(), &offsets, unchecked.clone())?;
        gathered[chunk_index] = Some(taken.into_data());
    }

    let sources: Vec<&ArrayData> = gathered.iter().flatten().collect();
    if sources.is_empty() {
        // Every index was null
        let array = new_null_array(values.data_type(), indices.len());
        return ChunkedArray::try_new(vec![array], values.data_type().clone());
    }
    let mut source_of_chunk = vec![usize::MAX; num_chunks];
    let mut next_source = 0;
    for (chunk_index, gathered) in gathered.iter().enumerate() {
        if gathered.is_some() {
            source_of_chunk[chunk_index] = next_source;
            next_source += 1;
        }
    }

    // Reassemble in input order: one slice append per run of equal source
    // chunks, advancing a cursor per chunk
    let has_null_indices = indices.null_count() > 0;
    let mut mutable = MutableArrayData::new(sources, has_null_indices, indices.len());
    let mut cursors = vec![0; num_chunks];
    let mut position = 0;
    while position < chunk_of.len() {
        let chunk_index = chunk_of[position];
        let mut run = 1;
        while position + run < chunk_of.len() && chunk_of[position + run] == chunk_index {
            run += 1;
        }
        if chunk_index == NULL_CHUNK {
            mutable.extend_nulls(run);
        } else {
            let cursor = cursors[chunk_index];
            mutable.extend(source_of_chunk[chunk_index], cursor, cursor + run);
            cursors[chunk_index] = cursor + run;
        }
        position += run;
    }

    let array = make_array(mutable.freeze());
    ChunkedArray::try_new(vec![array], values.data_type().clone())
}

/// Take rows of a contiguous array by a [`ChunkedArray`] of indices
///
/// Issues one gather per index chunk; the result is chunked like the
/// indices.
pub fn take_array_chunked(
    values: &dyn Array,
    indices: &ChunkedArray,
    options: Option<TakeOptions>,
) -> Result<ChunkedArray, ArrowError> {
    let mut chunks = Vec::with_capacity(indices.num_chunks());
    for index_chunk in indices.chunks() {
        chunks.push(take(values, index_chunk.as_ref(), options.clone())?);
    }
    ChunkedArray::try_new(chunks, values.data_type().clone())
}

/// Take rows of a [`ChunkedArray`] by a [`ChunkedArray`] of indices
///
/// Applies [`take_chunked`] per index chunk and concatenates each result
/// into a single contiguous chunk, so the output is chunked like the
/// indices.
pub fn take_chunked_chunked(
    values: &ChunkedArray,
    indices: &ChunkedArray,
    options: Option<TakeOptions>,
) -> Result<ChunkedArray, ArrowError> {
    let mut chunks = Vec::with_capacity(indices.num_chunks());
    for index_chunk in indices.chunks() {
        let taken = take_chunked(values, index_chunk.as_ref(), options.clone())?;
        let pieces: Vec<&dyn Array> = taken.chunks().iter().map(|c| c.as_ref()).collect();
        chunks.push(concat(&pieces)?);
    }
    ChunkedArray::try_new(chunks, values.data_type().clone())
}

/// Take rows of a [`RecordBatch`] by a contiguous array of indices,
/// column by column
pub fn take_record_batch(
    batch: &RecordBatch,
    indices: &dyn Array,
    options: Option<TakeOptions>,
) -> Result<RecordBatch, ArrowError> {
    let columns = batch
        .columns()
        .iter()
        .map(|column| take(column.as_ref(), indices, options.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    RecordBatch::try_new_with_options(
        batch.schema(),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(indices.len())),
    )
}

/// Take rows of a [`Table`] by a contiguous array of indices, column by
/// column
pub fn take_table(
    table: &Table,
    indices: &dyn Array,
    options: Option<TakeOptions>,
) -> Result<Table, ArrowError> {
    let columns = table
        .columns()
        .iter()
        .map(|column| take_chunked(column, indices, options.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    Table::try_new(table.schema(), columns)
}

/// Take rows of a [`Table`] by a [`ChunkedArray`] of indices, column by
/// column
pub fn take_table_chunked(
    table: &Table,
    indices: &ChunkedArray,
    options: Option<TakeOptions>,
) -> Result<Table, ArrowError> {
    let columns = table
        .columns()
        .iter()
        .map(|column| take_chunked_chunked(column, indices, options.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    Table::try_new(table.schema(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::ArrayRef;
    use arrow_array::types::Int32Type;
    use arrow_array::{Int32Array, StringArray, UInt32Array};
    use arrow_schema::{DataType, Field, Schema};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn chunked_i32(chunks: &[&[Option<i32>]]) -> ChunkedArray {
        let chunks = chunks
            .iter()
            .map(|chunk| Arc::new(Int32Array::from(chunk.to_vec())) as ArrayRef)
            .collect();
        ChunkedArray::try_new(chunks, DataType::Int32).unwrap()
    }

    fn flatten(chunked: &ChunkedArray) -> ArrayRef {
        let pieces: Vec<&dyn Array> = chunked.chunks().iter().map(|c| c.as_ref()).collect();
        concat(&pieces).unwrap()
    }

    #[test]
    fn test_take_chunked() {
        // chunks [1, 2], [3, 4, 5], [6] taken at [5, 0, 3, 2]
        let values = chunked_i32(&[
            &[Some(1), Some(2)],
            &[Some(3), Some(4), Some(5)],
            &[Some(6)],
        ]);
        let indices = UInt32Array::from(vec![5, 0, 3, 2]);
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert_eq!(taken.num_chunks(), 1);
        assert_eq!(
            flatten(&taken).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![6, 1, 4, 3])
        );
    }

    #[test]
    fn test_take_chunked_empty_indices() {
        let values = chunked_i32(&[&[Some(1)], &[Some(2)]]);
        let indices = UInt32Array::from(Vec::<u32>::new());
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert!(taken.is_empty());
        assert_eq!(taken.data_type(), &DataType::Int32);
    }

    #[test]
    fn test_take_chunked_single_chunk() {
        let values = chunked_i32(&[&[Some(1), None, Some(3)]]);
        let indices = UInt32Array::from(vec![2, 1, 0]);
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert_eq!(taken.num_chunks(), 1);
        assert_eq!(
            flatten(&taken).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![Some(3), None, Some(1)])
        );
    }

    #[test]
    fn test_take_chunked_no_chunks() {
        let values = ChunkedArray::try_new(vec![], DataType::Int32).unwrap();
        let indices = UInt32Array::from(Vec::<u32>::new());
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert!(taken.is_empty());

        let indices = UInt32Array::from(vec![0]);
        let err = take_chunked(&values, &indices, None).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_take_chunked_null_indices() {
        let values = chunked_i32(&[&[Some(1), Some(2)], &[None, Some(4)]]);
        let indices = UInt32Array::from(vec![Some(3), None, Some(0), Some(2), None]);
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert_eq!(
            flatten(&taken).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![Some(4), None, Some(1), None, None])
        );
    }

    #[test]
    fn test_take_chunked_all_null_indices() {
        let values = chunked_i32(&[&[Some(1)], &[Some(2)]]);
        let indices = UInt32Array::from(vec![None, None, None]);
        let taken = take_chunked(&values, &indices, None).unwrap();
        assert_eq!(taken.len(), 3);
        assert_eq!(taken.null_count(), 3);
        assert_eq!(taken.data_type(), &DataType::Int32);
    }

    #[test]
    fn test_take_chunked_out_of_bounds() {
        let values = chunked_i32(&[&[Some(1), Some(2)], &[Some(3)]]);
        let indices = UInt32Array::from(vec![3]);
        let err = take_chunked(&values, &indices, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Compute error: Array index out of bounds, cannot get item at index 3 from 3 entries"
        );

        // resolver overflow is reported even with the bounds pass disabled
        let err = take_chunked(
            &values,
            &indices,
            Some(TakeOptions {
                check_bounds: false,
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_take_chunked_strings() {
        let chunks = vec![
            Arc::new(StringArray::from(vec![Some("a"), None])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("ccc"), Some("dd")])) as ArrayRef,
        ];
        let values = ChunkedArray::try_new(chunks, DataType::Utf8).unwrap();
        let indices = UInt32Array::from(vec![Some(3), Some(1), None, Some(0), Some(3)]);
        let taken = take_chunked(&values, &indices, None).unwrap();
        let expected =
            StringArray::from(vec![Some("dd"), None, None, Some("a"), Some("dd")]);
        assert_eq!(flatten(&taken).as_string::<i32>(), &expected);
    }

    #[test]
    fn test_take_chunked_equivalence_random() {
        // Any chunking of the same logical content takes identically
        let mut rng = StdRng::seed_from_u64(42);
        let data: Vec<Option<i32>> = (0..40)
            .map(|i| rng.random_bool(0.8).then_some(i))
            .collect();
        let contiguous = Int32Array::from(data.clone());
        let values = chunked_i32(&[&data[..7], &data[7..7], &data[7..20], &data[20..]]);

        let indices: UInt32Array = (0..100)
            .map(|_| {
                rng.random_bool(0.9)
                    .then(|| rng.random_range(0..40u32))
            })
            .collect();

        let taken = take_chunked(&values, &indices, None).unwrap();
        let expected = take(&contiguous, &indices, None).unwrap();
        assert_eq!(&flatten(&taken), &expected);
    }

    #[test]
    fn test_take_array_chunked() {
        let values = Int32Array::from(vec![Some(10), None, Some(30)]);
        let indices = ChunkedArray::try_new(
            vec![
                Arc::new(UInt32Array::from(vec![2, 0])) as ArrayRef,
                Arc::new(UInt32Array::from(vec![Some(1), None])) as ArrayRef,
            ],
            DataType::UInt32,
        )
        .unwrap();
        let taken = take_array_chunked(&values, &indices, None).unwrap();
        assert_eq!(taken.num_chunks(), 2);
        assert_eq!(
            flatten(&taken).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![Some(30), Some(10), None, None])
        );
    }

    #[test]
    fn test_take_chunked_chunked() {
        let values = chunked_i32(&[&[Some(1), Some(2)], &[Some(3), Some(4), Some(5)]]);
        let indices = ChunkedArray::try_new(
            vec![
                Arc::new(UInt32Array::from(vec![4, 0])) as ArrayRef,
                Arc::new(UInt32Array::from(vec![2])) as ArrayRef,
            ],
            DataType::UInt32,
        )
        .unwrap();
        let taken = take_chunked_chunked(&values, &indices, None).unwrap();
        // chunked like the indices, each chunk contiguous
        assert_eq!(taken.num_chunks(), 2);
        assert_eq!(taken.chunk(0).len(), 2);
        assert_eq!(taken.chunk(1).len(), 1);
        assert_eq!(
            flatten(&taken).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![5, 1, 3])
        );
    }

    #[test]
    fn test_take_record_batch() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![Some(1), None, Some(3)])),
                Arc::new(StringArray::from(vec!["x", "y", "z"])),
            ],
        )
        .unwrap();
        let indices = UInt32Array::from(vec![2, 0]);
        let taken = take_record_batch(&batch, &indices, None).unwrap();
        assert_eq!(taken.num_rows(), 2);
        assert_eq!(
            taken.column(0).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![Some(3), Some(1)])
        );
        assert_eq!(
            taken.column(1).as_string::<i32>(),
            &StringArray::from(vec!["z", "x"])
        );
    }

    #[test]
    fn test_take_table() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Utf8, true),
        ]));
        let a = chunked_i32(&[&[Some(1), Some(2)], &[Some(3)]]);
        let b = ChunkedArray::from(
            Arc::new(StringArray::from(vec!["x", "y", "z"])) as ArrayRef
        );
        let table = Table::try_new(schema, vec![a, b]).unwrap();

        let indices = UInt32Array::from(vec![2, 0, 1]);
        let taken = take_table(&table, &indices, None).unwrap();
        assert_eq!(taken.num_rows(), 3);
        assert_eq!(
            flatten(taken.column(0)).as_primitive::<Int32Type>(),
            &Int32Array::from(vec![3, 1, 2])
        );
        assert_eq!(
            flatten(taken.column(1)).as_string::<i32>(),
            &StringArray::from(vec!["z", "x", "y"])
        );
    }

    #[test]
    fn test_take_datum_shapes() {
        let array = Arc::new(Int32Array::from(vec![10, 20, 30])) as ArrayRef;
        let chunked = chunked_i32(&[&[Some(10)], &[Some(20), Some(30)]]);
        let indices = Arc::new(UInt32Array::from(vec![2, 0])) as ArrayRef;
        let chunked_indices = ChunkedArray::from(indices.clone());

        let taken = take_datum(&Datum::Array(array.clone()), &Datum::Array(indices.clone()), None)
            .unwrap();
        assert!(matches!(taken, Datum::Array(_)));
        assert_eq!(taken.len(), 2);

        let taken = take_datum(
            &Datum::Chunked(chunked.clone()),
            &Datum::Array(indices.clone()),
            None,
        )
        .unwrap();
        assert!(matches!(taken, Datum::Chunked(_)));

        let taken = take_datum(
            &Datum::Array(array.clone()),
            &Datum::Chunked(chunked_indices.clone()),
            None,
        )
        .unwrap();
        assert!(matches!(taken, Datum::Chunked(_)));

        let taken = take_datum(
            &Datum::Chunked(chunked),
            &Datum::Chunked(chunked_indices.clone()),
            None,
        )
        .unwrap();
        assert!(matches!(taken, Datum::Chunked(_)));

        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, true)]));
        let batch = RecordBatch::try_new(schema, vec![array]).unwrap();
        let err = take_datum(
            &Datum::RecordBatch(batch),
            &Datum::Chunked(chunked_indices),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not yet implemented: Unsupported types for take operation: values=RecordBatch, indices=ChunkedArray"
        );
    }
}
