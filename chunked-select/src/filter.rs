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

//! Converts boolean selection vectors into index arrays consumable by
//! [`take`](crate::take::take)

use std::sync::Arc;

use arrow_array::builder::PrimitiveBuilder;
use arrow_array::cast::AsArray;
use arrow_array::types::*;
use arrow_array::{Array, ArrayRef, BooleanArray, PrimitiveArray, RunArray};
use arrow_buffer::bit_iterator::BitSliceIterator;
use arrow_buffer::{bit_util, ArrowNativeType};
use arrow_schema::{ArrowError, DataType};

use crate::bit_block::{BinaryBitBlockCounter, BitBlockCounter};

/// How [`filter_to_indices`] treats null filter positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullSelection {
    /// Null filter positions produce no output position
    Drop,
    /// Null filter positions produce a null output position
    EmitNull,
}

/// Converts a boolean (or run-end encoded boolean) selection vector into an
/// array of the positions it selects
///
/// Output position order is ascending. For a boolean filter the output is
/// the narrowest unsigned type that can address the filter length:
/// [`UInt16Array`] up to [`u16::MAX`], [`UInt32Array`] up to [`u32::MAX`].
/// For a run-end encoded filter the output index type equals the run-end
/// type: a well-formed run-end encoded array already picked the smallest
/// run-end type addressing its logical length, so that choice is reused.
///
/// With [`NullSelection::Drop`] the output has no nulls; with
/// [`NullSelection::EmitNull`] every null filter position emits a null.
///
/// # Errors
/// * [`ArrowError::NotYetImplemented`] for boolean filters longer than
///   [`u32::MAX`]
/// * [`ArrowError::InvalidArgumentError`] for non-boolean filters
///
/// [`UInt16Array`]: arrow_array::UInt16Array
/// [`UInt32Array`]: arrow_array::UInt32Array
///
/// # Examples
/// ```
/// # use arrow_array::{BooleanArray, UInt16Array};
/// # use arrow_array::cast::AsArray;
/// # use arrow_array::types::UInt16Type;
/// # use chunked_select::filter::{filter_to_indices, NullSelection};
/// let filter = BooleanArray::from(vec![Some(true), Some(false), None, Some(true)]);
///
/// let indices = filter_to_indices(&filter, NullSelection::Drop).unwrap();
/// assert_eq!(
///     indices.as_primitive::<UInt16Type>(),
///     &UInt16Array::from(vec![0, 3])
/// );
///
/// let indices = filter_to_indices(&filter, NullSelection::EmitNull).unwrap();
/// assert_eq!(
///     indices.as_primitive::<UInt16Type>(),
///     &UInt16Array::from(vec![Some(0), None, Some(3)])
/// );
/// ```
pub fn filter_to_indices(
    filter: &dyn Array,
    null_selection: NullSelection,
) -> Result<ArrayRef, ArrowError> {
    match filter.data_type() {
        DataType::Boolean => {
            let filter = filter.as_boolean();
            if filter.len() <= u16::MAX as usize {
                Ok(Arc::new(boolean_to_indices::<UInt16Type>(
                    filter,
                    null_selection,
                )))
            } else if filter.len() <= u32::MAX as usize {
                Ok(Arc::new(boolean_to_indices::<UInt32Type>(
                    filter,
                    null_selection,
                )))
            } else {
                // Filters over 4 billion elements, not especially likely
                Err(ArrowError::NotYetImplemented(
                    "Filter length exceeds u32::MAX, consider a different strategy for selecting elements"
                        .to_string(),
                ))
            }
        }
        DataType::RunEndEncoded(run_ends, _) => match run_ends.data_type() {
            DataType::Int16 => Ok(Arc::new(ree_to_indices::<Int16Type>(
                filter.as_any().downcast_ref().unwrap(),
                null_selection,
            )?)),
            DataType::Int32 => Ok(Arc::new(ree_to_indices::<Int32Type>(
                filter.as_any().downcast_ref().unwrap(),
                null_selection,
            )?)),
            DataType::Int64 => Ok(Arc::new(ree_to_indices::<Int64Type>(
                filter.as_any().downcast_ref().unwrap(),
                null_selection,
            )?)),
            d => Err(ArrowError::InvalidArgumentError(format!(
                "Run ends must be Int16, Int32 or Int64, got {d}"
            ))),
        },
        d => Err(ArrowError::InvalidArgumentError(format!(
            "filter_to_indices requires a boolean or run-end encoded boolean filter, got {d}"
        ))),
    }
}

fn boolean_to_indices<T>(filter: &BooleanArray, null_selection: NullSelection) -> PrimitiveArray<T>
where
    T: ArrowPrimitiveType,
{
    let values = filter.values();
    let len = values.len();
    let nulls = filter.nulls().filter(|n| n.null_count() != 0);

    let filter_valid = match nulls {
        Some(filter_valid) => filter_valid,
        None => {
            // The filter has no nulls, so we need only look for true values
            let mut indices = Vec::new();
            for (start, end) in BitSliceIterator::new(values.values(), values.offset(), len) {
                indices.extend((start..end).map(T::Native::usize_as));
            }
            return PrimitiveArray::new(indices.into(), None);
        }
    };

    if null_selection == NullSelection::EmitNull {
        // Most complex case: the filter may have nulls and we don't drop
        // them. The logic is ternary:
        // - filter is null: emit null
        // - filter is valid and true: emit index
        // - filter is valid and false: don't emit anything
        let mut builder = PrimitiveBuilder::<T>::new();

        // Counts blocks where filter[i] || !filter_valid[i]
        let mut selected_or_null = BinaryBitBlockCounter::new(
            values.values(),
            values.offset(),
            filter_valid.validity(),
            filter_valid.offset(),
            len,
        );
        let mut is_valid =
            BitBlockCounter::new(filter_valid.validity(), filter_valid.offset(), len);
        let mut position = 0;
        while position < len {
            let block = selected_or_null.next_or_not_word();
            let valid_block = is_valid.next_word();
            if block.none_set() {
                position += block.len;
            } else if block.all_set() && valid_block.all_set() {
                // All the values are selected and non-null
                for _ in 0..block.len {
                    builder.append_value(T::Native::usize_as(position));
                    position += 1;
                }
            } else {
                // Some of the values are false or null
                for _ in 0..block.len {
                    if filter_valid.is_valid(position) {
                        if bit_util::get_bit(values.values(), values.offset() + position) {
                            builder.append_value(T::Native::usize_as(position));
                        }
                    } else {
                        builder.append_null();
                    }
                    position += 1;
                }
            }
        }
        return builder.finish();
    }

    // The filter may have nulls, so we scan the validity bitmap and the
    // filter data bitmap together
    let mut indices = Vec::new();
    let mut filter_counter = BinaryBitBlockCounter::new(
        values.values(),
        values.offset(),
        filter_valid.validity(),
        filter_valid.offset(),
        len,
    );
    let mut position = 0;
    while position < len {
        let block = filter_counter.next_and_word();
        if block.all_set() {
            // All the values are selected and non-null
            indices.extend((position..position + block.len).map(T::Native::usize_as));
            position += block.len;
        } else if !block.none_set() {
            // Some of the values are false or null
            for _ in 0..block.len {
                if filter_valid.is_valid(position)
                    && bit_util::get_bit(values.values(), values.offset() + position)
                {
                    indices.push(T::Native::usize_as(position));
                }
                position += 1;
            }
        } else {
            position += block.len;
        }
    }
    PrimitiveArray::new(indices.into(), None)
}

/// Walks the compressed runs directly: a well-formed run-end encoded bitmap
/// has no long homogeneous runs in its values array, so the block counters
/// buy nothing here
fn ree_to_indices<R>(
    filter: &RunArray<R>,
    null_selection: NullSelection,
) -> Result<PrimitiveArray<R>, ArrowError>
where
    R: RunEndIndexType,
{
    let values = filter.values().as_boolean_opt().ok_or_else(|| {
        ArrowError::InvalidArgumentError(format!(
            "filter_to_indices requires boolean run values, got {}",
            filter.values().data_type()
        ))
    })?;
    let run_ends = filter.run_ends();
    let offset = run_ends.offset();
    let len = run_ends.len();
    let ends = run_ends.values();

    let mut builder = PrimitiveBuilder::<R>::new();
    if len == 0 {
        return Ok(builder.finish());
    }

    let start_physical = filter.get_start_physical_index();
    let end_physical = filter.get_end_physical_index();
    let mut run_start = match start_physical {
        0 => 0,
        r => ends[r - 1].as_usize(),
    };
    for r in start_physical..=end_physical {
        let run_end = ends[r].as_usize();
        // Clip the run to the logical window of the (possibly sliced) filter
        let lo = run_start.max(offset) - offset;
        let hi = run_end.min(offset + len) - offset;
        run_start = run_end;

        if values.is_valid(r) {
            if values.value(r) {
                for position in lo..hi {
                    builder.append_value(R::Native::usize_as(position));
                }
            }
        } else if null_selection == NullSelection::EmitNull {
            for _ in lo..hi {
                builder.append_null();
            }
        }
    }
    Ok(builder.finish())
}
