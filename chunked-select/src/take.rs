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

//! Defines the take kernel for contiguous [`Array`]s

use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::*;
use arrow_array::*;
use arrow_buffer::{
    bit_util, ArrowNativeType, BooleanBufferBuilder, MutableBuffer, NullBuffer,
    NullBufferBuilder, OffsetBuffer,
};
use arrow_schema::{ArrowError, DataType};
use num::ToPrimitive;

use crate::bit_block::OptionalBitBlockCounter;

/// Options that define how `take` should behave
#[derive(Clone, Debug)]
pub struct TakeOptions {
    /// Verify that every valid index is in bounds for the values before
    /// gathering. If an index is out of bounds an [`ArrowError`] is
    /// returned; with the check disabled an out-of-bounds index panics.
    pub check_bounds: bool,
}

impl Default for TakeOptions {
    fn default() -> Self {
        Self { check_bounds: true }
    }
}

/// Take elements by index from [`Array`], creating a new [`Array`] from
/// those indexes
///
/// The output has one element per index: position `p` holds
/// `values[indices[p]]`, or null when either `indices[p]` or the addressed
/// value is null. Value bytes of null output slots are zeroed.
///
/// Indices may be any integer type and are interpreted as unsigned once the
/// bounds pass has rejected negative values.
///
/// # Errors
/// * [`ArrowError::InvalidArgumentError`] if `indices` is not an integer
///   array
/// * [`ArrowError::ComputeError`] if bounds checking is enabled and a valid
///   index is negative or not in `[0, values.len())`
/// * [`ArrowError::NotYetImplemented`] for unsupported value layouts
///
/// # Examples
/// ```
/// # use arrow_array::{StringArray, UInt32Array};
/// # use chunked_select::take::take;
/// let values = StringArray::from(vec!["zero", "one", "two"]);
///
/// let indices = UInt32Array::from(vec![2, 1]);
/// let taken = take(&values, &indices, None).unwrap();
/// let taken = taken.as_any().downcast_ref::<StringArray>().unwrap();
///
/// assert_eq!(*taken, StringArray::from(vec!["two", "one"]));
/// ```
pub fn take(
    values: &dyn Array,
    indices: &dyn Array,
    options: Option<TakeOptions>,
) -> Result<ArrayRef, ArrowError> {
    macro_rules! index_helper {
        ($t:ty, $values:expr, $indices:expr, $options:expr) => {
            take_impl($values, $indices.as_primitive::<$t>(), $options)
        };
    }
    downcast_integer! {
        indices.data_type() => (index_helper, values, indices, options),
        t => Err(ArrowError::InvalidArgumentError(format!(
            "Take only supports integer indices, got {t}"
        )))
    }
}

fn take_impl<I>(
    values: &dyn Array,
    indices: &PrimitiveArray<I>,
    options: Option<TakeOptions>,
) -> Result<ArrayRef, ArrowError>
where
    I: ArrowPrimitiveType,
    I::Native: ToPrimitive,
{
    let options = options.unwrap_or_default();
    if options.check_bounds {
        check_bounds(values.len(), indices)?;
    }

    let data_type = values.data_type();
    downcast_primitive_array! {
        values => Ok(Arc::new(
            take_primitive(values, indices)?.with_data_type(data_type.clone()),
        )),
        DataType::Boolean => {
            Ok(Arc::new(take_boolean(values.as_boolean(), indices)?))
        }
        DataType::Utf8 => Ok(Arc::new(take_bytes(values.as_string::<i32>(), indices)?)),
        DataType::LargeUtf8 => Ok(Arc::new(take_bytes(values.as_string::<i64>(), indices)?)),
        DataType::Binary => Ok(Arc::new(take_bytes(values.as_binary::<i32>(), indices)?)),
        DataType::LargeBinary => Ok(Arc::new(take_bytes(values.as_binary::<i64>(), indices)?)),
        DataType::Dictionary(_, _) => downcast_dictionary_array! {
            values => Ok(Arc::new(take_dict(values, indices)?)),
            t => Err(ArrowError::NotYetImplemented(format!(
                "Take not supported for dictionary type {t}"
            )))
        }
        DataType::Null => {
            // Take applied to a null array produces a null array; reuse a
            // slice of the input when it is long enough
            if values.len() >= indices.len() {
                Ok(values.slice(0, indices.len()))
            } else {
                Ok(new_null_array(&DataType::Null, indices.len()))
            }
        }
        t => Err(ArrowError::NotYetImplemented(format!(
            "Take not supported for data type {t}"
        )))
    }
}

/// Verifies that every valid index is in `[0, len)`
///
/// Signed index types may not be negative: `to_usize` fails on negative
/// values before the range comparison runs.
fn check_bounds<I>(len: usize, indices: &PrimitiveArray<I>) -> Result<(), ArrowError>
where
    I: ArrowPrimitiveType,
    I::Native: ToPrimitive,
{
    let check = |index: I::Native| {
        let ix = index
            .to_usize()
            .ok_or_else(|| ArrowError::ComputeError("Cast to usize failed".to_string()))?;
        if ix >= len {
            return Err(ArrowError::ComputeError(format!(
                "Array index out of bounds, cannot get item at index {ix} from {len} entries"
            )));
        }
        Ok(())
    };
    if indices.null_count() > 0 {
        indices.iter().flatten().try_for_each(check)
    } else {
        indices.values().iter().copied().try_for_each(check)
    }
}

/// `take` implementation for all fixed-width primitive arrays
///
/// Scans the indices' validity one block at a time and keeps a running
/// valid count so the output null count needs no popcount pass. The output
/// value buffer is zero-initialized, so null slots hold zeroed payloads
/// without per-slot writes.
fn take_primitive<T, I>(
    values: &PrimitiveArray<T>,
    indices: &PrimitiveArray<I>,
) -> Result<PrimitiveArray<T>, ArrowError>
where
    T: ArrowPrimitiveType,
    I: ArrowPrimitiveType,
{
    let len = indices.len();
    let values_nulls = values.nulls().filter(|n| n.null_count() != 0);
    let indices_nulls = indices.nulls().filter(|n| n.null_count() != 0);
    let values_data = values.values();
    let indices_data = indices.values();

    let mut out = vec![T::Native::default(); len];
    let mut out_is_valid = (values_nulls.is_some() || indices_nulls.is_some())
        .then(|| BooleanBufferBuilder::new(len));

    let mut indices_blocks = OptionalBitBlockCounter::from_nulls(indices_nulls, len);
    let mut position = 0;
    let mut valid_count = 0;
    while position < len {
        let block = indices_blocks.next_block();
        match values_nulls {
            None => {
                // Values are never null, so things are easier
                valid_count += block.popcount;
                if block.all_set() {
                    // Fastest path: neither values nor index nulls
                    if let Some(builder) = out_is_valid.as_mut() {
                        builder.append_n(block.len, true);
                    }
                    for _ in 0..block.len {
                        out[position] = values_data[indices_data[position].as_usize()];
                        position += 1;
                    }
                } else if !block.none_set() {
                    // Slow path: some but not all indices are null
                    let indices_valid = indices_nulls.unwrap();
                    let builder = out_is_valid.as_mut().unwrap();
                    for _ in 0..block.len {
                        if indices_valid.is_valid(position) {
                            builder.append(true);
                            out[position] = values_data[indices_data[position].as_usize()];
                        } else {
                            builder.append(false);
                        }
                        position += 1;
                    }
                } else {
                    if let Some(builder) = out_is_valid.as_mut() {
                        builder.append_n(block.len, false);
                    }
                    position += block.len;
                }
            }
            Some(values_valid) => {
                // Values have nulls, so we must do random access into the
                // values validity
                let builder = out_is_valid.as_mut().unwrap();
                if block.all_set() {
                    // Faster path: indices are not null but values may be
                    for _ in 0..block.len {
                        let index = indices_data[position].as_usize();
                        if values_valid.is_valid(index) {
                            builder.append(true);
                            out[position] = values_data[index];
                            valid_count += 1;
                        } else {
                            builder.append(false);
                        }
                        position += 1;
                    }
                } else if !block.none_set() {
                    let indices_valid = indices_nulls.unwrap();
                    for _ in 0..block.len {
                        let mut valid = false;
                        if indices_valid.is_valid(position) {
                            let index = indices_data[position].as_usize();
                            if values_valid.is_valid(index) {
                                out[position] = values_data[index];
                                valid = true;
                            }
                        }
                        builder.append(valid);
                        valid_count += valid as usize;
                        position += 1;
                    }
                } else {
                    builder.append_n(block.len, false);
                    position += block.len;
                }
            }
        }
    }

    let nulls = match out_is_valid {
        Some(mut builder) if valid_count < len => {
            // Soundness: the builder holds `len` bits of which exactly
            // `valid_count` are set, as counted above
            Some(unsafe { NullBuffer::new_unchecked(builder.finish(), len - valid_count) })
        }
        // Only non-null values were taken
        _ => None,
    };
    Ok(PrimitiveArray::new(out.into(), nulls))
}

/// `take` implementation for boolean arrays
///
/// Same block structure as [`take_primitive`], but the payload is a single
/// bit placed per position; null slots keep the destination bit clear.
fn take_boolean<I>(
    values: &BooleanArray,
    indices: &PrimitiveArray<I>,
) -> Result<BooleanArray, ArrowError>
where
    I: ArrowPrimitiveType,
{
    let len = indices.len();
    let values_nulls = values.nulls().filter(|n| n.null_count() != 0);
    let indices_nulls = indices.nulls().filter(|n| n.null_count() != 0);
    let values_bits = values.values().values();
    let values_offset = values.values().offset();
    let indices_data = indices.values();

    let mut out = BooleanBufferBuilder::new(len);
    let mut out_is_valid = (values_nulls.is_some() || indices_nulls.is_some())
        .then(|| BooleanBufferBuilder::new(len));

    let mut indices_blocks = OptionalBitBlockCounter::from_nulls(indices_nulls, len);
    let mut position = 0;
    let mut valid_count = 0;
    while position < len {
        let block = indices_blocks.next_block();
        match values_nulls {
            None => {
                valid_count += block.popcount;
                if block.all_set() {
                    if let Some(builder) = out_is_valid.as_mut() {
                        builder.append_n(block.len, true);
                    }
                    for _ in 0..block.len {
                        let index = indices_data[position].as_usize();
                        out.append(bit_util::get_bit(values_bits, values_offset + index));
                        position += 1;
                    }
                } else if !block.none_set() {
                    let indices_valid = indices_nulls.unwrap();
                    let builder = out_is_valid.as_mut().unwrap();
                    for _ in 0..block.len {
                        if indices_valid.is_valid(position) {
                            let index = indices_data[position].as_usize();
                            builder.append(true);
                            out.append(bit_util::get_bit(values_bits, values_offset + index));
                        } else {
                            builder.append(false);
                            out.append(false);
                        }
                        position += 1;
                    }
                } else {
                    if let Some(builder) = out_is_valid.as_mut() {
                        builder.append_n(block.len, false);
                    }
                    out.append_n(block.len, false);
                    position += block.len;
                }
            }
            Some(values_valid) => {
                let builder = out_is_valid.as_mut().unwrap();
                if block.all_set() {
                    for _ in 0..block.len {
                        let index = indices_data[position].as_usize();
                        if values_valid.is_valid(index) {
                            builder.append(true);
                            out.append(bit_util::get_bit(values_bits, values_offset + index));
                            valid_count += 1;
                        } else {
                            builder.append(false);
                            out.append(false);
                        }
                        position += 1;
                    }
                } else if !block.none_set() {
                    let indices_valid = indices_nulls.unwrap();
                    for _ in 0..block.len {
                        let mut valid = false;
                        if indices_valid.is_valid(position) {
                            let index = indices_data[position].as_usize();
                            if values_valid.is_valid(index) {
                                out.append(bit_util::get_bit(values_bits, values_offset + index));
                                valid = true;
                            }
                        }
                        if !valid {
                            out.append(false);
                        }
                        builder.append(valid);
                        valid_count += valid as usize;
                        position += 1;
                    }
                } else {
                    builder.append_n(block.len, false);
                    out.append_n(block.len, false);
                    position += block.len;
                }
            }
        }
    }

    let nulls = match out_is_valid {
        Some(mut builder) if valid_count < len => {
            // Soundness: the builder holds `len` bits of which exactly
            // `valid_count` are set, as counted above
            Some(unsafe { NullBuffer::new_unchecked(builder.finish(), len - valid_count) })
        }
        _ => None,
    };
    Ok(BooleanArray::new(out.finish(), nulls))
}

/// `take` implementation for string and binary arrays
fn take_bytes<T, I>(
    array: &GenericByteArray<T>,
    indices: &PrimitiveArray<I>,
) -> Result<GenericByteArray<T>, ArrowError>
where
    T: ByteArrayType,
    I: ArrowPrimitiveType,
{
    let len = indices.len();
    let mut offsets = Vec::with_capacity(len + 1);
    let mut length_so_far = T::Offset::usize_as(0);
    offsets.push(length_so_far);
    let mut values = MutableBuffer::new(0);
    let mut nulls = NullBufferBuilder::new(len);

    if array.null_count() == 0 && indices.null_count() == 0 {
        for index in indices.values() {
            let bytes: &[u8] = array.value(index.as_usize()).as_ref();
            length_so_far += T::Offset::usize_as(bytes.len());
            values.extend_from_slice(bytes);
            offsets.push(length_so_far);
        }
    } else if indices.null_count() == 0 {
        for index in indices.values() {
            let index = index.as_usize();
            if array.is_valid(index) {
                let bytes: &[u8] = array.value(index).as_ref();
                length_so_far += T::Offset::usize_as(bytes.len());
                values.extend_from_slice(bytes);
                nulls.append_non_null();
            } else {
                nulls.append_null();
            }
            offsets.push(length_so_far);
        }
    } else {
        for position in 0..len {
            if indices.is_valid(position) {
                let index = indices.value(position).as_usize();
                if array.is_valid(index) {
                    let bytes: &[u8] = array.value(index).as_ref();
                    length_so_far += T::Offset::usize_as(bytes.len());
                    values.extend_from_slice(bytes);
                    nulls.append_non_null();
                } else {
                    nulls.append_null();
                }
            } else {
                nulls.append_null();
            }
            offsets.push(length_so_far);
        }
    }

    // Soundness: offsets are monotonically non-decreasing by construction
    // and the bytes were copied from an array of the same byte type
    let offsets = unsafe { OffsetBuffer::new_unchecked(offsets.into()) };
    Ok(unsafe { GenericByteArray::new_unchecked(offsets, values.into(), nulls.finish()) })
}

/// `take` implementation for dictionary arrays
///
/// Applies `take` to the keys and reattaches the dictionary values
fn take_dict<K, I>(
    values: &DictionaryArray<K>,
    indices: &PrimitiveArray<I>,
) -> Result<DictionaryArray<K>, ArrowError>
where
    K: ArrowDictionaryKeyType,
    I: ArrowPrimitiveType,
{
    let new_keys = take_primitive(values.keys(), indices)?;
    DictionaryArray::try_new(new_keys, values.values().clone())
}
