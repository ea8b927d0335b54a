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

//! Chunk-aware `take` and `filter_to_indices` kernels for
//! [Apache Arrow](https://docs.rs/arrow) arrays
//!
//! [`take::take`] gathers rows of a contiguous array by position;
//! [`dispatch`] extends it over [`ChunkedArray`], [`RecordBatch`] and
//! [`Table`] values and chunked indices; [`filter::filter_to_indices`]
//! converts a boolean (or run-end encoded boolean) selection vector into an
//! index array consumable by `take`.
//!
//! [`ChunkedArray`]: chunked_array::ChunkedArray
//! [`Table`]: chunked_array::Table
//! [`RecordBatch`]: arrow_array::RecordBatch

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

pub mod bit_block;
pub mod dispatch;
pub mod filter;
pub mod take;
