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

//! Chunked columnar containers for [Apache Arrow](https://docs.rs/arrow) arrays
//!
//! A [`ChunkedArray`] is an ordered concatenation of [`Array`] chunks that
//! share a logical type, addressed as a single logical sequence of rows. A
//! [`Table`] is the chunked counterpart of [`RecordBatch`]. [`ChunkResolver`]
//! maps a logical row over a chunk sequence to a `(chunk, offset)` pair, and
//! [`Datum`] enumerates the value shapes that chunk-aware kernels accept.
//!
//! [`Array`]: arrow_array::Array
//! [`RecordBatch`]: arrow_array::RecordBatch

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

pub mod chunk_resolver;
pub mod chunked_array;
pub mod datum;
pub mod table;

pub use chunk_resolver::{ChunkLocation, ChunkResolver};
pub use chunked_array::ChunkedArray;
pub use datum::Datum;
pub use table::Table;
