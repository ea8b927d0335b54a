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

//! Resolution of logical rows over a chunk sequence

use arrow_array::ArrayRef;

/// The location of a logical row within a chunk sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    /// Index of the chunk containing the row
    pub chunk_index: usize,
    /// Offset of the row within that chunk
    pub index_in_chunk: usize,
}

/// Maps logical rows over a chunk sequence to [`ChunkLocation`]s
///
/// Holds the cumulative chunk offsets and resolves by binary search, so a
/// resolver built once can serve any number of lookups. The resolver is
/// immutable and can be shared freely.
#[derive(Debug, Clone)]
pub struct ChunkResolver {
    /// Cumulative offsets, `num_chunks + 1` entries starting at 0
    offsets: Vec<usize>,
}

impl ChunkResolver {
    /// Creates a resolver from the lengths of `chunks`
    pub fn new(chunks: &[ArrayRef]) -> Self {
        let mut offsets = Vec::with_capacity(chunks.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for chunk in chunks {
            total += chunk.len();
            offsets.push(total);
        }
        Self { offsets }
    }

    /// Returns the number of chunks this resolver was built from
    pub fn num_chunks(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the total number of logical rows
    pub fn logical_len(&self) -> usize {
        *self.offsets.last().unwrap()
    }

    /// Resolves logical row `index` to the chunk containing it
    ///
    /// Does not validate `index`: a row at or beyond [`Self::logical_len`]
    /// resolves to `chunk_index == num_chunks`, which callers must detect
    /// and report as an out-of-bounds index.
    pub fn resolve(&self, index: usize) -> ChunkLocation {
        let chunk_index = self.offsets.partition_point(|&offset| offset <= index) - 1;
        ChunkLocation {
            chunk_index,
            index_in_chunk: index - self.offsets[chunk_index],
        }
    }
}
