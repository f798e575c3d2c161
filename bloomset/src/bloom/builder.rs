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

use super::BloomFilter;
use super::planner;
use super::planner::Plan;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing {
    Accuracy {
        expected_items: u64,
        false_positive_rate: f64,
    },
    Size {
        num_bits: u32,
        num_hashes: u16,
    },
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected items and false positive rate
///   (recommended)
/// - [`with_size()`](Self::with_size): Specify exact bit count and hash functions (manual)
///
/// Parameters are validated by [`build()`](Self::build), which never panics.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilterBuilder {
    sizing: Sizing,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `expected_items`: Expected number of distinct items, must be positive
    /// - `false_positive_rate`: Target false positive rate, strictly between 0 and 1
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.size(), 95_851);
    /// assert_eq!(filter.hash_count(), 7);
    /// ```
    pub fn with_accuracy(expected_items: u64, false_positive_rate: f64) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Accuracy {
                expected_items,
                false_positive_rate,
            },
        }
    }

    /// Creates a builder with manual size specification.
    ///
    /// Both `num_bits` and `num_hashes` must be positive.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(1024, 5).build().unwrap();
    /// assert_eq!(filter.size(), 1024);
    /// ```
    pub fn with_size(num_bits: u32, num_hashes: u16) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::Size {
                num_bits,
                num_hashes,
            },
        }
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// - `expected_items` is zero,
    /// - `false_positive_rate` is not in `(0, 1)`,
    /// - the derived size does not fit the serialization header,
    /// - `num_bits` or `num_hashes` passed to [`with_size()`](Self::with_size) is zero.
    pub fn build(self) -> Result<BloomFilter, Error> {
        let plan = match self.sizing {
            Sizing::Accuracy {
                expected_items,
                false_positive_rate,
            } => planner::plan(expected_items, false_positive_rate)?,
            Sizing::Size {
                num_bits,
                num_hashes,
            } => {
                if num_bits == 0 {
                    return Err(Error::invalid_parameter("num_bits must be at least 1"));
                }
                if num_hashes == 0 {
                    return Err(Error::invalid_parameter("num_hashes must be at least 1"));
                }
                Plan {
                    num_bits,
                    num_hashes,
                }
            }
        };
        Ok(BloomFilter::from_parameters(plan))
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests the number of bits for `expected_items` at `false_positive_rate`.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln 2)^2)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
    /// assert_eq!(bits, 9586);
    /// ```
    pub fn suggest_num_bits(expected_items: u64, false_positive_rate: f64) -> u64 {
        planner::suggest_num_bits(expected_items, false_positive_rate)
    }

    /// Suggests the number of hash functions for `expected_items` spread over `num_bits`.
    ///
    /// Formula: `k = max(1, round((m / n) * ln 2))`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 9586), 7);
    /// ```
    pub fn suggest_num_hashes(expected_items: u64, num_bits: u64) -> u64 {
        planner::suggest_num_hashes(expected_items, num_bits)
    }

    /// Expected false positive rate after `inserted_items` distinct inserts.
    ///
    /// Formula: `(1 - e^(-k * n / m))^k`
    pub fn expected_false_positive_rate(
        inserted_items: u64,
        num_bits: u64,
        num_hashes: u64,
    ) -> f64 {
        planner::expected_false_positive_rate(inserted_items, num_bits, num_hashes)
    }
}
