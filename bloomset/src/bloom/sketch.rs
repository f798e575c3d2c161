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

use super::BloomFilterBuilder;
use super::planner::Plan;
use crate::codec::FilterBytes;
use crate::codec::FilterSlice;
use crate::error::Error;
use crate::hash::murmurhash3_32;

/// Size of the fixed serialization header in bytes.
pub(super) const HEADER_BYTES: usize = 14;

/// A Bloom filter for probabilistic set membership testing of string keys.
///
/// Provides fast membership queries with:
/// - No false negatives (added items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage, fixed at construction
///
/// Bits are packed eight per byte, least significant bit first. The filter takes `&mut self`
/// to add, so a single writer is enforced by the borrow checker; any number of readers may
/// share it across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Total number of bits in the filter (m)
    num_bits: u32,
    /// Number of bit positions probed per item (k)
    num_hashes: u16,
    /// Number of `add` calls that set at least one new bit
    item_count: u32,
    /// Count of bits set to 1
    bits_set: u32,
    /// Length = ceil(num_bits / 8)
    bit_array: Vec<u8>,
}

impl BloomFilter {
    /// Creates a filter sized for `expected_items` at the target `false_positive_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `expected_items` is zero or `false_positive_rate` is not strictly between 0 and 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomset::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.add("item1");
    /// filter.add("item2");
    ///
    /// assert!(filter.might_contain("item1"));
    /// assert!(filter.might_contain("item2"));
    /// assert_eq!(filter.item_count(), 2);
    /// ```
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Result<Self, Error> {
        BloomFilterBuilder::with_accuracy(expected_items, false_positive_rate).build()
    }

    /// Returns a builder for creating a Bloom filter.
    pub fn builder(expected_items: u64, false_positive_rate: f64) -> BloomFilterBuilder {
        BloomFilterBuilder::with_accuracy(expected_items, false_positive_rate)
    }

    /// Allocates an empty filter with already validated dimensions.
    pub(super) fn from_parameters(plan: Plan) -> Self {
        let Plan {
            num_bits,
            num_hashes,
        } = plan;
        tracing::debug!(num_bits, num_hashes, "created bloom filter");

        BloomFilter {
            num_bits,
            num_hashes,
            item_count: 0,
            bits_set: 0,
            bit_array: vec![0u8; byte_len(num_bits)],
        }
    }

    /// Reassembles a filter from decoded state, trusting the caller's checks.
    fn from_raw_parts(
        num_bits: u32,
        num_hashes: u16,
        item_count: u32,
        bits_set: u32,
        bit_array: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(bit_array.len(), byte_len(num_bits));
        BloomFilter {
            num_bits,
            num_hashes,
            item_count,
            bits_set,
            bit_array,
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** added (or false positive)
    /// - `false`: Item was **definitely not** added
    pub fn might_contain(&self, item: &str) -> bool {
        #[cfg(feature = "trace")]
        tracing::trace!(item, "BloomFilter::might_contain");

        self.hash_positions(item).all(|bit| self.get_bit(bit))
    }

    /// Returns the `k` bit positions probed for `item`.
    ///
    /// Positions come from double hashing: `h1 = murmur(item, 0)`, `h2 = murmur(item, h1)`,
    /// and position `i` is `(h1 + i * h2) mod m`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let filter = BloomFilter::new(1000, 0.01).unwrap();
    /// let positions: Vec<u32> = filter.hash_positions("apple").collect();
    /// assert_eq!(positions.len(), 7);
    /// assert!(positions.iter().all(|&p| p < filter.size()));
    /// ```
    pub fn hash_positions(&self, item: &str) -> BitPositions {
        BitPositions::new(item, self.num_bits, self.num_hashes)
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds an item to the filter.
    ///
    /// After this call `might_contain(item)` always returns `true`. The item count is only
    /// incremented when at least one new bit was set, so re-adding an item (or adding one
    /// whose positions are all covered by earlier items) leaves it unchanged.
    pub fn add(&mut self, item: &str) {
        #[cfg(feature = "trace")]
        tracing::trace!(item, "BloomFilter::add");

        self.add_positions(self.hash_positions(item));
    }

    /// Adds every item yielded by `items`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.add_all(["a", "b", "c"]);
    /// assert!(filter.might_contain("b"));
    /// ```
    pub fn add_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for item in items {
            self.add(item.as_ref());
        }
    }

    /// Tests and adds an item in a single operation.
    ///
    /// Returns whether the item was possibly present before this call. The item is hashed
    /// once for both steps.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    ///
    /// assert!(!filter.contains_and_add("apple")); // first insertion
    /// assert!(filter.contains_and_add("apple")); // now it's in the set
    /// assert_eq!(filter.item_count(), 1);
    /// ```
    pub fn contains_and_add(&mut self, item: &str) -> bool {
        let positions = self.hash_positions(item);
        let was_present = positions.clone().all(|bit| self.get_bit(bit));
        if !was_present {
            self.add_positions(positions);
        }
        was_present
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the total number of bits in the filter (m).
    pub fn size(&self) -> u32 {
        self.num_bits
    }

    /// Returns the number of bit positions probed per item (k).
    pub fn hash_count(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the approximate number of distinct items added.
    ///
    /// Counts `add` calls that set at least one previously unset bit. Duplicates are not
    /// counted, and neither are distinct items whose positions were all already set.
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u32 {
        self.bits_set
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits_set == 0
    }

    /// Returns the fraction of bits set, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        f64::from(self.bits_set) / f64::from(self.num_bits)
    }

    /// Estimates the current false positive probability as `fill_ratio ^ k`.
    ///
    /// The observed fill ratio stands in for `1 - e^(-kn/m)` in the textbook formula.
    /// Returns exactly `0.0` for an empty filter.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        if self.bits_set == 0 {
            return 0.0;
        }
        self.fill_ratio().powi(i32::from(self.num_hashes))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serializes the filter to a byte vector.
    ///
    /// Layout, all integers little-endian:
    ///
    /// | offset | type | field        |
    /// |--------|------|--------------|
    /// | 0      | u32  | size         |
    /// | 4      | u16  | hash count   |
    /// | 6      | u32  | item count   |
    /// | 10     | u32  | bits set     |
    /// | 14     | u8[] | bit array, `ceil(size / 8)` bytes |
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomset::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.add("test");
    ///
    /// let bytes = filter.serialize();
    /// assert_eq!(bytes.len(), 14 + (filter.size() as usize).div_ceil(8));
    ///
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert!(restored.might_contain("test"));
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = FilterBytes::with_capacity(HEADER_BYTES + self.bit_array.len());
        bytes.write_u32_le(self.num_bits);
        bytes.write_u16_le(self.num_hashes);
        bytes.write_u32_le(self.item_count);
        bytes.write_u32_le(self.bits_set);
        bytes.write(&self.bit_array);
        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes produced by [`serialize()`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorruptData`](crate::error::ErrorKind::CorruptData) if:
    /// - the buffer is shorter than the 14-byte header ("too short")
    /// - the buffer length disagrees with the size in the header ("incorrect length")
    /// - the header declares zero bits or zero hashes
    /// - the bit-set count disagrees with the bit array, or bits beyond `size` are set
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_BYTES {
            return Err(Error::corrupt_data("serialized bloom filter is too short")
                .with_context("minimum", HEADER_BYTES)
                .with_context("actual", bytes.len()));
        }

        let mut cursor = FilterSlice::new(bytes);
        let num_bits = cursor
            .read_u32_le()
            .map_err(|_| Error::insufficient_data("size"))?;
        let num_hashes = cursor
            .read_u16_le()
            .map_err(|_| Error::insufficient_data("hash_count"))?;
        let item_count = cursor
            .read_u32_le()
            .map_err(|_| Error::insufficient_data("item_count"))?;
        let bits_set = cursor
            .read_u32_le()
            .map_err(|_| Error::insufficient_data("bits_set"))?;

        let num_bytes = byte_len(num_bits);
        if cursor.remaining() != num_bytes {
            return Err(Error::corrupt_data("serialized bloom filter has incorrect length")
                .with_context("expected", HEADER_BYTES + num_bytes)
                .with_context("actual", bytes.len()));
        }
        if num_bits == 0 {
            return Err(Error::corrupt_data("size must be positive"));
        }
        if num_hashes == 0 {
            return Err(Error::corrupt_data("hash count must be positive"));
        }

        let mut bit_array = vec![0u8; num_bytes];
        cursor
            .read_exact(&mut bit_array)
            .map_err(|e| Error::insufficient_data("bit_array").set_source(e))?;

        let tail_bits = num_bits % 8;
        if tail_bits != 0 {
            let unused = !((1u8 << tail_bits) - 1);
            if bit_array[num_bytes - 1] & unused != 0 {
                return Err(Error::corrupt_data("bits beyond size are set")
                    .with_context("size", num_bits));
            }
        }

        let counted: u64 = bit_array.iter().map(|b| u64::from(b.count_ones())).sum();
        if counted != u64::from(bits_set) {
            return Err(Error::corrupt_data("bits set count does not match bit array")
                .with_context("expected", bits_set)
                .with_context("actual", counted));
        }

        tracing::debug!(
            num_bits,
            num_hashes,
            item_count,
            bits_set,
            "deserialized bloom filter"
        );
        Ok(BloomFilter::from_raw_parts(num_bits, num_hashes, item_count, bits_set, bit_array))
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Sets all positions and counts the item if any bit was new.
    fn add_positions(&mut self, positions: BitPositions) {
        let mut added = false;
        for bit in positions {
            added |= self.set_bit(bit);
        }
        if added {
            self.item_count = self.item_count.saturating_add(1);
        }
    }

    /// Gets the value of a single bit.
    fn get_bit(&self, bit_index: u32) -> bool {
        let byte_index = (bit_index / 8) as usize;
        let mask = 1u8 << (bit_index % 8);
        (self.bit_array[byte_index] & mask) != 0
    }

    /// Sets a single bit, returning whether it was previously unset.
    fn set_bit(&mut self, bit_index: u32) -> bool {
        let byte_index = (bit_index / 8) as usize;
        let mask = 1u8 << (bit_index % 8);

        if (self.bit_array[byte_index] & mask) == 0 {
            self.bit_array[byte_index] |= mask;
            self.bits_set += 1;
            true
        } else {
            false
        }
    }
}

/// Iterator over the bit positions probed for one item.
///
/// Created by [`BloomFilter::hash_positions`].
#[derive(Debug, Clone)]
pub struct BitPositions {
    h1: u64,
    h2: u64,
    num_bits: u64,
    next: u16,
    num_hashes: u16,
}

impl BitPositions {
    fn new(item: &str, num_bits: u32, num_hashes: u16) -> Self {
        let h1 = murmurhash3_32(item, 0);
        let h2 = murmurhash3_32(item, h1);
        BitPositions {
            h1: u64::from(h1),
            h2: u64::from(h2),
            num_bits: u64::from(num_bits),
            next: 0,
            num_hashes,
        }
    }
}

impl Iterator for BitPositions {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next >= self.num_hashes {
            return None;
        }
        // h1 + i * h2 < 2^32 + 2^16 * 2^32, so this never wraps
        let combined = self.h1 + u64::from(self.next) * self.h2;
        self.next += 1;
        Some((combined % self.num_bits) as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(self.num_hashes - self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitPositions {}

fn byte_len(num_bits: u32) -> usize {
    num_bits.div_ceil(8) as usize
}
