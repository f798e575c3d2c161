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

//! Bloom filter for probabilistic set membership testing of string keys.
//!
//! A Bloom filter answers "might this key be present?" without storing the keys. False
//! positive matches are possible, but false negatives are not. Typical uses are negative
//! caching, pre-checks before expensive lookups, and cross-shard existence checks.
//!
//! # Properties
//!
//! - **No false negatives**: If an item was added, `might_contain()` always returns `true`
//! - **Possible false positives**: `might_contain()` may return `true` for items never added
//! - **Fixed size**: Capacity is derived once from the expected item count and target rate
//! - **No removal**: Bits are only ever set
//!
//! # Usage
//!
//! ```rust
//! use bloomset::bloom::BloomFilter;
//!
//! // Create a filter for 1000 items with 1% false positive rate
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//!
//! filter.add("apple");
//! filter.add("banana");
//!
//! assert!(filter.might_contain("apple")); // true - definitely added
//! assert!(!filter.might_contain("grape")); // false - never added (probably)
//!
//! println!("Size: {} bits, {} hashes", filter.size(), filter.hash_count());
//! println!("Fill ratio: {:.4}", filter.fill_ratio());
//! println!("Est. FPR: {:.4}%", filter.estimated_false_positive_rate() * 100.0);
//! ```
//!
//! # Creating Filters
//!
//! ## By Accuracy (Recommended)
//!
//! ```rust
//! # use bloomset::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_accuracy(
//!     10_000, // Expected items
//!     0.01,   // Target false positive rate (1%)
//! )
//! .build()
//! .unwrap();
//! assert_eq!(filter.size(), 95_851);
//! ```
//!
//! ## By Size (Manual)
//!
//! ```rust
//! # use bloomset::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_size(
//!     95_851, // Number of bits
//!     7,      // Number of hash positions per item
//! )
//! .build()
//! .unwrap();
//! ```
//!
//! # Persistence
//!
//! [`BloomFilter::serialize`] produces a 14-byte little-endian header followed by the raw
//! bit array. Where the bytes are stored is up to the caller.
//!
//! ```rust
//! # use bloomset::bloom::BloomFilter;
//! let mut filter = BloomFilter::new(100, 0.01).unwrap();
//! filter.add("session:42");
//!
//! let bytes = filter.serialize();
//! let restored = BloomFilter::deserialize(&bytes).unwrap();
//! assert_eq!(restored, filter);
//! ```
//!
//! # Implementation Details
//!
//! - MurmurHash3 x86_32 over the UTF-16 code units of the key
//! - Double hashing (Kirsch-Mitzenmacher): `h1 = murmur(key, 0)`, `h2 = murmur(key, h1)`,
//!   position `i` is `(h1 + i * h2) mod m`
//! - Bits packed eight per byte, least significant bit first
//!
//! # Concurrency
//!
//! `add` takes `&mut self`. Share a filter between writers behind a `Mutex` or `RwLock`;
//! concurrent readers need no synchronization.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod builder;
mod planner;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::sketch::BitPositions;
pub use self::sketch::BloomFilter;
