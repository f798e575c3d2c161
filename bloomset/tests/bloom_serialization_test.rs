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

use bloomset::bloom::BloomFilter;
use bloomset::bloom::BloomFilterBuilder;
use bloomset::error::ErrorKind;
use bloomset::hash::murmurhash3_32;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;

fn populated_filter(count: usize) -> BloomFilter {
    let mut filter = BloomFilter::new(1000, 0.01).unwrap();
    for i in 0..count {
        filter.add(&format!("cached-{i}"));
    }
    filter
}

#[test]
fn test_round_trip_empty() {
    let filter = BloomFilter::new(100, 0.01).unwrap();
    let bytes = filter.serialize();
    assert_that!(bytes.len(), eq(14 + (filter.size() as usize).div_ceil(8)));

    let restored = BloomFilter::deserialize(&bytes).unwrap();
    assert_eq!(restored, filter);
    assert!(restored.is_empty());
    assert_that!(restored.estimated_false_positive_rate(), eq(0.0));
}

#[test]
fn test_round_trip_populated() {
    let filter = populated_filter(700);
    let bytes = filter.serialize();
    let restored = BloomFilter::deserialize(&bytes).unwrap();

    assert_that!(restored.size(), eq(filter.size()));
    assert_that!(restored.hash_count(), eq(filter.hash_count()));
    assert_that!(restored.item_count(), eq(filter.item_count()));
    assert_that!(restored.fill_ratio(), eq(filter.fill_ratio()));
    assert_that!(restored.bits_set(), eq(filter.bits_set()));
    for i in 0..700 {
        assert!(restored.might_contain(&format!("cached-{i}")));
    }
    for i in 0..1000 {
        let key = format!("other-{i}");
        assert_eq!(restored.might_contain(&key), filter.might_contain(&key));
    }

    // re-serializing is byte-identical
    assert_eq!(restored.serialize(), bytes);
}

#[test]
fn test_restored_filter_keeps_counting() {
    let filter = populated_filter(10);
    let mut restored = BloomFilter::deserialize(&filter.serialize()).unwrap();
    restored.add("fresh-key");
    assert_that!(restored.item_count(), eq(11));
    assert!(restored.might_contain("fresh-key"));
}

#[test]
fn test_wire_layout() {
    let mut filter = BloomFilterBuilder::with_size(12, 1).build().unwrap();
    filter.add("x");

    let bit = murmurhash3_32("x", 0) % 12;
    let mut payload = [0u8; 2];
    payload[(bit / 8) as usize] = 1 << (bit % 8);

    let mut expected = vec![
        12, 0, 0, 0, // size
        1, 0, // hash count
        1, 0, 0, 0, // item count
        1, 0, 0, 0, // bits set
    ];
    expected.extend_from_slice(&payload);
    assert_eq!(filter.serialize(), expected);
}

#[test]
fn test_deserialize_too_short() {
    for len in [0, 1, 13] {
        let bytes = vec![0u8; len];
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::CorruptData));
        assert_that!(err.message(), contains_substring("too short"));
    }
}

#[test]
fn test_deserialize_incorrect_length() {
    let filter = populated_filter(5);
    let bytes = filter.serialize();

    let truncated = &bytes[..bytes.len() - 1];
    let err = BloomFilter::deserialize(truncated).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::CorruptData));
    assert_that!(err.message(), contains_substring("incorrect length"));

    let mut extended = bytes.clone();
    extended.push(0);
    let err = BloomFilter::deserialize(&extended).unwrap_err();
    assert_that!(err.message(), contains_substring("incorrect length"));

    // header claims a larger bit array than the payload carries
    let mut resized = bytes;
    resized[..4].copy_from_slice(&(filter.size() + 64).to_le_bytes());
    let err = BloomFilter::deserialize(&resized).unwrap_err();
    assert_that!(err.message(), contains_substring("incorrect length"));
    let expected_len = (14 + (filter.size() as usize + 64).div_ceil(8)).to_string();
    assert_that!(err.context("expected"), eq(Some(expected_len.as_str())));
}

#[test]
fn test_deserialize_header_only_buffer() {
    // a header declaring eight bits needs one payload byte
    let mut bytes = vec![0u8; 14];
    bytes[0] = 8;
    bytes[4] = 1;
    let err = BloomFilter::deserialize(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("incorrect length"));

    bytes.push(0);
    let filter = BloomFilter::deserialize(&bytes).unwrap();
    assert_that!(filter.size(), eq(8));
    assert!(filter.is_empty());
}
