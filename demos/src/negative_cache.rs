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

//! Uses a Bloom filter as a negative cache in front of a slow lookup, persists the filter to
//! disk, and reloads it.
//!
//! Statistics are logged at `info`. Run with `RUST_LOG=debug cargo run --bin negative_cache`
//! to also see the library's events.

use std::collections::HashMap;
use std::fs;

use bloomset::bloom::BloomFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Outcome of serving a batch of lookups through the filter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LookupStats {
    /// Lookups that reached the map.
    lookups: u64,
    /// Lookups answered by the filter alone.
    skipped: u64,
    /// Lookups that reached the map and found nothing.
    false_positives: u64,
}

impl LookupStats {
    /// Share of absent keys the filter let through. Every skipped key is absent, since the
    /// filter has no false negatives.
    fn observed_false_positive_rate(&self) -> f64 {
        let absent = self.skipped + self.false_positives;
        if absent == 0 {
            return 0.0;
        }
        self.false_positives as f64 / absent as f64
    }
}

fn serve_lookups<I>(filter: &BloomFilter, users: &HashMap<String, u64>, keys: I) -> LookupStats
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut stats = LookupStats::default();
    for key in keys {
        let key = key.as_ref();
        if !filter.might_contain(key) {
            stats.skipped += 1;
            continue;
        }
        stats.lookups += 1;
        if users.get(key).is_none() {
            stats.false_positives += 1;
        }
    }
    stats
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // the "database": only even user ids exist
    let users: HashMap<String, u64> = (0..5_000)
        .map(|i| (format!("user:{}", i * 2), i * 2))
        .collect();

    let mut filter = BloomFilter::new(users.len() as u64, 0.01)?;
    filter.add_all(users.keys());

    let path = std::env::temp_dir().join("bloomset-negative-cache.bin");
    fs::write(&path, filter.serialize())?;
    let restored = BloomFilter::deserialize(&fs::read(&path)?)?;
    fs::remove_file(&path)?;

    let keys = (0..10_000).map(|i| format!("user:{i}"));
    let stats = serve_lookups(&restored, &users, keys);
    tracing::info!(
        lookups = stats.lookups,
        skipped = stats.skipped,
        false_positives = stats.false_positives,
        "served lookups"
    );
    tracing::info!(
        size = restored.size(),
        hash_count = restored.hash_count(),
        item_count = restored.item_count(),
        fill_ratio = restored.fill_ratio(),
        "restored filter"
    );
    tracing::info!(
        observed = stats.observed_false_positive_rate(),
        estimated = restored.estimated_false_positive_rate(),
        "false positive rate"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use bloomset::bloom::BloomFilterBuilder;

    use super::*;

    fn users(count: u64) -> HashMap<String, u64> {
        (0..count).map(|i| (format!("user:{i}"), i)).collect()
    }

    #[test]
    fn test_present_keys_always_reach_the_map() {
        let users = users(100);
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add_all(users.keys());

        let stats = serve_lookups(&filter, &users, users.keys());
        assert_eq!(stats.lookups, 100);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.false_positives, 0);
        assert_eq!(stats.observed_false_positive_rate(), 0.0);
    }

    #[test]
    fn test_absent_keys_split_into_skips_and_false_positives() {
        let users = users(1_000);
        let mut filter = BloomFilter::new(1_000, 0.01).unwrap();
        filter.add_all(users.keys());

        let absent = (0..10_000).map(|i| format!("absent:{i}"));
        let stats = serve_lookups(&filter, &users, absent);
        assert_eq!(stats.lookups, stats.false_positives);
        assert_eq!(stats.skipped + stats.false_positives, 10_000);
        assert!(stats.observed_false_positive_rate() < 0.05);
    }

    #[test]
    fn test_saturated_filter_lets_every_absent_key_through() {
        let users = users(1);
        // one bit and one hash: every key maps to the single set bit
        let mut filter = BloomFilterBuilder::with_size(1, 1).build().unwrap();
        filter.add_all(users.keys());

        let stats = serve_lookups(&filter, &users, ["user:0", "user:1", "user:2"]);
        let expected = LookupStats {
            lookups: 3,
            skipped: 0,
            false_positives: 2,
        };
        assert_eq!(stats, expected);
        assert_eq!(stats.observed_false_positive_rate(), 1.0);
    }
}
