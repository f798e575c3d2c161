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

//! Capacity planning: derives the bit count `m` and hash count `k` of a filter from the
//! expected number of items `n` and the target false positive rate `p`.
//!
//! - `m = ceil(-n * ln(p) / (ln 2)^2)`
//! - `k = max(1, round((m / n) * ln 2))`
//!
//! At capacity the expected false positive rate is `(1 - e^(-k * n / m))^k`.

use std::f64::consts::LN_2;

use crate::error::Error;

const LN2_SQUARED: f64 = LN_2 * LN_2;

pub(super) const EXPECTED_ITEMS_MESSAGE: &str = "expectedItems must be a positive number";
pub(super) const FALSE_POSITIVE_RATE_MESSAGE: &str =
    "falsePositiveRate must be between 0 and 1 (exclusive)";

/// Concrete dimensions of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Plan {
    pub num_bits: u32,
    pub num_hashes: u16,
}

/// Validates the inputs and derives the filter dimensions.
pub(super) fn plan(expected_items: u64, false_positive_rate: f64) -> Result<Plan, Error> {
    if expected_items == 0 {
        return Err(Error::invalid_parameter(EXPECTED_ITEMS_MESSAGE)
            .with_context("expected_items", expected_items));
    }
    // written so that NaN fails too
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(Error::invalid_parameter(FALSE_POSITIVE_RATE_MESSAGE)
            .with_context("false_positive_rate", false_positive_rate));
    }

    let num_bits = suggest_num_bits(expected_items, false_positive_rate);
    let num_bits = u32::try_from(num_bits).map_err(|_| {
        Error::invalid_parameter("derived bit size exceeds the u32 size field")
            .with_context("expected_items", expected_items)
            .with_context("false_positive_rate", false_positive_rate)
            .with_context("num_bits", num_bits)
    })?;

    let num_hashes = suggest_num_hashes(expected_items, u64::from(num_bits));
    let num_hashes = u16::try_from(num_hashes).map_err(|_| {
        Error::invalid_parameter("derived hash count exceeds the u16 hash count field")
            .with_context("num_hashes", num_hashes)
    })?;

    Ok(Plan {
        num_bits,
        num_hashes,
    })
}

/// `ceil(-n * ln(p) / (ln 2)^2)`, saturating at `u64::MAX`.
pub(super) fn suggest_num_bits(expected_items: u64, false_positive_rate: f64) -> u64 {
    let n = expected_items as f64;
    let bits = (-n * false_positive_rate.ln() / LN2_SQUARED).ceil();
    // float-to-int casts saturate
    bits as u64
}

/// `max(1, round((m / n) * ln 2))`.
pub(super) fn suggest_num_hashes(expected_items: u64, num_bits: u64) -> u64 {
    let m = num_bits as f64;
    let n = expected_items as f64;
    let k = (m / n * LN_2).round() as u64;
    k.max(1)
}

/// `(1 - e^(-k * n / m))^k`.
pub(super) fn expected_false_positive_rate(
    inserted_items: u64,
    num_bits: u64,
    num_hashes: u64,
) -> f64 {
    if num_bits == 0 {
        return 1.0;
    }
    let k = num_hashes as f64;
    let exponent = -k * inserted_items as f64 / num_bits as f64;
    (1.0 - exponent.exp()).powf(k)
}
