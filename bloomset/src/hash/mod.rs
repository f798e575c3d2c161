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

//! Hash functions used to place keys in a filter.
//!
//! Keys are hashed with the 32-bit x86 variant of MurmurHash3. String keys are fed to the
//! hasher one byte per UTF-16 code unit (the low eight bits of each unit), which keeps the
//! output identical to filters produced by JavaScript services using the common
//! `charCodeAt(i) & 0xff` rendition of the algorithm. For ASCII keys the result equals the
//! reference MurmurHash3 x86_32 of the UTF-8 bytes.

mod murmurhash;

use std::hash::Hasher;

pub use self::murmurhash::MurmurHash3X8632;

/// Size of the stack buffer used when feeding non-ASCII keys to the hasher.
const CODE_UNIT_CHUNK: usize = 64;

/// Computes the MurmurHash3 x86_32 hash of `key` with the given `seed`.
///
/// # Examples
///
/// ```
/// use bloomset::hash::murmurhash3_32;
///
/// assert_eq!(murmurhash3_32("", 0), 0);
/// assert_eq!(murmurhash3_32("Hello, world!", 0x9747b28c), 0x24884cba);
/// ```
pub fn murmurhash3_32(key: &str, seed: u32) -> u32 {
    let mut hasher = MurmurHash3X8632::with_seed(seed);
    if key.is_ascii() {
        hasher.write(key.as_bytes());
        return hasher.finish32();
    }

    let mut chunk = [0u8; CODE_UNIT_CHUNK];
    let mut len = 0;
    for unit in key.encode_utf16() {
        chunk[len] = unit as u8;
        len += 1;
        if len == CODE_UNIT_CHUNK {
            hasher.write(&chunk);
            len = 0;
        }
    }
    hasher.write(&chunk[..len]);
    hasher.finish32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_matches_reference() {
        let keys = [
            "",
            "a",
            "ab",
            "abc",
            "abcd",
            "item-12345",
            "The quick brown fox",
        ];
        for key in keys {
            for seed in [0, 1, 0x9747b28c, u32::MAX] {
                assert_eq!(
                    murmurhash3_32(key, seed),
                    mur3::murmurhash3_x86_32(key.as_bytes(), seed),
                    "key = {key:?}, seed = {seed}"
                );
            }
        }
    }

    #[test]
    fn test_non_ascii_uses_low_byte_of_code_units() {
        // U+00E9 -> 0xE9, U+4E2D -> 0x2D, U+1F600 -> surrogates 0xD83D 0xDE00 -> 0x3D 0x00
        let key = "caf\u{e9} \u{4e2d} \u{1f600}";
        let bytes = [b'c', b'a', b'f', 0xe9, b' ', 0x2d, b' ', 0x3d, 0x00];
        assert_eq!(
            murmurhash3_32(key, 42),
            mur3::murmurhash3_x86_32(&bytes, 42)
        );
    }

    #[test]
    fn test_long_non_ascii_spans_chunks() {
        let key = "\u{e9}".repeat(CODE_UNIT_CHUNK * 2 + 3);
        let bytes = vec![0xe9u8; CODE_UNIT_CHUNK * 2 + 3];
        assert_eq!(
            murmurhash3_32(&key, 7),
            mur3::murmurhash3_x86_32(&bytes, 7)
        );
    }
}
