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

use std::hash::Hasher;

use byteorder::ByteOrder;
use byteorder::LE;

const DEFAULT_SEED: u32 = 0;
const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

/// The 32-bit x86 variant of MurmurHash3, a fast, non-cryptographic hash function with
/// good avalanche behavior.
///
/// Input may be fed in arbitrary pieces through [`Hasher::write`]; the result only depends
/// on the concatenated bytes and the seed.
#[derive(Debug, Clone)]
pub struct MurmurHash3X8632 {
    h1: u32,
    total: u32,
    buf: [u8; 4],
    buf_len: usize,
}

impl MurmurHash3X8632 {
    /// Creates a hasher starting from `seed`.
    pub fn with_seed(seed: u32) -> Self {
        MurmurHash3X8632 {
            h1: seed,
            total: 0,
            buf: [0; 4],
            buf_len: 0,
        }
    }

    /// Returns the 32-bit hash of everything written so far.
    pub fn finish32(&self) -> u32 {
        let mut h1 = self.h1;

        // tail
        if self.buf_len > 0 {
            let mut buf = [0u8; 4];
            buf[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
            h1 ^= mix_k1(u32::from_le_bytes(buf));
        }

        // the length is taken modulo 2^32, as in the reference implementation
        h1 ^= self.total.wrapping_add(self.buf_len as u32);
        fmix32(h1)
    }

    #[inline]
    fn update(&mut self, k1: u32) {
        self.h1 ^= mix_k1(k1);
        self.h1 = self.h1.rotate_left(13);
        self.h1 = self.h1.wrapping_mul(5).wrapping_add(0xe6546b64);
        self.total = self.total.wrapping_add(4);
    }
}

impl Default for MurmurHash3X8632 {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl Hasher for MurmurHash3X8632 {
    fn finish(&self) -> u64 {
        u64::from(self.finish32())
    }

    fn write(&mut self, mut bytes: &[u8]) {
        if self.buf_len + bytes.len() < 4 {
            self.buf[self.buf_len..self.buf_len + bytes.len()].copy_from_slice(bytes);
            self.buf_len += bytes.len();
            return;
        }

        if self.buf_len != 0 {
            let wanted = 4 - self.buf_len;
            self.buf[self.buf_len..].copy_from_slice(&bytes[..wanted]);
            let k1 = LE::read_u32(&self.buf);
            self.update(k1);

            bytes = &bytes[wanted..];
            self.buf_len = 0;
        }

        let blocks = bytes.len() >> 2; // bytes / 4
        for i in 0..blocks {
            let lo = i << 2;
            let k1 = LE::read_u32(&bytes[lo..lo + 4]);
            self.update(k1);
        }

        let len = bytes.len() % 4;
        if len > 0 {
            self.buf[..len].copy_from_slice(&bytes[blocks << 2..]);
            self.buf_len = len;
        }
    }
}

#[inline]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn murmurhash3_x86_32(key: &[u8], seed: u32) -> u32 {
        let mut hasher = MurmurHash3X8632::with_seed(seed);
        hasher.write(key);
        hasher.finish32()
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(murmurhash3_x86_32(b"", 0), 0);
        assert_eq!(murmurhash3_x86_32(b"", 1), 0x514e28b7);
        assert_eq!(murmurhash3_x86_32(b"", 0xffffffff), 0x81f16f39);
        assert_eq!(murmurhash3_x86_32(b"aaaa", 0x9747b28c), 0x5a97808a);
        assert_eq!(murmurhash3_x86_32(b"abc", 0x9747b28c), 0xc84a62dd);
        assert_eq!(murmurhash3_x86_32(b"Hello, world!", 0x9747b28c), 0x24884cba);
        assert_eq!(
            murmurhash3_x86_32(b"The quick brown fox jumps over the lazy dog", 0x9747b28c),
            0x2fa826cd
        );
    }

    #[test]
    fn test_remainder() {
        let key = b"The quick brown fox jumps over the lazy dog";
        // every tail length from 0 to 3 and a range of body lengths
        for end in 0..key.len() {
            let key = &key[..end];
            assert_eq!(
                murmurhash3_x86_32(key, 9001),
                mur3::murmurhash3_x86_32(key, 9001),
                "len = {end}"
            );
        }
    }

    #[test]
    fn test_split_writes() {
        let key = b"bloomset split writes must not change the hash";
        let expected = murmurhash3_x86_32(key, 17);
        for split in 0..key.len() {
            let mut hasher = MurmurHash3X8632::with_seed(17);
            hasher.write(&key[..split]);
            hasher.write(&key[split..]);
            assert_eq!(hasher.finish32(), expected, "split at {split}");
        }

        let mut hasher = MurmurHash3X8632::with_seed(17);
        for byte in key {
            hasher.write(&[*byte]);
        }
        assert_eq!(hasher.finish32(), expected);
    }

    #[test]
    fn test_ones_and_zeros_bytes() {
        let key = [0x54, 0x68, 0x65, 0xff, 0x64, 0x6f, 0x67, 0x00, 0x00];
        assert_eq!(
            murmurhash3_x86_32(&key, 0),
            mur3::murmurhash3_x86_32(&key, 0)
        );
    }
}
