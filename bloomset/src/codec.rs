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

//! Little-endian byte writer and reader backing the filter wire format.

use std::io;
use std::io::Cursor;
use std::io::Read;

pub(crate) struct FilterBytes {
    bytes: Vec<u8>,
}

impl FilterBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    pub fn write_u16_le(&mut self, n: u16) {
        self.write(&n.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, n: u32) {
        self.write(&n.to_le_bytes());
    }
}

pub(crate) struct FilterSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> FilterSlice<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        FilterSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        let len = self.slice.get_ref().len();
        len.saturating_sub(self.slice.position() as usize)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.slice.read_exact(buf)
    }

    pub fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields_are_little_endian() {
        let mut bytes = FilterBytes::with_capacity(6);
        bytes.write_u32_le(0x0403_0201);
        bytes.write_u16_le(0x0605);
        let bytes = bytes.into_bytes();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6]);

        let mut slice = FilterSlice::new(&bytes);
        assert_eq!(slice.remaining(), 6);
        assert_eq!(slice.read_u32_le().unwrap(), 0x0403_0201);
        assert_eq!(slice.remaining(), 2);
        assert_eq!(slice.read_u16_le().unwrap(), 0x0605);
        assert_eq!(slice.remaining(), 0);
        assert!(slice.read_u16_le().is_err());
    }
}
