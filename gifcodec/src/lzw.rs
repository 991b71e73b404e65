// lzw.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Lempel-Ziv-Welch compression for GIF
use std::cmp::Ordering;
use std::fmt;
use std::ops::AddAssign;

/// Width of codes, in bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct CodeWidth(u8);

impl From<u8> for CodeWidth {
    fn from(bits: u8) -> Self {
        CodeWidth(bits.min(Self::MAX.0))
    }
}

impl From<CodeWidth> for u8 {
    fn from(bits: CodeWidth) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for CodeWidth {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl CodeWidth {
    /// Maximum code bits allowed for GIF
    const MAX: Self = CodeWidth(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Smallest minimum code size which can be coded
pub const MIN_CODE_SIZE: u8 = 2;

/// Largest minimum code size which can be coded
pub const MAX_CODE_SIZE: u8 = CodeWidth::MAX.0 - 1;

/// Code which is not in the dictionary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidCode {
    /// Code value
    pub code: u16,
    /// Next code available in the dictionary
    pub next_code: u16,
}

impl fmt::Display for InvalidCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Code {} is not in the dictionary (next code: {})",
            self.code, self.next_code
        )
    }
}

/// Node for code dictionary
trait Node {
    /// Create a new node
    fn new(next: Option<Code>, byte: u8) -> Self;

    /// Get the byte value
    fn byte(self) -> u8;
}

/// Node for Compressor
#[derive(Clone, Copy, Debug)]
struct EncoderNode {
    /// Next node code
    next: Option<Code>,
    /// Left node code
    left: Option<Code>,
    /// Right node code
    right: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Node for Decompressor
#[derive(Clone, Copy, Debug)]
struct DecoderNode {
    /// Prefix node code
    next: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Code dictionary trie
#[derive(Debug)]
struct Trie<N: Node> {
    /// Table of codes
    table: Vec<N>,
    /// Minimum code size
    min_code_size: u8,
}

/// LZW Data Compressor
///
/// Each call to [compress](#method.compress) writes one complete code
/// stream: a clear code first, then the data codes, then an end code.
/// Code width starts at `min_code_size + 1` bits and grows as the
/// dictionary does, up to 12 bits.  When the dictionary runs past 4096
/// entries, a clear code is written and the dictionary is reset.
pub struct Compressor {
    /// Code dictionary
    trie: Trie<EncoderNode>,
    /// Minimum code size
    min_code_size: u8,
    /// Current code width
    width: CodeWidth,
    /// Pending code bits
    pending: u32,
    /// Number of pending bits
    n_pending: u8,
}

/// LZW Data Decompressor
#[derive(Debug)]
pub struct Decompressor {
    /// Code dictionary
    trie: Trie<DecoderNode>,
    /// Minimum code size
    min_code_size: u8,
    /// Current code width
    width: CodeWidth,
    /// Last code
    last: Option<Code>,
    /// Pending code bits
    pending: u32,
    /// Number of pending bits
    n_pending: u8,
    /// End of information code found
    done: bool,
}

impl Node for EncoderNode {
    fn new(next: Option<Code>, byte: u8) -> Self {
        EncoderNode {
            next,
            left: None,
            right: None,
            byte,
        }
    }

    fn byte(self) -> u8 {
        self.byte
    }
}

impl Node for DecoderNode {
    fn new(next: Option<Code>, byte: u8) -> Self {
        DecoderNode { next, byte }
    }

    fn byte(self) -> u8 {
        self.byte
    }
}

impl EncoderNode {
    /// Get a link code
    fn link(&self, ordering: Ordering) -> Option<Code> {
        match ordering {
            Ordering::Less => self.left,
            Ordering::Equal => self.next,
            Ordering::Greater => self.right,
        }
    }

    /// Set a link code
    fn set_link(&mut self, ordering: Ordering, code: Code) {
        match ordering {
            Ordering::Less => self.left = Some(code),
            Ordering::Equal => self.next = Some(code),
            Ordering::Greater => self.right = Some(code),
        }
    }
}

impl<N: Node> Trie<N> {
    /// Create a new code dictionary
    fn new(min_code_size: u8) -> Self {
        let mut trie = Trie {
            table: Vec::with_capacity(CodeWidth::MAX.entries().into()),
            min_code_size,
        };
        trie.reset();
        trie
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_size
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.push_node(None, byte as u8);
        }
        self.push_node(None, 0); // clear code
        self.push_node(None, 0); // end code
    }

    /// Push a node into the dictionary
    fn push_node(&mut self, next: Option<Code>, byte: u8) {
        self.table.push(N::new(next, byte))
    }

    /// Get a mutable node
    fn node_mut(&mut self, code: Code) -> &mut N {
        debug_assert!(code < self.next_code());
        &mut self.table[code as usize]
    }
}

impl Trie<EncoderNode> {
    /// Search and insert a node
    fn search_insert(&mut self, code: Option<Code>, byte: u8) -> Option<Code> {
        match code {
            Some(code) => self.insert(code, byte),
            None => Some(byte as Code),
        }
    }

    /// Insert a node
    fn insert(&mut self, code: Code, byte: u8) -> Option<Code> {
        let next_code = self.next_code();
        let mut node = self.node_mut(code);
        let mut ordering = Ordering::Equal;
        while let Some(code) = node.link(ordering) {
            node = self.node_mut(code);
            ordering = byte.cmp(&node.byte());
            if ordering == Ordering::Equal {
                return Some(code);
            }
        }
        node.set_link(ordering, next_code);
        self.push_node(None, byte);
        None
    }
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// `min_code_size` must be between 2 and 11.
    pub fn new(min_code_size: u8) -> Self {
        debug_assert!((MIN_CODE_SIZE..=MAX_CODE_SIZE).contains(&min_code_size));
        let trie = Trie::<EncoderNode>::new(min_code_size);
        let width = CodeWidth::from(min_code_size + 1);
        Compressor {
            min_code_size,
            trie,
            width,
            pending: 0,
            n_pending: 0,
        }
    }

    /// Pack a code into a buffer
    fn pack(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.pending |= (code as u32) << self.n_pending;
        self.n_pending += u8::from(self.width);
        while self.n_pending >= 8 {
            buffer.push(self.pending as u8);
            self.pending >>= 8;
            self.n_pending -= 8;
        }
    }

    /// Flush a partial byte into a buffer
    fn flush(&mut self, buffer: &mut Vec<u8>) {
        if self.n_pending > 0 {
            buffer.push(self.pending as u8);
            self.pending = 0;
            self.n_pending = 0;
        }
    }

    /// Compress a byte buffer.
    ///
    /// The output starts with a clear code, ends with an end code and is
    /// padded to a whole byte.  Every byte must be less than the clear code.
    pub fn compress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) {
        self.trie.reset();
        self.width = CodeWidth::from(self.min_code_size + 1);
        self.pack(self.trie.clear_code(), buffer);
        let mut code = None;
        for byte in bytes {
            debug_assert!(Code::from(*byte) < self.trie.clear_code());
            code = self.trie.search_insert(code, *byte).or_else(|| {
                if let Some(code) = code {
                    self.pack(code, buffer);
                }
                Some(*byte as Code)
            });
            let next_code = self.trie.next_code();
            if next_code > self.width.entries() {
                if next_code > CodeWidth::MAX.entries() {
                    self.pack(self.trie.clear_code(), buffer);
                    self.trie.reset();
                    self.width = CodeWidth::from(self.min_code_size + 1);
                } else {
                    self.width += 1;
                }
            }
        }
        if let Some(code) = code {
            self.pack(code, buffer);
        }
        self.pack(self.trie.end_code(), buffer);
        self.flush(buffer);
    }
}

impl Trie<DecoderNode> {
    /// Lookup the first byte of a code value
    fn lookup(&self, code: Code) -> u8 {
        debug_assert!(code < self.next_code());
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            node = self.table[code as usize];
        }
        node.byte()
    }

    /// Decompress a code into a buffer (reversed)
    fn decompress_reversed(&self, code: Code, buffer: &mut Vec<u8>) {
        debug_assert!(code < self.next_code());
        let mut node = self.table[code as usize];
        while let Some(code) = node.next {
            buffer.push(node.byte());
            node = self.table[code as usize];
        }
        buffer.push(node.byte());
    }
}

impl Decompressor {
    /// Create a new decompressor.
    ///
    /// `min_code_size` must be between 2 and 11.
    pub fn new(min_code_size: u8) -> Self {
        debug_assert!((MIN_CODE_SIZE..=MAX_CODE_SIZE).contains(&min_code_size));
        Decompressor {
            min_code_size,
            trie: Trie::<DecoderNode>::new(min_code_size),
            width: CodeWidth::from(min_code_size + 1),
            last: None,
            pending: 0,
            n_pending: 0,
            done: false,
        }
    }

    /// Check whether the end code has been decompressed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Get the next complete code
    fn take_code(&mut self) -> Option<Code> {
        let b = u8::from(self.width);
        if self.n_pending >= b {
            let code = (self.pending & self.width.mask()) as Code;
            self.pending >>= b;
            self.n_pending -= b;
            Some(code)
        } else {
            None
        }
    }

    /// Decompress a byte buffer.
    ///
    /// Codes may span calls.  Bytes after the end code are ignored.
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
    ) -> Result<(), InvalidCode> {
        for byte in bytes {
            if self.done {
                break;
            }
            self.pending |= (*byte as u32) << self.n_pending;
            self.n_pending += 8;
            while !self.done {
                match self.take_code() {
                    Some(code) => self.decompress_code(code, buffer)?,
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Decompress one code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<(), InvalidCode> {
        if code == self.trie.clear_code() {
            self.trie.reset();
            self.width = CodeWidth::from(self.min_code_size + 1);
            self.last = None;
        } else if code == self.trie.end_code() {
            self.done = true;
        } else {
            let start = buffer.len();
            self.decompress_reversed(code, buffer)?;
            buffer[start..].reverse();
            self.last = Some(code);
        }
        Ok(())
    }

    /// Decompress one code (reversed)
    fn decompress_reversed(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<(), InvalidCode> {
        let next_code = self.trie.next_code();
        let full = next_code >= CodeWidth::MAX.entries();
        match (self.last, code.cmp(&next_code)) {
            (Some(last), Ordering::Less) => {
                self.trie.decompress_reversed(code, buffer);
                if !full {
                    // first byte of this code is last in reversed order
                    let byte = buffer[buffer.len() - 1];
                    self.trie.push_node(Some(last), byte);
                }
            }
            (Some(last), Ordering::Equal) if !full => {
                self.trie.push_node(Some(last), self.trie.lookup(last));
                self.trie.decompress_reversed(code, buffer);
            }
            (None, Ordering::Less) => self.trie.decompress_reversed(code, buffer),
            _ => return Err(InvalidCode { code, next_code }),
        }
        if next_code + 1 == self.width.entries() {
            self.width += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn compress(min_code_size: u8, bytes: &[u8]) -> Vec<u8> {
        let mut buffer = vec![];
        Compressor::new(min_code_size).compress(bytes, &mut buffer);
        buffer
    }

    fn decompress(min_code_size: u8, bytes: &[u8]) -> Vec<u8> {
        let mut dec = Decompressor::new(min_code_size);
        let mut buffer = vec![];
        dec.decompress(bytes, &mut buffer).unwrap();
        assert!(dec.is_done());
        buffer
    }

    /// Simple pseudo-random bytes
    fn noise(len: usize, modulus: u32) -> Vec<u8> {
        let mut x: u32 = 0x1234_5678;
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                (x % modulus) as u8
            })
            .collect()
    }

    #[test]
    fn compress_small() {
        assert_eq!(compress(2, &[1, 0, 0, 1]), [0x0C, 0x10, 0x05]);
        assert_eq!(
            compress(2, &[0, 1, 2, 3, 0, 1, 2, 3]),
            [0x44, 0x34, 0x86, 0x05]
        );
    }

    #[test]
    fn clear_when_full() {
        // no pair of adjacent bytes repeats, so each byte adds a code
        let bytes: Vec<u8> = (0..16u32)
            .flat_map(|k| (0..256u32).map(move |j| (j * (2 * k + 1)) as u8))
            .collect();
        let mut comp = Compressor::new(8);
        let mut data = vec![];
        comp.compress(&bytes, &mut data);
        // reset after 3839 codes were added, then 256 more
        assert_eq!(comp.trie.next_code(), 258 + 256);
        assert_eq!(comp.width, CodeWidth::from(10));
        assert_eq!(decompress(8, &data), bytes);
        // a second stream starts with a fresh dictionary
        let mut again = vec![];
        comp.compress(&bytes, &mut again);
        assert_eq!(again, data);
    }

    #[test]
    fn compress_empty() {
        // clear (3 bits) + end (3 bits), padded
        assert_eq!(compress(2, &[]), [0b0010_1100]);
        assert_eq!(decompress(2, &[0b0010_1100]), []);
    }

    #[test]
    fn decompress_small() {
        assert_eq!(decompress(2, &[0x0C, 0x10, 0x05]), [1, 0, 0, 1]);
        assert_eq!(
            decompress(2, &[0x44, 0x34, 0x86, 0x05]),
            [0, 1, 2, 3, 0, 1, 2, 3]
        );
    }

    #[test]
    fn decompress_10x10() {
        let data = [
            0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
            0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01,
        ];
        let image = [
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2,
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2,
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1,
        ];
        assert_eq!(decompress(2, &data), image);
    }

    #[test]
    fn decompress_split() {
        let bytes = noise(1000, 4);
        let data = compress(2, &bytes);
        let mut dec = Decompressor::new(2);
        let mut buffer = vec![];
        for chunk in data.chunks(7) {
            dec.decompress(chunk, &mut buffer).unwrap();
        }
        assert!(dec.is_done());
        assert_eq!(buffer, bytes);
    }

    #[test]
    fn after_end() {
        let mut data = compress(2, &[1, 2, 3]);
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        assert_eq!(decompress(2, &data), [1, 2, 3]);
    }

    #[test]
    fn round_trip() {
        for min_code_size in MIN_CODE_SIZE..=8 {
            let modulus = 1 << min_code_size;
            for len in [1, 2, 255, 256, 257, 5000, 100_000] {
                let bytes = noise(len, modulus);
                let data = compress(min_code_size, &bytes);
                assert_eq!(decompress(min_code_size, &data), bytes);
            }
        }
    }

    #[test]
    fn round_trip_same() {
        let bytes = vec![3; 70_000];
        let data = compress(2, &bytes);
        assert_eq!(decompress(2, &data), bytes);
        let bytes = vec![200; 70_000];
        let data = compress(8, &bytes);
        assert_eq!(decompress(8, &data), bytes);
    }

    #[test]
    fn round_trip_wide() {
        for min_code_size in 9..=MAX_CODE_SIZE {
            let bytes = noise(20_000, 256);
            let data = compress(min_code_size, &bytes);
            assert_eq!(decompress(min_code_size, &data), bytes);
        }
    }

    #[test]
    fn invalid_code() {
        // clear, then code 6 (next code is 6, with no previous code)
        let mut dec = Decompressor::new(2);
        let mut buffer = vec![];
        let err = dec.decompress(&[0b0011_0100], &mut buffer).unwrap_err();
        assert_eq!(err, InvalidCode { code: 6, next_code: 6 });
        // clear, 1, then code 7 (next code is 6)
        let mut dec = Decompressor::new(2);
        let err = dec
            .decompress(&[0b1100_1100, 0b0000_0001], &mut buffer)
            .unwrap_err();
        assert_eq!(err.code, 7);
        assert_eq!(buffer, [1]);
    }
}
