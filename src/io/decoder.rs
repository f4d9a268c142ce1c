//! Incremental UTF-8 decoding.
//!
//! Stream reads split bytes at arbitrary positions, including in the middle
//! of a multi-byte character. The decoder carries an incomplete trailing
//! sequence over to the next read so the demultiplexer only ever sees whole
//! characters.

/// Longest incomplete UTF-8 sequence that can be carried between reads.
const MAX_CARRY: usize = 3;

/// Streaming UTF-8 decoder.
///
/// Invalid byte sequences decode to U+FFFD, one replacement per maximal
/// invalid subsequence, matching `String::from_utf8_lossy`.
///
/// # Examples
///
/// ```
/// use fleetmux::io::Utf8StreamDecoder;
///
/// let bytes = "café".as_bytes();
/// let mut decoder = Utf8StreamDecoder::new();
/// let mut text = decoder.decode(&bytes[..4]);
/// text.push_str(&decoder.decode(&bytes[4..]));
/// text.push_str(&decoder.finish());
/// assert_eq!(text, "café");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Utf8StreamDecoder {
    carry: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Creates a decoder with nothing carried.
    #[must_use]
    pub const fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Decodes the next read.
    ///
    /// Bytes of a character that is not yet complete are kept for the next
    /// call and do not appear in the returned text.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.carry);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, invalid) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &invalid[len..];
                        }
                        None => {
                            debug_assert!(invalid.len() <= MAX_CARRY);
                            self.carry = invalid.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flushes the decoder at end of stream.
    ///
    /// A truncated trailing sequence decodes to U+FFFD.
    pub fn finish(&mut self) -> String {
        let carry = std::mem::take(&mut self.carry);
        String::from_utf8_lossy(&carry).into_owned()
    }

    /// Number of bytes carried to the next read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}
