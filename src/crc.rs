/// Sensirion CRC-8 (polynomial 0x31, init 0xFF) over one data word.
pub(crate) fn crc(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for byte in data.iter().copied() {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 == 0 {
                crc <<= 1;
            } else {
                crc = (crc << 1) ^ 0x31u8;
            }
        }
    }
    crc
}

/// Encodes `words` big-endian into `buf`, each word followed by its CRC.
///
/// Returns the number of bytes written. `buf` must hold `3 * words.len()` bytes.
pub(crate) fn encode_words(words: &[u16], buf: &mut [u8]) -> usize {
    for (word, chunk) in words.iter().zip(buf.chunks_exact_mut(3)) {
        let bytes = word.to_be_bytes();
        chunk[0] = bytes[0];
        chunk[1] = bytes[1];
        chunk[2] = crc(&bytes);
    }
    words.len() * 3
}
