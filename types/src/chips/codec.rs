use bytes::{Buf, BufMut};
use commonware_codec::{Error, ReadExt, Write};

use super::MAX_OUTCOME_NAME_LENGTH;

/// Writes an outcome name as length-prefixed UTF-8 bytes.
pub fn write_name(name: &str, writer: &mut impl BufMut) {
    let bytes = name.as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Reads a length-prefixed outcome name, rejecting names longer than `max_len`.
pub fn read_name(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("Name", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("Name", "invalid UTF-8"))
}

/// Reads an outcome name bounded by [MAX_OUTCOME_NAME_LENGTH].
pub fn read_outcome_name(reader: &mut impl Buf) -> Result<String, Error> {
    read_name(reader, MAX_OUTCOME_NAME_LENGTH)
}

pub fn name_encode_size(name: &str) -> usize {
    4 + name.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    #[test]
    fn read_name_rejects_too_long() {
        let mut buf = BytesMut::new();
        (7u32).write(&mut buf);
        buf.extend_from_slice(b"Banker!");

        let mut reader = buf.as_ref();
        let err = read_name(&mut reader, 6).expect_err("should reject too-long name");
        assert!(matches!(err, Error::Invalid("Name", "too long")));
    }

    #[test]
    fn read_name_rejects_truncated_buffers() {
        let mut buf = BytesMut::new();
        (3u32).write(&mut buf);
        buf.extend_from_slice(b"Ti");

        let mut reader = buf.as_ref();
        let err = read_name(&mut reader, 10).expect_err("should reject truncated buffer");
        assert!(matches!(err, Error::EndOfBuffer));
    }

    #[test]
    fn read_name_rejects_invalid_utf8() {
        let mut buf = BytesMut::new();
        (2u32).write(&mut buf);
        buf.extend_from_slice(&[0xc3, 0x28]);

        let mut reader = buf.as_ref();
        let err = read_name(&mut reader, 10).expect_err("should reject invalid UTF-8");
        assert!(matches!(err, Error::Invalid("Name", "invalid UTF-8")));
    }

    #[test]
    fn write_then_read_name() {
        let mut buf = BytesMut::new();
        write_name("Player", &mut buf);
        assert_eq!(buf.len(), name_encode_size("Player"));

        let mut reader = buf.as_ref();
        assert_eq!(read_outcome_name(&mut reader).unwrap(), "Player");
    }

    #[test]
    fn read_name_survives_garbage() {
        let mut rng = StdRng::seed_from_u64(0x00c0_ffee);
        for _ in 0..500 {
            let len = (rng.next_u32() as usize) % 128;
            let mut buf = vec![0u8; len];
            rng.fill_bytes(&mut buf);
            let mut reader = buf.as_slice();
            if let Ok(name) = read_outcome_name(&mut reader) {
                assert!(name.len() <= MAX_OUTCOME_NAME_LENGTH);
            }
        }
    }
}
