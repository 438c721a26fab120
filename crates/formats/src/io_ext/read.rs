use std::io::{self, ErrorKind, Read};

use byteorder::{ReadBytesExt, LE};

pub trait ReadFormatsExt {
    /// Reads single bytes up to a NUL terminator, decoding each byte as its
    /// own code point. Bytes above 127 map to U+0080..U+00FF rather than
    /// being validated as UTF-8.
    fn read_cstring(&mut self) -> io::Result<String>;

    /// Reads 16-bit little-endian units up to a NUL terminator, decoding
    /// each unit as one character. An unpaired surrogate is `InvalidData`.
    fn read_utf16(&mut self) -> io::Result<String>;

    /// Reads up to `length` bytes, stopping early when the input ends. The
    /// caller is expected to treat a short result as a warning, not a
    /// failure.
    fn read_bytes_upto(&mut self, length: usize) -> io::Result<Vec<u8>>;

    /// Skips `length` reserved bytes.
    fn read_padding(&mut self, length: usize) -> io::Result<()>;
}

impl<R: Read> ReadFormatsExt for R {
    fn read_cstring(&mut self) -> io::Result<String> {
        let mut text = String::new();

        loop {
            let byte = self.read_u8()?;
            if byte == 0x0 {
                break;
            }

            text.push(char::from(byte));
        }

        Ok(text)
    }

    fn read_utf16(&mut self) -> io::Result<String> {
        let mut text = String::new();

        loop {
            let unit = self.read_u16::<LE>()?;
            if unit == 0x0 {
                break;
            }

            text.push(
                char::from_u32(u32::from(unit)).ok_or(io::Error::from(ErrorKind::InvalidData))?,
            );
        }

        Ok(text)
    }

    fn read_bytes_upto(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        let mut filled = 0;

        while filled < length {
            let read = self.read(&mut bytes[filled..])?;
            if read == 0 {
                break;
            }

            filled += read;
        }

        bytes.truncate(filled);
        Ok(bytes)
    }

    fn read_padding(&mut self, length: usize) -> io::Result<()> {
        let mut buffer = [0u8; 16];
        let mut remaining = length;

        while remaining > 0 {
            let chunk = remaining.min(buffer.len());
            self.read_exact(&mut buffer[..chunk])?;
            remaining -= chunk;
        }

        Ok(())
    }
}
