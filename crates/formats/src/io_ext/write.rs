use std::io::{self, Seek, SeekFrom, Write};

use byteorder::{WriteBytesExt, LE};

pub trait WriteFormatsExt {
    /// Writes each character as `codepoint & 0xFF` followed by a NUL byte.
    /// Intended for text already known to stay in the Latin-1 range.
    fn write_cstring(&mut self, text: &str) -> io::Result<()>;

    /// Writes the text as little-endian UTF-16 units followed by a NUL unit.
    fn write_utf16(&mut self, text: &str) -> io::Result<()>;

    /// Writes a float-derived byte. NaN writes 0; other values clamp to
    /// [0, 255] before truncation.
    fn write_u8_clamped(&mut self, value: f32) -> io::Result<()>;

    /// Writes a float-derived signed byte. NaN writes 0; other values clamp
    /// to [-128, 127] before truncation.
    fn write_i8_clamped(&mut self, value: f32) -> io::Result<()>;

    /// Overwrites the u32 at `offset`, leaving the cursor where it was.
    /// `offset + 4` must not exceed the current length.
    fn write_u32_at(&mut self, offset: u64, value: u32) -> io::Result<()>;

    /// Overwrites the u64 at `offset`, leaving the cursor where it was.
    /// `offset + 8` must not exceed the current length.
    fn write_u64_at(&mut self, offset: u64, value: u64) -> io::Result<()>;

    /// Appends zero bytes until the length is a multiple of `alignment`.
    fn pad_until_alignment(&mut self, alignment: u64) -> io::Result<()>;
}

impl<W: Write + Seek> WriteFormatsExt for W {
    fn write_cstring(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            self.write_u8((ch as u32 & 0xFF) as u8)?;
        }

        self.write_u8(0)
    }

    fn write_utf16(&mut self, text: &str) -> io::Result<()> {
        for unit in text.encode_utf16() {
            self.write_u16::<LE>(unit)?;
        }

        self.write_u16::<LE>(0)
    }

    fn write_u8_clamped(&mut self, value: f32) -> io::Result<()> {
        let value = if value.is_nan() { 0.0 } else { value };
        self.write_u8(value.clamp(0.0, 255.0) as u8)
    }

    fn write_i8_clamped(&mut self, value: f32) -> io::Result<()> {
        let value = if value.is_nan() { 0.0 } else { value };
        self.write_i8(value.clamp(-128.0, 127.0) as i8)
    }

    fn write_u32_at(&mut self, offset: u64, value: u32) -> io::Result<()> {
        let end = self.stream_position()?;
        self.seek(SeekFrom::Start(offset))?;
        self.write_u32::<LE>(value)?;
        self.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn write_u64_at(&mut self, offset: u64, value: u64) -> io::Result<()> {
        let end = self.stream_position()?;
        self.seek(SeekFrom::Start(offset))?;
        self.write_u64::<LE>(value)?;
        self.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn pad_until_alignment(&mut self, alignment: u64) -> io::Result<()> {
        let length = self.stream_position()?;
        for _ in 0..(alignment - length % alignment) % alignment {
            self.write_u8(0)?;
        }

        Ok(())
    }
}
