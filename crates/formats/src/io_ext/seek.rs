use std::io::{self, Seek, SeekFrom};

pub trait SeekExt: Seek {
    /// Advances to the next multiple of `alignment` strictly past the
    /// current position. Always moves, even when already aligned.
    fn seek_past_alignment(&mut self, alignment: u64) -> io::Result<u64>;

    /// Advances to the next multiple of `alignment` unless the position,
    /// measured from `shift`, is already aligned.
    fn seek_until_alignment(&mut self, alignment: u64, shift: u64) -> io::Result<u64>;
}

impl<T: Seek> SeekExt for T {
    fn seek_past_alignment(&mut self, alignment: u64) -> io::Result<u64> {
        let current = self.stream_position()?;
        self.seek(SeekFrom::Start((current / alignment) * alignment + alignment))
    }

    fn seek_until_alignment(&mut self, alignment: u64, shift: u64) -> io::Result<u64> {
        let current = self.stream_position()?;
        if current % alignment == shift % alignment {
            Ok(current)
        } else {
            self.seek_past_alignment(alignment)
        }
    }
}
