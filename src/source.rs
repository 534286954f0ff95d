//! Input side of a build: an ordered list of files and a way to read them.

use std::io;

/// One input file as reported by a [`ByteSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path segments; the first one names the common root folder
    pub segments: Vec<String>,
    /// File size in bytes
    pub size: u64,
}

impl SourceEntry {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>, size: u64) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            size,
        }
    }

    /// Slash-joined path, for diagnostics
    pub fn display_path(&self) -> String {
        self.segments.join("/")
    }
}

/// Ordered files plus random access to their bytes.
///
/// Entry order is the order in which file bytes are concatenated into pieces.
pub trait ByteSource {
    fn entries(&self) -> &[SourceEntry];

    /// Fill `buf` with the bytes of entry `index` starting at `offset`.
    ///
    /// A short read is an error.
    fn read_at(&mut self, index: usize, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    fn total_size(&self) -> u64 {
        self.entries().iter().map(|e| e.size).sum()
    }
}

/// A source that keeps file contents in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<SourceEntry>,
    contents: Vec<Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; `segments` include the root folder for multi-file sets
    pub fn with_file<S: Into<String>>(
        mut self,
        segments: impl IntoIterator<Item = S>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        let data = data.into();
        self.entries.push(SourceEntry::new(segments, data.len() as u64));
        self.contents.push(data);
        self
    }
}

impl ByteSource for MemorySource {
    fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    fn read_at(&mut self, index: usize, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let data = self
            .contents
            .get(index)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))?;
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= data.len())
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_ranges() {
        let mut source = MemorySource::new()
            .with_file(["root", "a.bin"], vec![1u8, 2, 3])
            .with_file(["root", "b.bin"], vec![4u8, 5]);

        assert_eq!(source.entries().len(), 2);
        assert_eq!(source.total_size(), 5);
        assert_eq!(source.entries()[1].display_path(), "root/b.bin");

        let mut buf = [0u8; 2];
        source.read_at(0, 1, &mut buf).unwrap();
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_memory_source_short_read_fails() {
        let mut source = MemorySource::new().with_file(["a.bin"], vec![1u8, 2, 3]);
        let mut buf = [0u8; 4];
        let err = source.read_at(0, 0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(source.read_at(1, 0, &mut [0u8; 1]).is_err());
    }
}
