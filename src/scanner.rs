use anyhow::{Context, Result};
use glob::Pattern;
use jwalk::WalkDir;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::source::{ByteSource, SourceEntry};

/// Files found under a path on disk, readable as a [`ByteSource`]
#[derive(Debug)]
pub struct FsSource {
    entries: Vec<SourceEntry>,
    full_paths: Vec<PathBuf>,
    open: Option<(usize, File)>,
}

impl FsSource {
    /// Scan a file or directory.
    ///
    /// A single file becomes one entry named after the file. For a directory
    /// every regular file below it becomes an entry whose first segment is the
    /// directory name. Entries are sorted by path so repeated scans produce
    /// the same piece layout.
    pub fn scan(
        source: &Path,
        output_file: Option<&Path>,
        exclude_patterns: &[String],
    ) -> Result<Self> {
        let source = source
            .canonicalize()
            .with_context(|| format!("Failed to resolve source path: {}", source.display()))?;

        let output_canonical = output_file.and_then(|p| p.canonicalize().ok());

        let mut patterns = Vec::new();
        for pattern_str in exclude_patterns {
            match Pattern::new(pattern_str) {
                Ok(p) => patterns.push(p),
                Err(e) => warn!(pattern = %pattern_str, error = %e, "ignoring invalid glob pattern"),
            }
        }

        let root_name = source
            .file_name()
            .context("Source path has no file name")?
            .to_string_lossy()
            .to_string();

        let mut files: Vec<(SourceEntry, PathBuf)> = Vec::new();

        if source.is_file() {
            let len = source
                .metadata()
                .context("Failed to read file metadata")?
                .len();
            debug!(path = %source.display(), len, "single file");
            files.push((SourceEntry::new([root_name], len), source.clone()));
        } else {
            for entry in WalkDir::new(&source) {
                let entry = entry.context("Failed to read directory entry")?;
                if entry.file_type().is_dir() {
                    continue;
                }
                let entry_path = entry.path();

                // jwalk reports link metadata, not the target's
                if entry.file_type().is_symlink() {
                    debug!(path = %entry_path.display(), "skipping symlink");
                    continue;
                }

                if output_canonical.as_deref() == Some(entry_path.as_path()) {
                    debug!(path = %entry_path.display(), "skipping output file");
                    continue;
                }

                // `source` is canonical, so jwalk yields absolute paths below it
                let relative_path = entry_path
                    .strip_prefix(&source)
                    .context("Failed to create relative path")?;

                let file_name = entry.file_name().to_string_lossy();
                let relative_path_str = relative_path.to_string_lossy();
                if patterns
                    .iter()
                    .any(|p| p.matches(&file_name) || p.matches(&relative_path_str))
                {
                    debug!(path = %relative_path.display(), "excluded");
                    continue;
                }

                let len = entry
                    .metadata()
                    .context("Failed to read file metadata")?
                    .len();

                let segments = std::iter::once(root_name.clone()).chain(
                    relative_path
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().to_string()),
                );
                debug!(path = %relative_path.display(), len, "found file");
                files.push((SourceEntry::new(segments, len), entry_path.clone()));
            }
        }

        files.sort_by(|a, b| a.0.segments.cmp(&b.0.segments));
        let (entries, full_paths): (Vec<_>, Vec<_>) = files.into_iter().unzip();

        debug!(
            files = entries.len(),
            total = entries.iter().map(|e| e.size).sum::<u64>(),
            "scan complete"
        );

        Ok(Self {
            entries,
            full_paths,
            open: None,
        })
    }
}

impl ByteSource for FsSource {
    fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    fn read_at(&mut self, index: usize, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let file = match self.open.take() {
            Some((open_index, file)) if open_index == index => file,
            _ => {
                let path = self
                    .full_paths
                    .get(index)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))?;
                File::open(path)?
            }
        };
        let (_, file) = self.open.insert((index, file));
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.mkv");
        fs::write(&path, b"0123456789").unwrap();

        let mut source = FsSource::scan(&path, None, &[]).unwrap();
        assert_eq!(source.entries(), &[SourceEntry::new(["movie.mkv"], 10)]);

        let mut buf = [0u8; 4];
        source.read_at(0, 3, &mut buf).unwrap();
        assert_eq!(&buf, b"3456");
    }

    #[test]
    fn test_scan_directory_sorted_with_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("album");
        fs::create_dir_all(root.join("cd2")).unwrap();
        fs::write(root.join("cd2").join("01.flac"), b"bb").unwrap();
        fs::write(root.join("b.txt"), b"b").unwrap();
        fs::write(root.join("a.txt"), b"aaa").unwrap();
        fs::write(root.join("empty"), b"").unwrap();

        let source = FsSource::scan(&root, None, &[]).unwrap();
        let segments: Vec<Vec<String>> =
            source.entries().iter().map(|e| e.segments.clone()).collect();
        assert_eq!(
            segments,
            vec![
                vec!["album", "a.txt"],
                vec!["album", "b.txt"],
                vec!["album", "cd2", "01.flac"],
                vec!["album", "empty"],
            ]
        );
        assert_eq!(source.total_size(), 6);
    }

    #[test]
    fn test_scan_excludes_patterns_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("content");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("keep.txt"), b"keep").unwrap();
        fs::write(root.join("skip.tmp"), b"skip").unwrap();
        fs::write(root.join("content.torrent"), b"old").unwrap();

        let source = FsSource::scan(
            &root,
            Some(root.join("content.torrent").as_path()),
            &["*.tmp".to_string()],
        )
        .unwrap();
        assert_eq!(source.entries().len(), 1);
        assert_eq!(source.entries()[0].segments, vec!["content", "keep.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside.bin");
        fs::write(&outside, vec![1u8; 64]).unwrap();
        let root = dir.path().join("linked");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("alias.bin")).unwrap();

        let source = FsSource::scan(&root, None, &[]).unwrap();
        assert_eq!(source.entries(), &[SourceEntry::new(["linked", "real.txt"], 4)]);
    }

    #[test]
    fn test_read_past_end_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, b"abc").unwrap();

        let mut source = FsSource::scan(&path, None, &[]).unwrap();
        let mut buf = [0u8; 8];
        assert!(source.read_at(0, 0, &mut buf).is_err());
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsSource::scan(&dir.path().join("nope"), None, &[]).is_err());
    }
}
