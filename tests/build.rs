use std::fs;

use piecewright::hashing::hash_piece;
use piecewright::{BuildError, FsSource, Layout, TorrentBuilder, TorrentOptions};

fn options(piece_length: u64) -> TorrentOptions {
    TorrentOptions {
        announce: "https://tracker.example/announce".to_string(),
        source: "TEST".to_string(),
        piece_length: Some(piece_length),
        creation_date: Some(1_234_567_890),
        entropy: Some(7),
    }
}

#[test]
fn test_directory_pieces_span_files() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let content_dir = tmp_dir.path().join("content");
    fs::create_dir(&content_dir).unwrap();
    fs::write(content_dir.join("a.bin"), [0x01u8, 0x02, 0x03]).unwrap();
    fs::write(content_dir.join("b.bin"), [0x04u8, 0x05]).unwrap();

    let source = FsSource::scan(&content_dir, None, &[]).unwrap();
    let torrent = TorrentBuilder::new(source, options(4)).build().unwrap();

    assert_eq!(torrent.name(), "content");
    assert_eq!(
        torrent.metainfo.info.pieces,
        vec![hash_piece(&[1, 2, 3, 4]), hash_piece(&[5])]
    );
    match &torrent.metainfo.info.layout {
        Layout::Multi { files } => {
            assert_eq!(files.len(), 2);
            assert_eq!(files[0].path, vec!["a.bin"]);
            assert_eq!(files[0].length, 3);
            assert_eq!(files[1].path, vec!["b.bin"]);
            assert_eq!(files[1].length, 2);
        }
        other => panic!("expected multi-file layout, got {:?}", other),
    }
}

#[test]
fn test_single_file_from_disk() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let file_path = tmp_dir.path().join("test_file.txt");
    let content = b"Hello World! This is a test file for piecewright.";
    fs::write(&file_path, content).unwrap();

    let source = FsSource::scan(&file_path, None, &[]).unwrap();
    let torrent = TorrentBuilder::new(source, options(16)).build().unwrap();

    assert_eq!(torrent.name(), "test_file.txt");
    assert_eq!(
        torrent.metainfo.info.layout,
        Layout::Single { length: content.len() as u64 }
    );
    let expected: Vec<_> = content.chunks(16).map(hash_piece).collect();
    assert_eq!(torrent.metainfo.info.pieces, expected);
}

#[test]
fn test_nested_directories_and_large_pieces() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let root = tmp_dir.path().join("show");
    fs::create_dir_all(root.join("s01")).unwrap();
    fs::create_dir_all(root.join("s02")).unwrap();
    let e1 = vec![0xabu8; 100_000];
    let e2 = vec![0xcdu8; 50_001];
    fs::write(root.join("s01").join("e01.mkv"), &e1).unwrap();
    fs::write(root.join("s02").join("e01.mkv"), &e2).unwrap();

    let source = FsSource::scan(&root, None, &[]).unwrap();
    let torrent = TorrentBuilder::new(source, options(1 << 15))
        .with_threads(3)
        .build()
        .unwrap();

    let stream: Vec<u8> = [e1, e2].concat();
    let expected: Vec<_> = stream.chunks(1 << 15).map(hash_piece).collect();
    assert_eq!(torrent.metainfo.info.pieces, expected);
    assert_eq!(torrent.metainfo.info.total_size(), 150_001);
}

#[test]
fn test_empty_directory_fails() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let root = tmp_dir.path().join("empty");
    fs::create_dir(&root).unwrap();

    let source = FsSource::scan(&root, None, &[]).unwrap();
    let result = TorrentBuilder::new(source, options(4)).build();
    assert!(matches!(result, Err(BuildError::EmptyInput)));
}

#[test]
fn test_file_shrinking_after_scan_is_an_io_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let file_path = tmp_dir.path().join("volatile.bin");
    fs::write(&file_path, [1u8; 64]).unwrap();

    let source = FsSource::scan(&file_path, None, &[]).unwrap();
    fs::write(&file_path, [1u8; 10]).unwrap();

    let result = TorrentBuilder::new(source, options(16)).build();
    match result {
        Err(BuildError::Io { path, .. }) => assert_eq!(path, "volatile.bin"),
        other => panic!("expected io error, got {:?}", other.map(|t| t.bytes.len())),
    }
}
