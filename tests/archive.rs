//! Directories read and written as tar streams.

mod common;

use std::io::{self, Cursor, Read, Write};

use capfs::*;
use common::MemFs;
use tar::{Builder, EntryType, Header};

fn ctx() -> Context {
    Context::background()
}

fn write(fsys: &SharedFs, name: &str, data: &[u8]) {
    ops::write_file(&ctx(), fsys, name, data).unwrap();
}

fn read(fsys: &SharedFs, name: &str) -> Vec<u8> {
    ops::read_file(&ctx(), fsys, name).unwrap()
}

/// src/a.txt, src/link -> a.txt, src/sub/b.txt
fn populate(fsys: &SharedFs) {
    write(fsys, "src/a.txt", b"alpha");
    write(fsys, "src/sub/b.txt", b"beta");
    ops::symlink(&ctx(), fsys, "a.txt", "src/link").unwrap();
}

#[derive(Debug, PartialEq)]
struct Item {
    name: String,
    kind: EntryType,
    data: Vec<u8>,
    link: Option<String>,
}

fn items(bytes: Vec<u8>) -> Vec<Item> {
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = String::from_utf8_lossy(&entry.path_bytes())
                .trim_end_matches('/')
                .to_string();
            let link = entry
                .link_name_bytes()
                .map(|b| String::from_utf8_lossy(&b).into_owned());
            let kind = entry.header().entry_type();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            Item {
                name,
                kind,
                data,
                link,
            }
        })
        .collect()
}

fn copy_dir(fsys: &SharedFs, from: &str, to: &str) {
    let mut reader = ops::open(&ctx(), fsys, from).unwrap();
    let mut writer = ops::create(&ctx(), fsys, to).unwrap();
    io::copy(&mut reader, &mut writer).unwrap();
    writer.close().unwrap();
    reader.close().unwrap();
}

#[test]
fn open_directory_produces_tar() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);

    let bytes = read(&fsys, "src/");
    let found = items(bytes);

    let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "link", "sub", "sub/b.txt"]);

    assert_eq!(found[0].kind, EntryType::Regular);
    assert_eq!(found[0].data, b"alpha");
    assert_eq!(found[1].kind, EntryType::Symlink);
    assert_eq!(found[1].link.as_deref(), Some("a.txt"));
    assert_eq!(found[2].kind, EntryType::Directory);
    assert_eq!(found[3].data, b"beta");
}

#[test]
fn directory_without_trailing_separator_is_detected_by_stat() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);

    let names: Vec<_> = items(read(&fsys, "src"))
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, ["a.txt", "link", "sub", "sub/b.txt"]);
}

#[test]
fn opening_missing_directory_fails_immediately() {
    let fsys = MemFs::basic().shared();
    let err = ops::open(&ctx(), &fsys, "missing/").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn tar_round_trip_between_directories() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);

    copy_dir(&fsys, "src/", "dst/");

    assert_eq!(read(&fsys, "dst/a.txt"), b"alpha");
    assert_eq!(read(&fsys, "dst/sub/b.txt"), b"beta");
    assert_eq!(ops::readlink(&ctx(), &fsys, "dst/link").unwrap(), "a.txt");
    assert_eq!(read(&fsys, "src/a.txt"), b"alpha");
}

#[test]
fn directory_rename_falls_back_to_tar_copy() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);

    ops::rename(&ctx(), &fsys, "src", "moved").unwrap();

    assert_eq!(read(&fsys, "moved/sub/b.txt"), b"beta");
    assert_eq!(ops::readlink(&ctx(), &fsys, "moved/link").unwrap(), "a.txt");
    let err = ops::stat(&ctx(), &fsys, "src").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn create_directory_drops_stale_entries() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);
    write(&fsys, "dst/stale.txt", b"old");
    write(&fsys, "dst/deep/stale.txt", b"old");

    copy_dir(&fsys, "src/", "dst/");

    let mut names: Vec<_> = ops::read_dir(&ctx(), &fsys, "dst")
        .unwrap()
        .map(|e| e.unwrap().name)
        .collect();
    names.sort();
    assert_eq!(names, ["a.txt", "link", "sub"]);
}

#[test]
fn append_directory_merges_entries() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);
    write(&fsys, "dst/other.txt", b"keep");
    write(&fsys, "dst/a.txt", b"old");

    let mut reader = ops::open(&ctx(), &fsys, "src/").unwrap();
    let mut writer = ops::append(&ctx(), &fsys, "dst/").unwrap();
    io::copy(&mut reader, &mut writer).unwrap();
    writer.close().unwrap();

    assert_eq!(read(&fsys, "dst/other.txt"), b"keep");
    assert_eq!(read(&fsys, "dst/a.txt"), b"alpha");
    assert_eq!(read(&fsys, "dst/sub/b.txt"), b"beta");
}

#[test]
fn truncate_directory_only_to_zero() {
    let fsys = MemFs::basic().shared();
    populate(&fsys);

    let err = ops::truncate(&ctx(), &fsys, "src", 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    ops::truncate(&ctx(), &fsys, "src/", 0).unwrap();

    assert!(ops::stat(&ctx(), &fsys, "src").unwrap().is_dir());
    let remaining = ops::read_dir(&ctx(), &fsys, "src").unwrap().collect_all().unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn extraction_applies_header_modes() {
    let mut builder = Builder::new(Vec::new());
    let mut dir = Header::new_gnu();
    dir.set_entry_type(EntryType::Directory);
    dir.set_mode(0o700);
    dir.set_size(0);
    builder.append_data(&mut dir, "private/", io::empty()).unwrap();

    let mut key = Header::new_gnu();
    key.set_entry_type(EntryType::Regular);
    key.set_mode(0o600);
    key.set_size(6);
    builder.append_data(&mut key, "private/key", &b"secret"[..]).unwrap();
    let bytes = builder.into_inner().unwrap();

    let fsys = MemFs::basic().shared();
    let mut writer = ops::create(&ctx(), &fsys, "dst/").unwrap();
    writer.write_all(&bytes).unwrap();
    writer.close().unwrap();

    assert_eq!(ops::stat(&ctx(), &fsys, "dst/private").unwrap().mode.perm(), 0o700);
    assert_eq!(ops::stat(&ctx(), &fsys, "dst/private/key").unwrap().mode.perm(), 0o600);
    assert_eq!(read(&fsys, "dst/private/key"), b"secret");
}

#[test]
fn extraction_rejects_escaping_entries() {
    let mut header = Header::new_old();
    header.as_old_mut().name[..7].copy_from_slice(b"../evil");
    header.set_entry_type(EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(4);
    header.set_cksum();
    let mut builder = Builder::new(Vec::new());
    builder.append(&header, &b"evil"[..]).unwrap();
    let bytes = builder.into_inner().unwrap();

    let fsys = MemFs::basic().shared();
    let mut writer = ops::create(&ctx(), &fsys, "dst/").unwrap();
    let err = match writer.write_all(&bytes) {
        Err(e) => FsError::from_io("write", "dst/", e),
        Ok(()) => writer.close().unwrap_err(),
    };

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(ops::stat(&ctx(), &fsys, "evil").unwrap_err().is_not_found());
}

#[test]
fn closing_writer_without_archive_data_is_ok() {
    let fsys = MemFs::basic().shared();
    let writer = ops::create(&ctx(), &fsys, "empty/").unwrap();
    writer.close().unwrap();
    assert!(ops::stat(&ctx(), &fsys, "empty").unwrap().is_dir());
}
