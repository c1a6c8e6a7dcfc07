// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ArchiveExtraction` (spec.md §4.3): decompress, then iterate entries
//! twice. The first pass rejects the whole extraction if any non-directory
//! entry would collide with an existing file, or if any entry's normalized
//! path escapes the destination. The second pass materializes directories,
//! regular files, symbolic/hard links, and (POSIX only) character/block/FIFO
//! special nodes, then applies mode, uid/gid, and mtime.
//!
//! Both passes run synchronously (the archive crates here are sync-only);
//! callers invoke this through `spawn_blocking`.

use crate::error::StepError;
use osconfig_core::ArchiveType;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
enum EntryKind {
    Regular,
    Directory,
    Symlink,
    HardLink,
    Fifo,
    CharDevice { major: u32, minor: u32 },
    BlockDevice { major: u32, minor: u32 },
}

struct Entry {
    path: PathBuf,
    kind: EntryKind,
    mode: Option<u32>,
    uid: Option<u32>,
    gid: Option<u32>,
    mtime: Option<i64>,
    contents: Vec<u8>,
    link_target: Option<PathBuf>,
}

/// Join `entry_path` onto `destination` and verify the normalized result is
/// still contained within `destination` (spec.md §8 law 7).
fn resolve_within(destination: &Path, entry_path: &Path) -> Result<PathBuf, StepError> {
    let mut normalized = PathBuf::new();
    for component in entry_path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(StepError::PathTraversal {
                        entry: entry_path.display().to_string(),
                        destination: destination.display().to_string(),
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StepError::PathTraversal {
                    entry: entry_path.display().to_string(),
                    destination: destination.display().to_string(),
                });
            }
        }
    }
    Ok(destination.join(normalized))
}

fn read_tar_entries(reader: impl Read, destination: &Path) -> Result<Vec<Entry>, StepError> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();
    for raw in archive.entries().map_err(|e| StepError::Archive(e.to_string()))? {
        let mut raw = raw.map_err(|e| StepError::Archive(e.to_string()))?;
        let entry_path = raw.path().map_err(|e| StepError::Archive(e.to_string()))?.into_owned();
        let resolved = resolve_within(destination, &entry_path)?;
        let header = raw.header();
        let entry_type = header.entry_type();
        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_symlink() {
            EntryKind::Symlink
        } else if entry_type.is_hard_link() {
            EntryKind::HardLink
        } else if entry_type.is_fifo() {
            EntryKind::Fifo
        } else if entry_type.is_character_special() {
            let major = header.device_major().ok().flatten().unwrap_or(0);
            let minor = header.device_minor().ok().flatten().unwrap_or(0);
            EntryKind::CharDevice { major, minor }
        } else if entry_type.is_block_special() {
            let major = header.device_major().ok().flatten().unwrap_or(0);
            let minor = header.device_minor().ok().flatten().unwrap_or(0);
            EntryKind::BlockDevice { major, minor }
        } else {
            EntryKind::Regular
        };
        let mode = header.mode().ok();
        let uid = header.uid().ok().map(|v| v as u32);
        let gid = header.gid().ok().map(|v| v as u32);
        let mtime = header.mtime().ok().map(|v| v as i64);
        let link_target = raw
            .link_name()
            .ok()
            .flatten()
            .map(|l| l.into_owned());
        let mut contents = Vec::new();
        if matches!(kind, EntryKind::Regular) {
            raw.read_to_end(&mut contents).map_err(|e| StepError::Archive(e.to_string()))?;
        }
        entries.push(Entry { path: resolved, kind, mode, uid, gid, mtime, contents, link_target });
    }
    Ok(entries)
}

fn read_zip_entries(reader: impl Read + std::io::Seek, destination: &Path) -> Result<Vec<Entry>, StepError> {
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| StepError::Archive(e.to_string()))?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| StepError::Archive(e.to_string()))?;
        let entry_path = PathBuf::from(file.name());
        let resolved = resolve_within(destination, &entry_path)?;
        let kind = if file.is_dir() { EntryKind::Directory } else { EntryKind::Regular };
        let mode = file.unix_mode();
        let mut contents = Vec::new();
        if !file.is_dir() {
            file.read_to_end(&mut contents).map_err(|e| StepError::Archive(e.to_string()))?;
        }
        entries.push(Entry { path: resolved, kind, mode, uid: None, gid: None, mtime: None, contents, link_target: None });
    }
    Ok(entries)
}

fn decode_entries(archive_path: &Path, archive_type: ArchiveType, destination: &Path) -> Result<Vec<Entry>, StepError> {
    let file = fs::File::open(archive_path)?;
    match archive_type {
        ArchiveType::Tar => read_tar_entries(file, destination),
        ArchiveType::TarGzip => read_tar_entries(flate2::read::GzDecoder::new(file), destination),
        ArchiveType::TarBzip => read_tar_entries(bzip2::read::BzDecoder::new(file), destination),
        // xz2's decoder auto-detects the liblzma container it's given; legacy
        // .lzma streams and .xz streams both decode through the same reader.
        ArchiveType::TarLzma | ArchiveType::TarXz => read_tar_entries(xz2::read::XzDecoder::new(file), destination),
        ArchiveType::Zip => read_zip_entries(file, destination),
    }
}

/// Extract `archive_path` into `destination`, applying the two-pass
/// collision/traversal defense before writing anything.
pub fn extract(archive_path: &Path, destination: &Path, archive_type: ArchiveType) -> Result<(), StepError> {
    let entries = decode_entries(archive_path, archive_type, destination)?;

    // Pass 1: reject collisions. Existing directories are tolerated.
    for entry in &entries {
        if entry.kind != EntryKind::Directory && entry.path.exists() {
            return Err(StepError::EntryCollision { entry: entry.path.display().to_string() });
        }
    }

    // Pass 2: materialize.
    for entry in &entries {
        if let Some(parent) = entry.path.parent() {
            fs::create_dir_all(parent)?;
        }
        match &entry.kind {
            EntryKind::Directory => {
                fs::create_dir_all(&entry.path)?;
                continue;
            }
            EntryKind::Symlink => {
                let target = entry.link_target.as_ref().ok_or_else(|| StepError::Archive(format!("symlink entry {} has no target", entry.path.display())))?;
                #[cfg(unix)]
                std::os::unix::fs::symlink(target, &entry.path)?;
                #[cfg(not(unix))]
                return Err(platform_mismatch(&entry.path, "symlink"));
                continue;
            }
            EntryKind::HardLink => {
                let target = entry.link_target.as_ref().ok_or_else(|| StepError::Archive(format!("hard link entry {} has no target", entry.path.display())))?;
                let resolved_target = resolve_within(destination, target)?;
                fs::hard_link(&resolved_target, &entry.path)?;
                continue;
            }
            EntryKind::Fifo | EntryKind::CharDevice { .. } | EntryKind::BlockDevice { .. } => {
                #[cfg(unix)]
                {
                    create_special_node(entry)?;
                }
                #[cfg(not(unix))]
                {
                    return Err(platform_mismatch(&entry.path, "POSIX special node"));
                }
            }
            EntryKind::Regular => {
                fs::write(&entry.path, &entry.contents)?;
            }
        }

        #[cfg(unix)]
        if let Some(mode) = entry.mode {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&entry.path, fs::Permissions::from_mode(mode))?;
        }
        #[cfg(unix)]
        apply_ownership_and_times(entry);
    }
    Ok(())
}

#[cfg(not(unix))]
fn platform_mismatch(path: &Path, detail: &str) -> StepError {
    StepError::PlatformMismatch {
        step: "ArchiveExtraction",
        detail: format!("{detail} for {} unsupported on this platform", path.display()),
    }
}

#[cfg(unix)]
fn create_special_node(entry: &Entry) -> Result<(), StepError> {
    use nix::sys::stat::{mknod, Mode, SFlag};

    let mode = Mode::from_bits_truncate(entry.mode.unwrap_or(0o644));
    match entry.kind {
        EntryKind::Fifo => mknod(&entry.path, SFlag::S_IFIFO, mode, 0),
        EntryKind::CharDevice { major, minor } => {
            mknod(&entry.path, SFlag::S_IFCHR, mode, nix::sys::stat::makedev(major as u64, minor as u64))
        }
        EntryKind::BlockDevice { major, minor } => {
            mknod(&entry.path, SFlag::S_IFBLK, mode, nix::sys::stat::makedev(major as u64, minor as u64))
        }
        _ => unreachable!("create_special_node called with a non-special entry"),
    }
    .map_err(|e| StepError::Archive(format!("mknod {}: {e}", entry.path.display())))
}

/// Best-effort: archives created by an unprivileged process rarely carry
/// uid/gid this process is allowed to assume, so failures here are logged
/// and swallowed rather than failing the whole extraction.
#[cfg(unix)]
fn apply_ownership_and_times(entry: &Entry) {
    if entry.uid.is_some() || entry.gid.is_some() {
        let uid = entry.uid.map(nix::unistd::Uid::from_raw);
        let gid = entry.gid.map(nix::unistd::Gid::from_raw);
        if let Err(err) = nix::unistd::chown(&entry.path, uid, gid) {
            tracing::debug!(path = %entry.path.display(), %err, "leaving archive entry ownership unchanged");
        }
    }
    if let Some(mtime) = entry.mtime {
        use nix::sys::stat::{utimensat, UtimensatFlags};
        use nix::sys::time::TimeSpec;
        let ts = TimeSpec::new(mtime, 0);
        if let Err(err) = utimensat(None, &entry.path, &ts, &ts, UtimensatFlags::NoFollowSymlink) {
            tracing::debug!(path = %entry.path.display(), %err, "leaving archive entry mtime unchanged");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tar(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let archive_path = dir.join("a.tar");
        let file = fs::File::create(&archive_path).unwrap();
        let mut builder = tar::Builder::new(file);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *contents).unwrap();
        }
        builder.into_inner().unwrap().flush().unwrap();
        archive_path
    }

    #[test]
    fn extracts_regular_files_preserving_structure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive = write_tar(dir.path(), &[("a/b.txt", b"hi")]);
        extract(&archive, &dest, ArchiveType::Tar).unwrap();
        assert_eq!(fs::read(dest.join("a/b.txt")).unwrap(), b"hi");
    }

    #[test]
    fn rejects_path_traversal_without_writing_anything() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive = write_tar(dir.path(), &[("../etc/passwd", b"evil" as &[u8])]);
        let err = extract(&archive, &dest, ArchiveType::Tar).unwrap_err();
        assert!(matches!(err, StepError::PathTraversal { .. }));
        assert!(fs::read_dir(&dest).unwrap().next().is_none());
    }

    #[test]
    fn rejects_collision_with_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), b"existing").unwrap();
        let archive = write_tar(dir.path(), &[("a.txt", b"new")]);
        let err = extract(&archive, &dest, ArchiveType::Tar).unwrap_err();
        assert!(matches!(err, StepError::EntryCollision { .. }));
    }

    #[test]
    fn tolerates_collision_with_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(dest.join("a")).unwrap();
        let archive = write_tar(dir.path(), &[("a/b.txt", b"hi")]);
        extract(&archive, &dest, ArchiveType::Tar).unwrap();
        assert_eq!(fs::read(dest.join("a/b.txt")).unwrap(), b"hi");
    }

    #[test]
    fn extracts_hard_links_pointing_at_an_earlier_entry() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive_path = dir.path().join("a.tar");
        let file = fs::File::create(&archive_path).unwrap();
        let mut builder = tar::Builder::new(file);

        let mut original = tar::Header::new_gnu();
        original.set_size(2);
        original.set_mode(0o644);
        original.set_entry_type(tar::EntryType::Regular);
        original.set_cksum();
        builder.append_data(&mut original, "a.txt", &b"hi"[..]).unwrap();

        let mut link = tar::Header::new_gnu();
        link.set_size(0);
        link.set_entry_type(tar::EntryType::Link);
        link.set_cksum();
        builder.append_link(&mut link, "b.txt", "a.txt").unwrap();
        builder.into_inner().unwrap().flush().unwrap();

        extract(&archive_path, &dest, ArchiveType::Tar).unwrap();
        assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"hi");
    }

    #[test]
    #[cfg(unix)]
    fn extracts_a_fifo_special_node() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        let archive_path = dir.path().join("a.tar");
        let file = fs::File::create(&archive_path).unwrap();
        let mut builder = tar::Builder::new(file);

        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Fifo);
        header.set_cksum();
        builder.append_data(&mut header, "pipe", &b""[..]).unwrap();
        builder.into_inner().unwrap().flush().unwrap();

        extract(&archive_path, &dest, ArchiveType::Tar).unwrap();
        use std::os::unix::fs::FileTypeExt;
        assert!(fs::metadata(dest.join("pipe")).unwrap().file_type().is_fifo());
    }
}
