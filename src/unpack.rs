use crate::error::{EsfetchError, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
}

pub fn detect_format(path: &Path) -> Result<ArchiveFormat> {
    let kind = infer::get_from_path(path)?;
    match kind.map(|k| k.mime_type()) {
        Some("application/gzip") => Ok(ArchiveFormat::TarGz),
        Some("application/x-tar") => Ok(ArchiveFormat::Tar),
        _ => Err(EsfetchError::UnsupportedArchive(path.to_path_buf())),
    }
}

/// Extract `archive` into `dest`, dropping the first `strip` components of
/// every entry path. Returns the number of entries written.
pub fn unpack_stripped(archive: &Path, dest: &Path, strip: usize) -> Result<usize> {
    let format = detect_format(archive)?;
    let file = File::open(archive)?;
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveFormat::Tar => Box::new(file),
    };

    let mut tarball = Archive::new(reader);
    tarball.set_preserve_permissions(true);

    let mut unpacked = 0;
    let entries = tarball
        .entries()
        .map_err(|e| EsfetchError::extract(archive, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| EsfetchError::extract(archive, e))?;
        let original = entry
            .path()
            .map_err(|e| EsfetchError::extract(archive, e))?
            .into_owned();

        let Some(relative) = strip_components(&original, strip)? else {
            continue;
        };
        let target = dest.join(&relative);
        reject_symlinked_parents(archive, dest, &relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| EsfetchError::extract(archive, e))?;
        }
        // An earlier symlink entry at the same path must not be written through.
        if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(&target).map_err(|e| EsfetchError::extract(archive, e))?;
        }

        if entry.header().entry_type() == EntryType::Link {
            let link = entry
                .link_name()
                .map_err(|e| EsfetchError::extract(archive, e))?
                .ok_or_else(|| EsfetchError::extract(archive, "hard link without a target"))?
                .into_owned();
            let Some(link_relative) = strip_components(&link, strip)? else {
                return Err(EsfetchError::extract(
                    archive,
                    format!("hard link {} points outside the archive root", original.display()),
                ));
            };
            reject_symlinked_parents(archive, dest, &link_relative)?;
            fs::hard_link(dest.join(link_relative), &target)
                .map_err(|e| EsfetchError::extract(archive, e))?;
        } else {
            entry
                .unpack(&target)
                .map_err(|e| EsfetchError::extract(archive, e))?;
        }
        unpacked += 1;
    }

    debug!(
        "Unpacked {unpacked} entries from {} into {}",
        archive.display(),
        dest.display()
    );
    Ok(unpacked)
}

/// `Ok(None)` when nothing is left after stripping. Paths that would escape
/// the destination are an error.
fn strip_components(path: &Path, strip: usize) -> Result<Option<PathBuf>> {
    let mut kept = PathBuf::new();
    for component in path
        .components()
        .filter(|c| !matches!(c, Component::CurDir | Component::RootDir))
        .skip(strip)
    {
        match component {
            Component::Normal(part) => kept.push(part),
            _ => {
                return Err(EsfetchError::extract(
                    path,
                    "entry path escapes the extraction directory",
                ))
            }
        }
    }
    Ok(if kept.as_os_str().is_empty() {
        None
    } else {
        Some(kept)
    })
}

/// Every directory between `dest` and the last component of `relative` must
/// be a real directory, so nothing is written through a link an earlier
/// entry planted.
fn reject_symlinked_parents(archive: &Path, dest: &Path, relative: &Path) -> Result<()> {
    let Some(parent) = relative.parent() else {
        return Ok(());
    };
    let mut current = dest.to_path_buf();
    for component in parent.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(EsfetchError::extract(
                    archive,
                    format!("{} traverses a symbolic link", relative.display()),
                ))
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(EsfetchError::extract(archive, e)),
        }
    }
    Ok(())
}
