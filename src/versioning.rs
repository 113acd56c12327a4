//! Versioned output naming
//!
//! Derived media (watermarked stills, thumbnails, GIFs) is written next to
//! its source as `<base>_VFX_<owner>_vNN<ext>`. Each new output takes the
//! next version number after the highest one already on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

const VFX_TAG: &str = "_VFX_";
const VERSION_TAG: &str = "_v";

/// Remove a trailing `_VFX_<owner>_vNN` from a file stem
///
/// Re-versioning an output must not stack suffixes, so
/// `shot_VFX_ana_v03` becomes `shot`. Stems without a well-formed suffix
/// are returned unchanged.
pub fn base_stem(stem: &str) -> &str {
    let Some((head, version)) = stem.rsplit_once(VERSION_TAG) else {
        return stem;
    };
    if version.len() != 2 || !version.bytes().all(|b| b.is_ascii_digit()) {
        return stem;
    }

    match head.rsplit_once(VFX_TAG) {
        Some((base, owner)) if !base.is_empty() && !owner.is_empty() && !owner.contains('_') => {
            base
        }
        _ => stem,
    }
}

/// Version number carried by `name`, if it is a `<prefix>NN…<ext>` output
fn version_of(name: &str, prefix: &str, ext: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?.strip_suffix(ext)?;
    let digits = rest.get(..2)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Compute the next versioned output path for `path`
///
/// # Arguments
/// * `path` - Source media file
/// * `owner` - Artist tag embedded in the name
/// * `ext` - Output extension including the dot; defaults to the source's
/// * `existing` - File names already present in the source's directory
///
/// # Example
/// ```rust
/// use std::path::Path;
/// use vfx_frames::next_version_name;
///
/// let existing = ["plate_VFX_ana_v01.png", "plate_VFX_ana_v02.png"];
/// let next = next_version_name(Path::new("shots/plate.png"), "ana", None, existing);
/// assert_eq!(next, Path::new("shots/plate_VFX_ana_v03.png"));
/// ```
#[instrument(skip(existing))]
pub fn next_version_name<I, S>(path: &Path, owner: &str, ext: Option<&str>, existing: I) -> PathBuf
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ext = match ext {
        Some(ext) => ext.to_string(),
        None => path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default(),
    };

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = base_stem(&stem);

    let prefix = format!("{}{}{}{}", base, VFX_TAG, owner, VERSION_TAG);
    let latest = existing
        .into_iter()
        .filter_map(|name| version_of(name.as_ref(), &prefix, &ext))
        .max()
        .unwrap_or(0);

    let next = latest + 1;
    debug!("Latest version of {}{} for {} is {}, next is {}", base, ext, owner, latest, next);

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}{:02}{}", prefix, next, ext))
}
