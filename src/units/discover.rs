//! Template discovery in the source directory.
use anyhow::{Context as _, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::{UnitKind, UnitTemplate, is_template_name};
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// Iterate over every `mnt-*` template in `source_dir`, in name order.
///
/// The directory is listed up front so mount units can be paired with their
/// sibling automount; file contents are read lazily as the iterator advances.
/// Files that fail to read are skipped with a warning.
///
/// # Errors
///
/// Returns an error if `source_dir` cannot be listed.
pub fn discover<'a>(
    fs: &'a dyn FileSystemOps,
    source_dir: &Path,
    log: &'a dyn Log,
) -> Result<impl Iterator<Item = UnitTemplate> + 'a> {
    let names: BTreeSet<String> = fs
        .read_dir(source_dir)
        .with_context(|| format!("listing templates in {}", source_dir.display()))?
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
        .filter(|name| is_template_name(name))
        .collect();

    let automounts: BTreeSet<String> = names
        .iter()
        .filter(|name| UnitKind::from_file_name(name) == Some(UnitKind::Automount))
        .cloned()
        .collect();

    let source_dir: PathBuf = source_dir.to_path_buf();
    Ok(names.into_iter().filter_map(move |name| {
        let kind = UnitKind::from_file_name(&name)?;
        let path = source_dir.join(&name);
        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log.warn(&format!("skipping unreadable template {name}: {e}"));
                return None;
            }
        };

        let mut template = UnitTemplate::new(&name, kind, &content);
        if kind == UnitKind::Mount {
            let sibling = format!("{}.{}", template.stem(), UnitKind::Automount.extension());
            if automounts.contains(&sibling) {
                template.paired_automount = Some(sibling);
            }
        }
        log.debug(&format!("discovered template: {name}"));
        Some(template)
    }))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::operations::MockFileSystemOps;

    fn names(templates: &[UnitTemplate]) -> Vec<&str> {
        templates.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn finds_matching_templates_in_name_order() {
        let fs = MockFileSystemOps::new()
            .with_file("/src/mnt-b.swap", "[Swap]\nWhat=/swapfile\n")
            .with_file("/src/mnt-a.mount", "[Mount]\nWhat=/dev/sda1\n")
            .with_file("/src/README.md", "docs")
            .with_file("/src/home.mount", "[Mount]\nWhat=/dev/sdb1\n")
            .with_file("/src/mnt-c.service", "[Service]\n");
        let log = Logger::new("test");

        let found: Vec<_> = discover(&fs, Path::new("/src"), &log).unwrap().collect();
        assert_eq!(names(&found), vec!["mnt-a.mount", "mnt-b.swap"]);
        assert_eq!(found[0].kind, UnitKind::Mount);
        assert_eq!(found[1].kind, UnitKind::Swap);
    }

    #[test]
    fn pairs_mount_with_sibling_automount() {
        let fs = MockFileSystemOps::new()
            .with_file("/src/mnt-home.mount", "[Mount]\nWhat=//nas/home\n")
            .with_file("/src/mnt-home.automount", "[Automount]\nWhere=/mnt/home\n")
            .with_file("/src/mnt-data.mount", "[Mount]\nWhat=/dev/sda1\n");
        let log = Logger::new("test");

        let found: Vec<_> = discover(&fs, Path::new("/src"), &log).unwrap().collect();
        let home = found.iter().find(|t| t.name == "mnt-home.mount").unwrap();
        let data = found.iter().find(|t| t.name == "mnt-data.mount").unwrap();
        assert_eq!(home.paired_automount.as_deref(), Some("mnt-home.automount"));
        assert_eq!(data.paired_automount, None);
    }

    #[test]
    fn unreadable_template_is_skipped() {
        let fs = MockFileSystemOps::new()
            .with_unreadable("/src/mnt-bad.mount")
            .with_file("/src/mnt-good.mount", "[Mount]\nWhat=/dev/sda1\n");
        let log = Logger::new("test");

        let found: Vec<_> = discover(&fs, Path::new("/src"), &log).unwrap().collect();
        assert_eq!(names(&found), vec!["mnt-good.mount"]);
    }

    #[test]
    fn missing_directory_is_error() {
        let fs = MockFileSystemOps::new();
        let log = Logger::new("test");
        assert!(discover(&fs, Path::new("/nowhere"), &log).is_err());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let fs = MockFileSystemOps::new().with_dir("/src");
        let log = Logger::new("test");
        assert_eq!(discover(&fs, Path::new("/src"), &log).unwrap().count(), 0);
    }
}
