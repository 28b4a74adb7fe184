use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;
use xp_core::ConvertError;

use crate::{map_cli_source_path, map_cli_source_scan};

/// Directories holding XML that is not service configuration.
const SKIPPED_DIRECTORIES: &[&str] = &["routing", "doctrine"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFile {
    pub(crate) path: PathBuf,
    /// Path relative to the scanned root; the file name for single-file sources.
    pub(crate) relative: PathBuf,
}

pub(crate) fn resolve_source(source: &str) -> Result<PathBuf, ConvertError> {
    let path = PathBuf::from(source);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(ConvertError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("source does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn collect_sources(root: &Path) -> Result<Vec<SourceFile>, ConvertError> {
    if root.is_file() {
        if !is_xml(root) {
            return Err(ConvertError::new(
                "CLI_SOURCE_INVALID",
                format!("source file is not an .xml file: {}", root.display()),
            ));
        }
        let relative = root
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| map_cli_source_scan(format!("no file name in {}", root.display())))?;
        return Ok(vec![SourceFile {
            path: root.to_path_buf(),
            relative,
        }]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() || !is_xml(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(map_cli_source_scan)?
            .to_path_buf();
        if is_skipped(&relative) {
            continue;
        }

        sources.push(SourceFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    Ok(sources)
}

/// Where the generated script for `source` is written.
pub(crate) fn output_path(source: &SourceFile, target: Option<&Path>) -> PathBuf {
    let base = match target {
        Some(target) => target.join(&source.relative),
        None => source.path.clone(),
    };
    base.with_extension("php")
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xml"))
}

fn is_skipped(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name)),
        _ => false,
    })
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;
    use std::fs;

    #[test]
    fn resolve_source_validates_existence() {
        let missing = temp_path("missing-source");
        let error = resolve_source(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");
    }

    #[test]
    fn collect_sources_walks_xml_and_skips_routing_and_doctrine() {
        let root = temp_path("source-tree");
        write_file(&root.join("services.xml"), "<container/>");
        write_file(&root.join("packages/mailer.xml"), "<container/>");
        write_file(&root.join("routing/routes.xml"), "<routes/>");
        write_file(&root.join("doctrine/mapping/User.orm.xml"), "<doctrine-mapping/>");
        write_file(&root.join("readme.txt"), "ignored");

        let sources = collect_sources(&root).expect("scan should pass");
        let relative = sources
            .iter()
            .map(|source| source.relative.to_string_lossy().replace('\\', "/"))
            .collect::<Vec<_>>();
        assert_eq!(relative, vec!["packages/mailer.xml", "services.xml"]);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn collect_sources_accepts_single_xml_file_only() {
        let root = temp_path("single-source");
        let file = root.join("services.xml");
        write_file(&file, "<container/>");
        let sources = collect_sources(&file).expect("file source");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].relative, PathBuf::from("services.xml"));

        let other = root.join("services.yaml");
        write_file(&other, "services: ~");
        assert_eq!(
            collect_sources(&other).expect_err("yaml").code,
            "CLI_SOURCE_INVALID"
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn output_path_mirrors_relative_layout_under_target() {
        let source = SourceFile {
            path: PathBuf::from("/app/config/packages/mailer.xml"),
            relative: PathBuf::from("packages/mailer.xml"),
        };
        assert_eq!(
            output_path(&source, Some(Path::new("/out"))),
            PathBuf::from("/out/packages/mailer.php")
        );
        assert_eq!(
            output_path(&source, None),
            PathBuf::from("/app/config/packages/mailer.php")
        );
    }
}
