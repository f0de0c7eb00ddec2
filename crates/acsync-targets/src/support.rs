//! Skill support files (everything in a skill folder besides `SKILL.md`)

use crate::SKILL_FILE;
use crate::error::Result;
use crate::types::SupportFile;
use std::path::Path;

const IGNORED: &[&str] = &[".DS_Store"];

/// Read all support files below `skill_dir`, sorted by relative path.
pub fn read_support_files(skill_dir: &Path) -> Result<Vec<SupportFile>> {
    let mut files = Vec::new();
    for relative_path in acsync_fs::io::list_files_recursive(skill_dir)? {
        if relative_path == Path::new(SKILL_FILE) {
            continue;
        }
        let ignored = relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| IGNORED.contains(&n));
        if ignored {
            continue;
        }
        let full = skill_dir.join(&relative_path);
        let content = std::fs::read(&full).map_err(|e| acsync_fs::Error::io(&full, e))?;
        files.push(SupportFile {
            relative_path,
            content,
        });
    }
    Ok(files)
}

/// Write support files under `skill_dir`, each atomically.
pub fn write_support_files(skill_dir: &Path, files: &[SupportFile]) -> Result<()> {
    for file in files {
        acsync_fs::io::write_atomic(&skill_dir.join(&file.relative_path), &file.content)?;
    }
    Ok(())
}
