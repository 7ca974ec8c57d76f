//! Input file discovery and loading.
//!
//! Two layouts are read:
//!
//! - a flat directory of department files, each a JSON array of
//!   `{"dpmt_name": ...}` objects
//! - a directory with one folder per department, each holding one JSON file
//!   per merit badge
//!
//! Files are visited in path order so repeated runs see the same sequence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::MeritBadge;

/// Badges keyed by upper-cased department name.
pub type BadgesByDepartment = BTreeMap<String, Vec<MeritBadge>>;

/// Default location of the department files
pub const DEFAULT_DEPARTMENTS_DIR: &str = "./departments";

/// Default location of the per-department badge folders
pub const DEFAULT_MERIT_BADGES_DIR: &str = "./merit-badges";

/// Read every department record from `dir/*.json`, in file then array order.
pub fn load_department_records(dir: &Path) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    for path in glob_sorted(dir, "*.json")? {
        match read_json(&path)? {
            Value::Array(items) => {
                debug!(file = %path.display(), count = items.len(), "Loaded department file");
                records.extend(items);
            }
            _ => bail!("{} is not a JSON array of departments", path.display()),
        }
    }
    Ok(records)
}

/// Parse every badge file under `dir/<department>/*.json` and group the
/// badges by their own department name, upper-cased.
///
/// Files that do not describe a complete badge are skipped.
pub fn load_merit_badges(dir: &Path) -> Result<BadgesByDepartment> {
    let mut grouped = BadgesByDepartment::new();

    let folders: Vec<PathBuf> = glob_sorted(dir, "*")?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    debug!(count = folders.len(), "Found department folders");

    for folder in folders {
        let folder_key = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_uppercase())
            .unwrap_or_default();

        for path in glob_sorted(&folder, "*.json")? {
            let record = read_json(&path)?;
            let Some(badge) = MeritBadge::from_json(&record) else {
                continue;
            };

            let key = badge.department_key();
            if key != folder_key {
                warn!(
                    file = %path.display(),
                    folder = %folder_key,
                    department = %key,
                    "Badge department does not match its folder, grouping by department"
                );
            }
            grouped.entry(key).or_default().push(badge);
        }
    }

    Ok(grouped)
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON from '{}'", path.display()))
}

/// Entries of `dir` matching `pattern`, sorted by path. Hidden entries are
/// never matched by a wildcard.
fn glob_sorted(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Input directory '{}' not found", dir.display());
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = format!("{}/{}", escaped.trim_end_matches('/'), pattern);

    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };
    let mut paths = glob::glob_with(&full, options)
        .with_context(|| format!("Invalid file pattern '{}'", full))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list '{}'", dir.display()))?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_department_records_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("b.json"),
            r#"[{"dpmt_name": "Nature"}, {"dpmt_name": "Shooting"}]"#,
        );
        write(&dir.path().join("a.json"), r#"[{"dpmt_name": "Aquatics"}]"#);
        write(&dir.path().join("notes.txt"), "ignored");

        let records = load_department_records(dir.path()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r["dpmt_name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Aquatics", "Nature", "Shooting"]);
    }

    #[test]
    fn test_load_department_records_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a.json"), r#"{"dpmt_name": "Aquatics"}"#);
        assert!(load_department_records(dir.path()).is_err());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_department_records(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_merit_badges_groups_by_department() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("aquatics/swimming.json"),
            r#"{"badge_name": "Swimming", "badge_desc": "Swim", "eagle_badge": true,
                "dpmt_name": "Aquatics", "requirements": []}"#,
        );
        write(
            &dir.path().join("aquatics/kayaking.json"),
            r#"{"badge_name": "Kayaking", "badge_desc": "Paddle", "eagle_badge": false,
                "dpmt_name": "aquatics", "requirements": [{"rqmt_idnf": "1", "rqmt_desc": "Safety"}]}"#,
        );
        // Missing eagle_badge: dropped without error
        write(
            &dir.path().join("aquatics/rowing.json"),
            r#"{"badge_name": "Rowing", "badge_desc": "Row", "dpmt_name": "Aquatics", "requirements": []}"#,
        );
        write(
            &dir.path().join("nature/mammal-study.json"),
            r#"{"badge_name": "Mammal Study", "badge_desc": "Mammals", "eagle_badge": false,
                "dpmt_name": "Nature", "requirements": []}"#,
        );
        write(&dir.path().join("stray.json"), "{}");

        let grouped = load_merit_badges(dir.path()).unwrap();
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["AQUATICS", "NATURE"]);

        let aquatics: Vec<_> = grouped["AQUATICS"].iter().map(|b| b.name.as_str()).collect();
        assert_eq!(aquatics, vec!["Kayaking", "Swimming"]);
        assert!(grouped.values().flatten().all(|b| b.name != "Rowing"));
    }

    #[test]
    fn test_hidden_folders_and_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let nature = r#"{"badge_name": "Mammal Study", "badge_desc": "Mammals", "eagle_badge": false,
            "dpmt_name": "Nature", "requirements": []}"#;
        write(&dir.path().join("nature/mammal-study.json"), nature);
        write(&dir.path().join(".trash/old.json"), nature);
        write(&dir.path().join("nature/.draft.json"), nature);
        write(&dir.path().join(".backup.json"), r#"[{"dpmt_name": "Old"}]"#);
        write(&dir.path().join("a.json"), r#"[{"dpmt_name": "Nature"}]"#);

        let grouped = load_merit_badges(dir.path()).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["NATURE"].len(), 1);

        let records = load_department_records(dir.path()).unwrap();
        assert_eq!(records, vec![serde_json::json!({"dpmt_name": "Nature"})]);
    }

    #[test]
    fn test_load_merit_badges_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("nature/broken.json"), "{ not json");
        let err = load_merit_badges(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse JSON"));
    }
}
