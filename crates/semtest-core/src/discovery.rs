//! Test discovery - find tagged test members and suite unit files

use crate::error::{DriverError, DriverResult};
use crate::host::UnitLoader;
use crate::metadata::{MemberMetadata, MetaValue};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Symbol marking a member as a test case
pub const TEST_TAG: &str = "test";

/// Decide whether a member is a test case from its metadata.
///
/// A member is a test when its outer annotation is `` `test `` or a tuple
/// holding `` `test `` among other things. Anything else, including
/// malformed metadata, is not a test.
pub fn is_test_case(metadata: Option<&MemberMetadata>) -> bool {
    let Some(outer) = metadata.and_then(MemberMetadata::outer) else {
        return false;
    };

    match outer {
        MetaValue::Symbol(_) => outer.is_symbol(TEST_TAG),
        MetaValue::Tuple(items) => items.iter().any(|item| item.is_symbol(TEST_TAG)),
        _ => false,
    }
}

/// Names of the unit's test members, in loader order
pub fn extract_test_names<L: UnitLoader>(loader: &L, unit: &L::Unit) -> Vec<String> {
    loader
        .members_of(unit)
        .into_iter()
        .filter(|(_, meta)| is_test_case(meta.as_ref()))
        .map(|(name, _)| name)
        .collect()
}

/// List the unit files of a suite directory.
///
/// Only regular files directly inside `dir` with the given extension are
/// returned, sorted by file name so suite output is reproducible.
pub fn discover_units(dir: &Path, extension: &str) -> DriverResult<Vec<PathBuf>> {
    let mut units = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| DriverError::ListSuite {
            path: dir.to_path_buf(),
            error,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension() == Some(OsStr::new(extension)) {
            units.push(path.to_path_buf());
        } else {
            tracing::debug!(path = %path.display(), "skipping non-unit file");
        }
    }

    Ok(units)
}

/// Predicate selecting which (unit, test) pairs run
pub trait TestFilter {
    fn accepts(&self, unit_path: &Path, test_name: &str) -> bool;
}

impl<F> TestFilter for F
where
    F: Fn(&Path, &str) -> bool,
{
    fn accepts(&self, unit_path: &Path, test_name: &str) -> bool {
        self(unit_path, test_name)
    }
}

/// Substring filter parsed from a command-line pattern.
///
/// `unit::test` requires both parts to match (either may be empty); a bare
/// pattern matches when either the unit file name or the test name contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    unit: Option<String>,
    test: Option<String>,
    any: Option<String>,
}

impl NameFilter {
    pub fn parse(pattern: &str) -> Self {
        match pattern.split_once("::") {
            Some((unit, test)) => Self {
                unit: (!unit.is_empty()).then(|| unit.to_string()),
                test: (!test.is_empty()).then(|| test.to_string()),
                any: None,
            },
            None => Self {
                unit: None,
                test: None,
                any: Some(pattern.to_string()),
            },
        }
    }
}

impl TestFilter for NameFilter {
    fn accepts(&self, unit_path: &Path, test_name: &str) -> bool {
        let unit_name = unit_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");

        if let Some(any) = &self.any {
            return unit_name.contains(any.as_str()) || test_name.contains(any.as_str());
        }

        self.unit
            .as_deref()
            .map_or(true, |unit| unit_name.contains(unit))
            && self
                .test
                .as_deref()
                .map_or(true, |test| test_name.contains(test))
    }
}
