//! Output-name resolution: map a leading numeric code pair in the source
//! file name to a descriptive output name.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Keyed lookup from `<digits>_<digits>` code pairs to descriptive output
/// names. Loaded once per run; resolution never fails (pass-through on every
/// miss or lookup problem).
#[derive(Debug, Default)]
pub struct NameResolver {
    map: HashMap<String, String>,
    target_ext: String,
}

#[derive(Debug, Default, Deserialize)]
struct NamesFile {
    #[serde(default)]
    names: HashMap<String, String>,
}

impl NameResolver {
    /// Resolver with no mapping: every name passes through with the target
    /// extension substituted.
    pub fn new(target_ext: &str) -> Self {
        Self {
            map: HashMap::new(),
            target_ext: target_ext.to_string(),
        }
    }

    /// Load the optional names file. A missing or unparsable file degrades to
    /// an empty map with a warning; it never fails the run.
    pub fn from_file(path: Option<&Path>, target_ext: &str) -> Self {
        let Some(path) = path else {
            return Self::new(target_ext);
        };
        let map = match std::fs::read_to_string(path) {
            Ok(s) => match toml::from_str::<NamesFile>(&s) {
                Ok(file) => file.names,
                Err(e) => {
                    log::warn!("{}: {}; name mapping disabled", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                log::warn!(
                    "cannot read names file {}: {}; name mapping disabled",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };
        Self {
            map,
            target_ext: target_ext.to_string(),
        }
    }

    /// Resolve a source file name to its target file name.
    /// Empty input resolves to the empty string; unmapped names keep their
    /// stem with the target extension substituted.
    pub fn resolve(&self, source_name: &str) -> String {
        if source_name.is_empty() {
            return String::new();
        }
        let stem = Path::new(source_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(source_name);
        let mapped = code_pair(stem).and_then(|key| self.map.get(&key));
        match mapped {
            Some(name) => format!("{}.{}", name, self.target_ext),
            None => format!("{}.{}", stem, self.target_ext),
        }
    }
}

/// Extract the leading `<digits>_<digits>` code pair of a file stem, e.g.
/// `1045_233_raw` -> `1045_233`. None when the stem has no such prefix.
fn code_pair(stem: &str) -> Option<String> {
    let mut parts = stem.split('_');
    let a = parts.next()?;
    let b = parts.next()?;
    let numeric =
        |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    (numeric(a) && numeric(b)).then(|| format!("{a}_{b}"))
}
