use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::normalize::normalize_tag;

pub const DEFAULT_MAX_TAG_LENGTH: usize = 30;
pub const DEFAULT_MAX_TAGS_PER_FILE: usize = 10;

/// Reusable tag operations, loaded from the `tags:` section of the config
/// or from a standalone profile file
///
/// ```yaml
/// replacements:
///   "Economía Internacional": economia_internacional
///   Logistics: logistica
/// remove: [draft, borrador]
/// add: []
/// max_tag_length: 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagProfile {
    /// Ordered `old: new` pairs
    pub replacements: Mapping,
    pub remove: Vec<String>,
    pub add: Vec<String>,
    pub max_tag_length: usize,
    pub max_tags_per_file: usize,
}

impl Default for TagProfile {
    fn default() -> Self {
        Self {
            replacements: Mapping::new(),
            remove: Vec::new(),
            add: Vec::new(),
            max_tag_length: DEFAULT_MAX_TAG_LENGTH,
            max_tags_per_file: DEFAULT_MAX_TAGS_PER_FILE,
        }
    }
}

impl TagProfile {
    /// Replacement pairs in file order; entries with non-scalar keys or values
    /// are ignored
    pub fn replacement_pairs(&self) -> Vec<(String, String)> {
        self.replacements
            .iter()
            .filter_map(|(old, new)| Some((scalar_text(old)?, scalar_text(new)?)))
            .collect()
    }

    pub fn limits(&self) -> TagLimits {
        TagLimits {
            max_tag_length: self.max_tag_length,
            max_tags_per_file: self.max_tags_per_file,
        }
    }

    /// Build a plan from this profile, appending the command-line operations
    pub fn plan(&self, extra: TagPlan) -> TagPlan {
        let mut replacements = self.replacement_pairs();
        replacements.extend(extra.replacements);

        let mut remove = self.remove.clone();
        remove.extend(extra.remove);

        let mut add = self.add.clone();
        add.extend(extra.add);

        TagPlan {
            normalize: extra.normalize,
            replacements,
            remove,
            add,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Thresholds that trigger validation warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLimits {
    pub max_tag_length: usize,
    pub max_tags_per_file: usize,
}

impl Default for TagLimits {
    fn default() -> Self {
        Self {
            max_tag_length: DEFAULT_MAX_TAG_LENGTH,
            max_tags_per_file: DEFAULT_MAX_TAGS_PER_FILE,
        }
    }
}

/// Operations applied to every document's tag list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    /// Normalization was requested explicitly (it runs in every case)
    pub normalize: bool,
    pub replacements: Vec<(String, String)>,
    pub remove: Vec<String>,
    pub add: Vec<String>,
}

impl TagPlan {
    /// True when no operation was selected at all
    pub fn is_empty(&self) -> bool {
        !self.normalize && self.replacements.is_empty() && self.remove.is_empty() && self.add.is_empty()
    }

    /// Replacement pairs with both sides normalized
    pub(crate) fn normalized_replacements(&self) -> Vec<(String, String)> {
        self.replacements
            .iter()
            .map(|(old, new)| (normalize_tag(old), normalize_tag(new)))
            .filter(|(old, new)| !old.is_empty() && !new.is_empty())
            .collect()
    }
}

/// Parse an `OLD:NEW` replacement argument
pub fn parse_replacement(s: &str) -> Result<(String, String), String> {
    let Some((old, new)) = s.split_once(':') else {
        return Err(format!("Invalid replacement '{s}'. Use OLD:NEW"));
    };
    let (old, new) = (old.trim(), new.trim());
    if old.is_empty() || new.is_empty() {
        return Err(format!("Invalid replacement '{s}'. Both sides must be non-empty"));
    }
    Ok((old.to_string(), new.to_string()))
}
