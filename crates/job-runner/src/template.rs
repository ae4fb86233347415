//! Template catalog and injection descriptors
//!
//! A template is a script file inside the catalog directory, addressed by its
//! file name. Each template declares the injection points it accepts and the
//! shape of value each point takes. Templates without an explicit descriptor
//! accept the standard vocabulary.

use crate::error::{JobError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shape of value an injection point accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// A single string
    Text,
    /// A list of strings
    TextList,
    /// A list of key/value objects or two-element pairs
    Records,
}

impl std::fmt::Display for ValueShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueShape::Text => "text",
            ValueShape::TextList => "text_list",
            ValueShape::Records => "records",
        };
        f.write_str(name)
    }
}

/// A named location inside a template whose value is supplied per job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    /// Name of the assignment to rewrite
    pub name: String,
    /// Shape of value it takes
    pub shape: ValueShape,
}

impl InjectionPoint {
    /// Create an injection point
    pub fn new(name: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// The injection points every template accepts unless told otherwise
    pub fn standard() -> Vec<InjectionPoint> {
        vec![
            InjectionPoint::new("GOOGLE_SHEET_URL", ValueShape::Text),
            InjectionPoint::new("multimedia_data", ValueShape::Records),
            InjectionPoint::new("pairs", ValueShape::Records),
            InjectionPoint::new("uuid_list", ValueShape::TextList),
        ]
    }
}

/// Declares which injection points a template accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// Template key (file name inside the catalog)
    pub key: String,
    /// Accepted injection points
    pub points: Vec<InjectionPoint>,
}

impl TemplateDescriptor {
    /// Create a descriptor
    pub fn new(key: impl Into<String>, points: Vec<InjectionPoint>) -> Self {
        Self {
            key: key.into(),
            points,
        }
    }

    /// Descriptor accepting the standard vocabulary
    pub fn standard(key: impl Into<String>) -> Self {
        Self::new(key, InjectionPoint::standard())
    }

    /// Look up a declared injection point by name
    pub fn point(&self, name: &str) -> Option<&InjectionPoint> {
        self.points.iter().find(|p| p.name == name)
    }
}

/// A loaded template
#[derive(Debug, Clone)]
pub struct Template {
    /// Template key
    pub key: String,
    /// File backing the template
    pub path: PathBuf,
    /// Template source text
    pub text: String,
}

impl Template {
    /// File name of the template, used to name job copies
    pub fn base_name(&self) -> &str {
        Path::new(&self.key)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.key)
    }
}

/// Read-only catalog of script templates
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    root: PathBuf,
    descriptors: HashMap<String, TemplateDescriptor>,
}

impl TemplateCatalog {
    /// Create a catalog rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            descriptors: HashMap::new(),
        }
    }

    /// Add an explicit descriptor, replacing any previous one for the key
    pub fn with_descriptor(mut self, descriptor: TemplateDescriptor) -> Self {
        self.insert_descriptor(descriptor);
        self
    }

    /// Add an explicit descriptor
    pub fn insert_descriptor(&mut self, descriptor: TemplateDescriptor) {
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Catalog directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Descriptor for a template: the configured one, or the standard vocabulary
    pub fn descriptor(&self, key: &str) -> TemplateDescriptor {
        self.descriptors
            .get(key)
            .cloned()
            .unwrap_or_else(|| TemplateDescriptor::standard(key))
    }

    /// Resolve a key to the file backing it
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        let not_found = || JobError::TemplateNotFound {
            key: key.to_string(),
        };

        if !is_plain_file_name(key) {
            return Err(not_found());
        }

        let path = self.root.join(key);
        if path.is_file() {
            Ok(path)
        } else {
            Err(not_found())
        }
    }

    /// Load a template's text
    pub async fn load(&self, key: &str) -> Result<Template> {
        let path = self.resolve(key)?;
        let text = async_fs::read_to_string(&path).await?;
        debug!("Loaded template {} ({} bytes)", key, text.len());
        Ok(Template {
            key: key.to_string(),
            path,
            text,
        })
    }

    /// List template keys present in the catalog, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                keys.push(name.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// A key names a file directly inside the catalog, never a path out of it
pub fn is_plain_file_name(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0'])
}
