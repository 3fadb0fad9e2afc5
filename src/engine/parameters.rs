//! ORE parameter file reader.
//!
//! ```text
//! <ORE>
//!   <Setup>      Parameter*  </Setup>      -> group "setup" (required)
//!   <Logging>    Parameter*  </Logging>    -> group "logging"
//!   <Markets>    Parameter*  </Markets>    -> group "markets"
//!   <Analytics>
//!     <Analytic type="npv"> Parameter* </Analytic>   -> group "npv"
//!   </Analytics>
//! </ORE>
//! ```
//!
//! Every `Parameter` carries a `name` attribute; its trimmed text is the value.

use std::{collections::BTreeMap, fs, path::Path};

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::error::{ConstructionError, LoadError};

pub const SETUP: &str = "setup";
pub const LOGGING: &str = "logging";
pub const MARKETS: &str = "markets";

type Group = BTreeMap<String, String>;

/// Grouped name/value settings loaded from an ORE parameter file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    groups: BTreeMap<String, Group>,
}

impl Parameters {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let params = Self::parse(&text, &path.display().to_string())?;
        debug!(path = %path.display(), groups = params.groups.len(), "parameters loaded");
        Ok(params)
    }

    pub fn from_xml_str(text: &str) -> Result<Self, LoadError> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, LoadError> {
        let doc = Document::parse(text)
            .map_err(|source| LoadError::Xml { origin: origin.to_string(), source })?;
        let structure = |reason: String| LoadError::Structure { origin: origin.to_string(), reason };

        let root = doc.root_element();
        if root.tag_name().name() != "ORE" {
            return Err(structure(format!(
                "root element must be <ORE>, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut groups = BTreeMap::new();

        let setup = child(root, "Setup")
            .ok_or_else(|| structure("node Setup not found in parameter file".into()))?;
        groups.insert(SETUP.to_string(), read_group(setup, origin)?);

        if let Some(node) = child(root, "Logging") {
            groups.insert(LOGGING.to_string(), read_group(node, origin)?);
        }
        if let Some(node) = child(root, "Markets") {
            groups.insert(MARKETS.to_string(), read_group(node, origin)?);
        }

        if let Some(analytics) = child(root, "Analytics") {
            for node in analytics.children().filter(|n| n.is_element()) {
                let Some(kind) = node.attribute("type") else {
                    return Err(structure(format!(
                        "<{}> in <Analytics> has no type attribute",
                        node.tag_name().name()
                    )));
                };
                if groups.insert(kind.to_string(), read_group(node, origin)?).is_some() {
                    warn!(group = kind, "analytic group defined more than once, keeping the last");
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn has(&self, group: &str, name: &str) -> bool {
        self.groups.get(group).is_some_and(|g| g.contains_key(name))
    }

    /// Value of a required parameter.
    pub fn get(&self, group: &str, name: &str) -> Result<&str, ConstructionError> {
        self.groups
            .get(group)
            .and_then(|g| g.get(name))
            .map(String::as_str)
            .ok_or_else(|| ConstructionError::missing(group, name))
    }

    /// Value of an optional parameter; empty values count as absent.
    pub fn get_opt(&self, group: &str, name: &str) -> Option<&str> {
        self.groups
            .get(group)
            .and_then(|g| g.get(name))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, String>> {
        self.groups.get(group)
    }

    /// Market context -> market configuration id.
    pub fn markets(&self) -> BTreeMap<String, String> {
        self.groups.get(MARKETS).cloned().unwrap_or_default()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Write every parameter to the current subscriber at debug level.
    pub fn log(&self) {
        debug!("Parameters:");
        for (group, values) in &self.groups {
            for (name, value) in values {
                debug!(%group, %name, %value, "parameter");
            }
        }
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.tag_name().name() == name)
}

fn read_group(node: Node<'_, '_>, origin: &str) -> Result<Group, LoadError> {
    let mut group = Group::new();
    for param in node.children().filter(|n| n.is_element()) {
        if param.tag_name().name() != "Parameter" {
            warn!(
                element = param.tag_name().name(),
                parent = node.tag_name().name(),
                "ignoring non-Parameter element"
            );
            continue;
        }
        let name = param.attribute("name").ok_or_else(|| LoadError::Structure {
            origin: origin.to_string(),
            reason: format!("Parameter in <{}> has no name attribute", node.tag_name().name()),
        })?;
        let value = param.text().map(str::trim).unwrap_or_default();
        group.insert(name.to_string(), value.to_string());
    }
    Ok(group)
}
