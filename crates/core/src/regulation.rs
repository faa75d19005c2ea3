//! eCFR records and regulation document trees.

use crate::error::CoreResult;
use crate::types::Extra;
use crate::xml::{parse_element, Element};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One CFR title as listed by the versioner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcfrTitle {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latest_amended_on: Option<String>,
    #[serde(default)]
    pub latest_issue_date: Option<String>,
    #[serde(default)]
    pub up_to_date_as_of: Option<String>,
    #[serde(default)]
    pub reserved: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlesResponse {
    #[serde(default)]
    pub titles: Vec<EcfrTitle>,
    #[serde(default)]
    pub meta: Value,
}

impl TitlesResponse {
    pub fn title(&self, number: u32) -> Option<&EcfrTitle> {
        self.titles.iter().find(|t| t.number == number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub children: Vec<Agency>,
    #[serde(default)]
    pub cfr_references: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgenciesResponse {
    #[serde(default)]
    pub agencies: Vec<Agency>,
}

/// Node of the eCFR structure JSON (title, chapter, part, section, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationNode {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_level: Option<String>,
    #[serde(default)]
    pub label_description: Option<String>,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegulationNode>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RegulationNode {
    /// Depth-first search for a node by type and identifier.
    pub fn find(&self, node_type: &str, identifier: &str) -> Option<&RegulationNode> {
        if self.node_type == node_type && self.identifier.as_deref() == Some(identifier) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(node_type, identifier))
    }

    /// Number of nodes of each type in this subtree, including this node.
    pub fn count_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        self.count_into(&mut counts);
        counts
    }

    fn count_into(&self, counts: &mut BTreeMap<String, usize>) {
        *counts.entry(self.node_type.clone()).or_insert(0) += 1;
        for child in &self.children {
            child.count_into(counts);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestryResponse {
    #[serde(default)]
    pub ancestors: Vec<RegulationNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentVersion {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amendment_date: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub part: Option<String>,
    #[serde(default)]
    pub substantive: bool,
    #[serde(default)]
    pub removed: bool,
    #[serde(rename = "type", default)]
    pub version_type: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub content_versions: Vec<ContentVersion>,
    #[serde(default)]
    pub meta: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationSearchResult {
    #[serde(default)]
    pub starts_on: Option<String>,
    #[serde(default)]
    pub ends_on: Option<String>,
    #[serde(rename = "type", default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub hierarchy: BTreeMap<String, Value>,
    #[serde(default)]
    pub hierarchy_headings: BTreeMap<String, Value>,
    #[serde(default)]
    pub headings: BTreeMap<String, Value>,
    #[serde(default)]
    pub full_text_excerpt: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationSearchResponse {
    #[serde(default)]
    pub results: Vec<RegulationSearchResult>,
    #[serde(default)]
    pub meta: Value,
}

impl RegulationSearchResponse {
    pub fn total_count(&self) -> u64 {
        self.meta
            .get("total_count")
            .and_then(Value::as_u64)
            .unwrap_or(self.results.len() as u64)
    }
}

/// A regulation as read from eCFR source XML.
///
/// `DIVn` elements become nodes, typed by their `TYPE` attribute and
/// identified by `N`. Inline markup inside paragraphs is flattened to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationDocument {
    #[serde(rename = "type")]
    pub node_type: String,
    pub identifier: Option<String>,
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub paragraphs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<RegulationDocument>,
}

const PARAGRAPH_TAGS: &[&str] = &["P", "FP"];

fn is_division(name: &str) -> bool {
    name.strip_prefix("DIV")
        .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl RegulationDocument {
    /// Parse eCFR source XML into a document tree.
    ///
    /// A non-division root (such as the `ECFR` wrapper of a full title)
    /// becomes a container node holding the outermost divisions.
    pub fn parse(xml: &str) -> CoreResult<Self> {
        let root = parse_element(xml)?;
        if is_division(&root.name) {
            return Ok(Self::from_division(&root));
        }
        let mut children = Vec::new();
        collect_divisions(&root, &mut children);
        Ok(Self {
            node_type: root.name.to_lowercase(),
            identifier: root.attr("N").map(str::to_string),
            heading: root.child("HEAD").map(Element::text).and_then(non_empty),
            paragraphs: Vec::new(),
            citation: None,
            authority: None,
            source: None,
            children,
        })
    }

    fn from_division(element: &Element) -> Self {
        let node_type = element
            .attr("TYPE")
            .map(str::to_lowercase)
            .unwrap_or_else(|| element.name.to_lowercase());

        let mut doc = Self {
            node_type,
            identifier: element.attr("N").map(str::to_string),
            heading: None,
            paragraphs: Vec::new(),
            citation: None,
            authority: None,
            source: None,
            children: Vec::new(),
        };

        for child in element.elements() {
            match child.name.as_str() {
                "HEAD" if doc.heading.is_none() => doc.heading = non_empty(child.text()),
                "CITA" => doc.citation = non_empty(child.text()),
                "AUTH" => doc.authority = non_empty(child.text_excluding(&["HED"])),
                "SOURCE" => doc.source = non_empty(child.text_excluding(&["HED"])),
                name if PARAGRAPH_TAGS.contains(&name) => {
                    if let Some(text) = non_empty(child.text()) {
                        doc.paragraphs.push(text);
                    }
                }
                name if is_division(name) => doc.children.push(Self::from_division(child)),
                _ => {}
            }
        }
        doc
    }

    /// Depth-first search by node type and identifier.
    pub fn find(&self, node_type: &str, identifier: &str) -> Option<&RegulationDocument> {
        if self.node_type == node_type && self.identifier.as_deref() == Some(identifier) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(node_type, identifier))
    }

    /// All paragraph text in document order, one paragraph per line.
    pub fn full_text(&self) -> String {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        lines.join("\n")
    }

    fn collect_lines<'a>(&'a self, lines: &mut Vec<&'a str>) {
        if let Some(heading) = &self.heading {
            lines.push(heading);
        }
        lines.extend(self.paragraphs.iter().map(String::as_str));
        for child in &self.children {
            child.collect_lines(lines);
        }
    }
}

fn collect_divisions(element: &Element, out: &mut Vec<RegulationDocument>) {
    for child in element.elements() {
        if is_division(&child.name) {
            out.push(RegulationDocument::from_division(child));
        } else {
            collect_divisions(child, out);
        }
    }
}
