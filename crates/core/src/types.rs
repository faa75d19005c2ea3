//! CourtListener API v4 resource types.
//!
//! Each record names the fields the tools rely on and keeps every other
//! upstream field in `extra`, so serializing a record reproduces the upstream
//! document while a missing `id` still fails deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields passed through untouched from the upstream document.
pub type Extra = Map<String, Value>;

/// A single court opinion (`/opinions/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opinion {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_str: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub opinion_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_with_citations: Option<String>,
    #[serde(default)]
    pub opinions_cited: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A docket (`/dockets/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Docket {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name_full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_terminated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_argued: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_to_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature_of_suit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jury_demand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacer_case_id: Option<String>,
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An oral argument recording (`/audio/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audio {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judges: Option<String>,
    /// Length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path_mp3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(default)]
    pub panel: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Reporter citation attached to an opinion cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCitation {
    pub volume: Value,
    pub reporter: String,
    pub page: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub citation_type: Option<u8>,
}

impl ClusterCitation {
    /// Render as "volume reporter page".
    pub fn display(&self) -> String {
        let volume = match &self.volume {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!("{} {} {}", volume, self.reporter, self.page)
    }
}

/// A group of opinions for one decision (`/clusters/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name_full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judges: Option<String>,
    #[serde(default)]
    pub citations: Vec<ClusterCitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedential_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllabus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub sub_opinions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A judge or other legal professional (`/people/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_dod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fjc_id: Option<u64>,
    #[serde(default)]
    pub positions: Vec<Value>,
    #[serde(default)]
    pub educations: Vec<Value>,
    #[serde(default)]
    pub political_affiliations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Person {
    /// Join the non-empty name parts, e.g. "Sonia Maria Sotomayor".
    pub fn full_name(&self) -> String {
        [
            &self.name_first,
            &self.name_middle,
            &self.name_last,
            &self.name_suffix,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A court (`/courts/{id}/`). Court ids are slugs such as `scotus` or `ca9`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_use: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Paginated response of the `/search/` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Total hit count reported upstream, or the page length when absent.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.results.len() as u64)
    }
}

/// One search result. The search API mixes camelCase and snake_case keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "caseName", default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<String>,
    #[serde(rename = "dateFiled", default, skip_serializing_if = "Option::is_none")]
    pub date_filed: Option<String>,
    #[serde(
        rename = "docketNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub docket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One entry returned by `/citation-lookup/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationLookupResult {
    pub citation: String,
    #[serde(default)]
    pub normalized_citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u64>,
    pub status: u16,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub clusters: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CitationLookupResult {
    /// The citation resolved to at least one cluster.
    pub fn is_found(&self) -> bool {
        self.status == 200 && !self.clusters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opinion_keeps_unknown_fields() {
        let raw = json!({
            "id": 2812209,
            "cluster_id": 2812209,
            "type": "010combined",
            "sha1": "abc123",
            "ordering_key": null
        });

        let opinion: Opinion = serde_json::from_value(raw).unwrap();
        assert_eq!(opinion.id, 2812209);
        assert_eq!(opinion.opinion_type.as_deref(), Some("010combined"));
        assert_eq!(opinion.extra["sha1"], "abc123");

        let back = serde_json::to_value(&opinion).unwrap();
        assert_eq!(back["type"], "010combined");
        assert_eq!(back["sha1"], "abc123");
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let raw = json!({"case_name": "Roe v. Wade"});
        assert!(serde_json::from_value::<Docket>(raw).is_err());
    }

    #[test]
    fn test_person_full_name() {
        let person: Person = serde_json::from_value(json!({
            "id": 1,
            "name_first": "Ruth",
            "name_middle": "Bader",
            "name_last": "Ginsburg",
            "name_suffix": ""
        }))
        .unwrap();
        assert_eq!(person.full_name(), "Ruth Bader Ginsburg");
    }

    #[test]
    fn test_cluster_citation_display() {
        let cluster: Cluster = serde_json::from_value(json!({
            "id": 108713,
            "case_name": "Roe v. Wade",
            "citations": [{"volume": 410, "reporter": "U.S.", "page": "113", "type": 1}]
        }))
        .unwrap();
        assert_eq!(cluster.citations[0].display(), "410 U.S. 113");
    }

    #[test]
    fn test_search_hit_camel_case_fields() {
        let response: SearchResponse = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "caseName": "Miranda v. Arizona",
                "dateFiled": "1966-06-13",
                "court_id": "scotus",
                "cluster_id": 107252,
                "opinions": [{"id": 107252, "snippet": "<mark>right</mark> to remain silent"}]
            }]
        }))
        .unwrap();

        assert_eq!(response.total(), 1);
        let hit = &response.results[0];
        assert_eq!(hit.case_name.as_deref(), Some("Miranda v. Arizona"));
        assert_eq!(hit.date_filed.as_deref(), Some("1966-06-13"));
        assert!(hit.extra.contains_key("opinions"));
    }

    #[test]
    fn test_citation_lookup_found() {
        let found: CitationLookupResult = serde_json::from_value(json!({
            "citation": "410 U.S. 113",
            "normalized_citations": ["410 U.S. 113"],
            "start_index": 0,
            "end_index": 12,
            "status": 200,
            "error_message": "",
            "clusters": [{"id": 108713}]
        }))
        .unwrap();
        assert!(found.is_found());

        let missing: CitationLookupResult = serde_json::from_value(json!({
            "citation": "1 U.S. 999999",
            "status": 404,
            "error_message": "Citation not found",
            "clusters": []
        }))
        .unwrap();
        assert!(!missing.is_found());
    }
}
