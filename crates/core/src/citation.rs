//! Legal citation recognition.
//!
//! Citations are matched against a table of templates (case reporters,
//! Westlaw/Lexis document numbers, the U.S. Code and the CFR). Every template
//! is compiled once in its lenient form: case-insensitive, with optional
//! periods and spaces inside the reporter abbreviation. A strict match is a
//! lenient match that spans the whole input and is already written in the
//! canonical form.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How closely the input has to follow canonical citation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The whole input is one citation in canonical spacing and punctuation.
    Strict,
    /// Flexible spacing, periods and case; the citation may be embedded in text.
    Broad,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Broad => "broad",
        }
    }
}

/// A recognized citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Text exactly as it appeared in the input.
    pub text: String,
    /// Template that recognized it, e.g. "U.S. Reports".
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    /// Canonical reporter or code abbreviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    /// First page, or the section for statutes and regulations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_cite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub tokens: BTreeMap<String, String>,
    /// Normalized citation text.
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `Id.` reference resolved against the preceding citation.
    pub short_form: bool,
    /// Byte offsets of `text` in the input.
    pub start: usize,
    pub end: usize,
}

/// Outcome of checking a single citation string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatVerification {
    pub valid: bool,
    pub format: Option<String>,
    pub template: Option<String>,
    pub matching_mode: Option<String>,
    pub citation: String,
    pub normalized: String,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Case,
    Westlaw,
    Lexis,
    UsCode,
    Cfr,
}

struct Template {
    name: &'static str,
    family: Family,
    reporter: &'static str,
    court: Option<&'static str>,
    regex: Regex,
}

/// (template name, canonical reporter, lenient pattern, implied court)
const CASE_REPORTERS: &[(&str, &str, &str, Option<&str>)] = &[
    ("U.S. Reports", "U.S.", r"U\.?\s?S\.?", Some("scotus")),
    ("Supreme Court Reporter", "S. Ct.", r"S\.?\s?Ct\.?", Some("scotus")),
    ("Lawyers' Edition", "L. Ed. 2d", r"L\.?\s?Ed\.?\s?2d", Some("scotus")),
    ("Lawyers' Edition", "L. Ed.", r"L\.?\s?Ed\.?", Some("scotus")),
    ("Federal Reporter", "F.4th", r"F\.?\s?4th", None),
    ("Federal Reporter", "F.3d", r"F\.?\s?3d", None),
    ("Federal Reporter", "F.2d", r"F\.?\s?2d", None),
    ("Federal Reporter", "F.", r"F\.", None),
    ("Federal Supplement", "F. Supp. 3d", r"F\.?\s?Supp\.?\s?3d", None),
    ("Federal Supplement", "F. Supp. 2d", r"F\.?\s?Supp\.?\s?2d", None),
    ("Federal Supplement", "F. Supp.", r"F\.?\s?Supp\.?", None),
    ("Federal Appendix", "F. App'x", r"F\.?\s?App['’]?x\.?", None),
    ("Atlantic Reporter", "A.3d", r"A\.?\s?3d", None),
    ("Atlantic Reporter", "A.2d", r"A\.?\s?2d", None),
    ("Atlantic Reporter", "A.", r"A\.", None),
    ("North Eastern Reporter", "N.E.3d", r"N\.?\s?E\.?\s?3d", None),
    ("North Eastern Reporter", "N.E.2d", r"N\.?\s?E\.?\s?2d", None),
    ("North Eastern Reporter", "N.E.", r"N\.\s?E\.", None),
    ("North Western Reporter", "N.W.2d", r"N\.?\s?W\.?\s?2d", None),
    ("North Western Reporter", "N.W.", r"N\.\s?W\.", None),
    ("Pacific Reporter", "P.3d", r"P\.?\s?3d", None),
    ("Pacific Reporter", "P.2d", r"P\.?\s?2d", None),
    ("Pacific Reporter", "P.", r"P\.", None),
    ("South Eastern Reporter", "S.E.2d", r"S\.?\s?E\.?\s?2d", None),
    ("South Eastern Reporter", "S.E.", r"S\.\s?E\.", None),
    ("South Western Reporter", "S.W.3d", r"S\.?\s?W\.?\s?3d", None),
    ("South Western Reporter", "S.W.2d", r"S\.?\s?W\.?\s?2d", None),
    ("South Western Reporter", "S.W.", r"S\.\s?W\.", None),
    ("Southern Reporter", "So. 3d", r"So\.?\s?3d", None),
    ("Southern Reporter", "So. 2d", r"So\.?\s?2d", None),
    ("Southern Reporter", "So.", r"So\.", None),
    ("California Reporter", "Cal. Rptr. 3d", r"Cal\.?\s?Rptr\.?\s?3d", None),
    ("California Reporter", "Cal. Rptr. 2d", r"Cal\.?\s?Rptr\.?\s?2d", None),
    ("California Reporter", "Cal. Rptr.", r"Cal\.?\s?Rptr\.?", None),
    ("New York Supplement", "N.Y.S.3d", r"N\.?\s?Y\.?\s?S\.?\s?3d", None),
    ("New York Supplement", "N.Y.S.2d", r"N\.?\s?Y\.?\s?S\.?\s?2d", None),
    ("New York Supplement", "N.Y.S.", r"N\.?\s?Y\.?\s?S\.", None),
];

/// Short reporters that read like ordinary abbreviations ("p. 45") when
/// lowercased; these only match with their canonical capitalization.
const CASE_SENSITIVE_REPORTERS: &[&str] = &["F.", "A.", "P.", "So."];

static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    let mut templates: Vec<Template> = CASE_REPORTERS
        .iter()
        .map(|&(name, reporter, pattern, court)| {
            let pattern = if CASE_SENSITIVE_REPORTERS.contains(&reporter) {
                format!("(?-i:{})", pattern)
            } else {
                pattern.to_string()
            };
            Template {
                name,
                family: Family::Case,
                reporter,
                court,
                regex: Regex::new(&format!(
                    r"(?i)\b(?P<volume>\d{{1,4}})\s+(?P<reporter>{})\s+(?P<page>\d{{1,6}}|_{{3,}})\b",
                    pattern
                ))
                .expect("case reporter pattern"),
            }
        })
        .collect();

    templates.push(Template {
        name: "Westlaw",
        family: Family::Westlaw,
        reporter: "WL",
        court: None,
        regex: Regex::new(r"(?i)\b(?P<year>\d{4})\s+WL\s+(?P<number>\d+)\b")
            .expect("westlaw pattern"),
    });
    templates.push(Template {
        name: "Lexis",
        family: Family::Lexis,
        reporter: "LEXIS",
        court: None,
        regex: Regex::new(
            r"(?i)\b(?P<year>\d{4})\s+U\.?\s?S\.?\s?(?P<division>Dist\.?\s?|App\.?\s?)?LEXIS\s+(?P<number>\d+)\b",
        )
        .expect("lexis pattern"),
    });
    templates.push(Template {
        name: "United States Code",
        family: Family::UsCode,
        reporter: "U.S.C.",
        court: None,
        regex: Regex::new(
            r"(?i)\b(?P<title>\d{1,2})\s+U\.?\s?S\.?\s?C\.?(?:\s?A\.?)?\s*(?:§{1,2}\s*)?(?P<section>\d+[a-z0-9]*(?:-\d+[a-z0-9]*)?)(?P<subsections>(?:\([a-z0-9]+\))*)",
        )
        .expect("usc pattern"),
    });
    templates.push(Template {
        name: "Code of Federal Regulations",
        family: Family::Cfr,
        reporter: "C.F.R.",
        court: None,
        regex: Regex::new(
            r"(?i)\b(?P<title>\d{1,2})\s+C\.?\s?F\.?\s?R\.?\s*(?:(?:§{1,2}|part|pt\.)\s*)?(?P<part>\d+)(?:\.(?P<section>\d+[a-z]*))?(?P<subsections>(?:\([a-z0-9]+\))*)",
        )
        .expect("cfr pattern"),
    });

    templates
});

static ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[Ii]d\.(?:\s+at\s+(?P<pin>\d+(?:[-–]\d+)?|\([a-z0-9]+\)))?").expect("id pattern")
});
static PIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^,\s*(?:at\s+)?(\d+(?:[-–]\d+)?)").expect("pin pattern"));
static PARALLEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+[A-Za-z]").expect("parallel pattern"));
static PAREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(([^()]{1,80})\)").expect("paren pattern"));
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(1[6-9]\d{2}|20\d{2})\s*$").expect("year pattern"));

/// A template match before short forms are resolved.
struct Candidate<'t> {
    template: &'t Template,
    start: usize,
    core_end: usize,
    caps: Captures<'t>,
}

/// Parse a single citation.
///
/// Strict mode requires the trimmed input to be exactly one canonical
/// citation. Broad mode returns the first long-form citation in the text.
pub fn parse(text: &str, mode: MatchMode) -> Option<Citation> {
    match mode {
        MatchMode::Strict => {
            let trimmed = text.trim();
            let (citation, core_end) = scan(trimmed).into_iter().next()?;
            let exact = citation.start == 0
                && citation.end == trimmed.len()
                && trimmed[..core_end] == canonical_core(&citation);
            exact.then_some(citation)
        }
        MatchMode::Broad => scan(text).into_iter().next().map(|(citation, _)| citation),
    }
}

/// Find every citation in `text`, in order of appearance.
///
/// `Id.` references inherit the most recent long-form citation; an `Id.`
/// with nothing before it is skipped.
pub fn extract(text: &str) -> Vec<Citation> {
    let mut events: Vec<(usize, Event)> = scan(text)
        .into_iter()
        .map(|(c, _)| (c.start, Event::Full(c)))
        .collect();

    for caps in ID_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let overlaps = events.iter().any(|(_, event)| match event {
            Event::Full(c) => whole.start() < c.end && c.start < whole.end(),
            Event::Id { .. } => false,
        });
        if !overlaps {
            events.push((
                whole.start(),
                Event::Id {
                    text: whole.as_str().to_string(),
                    start: whole.start(),
                    end: whole.end(),
                    pin: caps.name("pin").map(|m| m.as_str().to_string()),
                },
            ));
        }
    }
    events.sort_by_key(|(start, _)| *start);

    let mut citations = Vec::new();
    let mut antecedent: Option<Citation> = None;
    for (_, event) in events {
        match event {
            Event::Full(citation) => {
                antecedent = Some(citation.clone());
                citations.push(citation);
            }
            Event::Id { text, start, end, pin } => {
                let Some(base) = antecedent.as_ref() else {
                    tracing::debug!(offset = start, "Skipping Id. without antecedent");
                    continue;
                };
                let mut short = base.clone();
                short.text = text;
                short.start = start;
                short.end = end;
                short.short_form = true;
                short.pin_cite = pin.clone();
                short.tokens.remove("pin_cite");
                match pin {
                    // "Id. at (c)" names a subsection of the same provision.
                    Some(pin) if pin.starts_with('(') => {
                        short.tokens.insert("subsection".to_string(), pin);
                    }
                    Some(pin) => {
                        short.tokens.insert("pin_cite".to_string(), pin);
                    }
                    None => {}
                }
                short.canonical = render_canonical(&short);
                citations.push(short);
            }
        }
    }
    citations
}

/// Check whether `text` is a recognizable citation.
pub fn verify(text: &str) -> FormatVerification {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FormatVerification {
            valid: false,
            format: None,
            template: None,
            matching_mode: None,
            citation: text.to_string(),
            normalized: String::new(),
            tokens: BTreeMap::new(),
            issues: vec!["Citation is empty".to_string()],
        };
    }

    if let Some(citation) = parse(trimmed, MatchMode::Strict) {
        return FormatVerification {
            valid: true,
            format: Some("Recognized legal citation".to_string()),
            template: Some(citation.kind.clone()),
            matching_mode: Some(MatchMode::Strict.as_str().to_string()),
            citation: text.to_string(),
            normalized: citation.canonical.clone(),
            tokens: citation.tokens,
            issues: Vec::new(),
        };
    }

    if let Some(citation) = parse(trimmed, MatchMode::Broad) {
        return FormatVerification {
            valid: true,
            format: Some("Recognized legal citation (broad matching)".to_string()),
            template: Some(citation.kind.clone()),
            matching_mode: Some(MatchMode::Broad.as_str().to_string()),
            citation: text.to_string(),
            normalized: citation.canonical.clone(),
            tokens: citation.tokens,
            issues: vec![
                "Citation recognized only with broad matching - may be informal format"
                    .to_string(),
            ],
        };
    }

    FormatVerification {
        valid: false,
        format: None,
        template: None,
        matching_mode: None,
        citation: text.to_string(),
        normalized: trimmed.to_string(),
        tokens: BTreeMap::new(),
        issues: vec![
            "Citation does not match any recognized legal citation format".to_string(),
            "Consider checking the citation format against standard legal citation styles (Bluebook, etc.)"
                .to_string(),
        ],
    }
}

enum Event {
    Full(Citation),
    Id {
        text: String,
        start: usize,
        end: usize,
        pin: Option<String>,
    },
}

/// All non-overlapping long-form citations, earliest first, longest wins ties.
/// Each citation is paired with the end offset of its volume/reporter/page core.
fn scan(text: &str) -> Vec<(Citation, usize)> {
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for template in TEMPLATES.iter() {
        for caps in template.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            candidates.push(Candidate {
                template,
                start: whole.start(),
                core_end: whole.end(),
                caps,
            });
        }
    }
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.core_end.cmp(&a.core_end)));

    let mut citations = Vec::new();
    let mut cursor = 0;
    for candidate in candidates {
        if candidate.start < cursor {
            continue;
        }
        let citation = build(text, &candidate);
        cursor = citation.end;
        citations.push((citation, candidate.core_end));
    }
    citations
}

fn build(text: &str, candidate: &Candidate<'_>) -> Citation {
    let template = candidate.template;
    let caps = &candidate.caps;
    let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
    let mut tokens = BTreeMap::new();

    let (volume, page) = match template.family {
        Family::Case => {
            let volume = group("volume");
            let page = group("page");
            tokens.insert("volume".to_string(), volume.clone().unwrap_or_default());
            tokens.insert("reporter".to_string(), template.reporter.to_string());
            tokens.insert("page".to_string(), page.clone().unwrap_or_default());
            (volume, page)
        }
        Family::Westlaw | Family::Lexis => {
            let year = group("year");
            let number = group("number");
            tokens.insert("year".to_string(), year.clone().unwrap_or_default());
            tokens.insert("document_number".to_string(), number.clone().unwrap_or_default());
            (year, number)
        }
        Family::UsCode => {
            let title = group("title");
            let section = group("section");
            tokens.insert("title".to_string(), title.clone().unwrap_or_default());
            tokens.insert("section".to_string(), section.clone().unwrap_or_default());
            (title, section)
        }
        Family::Cfr => {
            let title = group("title");
            let part = group("part").unwrap_or_default();
            tokens.insert("title".to_string(), title.clone().unwrap_or_default());
            tokens.insert("part".to_string(), part.clone());
            let page = match group("section") {
                Some(section) => {
                    tokens.insert("section".to_string(), section.clone());
                    format!("{}.{}", part, section)
                }
                None => part,
            };
            (title, Some(page))
        }
    };

    let reporter = match template.family {
        Family::Lexis => {
            let division = group("division").unwrap_or_default().to_lowercase();
            if division.starts_with("dist") {
                "U.S. Dist. LEXIS".to_string()
            } else if division.starts_with("app") {
                "U.S. App. LEXIS".to_string()
            } else {
                "U.S. LEXIS".to_string()
            }
        }
        _ => template.reporter.to_string(),
    };
    if template.family == Family::Lexis {
        tokens.insert("reporter".to_string(), reporter.clone());
    }

    if let Some(subsections) = group("subsections").filter(|s| !s.is_empty()) {
        tokens.insert("subsection".to_string(), subsections);
    }

    // Trailing pin cite and "(court year)" parenthetical.
    let mut end = candidate.core_end;
    let mut pin_cite = None;
    if matches!(template.family, Family::Case | Family::Westlaw | Family::Lexis) {
        if let Some(pin) = PIN_RE.captures(&text[end..]) {
            let pin_end = end + pin.get(0).map_or(0, |m| m.end());
            if !PARALLEL_RE.is_match(&text[pin_end..]) {
                pin_cite = Some(pin[1].to_string());
                end = pin_end;
            }
        }
    }

    let mut court = template.court.map(str::to_string);
    let mut year = None;
    if let Some(paren) = PAREN_RE.captures(&text[end..]) {
        let content = paren[1].trim();
        if let Some(found) = YEAR_RE.captures(content) {
            year = found[1].parse::<u16>().ok();
            let court_text = content[..found.get(1).map_or(0, |m| m.start())]
                .trim()
                .trim_end_matches(',')
                .trim();
            if !court_text.is_empty() {
                court = Some(court_text.to_string());
            }
            end += paren.get(0).map_or(0, |m| m.end());
        }
    }
    if matches!(template.family, Family::Westlaw | Family::Lexis) && year.is_none() {
        year = volume.as_deref().and_then(|y| y.parse().ok());
    }

    if let Some(pin) = &pin_cite {
        tokens.insert("pin_cite".to_string(), pin.clone());
    }
    if let Some(court) = &court {
        tokens.insert("court".to_string(), court.clone());
    }
    if let Some(year) = year {
        tokens.insert("year".to_string(), year.to_string());
    }

    let mut citation = Citation {
        text: text[candidate.start..end].to_string(),
        kind: template.name.to_string(),
        volume,
        reporter: Some(reporter),
        page,
        pin_cite,
        court,
        year,
        tokens,
        canonical: String::new(),
        url: None,
        short_form: false,
        start: candidate.start,
        end,
    };
    citation.canonical = render_canonical(&citation);
    citation.url = citation_url(template.family, &citation);
    citation
}

fn canonical_core(citation: &Citation) -> String {
    let volume = citation.volume.as_deref().unwrap_or_default();
    let reporter = citation.reporter.as_deref().unwrap_or_default();
    let page = citation.page.as_deref().unwrap_or_default();
    let subsection = citation
        .tokens
        .get("subsection")
        .map(String::as_str)
        .unwrap_or_default();
    match reporter {
        "U.S.C." => format!("{} U.S.C. § {}{}", volume, page, subsection),
        "C.F.R." if citation.tokens.contains_key("section") => {
            format!("{} C.F.R. § {}{}", volume, page, subsection)
        }
        "C.F.R." => format!("{} C.F.R. Part {}{}", volume, page, subsection),
        _ => format!("{} {} {}", volume, reporter, page),
    }
}

fn render_canonical(citation: &Citation) -> String {
    let core = canonical_core(citation);
    match &citation.pin_cite {
        Some(pin) if pin.starts_with('(') => core,
        Some(pin) => format!("{}, {}", core, pin),
        None => core,
    }
}

fn citation_url(family: Family, citation: &Citation) -> Option<String> {
    let volume = citation.volume.as_deref()?;
    let page = citation.page.as_deref()?;
    if page.starts_with('_') {
        return None;
    }
    match family {
        Family::Case if citation.reporter.as_deref() == Some("U.S.") => Some(format!(
            "https://supreme.justia.com/cases/federal/us/{}/{}/",
            volume, page
        )),
        Family::Case => {
            let reporter = citation.reporter.as_deref()?.replace(' ', "%20");
            Some(format!(
                "https://www.courtlistener.com/c/{}/{}/{}/",
                reporter, volume, page
            ))
        }
        Family::UsCode => Some(format!(
            "https://www.law.cornell.edu/uscode/text/{}/{}",
            volume, page
        )),
        Family::Cfr if citation.tokens.contains_key("section") => Some(format!(
            "https://www.ecfr.gov/current/title-{}/section-{}",
            volume, page
        )),
        Family::Cfr => Some(format!(
            "https://www.ecfr.gov/current/title-{}/part-{}",
            volume, page
        )),
        Family::Westlaw | Family::Lexis => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_us_reports_strict() {
        let citation = parse("410 U.S. 113", MatchMode::Strict).unwrap();
        assert_eq!(citation.kind, "U.S. Reports");
        assert_eq!(citation.volume.as_deref(), Some("410"));
        assert_eq!(citation.reporter.as_deref(), Some("U.S."));
        assert_eq!(citation.page.as_deref(), Some("113"));
        assert_eq!(citation.court.as_deref(), Some("scotus"));
        assert_eq!(citation.canonical, "410 U.S. 113");
        assert_eq!(
            citation.url.as_deref(),
            Some("https://supreme.justia.com/cases/federal/us/410/113/")
        );
    }

    #[test]
    fn test_informal_spacing_is_broad_only() {
        assert!(parse("410 us 113", MatchMode::Strict).is_none());

        let citation = parse("410 us 113", MatchMode::Broad).unwrap();
        assert_eq!(citation.canonical, "410 U.S. 113");
    }

    #[test]
    fn test_federal_reporter_with_parenthetical() {
        let citation = parse("123 F.3d 456, 460 (9th Cir. 1997)", MatchMode::Strict).unwrap();
        assert_eq!(citation.reporter.as_deref(), Some("F.3d"));
        assert_eq!(citation.pin_cite.as_deref(), Some("460"));
        assert_eq!(citation.court.as_deref(), Some("9th Cir."));
        assert_eq!(citation.year, Some(1997));
        assert_eq!(citation.canonical, "123 F.3d 456, 460");
        assert_eq!(
            citation.url.as_deref(),
            Some("https://www.courtlistener.com/c/F.3d/123/456/")
        );
    }

    #[test]
    fn test_supplement_is_not_split_into_federal_reporter() {
        let citation = parse("see 245 F. Supp. 2d 1034 (D. Del. 2003)", MatchMode::Broad).unwrap();
        assert_eq!(citation.reporter.as_deref(), Some("F. Supp. 2d"));
        assert_eq!(citation.page.as_deref(), Some("1034"));
        assert_eq!(citation.court.as_deref(), Some("D. Del."));
    }

    #[test]
    fn test_westlaw() {
        let citation = parse("2023 WL 12345", MatchMode::Strict).unwrap();
        assert_eq!(citation.kind, "Westlaw");
        assert_eq!(citation.year, Some(2023));
        assert_eq!(citation.tokens["document_number"], "12345");
        assert!(citation.url.is_none());
    }

    #[test]
    fn test_lexis_division() {
        let citation = parse("2019 U.S. Dist. LEXIS 4567", MatchMode::Broad).unwrap();
        assert_eq!(citation.kind, "Lexis");
        assert_eq!(citation.reporter.as_deref(), Some("U.S. Dist. LEXIS"));
        assert_eq!(citation.canonical, "2019 U.S. Dist. LEXIS 4567");
    }

    #[test]
    fn test_us_code_with_subsection() {
        let citation = parse("42 USC § 1988(b)", MatchMode::Broad).unwrap();
        assert_eq!(citation.kind, "United States Code");
        assert_eq!(citation.volume.as_deref(), Some("42"));
        assert_eq!(citation.page.as_deref(), Some("1988"));
        assert_eq!(citation.tokens["subsection"], "(b)");
        assert_eq!(citation.canonical, "42 U.S.C. § 1988(b)");
        assert_eq!(
            citation.url.as_deref(),
            Some("https://www.law.cornell.edu/uscode/text/42/1988")
        );
        assert!(parse("42 USC § 1988(b)", MatchMode::Strict).is_none());
        assert!(parse("42 U.S.C. § 1988(b)", MatchMode::Strict).is_some());
    }

    #[test]
    fn test_cfr_section_and_part() {
        let section = parse("29 C.F.R. § 1910.1200", MatchMode::Strict).unwrap();
        assert_eq!(section.page.as_deref(), Some("1910.1200"));
        assert_eq!(section.tokens["part"], "1910");
        assert_eq!(
            section.url.as_deref(),
            Some("https://www.ecfr.gov/current/title-29/section-1910.1200")
        );

        let part = parse("40 CFR Part 60", MatchMode::Broad).unwrap();
        assert_eq!(part.canonical, "40 C.F.R. Part 60");
        assert_eq!(
            part.url.as_deref(),
            Some("https://www.ecfr.gov/current/title-40/part-60")
        );
    }

    #[test]
    fn test_parallel_citation_is_not_a_pin_cite() {
        let citations = extract("Roe v. Wade, 410 U.S. 113, 93 S. Ct. 705 (1973).");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].canonical, "410 U.S. 113");
        assert!(citations[0].pin_cite.is_none());
        assert_eq!(citations[1].reporter.as_deref(), Some("S. Ct."));
        assert_eq!(citations[1].year, Some(1973));
    }

    #[test]
    fn test_extract_with_id_reference() {
        let text = "Federal law provides that courts should award prevailing civil rights \
                    plaintiffs reasonable attorneys fees, 42 USC § 1988(b), and, by discretion, \
                    expert fees, id. at (c). See Riverside v. Rivera, 477 U.S. 561 (1986).";

        let citations = extract(text);
        assert_eq!(citations.len(), 3);

        assert_eq!(citations[0].kind, "United States Code");
        assert!(!citations[0].short_form);

        assert!(citations[1].short_form);
        assert_eq!(citations[1].text, "id. at (c)");
        assert_eq!(citations[1].page.as_deref(), Some("1988"));
        assert_eq!(citations[1].pin_cite.as_deref(), Some("(c)"));

        assert_eq!(citations[2].canonical, "477 U.S. 561");
        assert_eq!(citations[2].year, Some(1986));
        assert!(citations[0].start < citations[1].start);
        assert!(citations[1].start < citations[2].start);
    }

    #[test]
    fn test_page_references_are_not_reporters() {
        assert!(extract("The statute appears in Vol. 3 p. 45 of the session laws.").is_empty());
        assert!(extract("See note 12 a. 7 and chapter 2 f. 19.").is_empty());
        assert!(parse("3 p. 45", MatchMode::Broad).is_none());

        let citations = extract("Compare vol. 3 p. 45 with 17 P. 45 (Cal. 1888).");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].canonical, "17 P. 45");
    }

    #[test]
    fn test_id_without_antecedent_is_skipped() {
        let citations = extract("Id. at 5. Later, 550 U.S. 544.");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].canonical, "550 U.S. 544");
    }

    #[test]
    fn test_blank_page_has_no_url() {
        let citation = parse("598 U.S. ___ (2023)", MatchMode::Strict).unwrap();
        assert_eq!(citation.page.as_deref(), Some("___"));
        assert_eq!(citation.year, Some(2023));
        assert!(citation.url.is_none());
    }

    #[test]
    fn test_verify_modes() {
        let strict = verify("410 U.S. 113");
        assert!(strict.valid);
        assert_eq!(strict.matching_mode.as_deref(), Some("strict"));
        assert!(strict.issues.is_empty());

        let broad = verify("410 u.s. 113");
        assert!(broad.valid);
        assert_eq!(broad.matching_mode.as_deref(), Some("broad"));
        assert_eq!(broad.issues.len(), 1);
        assert_eq!(broad.normalized, "410 U.S. 113");

        let invalid = verify("not a citation");
        assert!(!invalid.valid);
        assert_eq!(invalid.issues.len(), 2);
        assert_eq!(invalid.normalized, "not a citation");
    }

    #[test]
    fn test_verify_empty() {
        let result = verify("   ");
        assert!(!result.valid);
        assert_eq!(result.issues, vec!["Citation is empty".to_string()]);
        assert_eq!(result.citation, "   ");
    }

    #[test]
    fn test_no_citations_in_plain_text() {
        assert!(extract("The court considered the motion on its merits.").is_empty());
    }
}
