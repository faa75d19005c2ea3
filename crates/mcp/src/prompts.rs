//! Research workflow prompts.
//!
//! Each prompt renders to a single user message describing a sequence of
//! tool calls. Prompt arguments arrive as strings; flags accept `true`/`false`
//! as either JSON booleans or strings.

use crate::error::McpError;
use crate::protocol::{GetPromptResult, Prompt, PromptArgument, PromptMessage, ToolContent};
use serde_json::{Map, Value};

struct PromptDef {
    name: &'static str,
    description: &'static str,
    /// (name, description, required)
    arguments: &'static [(&'static str, &'static str, bool)],
}

const PROMPTS: &[PromptDef] = &[
    PromptDef {
        name: "verify-citation",
        description: "Multi-step citation verification workflow",
        arguments: &[("citation", "The citation to verify", true)],
    },
    PromptDef {
        name: "analyze-case",
        description: "Analyze a specific legal case with citation, holding, and reasoning",
        arguments: &[
            ("case_name", "The name of the case to analyze", true),
            ("include_citations", "Whether to include cited cases (default true)", false),
        ],
    },
    PromptDef {
        name: "research-judge",
        description: "Research a judge's opinions and judicial history",
        arguments: &[
            ("judge_name", "The name of the judge to research", true),
            ("court", "Optional court filter", false),
        ],
    },
    PromptDef {
        name: "compare-cases",
        description: "Compare two legal cases for similarities and differences",
        arguments: &[
            ("case_1", "First case name or citation", true),
            ("case_2", "Second case name or citation", true),
        ],
    },
    PromptDef {
        name: "case-law-summary",
        description: "Generate a comprehensive summary of a legal opinion",
        arguments: &[
            ("case_identifier", "Case name, citation, or opinion ID", true),
            ("include_procedural_history", "Include procedural history (default true)", false),
        ],
    },
    PromptDef {
        name: "find-precedents",
        description: "Find and analyze relevant precedent cases for a legal issue",
        arguments: &[
            ("legal_issue", "Description of the legal issue", true),
            ("jurisdiction", "Preferred jurisdiction (default federal)", false),
        ],
    },
    PromptDef {
        name: "semantic-vs-keyword-search",
        description: "Guide for choosing between semantic and keyword search",
        arguments: &[],
    },
    PromptDef {
        name: "natural-language-search",
        description: "Example workflow for semantic/natural language legal research",
        arguments: &[
            ("research_question", "The natural language research question", true),
            ("court_filter", "Optional court filter", false),
        ],
    },
    PromptDef {
        name: "keyword-search-guide",
        description: "Example workflow for keyword/Boolean legal research",
        arguments: &[
            ("search_terms", "The keywords or Boolean query", true),
            ("court_filter", "Optional court filter", false),
        ],
    },
    PromptDef {
        name: "regulation-research",
        description: "Research federal regulations on a topic in the eCFR",
        arguments: &[
            ("topic", "The regulatory topic to research", true),
            ("title", "Optional CFR title number to focus on", false),
        ],
    },
];

pub fn list() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|def| Prompt {
            name: def.name.to_string(),
            description: def.description.to_string(),
            arguments: def
                .arguments
                .iter()
                .map(|(name, description, required)| PromptArgument {
                    name: name.to_string(),
                    description: description.to_string(),
                    required: *required,
                })
                .collect(),
        })
        .collect()
}

/// Validated prompt arguments.
struct Args<'a> {
    values: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    fn text(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "false" | "no" | "0" => false,
                "true" | "yes" | "1" => true,
                _ => default,
            },
            _ => default,
        }
    }
}

/// Render a prompt by name.
pub fn get(name: &str, arguments: &Map<String, Value>) -> Result<GetPromptResult, McpError> {
    let def = PROMPTS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| McpError::PromptNotFound(name.to_string()))?;

    let args = Args { values: arguments };
    for (arg, _, required) in def.arguments {
        if *required && args.text(arg).is_empty() {
            return Err(McpError::InvalidParams(format!(
                "Missing required argument '{}' for prompt '{}'",
                arg, name
            )));
        }
    }

    let lines = render(def.name, &args);
    Ok(GetPromptResult {
        description: def.description.to_string(),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::text(lines.join("\n")),
        }],
    })
}

fn render(name: &str, args: &Args<'_>) -> Vec<String> {
    let s = |line: &str| line.to_string();
    match name {
        "verify-citation" => {
            let citation = args.text("citation");
            vec![
                format!("I need to verify this legal citation: {}", citation),
                s(""),
                s("Please perform these verification steps systematically:"),
                s(""),
                format!("1. Use 'verify_citation_format' tool to check if '{}' is in valid format", citation),
                s("   - Report the recognized format type"),
                s("   - Note any formatting issues"),
                s(""),
                format!("2. Use 'parse_citation' tool to parse '{}'", citation),
                s("   - Extract volume, reporter, page number"),
                s("   - Get normalized citation format"),
                s(""),
                format!("3. Use 'lookup_citation' tool to find the actual case for '{}'", citation),
                s("   - Confirm the case exists in CourtListener"),
                s("   - Retrieve case name and parties"),
                s(""),
                s("4. Cross-reference all three results and provide verification summary"),
            ]
        }
        "analyze-case" => {
            let case_name = args.text("case_name");
            let mut lines = vec![
                format!("I need to perform a comprehensive legal analysis of the case: {}", case_name),
                s(""),
                s("Please follow these steps:"),
                format!("1. Search for the case using 'opinions' tool with query: '{}'", case_name),
                s("2. Identify the primary opinion and retrieve its full text"),
                s("3. Extract and summarize: case citation, court, dates, parties, facts, issues, holding, reasoning"),
            ];
            if args.flag("include_citations", true) {
                lines.push(s("4. Use 'extract_citations_from_text' to identify all cited cases"));
                lines.push(s("5. Look up the most important precedents and explain how they support the holding"));
            }
            lines
        }
        "research-judge" => {
            let judge = args.text("judge_name");
            let court = args.text("court");
            let mut lines = vec![
                format!("I need to research the judicial history of: {}", judge),
                s(""),
                s("Please follow this research workflow:"),
                format!("1. Use 'people' tool to search for judge: '{}'", judge),
                s("2. Get the full judge profile using 'person' tool with the judge's ID"),
            ];
            if court.is_empty() {
                lines.push(s("3. Search for opinions authored by this judge using 'opinions' tool"));
            } else {
                lines.push(format!(
                    "3. Search for opinions by this judge in court '{}' using 'opinions' tool",
                    court
                ));
            }
            lines.push(s("4. Analyze the judge's record: topics, notable decisions, judicial philosophy, dissents"));
            lines.push(s("5. Provide comprehensive summary: biography, career, significant opinions, expertise"));
            lines
        }
        "compare-cases" => vec![
            format!(
                "I need to compare these two legal cases: {} and {}",
                args.text("case_1"),
                args.text("case_2")
            ),
            s(""),
            s("STEP 1: Retrieve both cases using appropriate tools"),
            s("STEP 2: Extract key information: citation, court, date, parties, facts, issues, holdings"),
            s("STEP 3: Compare similarities: legal issues, facts, area of law, precedents cited"),
            s("STEP 4: Compare differences: outcomes, jurisdictions, time periods, factual distinctions"),
            s("STEP 5: Analyze relationship: does one cite the other? Same line of precedent? Conflicts?"),
            s("STEP 6: Provide comprehensive comparison with side-by-side table and legal analysis"),
        ],
        "case-law-summary" => {
            let case = args.text("case_identifier");
            let mut lines = vec![
                format!("I need a comprehensive summary of this legal opinion: {}", case),
                s(""),
                s("Please create a structured case summary:"),
                format!("1. CASE IDENTIFICATION: Retrieve {}, get full name, citation, court, date", case),
            ];
            let mut step = 2;
            if args.flag("include_procedural_history", true) {
                lines.push(s("2. PROCEDURAL HISTORY: Lower court proceedings, how case reached this court"));
                step = 3;
            }
            for (offset, section) in [
                "FACTS: Key factual background, events, parties' positions",
                "LEGAL ISSUES: Questions of law presented",
                "HOLDING: Court's decision and disposition",
                "REASONING: Analysis, precedents applied, statutory interpretation",
                "RULE OF LAW: Legal principles established",
                "ADDITIONAL OPINIONS: Concurrences, dissents if any",
            ]
            .iter()
            .enumerate()
            {
                lines.push(format!("{}. {}", step + offset, section));
            }
            lines.push(s("Format professionally with clear headings and concise language"));
            lines
        }
        "find-precedents" => {
            let issue = args.text("legal_issue");
            let mut jurisdiction = args.text("jurisdiction");
            if jurisdiction.is_empty() {
                jurisdiction = s("federal");
            }
            vec![
                format!("I need to find relevant precedent cases for this legal issue: {}", issue),
                format!("Preferred jurisdiction: {}", jurisdiction),
                s(""),
                s("PHASE 1: Initial Search"),
                format!("1. Search for opinions using key terms from '{}'", issue),
                format!("   - Filter by jurisdiction: {}", jurisdiction),
                s("   - Sort by citation count (most influential)"),
                s(""),
                s("PHASE 2: Evaluate Relevance"),
                s("2. For each case: assess if it addresses the same issue, review holding, check citation count"),
                s(""),
                s("PHASE 3: Identify Key Precedents"),
                s("3. Select the 3-5 most relevant cases"),
                s("   - Prioritize: binding > persuasive, recent > old, higher courts > lower courts"),
                s(""),
                s("PHASE 4: Deep Analysis"),
                s("4. For each key precedent: retrieve full text, extract specific holding, note reasoning"),
                s(""),
                s("PHASE 5: Precedent Summary"),
                s("5. Provide structured summary: binding precedents, persuasive precedents, trends, conflicts, recommended citations"),
            ]
        }
        "semantic-vs-keyword-search" => [
            "CHOOSING BETWEEN SEMANTIC AND KEYWORD SEARCH",
            "",
            "CourtListener provides two search methods. Choose based on your query type:",
            "",
            "USE SEMANTIC SEARCH (semantic_search tool) when:",
            "  - You have a natural language question (e.g., 'What are the legal standards for search warrants?')",
            "  - You're researching a concept or topic (e.g., 'cases about environmental protection')",
            "  - You want to find similar cases by meaning, not exact words",
            "  - You don't know the exact legal terms yet",
            "",
            "USE KEYWORD SEARCH (opinions tool) when:",
            "  - You know the specific case name or citation (e.g., 'Brown v. Board of Education')",
            "  - You're searching for exact legal terms or phrases (e.g., 'qualified immunity')",
            "  - You need Boolean queries with AND/OR/NOT operators",
            "  - You want field-specific searches (e.g., caseName:\"Smith\" judge:\"Roberts\")",
            "",
            "SEARCH CAPABILITIES:",
            "  - Both methods support court filters, date ranges, citation counts and result limits",
            "  - Both return highlighted snippets with <mark> tags and relevance scores",
            "",
            "BEST PRACTICES:",
            "  1. For known cases: use keyword search (opinions tool)",
            "  2. For legal concepts: start with semantic search (semantic_search tool)",
            "  3. For comprehensive research: use both methods and compare results",
            "  4. Review highlighted snippets to verify relevance",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect(),
        "natural-language-search" => {
            let question = args.text("research_question");
            let court = args.text("court_filter");
            let mut lines = vec![
                format!("SEMANTIC SEARCH WORKFLOW: {}", question),
                s(""),
                s("STEP 1: Initial Semantic Search"),
                format!("  - Use 'semantic_search' tool with natural_query: '{}'", question),
            ];
            if !court.is_empty() {
                lines.push(format!("  - Filter by court: '{}'", court));
            }
            lines.extend(
                [
                    "  - Set limit to 20 for good coverage",
                    "  - Sort by 'score desc' to get the most relevant cases first",
                    "",
                    "STEP 2: Review Highlighted Snippets",
                    "  - Examine the <mark> tags in returned snippets",
                    "  - Identify which results are truly relevant to your question",
                    "",
                    "STEP 3: Refine if Needed",
                    "  - If results are too broad: add date filters or citation count filters",
                    "  - If not enough results: rephrase the question",
                    "",
                    "STEP 4: Deep Dive on Top Results",
                    "  - Use the courtlistener://opinions/{id} resource to read full opinions",
                    "  - Extract key holdings, reasoning, and citations from the top 3-5 results",
                    "",
                    "STEP 5: Synthesize Findings",
                    "  - Summarize the legal standards across the relevant cases",
                    "  - Note any trends, splits in authority, or evolving doctrines",
                ]
                .iter()
                .map(|line| line.to_string()),
            );
            lines
        }
        "keyword-search-guide" => {
            let terms = args.text("search_terms");
            let court = args.text("court_filter");
            let mut lines = vec![
                format!("KEYWORD SEARCH WORKFLOW: {}", terms),
                s(""),
                s("STEP 1: Construct Precise Query"),
                format!("  - Base query: '{}'", terms),
                s("  - Consider Boolean operators: AND, OR, NOT"),
                s("  - Use quotes for exact phrases: \"qualified immunity\""),
                s(""),
                s("STEP 2: Execute Keyword Search"),
                format!("  - Use 'opinions' tool with q: '{}'", terms),
            ];
            if !court.is_empty() {
                lines.push(format!("  - Filter by court: '{}'", court));
            }
            lines.extend(
                [
                    "  - Sort by 'score desc' for relevance or 'dateFiled desc' for recency",
                    "",
                    "STEP 3: Analyze Match Quality",
                    "  - Examine <mark> tags to see which terms were matched",
                    "",
                    "STEP 4: Refine Query",
                    "  - Too many results? Add more specific terms or field filters",
                    "  - Too few results? Use broader terms or remove restrictive filters",
                    "",
                    "STEP 5: Retrieve Full Cases",
                    "  - Use the courtlistener://opinions/{id} resource for complete opinion text",
                ]
                .iter()
                .map(|line| line.to_string()),
            );
            lines
        }
        "regulation-research" => {
            let topic = args.text("topic");
            let title = args.text("title");
            let mut lines = vec![
                format!("I need to research federal regulations on: {}", topic),
                s(""),
            ];
            if title.is_empty() {
                lines.push(s("1. Use 'ecfr_list_titles' to identify the CFR titles likely to cover this topic"));
                lines.push(format!("2. Use 'ecfr_search' with query: '{}'", topic));
            } else {
                lines.push(format!("1. Focus on CFR title {}", title));
                lines.push(format!("2. Use 'ecfr_search' with query: '{}' and title: {}", topic, title));
            }
            lines.extend(
                [
                    "3. Use 'ecfr_get_structure' to see where the matching parts sit in the title",
                    "4. Use 'ecfr_get_section' to read the text of the most relevant sections",
                    "5. Use 'ecfr_get_versions' to check when those sections were last amended",
                    "6. Search 'opinions' for cases interpreting the regulations you found",
                    "7. Summarize the governing rules, the agencies responsible, and any recent changes",
                ]
                .iter()
                .map(|line| line.to_string()),
            );
            lines
        }
        _ => Vec::new(),
    }
}
