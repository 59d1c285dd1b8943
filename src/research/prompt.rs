//! Analysis prompt rendering and backend answer normalization.

use regex::{NoExpand, Regex, RegexBuilder};

use crate::types::{AppError, ResearchBrief, Result};
use crate::utils::text::truncate_chars;

/// Report sections the backend is asked to produce, in order
pub const REPORT_SECTIONS: [(&str, &str); 8] = [
    (
        "EXECUTIVE SUMMARY",
        "Provide a clear, concise overview of the legal topic and key findings (2-3 paragraphs)",
    ),
    (
        "LEGAL FRAMEWORK AND PRINCIPLES",
        "Detail the fundamental legal principles, statutes, and regulations governing this area",
    ),
    (
        "CASE LAW AND PRECEDENTS",
        "Identify and analyze key court decisions, legal precedents, and their implications",
    ),
    (
        "CURRENT LEGAL STATUS",
        "Explain the current state of the law, recent developments, and jurisdictional variations",
    ),
    (
        "PRACTICAL IMPLICATIONS",
        "Discuss real-world applications, compliance requirements, and practical considerations",
    ),
    (
        "RISK ANALYSIS",
        "Identify potential legal risks, liabilities, and areas of uncertainty",
    ),
    (
        "STRATEGIC RECOMMENDATIONS",
        "Provide actionable legal guidance and best practices",
    ),
    (
        "AREAS FOR FURTHER RESEARCH",
        "Suggest specific areas requiring additional investigation or expert consultation",
    ),
];

const GUIDELINES: [&str; 6] = [
    "Base your analysis on the provided research data",
    "Cite specific sources and examples from the data",
    "Provide practical, actionable insights",
    "Highlight any limitations or gaps in the available information",
    "Use professional legal terminology while remaining accessible",
    "Include specific legal citations and references where available in the source material",
];

const PROMPT_KEY_POINTS: usize = 10;
const PROMPT_SOURCES: usize = 5;
const PROMPT_ARTICLES: usize = 5;
const PROMPT_SECTIONS: usize = 3;
const SECTION_PREVIEW_CHARS: usize = 200;

/// Render the analysis prompt for `brief`.
pub fn build_analysis_prompt(brief: &ResearchBrief) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are an expert legal researcher and analyst specializing in {}.\n\n",
        brief.domain_context
    ));
    prompt.push_str(&format!(
        "RESEARCH TASK: Conduct a comprehensive legal analysis on \"{}\"\n\n",
        brief.topic
    ));
    prompt.push_str("AVAILABLE DATA:\n\n");

    prompt.push_str("1. WEB SEARCH FINDINGS:\n");
    prompt.push_str(&brief.web_summary);
    prompt.push_str("\n\nKey Legal Points Found:\n");
    for point in brief.key_points.iter().take(PROMPT_KEY_POINTS) {
        prompt.push_str(&format!("• {}\n", point));
    }
    prompt.push_str("\nPrimary Sources:\n");
    for source in brief.top_web_sources.iter().take(PROMPT_SOURCES) {
        prompt.push_str(&format!("- {}: {}\n", source.title, source.preview));
    }

    prompt.push_str("\n2. WIKIPEDIA RESEARCH:\n");
    prompt.push_str(&brief.wiki_summary);
    prompt.push_str("\n\nRelevant Articles:\n");
    for article in brief.top_wiki_articles.iter().take(PROMPT_ARTICLES) {
        prompt.push_str(&format!("• {}: {}\n", article.title, article.summary));
    }
    prompt.push_str("\nKey Legal Sections:\n");
    for (name, text) in brief.key_sections.iter().take(PROMPT_SECTIONS) {
        prompt.push_str(&format!(
            "- {}: {}...\n",
            name,
            truncate_chars(text, SECTION_PREVIEW_CHARS)
        ));
    }

    prompt.push_str("\nANALYSIS REQUIREMENTS:\n");
    prompt.push_str("Please provide a detailed legal research report with the following structure:\n\n");
    for (header, instruction) in REPORT_SECTIONS {
        prompt.push_str(&format!("## {}\n{}\n\n", header, instruction));
    }

    prompt.push_str("IMPORTANT GUIDELINES:\n");
    for guideline in GUIDELINES {
        prompt.push_str(&format!("- {}\n", guideline));
    }
    prompt.push_str(
        "\nPlease ensure your analysis is comprehensive, well-structured, and professionally written.\n",
    );

    prompt
}

/// Normalizes backend answers into the canonical report layout
pub struct AnalysisFormatter {
    bold: Regex,
    italic: Regex,
    blank_lines: Regex,
    headers: Vec<(Regex, String)>,
}

impl AnalysisFormatter {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| AppError::Internal(format!("Invalid formatter pattern: {}", e)))
        };

        let headers = REPORT_SECTIONS
            .iter()
            .map(|(header, _)| {
                let escaped = regex::escape(header);
                let pattern = compile(&format!(r"#+\s*{}|{}:?", escaped, escaped))?;
                let replacement = format!("\n{}\n{}", header, "=".repeat(header.len()));
                Ok((pattern, replacement))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            bold: compile(r"\*\*(.*?)\*\*")?,
            italic: compile(r"\*(.*?)\*")?,
            blank_lines: compile(r"\n\s*\n\s*\n")?,
            headers,
        })
    }

    /// Strip emphasis markers, squeeze blank lines, rewrite section headers
    /// as underlined titles.
    pub fn format(&self, analysis: &str) -> String {
        let text = self.bold.replace_all(analysis, "$1");
        let text = self.italic.replace_all(&text, "$1");
        let mut text = self.blank_lines.replace_all(&text, "\n\n").into_owned();

        for (pattern, replacement) in &self.headers {
            text = pattern
                .replace_all(&text, NoExpand(replacement))
                .into_owned();
        }

        text.trim().to_string()
    }
}

/// One-shot form of [`AnalysisFormatter::format`].
pub fn format_analysis_output(analysis: &str) -> Result<String> {
    Ok(AnalysisFormatter::new()?.format(analysis))
}
