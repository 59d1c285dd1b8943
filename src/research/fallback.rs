//! Deterministic report used when no analysis backend answer is available.

use chrono::{DateTime, Utc};

use crate::types::{AnalysisResult, ResearchBrief};

const WEB_FINDINGS: usize = 5;
const WIKI_FINDINGS: usize = 3;

/// Builds the degraded-mode narrative from a brief alone.
///
/// Output depends only on the brief and the timestamp passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackReportBuilder;

impl FallbackReportBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, brief: &ResearchBrief, timestamp: DateTime<Utc>) -> AnalysisResult {
        AnalysisResult {
            topic: brief.topic.clone(),
            domain: brief.domain.clone(),
            narrative_text: self.render(brief, timestamp),
            timestamp,
            sources_count: brief.sources_count(),
            quality_score: brief.data_quality,
            degraded: true,
            model: None,
        }
    }

    fn render(&self, brief: &ResearchBrief, timestamp: DateTime<Utc>) -> String {
        let topic = &brief.topic;
        let context = brief.domain_context.to_lowercase();
        let total = brief.sources_count();
        let mut out = String::new();

        out.push_str(&heading(&format!("LEGAL RESEARCH REPORT: {}", topic.to_uppercase())));
        out.push_str(&format!("DOMAIN: {}\n", brief.domain_context));
        out.push_str(&format!("RESEARCH DATE: {}\n", timestamp.format("%B %d, %Y")));
        out.push_str(&format!(
            "SOURCES ANALYZED: {} web sources, {} Wikipedia articles\n\n",
            brief.web_count, brief.wiki_count
        ));

        out.push_str(&heading("EXECUTIVE SUMMARY"));
        out.push_str(&format!(
            "This legal research report examines {} within the context of {}.\n\
             The analysis is based on {} sources including legal websites,\n\
             academic articles, and authoritative Wikipedia entries.\n\n",
            topic, context, total
        ));

        out.push_str(&heading("RESEARCH FINDINGS"));
        if !brief.top_web_sources.is_empty() {
            out.push_str("WEB SOURCE ANALYSIS:\n");
            for (i, source) in brief.top_web_sources.iter().take(WEB_FINDINGS).enumerate() {
                out.push_str(&format!("\n{}. {}\n", i + 1, source.title));
                out.push_str(&format!("   URL: {}\n", source.url));
                out.push_str(&format!(
                    "   Legal Relevance Score: {:.1}/10\n",
                    source.relevance_score
                ));
                out.push_str(&format!("   Key Content: {}\n", source.preview));
            }
            out.push('\n');
        }
        if !brief.top_wiki_articles.is_empty() {
            out.push_str("WIKIPEDIA RESEARCH:\n");
            for (i, article) in brief.top_wiki_articles.iter().take(WIKI_FINDINGS).enumerate() {
                out.push_str(&format!("\n{}. {}\n", i + 1, article.title));
                out.push_str(&format!("   URL: {}\n", article.url));
                out.push_str(&format!("   Summary: {}...\n", article.summary));
                if !article.highlights.is_empty() {
                    out.push_str("   Key Sections:\n");
                    for section in &article.highlights {
                        out.push_str(&format!("   - {}: {}...\n", section.name, section.text));
                    }
                }
            }
            out.push('\n');
        }
        if brief.top_web_sources.is_empty() && brief.top_wiki_articles.is_empty() {
            out.push_str("No source material could be collected for this topic.\n\n");
        }

        out.push_str(&heading("LEGAL IMPLICATIONS"));
        out.push_str(&format!(
            "Based on the research conducted, several key legal considerations emerge regarding {topic}:\n\n\
             1. REGULATORY FRAMEWORK: The legal landscape surrounding {topic} involves multiple\n   \
             jurisdictions and regulatory bodies, each with specific requirements and procedures.\n\n\
             2. COMPLIANCE REQUIREMENTS: Organizations and individuals dealing with {topic} must\n   \
             navigate complex compliance obligations that vary by jurisdiction and context.\n\n\
             3. RISK FACTORS: Key legal risks identified include regulatory non-compliance,\n   \
             contractual disputes, and potential liability issues.\n\n"
        ));

        out.push_str(&heading("PRACTICAL RECOMMENDATIONS"));
        out.push_str(&format!(
            "1. Consult with qualified legal professionals specializing in {context}\n\
             2. Stay current with regulatory changes and legal developments\n\
             3. Implement robust compliance monitoring systems\n\
             4. Document all relevant legal procedures and decisions\n\
             5. Consider jurisdiction-specific variations in legal requirements\n\n"
        ));

        out.push_str(&heading("AREAS FOR FURTHER RESEARCH"));
        out.push_str(&format!(
            "1. Recent case law developments and their implications\n\
             2. Regulatory updates and proposed legislative changes\n\
             3. Jurisdiction-specific legal requirements and procedures\n\
             4. Industry-specific compliance standards and best practices\n\
             5. Expert legal opinions on emerging issues in {topic}\n\n"
        ));

        let content_quality = if brief.web_count > 5 { "High" } else { "Moderate" };
        let legal_relevance = if brief.top_web_sources.iter().any(|s| s.relevance_score > 5.0) {
            "Strong"
        } else {
            "Moderate"
        };
        out.push_str(&heading("DATA QUALITY ASSESSMENT"));
        out.push_str(&format!("Sources Evaluated: {}\n", total));
        out.push_str(&format!("Content Quality: {}\n", content_quality));
        out.push_str(&format!("Legal Relevance: {}\n", legal_relevance));
        out.push_str(&format!("Data Quality Score: {:.1}/10\n\n", brief.data_quality));

        out.push_str(&heading("IMPORTANT NOTICE"));
        out.push_str(
            "This analysis is generated for research purposes only and does not constitute legal advice.\n\
             The information provided may not be current or applicable to specific situations.\n\
             Always consult with qualified legal professionals for matters requiring legal expertise.\n\n\
             Generated by: Themis Legal Research (Fallback Mode)\n\
             Note: Configure an analysis backend under [backend] for AI-powered analysis.\n",
        );

        out
    }
}

fn heading(title: &str) -> String {
    format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
}
