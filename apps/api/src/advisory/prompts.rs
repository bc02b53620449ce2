// Prompt templates for the career coach.
// Placeholders are substituted by `build_prompt`; nothing here does I/O.

use crate::advisory::workflow::AdviceKind;
use crate::estimate::selection::Selection;

/// Negotiation script prompt.
/// Replace: {seniority}, {industry}, {location}, {total}, {skills}
pub const NEGOTIATION_PROMPT_TEMPLATE: &str = "\
Act as an expert salary negotiation coach. I am a {seniority} level professional in the \
{industry} industry based in {location}. My estimated market salary is {total}. \
My key skills are: {skills}.

Write a brief, professional, and persuasive 3-point script I can use in an interview or email \
to negotiate for a 10-15% higher salary. Focus on the value of my specific seniority and skills. \
Keep it concise.";

/// Growth roadmap prompt.
/// Replace: {seniority}, {industry}, {skills}
pub const ROADMAP_PROMPT_TEMPLATE: &str = "\
Act as a technical career mentor for a Data Scientist. I am currently at the {seniority} level \
in the {industry} industry. My current skills are: {skills}.

Identify 3 specific, high-impact technologies, concepts, or project types I should master next \
to significantly increase my salary and move to the next career level. Explain why for each. \
Keep it actionable and brief.";

const NEGOTIATION_EMPTY_SKILLS: &str = "general data science skills";
const ROADMAP_EMPTY_SKILLS: &str = "basic proficiency";

pub fn build_prompt(selection: &Selection, total: i64, kind: AdviceKind) -> String {
    match kind {
        AdviceKind::Negotiation => NEGOTIATION_PROMPT_TEMPLATE
            .replace("{seniority}", &selection.seniority)
            .replace("{industry}", &selection.industry)
            .replace("{location}", &selection.location)
            .replace("{total}", &format!("€{}", group_thousands(total)))
            .replace("{skills}", &skills_phrase(selection, NEGOTIATION_EMPTY_SKILLS)),
        AdviceKind::Roadmap => ROADMAP_PROMPT_TEMPLATE
            .replace("{seniority}", &selection.seniority)
            .replace("{industry}", &selection.industry)
            .replace("{skills}", &skills_phrase(selection, ROADMAP_EMPTY_SKILLS)),
    }
}

fn skills_phrase(selection: &Selection, fallback: &str) -> String {
    if selection.skills.is_empty() {
        fallback.to_string()
    } else {
        selection.skills.join(", ")
    }
}

/// 160000 → "160,000"; -5000 → "-5,000".
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
