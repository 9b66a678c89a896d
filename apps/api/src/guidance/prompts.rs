// All LLM prompt templates for the guidance module.
// Templates only ever receive a validated `PromptParams`.

use crate::catalog::CareerSelection;
use crate::errors::AppError;
use crate::llm_client::prompts::INDIA_FOCUS;
use crate::search_client::{format_results, SearchResult};
use crate::session::models::ChatTurn;

/// Shortest resume text worth sending for review.
pub const MIN_RESUME_CHARS: usize = 100;

/// The typed parameters every template is built from.
#[derive(Debug, Clone)]
pub struct PromptParams {
    pub selection: Option<CareerSelection>,
    pub history: Vec<ChatTurn>,
}

impl PromptParams {
    pub fn new(selection: Option<CareerSelection>, history: Vec<ChatTurn>) -> Self {
        Self { selection, history }
    }

    /// Selection-driven templates refuse to render without a career choice.
    pub fn require_selection(&self) -> Result<&CareerSelection, AppError> {
        self.selection.as_ref().ok_or_else(|| {
            AppError::Validation(
                "Select a career category and role before requesting guidance".to_string(),
            )
        })
    }
}

pub fn career_insights_prompt(params: &PromptParams) -> Result<String, AppError> {
    let selection = params.require_selection()?;
    Ok(format!(
        r#"Generate a comprehensive career analysis for:

**Category**: {category}
**Career**: {role}

Provide structured markdown that includes:
1) Career Overview (role, responsibilities, daily tasks)
2) Required Skills & Tools (technical + soft skills)
3) Learning Roadmap (beginner → intermediate → advanced)
4) Career Progression Path (roles & salary bands in India)
5) Future Outlook & trends
6) Suggested Resources (courses, books, certifications)
7) Quick Reference Summary (salary ranges in INR, demand in India, remote options)

Keep the output practical, actionable, and formatted in markdown. {INDIA_FOCUS}"#,
        category = selection.category(),
        role = selection.role(),
    ))
}

/// Query sent to the search provider ahead of market analysis.
pub fn market_search_query(params: &PromptParams) -> Result<String, AppError> {
    let selection = params.require_selection()?;
    Ok(format!(
        "{} jobs India hiring trends salary",
        selection.role()
    ))
}

pub fn market_analysis_prompt(
    params: &PromptParams,
    results: &[SearchResult],
) -> Result<String, AppError> {
    let selection = params.require_selection()?;
    Ok(format!(
        r#"Analyze the current job market in India for the role: "{role}" ({category}).

LIVE SEARCH RESULTS (cite these as sources where you use them):
{results}

Please include:
- Current job demand and hiring trends in India (last 12 months)
- Typical salary ranges in INR (entry / mid / senior level)
- Top Indian companies hiring and industry sectors
- Major hiring cities in India (Bangalore, Mumbai, Delhi, Hyderabad, Pune, etc.)
- Skills in highest demand for this role in India
- Remote work availability and trends in India
- Short list of sources (urls or site names) used

Return a concise, well-structured markdown analysis with bullet points and a small summary table.
{INDIA_FOCUS}"#,
        role = selection.role(),
        category = selection.category(),
        results = format_results(results),
    ))
}

pub fn college_recommendations_prompt(params: &PromptParams) -> Result<String, AppError> {
    let selection = params.require_selection()?;
    Ok(format!(
        r#"As a college advisor, provide detailed recommendations for pursuing a career in "{role}" ({category}) in India.

Please include:

1) **Recommended Educational Paths**: degree programs, specializations, duration and typical eligibility
2) **Top Indian Colleges/Universities** (at least 10-15): IITs, NITs, IIITs and other premier institutes, state universities and private colleges, admission processes (JEE, GATE, CAT, etc.), approximate fees and placement records where known
3) **Alternative Education Paths**: online courses and certifications, bootcamps and vocational training, diploma programs
4) **Entrance Exams**: required exams, preparation tips and resources
5) **Scholarships & Financial Aid**: government scholarships, merit-based and need-based options
6) **Additional Tips**: best states/cities for education in this field, certifications to pursue alongside a degree, internship opportunities

Format the response in clear markdown with sections, bullet points, and tables where appropriate.
{INDIA_FOCUS}"#,
        role = selection.role(),
        category = selection.category(),
    ))
}

/// Resume review prompt. The target role is free text typed by the user, so
/// it is checked here rather than through the catalog.
pub fn resume_feedback_prompt(resume_text: &str, target_role: &str) -> Result<String, AppError> {
    let resume_text = resume_text.trim();
    let target_role = target_role.trim();
    if resume_text.chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "Please provide your resume content (at least {MIN_RESUME_CHARS} characters)"
        )));
    }
    if target_role.is_empty() {
        return Err(AppError::Validation(
            "Provide a target role or select a career first".to_string(),
        ));
    }

    Ok(format!(
        r#"As an expert resume coach, analyze the following resume for the target role: "{target_role}"

**Resume Content**:
{resume_text}

Provide comprehensive feedback in the following structure:

1) **Overall Assessment** (Score: X/10): strengths, weaknesses, first impression
2) **Content Analysis**: relevance to the role, quantified achievements, skills alignment, missing information
3) **Format & Structure**: layout and readability, section organization, length
4) **Specific Improvements Needed**: what to add, what to cut, how to rephrase, ATS optimization tips
5) **Section-by-Section Feedback**: summary, work experience, education, skills, projects/certifications
6) **Action Items** (priority-ordered): top 5-7 changes, ATS keywords, formatting fixes
7) **Example Improvements**: before/after rewrites for 2-3 bullet points
8) **Industry-Specific Tips**: advice for the Indian job market and Indian recruiters

Be constructive, specific, and actionable. Use markdown formatting with clear sections."#
    ))
}

/// Chat prompt over the last `window` turns. `history` must already end with
/// the user's question.
pub fn chat_prompt(params: &PromptParams, question: &str, window: usize) -> String {
    let start = params.history.len().saturating_sub(window);
    let context = params.history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    let interest = match &params.selection {
        Some(selection) => format!(
            "\nThe user is exploring the {} category, specifically the role of {}.\n",
            selection.category(),
            selection.role()
        ),
        None => String::new(),
    };

    format!(
        r#"You are a helpful AI career advisor with expertise in:
- Career guidance and job market trends (especially in India)
- Indian colleges and universities
- Resume writing and optimization
- Skills development and learning paths
{interest}
Conversation context:
{context}

User question: {question}

Provide a helpful, concise answer.
When discussing education, focus on Indian institutions. When discussing salaries, use INR."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::Role;

    fn scientist() -> PromptParams {
        PromptParams::new(
            Some(CareerSelection::resolve("Technology", "Data Scientist").unwrap()),
            Vec::new(),
        )
    }

    #[test]
    fn test_career_prompt_names_category_and_role() {
        let prompt = career_insights_prompt(&scientist()).unwrap();
        assert!(prompt.contains("**Category**: Technology"));
        assert!(prompt.contains("**Career**: Data Scientist"));
        assert!(prompt.contains("INR"));
    }

    #[test]
    fn test_selection_templates_require_selection() {
        let params = PromptParams::new(None, Vec::new());
        assert!(matches!(
            career_insights_prompt(&params),
            Err(AppError::Validation(_))
        ));
        assert!(college_recommendations_prompt(&params).is_err());
        assert!(market_search_query(&params).is_err());
    }

    #[test]
    fn test_market_prompt_embeds_search_snippets() {
        let results = vec![SearchResult {
            position: 1,
            title: "Naukri report".into(),
            link: Some("https://naukri.example".into()),
            snippet: "Openings up 18%".into(),
        }];
        let prompt = market_analysis_prompt(&scientist(), &results).unwrap();
        assert!(prompt.contains("Data Scientist"));
        assert!(prompt.contains("1. Naukri report (https://naukri.example): Openings up 18%"));
    }

    #[test]
    fn test_resume_prompt_rejects_short_text() {
        let err = resume_feedback_prompt("Too short", "Data Scientist").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_resume_prompt_requires_target_role() {
        let resume = "x".repeat(MIN_RESUME_CHARS);
        assert!(resume_feedback_prompt(&resume, "  ").is_err());
        let prompt = resume_feedback_prompt(&resume, "Data Engineer").unwrap();
        assert!(prompt.contains("target role: \"Data Engineer\""));
    }

    #[test]
    fn test_chat_prompt_uses_only_recent_window() {
        let mut params = scientist();
        for i in 0..12 {
            params
                .history
                .push(ChatTurn::new(Role::User, format!("message-{i:02}")));
        }
        let prompt = chat_prompt(&params, "message-11", 8);

        assert!(!prompt.contains("message-03"));
        assert!(prompt.contains("user: message-04"));
        assert!(prompt.contains("user: message-11"));
        assert!(prompt.contains("Technology"));
        assert!(prompt.contains("Data Scientist"));
    }

    #[test]
    fn test_chat_prompt_without_selection() {
        let params = PromptParams::new(None, vec![ChatTurn::new(Role::User, "hi")]);
        let prompt = chat_prompt(&params, "hi", 8);
        assert!(!prompt.contains("exploring the"));
        assert!(prompt.contains("User question: hi"));
    }
}
