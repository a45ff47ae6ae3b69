//! Prompt templates for the three LLM stages and the publishing agent.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: tweaking what the model is asked for
//!    means editing exactly one place.
//!
//! 2. **Testability**: unit tests inspect the rendered prompts directly
//!    without calling a model.
//!
//! Templates use a single `{placeholder}` each and are filled with
//! [`str::replace`], so braces inside the JSON payload are never mistaken for
//! template syntax.

/// Concept extraction. Placeholder: `{analyzed_slides}`.
pub const CONCEPTS_TEMPLATE: &str = r#"You are an expert educational content analyzer and concept extractor.
Your primary task is to analyze educational slides and extract their core concepts and supporting ideas.

For each slide:
1. Identify the main concept
2. Extract key supporting ideas that elaborate on the main concept
3. Ensure the concept accurately represents the slide's primary message
4. Maintain clarity and precision in your extraction
5. Use appropriate domain-specific terminology
6. Format all mathematical expressions using LaTeX notation:
   - Use $...$ for inline math
   - Use $$...$$ for display math

Your output should be structured to clearly show the relationship between the main concept and its supporting ideas.

Here are the slides to analyze:
{analyzed_slides}"#;

/// Summary generation. Placeholder: `{concepts}`.
pub const SUMMARY_TEMPLATE: &str = r#"You are an expert educational content summarizer for university students.
Your task is to analyze educational content and extract key concepts and ideas.

Guidelines:
1. For each concept, provide a detailed explanation of the concept, including examples and applications.
2. For each concept, provide a summary of the concept.
3. For each concept, if it uses mathematical expressions, provide a list of examples that illustrate the concept.
4. For each concept, provide a list of key insights that are important to remember.
5. For each concept, provide a list of questions that are important to ask yourself when learning the concept.
6. For each concept, if it exposes new terms, provide a list of key terms that are important to remember.
7. Format all mathematical expressions using LaTeX notation:
   - Use $...$ for inline math
   - Use $$...$$ for display math

Your output should be structured and well-organized, making it easy to understand the relationships between concepts.

Here are the concepts to summarize:
{concepts}"#;

/// Markdown formatting for the local-file exporter. Placeholder: `{summary}`.
pub const MARKDOWN_TEMPLATE: &str = r#"You are an expert in Markdown formatting.
You are given a summary of a presentation.
You need to format the summary in Markdown.

Here is the summary:
{summary}

Guidelines:
1. Add headers to the summary.
2. Add subheaders to the summary.
3. Add a table of contents to the summary.
4. Use Markdown formatting throughout.
5. Use LaTeX to format mathematical expressions.
   a. Use $...$ for inline math.
   b. Use $$...$$ for display math.
6. Use mermaid to draw diagrams where a diagram helps explain a concept.
7. Use callouts to highlight important concepts, ideas, key terms and examples.
8. Use bold to highlight important concepts and key terms.
9. Use italic for emphasis on ideas and examples.
10. Use underline sparingly for definitions.
11. Use strikethrough for common misconceptions.
12. Use inline code for identifiers, symbols and short formulas in prose.
13. Use code blocks for longer code or worked examples.
14. Output only the Markdown document, with no surrounding commentary."#;

/// Instruction seeding the Notion publishing agent.
///
/// Placeholders: `{parent}` (placement hint) and `{summary}` (summary JSON).
pub const NOTION_AGENT_TEMPLATE: &str = r#"You publish university study notes to Notion using the tools provided.
Work in three phases and do not skip any of them.

PHASE 1 — CREATE THE PAGE
- Call `create_page` exactly once with a concise title that names the lecture topic.
- {parent}

PHASE 2 — ADD CONTENT
- Call `append_blocks` with the id returned by `create_page`.
- Send at most 100 blocks per call; split longer content over several calls.
- Keep every rich_text content string under 2000 characters.
- Use Notion block objects only: heading_1, heading_2, heading_3, paragraph,
  bulleted_list_item, numbered_list_item, toggle, quote, callout, divider, code, equation.
- One heading_2 per topic, followed by its summary, explanation, key insights,
  key terms, examples and review questions.
- Write inline math inside rich_text as an `equation` object; use an
  `equation` block for display math. Never leave raw $...$ delimiters in text.

PHASE 3 — VERIFY
- Call `retrieve_page` on the page you created.
- Check the title, the parent and that every topic heading is present.
- Fix anything missing with further `append_blocks` calls.
- When the page is complete, reply with a short confirmation and no tool calls.

Here is the summary to publish:
{summary}"#;

/// Render [`CONCEPTS_TEMPLATE`].
pub fn concepts_prompt(slides_json: &str) -> String {
    CONCEPTS_TEMPLATE.replace("{analyzed_slides}", slides_json)
}

/// Render [`SUMMARY_TEMPLATE`].
pub fn summary_prompt(concepts_json: &str) -> String {
    SUMMARY_TEMPLATE.replace("{concepts}", concepts_json)
}

/// Render [`MARKDOWN_TEMPLATE`].
pub fn markdown_prompt(summary_json: &str) -> String {
    MARKDOWN_TEMPLATE.replace("{summary}", summary_json)
}

/// Render [`NOTION_AGENT_TEMPLATE`].
pub fn notion_agent_prompt(summary_json: &str, parent_page_id: Option<&str>) -> String {
    let parent = match parent_page_id {
        Some(id) => format!("Create it as a child of the page with id `{id}`."),
        None => "No parent page was given; create it at the workspace level.".to_string(),
    };
    NOTION_AGENT_TEMPLATE
        .replace("{parent}", &parent)
        .replace("{summary}", summary_json)
}

/// System message requiring a JSON reply that matches `schema`.
pub fn structured_output_instruction(schema: &serde_json::Value) -> String {
    format!(
        "Respond with a single JSON object and nothing else. \
         It must validate against this JSON Schema:\n{schema}"
    )
}
