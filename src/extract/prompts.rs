//! Prompt construction for model-backed extraction

use crate::crawler::PageContent;

/// Page text beyond this many characters is cut before prompting
pub const MAX_CONTENT_CHARS: usize = 10_000;

const TRUNCATION_MARKER: &str = "\n... (content truncated)";

/// Instruction for free-text extraction
pub const TEXT_SYSTEM_PROMPT: &str = "\
You are an expert web content extractor. Your task is to analyze HTML/text content
and extract relevant information based on user requirements.

Guidelines:
1. Focus on the main content, ignore navigation, ads, and boilerplate
2. Preserve important details and structure
3. Be accurate and precise
4. If information is not available, say so clearly
";

/// Instruction for JSON-only extraction
pub const STRUCTURED_SYSTEM_PROMPT: &str = "\
You are an expert web content extractor. Your task is to analyze HTML/text content
and extract structured information in JSON format.

Guidelines:
1. Return ONLY valid JSON, no additional text
2. Use appropriate data types (strings, numbers, arrays, objects)
3. If a field is not available, use null
4. Be consistent with field names

Output format: Valid JSON object only
";

/// Joins a system instruction with the page section and the task
pub fn build_prompt(system: &str, page: &PageContent, task: &str) -> String {
    format!("{}\n\n{}", system, user_section(page, task))
}

fn user_section(page: &PageContent, task: &str) -> String {
    format!(
        "URL: {}\nTitle: {}\n\nContent:\n{}\n\nTask: {}\n",
        page.url,
        page.title.as_deref().unwrap_or("N/A"),
        truncate_content(&page.text, MAX_CONTENT_CHARS),
        task
    )
}

/// Cuts `content` to `max_chars` characters, marking the cut
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

pub fn summary_task(max_length: usize) -> String {
    format!(
        "Summarize the following web page content in about {} words. \
         Focus on the main points and key information.",
        max_length / 5
    )
}

pub fn entities_task(entities: &[&str]) -> String {
    format!(
        "Extract the following entities from the content: {}. \
         Return the result as a JSON object.",
        entities.join(", ")
    )
}
