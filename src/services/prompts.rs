//! Prompt templates for every generation step.

use crate::domain::models::{Chunk, Epic, Story, TechStack};

pub fn epic_generation_prompt(chunk: &Chunk) -> String {
    format!(
        r#"You are a senior product manager on an enterprise program.
From the requirement chunk below, write between one and three BUSINESS epics.

Rules:
- Use only the requirements given here.
- Leave out architecture and framework details.
- Every epic covers a distinct business scope.
- Keep descriptions short and specific.
- Answer with valid JSON only.

Schema:
{{
  "epics": [
    {{
      "epic_name": "string",
      "description": "string",
      "business_objectives": ["string"],
      "scope": {{"in_scope": ["string"], "out_of_scope": ["string"]}},
      "acceptance_criteria": ["string"],
      "definition_of_done": ["string"],
      "covered_requirements": ["string"],
      "assumptions": "string or null"
    }}
  ]
}}

Chunk ID: {chunk_id}
Requirements:
{text}
"#,
        chunk_id = chunk.chunk_id,
        text = chunk.text,
    )
}

pub fn story_generation_prompt(epic: &Epic, chunk: &Chunk) -> String {
    format!(
        r#"You are a product owner.
Write user stories for ONE epic, using ONE requirement chunk.

Rules:
- Every story belongs to the epic "{epic_name}".
- Stories are concise and testable.
- Answer with JSON only.

Schema:
{{
  "stories": [
    {{
      "epic_name": "{epic_name}",
      "summary": "string",
      "description": "string",
      "acceptance_criteria": ["string"],
      "definition_of_done": ["string"],
      "source_chunk_id": "{chunk_id}"
    }}
  ]
}}

Epic description: {description}
Requirement chunk ({chunk_id}):
{text}
"#,
        epic_name = epic.epic_name,
        description = epic.description,
        chunk_id = chunk.chunk_id,
        text = chunk.text,
    )
}

/// Instruction appended when a regeneration echoed its input.
pub const DIFFERENT_WORDING: &str =
    "The previous answer repeated the existing text. Produce materially different wording while keeping the same intent.";

pub fn regenerate_epic_prompt(
    source_text: &str,
    epic_name: &str,
    previous_description: Option<&str>,
    demand_new_wording: bool,
) -> String {
    let mut prompt = format!(
        r#"Improve this epic. Preserve its intent and increase its quality.
Answer with valid JSON only.

Schema:
{{
  "epic_name": "string",
  "description": "string"
}}

Epic name: {epic_name}
"#
    );
    if let Some(previous) = previous_description.filter(|p| !p.trim().is_empty()) {
        prompt.push_str(&format!("Current description: {previous}\n"));
    }
    prompt.push_str(&format!("Relevant requirements:\n{source_text}\n"));
    if demand_new_wording {
        prompt.push('\n');
        prompt.push_str(DIFFERENT_WORDING);
        prompt.push('\n');
    }
    prompt
}

pub fn regenerate_story_prompt(story: &Story, source_text: &str, demand_new_wording: bool) -> String {
    let mut prompt = format!(
        r#"Improve this user story. Preserve its intent and increase its quality.
Make the acceptance criteria concrete and testable.
Answer with valid JSON only.

Schema:
{{
  "summary": "string",
  "description": "string",
  "acceptance_criteria": ["string"],
  "definition_of_done": ["string"]
}}

Epic: {epic_name}
Summary: {summary}
Current description: {description}
Acceptance criteria:
{criteria}
Relevant requirements:
{source_text}
"#,
        epic_name = story.epic_name,
        summary = story.summary,
        description = story.description,
        criteria = bullet_list(&story.acceptance_criteria),
    );
    if demand_new_wording {
        prompt.push('\n');
        prompt.push_str(DIFFERENT_WORDING);
        prompt.push('\n');
    }
    prompt
}

pub fn code_generation_prompt(story: &Story, stack: TechStack) -> String {
    format!(
        r#"You are a senior software engineer.
Write production-ready code that implements the story below.

Tech stack:
{stack}

Story summary:
{summary}

Description:
{description}

Acceptance criteria:
{criteria}

Definition of done:
{done}

Rules:
- Split the code across several files with clear relative paths.
- Follow the conventions of the stack.
- No explanations outside the code.
- Answer with JSON only.

JSON format:
{{
  "files": {{
    "path/to/file.ext": "file contents"
  }}
}}
"#,
        stack = stack.prompt_phrase(),
        summary = story.summary,
        description = story.description,
        criteria = story.acceptance_criteria.join("\n"),
        done = story.definition_of_done.join("\n"),
    )
}

pub fn repair_json_prompt(raw: &str) -> String {
    format!(
        "The text below was supposed to be JSON but does not parse.\n\
         Rewrite it as valid RFC 8259 JSON with the same content.\n\
         Return only the JSON, no commentary and no code fences.\n\n{raw}"
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
