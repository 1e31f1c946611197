//! Prompt templates for story generation

use std::collections::HashMap;

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template; unknown placeholders are left as-is
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var.as_str()) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    variables
}

/// Fixed narrative framing appended to every user message
pub struct StoryPrompts;

impl StoryPrompts {
    #[must_use]
    pub fn narrative_instructions() -> PromptTemplate {
        PromptTemplate::new(
            r"
Use a fun story about lots of {{animal}} as a metaphor.
Keep sentences short but conversational, casual, and engaging.
Generate a cute, minimal illustration for each sentence with blackish grey ink on white background.
No commentary, just begin your explanation.
Keep going until you're done.",
        )
    }
}

/// User message followed by the narrative instructions for `animal`
#[must_use]
pub fn build_story_prompt(message: &str, animal: &str) -> String {
    let values = HashMap::from([("animal", animal)]);
    let mut prompt = message.to_string();
    prompt.push_str(&StoryPrompts::narrative_instructions().render(&values));
    prompt
}
