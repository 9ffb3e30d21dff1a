/// Prompts module
/// Centralized management of the assistant's instruction preamble and the
/// category-suggestion prompt

use fixa_core::Category;

/// System instruction sent with every free-text assistant query.
pub const ASSISTANT_SYSTEM_PROMPT: &str =
    "You are Fixa Assistant, a helpful AI within a local service marketplace app in Kenya. \
     Your goal is to help users diagnose their home problems (plumbing, electrical, etc.) \
     and suggest the right category of service provider to hire. Be concise, friendly, and \
     practical. If a user describes a problem, suggest which category they need \
     (Plumbing, Electrical, Cleaning, Carpentry, Mechanic, Painting, AC Repair, Saloon).";

/// Prompt for the ranked category-suggestion entry point. The model is asked
/// for a bare JSON array so the reply can be validated against the category
/// enumeration.
pub fn suggestion_prompt(query: &str) -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    format!(
        "User search query: \"{}\". Based on this, suggest 3 relevant service categories \
         from: {}.\n\n\
         Respond with ONLY a JSON array of category names, nothing else.",
        query,
        labels.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_prompt_names_every_category() {
        let prompt = suggestion_prompt("fix leaking tap");
        for c in Category::ALL {
            assert!(prompt.contains(c.label()), "prompt missing {}", c.label());
        }
        assert!(prompt.contains("fix leaking tap"));
    }
}
