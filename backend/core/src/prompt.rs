//! Instruction text sent to providers.

use crate::design::DesignDocument;
use crate::schema;

pub const SYSTEM_INSTRUCTION: &str =
    "You convert app UI screen summaries into a database schema. Return only valid JSON.";

pub const TASK_INSTRUCTION: &str = "Given this Figma-extracted design JSON, infer \
tables/columns/relationships. Output JSON exactly matching the schema.";

/// Single free-text prompt for providers without structured output:
/// instructions, an example of the wanted shape, then the design itself.
pub fn single_prompt(design: &DesignDocument) -> String {
    let example = serde_json::to_string_pretty(&schema::example())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "{SYSTEM_INSTRUCTION}\n\
         Given this Figma-extracted design JSON, infer tables/columns/relationships.\n\
         Respond with a single JSON object with exactly the keys \"tables\", \
         \"relationships\" and \"notes\", shaped like this example:\n\
         {example}\n\n\
         Design JSON:\n\
         {}",
        design.to_json_string()
    )
}
