//! Built-in blueprint used for first start and demos.

use super::entities::{Category, Prompt, Scale, SurveyBlueprint};

/// Id of the built-in blueprint.
pub const DEFAULT_SURVEY_ID: &str = "s_default_v1";

/// A simple 1–10 assessment across energy, focus and mood.
pub fn default_survey() -> SurveyBlueprint {
    SurveyBlueprint::new(
        DEFAULT_SURVEY_ID,
        "Default Assessment",
        Scale::new(1.0, 10.0, 1.0),
    )
    .with_description("A simple 1–10 scale assessment to validate the system.")
    .with_category(Category::new("c_energy", "Energy"))
    .with_category(Category::new("c_focus", "Focus"))
    .with_category(Category::new("c_mood", "Mood"))
    .with_prompt(Prompt::new("p_energy", "c_energy", "How is your energy today?"))
    .with_prompt(Prompt::new("p_focus", "c_focus", "How focused do you feel?"))
    .with_prompt(Prompt::new("p_mood", "c_mood", "How is your mood today?"))
}
