//! Default prompt templates bundled at compile time.

/// Cardiologist - heart and circulation
pub const CARDIOLOGIST: &str = include_str!("defaults/cardiologist.md");

/// Psychologist - mental health
pub const PSYCHOLOGIST: &str = include_str!("defaults/psychologist.md");

/// Pulmonologist - lungs and airways
pub const PULMONOLOGIST: &str = include_str!("defaults/pulmonologist.md");

/// Multidisciplinary team - reconciles the specialist reports
pub const MULTIDISCIPLINARY_TEAM: &str = include_str!("defaults/multidisciplinary_team.md");

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("cardiologist", CARDIOLOGIST),
        ("psychologist", PSYCHOLOGIST),
        ("pulmonologist", PULMONOLOGIST),
        ("multidisciplinary_team", MULTIDISCIPLINARY_TEAM),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_prompts_non_empty() {
        for (slug, content) in all_defaults() {
            assert!(!content.is_empty(), "Prompt '{}' should not be empty", slug);
            assert!(content.len() > 50, "Prompt '{}' seems too short", slug);
        }
    }

    #[test]
    fn test_specialist_prompts_describe_output_fields() {
        for prompt in [CARDIOLOGIST, PSYCHOLOGIST, PULMONOLOGIST] {
            assert!(prompt.contains("`possible_conditions`"));
            assert!(prompt.contains("`assessment`"));
        }
        assert!(MULTIDISCIPLINARY_TEAM.contains("`health_issues`"));
    }
}
