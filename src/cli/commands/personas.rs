//! `personas`: inspect the persona registry.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, LanguageMode, PersonaRegistry, PersonaVariant};

#[derive(Args, Debug)]
pub struct PersonasArgs {
    /// Show the full system prompt for one variant
    #[arg(long)]
    pub variant: Option<PersonaVariant>,

    /// Tone used when rendering the system prompt (english or hinglish)
    #[arg(long, default_value = "english")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub variant: PersonaVariant,
    pub name: String,
    pub source: &'static str,
    pub instructions: String,
}

#[derive(Debug, Serialize)]
pub struct PersonaListOutput {
    pub personas: Vec<PersonaSummary>,
}

impl CommandOutput for PersonaListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["variant", "name", "source", "instructions"]);
        for persona in &self.personas {
            let first_line = persona.instructions.lines().next().unwrap_or_default();
            table.add_row(vec![
                persona.variant.to_string(),
                persona.name.clone(),
                persona.source.to_string(),
                truncate(first_line, 60),
            ]);
        }
        table.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct SystemPromptOutput {
    pub variant: PersonaVariant,
    pub language: LanguageMode,
    pub system_prompt: String,
}

impl CommandOutput for SystemPromptOutput {
    fn to_human(&self) -> String {
        format!(
            "{} ({})\n\n{}",
            console::style(self.variant).bold(),
            String::from(self.language),
            self.system_prompt
        )
    }
}

pub fn list(registry: &PersonaRegistry) -> PersonaListOutput {
    PersonaListOutput {
        personas: registry
            .iter()
            .map(|template| PersonaSummary {
                variant: template.variant,
                name: template.name.to_string(),
                source: if template.overridden { "config" } else { "builtin" },
                instructions: template.instructions.to_string(),
            })
            .collect(),
    }
}

pub async fn execute(args: PersonasArgs, config: &Config, json_mode: bool) -> Result<()> {
    let registry = PersonaRegistry::with_overrides(&config.personas);

    match args.variant {
        Some(variant) => {
            let language = LanguageMode::from(args.language);
            let result = SystemPromptOutput {
                variant,
                language,
                system_prompt: registry.get(variant).system_prompt(language),
            };
            output(&result, json_mode);
        }
        None => output(&list(&registry), json_mode),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_list_marks_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(PersonaVariant::Notes, "Bullet points only.".to_string());
        let out = list(&PersonaRegistry::with_overrides(&overrides));

        assert_eq!(out.personas.len(), 4);
        let notes = out
            .personas
            .iter()
            .find(|p| p.variant == PersonaVariant::Notes)
            .unwrap();
        assert_eq!(notes.source, "config");
        assert!(out.to_human().contains("builtin"));
    }

    #[test]
    fn test_system_prompt_output_json() {
        let registry = PersonaRegistry::builtin();
        let result = SystemPromptOutput {
            variant: PersonaVariant::Questions,
            language: LanguageMode::Colloquial,
            system_prompt: registry
                .get(PersonaVariant::Questions)
                .system_prompt(LanguageMode::Colloquial),
        };
        let json = result.to_json();
        assert_eq!(json["variant"], "questions");
        assert_eq!(json["language"], "hinglish");
    }
}
