//! `format`: run the notation formatter from the command line.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Read;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::services::{format_with_tokens, RawToken};

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Text to format; read from stdin when omitted
    pub text: Option<String>,

    /// Also list every rewrite that was applied
    #[arg(long)]
    pub tokens: bool,
}

#[derive(Debug, Serialize)]
pub struct FormatOutput {
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<RawToken>>,
}

impl CommandOutput for FormatOutput {
    fn to_human(&self) -> String {
        let Some(tokens) = &self.tokens else {
            return self.formatted.clone();
        };
        let mut table = list_table(&["category", "matched", "replacement"]);
        for token in tokens {
            table.add_row(vec![
                format!("{:?}", token.category),
                token.text.clone(),
                token.replacement.clone(),
            ]);
        }
        format!("{}\n\n{table}", self.formatted)
    }
}

pub fn run(args: &FormatArgs, input: &str) -> FormatOutput {
    let (formatted, tokens) = format_with_tokens(input);
    FormatOutput {
        formatted,
        tokens: args.tokens.then_some(tokens),
    }
}

pub async fn execute(args: FormatArgs, json_mode: bool) -> Result<()> {
    let input = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    output(&run(&args, &input), json_mode);
    Ok(())
}
