pub mod check;
pub mod paths;
pub mod pick;
pub mod play;
pub mod resume;

use std::path::Path;

use colored::Colorize;
use skein_core::diagnostics::{Diagnostic, render_diagnostics};
use skein_core::{Context, RuntimeError, Section, Story};
use tracing::{debug, info};

/// Read a story file.
fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Parse and validate a story, printing diagnostics on failure.
fn load_story(path: &Path) -> Result<Story, String> {
    let source = read_source(path)?;
    match skein_core::load(&source) {
        Ok(story) => {
            debug!(file = %path.display(), nodes = story.len(), "loaded story");
            Ok(story)
        }
        Err(err) => {
            let diagnostics = Diagnostic::from_story_error(&source, &err);
            let filename = path.display().to_string();
            eprint!("{}", render_diagnostics(&source, &filename, &diagnostics));
            let count = diagnostics.len();
            Err(format!(
                "{} has {count} error{}",
                path.display(),
                if count == 1 { "" } else { "s" }
            ))
        }
    }
}

/// Load a context file, or a fresh context when the file does not exist.
fn read_context(path: &Path, story: &Story) -> Result<Context, String> {
    if !path.exists() {
        info!(file = %path.display(), "starting a new context");
        return Ok(Context::new(story));
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Context::from_json(&json).map_err(|e| format!("invalid context {}: {e}", path.display()))
}

fn write_context(path: &Path, context: &Context) -> Result<(), String> {
    let json = context
        .to_json()
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    std::fs::write(path, json).map_err(|e| format!("cannot write to {}: {e}", path.display()))
}

/// Print a runtime error as a miette report and return a short message.
fn runtime_error(err: RuntimeError) -> String {
    eprintln!("{:?}", miette::Report::new(err));
    "the story cannot continue".into()
}

/// Print a section for a reader.
fn print_section(section: &Section) {
    if !section.text.is_empty() {
        println!("{}", section.text);
    }
    if !section.tags.is_empty() {
        let tags: Vec<String> = section.tags.iter().map(|t| format!("#{t}")).collect();
        println!("{}", tags.join(" ").dimmed());
    }
    for (index, option) in section.options.iter().enumerate() {
        println!("  {} {option}", format!("{index})").cyan().bold());
    }
    if section.end {
        println!("{}", "-- THE END --".bold());
    }
}

/// Print a section as JSON, or for a reader.
fn emit_section(section: &Section, json: bool) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(section)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{text}");
    } else {
        print_section(section);
    }
    Ok(())
}
