use std::path::Path;

pub fn run(file: &Path) -> Result<(), String> {
    let story = super::load_story(file)?;

    println!("  All checks passed for '{}'.", file.display());
    println!(
        "  {} nodes, {} knots, {} variables",
        story.len(),
        story.knots().len(),
        story.variables().len()
    );

    Ok(())
}
