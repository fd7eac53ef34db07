use std::path::Path;

pub fn run(file: &Path, index: usize, context: &Path, json: bool) -> Result<(), String> {
    let story = super::load_story(file)?;
    if !context.exists() {
        return Err(format!(
            "context {} does not exist; run resume first",
            context.display()
        ));
    }
    let state = super::read_context(context, &story)?;

    let (section, state) = story.pick(&state, index).map_err(super::runtime_error)?;
    super::write_context(context, &state)?;
    super::emit_section(&section, json)
}
