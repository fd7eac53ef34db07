use std::path::Path;

pub fn run(file: &Path, context: &Path, json: bool) -> Result<(), String> {
    let story = super::load_story(file)?;
    let state = super::read_context(context, &story)?;

    let (section, state) = story.resume(&state).map_err(super::runtime_error)?;
    super::write_context(context, &state)?;
    super::emit_section(&section, json)
}
