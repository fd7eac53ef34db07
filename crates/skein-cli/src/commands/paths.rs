use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path) -> Result<(), String> {
    let story = super::load_story(file)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Path", "Kind", "Line", "Continues to"]);

    for (_, node) in story.nodes() {
        let line = if node.line == 0 {
            "—".to_string()
        } else {
            node.line.to_string()
        };
        let continues = match (node.divert(), node.next()) {
            (Some(target), _) => format!("-> {target}"),
            (None, Some(next)) => story.path(next).to_string(),
            (None, None) => String::new(),
        };
        table.add_row(vec![node.path.clone(), node.kind_name().to_string(), line, continues]);
    }

    println!("{table}");
    println!();
    println!("  {} paths", story.len());

    Ok(())
}
