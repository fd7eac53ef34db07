//! Interactive play on stdin/stdout.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use skein_core::Session;

/// Play a story, reading option numbers from stdin until it ends.
///
/// `q` or end of input stops early. With `transcript`, everything shown is
/// printed again as one block when play stops.
pub fn run(file: &Path, transcript: bool) -> Result<(), String> {
    let story = super::load_story(file)?;
    let mut session = Session::new(&story);
    let mut played = Vec::new();

    let mut section = session.advance().map_err(super::runtime_error)?;
    let mut input = io::stdin().lock().lines();

    'play: loop {
        super::print_section(&section);
        if !section.text.is_empty() {
            played.push(section.text.clone());
        }
        if section.end {
            break;
        }

        let index = loop {
            print!("{} ", ">".bold());
            io::stdout()
                .flush()
                .map_err(|e| format!("cannot write to stdout: {e}"))?;
            let Some(line) = input.next() else {
                println!();
                break 'play;
            };
            let line = line.map_err(|e| format!("cannot read input: {e}"))?;
            let answer = line.trim();
            if answer == "q" {
                break 'play;
            }
            match answer.parse::<usize>() {
                Ok(i) if i < section.options.len() => break i,
                _ => println!(
                    "  {}",
                    format!("enter 0 to {}, or q to quit", section.options.len() - 1).yellow()
                ),
            }
        };

        section = session.pick(index).map_err(super::runtime_error)?;
    }

    if transcript {
        println!();
        println!("{}", "-- transcript --".bold());
        println!("{}", played.join("\n"));
    }

    Ok(())
}
