//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod sanitize;
pub(crate) mod tree;

use std::io::{self, Read, Write};
use std::path::Path;

pub(crate) use render::RenderArgs;
pub(crate) use sanitize::SanitizeArgs;
pub(crate) use tree::TreeArgs;

/// Read the command input: a file, or stdin for `-` or no path.
fn read_input(input: Option<&Path>) -> io::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write the command result to `output`, or stdout when unset.
fn write_output(output: Option<&Path>, content: &str) -> io::Result<()> {
    if let Some(path) = output {
        return std::fs::write(path, content);
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}
