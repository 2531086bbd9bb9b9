// SPDX-License-Identifier: MIT

use std::io::{BufRead, Write};

pub const UPDATE_QUESTION: &str = "May I update the MBR as printed above?";

/// Asks a yes/no question, defaulting to no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> anyhow::Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
