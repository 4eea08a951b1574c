use std::io::{self, BufRead, Write};

/// Outcome of a yes/no confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Declined,
}

impl Decision {
    fn from_bool(yes: bool) -> Self {
        if yes {
            Decision::Approved
        } else {
            Decision::Declined
        }
    }
}

/// A source of yes/no decisions for gated resource creation.
///
/// The orchestrator consumes decisions as values; deciding what a decline
/// means (here: stop the run) is the caller's business.
pub trait Confirm {
    fn confirm(&mut self, question: &str, default: Option<bool>) -> io::Result<Decision>;
}

/// Interactive confirmation on the controlling terminal.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str, default: Option<bool>) -> io::Result<Decision> {
        let suffix = match default {
            None => "[y/n]",
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
        };
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("{question} {suffix} ");
            io::stdout().flush()?;
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF: no operator to answer, so the gate stays closed.
                return Ok(Decision::Declined);
            }
            let answer = line.trim();
            if answer.is_empty() {
                if let Some(default) = default {
                    return Ok(Decision::from_bool(default));
                }
            } else if let Some(yes) = parse_answer(answer) {
                return Ok(Decision::from_bool(yes));
            }
            println!("Please respond with 'yes' or 'no' (or 'y' or 'n').");
        }
    }
}

/// Map a typed answer to yes/no; `None` means re-prompt.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.to_ascii_lowercase().as_str() {
        "y" | "ye" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answer_accepts_yes_and_no_spellings() {
        for yes in ["y", "Y", "ye", "yes", "YES", "Yes"] {
            assert_eq!(parse_answer(yes), Some(true), "{yes:?} should be a yes");
        }
        for no in ["n", "N", "no", "NO", "No"] {
            assert_eq!(parse_answer(no), Some(false), "{no:?} should be a no");
        }
    }

    #[test]
    fn parse_answer_rejects_everything_else() {
        for junk in ["", "maybe", "yep", "nope", "0", "1", "si"] {
            assert_eq!(parse_answer(junk), None, "{junk:?} should re-prompt");
        }
    }
}
