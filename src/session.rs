use crate::content;
use crate::error::{DashboardError, Result};
use crate::navigation::{self, Input, Section, State};
use crate::structs::{DashboardConfig, Table};
use log::debug;
use std::io::{BufRead, Write};

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(Vec<Input>),
    Help,
    Quit,
}

/// Parses one line of session input.
///
/// An empty line re-renders the current page.
///
/// # Errors
///
/// Returns `DashboardError::Command` for unknown words, extra arguments or
/// out-of-range choices.
pub fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
    let Some(first) = words.first() else {
        return Ok(Command::Select(Vec::new()));
    };

    let section = match first.as_str() {
        "q" | "quit" | "exit" => return no_args(&words, Command::Quit),
        "h" | "help" | "?" => return no_args(&words, Command::Help),
        "1" | "i" | "info" => Section::Info,
        "2" | "a" | "analysis" => Section::Analysis,
        "3" | "c" | "conclusion" => Section::Conclusion,
        other => {
            return Err(DashboardError::Command(format!(
                "Unknown command '{}', type 'help'",
                other
            )));
        }
    };

    let choice = match &words[1..] {
        [] => None,
        [choice] => Some(choice.parse::<usize>().map_err(|_| {
            DashboardError::Command(format!("Choice must be a number, got '{}'", choice))
        })?),
        _ => {
            return Err(DashboardError::Command(format!(
                "Too many arguments for '{}'",
                first
            )));
        }
    };

    navigation::select(section, choice).map(Command::Select)
}

fn no_args(words: &[String], command: Command) -> Result<Command> {
    if words.len() > 1 {
        return Err(DashboardError::Command(format!(
            "'{}' takes no arguments",
            words[0]
        )));
    }
    Ok(command)
}

/// Runs the interactive dashboard until `quit` or end of input.
///
/// Each line is parsed, folded into the state and the resulting page is
/// written to `output`. Bad commands print a message and the loop goes on.
///
/// # Returns
/// The state the session ended in.
pub fn run_session<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    table: &Table,
    config: &DashboardConfig,
) -> Result<State> {
    let mut state = State::default();
    writeln!(output, "{}\n", content::TITLE)?;
    writeln!(output, "{}\n", content::HELP)?;
    write_page(output, &state, table, config)?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                writeln!(output, "{}", content::HELP)?;
                write!(output, "> ")?;
            }
            Ok(Command::Select(inputs)) => {
                state = inputs.into_iter().fold(state, State::apply);
                write_page(output, &state, table, config)?;
            }
            Err(e) => {
                writeln!(output, "{}", e)?;
                write!(output, "> ")?;
            }
        }
        output.flush()?;
    }

    debug!("Session ended in {:?}", state);
    Ok(state)
}

fn write_page<W: Write>(
    output: &mut W,
    state: &State,
    table: &Table,
    config: &DashboardConfig,
) -> Result<()> {
    let page = navigation::render(state, table, config);
    writeln!(output, "{}", page.to_text(config.bar_width))?;
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}
