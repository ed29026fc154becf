//! Shell Module
//!
//! Line-oriented client front end: tokenizes input, runs the client-local
//! commands (`help`, `exit`, `execute_script`) and forwards everything else
//! to the server as a `Request` shaped the way its handler expects.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::command::{Registry, COMMANDS};
use crate::error::{CityError, Result};
use crate::model::CityDraft;
use crate::protocol::{Argument, Arguments, Request, Response};
use crate::session::{Backoff, Connector, Session};

/// Something that turns a request into a response
pub trait Transport {
    fn round_trip(&mut self, request: &Request) -> Result<Response>;
}

impl<C: Connector, B: Backoff> Transport for Session<C, B> {
    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        self.send(request)
    }
}

/// In-process transport (no network)
impl Transport for Registry {
    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        Ok(self.dispatch(request))
    }
}

/// What the caller should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

const LOCAL_COMMANDS: &[(&str, &str)] = &[
    ("help", "print this list"),
    ("exit", "close the client"),
    ("execute_script", "execute_script <file>: run commands from a file"),
];

/// How a forwarded command packs its arguments
enum Shape {
    Bare,
    Single,
    Fields,
    KeyAndCity,
}

fn shape(command: &str) -> Option<Shape> {
    let shape = match command {
        "info" | "show" | "clear" | "average_of_meters_above_sea_level" => Shape::Bare,
        "remove_key"
        | "remove_greater_key"
        | "remove_lower_key"
        | "remove_all_by_standard_of_living"
        | "filter_starts_with_name" => Shape::Single,
        "insert" | "update" => Shape::Fields,
        "replace_if_greater" => Shape::KeyAndCity,
        _ => return None,
    };
    Some(shape)
}

/// Split a line into a lowercase command name and its arguments
pub fn parse_line(line: &str) -> Option<(String, Vec<&str>)> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some((name, tokens.collect()))
}

/// Build the request for a forwarded command
///
/// Arity of simple commands is left to the server; `replace_if_greater`
/// needs its city assembled (and validated) here.
pub fn build_request(command: &str, args: &[&str]) -> Result<Request> {
    let shape = shape(command).ok_or_else(|| {
        CityError::InvalidArgument(format!("'{}' is not a server command", command))
    })?;

    let request = match (shape, args) {
        (Shape::Bare, []) => Request::bare(command),
        (Shape::Single, [arg]) => Request::single(command, *arg),
        (Shape::Bare, _) | (Shape::Single, _) | (Shape::Fields, _) => {
            Request::texts(command, args.iter().copied())
        }
        (Shape::KeyAndCity, [key, fields @ ..]) => {
            let draft = CityDraft::parse_fields(fields)?;
            Request::new(
                command,
                Arguments::List(vec![Argument::Text(key.to_string()), Argument::City(draft)]),
            )
        }
        (Shape::KeyAndCity, []) => {
            return Err(CityError::InvalidArgument(
                "usage: replace_if_greater <key> name x y area population height climate government standard_of_living [governor]"
                    .to_string(),
            ))
        }
    };
    Ok(request)
}

/// Interactive shell over a transport
pub struct Shell<T: Transport, W: Write> {
    transport: T,
    out: W,
}

impl<T: Transport, W: Write> Shell<T, W> {
    pub fn new(transport: T, out: W) -> Self {
        Self { transport, out }
    }

    /// Run one input line
    ///
    /// Returns `Err` only when the session cannot continue (server gone,
    /// interrupted, or the output is broken).
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome> {
        let (name, args) = match parse_line(line) {
            Some(parsed) => parsed,
            None => return Ok(Outcome::Continue),
        };

        match name.as_str() {
            "help" => self.help()?,
            "exit" => {
                writeln!(self.out, "Closing application...")?;
                return Ok(Outcome::Exit);
            }
            "execute_script" => match args.as_slice() {
                [path] => return self.run_script(Path::new(path)),
                _ => writeln!(self.out, "Usage: execute_script <file>")?,
            },
            _ if shape(&name).is_some() => self.forward(&name, &args)?,
            _ => writeln!(
                self.out,
                "Error: Command not found. Type 'help' for available commands"
            )?,
        }
        Ok(Outcome::Continue)
    }

    /// Run every line of a script file
    ///
    /// Nested `execute_script` lines are skipped; a failing line is reported
    /// and the script goes on.
    pub fn run_script(&mut self, path: &Path) -> Result<Outcome> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                writeln!(self.out, "Error: cannot read script {}: {}", path.display(), e)?;
                return Ok(Outcome::Continue);
            }
        };

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            let Some((name, _)) = parse_line(line) else {
                continue;
            };
            if name == "execute_script" {
                writeln!(
                    self.out,
                    "Skipping nested execute_script at {}:{}",
                    path.display(),
                    number + 1
                )?;
                continue;
            }
            if self.execute_line(line)? == Outcome::Exit {
                return Ok(Outcome::Exit);
            }
        }

        writeln!(self.out, "Script '{}' finished.", path.display())?;
        Ok(Outcome::Continue)
    }

    fn forward(&mut self, name: &str, args: &[&str]) -> Result<()> {
        let request = match build_request(name, args) {
            Ok(request) => request,
            Err(e) => {
                writeln!(self.out, "Error: {}", e)?;
                return Ok(());
            }
        };

        match self.transport.round_trip(&request) {
            Ok(response) => writeln!(self.out, "{}", response.message)?,
            Err(CityError::Reconnected) => writeln!(
                self.out,
                "Connection was lost and has been restored. Please resubmit the command."
            )?,
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn help(&mut self) -> Result<()> {
        writeln!(self.out, "Available commands:")?;
        for (name, description) in LOCAL_COMMANDS.iter().chain(COMMANDS.iter()) {
            writeln!(self.out, "  {:<36} {}", name, description)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (T, W) {
        (self.transport, self.out)
    }
}

fn is_fatal(e: &CityError) -> bool {
    matches!(
        e,
        CityError::Unreachable { .. } | CityError::Interrupted | CityError::NotConnected
    ) || e.is_transport()
}
