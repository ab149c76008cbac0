//! The line-oriented command language spoken by the `rrsim` REPL.

use crate::core::state::{MemUnits, Ticks};
use crate::error::{ParseError, SimError};
use crate::sim::{ProgramTemplate, Sim};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetMemory,
    SetMemory(MemUnits),
    AddProgram(ProgramTemplate),
    SetBurst(Ticks),
    Start(String),
    Step(u64),
    Run,
    State,
    Json,
    Quit,
}

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

impl Command {
    /// Parses one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match name {
            "getMemory" => {
                no_args("getMemory", &args)?;
                Command::GetMemory
            }
            "setMemory" => Command::SetMemory(single_number("setMemory", &args)?),
            "setBurst" => Command::SetBurst(single_number("setBurst", &args)?),
            "step" => Command::Step(single_number("step", &args)?),
            "start" => match args.as_slice() {
                [program] => Command::Start((*program).to_owned()),
                _ => {
                    return Err(ParseError::BadArguments {
                        command: "start",
                        expected: "a program name",
                    });
                }
            },
            "addProgram" => Command::AddProgram(parse_program(&args)?),
            "run" => {
                no_args("run", &args)?;
                Command::Run
            }
            "state" => Command::State,
            "json" => Command::Json,
            "quit" => Command::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_owned())),
        };

        Ok(Some(command))
    }

    /// Applies the command, returning any text to show the user.
    pub fn execute(self, sim: &mut Sim) -> Result<Outcome, SimError> {
        let output = match self {
            Command::GetMemory => Some(sim.memory().to_string()),
            Command::SetMemory(total) => {
                sim.set_memory(total)?;
                None
            }
            Command::AddProgram(template) => {
                sim.register_template(template)?;
                None
            }
            Command::SetBurst(quantum) => {
                sim.set_burst(quantum)?;
                None
            }
            Command::Start(program) => {
                sim.admit(&program)?;
                None
            }
            Command::Step(steps) => {
                for _ in 0..steps {
                    sim.tick();
                }
                Some(sim.snapshot().to_string())
            }
            Command::Run => {
                sim.run();
                Some(sim.snapshot().to_string())
            }
            Command::State => Some(sim.snapshot().to_string()),
            Command::Json => Some(serde_json::to_string_pretty(&sim.snapshot())?),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Continue(output))
    }
}

fn no_args(command: &'static str, args: &[&str]) -> Result<(), ParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ParseError::BadArguments {
            command,
            expected: "no arguments",
        })
    }
}

fn single_number(command: &'static str, args: &[&str]) -> Result<u64, ParseError> {
    match args {
        [value] => number(value),
        _ => Err(ParseError::BadArguments {
            command,
            expected: "one number",
        }),
    }
}

fn number(word: &str) -> Result<u64, ParseError> {
    word.parse()
        .map_err(|_| ParseError::NotANumber(word.to_owned()))
}

// addProgram NAME TIME MEMORY [IO_OFFSET IO_DURATION]
fn parse_program(args: &[&str]) -> Result<ProgramTemplate, ParseError> {
    let (name, time, memory, io) = match args {
        [name, time, memory] => (name, time, memory, None),
        [name, time, memory, offset, duration] => (name, time, memory, Some((offset, duration))),
        _ => {
            return Err(ParseError::BadArguments {
                command: "addProgram",
                expected: "NAME TIME MEMORY [IO_OFFSET IO_DURATION]",
            });
        }
    };

    let mut program = ProgramTemplate::new(*name, number(time)?, number(memory)?);
    if let Some((offset, duration)) = io {
        program = program.with_io(number(offset)?, number(duration)?);
    }
    Ok(program)
}
