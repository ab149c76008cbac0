use std::io::{self, BufRead, IsTerminal, Write};

use rrsim::{
    Sim, SimConfig, SimError,
    command::{Command, Outcome},
    stats::RunStats,
    workload::Workload,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rrsim [--config PATH] | rrsim bench [SEED]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => repl(Sim::new()),
        ["--config", path] => load_config(path).and_then(repl),
        ["bench"] => bench(0),
        ["bench", seed] => match seed.parse() {
            Ok(seed) => bench(seed),
            Err(_) => usage(),
        },
        _ => usage(),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn usage() -> Result<(), SimError> {
    eprintln!("{USAGE}");
    std::process::exit(2);
}

fn load_config(path: &str) -> Result<Sim, SimError> {
    let json = std::fs::read_to_string(path)?;
    let config = SimConfig::from_json(&json)?;
    Ok(Sim::with_config(config)?)
}

fn repl(mut sim: Sim) -> Result<(), SimError> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            write!(stdout, "EnterCommand>")?;
            stdout.flush()?;
        }

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(stdout, "{err}. Please try again.")?;
                continue;
            }
        };

        match command.execute(&mut sim) {
            Ok(Outcome::Continue(Some(text))) => write!(stdout, "{text}")?,
            Ok(Outcome::Continue(None)) => {}
            Ok(Outcome::Quit) => return Ok(()),
            // Admission and configuration failures do not end the session
            Err(SimError::Admission(err)) => writeln!(stdout, "{err}")?,
            Err(SimError::Config(err)) => writeln!(stdout, "{err}")?,
            Err(err) => return Err(err),
        }
    }
}

fn bench(seed: u64) -> Result<(), SimError> {
    let workload = Workload {
        seed,
        ..Workload::default()
    };
    let programs = workload.generate();

    let mut sim = Sim::new();
    sim.set_memory(programs.iter().map(|p| p.memory).sum())?;
    sim.set_burst(3)?;

    for program in programs {
        let name = program.name.clone();
        sim.register_template(program)?;
        sim.admit(&name)?;
    }

    let ticks = sim.run();
    println!("Ran {ticks} ticks");
    print!("{}", RunStats::collect(&sim));
    Ok(())
}
