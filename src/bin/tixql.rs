//! tixql is a menu-driven command-line client for a movie ticketing
//! PostgreSQL database. It connects to the given database and runs booking,
//! scheduling, and reporting actions against it via an interactive menu.

#![warn(clippy::all)]

use std::io::Write as _;

use clap::Parser as _;

use tixql::error::Result;
use tixql::input::Console;
use tixql::{Session, Shell};

fn main() {
    if let Err(error) = Command::parse().run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

/// The tixql command.
#[derive(clap::Parser)]
#[command(about = "A movie ticketing database client.", version)]
struct Command {
    /// Database name to connect to.
    #[arg()]
    dbname: String,
    /// Port number to connect to.
    #[arg()]
    port: u16,
    /// Database user to connect as.
    #[arg()]
    user: String,
    /// Host to connect to.
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,
    /// Database password.
    #[arg(long, default_value = "")]
    password: String,
    /// Log level: error, warn, info, debug, or trace.
    #[arg(short = 'l', long, default_value = "error")]
    log_level: String,
}

impl Command {
    /// Runs the command: connect, run the shell, disconnect.
    fn run(self) -> Result<()> {
        self.init_logging()?;

        print!("Connecting to database {}... ", self.dbname);
        std::io::stdout().flush()?;
        let session =
            Session::connect(&self.host, self.port, &self.dbname, &self.user, &self.password)?;
        println!("done.");

        let mut shell = Shell::new(session, Box::new(Console::new()?));
        let result = shell.run();

        print!("Disconnecting from database... ");
        std::io::stdout().flush()?;
        shell.close();
        println!("done.\n\nBye!");
        result
    }

    /// Initializes logging at the configured level.
    fn init_logging(&self) -> Result<()> {
        let level = self.log_level.parse::<simplelog::LevelFilter>()?;
        let mut config = simplelog::ConfigBuilder::new();
        if level != simplelog::LevelFilter::Debug && level != simplelog::LevelFilter::Trace {
            config.add_filter_allow_str("tixql");
        }
        simplelog::SimpleLogger::init(level, config.build())?;
        Ok(())
    }
}
