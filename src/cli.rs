use crate::*;
use std::io::{self, BufRead, BufReader, Read, Write};

#[cfg(feature = "bin")]
pub mod bin {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Parser)]
    #[command(version, about = env!("CARGO_PKG_DESCRIPTION"))]
    struct Args {
        /// Requires every proof to conclude this formula
        #[clap(long)]
        goal: Option<String>,
        /// Prints each checked proof with the assumptions every line rests on
        #[clap(long)]
        show: bool,
        /// Checks every line but allows the proof to end on open assumptions
        #[clap(long)]
        lines_only: bool,
        /// The proof files to check
        inputs: Vec<PathBuf>,
    }

    /// Start the command-line proof checker.
    ///
    /// With no input files this starts a REPL on standard input.
    pub fn cli() {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .format_timestamp(None)
            .format_target(false)
            .parse_default_env()
            .init();

        let args = Args::parse();
        let goal = match args.goal.as_deref().map(|goal| parse_expr(None, goal)).transpose() {
            Ok(goal) => goal,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1)
            }
        };

        if args.inputs.is_empty() {
            log::info!("Welcome to the zeroth REPL! (version {})", env!("CARGO_PKG_VERSION"));
            match Session::default().repl() {
                Ok(()) => std::process::exit(0),
                Err(err) => {
                    log::error!("{err}");
                    std::process::exit(1)
                }
            }
        }

        for input in &args.inputs {
            let name = input.to_string_lossy();
            let text = match std::fs::read_to_string(input) {
                Ok(text) => text,
                Err(err) => {
                    log::error!("Failed to read file {name}: {err}");
                    std::process::exit(1)
                }
            };
            match check_file(Some(name.to_string()), &text, goal.as_ref(), args.lines_only) {
                Ok(proof) => {
                    if args.show {
                        println!("{proof}");
                    }
                    log::info!("{name}: checked {} lines", proof.len());
                }
                Err(err) => {
                    log::error!("{name}: {err}");
                    std::process::exit(1)
                }
            }
        }
    }

    fn check_file(
        filename: Option<String>,
        text: &str,
        goal: Option<&Expr>,
        lines_only: bool,
    ) -> Result<InternalProof, Error> {
        let proof = check_lines(&parse_proof(filename, text)?)?;
        match goal {
            _ if lines_only => {}
            Some(goal) => {
                proof.validate_goal(goal)?;
            }
            None => {
                proof.validate()?;
            }
        }
        Ok(proof)
    }
}

/// A proof built up one line at a time.
#[derive(Debug, Default)]
pub struct Session {
    proof: InternalProof,
}

impl Session {
    pub fn proof(&self) -> &InternalProof {
        &self.proof
    }

    /// Start a Read-Eval-Print Loop with standard I/O.
    pub fn repl(&mut self) -> io::Result<()> {
        self.repl_with(io::stdin(), io::stdout())
    }

    /// Start a Read-Eval-Print Loop with the given input and output channel.
    ///
    /// Every input line is either a proof line, which is checked against the
    /// lines accepted so far, or one of the commands `:reset`, `:show` and
    /// `:qed`. Rejected lines are reported through the log and dropped.
    pub fn repl_with<R, W>(&mut self, input: R, mut output: W) -> io::Result<()>
    where
        R: Read,
        W: Write,
    {
        for line in BufReader::new(input).lines() {
            let line_str = line?;
            self.run_command(line_str.trim(), &mut output)?;
        }
        Ok(())
    }

    fn run_command<W>(&mut self, command: &str, mut output: W) -> io::Result<()>
    where
        W: Write,
    {
        match command {
            ":reset" => self.proof = InternalProof::new(),
            ":show" => {
                if !self.proof.is_empty() {
                    writeln!(output, "{}", self.proof)?;
                }
            }
            ":qed" => match self.proof.validate() {
                Ok(last) => writeln!(output, "qed: {}", last.expr)?,
                Err(err) => log::error!("{err}"),
            },
            _ => match parse_proof(None, command) {
                Ok(lines) => {
                    for line in &lines {
                        match self.proof.check_line(line) {
                            Ok(checked) => {
                                let premises = checked.premises.clone();
                                writeln!(output, "{}. {premises} |- {line}", self.proof.len())?
                            }
                            Err(err) => log::error!("{err}"),
                        }
                    }
                }
                Err(err) => log::error!("{err}"),
            },
        }
        Ok(())
    }
}
