use anyhow::Context;
use seqedit::logging::{self, LogLevel, Logger};
use seqedit::shell::Shell;
use seqedit::EditorConfig;
use std::io::{self, Write};
use std::path::PathBuf;

const ENV_LOG_LEVEL: &str = "SEQEDIT_LOG";

fn main() -> anyhow::Result<()> {
    let options = parse_args(std::env::args().skip(1))?;
    init_logging(&options);

    let config = EditorConfig::from_env().context("invalid configuration in environment")?;
    let mut shell = Shell::new(config)?;
    if let Some(path) = &options.initial_file {
        shell.open(path)?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    if options.interactive {
        println!("seqedit {} - type `help` for commands", env!("CARGO_PKG_VERSION"));
    }
    shell.run(stdin.lock(), stdout.lock())?;
    Ok(())
}

#[derive(Debug, Default)]
struct Options {
    debug_log: Option<PathBuf>,
    initial_file: Option<PathBuf>,
    interactive: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Options> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug-log" => {
                let path = args.next().context("--debug-log requires a path")?;
                options.debug_log = Some(PathBuf::from(path));
            }
            "-i" | "--interactive" => options.interactive = true,
            flag if flag.starts_with('-') => anyhow::bail!("unknown option: {}", flag),
            path => options.initial_file = Some(PathBuf::from(path)),
        }
    }
    Ok(options)
}

fn init_logging(options: &Options) {
    let level = std::env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(|value| LogLevel::parse(&value))
        .unwrap_or(LogLevel::Warning);

    let mut logger = Logger::new(level);
    if let Some(path) = &options.debug_log {
        logger = logger.with_file_output(path).without_stderr();
    }
    if let Err(err) = logging::init(logger) {
        let _ = writeln!(io::stderr(), "failed to initialise logging: {}", err);
    }
}
