use anyhow::Context;
use argh::FromArgs;
use include_shell::Interpreter;
use include_shell::config::ShellConfig;
use include_shell::env::Environment;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A small shell that can run scripts with `include`.
struct Args {
    #[argh(positional)]
    /// script to run instead of starting the interactive prompt
    script: Option<String>,

    #[argh(option)]
    /// how many scripts may include one another before giving up (default 64)
    max_include_depth: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    let mut config = ShellConfig::from_env(&Environment::new())?;
    if let Some(depth) = args.max_include_depth {
        config = config.with_max_include_depth(depth)?;
    }
    tracing::debug!(?config, "starting shell");

    let mut interp = Interpreter::with_config(Interpreter::default_commands(), config);
    match args.script {
        Some(script) => std::process::exit(interp.include(&script)),
        None => interp.repl().context("line editor failed"),
    }
}
