use std::io::{self, Write};

use clap::Parser;
use setup_tor::action::workflow::WorkflowCommands;
use setup_tor::action::{ActionError, SetupTor};
use setup_tor::config::{ActionInputs, RunnerConfig};
use setup_tor::logging::init_logging;

#[derive(Parser)]
#[command(name = "setup-tor")]
#[command(about = "Install tor on a CI runner and optionally start it")]
struct Cli {
    /// Version or range of tor to install
    #[arg(long = "tor-version", env = "INPUT_TOR-VERSION", default_value = "")]
    tor_version: String,

    /// Alias of --tor-version
    #[arg(long, env = "INPUT_VERSION", default_value = "")]
    version: String,

    /// Only consider stable releases unless set to something other than `true`
    #[arg(long, env = "INPUT_STABLE", default_value = "true")]
    stable: String,

    /// Token used for manifest and download requests to github.com
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Contents of the torrc to write
    #[arg(long, env = "INPUT_CONFIG")]
    config: Option<String>,

    /// Start tor in the background when set to `true` (any case)
    #[arg(
        long,
        env = "INPUT_DAEMON",
        default_value = "",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    daemon: String,
}

impl From<Cli> for ActionInputs {
    fn from(cli: Cli) -> Self {
        Self {
            tor_version: cli.tor_version,
            version: cli.version,
            stable: cli.stable,
            token: cli.token,
            config: cli.config,
            daemon: cli.daemon,
        }
    }
}

/// Print `error` as the step's `::error::` annotation
fn report_failure<W: Write>(out: W, error: &ActionError) -> io::Result<()> {
    WorkflowCommands::new(out, None, None).set_failed(&error.to_string())
}

fn main() -> anyhow::Result<()> {
    let inputs = ActionInputs::from(Cli::parse());
    let guard = init_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let outcome = match SetupTor::from_runner(RunnerConfig::from_env()) {
        Ok(mut action) => runtime.block_on(action.run(&inputs)),
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        report_failure(io::stdout(), &e)?;
        drop(guard);
        std::process::exit(1);
    }

    Ok(())
}
