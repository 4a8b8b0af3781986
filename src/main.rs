#![warn(clippy::all)]

use std::io::{self, Write as _};

use structopt::StructOpt;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use siogo::{Console, Opt, Result};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let opt = Opt::from_args();
    let mut cnsl = Console::term(opt.console_config());
    let mut stdout = io::stdout();
    opt.run(&mut stdout, &mut cnsl).map_err(|err| {
        io::stdout().flush().expect("Could not flush stdout");
        eprintln!();
        err
    })
}
