//! Speedcubing timer web front-end with a built-in scramble generator.

mod cli;
mod server;
mod settings;

fn main() -> eyre::Result<()> {
    use clap::Parser;
    use eyre::Context;

    let args = cli::Args::parse();

    color_eyre::install()?;

    // Initialize logging.
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let settings = settings::Settings::load(args.config.as_deref())
        .context("error loading settings")?;

    cli::exec(args.subcommand.unwrap_or_default(), settings)
}
