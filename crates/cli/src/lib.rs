pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, Subcommand};
use ratedesk_core::config::{AppConfig, LoadOptions, LogFormat};
use ratedesk_core::PromotionGroup;
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "ratedesk",
    about = "Ratedesk rate pricing CLI",
    long_about = "Convert between BAR and net revenue across stacked discounts, validate promotion stacks, and browse the channel promotion catalog.",
    after_help = "Examples:\n  ratedesk net-from-bar --bar 1000000 --campaigns campaigns.json\n  ratedesk channel-bar --net 1000000 --settings channel.json\n  ratedesk catalog --group targeted"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply a campaign stack to a BAR and report the net revenue with its trace")]
    NetFromBar {
        #[arg(long, help = "Best available rate")]
        bar: Decimal,
        #[arg(long, help = "JSON file holding the campaign list")]
        campaigns: PathBuf,
    },
    #[command(about = "Search the BAR that yields a target net revenue under a campaign stack")]
    BarFromNet {
        #[arg(long, help = "Target net revenue")]
        net: Decimal,
        #[arg(long, help = "JSON file holding the campaign list")]
        campaigns: PathBuf,
    },
    #[command(about = "Compute channel net revenue from a BAR, after promotions and commission")]
    ChannelNet {
        #[arg(long, help = "Best available rate")]
        bar: Decimal,
        #[arg(long, help = "JSON file holding the channel pricing settings")]
        settings: PathBuf,
    },
    #[command(about = "Compute the BAR to publish on a channel for a target net revenue")]
    ChannelBar {
        #[arg(long, help = "Target net revenue")]
        net: Decimal,
        #[arg(long, help = "JSON file holding the channel pricing settings")]
        settings: PathBuf,
    },
    #[command(
        about = "Check a promotion stack or a campaign list against the stacking rules",
        group(ArgGroup::new("source").required(true).args(["settings", "campaigns"]))
    )]
    Validate {
        #[arg(long, help = "JSON file holding the channel pricing settings")]
        settings: Option<PathBuf>,
        #[arg(long, help = "JSON file holding the campaign list")]
        campaigns: Option<PathBuf>,
    },
    #[command(about = "List channel promotion templates, optionally filtered by group and name")]
    Catalog {
        #[arg(long, help = "seasonal, essential or targeted")]
        group: Option<PromotionGroup>,
        #[arg(long, help = "Case-insensitive name fragment")]
        search: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::NetFromBar { .. } => "net-from-bar",
            Self::BarFromNet { .. } => "bar-from-net",
            Self::ChannelNet { .. } => "channel-net",
            Self::ChannelBar { .. } => "channel-bar",
            Self::Validate { .. } => "validate",
            Self::Catalog { .. } => "catalog",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => init_logging(&config),
        Err(error) if !matches!(cli.command, Command::Config) => {
            let result = commands::CommandResult::failure(
                cli.command.name(),
                "config_validation",
                error.to_string(),
                commands::EXIT_CONFIG,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
        Err(_) => {}
    }

    let command = cli.command.name();
    let result = dispatch(cli.command);
    tracing::info!(
        event_name = "cli.command.completed",
        command,
        exit_code = result.exit_code,
        "command finished"
    );

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn dispatch(command: Command) -> commands::CommandResult {
    match command {
        Command::NetFromBar { bar, campaigns } => {
            commands::stacking::run_net_from_bar(bar, &campaigns)
        }
        Command::BarFromNet { net, campaigns } => {
            commands::stacking::run_bar_from_net(net, &campaigns)
        }
        Command::ChannelNet { bar, settings } => commands::channel::run_net(bar, &settings),
        Command::ChannelBar { net, settings } => commands::channel::run_bar(net, &settings),
        Command::Validate { settings: Some(settings), .. } => {
            commands::validate::run_settings(&settings)
        }
        Command::Validate { campaigns: Some(campaigns), .. } => {
            commands::validate::run_campaigns(&campaigns)
        }
        Command::Validate { .. } => commands::CommandResult::failure(
            "validate",
            "input",
            "one of --settings or --campaigns is required",
            commands::EXIT_INPUT,
        ),
        Command::Catalog { group, search } => commands::catalog::run(group, search.as_deref()),
        Command::Config => commands::config::run(),
    }
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
