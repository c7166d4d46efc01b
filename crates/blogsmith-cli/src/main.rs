mod app;
mod render;

use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use blogsmith_highlight::ThemeVariant;
use blogsmith_settings::{Principal, SystemConfig};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file, defaults to ~/.config/blogsmith/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a post's code blocks with syntax highlighting
    Highlight {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Theme::Dark)]
        theme: Theme,
    },
    /// List the highlight decorations of a post
    Decorations { file: PathBuf },
    /// List the languages code blocks can use
    Languages,
    /// Inspect or change the site's system settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print the stored system settings
    Show,
    /// Print the background settings with defaults applied
    Background,
    /// Validate and store system settings from a JSON file
    Set { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Theme {
    Light,
    Dark,
}

impl From<Theme> for ThemeVariant {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => ThemeVariant::Light,
            Theme::Dark => ThemeVariant::Dark,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = app::load_config(args.config.as_deref())?;

    match args.command {
        Command::Highlight { file, theme } => {
            let editor = app::open_post(&config, &file)?;
            render::write_code_blocks(&mut stdout(), &editor, theme.into())?;
        }
        Command::Decorations { file } => {
            let editor = app::open_post(&config, &file)?;
            print!("{}", render::format_decorations(&editor));
        }
        Command::Languages => {
            print!("{}", render::format_languages(&app::registry(&config)));
        }
        Command::Settings { command } => run_settings(&config, command)?,
    }
    Ok(())
}

fn run_settings(config: &blogsmith_config::Config, command: SettingsCommand) -> Result<()> {
    let service = app::settings_service(config);
    // Whoever runs the binary owns the store file
    let operator = Principal::admin(std::env::var("USER").unwrap_or_else(|_| "operator".into()));

    match command {
        SettingsCommand::Show => {
            let system = service
                .system_config(&operator)?
                .unwrap_or_else(SystemConfig::defaults);
            println!("{}", serde_json::to_string_pretty(&system)?);
        }
        SettingsCommand::Background => {
            println!("{}", serde_json::to_string_pretty(&service.background_config()?)?);
        }
        SettingsCommand::Set { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let system: SystemConfig = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a settings document", file.display()))?;
            service.update_system_config(&operator, &system)?;
            println!(
                "Saved settings to {} (email configured: {})",
                config.settings.store_path.display(),
                service.is_email_configured()?
            );
        }
    }
    Ok(())
}
