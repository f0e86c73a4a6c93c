use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{FuzzySelect, Input};
use revstr::{config_path, read_config, read_config_from, Config, Format, Result, Reversal};
use std::{
    fs::File,
    io::{self, BufRead, Write},
    path::Path,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Reverse the characters of a string")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Command>,
    /// Text to reverse, defaults to the configured text
    #[arg(conflicts_with_all = ["stdin", "interactive"])]
    text: Option<String>,
    /// Output format, defaults to the configured format
    #[arg(short, long, value_enum)]
    format: Option<Format>,
    /// Reverse every line read from standard input
    #[arg(long)]
    stdin: bool,
    /// Ask for the text to reverse
    #[arg(short, long, conflicts_with = "stdin")]
    interactive: bool,
}

impl Args {
    /// Whether any value still has to come from the config file
    fn needs_config(&self) -> bool {
        self.format.is_none() || (self.text.is_none() && !self.stdin)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Store the default text and output format
    Config(Settings),
}

#[derive(Parser)]
struct Settings {
    /// Print the current settings instead of asking for new ones
    #[arg(long)]
    show: bool,
}

fn init_tracing() {
    // RUST_LOG controls the level, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = Args::parse();
    let needs_config = args.needs_config();

    match args.command {
        Some(Command::Config(Settings { show })) => configure(show)?,
        None => {
            let config = match needs_config {
                true => read_config()?,
                false => Config::default(),
            };
            let format = args.format.unwrap_or(config.format);

            if args.stdin {
                reverse_lines(io::stdin().lock(), &mut io::stdout().lock(), format)?;
            } else {
                let text = match args.text {
                    Some(text) => text,
                    None if args.interactive => Input::<String>::new()
                        .with_prompt("Text")
                        .with_initial_text(config.text)
                        .allow_empty(true)
                        .interact_text()?,
                    None => config.text,
                };
                debug!(%text, %format, "reversing");
                println!("{}", Reversal::new(text).render(format)?);
            }
        }
    }

    // Return success
    Ok(())
}

fn reverse_lines(input: impl BufRead, output: &mut impl Write, format: Format) -> Result<()> {
    let mut count = 0;
    for line in input.lines() {
        let rendered = Reversal::new(line?).render(format)?;
        writeln!(output, "{rendered}")?;
        count += 1;
    }
    info!(count, "reversed lines from stdin");
    Ok(())
}

fn configure(show: bool) -> Result<()> {
    if show {
        print!("{}", toml::to_string(&read_config()?)?);
        return Ok(());
    }

    let config_file = config_path()?;
    let defaults = defaults_or_warn(&config_file);

    let text = Input::<String>::new()
        .with_prompt("Default text")
        .with_initial_text(defaults.text)
        .allow_empty(true)
        .interact_text()?;

    let default = Format::value_variants()
        .iter()
        .position(|it| *it == defaults.format)
        .unwrap_or(0);
    let index = FuzzySelect::new()
        .items(Format::value_variants())
        .with_prompt("Format")
        .default(default)
        .report(false)
        .interact()?;

    // Create config file
    if let Some(parent) = config_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let message = format!("Wrote settings to {}", config_file.display());

    // Serialize to toml
    let config = Config {
        text,
        format: Format::value_variants()[index],
    };
    let toml = toml::to_string(&config)?;

    // Write to file
    let mut file = File::create(config_file)?;
    file.write_all(toml.as_bytes())?;
    println!("{message}");

    Ok(())
}

/// A broken file must not stop it from being rewritten
fn defaults_or_warn(path: &Path) -> Config {
    read_config_from(path).unwrap_or_else(|err| {
        warn!(%err, path = %path.display(), "ignoring unreadable config, starting from defaults");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["revstr"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.text.is_none());
        assert!(args.format.is_none());
        assert!(!args.stdin);
        assert!(!args.interactive);
    }

    #[test]
    fn test_text_and_format() {
        let args = Args::try_parse_from(["revstr", "stressed", "--format", "plain"]).unwrap();
        assert_eq!(args.text.as_deref(), Some("stressed"));
        assert_eq!(args.format, Some(Format::Plain));
    }

    #[test]
    fn test_every_format_name_parses() {
        for format in Format::value_variants() {
            let name = format.to_string();
            let args = Args::try_parse_from(["revstr", "-f", name.as_str()]).unwrap();
            assert_eq!(args.format, Some(*format));
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["revstr", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        assert!(Args::try_parse_from(["revstr", "abc", "--stdin"]).is_err());
        assert!(Args::try_parse_from(["revstr", "abc", "--interactive"]).is_err());
        assert!(Args::try_parse_from(["revstr", "--stdin", "--interactive"]).is_err());
    }

    #[test]
    fn test_needs_config() {
        let needs = |argv: &[&str]| Args::try_parse_from(argv.iter().copied()).unwrap().needs_config();
        assert!(needs(&["revstr"]));
        assert!(needs(&["revstr", "abc"]));
        assert!(needs(&["revstr", "--format", "plain"]));
        assert!(needs(&["revstr", "--interactive", "--format", "plain"]));
        assert!(!needs(&["revstr", "abc", "--format", "plain"]));
        assert!(!needs(&["revstr", "--stdin", "--format", "json"]));
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("revstr.toml");
        std::fs::write(&path, "format = \"yaml\"\n").unwrap();
        assert_eq!(defaults_or_warn(&path), Config::default());

        std::fs::write(&path, "text = \"stressed\"\n").unwrap();
        assert_eq!(defaults_or_warn(&path).text, "stressed");
    }

    #[test]
    fn test_config_subcommand() {
        let args = Args::try_parse_from(["revstr", "config", "--show"]).unwrap();
        assert!(matches!(args.command, Some(Command::Config(Settings { show: true }))));
    }

    #[test]
    fn test_reverse_lines_plain() {
        let input = "abc\nracecar\n\nHello, World!\n";
        let mut output = Vec::new();
        reverse_lines(input.as_bytes(), &mut output, Format::Plain).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "cba\nracecar\n\n!dlroW ,olleH\n");
    }

    #[test]
    fn test_reverse_lines_strips_crlf() {
        let mut output = Vec::new();
        reverse_lines("ab\r\ncd".as_bytes(), &mut output, Format::Plain).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "ba\ndc\n");
    }

    #[test]
    fn test_reverse_lines_json() {
        let mut output = Vec::new();
        reverse_lines("ab\n".as_bytes(), &mut output, Format::Json).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"original\":\"ab\",\"reversed\":\"ba\"}\n"
        );
    }
}
