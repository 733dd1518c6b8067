use std::fmt;
use std::sync::Arc;

use services::{DictationTrainer, Narrator, SpeechRate, SpeechSynthesizer};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

mod shell;
mod voice;

use shell::{Flow, Shell};
use voice::CommandSynthesizer;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidRate { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidRate { raw } => write!(f, "invalid --rate value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  dictation [--db <sqlite_url>] [--lang <tag>] [--rate <0.1..10>] [--speech-cmd <program>] [--mute]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dictation.sqlite3 (relative paths are made absolute)");
    eprintln!("  --lang de-DE");
    eprintln!("  --rate 1.0");
    eprintln!("  --speech-cmd espeak-ng");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DICTATION_DB_URL, DICTATION_LANG, DICTATION_RATE, DICTATION_SPEECH_CMD, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    db_url: String,
    language: String,
    rate: SpeechRate,
    speech_cmd: String,
    mute: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DICTATION_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("dictation.sqlite3".into()), normalize_sqlite_url);
        let mut language = std::env::var("DICTATION_LANG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| services::speech::DEFAULT_LANGUAGE.to_owned());
        let mut rate = std::env::var("DICTATION_RATE")
            .ok()
            .and_then(|value| parse_rate(&value).ok())
            .unwrap_or_default();
        let mut speech_cmd =
            std::env::var("DICTATION_SPEECH_CMD").unwrap_or_else(|_| "espeak-ng".into());
        let mut mute = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--lang" => language = require_value(args, "--lang")?,
                "--rate" => rate = parse_rate(&require_value(args, "--rate")?)?,
                "--speech-cmd" => speech_cmd = require_value(args, "--speech-cmd")?,
                "--mute" => mute = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            language,
            rate,
            speech_cmd,
            mute,
        })
    }

    fn narrator(&self) -> Narrator {
        let synthesizer: Arc<dyn SpeechSynthesizer> = if self.mute {
            Arc::new(services::SilentSynthesizer)
        } else {
            Arc::new(CommandSynthesizer::new(self.speech_cmd.clone()))
        };
        Narrator::new(synthesizer)
            .with_language(self.language.clone())
            .with_rate(self.rate)
    }
}

fn parse_rate(raw: &str) -> Result<SpeechRate, ArgsError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .and_then(|value| SpeechRate::new(value).ok())
        .ok_or_else(|| ArgsError::InvalidRate {
            raw: raw.to_owned(),
        })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    tracing::debug!(?parsed, "starting");

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let trainer = DictationTrainer::open(Arc::clone(&storage.topics), parsed.narrator()).await;
    let mut shell = Shell::new(trainer, std::io::stdout());
    shell.greet()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        shell.write_prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if shell.handle_line(&line).await? == Flow::Quit {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--lang",
            "fr-FR",
            "--rate",
            "0.75",
            "--speech-cmd",
            "espeak",
            "--mute",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.language, "fr-FR");
        assert_eq!(args.rate, SpeechRate::new(0.75).unwrap());
        assert_eq!(args.speech_cmd, "espeak");
        assert!(args.mute);
    }

    #[test]
    fn rejects_bad_rate_and_unknown_flags() {
        assert!(matches!(
            parse(&["--rate", "fast"]),
            Err(ArgsError::InvalidRate { .. })
        ));
        assert!(matches!(
            parse(&["--rate", "20"]),
            Err(ArgsError::InvalidRate { .. })
        ));
        assert!(matches!(
            parse(&["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        let url = normalize_sqlite_url("sqlite:data/dictation.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/dictation.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/x.sqlite3".into()),
            "sqlite:///tmp/x.sqlite3"
        );
    }
}
