//! # Codechat
//!
//! Renders chat replies with highlighted code blocks and merges those blocks
//! into the file being edited.
//!
//! ## Quick Start
//!
//! ```bash
//! # Render a reply to markup
//! cargo run -- render reply.md --active main.py
//!
//! # List the code blocks of a reply as JSON
//! cat reply.md | cargo run -- blocks -
//!
//! # Append the second block of a reply to a file and save it
//! cargo run -- insert reply.md --into src/main.py --block 1 --save
//!
//! # Ask the configured model
//! cargo run -- ask "Write hello world in Rust"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use codechat_core::{
    ActiveDocument, ChatMessage, ChatSession, Config, ConfiguredProvider, CoreError, EditorDocument,
    InsertionController, MessageParser, RecordingNotifier, Role, render_message,
};
use codechat_syntax::{ExtensionResolver, GrammarRegistry, Highlighter};

/// Codechat - chat replies with insertable, highlighted code
#[derive(Parser, Debug)]
#[command(name = "codechat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the markup for a message
    Render {
        /// Message file, or `-` for stdin
        #[arg(value_name = "MESSAGE_FILE")]
        input: PathBuf,

        /// Name of the document open in the editor
        #[arg(long, value_name = "NAME")]
        active: Option<String>,

        /// Author of the message
        #[arg(long, default_value = "assistant")]
        role: Role,
    },

    /// Print the code blocks of a message as JSON
    Blocks {
        /// Message file, or `-` for stdin
        #[arg(value_name = "MESSAGE_FILE")]
        input: PathBuf,
    },

    /// Append a code block of a message to a document
    Insert {
        /// Message file, or `-` for stdin
        #[arg(value_name = "MESSAGE_FILE")]
        input: PathBuf,

        /// Document to insert into
        #[arg(long, value_name = "DOC")]
        into: PathBuf,

        /// Index of the code block
        #[arg(long, default_value_t = 0)]
        block: usize,

        /// Write the document after inserting
        #[arg(long)]
        save: bool,
    },

    /// List registered languages
    Languages,

    /// Send a message to the configured model and print the transcript
    Ask {
        /// Message text
        text: String,

        /// Name of the document open in the editor
        #[arg(long, value_name = "NAME")]
        active: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Print the default config file path instead
        #[arg(long)]
        path: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_ascii_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    tracing::info!("Starting codechat v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;
    let output = run(args.command, &config)?;
    print!("{output}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

/// Executes a command and returns what it prints.
fn run(command: Command, config: &Config) -> anyhow::Result<String> {
    let registry = GrammarRegistry::with_builtin();
    let highlighter = Highlighter::new(&registry).with_max_bytes(config.render.max_highlight_bytes);
    let parser = MessageParser::new(highlighter);

    match command {
        Command::Render {
            input,
            active,
            role,
        } => {
            let text = read_input(&input)?;
            let message = ChatMessage::new(role, text);
            let mut out = render_message(&parser, &message, active.as_deref(), &config.render);
            out.push('\n');
            Ok(out)
        }

        Command::Blocks { input } => {
            let text = read_input(&input)?;
            let blocks = parser.code_blocks(&text);
            let mut out = serde_json::to_string_pretty(&blocks)?;
            out.push('\n');
            Ok(out)
        }

        Command::Insert {
            input,
            into,
            block,
            save,
        } => {
            let text = read_input(&input)?;
            let blocks = parser.code_blocks(&text);
            let selected = blocks.get(block).ok_or(CoreError::BlockNotFound {
                index: block,
                count: blocks.len(),
            })?;

            let mut document = EditorDocument::new();
            document
                .open_file(&into)
                .with_context(|| format!("Failed to open {}", into.display()))?;

            let notifier = RecordingNotifier::new();
            let controller = InsertionController::new(&notifier)
                .with_separator(config.editor.insertion_separator.clone());
            controller.insert_block(&mut document, selected)?;

            if save {
                document
                    .save()
                    .with_context(|| format!("Failed to save {}", into.display()))?;
            }

            let mut out = String::new();
            for notification in notifier.notifications() {
                out.push_str(&notification.message);
                out.push('\n');
            }
            if !save && document.is_modified() {
                out.push_str(&format!("{} has unsaved changes (use --save)\n", document.name().unwrap_or("document")));
            }
            Ok(out)
        }

        Command::Languages => {
            let mut out = String::new();
            for grammar in registry.grammars() {
                out.push_str(grammar.name());
                if !grammar.aliases().is_empty() {
                    out.push_str(&format!(" ({})", grammar.aliases().join(", ")));
                }
                out.push_str(&format!(" -> .{}\n", ExtensionResolver::resolve(grammar.name())));
            }
            Ok(out)
        }

        Command::Ask { text, active } => {
            let provider = ConfiguredProvider::from_config(&config.provider);
            let mut session = ChatSession::from_config(&config.provider);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(session.ask(&provider, &text));

            let mut out = String::new();
            for message in session.messages() {
                out.push_str(&render_message(&parser, message, active.as_deref(), &config.render));
                out.push('\n');
            }
            Ok(out)
        }

        Command::Config { path } => {
            if path {
                let path = Config::default_path()?;
                Ok(format!("{}\n", path.display()))
            } else {
                Ok(toml::to_string_pretty(config)?)
            }
        }
    }
}

/// Reads a message from a file, or from stdin when the path is `-`.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read message from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "Try this:\n```python a.py\nprint(1)\n```\nor `len(x)`\n```js\nconsole.log('hi')\n```";

    fn write_reply(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("reply.md");
        std::fs::write(&path, REPLY).unwrap();
        path
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["codechat", "languages"]);
        assert_eq!(args.verbose, 0);
        assert!(args.config.is_none());
        assert!(matches!(args.command, Command::Languages));
    }

    #[test]
    fn test_args_insert() {
        let args = Args::parse_from([
            "codechat", "-vv", "insert", "reply.md", "--into", "main.py", "--block", "2",
        ]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Insert {
                input,
                into,
                block,
                save,
            } => {
                assert_eq!(input, PathBuf::from("reply.md"));
                assert_eq!(into, PathBuf::from("main.py"));
                assert_eq!(block, 2);
                assert!(!save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_args_render_role() {
        let args = Args::parse_from(["codechat", "render", "-", "--role", "user"]);
        match args.command {
            Command::Render { role, active, .. } => {
                assert_eq!(role, Role::User);
                assert!(active.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Args::try_parse_from(["codechat", "render", "-", "--role", "bot"]).is_err());
    }

    #[test]
    fn test_render_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_reply(&dir);
        let out = run(
            Command::Render {
                input,
                active: Some("a.py".to_string()),
                role: Role::Assistant,
            },
            &Config::default(),
        )
        .unwrap();
        assert!(out.starts_with("<div class=\"chat-message assistant\">Try this:<br>"));
        assert!(out.contains("data-file-name=\"a.py\">Add to Current File</button>"));
        assert!(out.contains("data-file-name=\"js.js\">Add to File</button>"));
        assert!(out.contains("<span class=\"inline-code\">len(x)</span>"));
    }

    #[test]
    fn test_blocks_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_reply(&dir);
        let out = run(Command::Blocks { input }, &Config::default()).unwrap();
        let blocks: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(blocks[0]["filename"], "a.py");
        assert_eq!(blocks[0]["code"], "print(1)");
        assert_eq!(blocks[1]["filename"], "js.js");
        assert_eq!(blocks.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_insert_command_without_save() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_reply(&dir);
        let doc = dir.path().join("main.py");
        std::fs::write(&doc, "x = 0").unwrap();

        let out = run(
            Command::Insert {
                input,
                into: doc.clone(),
                block: 0,
                save: false,
            },
            &Config::default(),
        )
        .unwrap();

        assert!(out.contains("Code from a.py added to current file. Don't forget to save!"));
        assert!(out.contains("unsaved changes"));
        assert_eq!(std::fs::read_to_string(&doc).unwrap(), "x = 0");
    }

    #[test]
    fn test_insert_command_with_save() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_reply(&dir);
        let doc = dir.path().join("main.js");
        std::fs::write(&doc, "let a = 1;").unwrap();

        run(
            Command::Insert {
                input,
                into: doc.clone(),
                block: 1,
                save: true,
            },
            &Config::default(),
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&doc).unwrap(),
            "let a = 1;\n\nconsole.log('hi')"
        );
    }

    #[test]
    fn test_insert_command_bad_block() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_reply(&dir);
        let doc = dir.path().join("main.py");
        std::fs::write(&doc, "").unwrap();

        let err = run(
            Command::Insert {
                input,
                into: doc,
                block: 5,
                save: false,
            },
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Code block 5 not found (2 available)");
    }

    #[test]
    fn test_languages_command() {
        let out = run(Command::Languages, &Config::default()).unwrap();
        assert!(out.contains("python (py, python3) -> .py"));
        assert!(out.lines().count() >= 10);
    }

    #[test]
    fn test_ask_without_key() {
        let mut config = Config::default();
        config.provider.api_key_env = "CODECHAT_TEST_UNSET_KEY_VAR".to_string();
        let out = run(
            Command::Ask {
                text: "hello".to_string(),
                active: None,
            },
            &config,
        )
        .unwrap();
        assert!(out.contains("<div class=\"chat-message system\">Please enter your API key first."));
    }

    #[test]
    fn test_ask_with_claude() {
        let mut config = Config::default();
        config.provider.kind = codechat_core::ProviderKind::Claude;
        config.provider.api_key = Some("key".to_string());
        config.render.show_timestamps = false;
        let out = run(
            Command::Ask {
                text: "hello".to_string(),
                active: None,
            },
            &config,
        )
        .unwrap();
        assert_eq!(
            out,
            "<div class=\"chat-message user\">hello</div>\n\
             <div class=\"chat-message assistant\">[Claude] This is a placeholder response.</div>\n"
        );
    }

    #[test]
    fn test_config_command() {
        let out = run(Command::Config { path: false }, &Config::default()).unwrap();
        let parsed: Config = toml::from_str(&out).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nshow_timestamps = false\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(!config.render.show_timestamps);
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_notifier_reference_is_a_sink() {
        use codechat_core::NotificationSink;

        let notifier = RecordingNotifier::new();
        let sink: &dyn NotificationSink = &notifier;
        sink.notify("x", codechat_core::Level::Info);
        assert_eq!(notifier.notifications().len(), 1);
    }
}
