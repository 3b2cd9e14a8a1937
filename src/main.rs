//! acparts: browse and edit parts-data files from the terminal.
#![allow(clippy::multiple_crate_versions)]

use acparts::catalog::Catalog;
use acparts::settings::Settings;
use acparts::{app_state, config, ui, Document};
use anyhow::Context;
use clap::{Parser, Subcommand};
use edtui::EditorEventHandler;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "acparts", version)]
#[command(about = "Edit Shift_JIS parts-data files section by section", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Directory to browse (defaults to the last one used)
    #[arg(value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    /// Text encoding of the parts files
    #[arg(long, global = true, value_name = "LABEL")]
    encoding: Option<String>,

    /// Accept files that are not in the recognized table
    #[arg(long, global = true)]
    permissive: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the parts files in a directory
    Files {
        /// Directory to list
        dir: PathBuf,
    },
    /// List the section labels of a file
    Sections {
        /// Parts file
        file: PathBuf,
        /// Print label/section pairs as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the keys of a section
    Keys {
        /// Parts file
        file: PathBuf,
        /// Section name or label
        section: String,
    },
    /// Print one value
    Get {
        /// Parts file
        file: PathBuf,
        /// Section name or label
        section: String,
        /// Key, matched without regard to case
        key: String,
    },
    /// Change one value and rewrite the file
    Set {
        /// Parts file
        file: PathBuf,
        /// Section name or label
        section: String,
        /// Key, matched without regard to case
        key: String,
        /// New value
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.command.is_none());

    let mut cfg = config::Config::load();

    // Override config with command line args
    if let Some(encoding) = args.encoding {
        cfg.encoding = encoding;
    }
    if args.permissive {
        cfg.enforce_allowlist = false;
    }

    match args.command {
        Some(command) => run_command(command, &cfg),
        None => {
            let settings = Settings::load(&cfg.settings_path());
            let mut state = app_state::AppState::new(&cfg, settings)?;
            match args.directory {
                Some(dir) => state.change_directory(&dir),
                None => state.restore_directory(),
            }
            run_tui(state).context("terminal session failed")
        }
    }
}

/// Subcommands log to stderr; the terminal shell only when asked, since it owns the screen.
fn init_logging(verbose: bool, interactive: bool) {
    if interactive && !verbose {
        return;
    }
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_command(command: Command, cfg: &config::Config) -> anyhow::Result<()> {
    let options = cfg.load_options()?;

    match command {
        Command::Files { dir } => {
            let catalog = Catalog::new(cfg.policy());
            for name in catalog.candidate_files(&dir, &cfg.file_extensions)? {
                println!("{name}");
            }
        }
        Command::Sections { file, json } => {
            let doc = Document::load(&file, &options)?;
            if json {
                let out = serde_json::to_string_pretty(doc.display_labels())?;
                println!("{out}");
            } else {
                for label in doc.display_labels() {
                    println!("{}\t{}", label.section, label.label);
                }
            }
        }
        Command::Keys { file, section } => {
            let doc = Document::load(&file, &options)?;
            for key in doc.resolve(&section)?.keys() {
                println!("{key}");
            }
        }
        Command::Get { file, section, key } => {
            let doc = Document::load(&file, &options)?;
            println!("{}", doc.value(&section, &key)?.unwrap_or_default());
        }
        Command::Set {
            file,
            section,
            key,
            value,
        } => {
            let mut doc = Document::load(&file, &options)?;
            let written = doc.set_value_and_persist(&section, &key, &value)?;
            println!("Value saved: {written}");
        }
    }
    Ok(())
}

fn run_tui(mut app: app_state::AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut editor_handler = EditorEventHandler::default();

    let result = run_app(&mut terminal, &mut app, &mut editor_handler);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut app_state::AppState,
    editor_handler: &mut EditorEventHandler,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.current_view {
            app_state::View::FileList | app_state::View::Sections | app_state::View::Keys => {
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                    KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
                        app.go_back();
                    }
                    KeyCode::Char(':') => app.enter_command(),
                    KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                        match app.current_view {
                            app_state::View::FileList => app.open_selected_file(),
                            app_state::View::Sections => app.enter_keys(),
                            _ => app.enter_value_view(),
                        }
                    }
                    _ => {}
                }
            }
            app_state::View::Value => {
                let normal = app
                    .editor_state
                    .as_ref()
                    .is_some_and(|s| s.mode == edtui::EditorMode::Normal);
                match key.code {
                    KeyCode::Char(':') if normal => app.enter_command(),
                    KeyCode::Esc if normal => app.exit_value_view(),
                    _ => {
                        if let Some(ref mut editor_state) = app.editor_state {
                            editor_handler.on_key_event(key, editor_state);
                        }
                    }
                }
            }
            app_state::View::Command => match key.code {
                KeyCode::Char(c) => app.command_buffer.push(c),
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    if app.run_command() {
                        return Ok(());
                    }
                }
                KeyCode::Esc => {
                    app.go_back();
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }
    }
}
