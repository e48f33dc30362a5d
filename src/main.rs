use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use leveljumper::app::{App, AppScreen, Focus, StateSource};
use leveljumper::config::Config;
use leveljumper::engine::bucket::BucketKey;
use leveljumper::event::{AppEvent, EventHandler};
use leveljumper::store::context_store::{AUTO_SCROLL_OFF, ContextField, write_field};
use leveljumper::store::kv_store::{JsonKvStore, KeyValueStore};
use leveljumper::ui::components::jump_menu::{JumpMenuWidget, bucket_title};
use leveljumper::ui::components::tree_view::TreeViewWidget;
use leveljumper::ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "leveljumper", version, about = "Jump to the first unfinished skill of each progress tier")]
struct Cli {
    #[arg(short, long, help = "Host state JSON (defaults to the bundled sample)")]
    state: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Count the legendary level when classifying")]
    include_legendary: bool,

    #[arg(long, help = "Print the jump menu and exit")]
    print: bool,

    #[arg(long, value_name = "BUCKET", help = "Bucket to jump to on load, or 'off'")]
    set_auto_scroll: Option<String>,

    #[arg(long, value_name = "BUCKET", help = "Bucket preselected in the menu")]
    set_auto_jump: Option<String>,

    #[arg(short, long, help = "Debug logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;

    if let Some(theme) = cli.theme.clone() {
        config.theme = theme;
    }
    if cli.include_legendary {
        config.ignore_legendary = false;
    }

    let interactive = !cli.print && cli.set_auto_scroll.is_none() && cli.set_auto_jump.is_none();
    init_logging(cli.verbose, interactive)?;

    let source = match cli.state.as_ref().or(config.state_path.as_ref()) {
        Some(path) => StateSource::from_path(path)?,
        None => StateSource::bundled()?,
    };
    let mut store = JsonKvStore::new()?;

    if cli.set_auto_scroll.is_some() || cli.set_auto_jump.is_some() {
        return save_preferences(&cli, &source, &mut store);
    }

    let mut app = App::new(config, source, Box::new(store));

    if cli.print {
        return print_menu(&mut app);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Interactive runs own the terminal, so logs go to a file under the data dir.
fn init_logging(verbose: bool, interactive: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("leveljumper=debug")
    } else {
        EnvFilter::new("leveljumper=info")
    };

    if interactive {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leveljumper");
        std::fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("leveljumper.log"))?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time().with_writer(io::stderr))
            .with(filter)
            .init();
    }
    Ok(())
}

fn save_preferences(cli: &Cli, source: &StateSource, store: &mut dyn KeyValueStore) -> Result<()> {
    let language = source.snapshot()?.language;

    if let Some(value) = cli.set_auto_scroll.as_deref() {
        if value != AUTO_SCROLL_OFF && BucketKey::from_key(value).is_none() {
            bail!("unknown bucket '{value}'");
        }
        if !write_field(store, ContextField::AutoScroll, &language, value) {
            bail!("could not save auto-scroll preference");
        }
        println!("auto-scroll for {}: {value}", language.key_suffix());
    }
    if let Some(value) = cli.set_auto_jump.as_deref() {
        if BucketKey::from_key(value).is_none() {
            bail!("unknown bucket '{value}'");
        }
        if !write_field(store, ContextField::AutoJump, &language, value) {
            bail!("could not save auto-jump preference");
        }
        println!("auto-jump for {}: {value}", language.key_suffix());
    }
    Ok(())
}

fn print_menu(app: &mut App) -> Result<()> {
    app.notify_page_changed();
    if let Some(status) = app.status.as_ref().filter(|s| s.is_error) {
        bail!("{}", status.text);
    }
    app.page_loaded();

    println!("state: {}", app.source.origin);
    for entry in app.menu_entries() {
        let skill = entry
            .skill
            .position()
            .map(|p| app.skill_name(p))
            .unwrap_or_default();
        println!(
            "{:<12} {:>2}  {:<20} {:<18} {}",
            bucket_title(entry.bucket),
            entry.label,
            entry.target.to_string(),
            entry.bucket.to_key(),
            skill
        );
    }
    if let Some(status) = &app.status {
        println!("{}", status.text);
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        // every redraw may change the page structure
        app.notify_page_changed();
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Loaded => app.page_loaded(),
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('p') => app.toggle_screen(),
        _ if app.screen == AppScreen::Profile => {}
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => app.activate(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    let colors = app.theme.colors.clone();

    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area, app.menu_entries().len());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " leveljumper ",
            Style::default().fg(colors.bg()).bg(colors.accent()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} | {}", app.screen.path(), app.source.origin),
            Style::default().fg(colors.muted()),
        ),
    ]));
    frame.render_widget(header, layout.header);

    match app.screen {
        AppScreen::Learn => {
            let tree_height = layout.tree.height.saturating_sub(2) as usize;
            if app.focus == Focus::Tree {
                app.clamp_scroll(tree_height);
            }
            let rows = app.tree_rows();
            let tree = TreeViewWidget::new(&rows, &app.skills, app.scroll, &app.theme)
                .cursor((app.focus == Focus::Tree).then_some(app.skill_selected))
                .last_opened(app.last_opened());
            frame.render_widget(tree, layout.tree);

            let menu = JumpMenuWidget::new(
                app.menu_entries(),
                (app.focus == Focus::Menu).then_some(app.menu_selected),
                &app.theme,
            );
            frame.render_widget(menu, layout.menu);
        }
        AppScreen::Profile => {
            let body = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Profile. The jump menu is rebuilt when you return to the tree.",
                    Style::default().fg(colors.fg()),
                )),
            ])
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
            frame.render_widget(body, layout.tree.union(layout.menu));
        }
    }

    let mut footer_lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let fg = if status.is_error { colors.error() } else { colors.accent() };
        footer_lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(fg),
        )));
    }
    let hints = [
        "[\u{2191}\u{2193}/jk] Move",
        "[Enter] Open/Jump",
        "[Tab] Tree/Menu",
        "[p] Learn/Profile",
        "[q] Quit",
    ];
    for hint in pack_hint_lines(&hints, layout.footer.width as usize) {
        footer_lines.push(Line::from(Span::styled(hint, Style::default().fg(colors.muted()))));
    }
    footer_lines.truncate(layout.footer.height as usize);
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}
