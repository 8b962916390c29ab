use clap::Parser;
use color_eyre::Result;
use grantview::{App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, APP_NAME};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::mpsc::{channel, TryRecvError};
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new(tx.clone(), config);
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone()))?;
    }

    loop {
        let mut updated = false;
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        } else if app.is_loading() {
            app.tick();
            updated = true;
        }

        loop {
            match rx.try_recv() {
                Ok(AppEvent::Exit) => return Ok(()),
                Ok(event) => {
                    if let Some(event) = app.event(event) {
                        tx.send(event)?;
                    }
                    updated = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
}

/// Log to a file in the cache directory; the terminal belongs to the UI.
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &AppConfig) -> Result<()> {
    let log_path = CacheManager::new(APP_NAME)?.log_file()?;
    let file = File::options().create(true).append(true).open(&log_path)?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .format_timestamp_millis()
    .try_init()?;
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
            }
            Err(_e) => println!("No cache to clear"),
        }
        return Ok(Some(()));
    }

    if args.generate_config {
        let config = ConfigManager::new(APP_NAME)?;
        match config.write_default_config(args.force) {
            Ok(path) => println!("Wrote default configuration to {}", path.display()),
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(APP_NAME)?;
    if args.debug {
        config.debug.enabled = true;
    }
    if let Some(rows) = args.preview_rows {
        config.display.max_preview_rows = rows;
    }
    config.validate()?;

    if let Err(e) = init_logging(&config) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    log::info!("{} {} starting", APP_NAME, env!("CARGO_PKG_VERSION"));

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        log::error!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
