use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use landmark_editor::api::{ApiClient, Geocoder, Worker};
use landmark_editor::app::App;
use landmark_editor::canvas::MapCanvas;
use landmark_editor::config::{Cli, Command};
use landmark_editor::map::MapRenderer;
use landmark_editor::{data, logging, ui};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;
    log::info!("starting {:?} against {}", cli.command, cli.api_url);

    let client = ApiClient::new(&cli.api_url, cli.token.clone()).context("building API client")?;
    let geocoder = Geocoder::new(&cli.geocoder_url).context("building geocoder client")?;
    let worker = Worker::new(client, geocoder)?;

    let mut map_renderer = MapRenderer::new();
    data::load_basemap(&mut map_renderer, &cli.data_dir)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &cli, map_renderer, &worker);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    // The search prompt swallows typing
    if app.search.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel(),
            KeyCode::Enter => app.submit_search(),
            KeyCode::Backspace => app.search_backspace(),
            KeyCode::Char(c) => app.search_input(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.cancel(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.canvas.pan(-10, 0, now),
        KeyCode::Right | KeyCode::Char('l') => app.canvas.pan(10, 0, now),
        KeyCode::Up | KeyCode::Char('k') => app.canvas.pan(0, -6, now),
        KeyCode::Down | KeyCode::Char('j') => app.canvas.pan(0, 6, now),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.canvas.zoom_in(now),
        KeyCode::Char('-') | KeyCode::Char('_') => app.canvas.zoom_out(now),

        KeyCode::Char('d') => app.cycle_tool(),
        KeyCode::Char('m') => app.cycle_basemap(),
        KeyCode::Char('o') => app.toggle_neighbours(),
        KeyCode::Char('f') => app.fit_target(),
        KeyCode::Char('r') => app.request_view(),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Enter => app.confirm(),
        KeyCode::Char('x') => {
            app.discard();
        }
        _ => {}
    }
}

/// Handle mouse events for panning, zooming, drawing and selecting
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let now = Instant::now();
    // Always track mouse position for cursor marker
    app.canvas.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.canvas.zoom_in_at(mouse.column, mouse.row, now),
        MouseEventKind::ScrollDown => app.canvas.zoom_out_at(mouse.column, mouse.row, now),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.canvas.pan(-15, 0, now),
        MouseEventKind::ScrollRight => app.canvas.pan(15, 0, now),
        MouseEventKind::Down(MouseButton::Left) => app.pointer_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(mouse.column, mouse.row, now),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    cli: &Cli,
    map_renderer: MapRenderer,
    worker: &Worker,
) -> Result<()> {
    let size = terminal.size()?;
    let drawing = !matches!(cli.command, Command::PlaceStop { .. });
    let mut canvas = MapCanvas::new(
        cli.center,
        cli.zoom,
        size.width as usize,
        size.height as usize,
        drawing,
    );
    canvas.basemap = cli.basemap;
    let mut app = App::new(&cli.command, canvas, map_renderer);

    // Main loop
    loop {
        for job in app.take_jobs() {
            worker.submit(job);
        }
        for outcome in worker.drain() {
            app.apply(outcome);
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.canvas.resize(width as usize, height as usize),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
