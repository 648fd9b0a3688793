use crate::app::{format_area, App, ToastLevel};
use crate::braille::BrailleCanvas;
use crate::map::{LabelKind, MapLayers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ", app.mode());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.canvas.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let overlay = app.overlay();
    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        app.canvas.basemap,
        &overlay,
    );

    let cursor_pos = app.canvas.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let map_widget = MapWidget {
        layers,
        cursor_pos,
        imagery: app.canvas.basemap.is_imagery(),
    };
    frame.render_widget(map_widget, inner);
}

/// Braille map layers with text labels overlaid
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
    /// Satellite basemaps paint a dark background under everything
    imagery: bool,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some(ch) = canvas.glyph(col, row) {
                    let x = area.x + col as u16;
                    let y = area.y + row as u16;
                    buf[(x, y)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.imagery {
            buf.set_style(area, Style::default().bg(Color::Rgb(20, 32, 24)));
        }

        // Back to front
        let basemap_color = if self.imagery { Color::Rgb(90, 110, 80) } else { Color::Blue };
        self.render_layer(&self.layers.basemap, basemap_color, area, buf);
        self.render_layer(&self.layers.neighbours, Color::DarkGray, area, buf);
        self.render_layer(&self.layers.target, Color::Yellow, area, buf);
        let candidate_color = if self.layers.candidate_pending {
            Color::Green
        } else {
            Color::Magenta
        };
        self.render_layer(&self.layers.candidate, candidate_color, area, buf);
        self.render_layer(&self.layers.markers, Color::LightRed, area, buf);

        for label in &self.layers.labels {
            if label.row >= area.height || label.col >= area.width {
                continue;
            }
            let style = match label.kind {
                LabelKind::Place => Style::default().fg(Color::White),
                LabelKind::Landmark => Style::default().fg(Color::Gray),
                LabelKind::Target => {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                }
                LabelKind::Stop => Style::default().fg(Color::LightRed),
            };

            let x = area.x + label.col;
            let y = area.y + label.row;
            let max_len = area.width.saturating_sub(label.col) as usize;
            for (i, ch) in label.text.chars().take(max_len.min(24)).enumerate() {
                buf[(x + i as u16, y)].set_char(ch).set_style(style);
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    // The search prompt and toasts take over the whole line
    if let Some(query) = &app.search {
        let line = Line::from(vec![
            Span::styled(" search: ", Style::default().fg(Color::Cyan)),
            Span::raw(query.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled("  Enter:go Esc:cancel", dim),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }
    if let Some(toast) = &app.toast {
        let color = match toast.level {
            ToastLevel::Info => Color::Green,
            ToastLevel::Error => Color::Red,
        };
        let line = Line::from(Span::styled(
            format!(" {}", toast.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut spans = vec![
        Span::styled(" [", dim),
        Span::styled(app.canvas.tool.label(), Style::default().fg(Color::Magenta)),
        Span::styled("] ", dim),
        Span::styled(app.canvas.basemap.label(), Style::default().fg(Color::Blue)),
        Span::styled(" ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if app.canvas.is_flying() {
        spans.push(Span::styled(" | flying", Style::default().fg(Color::Yellow)));
    }
    if let Some(area_m2) = app.canvas.area_readout() {
        spans.push(Span::styled(" | ", dim));
        spans.push(Span::styled(format_area(area_m2), Style::default().fg(Color::Green)));
    }
    spans.push(Span::styled(
        " | d:tool m:map o:others f:fit /:search Enter:save x:discard q:quit",
        dim,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
