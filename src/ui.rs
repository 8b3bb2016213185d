use crate::app::App;
use crate::braille::BrailleCanvas;
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

/// A POI marker placed in character coordinates
struct PoiMarker {
    x: u16,
    y: u16,
    selected: bool,
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Places ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let mut canvas = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let labels = app.map_renderer.render(&mut canvas, &viewport);

    // Project the overlay's visible POIs onto character cells
    let selected_id = app.selected_poi().map(|p| p.id);
    let mut markers = Vec::new();
    let mut selected_caption = None;
    for poi in app.overlay.visible() {
        let (px, py) = viewport.project(poi.lon, poi.lat);
        if px < 0 || py < 0 || !viewport.is_visible(px, py) {
            continue;
        }
        let x = (px / 2) as u16;
        let y = (py / 4) as u16;
        if x >= inner.width || y >= inner.height {
            continue;
        }
        let selected = selected_id == Some(poi.id);
        if selected {
            selected_caption = Some((x, y, format!("{} [{}]", poi.name, poi.category)));
        }
        markers.push(PoiMarker { x, y, selected });
    }

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let map_widget = MapWidget {
        canvas,
        labels,
        markers,
        selected_caption,
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);
}

/// Braille basemap with place labels and POI markers overlaid
struct MapWidget {
    canvas: BrailleCanvas,
    labels: Vec<(u16, u16, String)>,
    markers: Vec<PoiMarker>,
    selected_caption: Option<(u16, u16, String)>,
    cursor_pos: Option<(u16, u16)>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Basemap first
        for (row_idx, row_str) in self.canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;
            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(Color::Cyan);
            }
        }

        // Place labels
        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.labels {
            if *lx >= area.width || *ly >= area.height {
                continue;
            }
            let y = area.y + *ly;
            let max_len = (area.width - *lx).min(20) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + *lx + i as u16, y)].set_char(ch).set_style(label_style);
            }
        }

        // Fetched POI markers on top
        for marker in &self.markers {
            if marker.x >= area.width || marker.y >= area.height {
                continue;
            }
            let (glyph, color) = if marker.selected {
                ('◉', Color::Red)
            } else {
                ('●', Color::Yellow)
            };
            buf[(area.x + marker.x, area.y + marker.y)]
                .set_char(glyph)
                .set_fg(color);
        }

        // Caption next to the selected POI
        if let Some((cx, cy, text)) = &self.selected_caption {
            if *cy < area.height {
                let start = cx.saturating_add(2);
                let y = area.y + *cy;
                let max_len = area.width.saturating_sub(start).min(30) as usize;
                for (i, ch) in text.chars().take(max_len).enumerate() {
                    buf[(area.x + start + i as u16, y)]
                        .set_char(ch)
                        .set_fg(Color::Red);
                }
            }
        }

        // Mouse cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            if cx < area.width && cy < area.height {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let overlay_color = match app.overlay_label() {
        "active" => Color::Green,
        "held" => Color::Yellow,
        "off" => Color::Red,
        _ => Color::DarkGray,
    };

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" POI: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.overlay_label(), Style::default().fg(overlay_color)),
        Span::styled(
            format!(" ({})", app.overlay.visible().len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if settings.show_places { " [P]laces" } else { " [p]laces" },
            Style::default().fg(if settings.show_places { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_labels { " [L]abels " } else { " [l]abels " },
            Style::default().fg(if settings.show_labels { Color::Green } else { Color::DarkGray }),
        ),
    ];

    if let Some(poi) = app.selected_poi() {
        spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            format!("{} [{}] ", poi.name, poi.category),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom o:poi n/N:select q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}
