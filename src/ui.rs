use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, BorderType, Borders, Paragraph, Wrap,
    },
    Frame,
};

use std::rc::Rc;

use crate::app::{App, Field};
use crate::state::Step;

fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(3), // footer
        ])
        .split(area)
}

fn body_area(outer: &[Rect]) -> Rect {
    outer[1].inner(Margin {
        horizontal: 2,
        vertical: 1,
    })
}

fn location_layout(body: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(body)
}

/// Cells the map canvas paints into on the location step, inside its border.
pub fn map_area(screen: Rect) -> Rect {
    let rows = location_layout(body_area(&screen_layout(screen)));
    rows[1].inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = screen_layout(frame.size());

    // ── Header ──────────────────────────────────────────────────────────────
    let step = app.step();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Encuentra la casa que imaginas",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  ·  "),
        Span::styled(
            format!("Paso {} / 4", step.number()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("  {}", step.title()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, outer[0]);

    // ── Body ─────────────────────────────────────────────────────────────────
    let body = body_area(&outer);
    match step {
        Step::Media => draw_media(frame, app, body),
        Step::Location => draw_location(frame, app, body),
        Step::Filters => draw_filters(frame, app, body),
        Step::Summary => draw_summary(frame, app, body),
    }

    // ── Footer ───────────────────────────────────────────────────────────────
    let back_style = if step == Step::Media {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let forward_style = if app.wizard.can_advance() {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(" PgUp ", back_style),
        Span::styled("Atrás   ", back_style),
        Span::styled(" PgDn ", forward_style),
        Span::styled(format!("{}   ", app.forward_label()), forward_style),
        Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
        Span::raw("salir   "),
    ];
    if let Some(msg) = &app.status {
        spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Green)));
    } else {
        spans.push(Span::styled(
            "Consejo: sube una imagen y marca el mapa para mejores resultados.",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Plain)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(footer, outer[2]);
}

fn panel<'a>(title: &str, focused: bool) -> Block<'a> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", title))
}

fn input_panel<'a>(app: &App, field: Field) -> Block<'a> {
    panel(field.label(), app.focus == Some(field))
}

fn preview_text(app: &App, empty: &str) -> String {
    let state = app.wizard.state();
    match (&state.image_preview, &state.image_file) {
        (Some(p), Some(f)) => {
            let size = p
                .dimensions
                .map(|(w, h)| format!(" · {}x{}", w, h))
                .unwrap_or_default();
            format!(
                "{}\n{}{} · {} bytes codificados",
                f.name,
                p.mime,
                size,
                p.data_uri.len()
            )
        }
        (None, Some(f)) => format!("{}\nCargando vista previa…", f.name),
        _ => empty.to_string(),
    }
}

fn draw_media(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);
    frame.render_widget(
        Paragraph::new(
            "Sube una imagen de referencia y escribe lo que buscas (opcional, pero recomendado).",
        )
        .wrap(Wrap { trim: true }),
        rows[0],
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(cols[0]);

    frame.render_widget(
        Paragraph::new(app.image_path_input.as_str()).block(input_panel(app, Field::ImagePath)),
        left[0],
    );
    frame.render_widget(
        Paragraph::new(preview_text(app, "Vista previa"))
            .alignment(Alignment::Center)
            .block(panel("Vista previa", false)),
        left[1],
    );

    let description = &app.wizard.state().description;
    let text = if description.is_empty() {
        Line::styled(
            "Ej: Escazú, moderno, 3 habitaciones, jardín",
            Style::default().fg(Color::DarkGray),
        )
        .into()
    } else {
        Text::raw(description.as_str())
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(input_panel(app, Field::Description)),
        cols[1],
    );
}

fn draw_location(frame: &mut Frame, app: &App, area: Rect) {
    let rows = location_layout(area);
    frame.render_widget(
        Paragraph::new(
            "Haz clic en el mapa, o mueve el cursor y pulsa Enter, para seleccionar la ubicación.",
        ),
        rows[0],
    );

    let map = app.map;
    let selected = app.wizard.state().coordinates();
    let canvas = Canvas::default()
        .block(panel(&format!("Mapa · zoom {}", map.zoom), true))
        .x_bounds(map.x_bounds())
        .y_bounds(map.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            if let Some(pin) = selected {
                ctx.print(
                    pin.lng,
                    pin.lat,
                    Span::styled("●", Style::default().fg(Color::Red)),
                );
            }
            ctx.print(
                map.center.lng,
                map.center.lat,
                Span::styled("+", Style::default().fg(Color::Yellow)),
            );
        });
    frame.render_widget(canvas, rows[1]);

    let coords = selected
        .map(|c| c.to_string())
        .unwrap_or_else(|| "No seleccionado".to_string());
    frame.render_widget(
        Paragraph::new(format!("Coordenadas: {}   (cursor {})", coords, map.center)),
        rows[2],
    );
}

fn draw_filters(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new("Ajusta filtros rápidos antes de ver la confirmación."),
        rows[0],
    );
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    frame.render_widget(
        Paragraph::new(app.wizard.state().max_price.as_str())
            .block(input_panel(app, Field::MaxPrice)),
        cols[0],
    );
    frame.render_widget(
        Paragraph::new(app.rooms_input.as_str()).block(input_panel(app, Field::MinRooms)),
        cols[1],
    );
}

fn draw_summary(frame: &mut Frame, app: &App, area: Rect) {
    let payload = app.wizard.summary();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let description = if payload.description.is_empty() {
        "—".to_string()
    } else {
        payload.description.clone()
    };
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled("Descripción", heading),
        Line::raw(description),
        Line::raw(""),
        Line::styled("Imagen de referencia", heading),
    ];
    lines.extend(preview_text(app, "Sin imagen").lines().map(|l| Line::raw(l.to_string())));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel("Resumen — revisa y confirma", false)),
        cols[0],
    );

    let details = vec![
        Line::from(vec![
            Span::styled("Ubicación: ", heading),
            Span::raw(payload.details.location.clone()),
        ]),
        Line::from(vec![
            Span::styled("Precio máximo: ", heading),
            Span::raw(format!("${}", payload.details.max_price)),
        ]),
        Line::from(vec![
            Span::styled("Habitaciones mínimas: ", heading),
            Span::raw(payload.details.min_rooms.to_string()),
        ]),
        Line::raw(""),
        Line::styled(
            "[Enter] Confirmar y Buscar",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Line::styled("[r] Empezar de nuevo", Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(
        Paragraph::new(details)
            .wrap(Wrap { trim: true })
            .block(panel("Detalles", true)),
        cols[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::Config;
    use clap::Parser;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> (App, tempfile::TempDir) {
        let logs = tempfile::tempdir().unwrap();
        let cli =
            Cli::try_parse_from(["casafinder", "--log-dir", logs.path().to_str().unwrap()])
                .unwrap();
        (App::new(&Config::from_cli(cli).unwrap()), logs)
    }

    #[test]
    fn header_shows_step_counter() {
        let (mut app, _logs) = app();
        assert!(render(&app).contains("Paso 1 / 4"));
        app.wizard.set_description("x");
        app.wizard.advance();
        let screen = render(&app);
        assert!(screen.contains("Paso 2 / 4"));
        assert!(screen.contains("No seleccionado"));
    }

    #[test]
    fn map_area_sits_inside_the_map_panel() {
        let screen = Rect::new(0, 0, 120, 30);
        let map = map_area(screen);
        let body = body_area(&screen_layout(screen));
        assert!(map.width > 1 && map.height > 1);
        assert!(map.left() > body.left() && map.right() < body.right());
        assert!(map.top() > body.top() && map.bottom() < body.bottom());
    }

    #[test]
    fn summary_shows_details_and_volver() {
        let (mut app, _logs) = app();
        app.wizard.set_description("x");
        app.wizard.advance();
        app.wizard.select_point(9.9, -84.0);
        app.wizard.advance();
        app.wizard.advance();

        let screen = render(&app);
        assert!(screen.contains("Paso 4 / 4"));
        assert!(screen.contains("9.90000, -84.00000"));
        assert!(screen.contains("$150000"));
        assert!(screen.contains("Volver"));
        assert!(screen.contains("Sin imagen"));
    }
}
