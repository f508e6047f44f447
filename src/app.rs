use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::location::MapCursor;
use crate::query::QueryPayload;
use crate::state::{ImageFile, Step};
use crate::ui;
use crate::wizard::Wizard;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    ImagePath,
    Description,
    MaxPrice,
    MinRooms,
}

impl Field {
    fn first_of(step: Step) -> Option<Field> {
        match step {
            Step::Media => Some(Field::ImagePath),
            Step::Filters => Some(Field::MaxPrice),
            Step::Location | Step::Summary => None,
        }
    }

    fn toggled(&self) -> Field {
        match self {
            Field::ImagePath => Field::Description,
            Field::Description => Field::ImagePath,
            Field::MaxPrice => Field::MinRooms,
            Field::MinRooms => Field::MaxPrice,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::ImagePath => "Subir imagen",
            Field::Description => "Describe lo que buscas",
            Field::MaxPrice => "Precio máximo (USD)",
            Field::MinRooms => "Habitaciones mínimas",
        }
    }
}

pub struct App {
    pub wizard: Wizard,
    pub should_quit: bool,
    pub focus: Option<Field>,
    pub image_path_input: String,
    pub rooms_input: String,
    pub map: MapCursor,
    pub status: Option<String>,
    pub submitted: Option<QueryPayload>,
    output: Option<PathBuf>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            wizard: Wizard::new(),
            should_quit: false,
            focus: Field::first_of(Step::Media),
            image_path_input: String::new(),
            rooms_input: String::new(),
            map: config.map,
            status: None,
            submitted: None,
            output: config.output.clone(),
        };
        app.sync_rooms_input();
        if let Some(description) = &config.description {
            app.wizard.set_description(description.as_str());
        }
        if let Some(image) = &config.image {
            app.image_path_input = image.display().to_string();
            app.pick_image();
        }
        app
    }

    pub fn step(&self) -> Step {
        self.wizard.step()
    }

    /// Label of the forward control; it changes on the last step.
    pub fn forward_label(&self) -> &'static str {
        if self.step() == Step::Summary {
            "Volver"
        } else {
            "Siguiente"
        }
    }

    /// Called once per tick by the event loop.
    pub fn tick(&mut self) {
        self.wizard.poll_previews();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::PageDown => return self.next(),
            KeyCode::Char('n') if ctrl => return self.next(),
            KeyCode::PageUp => return self.back(),
            KeyCode::Char('b') if ctrl => return self.back(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.map(|f| f.toggled());
                return;
            }
            KeyCode::Char(_) if ctrl => return,
            _ => {}
        }

        match self.step() {
            Step::Media => self.handle_media(key.code),
            Step::Location => self.handle_location(key.code),
            Step::Filters => self.handle_filters(key.code),
            Step::Summary => self.handle_summary(key.code),
        }
    }

    /// A left click inside the map selects the point under the pointer.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, screen: Rect) {
        if self.step() != Step::Location || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let area = ui::map_area(screen);
        let inside = mouse.column >= area.left()
            && mouse.column < area.right()
            && mouse.row >= area.top()
            && mouse.row < area.bottom();
        if !inside {
            return;
        }
        let point = self.map.point_at(
            fraction(mouse.column - area.left(), area.width),
            fraction(mouse.row - area.top(), area.height),
        );
        self.wizard.select_point(point.lat, point.lng);
    }

    fn next(&mut self) {
        self.status = None;
        self.wizard.advance();
        self.focus_step();
    }

    fn back(&mut self) {
        self.status = None;
        self.wizard.retreat();
        self.focus_step();
    }

    fn focus_step(&mut self) {
        let wanted = Field::first_of(self.step());
        let same_step = match (self.focus, wanted) {
            (Some(current), Some(first)) => current == first || current.toggled() == first,
            (None, None) => true,
            _ => false,
        };
        if !same_step {
            self.focus = wanted;
        }
    }

    fn handle_media(&mut self, key: KeyCode) {
        match self.focus {
            Some(Field::ImagePath) => match key {
                KeyCode::Char(c) => self.image_path_input.push(c),
                KeyCode::Backspace => {
                    self.image_path_input.pop();
                }
                KeyCode::Enter => self.pick_image(),
                KeyCode::Delete => {
                    self.image_path_input.clear();
                    self.wizard.clear_image();
                    self.status = Some("Imagen quitada".to_string());
                }
                _ => {}
            },
            Some(Field::Description) => {
                let mut text = self.wizard.state().description.clone();
                match key {
                    KeyCode::Char(c) => text.push(c),
                    KeyCode::Enter => text.push('\n'),
                    KeyCode::Backspace => {
                        text.pop();
                    }
                    _ => return,
                }
                self.wizard.set_description(text);
            }
            _ => {}
        }
    }

    /// An empty choice is a cancelled pick and keeps the current image.
    fn pick_image(&mut self) {
        let raw = self.image_path_input.trim();
        if raw.is_empty() {
            return;
        }
        let path = Path::new(raw);
        if !path.is_file() {
            warn!(path = %path.display(), "image path is not a file");
            self.status = Some(format!("No se encontró el archivo: {}", path.display()));
            return;
        }
        self.wizard.select_image(ImageFile::from_path(path));
        self.status = None;
    }

    fn handle_location(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.map.pan(1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.map.pan(-1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.map.pan(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.map.pan(0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => self.map.zoom_in(),
            KeyCode::Char('-') => self.map.zoom_out(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let point = self.map.center;
                self.wizard.select_point(point.lat, point.lng);
            }
            _ => {}
        }
    }

    fn handle_filters(&mut self, key: KeyCode) {
        match self.focus {
            Some(Field::MaxPrice) => {
                let mut price = self.wizard.state().max_price.clone();
                match key {
                    KeyCode::Char(c) if is_number_char(c) => price.push(c),
                    KeyCode::Backspace => {
                        price.pop();
                    }
                    _ => return,
                }
                self.wizard.set_max_price(price);
            }
            Some(Field::MinRooms) => match key {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    self.rooms_input.push(c);
                    self.commit_rooms();
                }
                KeyCode::Char('-') if self.rooms_input.is_empty() => {
                    self.rooms_input.push('-');
                    self.commit_rooms();
                }
                KeyCode::Backspace => {
                    self.rooms_input.pop();
                    self.commit_rooms();
                }
                KeyCode::Up => {
                    self.wizard.set_min_rooms(self.wizard.state().min_rooms.saturating_add(1));
                    self.sync_rooms_input();
                }
                KeyCode::Down => {
                    self.wizard.set_min_rooms(self.wizard.state().min_rooms.saturating_sub(1));
                    self.sync_rooms_input();
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Empty means 0; anything unparsable keeps the previous count.
    fn commit_rooms(&mut self) {
        if self.rooms_input.is_empty() {
            self.wizard.set_min_rooms(0);
        } else if let Ok(rooms) = self.rooms_input.parse::<i64>() {
            self.wizard.set_min_rooms(rooms);
        }
    }

    fn sync_rooms_input(&mut self) {
        self.rooms_input = self.wizard.state().min_rooms.to_string();
    }

    fn handle_summary(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('c') => {
                if let Err(err) = self.confirm() {
                    warn!(error = %err, "could not record query");
                    self.status = Some(format!("Error: {:#}", err));
                }
            }
            KeyCode::Char('r') => {
                self.wizard.reset();
                self.image_path_input.clear();
                self.sync_rooms_input();
                self.focus = Field::first_of(Step::Media);
                self.status = Some("Formulario reiniciado".to_string());
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Builds the query, logs it and writes it to the configured output file.
    pub fn confirm(&mut self) -> Result<()> {
        let payload = self.wizard.summary();
        let json = payload.to_pretty_json()?;
        info!("Datos de la consulta: {}", json);

        if let Some(path) = &self.output {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("writing query to {}", path.display()))?;
            self.status = Some(format!("Consulta guardada en {}", path.display()));
        } else {
            self.status = Some("Consulta registrada".to_string());
        }
        self.submitted = Some(payload);
        Ok(())
    }
}

fn fraction(offset: u16, len: u16) -> f64 {
    if len <= 1 {
        0.5
    } else {
        f64::from(offset) / f64::from(len - 1)
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}
