use std::path::{Path, PathBuf};

use crate::location::{Coordinates, LocationSelector};
use crate::preview::Preview;

pub const DEFAULT_MAX_PRICE: &str = "150000";
pub const DEFAULT_MIN_ROOMS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Media,
    Location,
    Filters,
    Summary,
}

impl Step {
    /// 1-based position shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            Step::Media => 1,
            Step::Location => 2,
            Step::Filters => 3,
            Step::Summary => 4,
        }
    }

    pub fn next(&self) -> Step {
        match self {
            Step::Media => Step::Location,
            Step::Location => Step::Filters,
            Step::Filters | Step::Summary => Step::Summary,
        }
    }

    pub fn prev(&self) -> Step {
        match self {
            Step::Media | Step::Location => Step::Media,
            Step::Filters => Step::Location,
            Step::Summary => Step::Filters,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Media => "Imagen y descripción",
            Step::Location => "Ubicación",
            Step::Filters => "Filtros",
            Step::Summary => "Resumen",
        }
    }
}

/// A user-selected reference image: where its bytes live and the name it was picked under.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub path: PathBuf,
}

impl ImageFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// Everything collected during one form session.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: Step,
    pub image_file: Option<ImageFile>,
    pub image_preview: Option<Preview>,
    pub description: String,
    pub location: LocationSelector,
    pub max_price: String,
    pub min_rooms: i64,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: Step::Media,
            image_file: None,
            image_preview: None,
            description: String::new(),
            location: LocationSelector::default(),
            max_price: DEFAULT_MAX_PRICE.to_string(),
            min_rooms: DEFAULT_MIN_ROOMS,
        }
    }
}

impl WizardState {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates()
    }
}
