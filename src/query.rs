use serde::{Deserialize, Serialize};

use crate::state::WizardState;

pub const NO_IMAGE: &str = "N/A";
pub const NO_LOCATION: &str = "—";

/// The submitted search request. Field names are the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "archivo_imagen")]
    pub image_file_name: String,
    #[serde(rename = "detalles")]
    pub details: QueryDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDetails {
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "precio_maximo")]
    pub max_price: String,
    #[serde(rename = "habitaciones_minimas")]
    pub min_rooms: i64,
}

pub fn build_query(state: &WizardState) -> QueryPayload {
    QueryPayload {
        description: state.description.clone(),
        image_file_name: state
            .image_file
            .as_ref()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| NO_IMAGE.to_string()),
        details: QueryDetails {
            location: state
                .coordinates()
                .map(|c| c.to_string())
                .unwrap_or_else(|| NO_LOCATION.to_string()),
            max_price: state.max_price.clone(),
            min_rooms: state.min_rooms,
        },
    }
}

impl QueryPayload {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
