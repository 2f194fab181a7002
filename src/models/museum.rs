//! Museum records from the open-data API and the scraped catalog

use super::Coordinates;
use crate::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Source field names of the open-data records. The API schema is loosely
/// typed; these are the fields the pipeline depends on.
const FIELD_ID: &str = "identifiant_museofile";
const FIELD_NAME: &str = "nom_officiel_du_musee";
const FIELD_ADDRESS: &str = "adresse";
const FIELD_POSTAL_CODE: &str = "code_postal";
const FIELD_COMMUNE: &str = "commune";
const FIELD_PHONE: &str = "telephone";
const FIELD_WEBSITE: &str = "url";
const FIELD_APPELLATION_DATE: &str = "date_arrete_attribution_appellation";
const FIELD_GEOLOCATION: &str = "geolocalisation";

/// One museum from the official register, annotated in place as the
/// pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Museum {
    /// Museofile identifier, unique per museum
    pub id: String,
    /// Official name from the register
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub commune: Option<String>,
    pub phone: Option<String>,
    /// The museum's own website (not the encyclopedia article)
    pub website: Option<String>,
    /// Date the "Musée de France" appellation was granted (ISO format)
    pub appellation_date: Option<String>,
    pub point: Coordinates,
    /// Name of the linked catalog row, set by the record linker
    pub scraped_name: Option<String>,
    /// Article URL of the linked catalog row, copied verbatim
    pub scraped_url: Option<String>,
    /// Article summary, set by the summarizer
    pub summary: Option<String>,
    /// Remaining API fields, kept as-is for the GeoJSON output
    pub extra: BTreeMap<String, String>,
}

impl Museum {
    /// Narrow a loosely-typed API record into a `Museum`.
    ///
    /// Records without a usable geolocation are rejected; the caller skips
    /// them. Every other field is optional.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self> {
        let point = read_geolocation(record)?;

        let id = match string_field(record, FIELD_ID) {
            Some(id) => id,
            // The register occasionally ships rows without an identifier
            None => format!(
                "musee_{:.5}_{:.5}",
                point.longitude.abs(),
                point.latitude.abs()
            ),
        };

        let name = string_field(record, FIELD_NAME)
            .ok_or_else(|| AtlasError::validation(format!("record {id} has no official name")))?;

        let known = [
            FIELD_ID,
            FIELD_NAME,
            FIELD_ADDRESS,
            FIELD_POSTAL_CODE,
            FIELD_COMMUNE,
            FIELD_PHONE,
            FIELD_WEBSITE,
            FIELD_APPELLATION_DATE,
            FIELD_GEOLOCATION,
        ];
        let extra = record
            .iter()
            .filter(|(key, value)| !known.contains(&key.as_str()) && !value.is_null())
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect();

        Ok(Self {
            id,
            name,
            address: string_field(record, FIELD_ADDRESS),
            postal_code: string_field(record, FIELD_POSTAL_CODE),
            commune: string_field(record, FIELD_COMMUNE),
            phone: string_field(record, FIELD_PHONE),
            website: string_field(record, FIELD_WEBSITE),
            appellation_date: string_field(record, FIELD_APPELLATION_DATE),
            point,
            scraped_name: None,
            scraped_url: None,
            summary: None,
            extra,
        })
    }

    /// Display name with the first letter uppercased, as used in report
    /// titles.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// One row of the scraped encyclopedia catalog: the museum name as the
/// article titles it, plus the absolute article URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedMuseum {
    pub name: String,
    pub url: String,
}

fn read_geolocation(record: &Map<String, Value>) -> Result<Coordinates> {
    let geo = record
        .get(FIELD_GEOLOCATION)
        .and_then(Value::as_object)
        .ok_or_else(|| AtlasError::validation("record has no geolocation"))?;

    let lon = geo.get("lon").and_then(Value::as_f64);
    let lat = geo.get("lat").and_then(Value::as_f64);
    match (lon, lat) {
        (Some(lon), Some(lat)) => Ok(Coordinates::new(lon, lat)),
        _ => Err(AtlasError::validation(
            "record geolocation is missing lon or lat",
        )),
    }
}

fn string_field(record: &Map<String, Value>, field: &str) -> Option<String> {
    match record.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_record_narrows_known_fields() {
        let rec = record(json!({
            "identifiant_museofile": "M0001",
            "nom_officiel_du_musee": "musée du Louvre",
            "adresse": "Rue de Rivoli",
            "code_postal": "75001",
            "commune": "Paris",
            "telephone": "01 40 20 50 50",
            "url": "www.louvre.fr",
            "geolocalisation": {"lon": 2.3364, "lat": 48.8606},
            "region": "Île-de-France",
            "themes": null
        }));

        let museum = Museum::from_record(&rec).unwrap();
        assert_eq!(museum.id, "M0001");
        assert_eq!(museum.name, "musée du Louvre");
        assert_eq!(museum.postal_code.as_deref(), Some("75001"));
        assert_eq!(museum.point, Coordinates::new(2.3364, 48.8606));
        assert_eq!(museum.extra.get("region").map(String::as_str), Some("Île-de-France"));
        assert!(!museum.extra.contains_key("themes"));
        assert!(museum.summary.is_none());
    }

    #[test]
    fn test_from_record_rejects_missing_geolocation() {
        let rec = record(json!({
            "identifiant_museofile": "M0002",
            "nom_officiel_du_musee": "musée fantôme"
        }));
        assert!(Museum::from_record(&rec).is_err());

        let rec = record(json!({
            "identifiant_museofile": "M0003",
            "nom_officiel_du_musee": "musée sans latitude",
            "geolocalisation": {"lon": 2.0}
        }));
        assert!(Museum::from_record(&rec).is_err());
    }

    #[test]
    fn test_from_record_synthesizes_missing_id() {
        let rec = record(json!({
            "nom_officiel_du_musee": "musée anonyme",
            "geolocalisation": {"lon": 2.35, "lat": 48.85}
        }));
        let museum = Museum::from_record(&rec).unwrap();
        assert!(museum.id.starts_with("musee_"));
    }

    #[test]
    fn test_display_name_uppercases_first_letter() {
        let rec = record(json!({
            "identifiant_museofile": "M0004",
            "nom_officiel_du_musee": "musée d'Orsay",
            "geolocalisation": {"lon": 2.3266, "lat": 48.86}
        }));
        let museum = Museum::from_record(&rec).unwrap();
        assert_eq!(museum.display_name(), "Musée d'Orsay");
    }
}
