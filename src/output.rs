//! Flat-file input/output: GeoJSON layers and the catalog CSV

use crate::models::{Museum, ScrapedMuseum, Station};
use crate::{AtlasError, Result};
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::{Map, json};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read the base boundary polygon. Its absence aborts the run: every later
/// stage filters against it.
pub fn read_boundary(path: &Path) -> Result<MultiPolygon<f64>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AtlasError::general(format!(
            "required boundary file {} cannot be read: {e}",
            path.display()
        ))
    })?;

    let geojson: GeoJson = raw
        .parse()
        .map_err(|e| AtlasError::validation(format!("boundary file is not GeoJSON: {e}")))?;

    let geometry_value = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .find_map(|f| f.geometry)
            .map(|g| g.value),
        GeoJson::Feature(feature) => feature.geometry.map(|g| g.value),
        GeoJson::Geometry(geometry) => Some(geometry.value),
    }
    .ok_or_else(|| AtlasError::validation("boundary file contains no geometry"))?;

    let geometry = geo::Geometry::<f64>::try_from(&geometry_value)
        .map_err(|e| AtlasError::validation(format!("boundary geometry is invalid: {e}")))?;

    match geometry {
        geo::Geometry::Polygon(polygon) => Ok(MultiPolygon(vec![polygon])),
        geo::Geometry::MultiPolygon(multi) => Ok(multi),
        other => Err(AtlasError::validation(format!(
            "boundary geometry is not a polygon: {other:?}"
        ))),
    }
}

/// Write the museum layer with every annotation gathered so far. Property
/// names follow the source register so the file joins cleanly with other
/// tools consuming the same dataset.
pub fn write_museums_geojson(path: &Path, museums: &[Museum]) -> Result<()> {
    let features = museums
        .iter()
        .map(|museum| {
            let mut properties = Map::new();
            properties.insert("identifiant_museofile".to_string(), json!(museum.id));
            properties.insert("nom_officiel_du_musee".to_string(), json!(museum.name));
            insert_opt(&mut properties, "adresse", &museum.address);
            insert_opt(&mut properties, "code_postal", &museum.postal_code);
            insert_opt(&mut properties, "commune", &museum.commune);
            insert_opt(&mut properties, "telephone", &museum.phone);
            insert_opt(&mut properties, "url", &museum.website);
            insert_opt(
                &mut properties,
                "date_arrete_attribution_appellation",
                &museum.appellation_date,
            );
            insert_opt(&mut properties, "scrap_nom", &museum.scraped_name);
            insert_opt(&mut properties, "scrap_url", &museum.scraped_url);
            insert_opt(&mut properties, "information_musee", &museum.summary);
            for (key, value) in &museum.extra {
                properties.entry(key.clone()).or_insert_with(|| json!(value));
            }

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    museum.point.longitude,
                    museum.point.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    write_collection(path, features)?;
    info!(count = museums.len(), path = %path.display(), "museum layer written");
    Ok(())
}

/// Write the station layer, including the accessibility flag of the last
/// processed museum.
pub fn write_stations_geojson(path: &Path, stations: &[Station]) -> Result<()> {
    let features = stations
        .iter()
        .map(|station| {
            let mut properties = Map::new();
            properties.insert("id_ref_zda".to_string(), json!(station.id));
            properties.insert("nom_zda".to_string(), json!(station.name));
            insert_opt(&mut properties, "mode", &station.mode);
            insert_opt(&mut properties, "res_com", &station.network);
            properties.insert("accessible_10min".to_string(), json!(station.accessible));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    station.point.longitude,
                    station.point.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    write_collection(path, features)?;
    info!(count = stations.len(), path = %path.display(), "station layer written");
    Ok(())
}

/// Write the scraped catalog as CSV, every field quoted.
pub fn write_catalog_csv(path: &Path, rows: &[ScrapedMuseum]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)
        .map_err(|e| AtlasError::general(format!("cannot open {}: {e}", path.display())))?;

    writer
        .write_record(["nom", "url"])
        .map_err(|e| AtlasError::general(format!("CSV write failed: {e}")))?;
    for row in rows {
        writer
            .write_record([row.name.as_str(), row.url.as_str()])
            .map_err(|e| AtlasError::general(format!("CSV write failed: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AtlasError::general(format!("CSV flush failed: {e}")))?;

    info!(count = rows.len(), path = %path.display(), "catalog CSV written");
    Ok(())
}

/// Persist raw text (used for the routing responses).
pub fn write_raw(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, contents)?;
    Ok(())
}

fn write_collection(path: &Path, features: Vec<Feature>) -> Result<()> {
    ensure_parent(path)?;
    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });
    fs::write(path, collection.to_string())?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn insert_opt(properties: &mut Map<String, serde_json::Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        properties.insert(key.to_string(), json!(value));
    }
}
