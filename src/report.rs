//! Per-museum report assembly
//!
//! The cartographic rendering itself (symbology, page layout, PDF export)
//! belongs to the downstream GIS host. This module produces everything that
//! host needs as plain data: the report text (title, info block, summary,
//! accessible stations, signature) and the style constants the maps use.

use crate::models::{Museum, Station};
use crate::transit::ACCESSIBLE_THRESHOLD_SECONDS;
use crate::{AtlasError, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// RGB triple used in style descriptions.
pub type Rgb = (u8, u8, u8);

/// Outline colors of the isochrone contours, by threshold seconds.
pub const ISOCHRONE_OUTLINES: [(u32, Rgb); 2] = [(300, (102, 194, 165)), (600, (252, 141, 98))];

/// Color palette cycled over the accessible stations.
pub const STATION_PALETTE: [Rgb; 8] = [
    (102, 102, 204),
    (255, 153, 51),
    (153, 51, 204),
    (255, 204, 0),
    (51, 153, 204),
    (204, 102, 153),
    (102, 153, 255),
    (204, 153, 51),
];

/// Marker icon filenames expected under `icons/`.
pub const MUSEUM_ICON: &str = "museum1.svg";
pub const STATION_ICON: &str = "railway.svg";

/// Legend label for an isochrone threshold.
#[must_use]
pub fn isochrone_label(seconds: u32) -> String {
    format!("{} min de marche du musée", seconds / 60)
}

/// Paths the report references without owning: icons and the per-museum
/// localisation maps produced by the GIS host. All lookups here are
/// best-effort; a missing asset is a warning, never a failure.
pub struct ReportAssets {
    base_dir: PathBuf,
}

impl ReportAssets {
    #[must_use]
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// The localisation map for one museum, when the host has produced it.
    fn localisation_image(&self, museum_id: &str) -> Option<PathBuf> {
        let path = self.base_dir.join("localisation").join(format!("{museum_id}.png"));
        if path.exists() {
            Some(path)
        } else {
            warn!(museum_id, path = %path.display(), "no localisation map for this museum");
            None
        }
    }

    fn icon(&self, name: &str) -> Option<PathBuf> {
        let path = self.base_dir.join("icons").join(name);
        if path.exists() {
            Some(path)
        } else {
            warn!(icon = name, "icon asset missing, report will reference it anyway");
            None
        }
    }
}

/// Render the report for one museum as Markdown.
#[must_use]
pub fn render_report(
    museum: &Museum,
    stations: &[Station],
    thresholds: &[u32],
    attribution: &str,
    date: &str,
    assets: &ReportAssets,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}", museum.display_name());
    out.push('\n');

    if let Some(appellation) = &museum.appellation_date {
        let _ = writeln!(
            out,
            "Le {} a obtenu l'appellation Musée de France le {}.",
            museum.name,
            format_french_date(appellation)
        );
    }

    let address_line: Vec<&str> = [&museum.address, &museum.postal_code, &museum.commune]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect();
    if !address_line.is_empty() {
        let _ = writeln!(out, "Adresse : {}", address_line.join(" "));
    }
    if let Some(phone) = &museum.phone {
        let _ = writeln!(out, "Tél : {phone}");
    }
    if let Some(website) = &museum.website {
        let _ = writeln!(out, "Site web : {website}");
    }

    out.push('\n');
    match &museum.summary {
        Some(summary) => {
            let _ = writeln!(out, "{summary}");
        }
        None => {
            let _ = writeln!(out, "[Résumé non trouvé]");
        }
    }

    out.push('\n');
    let _ = writeln!(out, "## Légende");
    for &(seconds, (r, g, b)) in &ISOCHRONE_OUTLINES {
        if thresholds.contains(&seconds) {
            let _ = writeln!(
                out,
                "- {} (contour RGB {r},{g},{b})",
                isochrone_label(seconds)
            );
        }
    }
    if let Some(icon) = assets.icon(MUSEUM_ICON) {
        let _ = writeln!(out, "- Musée sélectionné : {}", icon.display());
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "## Gares accessibles à {} min",
        ACCESSIBLE_THRESHOLD_SECONDS / 60
    );
    let accessible: Vec<&Station> = stations.iter().filter(|s| s.accessible).collect();
    if accessible.is_empty() {
        let _ = writeln!(out, "Aucune gare à moins de 10 min de marche.");
    } else {
        for (index, station) in accessible.iter().enumerate() {
            let (r, g, b) = STATION_PALETTE[index % STATION_PALETTE.len()];
            let _ = writeln!(out, "- {} (RGB {r},{g},{b})", station.legend_label());
        }
        if assets.icon(STATION_ICON).is_none() {
            let _ = writeln!(out, "  (icône gare indisponible)");
        }
    }

    if let Some(image) = assets.localisation_image(&museum.id) {
        out.push('\n');
        let _ = writeln!(out, "![Carte de localisation]({})", image.display());
    }

    out.push('\n');
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "Carte réalisée le {date}.");
    let _ = writeln!(out, "{attribution}");

    out
}

/// Write one museum's report under `reports/`.
pub fn write_report(base_dir: &Path, museum_id: &str, contents: &str) -> Result<PathBuf> {
    let path = base_dir
        .join("reports")
        .join(format!("Carte_musee_{museum_id}.md"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)
        .map_err(|e| AtlasError::general(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

/// ISO date to `dd/MM/yyyy`; anything unparseable passes through unchanged.
fn format_french_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn museum() -> Museum {
        Museum {
            id: "M0001".to_string(),
            name: "musée du Louvre".to_string(),
            address: Some("Rue de Rivoli".to_string()),
            postal_code: Some("75001".to_string()),
            commune: Some("Paris".to_string()),
            phone: None,
            website: Some("www.louvre.fr".to_string()),
            appellation_date: Some("2003-02-01".to_string()),
            point: Coordinates::new(2.3364, 48.8606),
            scraped_name: None,
            scraped_url: None,
            summary: Some("Le Louvre est le plus grand musée de Paris.".to_string()),
            extra: Default::default(),
        }
    }

    fn station(name: &str, accessible: bool) -> Station {
        Station {
            id: name.to_string(),
            name: name.to_string(),
            mode: Some("METRO".to_string()),
            network: Some("Métro 1".to_string()),
            point: Coordinates::new(2.34, 48.85),
            accessible,
        }
    }

    #[test]
    fn test_report_contains_exactly_the_non_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let assets = ReportAssets::new(dir.path());
        let stations = vec![station("Châtelet", true), station("Odéon", false)];

        let report = render_report(
            &museum(),
            &stations,
            &[300, 600],
            "Source des données : test",
            "07/08/2026",
            &assets,
        );

        assert!(report.starts_with("# Musée du Louvre"));
        assert!(report.contains(
            "Le musée du Louvre a obtenu l'appellation Musée de France le 01/02/2003."
        ));
        assert!(report.contains("Adresse : Rue de Rivoli 75001 Paris"));
        // No phone: the line is omitted entirely
        assert!(!report.contains("Tél :"));
        assert!(report.contains("Site web : www.louvre.fr"));
        assert!(report.contains("Le Louvre est le plus grand musée de Paris."));
        assert!(report.contains("5 min de marche du musée"));
        assert!(report.contains("10 min de marche du musée"));
        assert!(report.contains("Châtelet (METRO - Métro 1)"));
        assert!(!report.contains("Odéon"));
        assert!(report.contains("Carte réalisée le 07/08/2026."));
        assert!(report.contains("Source des données : test"));
    }

    #[test]
    fn test_report_without_summary_uses_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let assets = ReportAssets::new(dir.path());
        let mut museum = museum();
        museum.summary = None;

        let report = render_report(&museum, &[], &[300, 600], "", "07/08/2026", &assets);
        assert!(report.contains("[Résumé non trouvé]"));
        assert!(report.contains("Aucune gare à moins de 10 min de marche."));
    }

    #[test]
    fn test_localisation_image_is_referenced_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let localisation = dir.path().join("localisation");
        std::fs::create_dir_all(&localisation).unwrap();
        std::fs::write(localisation.join("M0001.png"), b"png").unwrap();

        let assets = ReportAssets::new(dir.path());
        let report = render_report(&museum(), &[], &[600], "", "07/08/2026", &assets);
        assert!(report.contains("Carte de localisation"));
        assert!(report.contains("M0001.png"));
    }

    #[test]
    fn test_write_report_creates_the_reports_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "M0001", "contenu").unwrap();
        assert!(path.ends_with("reports/Carte_musee_M0001.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "contenu");
    }

    #[test]
    fn test_station_palette_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let assets = ReportAssets::new(dir.path());
        let stations: Vec<Station> = (0..10)
            .map(|i| station(&format!("Gare {i}"), true))
            .collect();
        let report = render_report(&museum(), &stations, &[600], "", "07/08/2026", &assets);
        // Ten stations over an 8-color palette: the first color appears twice
        assert_eq!(report.matches("RGB 102,102,204").count(), 2);
    }

    #[test]
    fn test_format_french_date() {
        assert_eq!(format_french_date("2003-02-01"), "01/02/2003");
        assert_eq!(format_french_date("unknown"), "unknown");
    }
}
