//! Transit-station records

use super::Coordinates;
use serde::{Deserialize, Serialize};

/// One transit station, flagged against a single museum's isochrone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    /// Station name (source field `nom_zda`)
    pub name: String,
    /// Transport mode, e.g. METRO or RER (source field `mode`)
    pub mode: Option<String>,
    /// Commercial network name (source field `res_com`)
    pub network: Option<String>,
    pub point: Coordinates,
    /// Whether the station lies inside the 600-second walking isochrone of
    /// the museum currently being processed
    pub accessible: bool,
}

impl Station {
    /// Legend label, e.g. `Châtelet (METRO - Métro 1)`
    #[must_use]
    pub fn legend_label(&self) -> String {
        match (&self.mode, &self.network) {
            (Some(mode), Some(network)) => format!("{} ({} - {})", self.name, mode, network),
            (Some(mode), None) => format!("{} ({})", self.name, mode),
            (None, Some(network)) => format!("{} ({})", self.name, network),
            (None, None) => self.name.clone(),
        }
    }
}
