//! Static validator geography registry
//!
//! Fixed reference data describing where the network's 21 seed validators
//! run, grouped into seven regions (six continents plus a Middle East
//! grouping). Topology logic queries it to reason about network spread; it
//! never changes for the lifetime of the process and exposes no mutation
//! surface. Unknown-id lookups return `None` rather than erroring, unlike
//! the stateful consent operations.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Mean Earth radius in kilometers, used by the haversine distance
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Seed geography: id, city, region group, latitude, longitude, timezone.
/// Seven groups of three validators each.
const SEED_LOCATIONS: &[(&str, &str, &str, f64, f64, &str)] = &[
    ("StellarNode", "New York", "North America", 40.7128, -74.0060, "America/New_York"),
    ("NebulaGuard", "San Francisco", "North America", 37.7749, -122.4194, "America/Los_Angeles"),
    ("QuasarWatch", "Toronto", "North America", 43.6532, -79.3832, "America/Toronto"),
    ("AstroSentinel", "London", "Europe", 51.5074, -0.1278, "Europe/London"),
    ("PulsarPrime", "Berlin", "Europe", 52.5200, 13.4050, "Europe/Berlin"),
    ("CometRelay", "Amsterdam", "Europe", 52.3676, 4.9041, "Europe/Amsterdam"),
    ("OrbitKeeper", "Tokyo", "Asia", 35.6762, 139.6503, "Asia/Tokyo"),
    ("NovaBeacon", "Singapore", "Asia", 1.3521, 103.8198, "Asia/Singapore"),
    ("ZenithPoint", "Seoul", "Asia", 37.5665, 126.9780, "Asia/Seoul"),
    ("EclipseGate", "Sao Paulo", "South America", -23.5505, -46.6333, "America/Sao_Paulo"),
    ("MeteorPost", "Buenos Aires", "South America", -34.6037, -58.3816, "America/Argentina/Buenos_Aires"),
    ("GalaxyCore", "Bogota", "South America", 4.7110, -74.0721, "America/Bogota"),
    ("CosmicAnchor", "Lagos", "Africa", 6.5244, 3.3792, "Africa/Lagos"),
    ("LunarHaven", "Nairobi", "Africa", -1.2921, 36.8219, "Africa/Nairobi"),
    ("SolarFlare", "Cape Town", "Africa", -33.9249, 18.4241, "Africa/Johannesburg"),
    ("AuroraShield", "Sydney", "Oceania", -33.8688, 151.2093, "Australia/Sydney"),
    ("VortexHub", "Auckland", "Oceania", -36.8509, 174.7645, "Pacific/Auckland"),
    ("HorizonEdge", "Melbourne", "Oceania", -37.8136, 144.9631, "Australia/Melbourne"),
    ("PolarisWard", "Dubai", "Middle East", 25.2048, 55.2708, "Asia/Dubai"),
    ("TitanForge", "Tel Aviv", "Middle East", 32.0853, 34.7818, "Asia/Jerusalem"),
    ("CelestialArc", "Riyadh", "Middle East", 24.7136, 46.6753, "Asia/Riyadh"),
];

/// Geographic placement of a single validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorLocation {
    /// Network-wide validator identifier
    pub validator_id: String,

    /// City the validator runs in
    pub city: String,

    /// Region group (continent, or the Middle East grouping)
    pub continent: String,

    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// IANA timezone identifier
    pub timezone: String,
}

/// Aggregate distribution figures over the seed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    /// Number of seed validators
    pub total_validators: usize,

    /// Number of distinct region groups
    pub continents: usize,

    /// Number of distinct cities
    pub cities: usize,

    /// Validator count per region group
    pub distribution: HashMap<String, usize>,
}

/// Read-only registry over the seed validator geography
pub struct DistributionRegistry {
    locations: Vec<ValidatorLocation>,
}

impl Default for DistributionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributionRegistry {
    /// Build the registry from the fixed seed set
    pub fn new() -> Self {
        let locations = SEED_LOCATIONS
            .iter()
            .map(
                |&(validator_id, city, continent, latitude, longitude, timezone)| {
                    ValidatorLocation {
                        validator_id: validator_id.to_string(),
                        city: city.to_string(),
                        continent: continent.to_string(),
                        latitude,
                        longitude,
                        timezone: timezone.to_string(),
                    }
                },
            )
            .collect();

        Self { locations }
    }

    /// Location of a validator, or `None` when the id is unknown
    pub fn get_validator_location(&self, validator_id: &str) -> Option<&ValidatorLocation> {
        self.locations
            .iter()
            .find(|location| location.validator_id == validator_id)
    }

    /// Every seed location in stable declaration order
    pub fn get_all_validator_locations(&self) -> &[ValidatorLocation] {
        &self.locations
    }

    /// Locations grouped by region, preserving declaration order within each group
    pub fn get_validators_by_continent(&self) -> HashMap<String, Vec<ValidatorLocation>> {
        let mut groups: HashMap<String, Vec<ValidatorLocation>> = HashMap::new();

        for location in &self.locations {
            groups
                .entry(location.continent.clone())
                .or_default()
                .push(location.clone());
        }

        groups
    }

    /// Aggregate distribution figures computed over the seed data
    pub fn get_distribution_stats(&self) -> DistributionStats {
        let continents: HashSet<&str> = self
            .locations
            .iter()
            .map(|location| location.continent.as_str())
            .collect();
        let cities: HashSet<&str> = self
            .locations
            .iter()
            .map(|location| location.city.as_str())
            .collect();

        let mut distribution: HashMap<String, usize> = HashMap::new();
        for location in &self.locations {
            *distribution.entry(location.continent.clone()).or_insert(0) += 1;
        }

        DistributionStats {
            total_validators: self.locations.len(),
            continents: continents.len(),
            cities: cities.len(),
            distribution,
        }
    }

    /// Great-circle distance between two validators in kilometers
    ///
    /// Returns `None` when either id is unknown. Symmetric, and zero when
    /// both ids name the same validator.
    pub fn get_validator_distance(&self, id_a: &str, id_b: &str) -> Option<f64> {
        let from = self.get_validator_location(id_a)?;
        let to = self.get_validator_location(id_b)?;

        Some(haversine_km(
            from.latitude,
            from.longitude,
            to.latitude,
            to.longitude,
        ))
    }
}

/// Haversine great-circle distance between two coordinate pairs
fn haversine_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let delta_phi = (lat_b - lat_a).to_radians();
    let delta_lambda = (lon_b - lon_a).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
