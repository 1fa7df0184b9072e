//! Startup configuration and dataset location.

use log::warn;

/// Build-time environment variable selecting the recognizability tier.
pub const RECOGNIZABILITY_ENV: &str = "ACTOR_GRAPH_RECOGNIZABILITY";

/// Tier loaded when nothing is configured (most recognizable actors).
pub const DEFAULT_RECOGNIZABILITY: i64 = 10;

const DATA_ROOT: &str = "/data";

/// Process-wide settings, resolved once by the hosting shell and threaded
/// down to the components that need them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Dataset tier, usually one of 8, 9 or 10. Other values are not rejected.
	pub recognizability: i64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			recognizability: DEFAULT_RECOGNIZABILITY,
		}
	}
}

impl AppConfig {
	/// Reads the tier baked in at compile time.
	pub fn from_build_env() -> Self {
		Self::from_value(option_env!("ACTOR_GRAPH_RECOGNIZABILITY"))
	}

	/// Interprets a raw setting. Blank means default; garbage is logged and
	/// replaced by the default.
	pub fn from_value(raw: Option<&str>) -> Self {
		let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
			return Self::default();
		};
		match raw.parse::<i64>() {
			Ok(recognizability) => Self { recognizability },
			Err(e) => {
				warn!(
					"{RECOGNIZABILITY_ENV}={raw:?} is not an integer ({e}), using {DEFAULT_RECOGNIZABILITY}"
				);
				Self::default()
			}
		}
	}

	/// Dataset locations for the configured tier.
	pub fn data_paths(&self) -> DataPaths {
		DataPaths::for_tier(self.recognizability)
	}
}

/// Locations of the two CSV resources backing one graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
	/// Actor table.
	pub nodes: String,
	/// Shared-movie table.
	pub edges: String,
}

impl DataPaths {
	/// Pure interpolation of `tier` into the fixed template; no validation.
	pub fn for_tier(tier: i64) -> Self {
		Self {
			nodes: format!("{DATA_ROOT}/nodes_{tier}.csv"),
			edges: format!("{DATA_ROOT}/edges_{tier}.csv"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolves_each_known_tier() {
		for tier in [8, 9, 10] {
			let paths = DataPaths::for_tier(tier);
			assert_eq!(paths.nodes, format!("/data/nodes_{tier}.csv"));
			assert_eq!(paths.edges, format!("/data/edges_{tier}.csv"));
		}
	}

	#[test]
	fn out_of_domain_tier_passes_through() {
		let paths = DataPaths::for_tier(42);
		assert_eq!(paths.nodes, "/data/nodes_42.csv");
		assert_eq!(paths.edges, "/data/edges_42.csv");
	}

	#[test]
	fn config_defaults_to_ten() {
		assert_eq!(AppConfig::from_value(None).recognizability, 10);
		assert_eq!(AppConfig::from_value(Some("  ")).recognizability, 10);
	}

	#[test]
	fn config_parses_tier() {
		let config = AppConfig::from_value(Some("8"));
		assert_eq!(config.recognizability, 8);
		assert_eq!(config.data_paths(), DataPaths::for_tier(8));
	}

	#[test]
	fn unparsable_tier_falls_back() {
		assert_eq!(AppConfig::from_value(Some("ten")), AppConfig::default());
	}
}
