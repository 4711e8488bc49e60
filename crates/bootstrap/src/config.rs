//! Bootstrap configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a valid
//! configuration.

use std::path::{Path, PathBuf};

use kiln_object::ObjectPoolConfig;
use serde::{Deserialize, Serialize};

/// Container that holds foundational reflection types.
pub const CORE_CONTAINER: &str = "/Script/CoreUObject";
/// Container that holds engine-level types.
pub const ENGINE_CONTAINER: &str = "/Script/Engine";
/// Prefix that turns a module name into its container name.
pub const SCRIPT_PREFIX: &str = "/Script/";

/// Tunables for [`crate::Bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
	/// Upper bound on live object slots.
	pub max_objects: usize,
	/// Budget of the disregard-for-GC region.
	pub max_objects_not_considered_by_gc: usize,
	/// Permanent object pool size in bytes. Forced to zero when the
	/// disregard-for-GC budget is zero.
	pub permanent_object_pool_size: usize,
	/// Reserve every slot up front.
	pub pre_allocate_object_array: bool,
	/// Default instances are built bucket by bucket in this container order;
	/// containers not listed form the last bucket.
	pub container_priority: Vec<String>,
	/// Containers whose registrants never wait for a module release.
	pub always_global_containers: Vec<String>,
	/// Hold registrants per module until the module finishes loading.
	pub per_module_bootstrap: bool,
	/// Track fingerprints and allow hot reloads.
	pub hot_reload: bool,
	/// Container that receives retired objects.
	pub transient_container: String,
}

impl Default for BootstrapConfig {
	fn default() -> Self {
		Self {
			max_objects: 2 * 1024 * 1024,
			max_objects_not_considered_by_gc: 0,
			permanent_object_pool_size: 0,
			pre_allocate_object_array: false,
			container_priority: vec![CORE_CONTAINER.to_owned(), ENGINE_CONTAINER.to_owned()],
			always_global_containers: vec![CORE_CONTAINER.to_owned()],
			per_module_bootstrap: false,
			hot_reload: false,
			transient_container: "/Engine/Transient".to_owned(),
		}
	}
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid bootstrap config: {0}")]
	Parse(#[from] toml::de::Error),
}

impl BootstrapConfig {
	/// Parses a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Object array sizing derived from this configuration.
	pub fn pool_config(&self) -> ObjectPoolConfig {
		ObjectPoolConfig {
			max_objects: self.max_objects,
			max_objects_not_considered_by_gc: self.max_objects_not_considered_by_gc,
			pre_allocate: self.pre_allocate_object_array,
		}
	}

	/// Default-instance bucket of a container: its priority position, or
	/// `container_priority.len()` when unlisted.
	pub fn bucket_of(&self, container: &str) -> usize {
		self.container_priority
			.iter()
			.position(|c| c == container)
			.unwrap_or(self.container_priority.len())
	}

	/// Whether registrants in `container` bypass module holding.
	pub fn is_always_global(&self, container: &str) -> bool {
		self.always_global_containers.iter().any(|c| c == container)
	}
}

/// Container name for a module: `Engine` becomes `/Script/Engine`. Names that
/// already look like container paths are returned unchanged.
pub fn module_container_name(module: &str) -> String {
	if module.starts_with('/') {
		module.to_owned()
	} else {
		format!("{SCRIPT_PREFIX}{module}")
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(BootstrapConfig::from_toml_str("").unwrap(), BootstrapConfig::default());
	}

	#[test]
	fn partial_document_overrides_fields() {
		let config = BootstrapConfig::from_toml_str(
			r#"
			max_objects = 1024
			per_module_bootstrap = true
			container_priority = ["/Script/Core", "/Script/Game"]
			"#,
		)
		.unwrap();
		assert_eq!(config.max_objects, 1024);
		assert!(config.per_module_bootstrap);
		assert_eq!(config.container_priority, vec!["/Script/Core", "/Script/Game"]);
		assert_eq!(config.always_global_containers, vec![CORE_CONTAINER]);
	}

	#[test]
	fn malformed_document_is_rejected() {
		let err = BootstrapConfig::from_toml_str("max_objects = \"lots\"").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn load_reads_files() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bootstrap.toml");
		std::fs::write(&path, "hot_reload = true\n").unwrap();
		assert!(BootstrapConfig::load(&path).unwrap().hot_reload);

		let missing = dir.path().join("missing.toml");
		assert!(matches!(BootstrapConfig::load(&missing), Err(ConfigError::Io { .. })));
	}

	#[rstest]
	#[case(CORE_CONTAINER, 0)]
	#[case(ENGINE_CONTAINER, 1)]
	#[case("/Script/MyGame", 2)]
	fn buckets_follow_priority(#[case] container: &str, #[case] bucket: usize) {
		assert_eq!(BootstrapConfig::default().bucket_of(container), bucket);
	}

	#[rstest]
	#[case("Engine", "/Script/Engine")]
	#[case("/Script/Engine", "/Script/Engine")]
	fn module_names_map_to_containers(#[case] module: &str, #[case] container: &str) {
		assert_eq!(module_container_name(module), container);
	}
}
