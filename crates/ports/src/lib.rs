//! # recstat-ports
//!
//! Port traits for the recstat hexagonal architecture.
//!
//! This crate defines the interfaces between the record-processing core and
//! its collaborators (metrics sinks, clocks, processors). It depends only on
//! `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod clock;
pub mod processor;
pub mod telemetry;

pub use clock::*;
pub use processor::*;
pub use telemetry::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `recstat-domain`.
pub use recstat_domain::{SignedDuration, StreamRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use recstat_domain::domain_crate_version;
    use recstat_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("recstat-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["recstat-domain", "recstat-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }

        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_crate_compiles() {
        let version = ports_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
