//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn each `[[resources]]` entry into a seeded in-memory resource
//! - Mount every resource on one server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Expects a validated config; a mount conflict that slipped past
//!   validation is still reported, not ignored

use thiserror::Error;

use crate::config::{ResourceConfig, ServerConfig};
use crate::http::{HttpServer, ResourceAdapter};
use crate::model::{KeyValue, MemoryModel};
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("resource {name:?} could not be mounted: {source}")]
    Mount {
        name: String,
        #[source]
        source: RouteError,
    },
}

/// The key-value store backing one configured resource.
pub fn seeded_model(resource: &ResourceConfig) -> MemoryModel<KeyValue> {
    MemoryModel::with_records(
        resource
            .seed
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone())),
    )
}

/// Build a server with every configured resource mounted.
pub fn build_server(config: ServerConfig) -> Result<HttpServer, StartupError> {
    let resources = config.resources.clone();
    let mut server = HttpServer::new(config);

    for resource in &resources {
        let model = seeded_model(resource);
        tracing::debug!(
            resource = %resource.name,
            records = resource.seed.len(),
            "Resource seeded"
        );

        let adapter = ResourceAdapter::from_config(resource, model);
        server
            .mount(&resource.path, adapter)
            .map_err(|source| StartupError::Mount {
                name: resource.name.clone(),
                source,
            })?;
    }

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[tokio::test]
    async fn test_seeded_model() {
        let mut resource = ResourceConfig::default();
        resource.seed.insert("Peter".into(), "Lemon".into());
        resource.seed.insert("Paul".into(), "Tree".into());

        let model = seeded_model(&resource);
        assert_eq!(model.len().unwrap(), 2);
        assert_eq!(
            model.get("Peter").await.unwrap(),
            Some(KeyValue::new("Peter", "Lemon"))
        );
    }

    #[test]
    fn test_build_server_mounts_every_resource() {
        let mut config = ServerConfig::default();
        config.resources.push(ResourceConfig {
            name: "fruit".into(),
            path: "/fruit".into(),
            ..Default::default()
        });

        let server = build_server(config).unwrap();
        let names: Vec<_> = server.mounted().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["kv", "fruit"]);
    }

    #[test]
    fn test_build_server_reports_conflicts() {
        let mut config = ServerConfig::default();
        config.resources.push(ResourceConfig {
            name: "again".into(),
            ..Default::default()
        });

        let err = build_server(config).unwrap_err();
        assert!(err.to_string().contains("\"again\""));
    }
}
