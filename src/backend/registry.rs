//! Static table of planners, built once at startup.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::client::{HttpPlanner, PlannerService};
use crate::config::PlannersConfig;

/// Errors raised while building or querying the registry.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The requested planner is not in the registry.
    #[error("Unknown planner '{backend}'")]
    UnknownBackend { backend: String },

    /// The parallel configuration lists disagree in length.
    #[error("Planner lists have mismatched lengths ({names} names, {other} {field})")]
    MismatchedLists {
        names: usize,
        field: &'static str,
        other: usize,
    },

    /// The same planner name appears twice.
    #[error("Planner '{backend}' is registered more than once")]
    DuplicateBackend { backend: String },
}

/// Addresses of one planner's three operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub id: String,
    pub enable_endpoint: String,
    pub precision_endpoint: String,
    pub status_source: String,
}

/// A descriptor together with the service used to reach it.
#[derive(Clone)]
pub struct RegisteredBackend {
    pub descriptor: BackendDescriptor,
    pub service: Arc<dyn PlannerService>,
}

/// Immutable id -> planner mapping.
///
/// Lookups scan the list; the number of planners is small and lookups are
/// not on a hot path.
#[derive(Clone)]
pub struct BackendRegistry {
    backends: Arc<Vec<RegisteredBackend>>,
}

impl BackendRegistry {
    /// Build a registry from already-connected planners.
    pub fn new(backends: Vec<RegisteredBackend>) -> Result<Self, BackendError> {
        for (index, backend) in backends.iter().enumerate() {
            let id = &backend.descriptor.id;
            if backends[..index].iter().any(|b| &b.descriptor.id == id) {
                return Err(BackendError::DuplicateBackend {
                    backend: id.clone(),
                });
            }
        }
        Ok(Self {
            backends: Arc::new(backends),
        })
    }

    /// Zip the parallel configuration lists into descriptors.
    pub fn descriptors_from_config(
        planners: &PlannersConfig,
    ) -> Result<Vec<BackendDescriptor>, BackendError> {
        let names = planners.names.len();
        let lists = [
            ("status_sources", planners.status_sources.len()),
            ("enable_endpoints", planners.enable_endpoints.len()),
            ("precision_endpoints", planners.precision_endpoints.len()),
        ];
        if let Some((field, other)) = lists.into_iter().find(|(_, len)| *len != names) {
            return Err(BackendError::MismatchedLists {
                names,
                field,
                other,
            });
        }

        Ok(planners
            .names
            .iter()
            .zip(&planners.status_sources)
            .zip(&planners.enable_endpoints)
            .zip(&planners.precision_endpoints)
            .map(
                |(((id, status_source), enable_endpoint), precision_endpoint)| BackendDescriptor {
                    id: id.clone(),
                    enable_endpoint: enable_endpoint.clone(),
                    precision_endpoint: precision_endpoint.clone(),
                    status_source: status_source.clone(),
                },
            )
            .collect())
    }

    /// Build a registry whose planners are reached over HTTP with `client`.
    pub fn from_config(
        planners: &PlannersConfig,
        client: &reqwest::Client,
    ) -> Result<Self, BackendError> {
        let backends = Self::descriptors_from_config(planners)?
            .into_iter()
            .map(|descriptor| {
                let service: Arc<dyn PlannerService> = Arc::new(HttpPlanner::new(
                    client.clone(),
                    descriptor.enable_endpoint.clone(),
                    descriptor.precision_endpoint.clone(),
                ));
                RegisteredBackend {
                    descriptor,
                    service,
                }
            })
            .collect();
        Self::new(backends)
    }

    /// Resolve a planner by id.
    pub fn lookup(&self, id: &str) -> Result<&RegisteredBackend, BackendError> {
        self.backends
            .iter()
            .find(|b| b.descriptor.id == id)
            .ok_or_else(|| BackendError::UnknownBackend {
                backend: id.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.backends.iter().any(|b| b.descriptor.id == id)
    }

    /// Planner ids in configuration order.
    pub fn ids(&self) -> Vec<String> {
        self.backends
            .iter()
            .map(|b| b.descriptor.id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredBackend> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
