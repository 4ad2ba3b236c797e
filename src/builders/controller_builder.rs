//! Builders to construct admission controllers from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AdmissionConfig, AuditBackendConfig, ServiceConfig};
use crate::core::audit::{InMemoryAuditSink, PostgresAuditSink};
use crate::core::admission::AdmissionController;
use crate::core::ports::{BookingLedger, BookingNotifier, CancelAuthorizer, ClassCatalog, Spawn};

/// Events kept by an in-memory audit sink built from configuration.
const AUDIT_BUFFER_EVENTS: usize = 4096;

/// Build one admission controller per configured facility using the
/// provided collaborator factories.
pub fn build_controllers<L, C, N, A, S, FL, FC, FN, FA>(
    cfg: &ServiceConfig,
    mut ledger_factory: FL,
    mut catalog_factory: FC,
    mut notifier_factory: FN,
    mut authorizer_factory: FA,
    spawner: S,
) -> Result<HashMap<String, AdmissionController<L, C, N, A, S>>, String>
where
    L: BookingLedger,
    C: ClassCatalog,
    N: BookingNotifier,
    A: CancelAuthorizer,
    S: Spawn + Clone,
    FL: FnMut(&AdmissionConfig) -> Arc<L>,
    FC: FnMut(&AdmissionConfig) -> Arc<C>,
    FN: FnMut(&AdmissionConfig) -> Arc<N>,
    FA: FnMut(&AdmissionConfig) -> A,
{
    cfg.validate()?;

    let mut controllers = HashMap::with_capacity(cfg.facilities.len());
    for (name, facility) in &cfg.facilities {
        let mut controller = AdmissionController::new(
            ledger_factory(facility),
            catalog_factory(facility),
            notifier_factory(facility),
            authorizer_factory(facility),
            spawner.clone(),
        )
        .with_retry_policy(facility.retry_policy());

        controller = match facility.audit {
            AuditBackendConfig::Disabled => controller,
            AuditBackendConfig::InMemory => {
                controller.with_audit(Box::new(InMemoryAuditSink::new(AUDIT_BUFFER_EVENTS)))
            }
            AuditBackendConfig::Postgres => controller.with_audit(Box::new(PostgresAuditSink)),
        };

        controllers.insert(name.clone(), controller);
    }
    Ok(controllers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::OwnerOnly;
    use crate::infra::{InMemoryCatalog, InMemoryLedger, TracingNotifier};
    use crate::runtime::TokioSpawner;

    #[tokio::test]
    async fn test_builds_controller_per_facility() {
        let cfg = ServiceConfig::from_json_str(
            r#"{
                "facilities": {
                    "downtown": {
                        "max_retry_attempts": 2,
                        "retry_backoff_ms": 10,
                        "ledger": "in_memory",
                        "audit": "in_memory"
                    },
                    "riverside": {
                        "max_retry_attempts": 4,
                        "retry_backoff_ms": 50,
                        "ledger": "in_memory",
                        "audit": "disabled"
                    }
                }
            }"#,
        )
        .unwrap();

        let spawner = TokioSpawner::new(tokio::runtime::Handle::current());
        let controllers = build_controllers(
            &cfg,
            |_| Arc::new(InMemoryLedger::new()),
            |_| Arc::new(InMemoryCatalog::new()),
            |_| Arc::new(TracingNotifier),
            |_| OwnerOnly,
            spawner,
        )
        .unwrap();

        assert_eq!(controllers.len(), 2);
        assert!(controllers.contains_key("downtown"));
        assert!(controllers.contains_key("riverside"));
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let cfg = ServiceConfig {
            facilities: HashMap::new(),
        };
        let spawner = TokioSpawner::new(tokio::runtime::Handle::current());
        let result = build_controllers(
            &cfg,
            |_| Arc::new(InMemoryLedger::new()),
            |_| Arc::new(InMemoryCatalog::new()),
            |_| Arc::new(TracingNotifier),
            |_| OwnerOnly,
            spawner,
        );
        assert!(result.is_err());
    }
}
