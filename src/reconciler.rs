//! One reconciliation pass: resolve every published alias and decide whether
//! dnsdock needs a restart.
//!
//! The pass is fail-fast. The first alias that does not resolve marks the
//! pass as needing a restart and no later container is checked.
//!
//! The expected address is only logged. An alias that resolves to a
//! different IP than the container holds does not trigger a restart.

use tracing::{debug, error};

use crate::error::{ResolveFailure, WatchdogError};
use crate::inventory::ContainerRecord;
use crate::resolver::AliasResolver;

/// The alias whose failure ended a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasFailure {
    /// Container publishing the alias.
    pub container: String,
    /// The alias that failed.
    pub alias: String,
    /// Why it failed.
    pub error: ResolveFailure,
}

/// Outcome of a reconciliation pass.
#[derive(Debug)]
pub struct Decision<'a> {
    /// The dnsdock container found in the inventory.
    pub sidecar: &'a ContainerRecord,
    /// Whether dnsdock must be restarted.
    pub restart_required: bool,
    /// Number of aliases sent to the resolver.
    pub checked: usize,
    /// The failure that ended the pass, if any.
    pub failure: Option<AliasFailure>,
}

/// Find the sidecar by exact name.
pub fn find_sidecar<'a>(
    inventory: &'a [ContainerRecord],
    sidecar_name: &str,
) -> Result<&'a ContainerRecord, WatchdogError> {
    inventory
        .iter()
        .find(|c| c.name == sidecar_name)
        .ok_or_else(|| WatchdogError::SidecarNotFound(sidecar_name.to_string()))
}

/// Check every alias in `inventory`, stopping at the first failure.
pub async fn reconcile<'a>(
    inventory: &'a [ContainerRecord],
    sidecar_name: &str,
    resolver: &dyn AliasResolver,
) -> Result<Decision<'a>, WatchdogError> {
    let sidecar = find_sidecar(inventory, sidecar_name)?;

    let mut checked = 0;
    let mut failure = None;

    for container in inventory {
        let Some(alias) = container.alias() else {
            continue;
        };
        let expected = container.address();

        checked += 1;
        let error = match resolver.resolve(&alias).await {
            Ok(addrs) => match addrs.first() {
                Some(resolved) => {
                    debug!(
                        container = %container.name,
                        %alias,
                        expected = expected.as_deref().unwrap_or("none"),
                        %resolved,
                        "alias resolved"
                    );
                    continue;
                }
                None => ResolveFailure::NoAnswer(alias.clone()),
            },
            Err(e) => e,
        };

        error!(
            container = %container.name,
            %alias,
            error = %error,
            "Couldn't resolve alias, this will trigger a restart"
        );
        failure = Some(AliasFailure {
            container: container.name.clone(),
            alias,
            error,
        });
        break;
    }

    Ok(Decision {
        sidecar,
        restart_required: failure.is_some(),
        checked,
        failure,
    })
}
