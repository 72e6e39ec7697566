//! kverify-wait: wait for a cluster resource to become ready
//!
//! Runs one verification against the current Kubernetes context and exits
//! non-zero with the failure message if the resource never gets there.
//!
//! ## Configuration
//! - KVERIFY_KIND: pod (default), integration, kamelet, pipe, kamelet-binding,
//!   broker, trigger, channel, subscription, kservice
//! - KVERIFY_NAME: resource name (takes precedence over KVERIFY_LABEL)
//! - KVERIFY_LABEL: label selector `key=value`
//! - KVERIFY_PHASE: awaited `status.phase` (default `Running` for pods)
//! - KVERIFY_CONDITION: awaited condition, `Type` or `Type=False`
//!   (default `Ready` for non-pod kinds)
//! - KVERIFY_MESSAGE: for pods, once the awaited phase or condition holds,
//!   additionally wait for this log message
//! - KVERIFY_CONTAINER: container to read logs from
//!
//! Poll defaults and API versions come from the regular configuration
//! (`kverify.yaml`, `KVERIFY_CONFIG`, `KVERIFY__*` variables).

use kube::Client;
use tracing::{error, info};

use kverify::accessor::{KubeLogAccessor, KubeResourceAccessor};
use kverify::config::Config;
use kverify::kind::ResourceKind;
use kverify::utils::bootstrap::init_tracing;
use kverify::{ConditionSpec, ResourceLocator, Verifier};

const KIND_ENV_VAR: &str = "KVERIFY_KIND";
const NAME_ENV_VAR: &str = "KVERIFY_NAME";
const LABEL_ENV_VAR: &str = "KVERIFY_LABEL";
const PHASE_ENV_VAR: &str = "KVERIFY_PHASE";
const CONDITION_ENV_VAR: &str = "KVERIFY_CONDITION";
const MESSAGE_ENV_VAR: &str = "KVERIFY_MESSAGE";
const CONTAINER_ENV_VAR: &str = "KVERIFY_CONTAINER";

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn resolve_kind(name: &str, config: &Config) -> Result<ResourceKind, String> {
    let kind = match name {
        "pod" => ResourceKind::pod(),
        "integration" => ResourceKind::integration(&config.camel_k),
        "kamelet" => ResourceKind::kamelet(&config.camel_k),
        "pipe" => ResourceKind::pipe(&config.camel_k),
        "kamelet-binding" => ResourceKind::kamelet_binding(&config.camel_k),
        "broker" => ResourceKind::broker(&config.knative),
        "trigger" => ResourceKind::trigger(&config.knative),
        "channel" => ResourceKind::channel(&config.knative),
        "subscription" => ResourceKind::subscription(&config.knative),
        "kservice" => ResourceKind::knative_service(&config.knative),
        other => return Err(format!("unknown kind '{}'", other)),
    };
    Ok(kind)
}

fn resolve_condition(is_pod: bool) -> Result<ConditionSpec, String> {
    if let Some(phase) = env(PHASE_ENV_VAR) {
        return Ok(if is_pod {
            ConditionSpec::phase(phase)
        } else {
            ConditionSpec::resource_phase(phase)
        });
    }
    if let Some(expr) = env(CONDITION_ENV_VAR) {
        return ConditionSpec::parse_condition(&expr)
            .ok_or_else(|| format!("invalid condition '{}'", expr));
    }
    if is_pod {
        Ok(ConditionSpec::phase(kverify::condition::RUNNING_PHASE))
    } else {
        Ok(ConditionSpec::condition(kverify::condition::READY_CONDITION))
    }
}

fn resolve_locator() -> Result<ResourceLocator, String> {
    let name = env(NAME_ENV_VAR);
    let label = env(LABEL_ENV_VAR);

    let label = match label.as_deref() {
        Some(expr) => Some(
            ResourceLocator::parse_selector(expr)
                .ok_or_else(|| format!("invalid label selector '{}'", expr))?,
        ),
        None => None,
    };

    match (name, label) {
        (Some(name), _) => Ok(ResourceLocator::name(name)),
        (None, Some(label)) => Ok(label),
        (None, None) => Err(format!("set {} or {}", NAME_ENV_VAR, LABEL_ENV_VAR)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let kind_name = env(KIND_ENV_VAR).unwrap_or_else(|| "pod".to_string());
    let kind = resolve_kind(&kind_name, &config)?;
    let is_pod = kind == ResourceKind::pod();
    let locator = resolve_locator()?;
    let condition = resolve_condition(is_pod)?;
    let message = env(MESSAGE_ENV_VAR);
    if message.is_some() && !is_pod {
        return Err(format!("{} is only supported for pods", MESSAGE_ENV_VAR).into());
    }

    let client = Client::try_default().await?;
    let namespace = config.kubernetes.namespace.clone();
    let accessor = KubeResourceAccessor::new(client.clone(), kind.clone(), &namespace);
    let verifier = Verifier::from_config(&config.poll);

    info!(
        kind = %kind,
        resource = %locator,
        condition = %condition,
        namespace = %namespace,
        max_attempts = verifier.poller().policy().max_attempts(),
        "kverify-wait started"
    );

    let container = env(CONTAINER_ENV_VAR);
    let result = match message {
        Some(message) => {
            let logs = KubeLogAccessor::new(client, &namespace);
            verifier
                .verify_then_log(
                    &accessor,
                    &logs,
                    &locator,
                    &condition,
                    container.as_deref(),
                    &message,
                )
                .await
                .map(|_| ())
        }
        None => verifier
            .verify(&accessor, &locator, &condition)
            .await
            .map(|_| ()),
    };

    if let Err(e) = result {
        error!(error = %e, "Verification failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}
