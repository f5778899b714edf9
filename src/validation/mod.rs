//! Cross-reference validation over a loaded export tree.
//!
//! Six independent passes walk the [`ResourceIndex`] and emit candidate
//! references, each classified immediately as exactly one of Valid, Broken,
//! or Warning:
//!
//! - Service `spec.selector` entries against workload labels
//! - RoleBinding subjects (ServiceAccount existence; User/Group are external
//!   identities and always Warning)
//! - NetworkPolicy pod selectors, including `ingress[].from[]` peers
//! - Ingress backends (`serviceName` existence)
//! - HorizontalPodAutoscaler `spec.scaleTargetRef`
//! - PodDisruptionBudget `spec.selector`
//!
//! Broken means the target is absent from the tree and a reapply would fail;
//! Warning means the target cannot be verified from a static export.
//! Classification is never an error.

use crate::snapshot::{access, ResourceIndex};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Selector keys evaluated for Service selectors. Other keys are not
/// evaluated at all, neither valid nor broken.
const SERVICE_SELECTOR_KEYS: [&str; 3] = ["app", "name", "component"];

/// Selector keys evaluated for NetworkPolicy and PodDisruptionBudget
/// selectors.
const POLICY_SELECTOR_KEYS: [&str; 4] = ["app", "name", "component", "tier"];

/// Workload kinds scanned when resolving a label selector.
const SELECTOR_TARGET_KINDS: [&str; 4] = ["Pod", "Deployment", "StatefulSet", "ReplicaSet"];

/// One directed reference candidate: a field of the source resource naming
/// the target resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub source_type: String,
    pub source_name: String,
    pub source_namespace: String,
    pub target_type: String,
    pub target_name: String,
    pub target_namespace: String,
    pub field: String,
}

/// Counts derived from the classified lists; always recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_references: usize,
    pub valid_references: usize,
    pub broken_references: usize,
    pub warning_references: usize,
}

/// Aggregate output of a validation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid_references: Vec<Reference>,
    pub broken_references: Vec<Reference>,
    pub warning_references: Vec<Reference>,
    pub summary: ValidationSummary,
}

impl ValidationResult {
    /// File a reference as valid or broken depending on target existence.
    fn record(&mut self, reference: Reference, exists: bool) {
        if exists {
            self.valid_references.push(reference);
        } else {
            self.broken_references.push(reference);
        }
    }

    fn recompute_summary(&mut self) {
        self.summary = ValidationSummary {
            total_references: self.valid_references.len()
                + self.broken_references.len()
                + self.warning_references.len(),
            valid_references: self.valid_references.len(),
            broken_references: self.broken_references.len(),
            warning_references: self.warning_references.len(),
        };
    }
}

/// Run every reference-resolution pass over the index.
pub fn validate(index: &ResourceIndex) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_service_selectors(index, &mut result);
    check_role_binding_subjects(index, &mut result);
    check_network_policy_selectors(index, &mut result);
    check_ingress_backends(index, &mut result);
    check_scale_targets(index, &mut result);
    check_disruption_budget_selectors(index, &mut result);

    result.recompute_summary();
    result
}

/// Service `spec.selector` entries resolve against workload labels in the
/// same namespace; the field records the individual selector key.
fn check_service_selectors(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("Service") {
        let Some(selector) = access::spec(doc)
            .and_then(|spec| spec.get("selector"))
            .and_then(Value::as_mapping)
        else {
            continue;
        };

        for (key, value) in selector {
            let (Some(key), Some(value)) = (key.as_str(), value.as_str()) else {
                continue;
            };
            if !SERVICE_SELECTOR_KEYS.contains(&key) {
                continue;
            }
            let exists = selector_target_exists(index, namespace, key, value);
            result.record(
                Reference {
                    source_type: "Service".to_string(),
                    source_name: name.to_string(),
                    source_namespace: namespace.to_string(),
                    target_type: "Pod/Deployment".to_string(),
                    target_name: value.to_string(),
                    target_namespace: namespace.to_string(),
                    field: format!("spec.selector.{key}"),
                },
                exists,
            );
        }
    }
}

/// RoleBinding subjects: ServiceAccounts resolve by existence in the
/// subject's namespace (defaulting to the binding's own); User and Group
/// subjects are external identities and always classify Warning.
fn check_role_binding_subjects(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("RoleBinding") {
        let Some(subjects) = access::get_seq(doc, "subjects") else {
            continue;
        };

        for subject in subjects {
            let kind = access::get_str(subject, "kind").unwrap_or_default();
            let subject_name = access::get_str(subject, "name").unwrap_or_default();
            let subject_namespace = access::get_str(subject, "namespace")
                .filter(|ns| !ns.is_empty())
                .unwrap_or(namespace);

            match kind {
                "ServiceAccount" => {
                    let exists = index.contains(subject_namespace, "ServiceAccount", subject_name);
                    result.record(
                        Reference {
                            source_type: "RoleBinding".to_string(),
                            source_name: name.to_string(),
                            source_namespace: namespace.to_string(),
                            target_type: "ServiceAccount".to_string(),
                            target_name: subject_name.to_string(),
                            target_namespace: subject_namespace.to_string(),
                            field: "subjects".to_string(),
                        },
                        exists,
                    );
                }
                "User" | "Group" => {
                    result.warning_references.push(Reference {
                        source_type: "RoleBinding".to_string(),
                        source_name: name.to_string(),
                        source_namespace: namespace.to_string(),
                        target_type: kind.to_string(),
                        target_name: subject_name.to_string(),
                        target_namespace: subject_namespace.to_string(),
                        field: "subjects".to_string(),
                    });
                }
                _ => {}
            }
        }
    }
}

/// NetworkPolicy `spec.podSelector` plus every `spec.ingress[].from[]`
/// pod selector.
fn check_network_policy_selectors(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("NetworkPolicy") {
        let Some(spec) = access::spec(doc) else {
            continue;
        };

        if let Some(selector) = spec.get("podSelector").and_then(Value::as_mapping) {
            record_selector_refs(
                index,
                result,
                "NetworkPolicy",
                name,
                namespace,
                selector,
                "spec.podSelector",
            );
        }

        let Some(ingress) = access::get_seq(spec, "ingress") else {
            continue;
        };
        for rule in ingress {
            let Some(from) = access::get_seq(rule, "from") else {
                continue;
            };
            for peer in from {
                if let Some(selector) = peer.get("podSelector").and_then(Value::as_mapping) {
                    record_selector_refs(
                        index,
                        result,
                        "NetworkPolicy",
                        name,
                        namespace,
                        selector,
                        "spec.ingress.from.podSelector",
                    );
                }
            }
        }
    }
}

/// Ingress backends resolve `serviceName` as a Service existence check, both
/// for the default backend and for every rule path.
fn check_ingress_backends(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("Ingress") {
        let Some(spec) = access::spec(doc) else {
            continue;
        };

        if let Some(backend) = spec.get("defaultBackend") {
            record_backend_ref(index, result, name, namespace, backend, "spec.defaultBackend");
        }

        let Some(rules) = access::get_seq(spec, "rules") else {
            continue;
        };
        for rule in rules {
            let Some(paths) = rule
                .get("http")
                .and_then(|http| access::get_seq(http, "paths"))
            else {
                continue;
            };
            for path in paths {
                if let Some(backend) = path.get("backend") {
                    record_backend_ref(
                        index,
                        result,
                        name,
                        namespace,
                        backend,
                        "spec.rules.http.paths.backend",
                    );
                }
            }
        }
    }
}

/// HPA `spec.scaleTargetRef` resolves by exact name for scalable workload
/// kinds; other kinds are not evaluated.
fn check_scale_targets(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("HorizontalPodAutoscaler") {
        let Some(target) = access::spec(doc).and_then(|spec| spec.get("scaleTargetRef")) else {
            continue;
        };
        let kind = access::get_str(target, "kind").unwrap_or_default();
        if !matches!(kind, "Deployment" | "StatefulSet" | "ReplicaSet") {
            continue;
        }
        let target_name = access::get_str(target, "name").unwrap_or_default();
        let exists = index.contains(namespace, kind, target_name);
        result.record(
            Reference {
                source_type: "HorizontalPodAutoscaler".to_string(),
                source_name: name.to_string(),
                source_namespace: namespace.to_string(),
                target_type: kind.to_string(),
                target_name: target_name.to_string(),
                target_namespace: namespace.to_string(),
                field: "spec.scaleTargetRef".to_string(),
            },
            exists,
        );
    }
}

/// PodDisruptionBudget `spec.selector` uses the shared selector policy.
fn check_disruption_budget_selectors(index: &ResourceIndex, result: &mut ValidationResult) {
    for (namespace, name, doc) in index.iter_kind("PodDisruptionBudget") {
        let Some(selector) = access::spec(doc)
            .and_then(|spec| spec.get("selector"))
            .and_then(Value::as_mapping)
        else {
            continue;
        };
        record_selector_refs(
            index,
            result,
            "PodDisruptionBudget",
            name,
            namespace,
            selector,
            "spec.selector",
        );
    }
}

/// Shared selector resolution for NetworkPolicy and PodDisruptionBudget:
/// each recognized key/value pair becomes one reference, valid when some
/// workload in the namespace carries the matching label.
fn record_selector_refs(
    index: &ResourceIndex,
    result: &mut ValidationResult,
    source_type: &str,
    source_name: &str,
    namespace: &str,
    selector: &serde_yaml::Mapping,
    field: &str,
) {
    for (key, value) in selector {
        let (Some(key), Some(value)) = (key.as_str(), value.as_str()) else {
            continue;
        };
        if !POLICY_SELECTOR_KEYS.contains(&key) {
            continue;
        }
        let exists = selector_target_exists(index, namespace, key, value);
        result.record(
            Reference {
                source_type: source_type.to_string(),
                source_name: source_name.to_string(),
                source_namespace: namespace.to_string(),
                target_type: "Pod/Deployment".to_string(),
                target_name: value.to_string(),
                target_namespace: namespace.to_string(),
                field: field.to_string(),
            },
            exists,
        );
    }
}

fn record_backend_ref(
    index: &ResourceIndex,
    result: &mut ValidationResult,
    source_name: &str,
    namespace: &str,
    backend: &Value,
    field: &str,
) {
    let Some(service_name) = access::get_str(backend, "serviceName").filter(|s| !s.is_empty())
    else {
        return;
    };
    let exists = index.contains(namespace, "Service", service_name);
    result.record(
        Reference {
            source_type: "Ingress".to_string(),
            source_name: source_name.to_string(),
            source_namespace: namespace.to_string(),
            target_type: "Service".to_string(),
            target_name: service_name.to_string(),
            target_namespace: namespace.to_string(),
            field: field.to_string(),
        },
        exists,
    );
}

/// A selector target exists when any workload in the namespace carries
/// `metadata.labels[key] == value`. First match short-circuits; multiple
/// matches are not distinguished from one.
fn selector_target_exists(index: &ResourceIndex, namespace: &str, key: &str, value: &str) -> bool {
    SELECTOR_TARGET_KINDS.iter().any(|kind| {
        index.by_kind(namespace, kind).is_some_and(|docs| {
            docs.values()
                .any(|doc| access::label_value(doc, key) == Some(value))
        })
    })
}
