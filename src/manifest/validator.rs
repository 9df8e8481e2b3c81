//! Compliance rules evaluated over a parsed [`Manifest`].
//!
//! Every check is a pure function of the manifest. [`validate_all`] runs
//! them in a fixed order: target SDK, dangerous permissions, exported
//! components, entry point, cleartext traffic.

use super::rules::{
    dangerous_permission, permission_severity, CLEARTEXT_DEFAULT_OFF_SDK, MIN_TARGET_SDK,
    RULE_CLEARTEXT_TRAFFIC, RULE_COMPONENT_SECURITY, RULE_EXPORTED_COMPONENT,
    RULE_LAUNCHER_ACTIVITY, RULE_TARGET_SDK,
};
use crate::model::{ExportState, Finding, Manifest, Position, Severity};

pub fn validate_all(manifest: &Manifest) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(check_target_sdk(manifest));
    findings.extend(check_dangerous_permissions(manifest));
    findings.extend(check_exported_components(manifest));
    findings.extend(check_entry_point(manifest));
    findings.extend(check_cleartext_traffic(manifest));
    findings
}

pub fn check_target_sdk(manifest: &Manifest) -> Vec<Finding> {
    let target = manifest.sdk.target;
    let position = Position::file(&manifest.file);

    if target == 0 {
        return vec![Finding::new(
            RULE_TARGET_SDK,
            "Missing targetSdkVersion",
            Severity::Critical,
            position,
        )
        .with_description(format!(
            "targetSdkVersion is not set in the manifest. The store requires targetSdkVersion >= {}.",
            MIN_TARGET_SDK
        ))
        .with_remediation(format!(
            "Set targetSdkVersion to {} or higher in your build.gradle or AndroidManifest.xml.",
            MIN_TARGET_SDK
        ))];
    }

    if target < MIN_TARGET_SDK {
        return vec![Finding::new(
            RULE_TARGET_SDK,
            format!("targetSdkVersion {} is below required minimum", target),
            Severity::Critical,
            position,
        )
        .with_description(format!(
            "targetSdkVersion is {} but the store requires >= {} for new apps and updates.",
            target, MIN_TARGET_SDK
        ))
        .with_remediation(format!("Update targetSdkVersion to {} or higher.", MIN_TARGET_SDK))];
    }

    Vec::new()
}

pub fn check_dangerous_permissions(manifest: &Manifest) -> Vec<Finding> {
    manifest
        .permissions
        .iter()
        .filter_map(|permission| {
            let rule = dangerous_permission(&permission.name)?;
            Some(
                Finding::new(
                    rule.rule_id,
                    format!("Dangerous permission: {}", short_name(&permission.name)),
                    permission_severity(&permission.name),
                    Position::at_line(&manifest.file, permission.line),
                )
                .with_description(rule.description)
                .with_remediation(format!(
                    "Ensure {} permission usage complies with store policies. Add prominent disclosure if required.",
                    rule.category
                )),
            )
        })
        .collect()
}

/// Components with intent filters must declare `android:exported` (required since API 31).
/// Components without intent filters are not evaluated.
pub fn check_exported_components(manifest: &Manifest) -> Vec<Finding> {
    let mut findings = Vec::new();

    for component in &manifest.components {
        if component.intent_filters.is_empty() {
            continue;
        }
        let position = Position::at_line(&manifest.file, component.line);

        match component.exported {
            ExportState::Unspecified => findings.push(
                Finding::new(
                    RULE_EXPORTED_COMPONENT,
                    format!("{} missing android:exported", component.kind),
                    Severity::Error,
                    position,
                )
                .with_description(format!(
                    "Component {:?} has intent-filters but does not set android:exported. This is required since Android 12 (API 31) and will cause installation failures.",
                    component.name
                ))
                .with_remediation(format!(
                    "Add android:exported=\"true\" or android:exported=\"false\" to the <{}> element.",
                    component.kind.element_name()
                )),
            ),
            ExportState::Exported => findings.push(
                Finding::new(
                    RULE_COMPONENT_SECURITY,
                    format!("Exported {}: {}", component.kind, short_name(&component.name)),
                    Severity::Info,
                    position,
                )
                .with_description(format!(
                    "Component {:?} is exported and accessible to other apps. Ensure this is intentional and properly secured.",
                    component.name
                ))
                .with_remediation(
                    "Review exported components to ensure they don't expose sensitive functionality.",
                ),
            ),
            ExportState::NotExported => {}
        }
    }

    findings
}

pub fn check_entry_point(manifest: &Manifest) -> Vec<Finding> {
    if manifest.has_launcher_entry() {
        return Vec::new();
    }
    vec![Finding::new(
        RULE_LAUNCHER_ACTIVITY,
        "No launcher activity found",
        Severity::Warning,
        Position::file(&manifest.file),
    )
    .with_description(
        "The manifest does not define a launcher activity (an intent-filter with ACTION_MAIN and CATEGORY_LAUNCHER). The app may not appear in the launcher.",
    )
    .with_remediation(
        "Add an intent-filter with action MAIN and category LAUNCHER to your main activity.",
    )]
}

pub fn check_cleartext_traffic(manifest: &Manifest) -> Vec<Finding> {
    let position = Position::file(&manifest.file);

    match manifest.network.cleartext_traffic {
        Some(true) => vec![Finding::new(
            RULE_CLEARTEXT_TRAFFIC,
            "Cleartext traffic explicitly enabled",
            Severity::Error,
            position,
        )
        .with_description(
            "android:usesCleartextTraffic is set to true, allowing unencrypted HTTP connections.",
        )
        .with_remediation(
            "Set android:usesCleartextTraffic=\"false\" and use HTTPS for all network communication.",
        )],
        Some(false) => Vec::new(),
        None => {
            let target = manifest.sdk.target;
            if target > 0 && target < CLEARTEXT_DEFAULT_OFF_SDK {
                vec![Finding::new(
                    RULE_CLEARTEXT_TRAFFIC,
                    "Cleartext traffic may be enabled by default",
                    Severity::Warning,
                    position,
                )
                .with_description(format!(
                    "With targetSdkVersion < {}, cleartext traffic is allowed by default. Consider setting android:usesCleartextTraffic=\"false\".",
                    CLEARTEXT_DEFAULT_OFF_SDK
                ))
                .with_remediation(
                    "Set android:usesCleartextTraffic=\"false\" in the <application> element or use a Network Security Config.",
                )]
            } else {
                Vec::new()
            }
        }
    }
}

/// Last dotted segment of a permission or component name.
fn short_name(full: &str) -> &str {
    match full.rfind('.') {
        Some(idx) => &full[idx + 1..],
        None => full,
    }
}
