//! Rule identifiers and the static permission table used by the validators.

use crate::model::Severity;

pub const RULE_TARGET_SDK: &str = "SDK001";
pub const RULE_DANGEROUS_PERMISSION: &str = "DP001";
pub const RULE_LOCATION_PERMISSION: &str = "DP002";
pub const RULE_CAMERA_PERMISSION: &str = "DP003";
pub const RULE_CONTACTS_PERMISSION: &str = "DP004";
pub const RULE_STORAGE_PERMISSION: &str = "DP005";
pub const RULE_PHONE_PERMISSION: &str = "DP006";
pub const RULE_CALENDAR_PERMISSION: &str = "DP007";
pub const RULE_EXPORTED_COMPONENT: &str = "MV001";
pub const RULE_LAUNCHER_ACTIVITY: &str = "MV002";
pub const RULE_CLEARTEXT_TRAFFIC: &str = "MV004";
pub const RULE_COMPONENT_SECURITY: &str = "MC001";

/// Lowest targetSdkVersion the store accepts for new apps and updates.
pub const MIN_TARGET_SDK: u32 = 35;

/// Below this target SDK the platform allows cleartext traffic by default.
pub const CLEARTEXT_DEFAULT_OFF_SDK: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRule {
    pub permission: &'static str,
    pub rule_id: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub const DANGEROUS_PERMISSIONS: &[PermissionRule] = &[
    PermissionRule {
        permission: "android.permission.ACCESS_FINE_LOCATION",
        rule_id: RULE_LOCATION_PERMISSION,
        category: "Location",
        description: "Fine location access requires prominent disclosure and runtime permission",
    },
    PermissionRule {
        permission: "android.permission.ACCESS_COARSE_LOCATION",
        rule_id: RULE_LOCATION_PERMISSION,
        category: "Location",
        description: "Coarse location access requires prominent disclosure",
    },
    PermissionRule {
        permission: "android.permission.ACCESS_BACKGROUND_LOCATION",
        rule_id: RULE_LOCATION_PERMISSION,
        category: "Location",
        description: "Background location requires additional justification for store approval",
    },
    PermissionRule {
        permission: "android.permission.CAMERA",
        rule_id: RULE_CAMERA_PERMISSION,
        category: "Camera",
        description: "Camera access requires prominent disclosure",
    },
    PermissionRule {
        permission: "android.permission.READ_CONTACTS",
        rule_id: RULE_CONTACTS_PERMISSION,
        category: "Contacts",
        description: "Contacts access requires prominent disclosure and justification",
    },
    PermissionRule {
        permission: "android.permission.WRITE_CONTACTS",
        rule_id: RULE_CONTACTS_PERMISSION,
        category: "Contacts",
        description: "Write contacts access requires prominent disclosure and justification",
    },
    PermissionRule {
        permission: "android.permission.READ_EXTERNAL_STORAGE",
        rule_id: RULE_STORAGE_PERMISSION,
        category: "Storage",
        description: "Broad storage access; consider using scoped storage APIs instead",
    },
    PermissionRule {
        permission: "android.permission.WRITE_EXTERNAL_STORAGE",
        rule_id: RULE_STORAGE_PERMISSION,
        category: "Storage",
        description: "Broad storage write access; deprecated in favor of scoped storage",
    },
    PermissionRule {
        permission: "android.permission.MANAGE_EXTERNAL_STORAGE",
        rule_id: RULE_STORAGE_PERMISSION,
        category: "Storage",
        description: "All-files access requires store policy justification",
    },
    PermissionRule {
        permission: "android.permission.READ_PHONE_STATE",
        rule_id: RULE_PHONE_PERMISSION,
        category: "Phone",
        description: "Phone state access includes device identifiers; requires justification",
    },
    PermissionRule {
        permission: "android.permission.CALL_PHONE",
        rule_id: RULE_PHONE_PERMISSION,
        category: "Phone",
        description: "Direct call permission requires prominent disclosure",
    },
    PermissionRule {
        permission: "android.permission.READ_CALL_LOG",
        rule_id: RULE_PHONE_PERMISSION,
        category: "Phone",
        description: "Call log access is restricted; requires default handler or a store exception",
    },
    PermissionRule {
        permission: "android.permission.READ_CALENDAR",
        rule_id: RULE_CALENDAR_PERMISSION,
        category: "Calendar",
        description: "Calendar read access requires prominent disclosure",
    },
    PermissionRule {
        permission: "android.permission.WRITE_CALENDAR",
        rule_id: RULE_CALENDAR_PERMISSION,
        category: "Calendar",
        description: "Calendar write access requires prominent disclosure",
    },
    PermissionRule {
        permission: "android.permission.RECORD_AUDIO",
        rule_id: RULE_DANGEROUS_PERMISSION,
        category: "Microphone",
        description: "Microphone access requires prominent disclosure and runtime permission",
    },
    PermissionRule {
        permission: "android.permission.READ_SMS",
        rule_id: RULE_DANGEROUS_PERMISSION,
        category: "SMS",
        description: "SMS read access is restricted; requires default handler or a store exception",
    },
    PermissionRule {
        permission: "android.permission.SEND_SMS",
        rule_id: RULE_DANGEROUS_PERMISSION,
        category: "SMS",
        description: "SMS send access is restricted; requires default handler or a store exception",
    },
    PermissionRule {
        permission: "android.permission.RECEIVE_SMS",
        rule_id: RULE_DANGEROUS_PERMISSION,
        category: "SMS",
        description: "SMS receive access is restricted; requires default handler or a store exception",
    },
    PermissionRule {
        permission: "android.permission.BODY_SENSORS",
        rule_id: RULE_DANGEROUS_PERMISSION,
        category: "Sensors",
        description: "Body sensor access requires health-related disclosure",
    },
];

/// Restricted permissions reported as Critical instead of Warning.
pub const RESTRICTED_PERMISSIONS: &[&str] = &[
    "android.permission.READ_SMS",
    "android.permission.SEND_SMS",
    "android.permission.RECEIVE_SMS",
    "android.permission.READ_CALL_LOG",
    "android.permission.MANAGE_EXTERNAL_STORAGE",
    "android.permission.ACCESS_BACKGROUND_LOCATION",
];

pub fn dangerous_permission(name: &str) -> Option<&'static PermissionRule> {
    DANGEROUS_PERMISSIONS.iter().find(|rule| rule.permission == name)
}

pub fn permission_severity(name: &str) -> Severity {
    if RESTRICTED_PERMISSIONS.contains(&name) {
        Severity::Critical
    } else {
        Severity::Warning
    }
}
