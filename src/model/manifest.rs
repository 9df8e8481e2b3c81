use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ACTION_MAIN: &str = "android.intent.action.MAIN";
pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version_code: u32,
    pub version_name: String,
}

/// Platform versions declared by the manifest. `0` means unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkRange {
    pub min: u32,
    pub target: u32,
    pub compile: u32,
}

/// The `usesCleartextTraffic` setting of the application element.
///
/// `None` means the attribute was absent, which is not the same as an
/// explicit `false`: the platform default then depends on the target SDK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub cleartext_traffic: Option<bool>,
}

impl NetworkPolicy {
    pub fn is_explicit(&self) -> bool {
        self.cleartext_traffic.is_some()
    }
}

/// A `<uses-permission>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sdk: Option<u32>,
    pub required: bool,
    pub line: u32,
}

impl CapabilityDeclaration {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            max_sdk: None,
            required: true,
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Activity,
    Service,
    Receiver,
    Provider,
}

impl ComponentKind {
    /// Maps an element name to a component kind. `activity-alias` counts as an activity.
    pub fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"activity" | b"activity-alias" => Some(ComponentKind::Activity),
            b"service" => Some(ComponentKind::Service),
            b"receiver" => Some(ComponentKind::Receiver),
            b"provider" => Some(ComponentKind::Provider),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Activity => "Activity",
            ComponentKind::Service => "Service",
            ComponentKind::Receiver => "Receiver",
            ComponentKind::Provider => "Provider",
        }
    }

    pub fn element_name(&self) -> &'static str {
        match self {
            ComponentKind::Activity => "activity",
            ComponentKind::Service => "service",
            ComponentKind::Receiver => "receiver",
            ComponentKind::Provider => "provider",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The `exported` attribute of a component.
///
/// `Unspecified` is its own state: components with intent filters must
/// declare the attribute explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    #[default]
    Unspecified,
    Exported,
    NotExported,
}

impl ExportState {
    pub fn from_attribute(value: &str) -> Self {
        if value.eq_ignore_ascii_case("true") {
            ExportState::Exported
        } else {
            ExportState::NotExported
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentFilter {
    pub actions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub line: u32,
}

impl IntentFilter {
    pub fn new(line: u32) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// True when this one filter carries both the MAIN action and the LAUNCHER category.
    pub fn is_launcher(&self) -> bool {
        self.actions.contains(ACTION_MAIN) && self.categories.contains(CATEGORY_LAUNCHER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    pub exported: ExportState,
    pub intent_filters: Vec<IntentFilter>,
    pub line: u32,
}

impl Component {
    pub fn new(kind: ComponentKind, name: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            exported: ExportState::Unspecified,
            intent_filters: Vec::new(),
            line,
        }
    }

    pub fn with_exported(mut self, exported: ExportState) -> Self {
        self.exported = exported;
        self
    }

    pub fn with_filter(mut self, filter: IntentFilter) -> Self {
        self.intent_filters.push(filter);
        self
    }
}

/// A parsed `AndroidManifest.xml`.
///
/// Built once by the parser and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Path the manifest was read from; empty when parsed from bytes.
    pub file: String,
    pub package: PackageIdentity,
    pub sdk: SdkRange,
    pub network: NetworkPolicy,
    pub permissions: Vec<CapabilityDeclaration>,
    pub components: Vec<Component>,
}

impl Manifest {
    pub fn components_of(&self, kind: ComponentKind) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.kind == kind)
    }

    pub fn has_launcher_entry(&self) -> bool {
        self.components
            .iter()
            .any(|c| c.intent_filters.iter().any(IntentFilter::is_launcher))
    }
}
