use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, warn};

use super::position::LineIndex;
use crate::error::ManifestError;
use crate::model::{
    CapabilityDeclaration, Component, ComponentKind, ExportState, IntentFilter, Manifest,
};

/// Parses manifest bytes.
///
/// Unknown elements, odd nesting and mismatched end tags are skipped. Only a
/// token stream that cannot be continued (for example a tag cut off at end of
/// input) is an error.
pub fn parse(data: &[u8]) -> Result<Manifest, ManifestError> {
    match parse_partial(data) {
        (manifest, None) => Ok(manifest),
        (_, Some(err)) => Err(err),
    }
}

/// Parses manifest bytes and records `path` as the file of every position.
pub fn parse_at(data: &[u8], path: &Path) -> Result<Manifest, ManifestError> {
    let mut manifest = parse(data)?;
    manifest.file = path.display().to_string();
    Ok(manifest)
}

/// Like [`parse`], but also hands back everything built before an
/// unrecoverable tokenizer error.
pub fn parse_partial(data: &[u8]) -> (Manifest, Option<ManifestError>) {
    let index = LineIndex::new(data);
    let mut builder = ManifestBuilder::default();

    let mut reader = Reader::from_reader(data);
    reader
        .expand_empty_elements(true)
        .check_end_names(false)
        .trim_text(false);

    let mut buf = Vec::new();
    // end of the last complete token; text never swallows a `<`, so any `<`
    // after it at end of input starts markup that was never closed
    let mut consumed = 0;
    loop {
        let offset = reader.buffer_position();
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return malformed(builder, &index, offset, e.to_string()),
        };

        match event {
            Event::Start(ref start) => builder.start(start, index.line_of(offset)),
            Event::End(ref end) => builder.end(end.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        consumed = reader.buffer_position();
        buf.clear();
    }

    let rest = data.get(consumed..).unwrap_or_default();
    if let Some(pos) = rest.iter().position(|&b| b == b'<') {
        return malformed(
            builder,
            &index,
            consumed + pos,
            "unclosed markup at end of input".to_string(),
        );
    }

    let manifest = builder.finish();
    debug!(
        package = %manifest.package.name,
        permissions = manifest.permissions.len(),
        components = manifest.components.len(),
        "Parsed manifest"
    );
    (manifest, None)
}

fn malformed(
    builder: ManifestBuilder,
    index: &LineIndex,
    offset: usize,
    message: String,
) -> (Manifest, Option<ManifestError>) {
    let line = index.line_of(offset);
    warn!(line, offset, "Manifest token stream ended early: {}", message);
    let err = ManifestError::Malformed {
        line,
        offset,
        message,
    };
    (builder.finish(), Some(err))
}

/// A component whose end tag has not been seen yet, with the intent filter
/// currently open inside it.
struct OpenComponent {
    component: Component,
    filter: Option<IntentFilter>,
}

#[derive(Default)]
struct ManifestBuilder {
    manifest: Manifest,
    open: Vec<OpenComponent>,
}

impl ManifestBuilder {
    fn start(&mut self, start: &BytesStart<'_>, line: u32) {
        let local = start.local_name();
        match local.as_ref() {
            b"manifest" => {
                for (key, value) in attributes(start) {
                    match key.as_str() {
                        "package" => self.manifest.package.name = value,
                        "versionCode" => self.manifest.package.version_code = number(&value),
                        "versionName" => self.manifest.package.version_name = value,
                        "compileSdkVersion" => self.manifest.sdk.compile = number(&value),
                        _ => {}
                    }
                }
            }
            b"uses-sdk" => {
                for (key, value) in attributes(start) {
                    match key.as_str() {
                        "minSdkVersion" => self.manifest.sdk.min = number(&value),
                        "targetSdkVersion" => self.manifest.sdk.target = number(&value),
                        _ => {}
                    }
                }
            }
            b"application" => {
                if let Some((_, value)) = attributes(start)
                    .into_iter()
                    .find(|(key, _)| key == "usesCleartextTraffic")
                {
                    self.manifest.network.cleartext_traffic = Some(value.eq_ignore_ascii_case("true"));
                }
            }
            b"uses-permission" => {
                let mut permission = CapabilityDeclaration::new(String::new(), line);
                for (key, value) in attributes(start) {
                    match key.as_str() {
                        "name" => permission.name = value,
                        "maxSdkVersion" => permission.max_sdk = value.trim().parse().ok(),
                        "required" => permission.required = value.eq_ignore_ascii_case("true"),
                        _ => {}
                    }
                }
                self.manifest.permissions.push(permission);
            }
            b"intent-filter" => {
                if let Some(open) = self.open.last_mut() {
                    open.filter = Some(IntentFilter::new(line));
                }
            }
            b"action" => {
                if let Some(filter) = self.open_filter() {
                    if let Some(name) = name_attribute(start) {
                        filter.actions.insert(name);
                    }
                }
            }
            b"category" => {
                if let Some(filter) = self.open_filter() {
                    if let Some(name) = name_attribute(start) {
                        filter.categories.insert(name);
                    }
                }
            }
            other => {
                if let Some(kind) = ComponentKind::from_element(other) {
                    let mut component = Component::new(kind, String::new(), line);
                    for (key, value) in attributes(start) {
                        match key.as_str() {
                            "name" => component.name = value,
                            "exported" => component.exported = ExportState::from_attribute(&value),
                            _ => {}
                        }
                    }
                    self.open.push(OpenComponent {
                        component,
                        filter: None,
                    });
                }
            }
        }
    }

    fn end(&mut self, local: &[u8]) {
        if local == b"intent-filter" {
            if let Some(open) = self.open.last_mut() {
                if let Some(filter) = open.filter.take() {
                    open.component.intent_filters.push(filter);
                }
            }
            return;
        }

        let Some(kind) = ComponentKind::from_element(local) else {
            return;
        };
        // an end tag that does not close the innermost component is ignored
        // a filter left open inside the component is dropped with it
        if self.open.last().map(|o| o.component.kind) == Some(kind) {
            if let Some(open) = self.open.pop() {
                self.manifest.components.push(open.component);
            }
        }
    }

    fn open_filter(&mut self) -> Option<&mut IntentFilter> {
        self.open.last_mut().and_then(|o| o.filter.as_mut())
    }

    fn finish(self) -> Manifest {
        self.manifest
    }
}

/// Attributes keyed by local name. Values that fail to unescape are kept raw.
fn attributes(start: &BytesStart<'_>) -> Vec<(String, String)> {
    let mut attrs = start.attributes();
    attrs.with_checks(false);
    attrs
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = match attr.unescape_value() {
                Ok(v) => v.to_string(),
                Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
            };
            (key, value)
        })
        .collect()
}

fn name_attribute(start: &BytesStart<'_>) -> Option<String> {
    attributes(start)
        .into_iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value)
}

fn number(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}
