#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for taking `$ref` strings apart. Nothing here fetches documents; external
//! references are only split into their document and component parts so the resolver
//! can qualify them through the import mapping.

use percent_encoding::percent_decode_str;

/// A `$ref` that targets `#/components/{section}/{name}`, possibly in another document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    /// Document part before `#`; `None` for same-document references.
    pub document: Option<String>,
    /// Components section (`schemas`, `parameters`, `responses`, ...).
    pub section: String,
    /// Decoded component key.
    pub name: String,
}

impl ComponentRef {
    /// Whether the reference points into the current document.
    pub fn is_local(&self) -> bool {
        self.document.is_none()
    }
}

/// Splits a component reference.
///
/// Returns `None` for anything that is not exactly `[doc]#/components/{section}/{name}`.
pub fn parse_component_ref(reference: &str) -> Option<ComponentRef> {
    let (document, fragment) = match reference.split_once('#') {
        Some((doc, frag)) => (doc, frag),
        None => return None,
    };
    let pointer = fragment.strip_prefix('/')?;
    let segments: Vec<&str> = pointer.split('/').collect();
    if segments.len() != 3 || segments[0] != "components" {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() || segments[1].is_empty() {
        return None;
    }

    Some(ComponentRef {
        document: if document.is_empty() {
            None
        } else {
            Some(document.to_string())
        },
        section: segments[1].to_string(),
        name,
    })
}

/// Extracts a component name from a same-document reference into `section`.
pub(crate) fn local_component_name(reference: &str, section: &str) -> Option<String> {
    parse_component_ref(reference)
        .filter(|r| r.is_local() && r.section == section)
        .map(|r| r.name)
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`, then percent escapes).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}
