//! JSON messages exchanged with a design-tool host.

use crate::settings::ConversionSettings;
use crate::structure::generate_structure;
use serde::{Deserialize, Serialize};

/// A message from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostRequest {
    Convert {
        code: String,
        #[serde(default)]
        settings: ConversionSettings,
    },
}

/// A message to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostResponse {
    Success { structure: String },
    Error { message: String },
    Progress { message: String },
}

impl HostResponse {
    pub fn progress(message: impl Into<String>) -> Self {
        HostResponse::Progress {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, HostResponse::Progress { .. })
    }
}

/// Answer one request. The last message is always terminal.
pub async fn handle_request(request: HostRequest) -> Vec<HostResponse> {
    match request {
        HostRequest::Convert { code, settings } => {
            let mut messages = vec![HostResponse::progress("Converting component")];
            match crate::convert_markup_to_render_tree(&code, &settings).await {
                Ok(tree) => messages.push(HostResponse::Success {
                    structure: generate_structure(&tree),
                }),
                Err(err) => {
                    tracing::warn!(%err, "conversion failed");
                    messages.push(HostResponse::Error {
                        message: err.to_string(),
                    });
                }
            }
            messages
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"type":"convert","code":"<template><div/></template>","settings":{"componentDensity":"compact"}}"#;
        let request: HostRequest = serde_json::from_str(json).unwrap();
        let HostRequest::Convert { code, settings } = request;
        assert_eq!(code, "<template><div/></template>");
        assert_eq!(settings.density, crate::settings::Density::Compact);
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_string(&HostResponse::Error {
            message: "nope".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"nope"}"#);
    }

    #[tokio::test]
    async fn test_convert_success() {
        let request = HostRequest::Convert {
            code: r#"<template><q-btn label="Ok" /></template>"#.into(),
            settings: ConversionSettings::default(),
        };
        let messages = handle_request(request).await;
        assert_eq!(messages.len(), 2);
        assert!(!messages[0].is_terminal());
        match &messages[1] {
            HostResponse::Success { structure } => {
                assert!(structure.starts_with("Componente Quasar (FRAME) [Column]"));
                assert!(structure.contains("  q-btn (FRAME) [Row]"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_convert_error() {
        let request = HostRequest::Convert {
            code: "<div>no template</div>".into(),
            settings: ConversionSettings::default(),
        };
        let messages = handle_request(request).await;
        assert_eq!(
            messages.last(),
            Some(&HostResponse::Error {
                message: "template not found in component source".into()
            })
        );
    }
}
