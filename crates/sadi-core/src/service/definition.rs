//! ServiceDefinition - サービスの静的なメタデータ
//!
//! description（GET の応答）と入力 entity の抽出に使います。

use serde::{Deserialize, Serialize};

/// Static metadata of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Organisation running the service.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub authoritative: bool,
    /// Class IRI input entities are typed with.
    pub input_class: String,
    /// Class IRI output entities are typed with.
    pub output_class: String,
}

impl ServiceDefinition {
    pub fn new(
        name: impl Into<String>,
        input_class: impl Into<String>,
        output_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            provider: None,
            contact_email: None,
            authoritative: false,
            input_class: input_class.into(),
            output_class: output_class.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }
}

/// Secondary-parameter class a service accepts alongside its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub class: String,
}

impl ParameterSpec {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

/// How one input entity is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Invocation {
    /// Transform inside the request.
    #[default]
    Sync,
    /// Submit to the task manager and answer with a poll reference.
    Async,
}
