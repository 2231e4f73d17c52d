//! HelloService - 動作確認用のサービス
//!
//! `hello:NamedIndividual`（foaf:name 付き）を受け取り、
//! `hello:GreetedIndividual` に `hello:greeting "Hello, <name>!"` を付けて返す。

use std::time::Duration;

use async_trait::async_trait;
use sadi_core::{Entity, Invocation, Service, ServiceDefinition, Term, TransformError};

pub const HELLO_NS: &str = "http://sadiframework.org/examples/hello.owl#";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

pub struct HelloService {
    definition: ServiceDefinition,
    invocation: Invocation,
    delay: Duration,
}

impl HelloService {
    pub fn new(invocation: Invocation) -> Self {
        let definition = ServiceDefinition::new(
            "hello",
            format!("{HELLO_NS}NamedIndividual"),
            format!("{HELLO_NS}GreetedIndividual"),
        )
        .with_description("A simple \"Hello, World\" service that reads a name and attaches a greeting.")
        .with_provider("sadi-rs")
        .with_contact_email("info@sadiframework.org")
        .authoritative(false);

        Self {
            definition,
            invocation,
            delay: Duration::ZERO,
        }
    }

    /// Artificial processing time, handy for watching the async flow.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Service for HelloService {
    fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }

    fn invocation(&self, _input: &Entity) -> Invocation {
        self.invocation
    }

    async fn process(&self, input: Entity, mut output: Entity) -> Result<Entity, TransformError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let name = input
            .literal_value(FOAF_NAME)
            .ok_or_else(|| TransformError::missing(FOAF_NAME))?;
        output.add(
            &format!("{HELLO_NS}greeting"),
            Term::literal(format!("Hello, {name}!")),
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn greets_by_name() {
        let service = HelloService::new(Invocation::Sync);
        let mut input = Entity::new(Term::iri("http://example.org/guy"));
        input.add(FOAF_NAME, Term::literal("Guy Incognito"));
        let output = input.output_of(&service.definition().output_class);

        let result = service.process(input, output).await.unwrap();
        assert_eq!(
            result.literal_value(&format!("{HELLO_NS}greeting")),
            Some("Hello, Guy Incognito!")
        );
    }

    #[tokio::test]
    async fn nameless_input_is_an_error() {
        let service = HelloService::new(Invocation::Sync);
        let input = Entity::new(Term::iri("http://example.org/nobody"));
        let output = input.output_of(&service.definition().output_class);
        assert_eq!(
            service.process(input, output).await.unwrap_err(),
            TransformError::missing(FOAF_NAME)
        );
    }
}
