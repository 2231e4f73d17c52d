//! Description - GET で返すサービス記述（myGrid 語彙）
//!
//! ```text
//! <service> a mygrid:serviceDescription ;
//!     rdfs:label / mygrid:hasServiceNameText        name
//!     rdfs:comment / mygrid:hasServiceDescriptionText description
//!     mygrid:providedBy  _:organisation
//!     mygrid:hasOperation _:operation
//! _:operation mygrid:inputParameter / outputParameter / secondaryParameter → mygrid:parameter
//! ```

use crate::domain::vocab::{dc, mygrid, rdf, rdfs, xsd};
use crate::domain::{Graph, Literal, Term};
use crate::service::definition::{ParameterSpec, ServiceDefinition};

/// Build the description graph of a service published at `service_url`.
pub fn describe(
    service_url: &str,
    definition: &ServiceDefinition,
    parameters: Option<&ParameterSpec>,
) -> Graph {
    let mut g = Graph::new();
    let service = Term::iri(service_url);
    let organisation = Term::blank("organisation");
    let operation = Term::blank("operation");

    g.add(service.clone(), Term::iri(rdf::TYPE), Term::iri(mygrid::SERVICE_DESCRIPTION));
    g.add(service.clone(), Term::iri(rdfs::LABEL), Term::literal(&definition.name));
    g.add(
        service.clone(),
        Term::iri(mygrid::HAS_SERVICE_NAME_TEXT),
        Term::literal(&definition.name),
    );
    if !definition.description.is_empty() {
        g.add(
            service.clone(),
            Term::iri(rdfs::COMMENT),
            Term::literal(&definition.description),
        );
        g.add(
            service.clone(),
            Term::iri(mygrid::HAS_SERVICE_DESCRIPTION_TEXT),
            Term::literal(&definition.description),
        );
    }

    g.add(service.clone(), Term::iri(mygrid::PROVIDED_BY), organisation.clone());
    g.add(organisation.clone(), Term::iri(rdf::TYPE), Term::iri(mygrid::ORGANISATION));
    if let Some(provider) = &definition.provider {
        g.add(organisation.clone(), Term::iri(rdfs::LABEL), Term::literal(provider));
    }
    if let Some(email) = &definition.contact_email {
        g.add(organisation.clone(), Term::iri(dc::CREATOR), Term::literal(email));
    }
    g.add(
        organisation,
        Term::iri(mygrid::AUTHORITATIVE),
        Term::Literal(Literal::typed(definition.authoritative.to_string(), xsd::BOOLEAN)),
    );

    g.add(service, Term::iri(mygrid::HAS_OPERATION), operation.clone());
    g.add(operation.clone(), Term::iri(rdf::TYPE), Term::iri(mygrid::OPERATION));
    add_parameter(&mut g, &operation, mygrid::INPUT_PARAMETER, "input", &definition.input_class);
    add_parameter(&mut g, &operation, mygrid::OUTPUT_PARAMETER, "output", &definition.output_class);
    if let Some(spec) = parameters {
        add_parameter(&mut g, &operation, mygrid::SECONDARY_PARAMETER, "secondary", &spec.class);
    }
    g
}

fn add_parameter(g: &mut Graph, operation: &Term, role: &str, label: &str, class: &str) {
    let parameter = Term::blank(label);
    g.add(operation.clone(), Term::iri(role), parameter.clone());
    g.add(parameter.clone(), Term::iri(rdf::TYPE), Term::iri(mygrid::PARAMETER));
    g.add(parameter, Term::iri(mygrid::OBJECT_TYPE), Term::iri(class));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> ServiceDefinition {
        ServiceDefinition::new("hello", "http://e/In", "http://e/Out")
            .with_description("says hello")
            .with_contact_email("me@example.org")
            .authoritative(true)
    }

    #[test]
    fn describes_input_and_output_classes() {
        let g = describe("http://localhost/hello", &definition(), None);
        let service = Term::iri("http://localhost/hello");

        assert_eq!(
            g.instances_of(mygrid::SERVICE_DESCRIPTION),
            vec![service.clone()]
        );
        let object_types: Vec<_> = g
            .iter()
            .filter(|t| t.predicate.as_iri() == Some(mygrid::OBJECT_TYPE))
            .map(|t| t.object.clone())
            .collect();
        assert!(object_types.contains(&Term::iri("http://e/In")));
        assert!(object_types.contains(&Term::iri("http://e/Out")));
        assert!(!g.iter().any(|t| t.predicate.as_iri() == Some(mygrid::SECONDARY_PARAMETER)));

        let organisation = Term::blank("organisation");
        let flags: Vec<_> = g.objects(&organisation, mygrid::AUTHORITATIVE).collect();
        assert_eq!(flags, vec![&Term::Literal(Literal::typed("true", xsd::BOOLEAN))]);
    }

    #[test]
    fn secondary_parameter_is_listed_when_present() {
        let spec = ParameterSpec::new("http://e/Params");
        let g = describe("http://localhost/hello", &definition(), Some(&spec));
        let operation = Term::blank("operation");
        assert_eq!(g.objects(&operation, mygrid::SECONDARY_PARAMETER).count(), 1);
    }
}
