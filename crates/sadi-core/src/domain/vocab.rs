//! Well-known vocabulary IRIs.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
}

/// myGrid service ontology (service descriptions).
pub mod mygrid {
    pub const NS: &str = "http://www.mygrid.org.uk/mygrid-moby-service#";
    pub const SERVICE_DESCRIPTION: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#serviceDescription";
    pub const ORGANISATION: &str = "http://www.mygrid.org.uk/mygrid-moby-service#organisation";
    pub const OPERATION: &str = "http://www.mygrid.org.uk/mygrid-moby-service#operation";
    pub const PARAMETER: &str = "http://www.mygrid.org.uk/mygrid-moby-service#parameter";
    pub const HAS_SERVICE_NAME_TEXT: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#hasServiceNameText";
    pub const HAS_SERVICE_DESCRIPTION_TEXT: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#hasServiceDescriptionText";
    pub const PROVIDED_BY: &str = "http://www.mygrid.org.uk/mygrid-moby-service#providedBy";
    pub const AUTHORITATIVE: &str = "http://www.mygrid.org.uk/mygrid-moby-service#authoritative";
    pub const HAS_OPERATION: &str = "http://www.mygrid.org.uk/mygrid-moby-service#hasOperation";
    pub const INPUT_PARAMETER: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#inputParameter";
    pub const OUTPUT_PARAMETER: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#outputParameter";
    pub const SECONDARY_PARAMETER: &str =
        "http://www.mygrid.org.uk/mygrid-moby-service#secondaryParameter";
    pub const OBJECT_TYPE: &str = "http://www.mygrid.org.uk/mygrid-moby-service#objectType";
}

pub mod dc {
    pub const CREATOR: &str = "http://purl.org/dc/elements/1.1/creator";
}
