//! Vocabulary constants.
//!
//! Full IRIs for every term the graph reads or writes: W3C PROV-O, the RDF
//! core vocabularies and the project (GEOKUR) vocabulary.

use provgran_id::namespace::StaticNamespace;
use provgran_id::Namespace;

macro_rules! vocabulary {
    ($ns:literal; $($name:ident = $local:literal),* $(,)?) => {
        pub const NS: &str = $ns;
        $(pub const $name: &str = concat!($ns, $local);)*
    };
}

pub mod prov {
    vocabulary!("http://www.w3.org/ns/prov#";
        ENTITY = "Entity",
        ACTIVITY = "Activity",
        AGENT = "Agent",
        PERSON = "Person",
        ORGANIZATION = "Organization",
        SOFTWARE_AGENT = "SoftwareAgent",
        USED = "used",
        WAS_GENERATED_BY = "wasGeneratedBy",
        WAS_DERIVED_FROM = "wasDerivedFrom",
        WAS_ATTRIBUTED_TO = "wasAttributedTo",
        WAS_ASSOCIATED_WITH = "wasAssociatedWith",
        WAS_INFORMED_BY = "wasInformedBy",
        ACTED_ON_BEHALF_OF = "actedOnBehalfOf",
        STARTED_AT_TIME = "startedAtTime",
        ENDED_AT_TIME = "endedAtTime",
    );
}

pub mod rdf {
    vocabulary!("http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        TYPE = "type",
        PROPERTY = "Property",
        LANG_STRING = "langString",
    );
}

pub mod rdfs {
    vocabulary!("http://www.w3.org/2000/01/rdf-schema#";
        LABEL = "label",
        COMMENT = "comment",
        SUB_CLASS_OF = "subClassOf",
    );
}

pub mod xsd {
    vocabulary!("http://www.w3.org/2001/XMLSchema#";
        STRING = "string",
        BOOLEAN = "boolean",
        INTEGER = "integer",
        DECIMAL = "decimal",
        DOUBLE = "double",
        DATE_TIME = "dateTime",
    );
}

/// Project vocabulary.
pub mod geokur {
    vocabulary!("https://geokur.geo.tu-dresden.de/";
        PROCESS = "Process",
        SUB_PROCESS = "SubProcess",
        DATA = "Data",
        HAS_TAG = "hasTag",
        HAS_RELATIVE_IMPORTANCE = "hasRelativeImportance",
        HAS_SUB_PROCESS = "hasSubProcess",
        IS_INSTANCE_OF = "isInstanceOf",
        HAS_PROCESS_TYPE = "hasProcessType",
        HAS_BRANCH = "hasBranch",
        BASAL_CHANGE = "BasalChange",
        UNIT_CHANGE = "UnitChange",
        VALUE_CHANGE = "ValueChange",
        SEMANTIC_SHIFT = "SemanticShift",
        CORE_CONCEPT = "CoreConcept",
    );
}

pub const PROV: StaticNamespace = Namespace::from_static(prov::NS);
pub const RDF: StaticNamespace = Namespace::from_static(rdf::NS);
pub const RDFS: StaticNamespace = Namespace::from_static(rdfs::NS);
pub const XSD: StaticNamespace = Namespace::from_static(xsd::NS);
pub const GEOKUR: StaticNamespace = Namespace::from_static(geokur::NS);

/// Prefixes used when writing Turtle, in output order.
pub const PREFIXES: [(&str, &str); 5] = [
    ("geokur", geokur::NS),
    ("prov", prov::NS),
    ("rdf", rdf::NS),
    ("rdfs", rdfs::NS),
    ("xsd", xsd::NS),
];

pub(crate) const ACTIVITY_TYPES: [&str; 3] = [geokur::PROCESS, geokur::SUB_PROCESS, prov::ACTIVITY];
pub(crate) const ENTITY_TYPES: [&str; 2] = [geokur::DATA, prov::ENTITY];
pub(crate) const AGENT_TYPES: [&str; 4] = [
    prov::AGENT,
    prov::PERSON,
    prov::ORGANIZATION,
    prov::SOFTWARE_AGENT,
];
