//! Contract-to-OpenAPI generation.
//!
//! The generator walks a [`ContractRegistry`] and derives one document from
//! the same descriptors the client and server engines interpret, so the
//! published surface can never drift from the dispatched one. Bound
//! implementations are not required; a descriptor-only registration
//! documents fine.

use crate::openapi::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RequestBody,
    Response, Schema, SecurityRequirement, SecurityScheme, Server, Tag,
};
use indexmap::IndexMap;
use keryx_core::{
    BindingKind, ContractDescriptor, ContractRegistry, Fault, FaultResult, OperationDescriptor,
    Verb,
};

/// JSON media type used for every body.
const APPLICATION_JSON: &str = "application/json";

/// Component name of the fault envelope schema.
const ENVELOPE_SCHEMA: &str = "FaultEnvelope";

/// Builds OpenAPI documents from registered contracts.
///
/// # Example
///
/// ```
/// use keryx_core::{ContractDescriptor, ContractRegistry, OperationDescriptor, Verb};
/// use keryx_docs::DocumentGenerator;
///
/// # fn example() -> keryx_core::FaultResult<()> {
/// let mut registry = ContractRegistry::new();
/// registry.register(
///     ContractDescriptor::builder("Items")
///         .operation(
///             OperationDescriptor::builder("ListItems")
///                 .verb(Verb::Get)
///                 .path("/item")
///                 .returns_value(true)
///                 .build(),
///         )
///         .build()?,
/// )?;
///
/// let document = DocumentGenerator::new()
///     .title("Item Service")
///     .version("1.0.0")
///     .generate(&registry)?;
/// assert!(document.paths.contains_key("/item"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<Server>,
    security_scheme: String,
}

impl Default for DocumentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentGenerator {
    /// Creates a generator with default metadata.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Keryx Service".to_string(),
            version: "0.0.0".to_string(),
            description: None,
            servers: Vec::new(),
            security_scheme: "bearerAuth".to_string(),
        }
    }

    /// Sets the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a server entry.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Renames the bearer security scheme.
    #[must_use]
    pub fn security_scheme(mut self, name: impl Into<String>) -> Self {
        self.security_scheme = name.into();
        self
    }

    /// Generates the document for every routed, dispatchable operation.
    ///
    /// Unrouted operations and operations with an unsupported verb are not
    /// part of the HTTP surface, so they are omitted. Two operations landing
    /// on the same `(verb, path)` slot is a configuration defect.
    pub fn generate(&self, registry: &ContractRegistry) -> FaultResult<OpenApi> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tags = Vec::new();

        for registration in registry.contracts() {
            let contract = registration.descriptor();
            tags.push(Tag {
                name: contract.name().to_string(),
                description: None,
            });

            for operation in contract.operations() {
                let Some(template) = operation.path() else {
                    continue;
                };
                if !operation.verb().is_supported() {
                    continue;
                }

                let item = paths.entry(path_key(template.as_str())).or_default();
                let slot = match operation.verb() {
                    Verb::Get => &mut item.get,
                    Verb::Post => &mut item.post,
                    Verb::Put => &mut item.put,
                    Verb::Delete => &mut item.delete,
                    Verb::Patch => unreachable!("unsupported verbs are filtered above"),
                };
                if slot.is_some() {
                    return Err(Fault::conflict(format!(
                        "operation '{}' collides with an existing {} {} operation",
                        contract.route_name(operation),
                        operation.verb(),
                        template.as_str()
                    )));
                }
                *slot = Some(self.document_operation(contract, operation));
            }
        }

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            tags,
            paths,
            components: Some(Components {
                schemas: IndexMap::from([(ENVELOPE_SCHEMA.to_string(), envelope_schema())]),
                security_schemes: IndexMap::from([(
                    self.security_scheme.clone(),
                    SecurityScheme {
                        scheme_type: "http".to_string(),
                        scheme: Some("bearer".to_string()),
                        bearer_format: Some("JWT".to_string()),
                    },
                )]),
            }),
        })
    }

    fn document_operation(
        &self,
        contract: &ContractDescriptor,
        operation: &OperationDescriptor,
    ) -> Operation {
        let mut parameters = Vec::new();
        let mut request_body = None;

        for spec in operation.parameters() {
            match spec.kind {
                BindingKind::Route => parameters.push(Parameter {
                    name: spec.name.clone(),
                    location: ParameterIn::Path,
                    required: true,
                    schema: Some(Schema::string()),
                }),
                BindingKind::Query => parameters.push(Parameter {
                    name: spec.name.clone(),
                    location: ParameterIn::Query,
                    required: false,
                    schema: Some(if spec.composite {
                        Schema::object()
                    } else {
                        Schema::string()
                    }),
                }),
                BindingKind::Body if operation.verb().has_payload() => {
                    request_body = Some(RequestBody {
                        required: true,
                        content: IndexMap::from([(
                            APPLICATION_JSON.to_string(),
                            MediaType {
                                schema: Some(Schema::object()),
                            },
                        )]),
                    });
                }
                BindingKind::Body | BindingKind::Unbound => {}
            }
        }

        let mut responses = IndexMap::new();
        if operation.returns_value() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Operation payload".to_string(),
                    content: IndexMap::from([(
                        APPLICATION_JSON.to_string(),
                        MediaType { schema: None },
                    )]),
                },
            );
        } else {
            responses.insert(
                "204".to_string(),
                Response {
                    description: "Operation completed".to_string(),
                    content: IndexMap::new(),
                },
            );
        }
        responses.insert(
            "default".to_string(),
            Response {
                description: "Fault envelope".to_string(),
                content: IndexMap::from([(
                    APPLICATION_JSON.to_string(),
                    MediaType {
                        schema: Some(Schema::reference(format!(
                            "#/components/schemas/{ENVELOPE_SCHEMA}"
                        ))),
                    },
                )]),
            },
        );

        let security = if contract.anonymous() || operation.anonymous() {
            Vec::new()
        } else {
            vec![SecurityRequirement::from([(
                self.security_scheme.clone(),
                Vec::new(),
            )])]
        };

        Operation {
            operation_id: contract.route_name(operation),
            // The qualified name doubles as the summary unless one is declared.
            summary: operation
                .summary()
                .map(ToString::to_string)
                .or_else(|| Some(contract.route_name(operation))),
            description: operation.description().map(ToString::to_string),
            tags: vec![contract.name().to_string()],
            parameters,
            request_body,
            responses,
            security,
        }
    }
}

/// OpenAPI path keys must start with `/`; templates may omit it.
fn path_key(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    }
}

fn envelope_schema() -> Schema {
    Schema::object()
        .property("success", Schema::boolean())
        .property("statusCode", Schema::integer())
        .property("message", Schema::string())
        .property("details", Schema::array(Schema::string()).nullable())
        .required_property("success")
        .required_property("statusCode")
        .required_property("message")
}
