use apidiff_core::{
    build_canonical_spec, compare_specs, CanonicalSpec, EngineConfig, Outcome, SpecDocument,
    StructuralSchemaDiffer,
};
use serde_json::Value;

/// Parse a YAML fixture into a format-detected document
#[allow(dead_code)]
pub fn yaml_doc(location: &str, yaml: &str) -> SpecDocument {
    let content: Value = serde_yaml::from_str(yaml).unwrap();
    SpecDocument::detect(location, content).unwrap()
}

/// Parse a YAML fixture into a raw value for tests that edit it before comparing
#[allow(dead_code)]
pub fn yaml_value(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

/// Wrap a JSON value into a format-detected document
#[allow(dead_code)]
pub fn json_doc(location: &str, content: Value) -> SpecDocument {
    SpecDocument::detect(location, content).unwrap()
}

#[allow(dead_code)]
pub fn canonical(document: &SpecDocument) -> CanonicalSpec {
    build_canonical_spec(document, &EngineConfig::default()).unwrap()
}

/// Compare with the structural schema differ and default configuration
#[allow(dead_code)]
pub fn compare(source: &SpecDocument, destination: &SpecDocument) -> Outcome {
    compare_specs(
        source,
        destination,
        &StructuralSchemaDiffer,
        &EngineConfig::default(),
    )
    .unwrap()
}

/// Every entry code in breaking, non-breaking, unclassified order
#[allow(dead_code)]
pub fn codes(outcome: &Outcome) -> Vec<String> {
    outcome.entries().map(|e| e.code.clone()).collect()
}

/// A small Swagger 2.0 pet store used as a baseline by several tests
#[allow(dead_code)]
pub const PETSTORE_SWAGGER: &str = r##"
swagger: "2.0"
info:
  title: Petstore
  version: "1.0.0"
  contact:
    name: API Team
basePath: /v1
host: pets.example.com
schemes:
  - http
  - https
x-test-property: alpha
paths:
  /pets:
    get:
      responses:
        "200":
          description: A list of pets
          headers:
            X-Next:
              type: string
            Content-Type:
              type: string
          schema:
            type: array
            items:
              $ref: "#/definitions/Pet"
    post:
      parameters:
        - in: body
          name: pet
          schema:
            $ref: "#/definitions/Pet"
      responses:
        "201":
          description: Created
  /pets/{petId}:
    get:
      responses:
        "200":
          description: A pet
          schema:
            $ref: "#/definitions/Pet"
        "404":
          description: Not found
definitions:
  Pet:
    type: object
    required:
      - id
    properties:
      id:
        type: integer
      name:
        type: string
"##;

/// The same API expressed as OpenAPI 3.0
#[allow(dead_code)]
pub const PETSTORE_OPENAPI: &str = r##"
openapi: "3.0.3"
info:
  title: Petstore
  version: "1.0.0"
paths:
  /pets:
    get:
      responses:
        "200":
          description: A list of pets
          headers:
            X-Next:
              schema:
                type: string
          content:
            application/json; charset=utf-8:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/Pet"
      responses:
        "201":
          description: Created
components:
  schemas:
    Pet:
      type: object
      required:
        - id
      properties:
        id:
          type: integer
        name:
          type: string
"##;
