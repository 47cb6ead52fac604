use crate::errors::{CompileErrorKind, SchemaCompileError};
use crate::registry::Registry;
use crate::schema::{
    Additional, Dependency, Form, Items, Keywords, Limit, NodeId, Pattern, Reference, Schema,
    SchemaModel, Type,
};
use json_pointer::JsonPointer;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};
use url::Url;

type Result<T> = std::result::Result<T, SchemaCompileError>;

/// A schema location: document index plus JSON Pointer within it.
type LocationKey = (usize, String);

struct Document<'a> {
    url: Option<Url>,
    root: &'a Value,
}

/// Turns a schema document into a [`SchemaModel`].
///
/// Nodes are compiled depth-first. `$ref`s are followed as they are met, and
/// every location is compiled at most once, so two references to the same
/// definition share a node. A reference to a location that is still on the
/// compilation stack is a cycle.
pub(crate) struct Compiler<'a> {
    registry: &'a Registry,
    documents: Vec<Document<'a>>,
    nodes: Vec<Schema>,
    compiled: HashMap<LocationKey, NodeId>,
    in_progress: HashSet<LocationKey>,
}

impl<'a> Compiler<'a> {
    pub fn new(document: &'a Value, registry: &'a Registry) -> Result<Self> {
        let url = match document.get("$id") {
            None => None,
            Some(Value::String(id)) => match Url::parse(id) {
                Ok(mut url) => {
                    url.set_fragment(None);
                    Some(url)
                }
                Err(_) => {
                    trace!(id = %id, "relative $id ignored");
                    None
                }
            },
            Some(_) => return Err(SchemaCompileError::invalid_keyword("/$id", "$id", "a string")),
        };

        Ok(Compiler {
            registry,
            documents: vec![Document {
                url,
                root: document,
            }],
            nodes: Vec::new(),
            compiled: HashMap::new(),
            in_progress: HashSet::new(),
        })
    }

    pub fn compile(mut self) -> Result<SchemaModel> {
        let document = self.documents[0].root;
        let root = self.compile_at(0, Vec::new(), document)?;

        debug!(
            nodes = self.nodes.len(),
            documents = self.documents.len(),
            "compiled schema"
        );

        Ok(SchemaModel {
            nodes: self.nodes,
            root,
            documents: self.documents.into_iter().map(|d| d.url).collect(),
        })
    }

    fn compile_at(&mut self, doc: usize, location: Vec<String>, value: &'a Value) -> Result<NodeId> {
        let key = (doc, pointer(&location));
        if let Some(&id) = self.compiled.get(&key) {
            return Ok(id);
        }

        self.in_progress.insert(key.clone());
        let (form, extra) = match value {
            Value::Bool(b) => (Form::Boolean(*b), Map::new()),
            Value::Object(obj) => match obj.get("$ref") {
                Some(reference) => self.compile_ref(doc, &location, obj, reference)?,
                None => {
                    let (keywords, extra) = self.compile_keywords(doc, &location, obj)?;
                    (Form::Keywords(Box::new(keywords)), extra)
                }
            },
            _ => {
                return Err(SchemaCompileError::new(
                    CompileErrorKind::InvalidSchema,
                    key.1,
                ))
            }
        };
        self.in_progress.remove(&key);

        let id = NodeId(self.nodes.len());
        self.nodes.push(Schema {
            document: doc,
            location,
            form,
            extra,
        });
        self.compiled.insert(key, id);
        Ok(id)
    }

    fn compile_ref(
        &mut self,
        doc: usize,
        location: &[String],
        obj: &'a Map<String, Value>,
        reference: &'a Value,
    ) -> Result<(Form, Map<String, Value>)> {
        let at = pointer(&child(location, "$ref"));
        let uri = reference
            .as_str()
            .ok_or_else(|| SchemaCompileError::invalid_keyword(at.clone(), "$ref", "a string"))?;

        let target = self.resolve(doc, &at, uri)?;

        // Keywords next to $ref are not enforced in Draft 7.
        let extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "$ref")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok((
            Form::Ref(Reference {
                uri: uri.to_owned(),
                target,
            }),
            extra,
        ))
    }

    fn resolve(&mut self, doc: usize, at: &str, uri: &str) -> Result<NodeId> {
        let unsupported = || {
            SchemaCompileError::new(
                CompileErrorKind::UnsupportedReference {
                    reference: uri.to_owned(),
                },
                at,
            )
        };
        let dangling = || {
            SchemaCompileError::new(
                CompileErrorKind::DanglingReference {
                    reference: uri.to_owned(),
                },
                at,
            )
        };

        let (target_doc, fragment) = if uri.starts_with('#') {
            (doc, uri.to_owned())
        } else {
            let joined = match &self.documents[doc].url {
                Some(base) => base.join(uri),
                None => Url::parse(uri),
            };
            let mut url = joined.map_err(|_| unsupported())?;
            let fragment = format!("#{}", url.fragment().unwrap_or(""));
            url.set_fragment(None);
            (self.document_index(url).ok_or_else(dangling)?, fragment)
        };

        let ptr: JsonPointer<String, Vec<String>> =
            fragment.parse().map_err(|_| unsupported())?;
        let target = ptr
            .get(self.documents[target_doc].root)
            .map_err(|_| dangling())?;

        let key = (target_doc, ptr.to_string());
        if self.in_progress.contains(&key) {
            return Err(SchemaCompileError::new(
                CompileErrorKind::CyclicReference {
                    reference: uri.to_owned(),
                },
                at,
            ));
        }

        trace!(reference = uri, target = %key.1, document = target_doc, "resolved reference");
        self.compile_at(target_doc, tokens(&key.1), target)
    }

    fn document_index(&mut self, url: Url) -> Option<usize> {
        if let Some(index) = self
            .documents
            .iter()
            .position(|d| d.url.as_ref() == Some(&url))
        {
            return Some(index);
        }

        let root = self.registry.get(&url)?;
        self.documents.push(Document {
            url: Some(url),
            root,
        });
        Some(self.documents.len() - 1)
    }

    fn compile_keywords(
        &mut self,
        doc: usize,
        location: &[String],
        obj: &'a Map<String, Value>,
    ) -> Result<(Keywords, Map<String, Value>)> {
        let mut kw = Keywords::default();
        let mut extra = Map::new();
        let mut exclusive_min_flag = false;
        let mut exclusive_max_flag = false;

        for (keyword, value) in obj {
            let path = child(location, keyword);
            let k = keyword.as_str();
            match k {
                "type" => kw.types = Some(types(&path, value)?),
                "enum" => {
                    let values = value
                        .as_array()
                        .filter(|values| !values.is_empty())
                        .ok_or_else(|| invalid(&path, k, "a non-empty array"))?;
                    kw.enumeration = Some(values.clone());
                }
                "const" => kw.constant = Some(value.clone()),

                "minimum" => {
                    kw.minimum = Some(Limit {
                        value: number(&path, k, value)?,
                        exclusive: false,
                    })
                }
                "maximum" => {
                    kw.maximum = Some(Limit {
                        value: number(&path, k, value)?,
                        exclusive: false,
                    })
                }
                "exclusiveMinimum" => match value {
                    Value::Bool(flag) => exclusive_min_flag = *flag,
                    _ => kw.exclusive_minimum = Some(number(&path, k, value)?),
                },
                "exclusiveMaximum" => match value {
                    Value::Bool(flag) => exclusive_max_flag = *flag,
                    _ => kw.exclusive_maximum = Some(number(&path, k, value)?),
                },
                "multipleOf" => {
                    let n = number(&path, k, value)?;
                    if n <= 0.0 {
                        return Err(invalid(&path, k, "a number greater than 0"));
                    }
                    kw.multiple_of = Some(n);
                }

                "minLength" => kw.min_length = Some(count(&path, k, value)?),
                "maxLength" => kw.max_length = Some(count(&path, k, value)?),
                "pattern" => kw.pattern = Some(pattern(&path, k, value)?),
                "format" => {
                    let name = value.as_str().ok_or_else(|| invalid(&path, k, "a string"))?;
                    kw.format = Some(name.to_owned());
                }

                "items" => {
                    kw.items = Some(match value {
                        Value::Array(schemas) => {
                            let mut ids = Vec::with_capacity(schemas.len());
                            for (i, schema) in schemas.iter().enumerate() {
                                ids.push(self.subschema(doc, child(&path, &i.to_string()), k, schema)?);
                            }
                            Items::Tuple(ids)
                        }
                        _ => Items::Single(self.subschema(doc, path, k, value)?),
                    })
                }
                "additionalItems" => kw.additional_items = self.additional(doc, path, k, value)?,
                "contains" => kw.contains = Some(self.subschema(doc, path, k, value)?),
                "minItems" => kw.min_items = Some(count(&path, k, value)?),
                "maxItems" => kw.max_items = Some(count(&path, k, value)?),
                "uniqueItems" => {
                    kw.unique_items = value.as_bool().ok_or_else(|| invalid(&path, k, "a boolean"))?
                }

                "properties" => kw.properties = self.schema_map(doc, &path, k, value)?,
                "patternProperties" => {
                    let obj = value.as_object().ok_or_else(|| invalid(&path, k, "an object"))?;
                    for (source, schema) in obj {
                        let source_path = child(&path, source);
                        let compiled = pattern(&source_path, k, &Value::String(source.clone()))?;
                        let id = self.subschema(doc, source_path, k, schema)?;
                        kw.pattern_properties.push((compiled, id));
                    }
                }
                "additionalProperties" => {
                    kw.additional_properties = self.additional(doc, path, k, value)?
                }
                "required" => kw.required = strings(&path, k, value)?,
                "minProperties" => kw.min_properties = Some(count(&path, k, value)?),
                "maxProperties" => kw.max_properties = Some(count(&path, k, value)?),
                "propertyNames" => kw.property_names = Some(self.subschema(doc, path, k, value)?),
                "dependencies" => {
                    let obj = value.as_object().ok_or_else(|| invalid(&path, k, "an object"))?;
                    for (property, dependency) in obj {
                        let dep_path = child(&path, property);
                        let dependency = match dependency {
                            Value::Array(_) => Dependency::Properties(strings(&dep_path, k, dependency)?),
                            _ => Dependency::Schema(self.subschema(doc, dep_path, k, dependency)?),
                        };
                        kw.dependencies.insert(property.clone(), dependency);
                    }
                }

                "allOf" => kw.all_of = self.schema_array(doc, &path, k, value)?,
                "anyOf" => kw.any_of = self.schema_array(doc, &path, k, value)?,
                "oneOf" => kw.one_of = self.schema_array(doc, &path, k, value)?,
                "not" => kw.not = Some(self.subschema(doc, path, k, value)?),

                "if" => kw.condition = Some(self.subschema(doc, path, k, value)?),
                "then" => kw.then = Some(self.subschema(doc, path, k, value)?),
                "else" => kw.otherwise = Some(self.subschema(doc, path, k, value)?),

                "definitions" => kw.definitions = self.schema_map(doc, &path, k, value)?,

                "$schema" | "$id" => {
                    if !value.is_string() {
                        return Err(invalid(&path, k, "a string"));
                    }
                    extra.insert(keyword.clone(), value.clone());
                }
                _ => {
                    trace!(keyword = k, "keyword kept as annotation");
                    extra.insert(keyword.clone(), value.clone());
                }
            }
        }

        if let Some(limit) = kw.minimum.as_mut() {
            limit.exclusive = exclusive_min_flag;
        }
        if let Some(limit) = kw.maximum.as_mut() {
            limit.exclusive = exclusive_max_flag;
        }

        Ok((kw, extra))
    }

    fn subschema(
        &mut self,
        doc: usize,
        path: Vec<String>,
        keyword: &str,
        value: &'a Value,
    ) -> Result<NodeId> {
        if !value.is_object() && !value.is_boolean() {
            return Err(invalid(&path, keyword, "a schema"));
        }
        self.compile_at(doc, path, value)
    }

    fn additional(
        &mut self,
        doc: usize,
        path: Vec<String>,
        keyword: &str,
        value: &'a Value,
    ) -> Result<Option<Additional>> {
        Ok(match value {
            Value::Bool(true) => None,
            Value::Bool(false) => Some(Additional::Forbidden),
            _ => Some(Additional::Schema(self.subschema(doc, path, keyword, value)?)),
        })
    }

    fn schema_array(
        &mut self,
        doc: usize,
        path: &[String],
        keyword: &str,
        value: &'a Value,
    ) -> Result<Vec<NodeId>> {
        let schemas = match value.as_array() {
            Some(schemas) if !schemas.is_empty() => schemas,
            _ => return Err(invalid(path, keyword, "a non-empty array of schemas")),
        };

        let mut ids = Vec::with_capacity(schemas.len());
        for (i, schema) in schemas.iter().enumerate() {
            ids.push(self.subschema(doc, child(path, &i.to_string()), keyword, schema)?);
        }
        Ok(ids)
    }

    fn schema_map(
        &mut self,
        doc: usize,
        path: &[String],
        keyword: &str,
        value: &'a Value,
    ) -> Result<BTreeMap<String, NodeId>> {
        let obj = value
            .as_object()
            .ok_or_else(|| invalid(path, keyword, "an object of schemas"))?;

        let mut ids = BTreeMap::new();
        for (name, schema) in obj {
            let id = self.subschema(doc, child(path, name), keyword, schema)?;
            ids.insert(name.clone(), id);
        }
        Ok(ids)
    }
}

fn invalid(path: &[String], keyword: &str, expected: &'static str) -> SchemaCompileError {
    SchemaCompileError::invalid_keyword(pointer(path), keyword, expected)
}

fn types(path: &[String], value: &Value) -> Result<Vec<Type>> {
    const EXPECTED: &str = "a type name or a non-empty array of type names";
    let parse = |v: &Value| {
        v.as_str()
            .and_then(Type::from_name)
            .ok_or_else(|| invalid(path, "type", EXPECTED))
    };

    match value {
        Value::String(_) => Ok(vec![parse(value)?]),
        Value::Array(names) if !names.is_empty() => {
            let mut types = Vec::with_capacity(names.len());
            for name in names {
                let t = parse(name)?;
                if !types.contains(&t) {
                    types.push(t);
                }
            }
            Ok(types)
        }
        _ => Err(invalid(path, "type", EXPECTED)),
    }
}

fn number(path: &[String], keyword: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| invalid(path, keyword, "a number"))
}

fn count(path: &[String], keyword: &str, value: &Value) -> Result<usize> {
    if let Some(n) = value.as_u64() {
        return Ok(n as usize);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as usize),
        _ => Err(invalid(path, keyword, "a non-negative integer")),
    }
}

fn strings(path: &[String], keyword: &str, value: &Value) -> Result<Vec<String>> {
    const EXPECTED: &str = "an array of unique strings";
    let items = value
        .as_array()
        .ok_or_else(|| invalid(path, keyword, EXPECTED))?;

    let mut strings: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) if !strings.iter().any(|seen| seen == s) => strings.push(s.to_owned()),
            _ => return Err(invalid(path, keyword, EXPECTED)),
        }
    }
    Ok(strings)
}

fn pattern(path: &[String], keyword: &str, value: &Value) -> Result<Pattern> {
    value
        .as_str()
        .and_then(|source| Regex::new(source).ok())
        .map(Pattern)
        .ok_or_else(|| invalid(path, keyword, "a valid regular expression"))
}

fn child(location: &[String], token: &str) -> Vec<String> {
    let mut path = Vec::with_capacity(location.len() + 1);
    path.extend_from_slice(location);
    path.push(token.to_owned());
    path
}

/// Render tokens as a JSON Pointer string.
pub(crate) fn pointer(tokens: &[String]) -> String {
    JsonPointer::<String, &[String]>::new(tokens).to_string()
}

/// Split a rendered JSON Pointer back into unescaped tokens.
fn tokens(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}
