use crate::equality::{is_multiple_of, json_equal};
use crate::schema::{Additional, Dependency, Form, Items, Keywords, NodeId, SchemaModel, Type};
use crate::validator::{Config, CountBound, PathToken, RangeBound, Violation, ViolationKind};
use serde_json::Value;
use std::borrow::Cow;
use std::mem;
use tracing::trace;

pub fn validate(
    config: &Config,
    max_errors: usize,
    model: &SchemaModel,
    instance: &Value,
) -> Vec<Violation> {
    let mut vm = Vm {
        config,
        model,
        max_errors,
        instance_tokens: vec![],
        schema_tokens: vec![vec![]],
        schema_documents: vec![model.root_node().document],
        errors: vec![],
    };

    match vm.eval(model.root(), instance) {
        Ok(()) | Err(MaxErrorsReached) => {}
    }

    trace!(violations = vm.errors.len(), "validated instance");
    vm.errors
}

struct MaxErrorsReached;

struct Vm<'a> {
    config: &'a Config,
    model: &'a SchemaModel,
    max_errors: usize,
    instance_tokens: Vec<PathToken>,
    schema_tokens: Vec<Vec<Cow<'a, str>>>,
    schema_documents: Vec<usize>,
    errors: Vec<Violation>,
}

type Eval = Result<(), MaxErrorsReached>;

impl<'a> Vm<'a> {
    fn eval(&mut self, id: NodeId, instance: &Value) -> Eval {
        let model = self.model;
        match model.node(id).form() {
            Form::Boolean(true) => {}
            Form::Boolean(false) => {
                let message = format!("{} is not allowed by a false schema", instance);
                self.push_err(ViolationKind::FalseSchema, message)?;
            }
            Form::Ref(reference) => {
                // Paths below a $ref are reported relative to the target.
                let target = model.node(reference.target);
                self.schema_tokens
                    .push(target.location().iter().map(|t| Cow::Borrowed(t.as_str())).collect());
                self.schema_documents.push(target.document);
                self.eval(reference.target, instance)?;
                self.schema_documents.pop();
                self.schema_tokens.pop();
            }
            Form::Keywords(keywords) => {
                self.eval_generic(keywords, instance)?;
                match instance {
                    Value::Null | Value::Bool(_) => {}
                    Value::Number(_) => self.eval_number(keywords, instance)?,
                    Value::String(s) => self.eval_string(keywords, s)?,
                    Value::Array(items) => self.eval_array(keywords, items)?,
                    Value::Object(obj) => self.eval_object(keywords, instance, obj)?,
                }
                self.eval_composition(keywords, instance)?;
            }
        }

        Ok(())
    }

    fn eval_generic(&mut self, kw: &'a Keywords, instance: &Value) -> Eval {
        if let Some(types) = &kw.types {
            let found = Type::of(instance);
            if !types.iter().any(|t| t.accepts(found)) {
                let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
                let message = format!("{} is not of type {}", instance, names.join(", "));
                let kind = ViolationKind::TypeMismatch {
                    expected: types.clone(),
                    found,
                };
                self.keyword_err("type", kind, message)?;
            }
        }

        if let Some(values) = &kw.enumeration {
            if !values.iter().any(|v| json_equal(v, instance)) {
                let message = format!("{} is not one of {}", instance, Value::Array(values.clone()));
                self.keyword_err("enum", ViolationKind::EnumViolation, message)?;
            }
        }

        if let Some(constant) = &kw.constant {
            if !json_equal(constant, instance) {
                let message = format!("{} was expected", constant);
                self.keyword_err("const", ViolationKind::ConstViolation, message)?;
            }
        }

        Ok(())
    }

    fn eval_number(&mut self, kw: &'a Keywords, instance: &Value) -> Eval {
        let (number, value) = match (instance, instance.as_f64()) {
            (Value::Number(number), Some(value)) => (number, value),
            _ => return Ok(()),
        };

        if let Some(limit) = kw.minimum {
            let (fails, bound) = if limit.exclusive {
                (value <= limit.value, RangeBound::ExclusiveMinimum)
            } else {
                (value < limit.value, RangeBound::Minimum)
            };
            if fails {
                let message = format!("{} is less than the minimum of {}", instance, limit.value);
                let kind = ViolationKind::RangeViolation {
                    bound,
                    limit: limit.value,
                };
                self.keyword_err("minimum", kind, message)?;
            }
        }

        if let Some(limit) = kw.exclusive_minimum {
            if value <= limit {
                let message = format!("{} is less than or equal to the minimum of {}", instance, limit);
                let kind = ViolationKind::RangeViolation {
                    bound: RangeBound::ExclusiveMinimum,
                    limit,
                };
                self.keyword_err("exclusiveMinimum", kind, message)?;
            }
        }

        if let Some(limit) = kw.maximum {
            let (fails, bound) = if limit.exclusive {
                (value >= limit.value, RangeBound::ExclusiveMaximum)
            } else {
                (value > limit.value, RangeBound::Maximum)
            };
            if fails {
                let message = format!("{} is greater than the maximum of {}", instance, limit.value);
                let kind = ViolationKind::RangeViolation {
                    bound,
                    limit: limit.value,
                };
                self.keyword_err("maximum", kind, message)?;
            }
        }

        if let Some(limit) = kw.exclusive_maximum {
            if value >= limit {
                let message = format!("{} is greater than or equal to the maximum of {}", instance, limit);
                let kind = ViolationKind::RangeViolation {
                    bound: RangeBound::ExclusiveMaximum,
                    limit,
                };
                self.keyword_err("exclusiveMaximum", kind, message)?;
            }
        }

        if let Some(multiple_of) = kw.multiple_of {
            if !is_multiple_of(number, multiple_of) {
                let message = format!("{} is not a multiple of {}", instance, multiple_of);
                let kind = ViolationKind::MultipleOfViolation { multiple_of };
                self.keyword_err("multipleOf", kind, message)?;
            }
        }

        Ok(())
    }

    fn eval_string(&mut self, kw: &'a Keywords, s: &str) -> Eval {
        if kw.min_length.is_some() || kw.max_length.is_some() {
            let length = s.chars().count();

            if let Some(limit) = kw.min_length {
                if length < limit {
                    let message = format!("{:?} is shorter than {} characters", s, limit);
                    let kind = ViolationKind::LengthViolation {
                        bound: CountBound::Min,
                        limit,
                    };
                    self.keyword_err("minLength", kind, message)?;
                }
            }

            if let Some(limit) = kw.max_length {
                if length > limit {
                    let message = format!("{:?} is longer than {} characters", s, limit);
                    let kind = ViolationKind::LengthViolation {
                        bound: CountBound::Max,
                        limit,
                    };
                    self.keyword_err("maxLength", kind, message)?;
                }
            }
        }

        if let Some(pattern) = &kw.pattern {
            if !pattern.is_match(s) {
                let message = format!("{:?} does not match {:?}", s, pattern.as_str());
                let kind = ViolationKind::PatternViolation {
                    pattern: pattern.as_str().to_owned(),
                };
                self.keyword_err("pattern", kind, message)?;
            }
        }

        if let Some(format) = &kw.format {
            if let Some(check) = self.config.format_checker(format) {
                if !check(s) {
                    let message = format!("{:?} is not a {:?}", s, format);
                    let kind = ViolationKind::FormatViolation {
                        format: format.clone(),
                    };
                    self.keyword_err("format", kind, message)?;
                }
            }
        }

        Ok(())
    }

    fn eval_array(&mut self, kw: &'a Keywords, items: &[Value]) -> Eval {
        if let Some(limit) = kw.min_items {
            if items.len() < limit {
                let message = format!("expected at least {} items, found {}", limit, items.len());
                let kind = ViolationKind::ItemCountViolation {
                    bound: CountBound::Min,
                    limit,
                };
                self.keyword_err("minItems", kind, message)?;
            }
        }

        if let Some(limit) = kw.max_items {
            if items.len() > limit {
                let message = format!("expected at most {} items, found {}", limit, items.len());
                let kind = ViolationKind::ItemCountViolation {
                    bound: CountBound::Max,
                    limit,
                };
                self.keyword_err("maxItems", kind, message)?;
            }
        }

        if kw.unique_items {
            if let Some((first, second)) = first_duplicate(items) {
                let message = format!("items {} and {} are equal", first, second);
                let kind = ViolationKind::UniqueItemsViolation { first, second };
                self.keyword_err("uniqueItems", kind, message)?;
            }
        }

        match &kw.items {
            None => {}
            Some(Items::Single(id)) => {
                self.push_schema_token("items");
                for (i, item) in items.iter().enumerate() {
                    self.push_instance_token(PathToken::Index(i));
                    self.eval(*id, item)?;
                    self.pop_instance_token();
                }
                self.pop_schema_token();
            }
            Some(Items::Tuple(ids)) => {
                self.push_schema_token("items");
                for (i, (id, item)) in ids.iter().zip(items).enumerate() {
                    self.push_schema_token(i.to_string());
                    self.push_instance_token(PathToken::Index(i));
                    self.eval(*id, item)?;
                    self.pop_instance_token();
                    self.pop_schema_token();
                }
                self.pop_schema_token();

                if let Some(additional) = &kw.additional_items {
                    self.push_schema_token("additionalItems");
                    for (i, item) in items.iter().enumerate().skip(ids.len()) {
                        match additional {
                            Additional::Forbidden => {
                                let message = format!("additional item {} is not allowed", i);
                                let kind = ViolationKind::AdditionalItemNotAllowed { index: i };
                                self.push_err(kind, message)?;
                            }
                            Additional::Schema(id) => {
                                self.push_instance_token(PathToken::Index(i));
                                self.eval(*id, item)?;
                                self.pop_instance_token();
                            }
                        }
                    }
                    self.pop_schema_token();
                }
            }
        }

        if let Some(id) = kw.contains {
            self.push_schema_token("contains");
            let mut found = false;
            for item in items {
                if self.eval_branch(id, item).is_empty() {
                    found = true;
                    break;
                }
            }
            if !found {
                let message = "no item is valid under the contains schema".to_owned();
                self.push_err(ViolationKind::ContainsViolation, message)?;
            }
            self.pop_schema_token();
        }

        Ok(())
    }

    fn eval_object(
        &mut self,
        kw: &'a Keywords,
        instance: &Value,
        obj: &serde_json::Map<String, Value>,
    ) -> Eval {
        if let Some(limit) = kw.min_properties {
            if obj.len() < limit {
                let message = format!("expected at least {} properties, found {}", limit, obj.len());
                let kind = ViolationKind::PropertyCountViolation {
                    bound: CountBound::Min,
                    limit,
                };
                self.keyword_err("minProperties", kind, message)?;
            }
        }

        if let Some(limit) = kw.max_properties {
            if obj.len() > limit {
                let message = format!("expected at most {} properties, found {}", limit, obj.len());
                let kind = ViolationKind::PropertyCountViolation {
                    bound: CountBound::Max,
                    limit,
                };
                self.keyword_err("maxProperties", kind, message)?;
            }
        }

        if !kw.required.is_empty() {
            self.push_schema_token("required");
            for name in &kw.required {
                if !obj.contains_key(name) {
                    let message = format!("{:?} is a required property", name);
                    let kind = ViolationKind::RequiredPropertyMissing {
                        property_name: name.clone(),
                    };
                    self.push_err(kind, message)?;
                }
            }
            self.pop_schema_token();
        }

        for (key, value) in obj {
            let mut declared = false;

            if let Some((name, id)) = kw.properties.get_key_value(key) {
                declared = true;
                self.push_schema_token("properties");
                self.push_schema_token(name.as_str());
                self.push_instance_token(PathToken::Key(key.clone()));
                self.eval(*id, value)?;
                self.pop_instance_token();
                self.pop_schema_token();
                self.pop_schema_token();
            }

            for (pattern, id) in &kw.pattern_properties {
                if pattern.is_match(key) {
                    declared = true;
                    self.push_schema_token("patternProperties");
                    self.push_schema_token(pattern.as_str());
                    self.push_instance_token(PathToken::Key(key.clone()));
                    self.eval(*id, value)?;
                    self.pop_instance_token();
                    self.pop_schema_token();
                    self.pop_schema_token();
                }
            }

            if declared {
                continue;
            }

            match &kw.additional_properties {
                None => {}
                Some(Additional::Forbidden) => {
                    self.push_schema_token("additionalProperties");
                    let message = format!(
                        "additional properties are not allowed ({:?} was unexpected)",
                        key
                    );
                    let kind = ViolationKind::AdditionalPropertyNotAllowed {
                        property_name: key.clone(),
                    };
                    self.push_err(kind, message)?;
                    self.pop_schema_token();
                }
                Some(Additional::Schema(id)) => {
                    self.push_schema_token("additionalProperties");
                    self.push_instance_token(PathToken::Key(key.clone()));
                    self.eval(*id, value)?;
                    self.pop_instance_token();
                    self.pop_schema_token();
                }
            }
        }

        if let Some(id) = kw.property_names {
            self.push_schema_token("propertyNames");
            for key in obj.keys() {
                self.eval(id, &Value::String(key.clone()))?;
            }
            self.pop_schema_token();
        }

        for (property, dependency) in &kw.dependencies {
            if !obj.contains_key(property) {
                continue;
            }

            self.push_schema_token("dependencies");
            self.push_schema_token(property.as_str());
            match dependency {
                Dependency::Properties(names) => {
                    for name in names {
                        if !obj.contains_key(name) {
                            let message = format!("{:?} is a dependency of {:?}", name, property);
                            let kind = ViolationKind::DependencyMissing {
                                property_name: property.clone(),
                                dependency: name.clone(),
                            };
                            self.push_err(kind, message)?;
                        }
                    }
                }
                Dependency::Schema(id) => self.eval(*id, instance)?,
            }
            self.pop_schema_token();
            self.pop_schema_token();
        }

        Ok(())
    }

    fn eval_composition(&mut self, kw: &'a Keywords, instance: &Value) -> Eval {
        if !kw.all_of.is_empty() {
            self.push_schema_token("allOf");
            for (i, id) in kw.all_of.iter().enumerate() {
                self.push_schema_token(i.to_string());
                self.eval(*id, instance)?;
                self.pop_schema_token();
            }
            self.pop_schema_token();
        }

        if !kw.any_of.is_empty() {
            self.push_schema_token("anyOf");
            let mut branches = Vec::with_capacity(kw.any_of.len());
            for (i, id) in kw.any_of.iter().enumerate() {
                self.push_schema_token(i.to_string());
                let violations = self.eval_branch(*id, instance);
                self.pop_schema_token();

                if violations.is_empty() {
                    branches.clear();
                    break;
                }
                branches.push(violations);
            }

            if !branches.is_empty() {
                let message = format!("{} is not valid under any of the given schemas", instance);
                self.push_err(ViolationKind::AnyOfViolation { branches }, message)?;
            }
            self.pop_schema_token();
        }

        if !kw.one_of.is_empty() {
            self.push_schema_token("oneOf");
            let mut matched = Vec::new();
            for (i, id) in kw.one_of.iter().enumerate() {
                self.push_schema_token(i.to_string());
                if self.eval_branch(*id, instance).is_empty() {
                    matched.push(i);
                }
                self.pop_schema_token();
            }

            if matched.len() != 1 {
                let message = if matched.is_empty() {
                    format!("{} is not valid under any of the given schemas", instance)
                } else {
                    format!("{} is valid under each of the schemas {:?}", instance, matched)
                };
                let kind = ViolationKind::OneOfViolation {
                    matched: matched.len(),
                };
                self.push_err(kind, message)?;
            }
            self.pop_schema_token();
        }

        if let Some(id) = kw.not {
            self.push_schema_token("not");
            if self.eval_branch(id, instance).is_empty() {
                let message = format!("{} should not be valid under the negated schema", instance);
                self.push_err(ViolationKind::NotViolation, message)?;
            }
            self.pop_schema_token();
        }

        if let Some(condition) = kw.condition {
            if kw.then.is_some() || kw.otherwise.is_some() {
                let holds = self.eval_branch(condition, instance).is_empty();
                let (keyword, branch) = if holds {
                    ("then", kw.then)
                } else {
                    ("else", kw.otherwise)
                };

                if let Some(id) = branch {
                    self.push_schema_token(keyword);
                    self.eval(id, instance)?;
                    self.pop_schema_token();
                }
            }
        }

        Ok(())
    }

    /// Evaluate a sub-schema to completion without reporting, returning what
    /// it would have reported.
    fn eval_branch(&mut self, id: NodeId, instance: &Value) -> Vec<Violation> {
        let outer_errors = mem::take(&mut self.errors);
        let outer_max = mem::replace(&mut self.max_errors, 0);

        // With no limit, evaluation runs to completion.
        match self.eval(id, instance) {
            Ok(()) | Err(MaxErrorsReached) => {}
        }

        self.max_errors = outer_max;
        mem::replace(&mut self.errors, outer_errors)
    }

    fn keyword_err(&mut self, keyword: &'a str, kind: ViolationKind, message: String) -> Eval {
        self.push_schema_token(keyword);
        self.push_err(kind, message)?;
        self.pop_schema_token();
        Ok(())
    }

    fn push_schema_token<T: Into<Cow<'a, str>>>(&mut self, token: T) {
        self.schema_tokens
            .last_mut()
            .expect("unreachable: empty schema stack")
            .push(token.into());
    }

    fn pop_schema_token(&mut self) {
        self.schema_tokens
            .last_mut()
            .expect("unreachable: empty schema stack")
            .pop();
    }

    fn push_instance_token(&mut self, token: PathToken) {
        self.instance_tokens.push(token);
    }

    fn pop_instance_token(&mut self) {
        self.instance_tokens.pop();
    }

    fn push_err(&mut self, kind: ViolationKind, message: String) -> Eval {
        let schema_path = self
            .schema_tokens
            .last()
            .expect("unreachable: empty schema stack")
            .iter()
            .map(|token| token.to_string())
            .collect();

        let document = self
            .schema_documents
            .last()
            .and_then(|&doc| self.model.documents[doc].clone());

        self.errors.push(
            Violation::new(self.instance_tokens.clone(), schema_path, kind, message)
                .with_schema_document(document),
        );

        if self.errors.len() == self.max_errors {
            Err(MaxErrorsReached)
        } else {
            Ok(())
        }
    }
}

/// The first pair of equal items, by position of the second item.
fn first_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    for (second, b) in items.iter().enumerate() {
        for (first, a) in items[..second].iter().enumerate() {
            if json_equal(a, b) {
                return Some((first, second));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use serde_json::json;

    fn violations(schema: Value, instance: Value) -> Vec<Violation> {
        let model = SchemaModel::compile(&schema).unwrap();
        Validator::new().validate(&model, &instance)
    }

    fn kinds(schema: Value, instance: Value) -> Vec<ViolationKind> {
        violations(schema, instance)
            .into_iter()
            .map(|v| v.kind().clone())
            .collect()
    }

    #[test]
    fn checks_do_not_short_circuit() {
        let found = kinds(
            json!({ "type": "string", "enum": ["a", "b"], "const": "a" }),
            json!(3),
        );

        assert_eq!(
            found,
            vec![
                ViolationKind::TypeMismatch {
                    expected: vec![Type::String],
                    found: Type::Integer,
                },
                ViolationKind::EnumViolation,
                ViolationKind::ConstViolation,
            ]
        );
    }

    #[test]
    fn integer_type_rejects_fractions() {
        let schema = json!({ "type": "integer" });
        assert!(violations(schema.clone(), json!(4)).is_empty());
        assert!(violations(schema.clone(), json!(4.0)).is_empty());
        assert_eq!(violations(schema, json!(4.5)).len(), 1);
    }

    #[test]
    fn numeric_bounds() {
        let schema = json!({
            "minimum": 0,
            "exclusiveMaximum": 10,
            "multipleOf": 0.5,
        });

        assert!(violations(schema.clone(), json!(0)).is_empty());
        assert!(violations(schema.clone(), json!(9.5)).is_empty());
        assert_eq!(
            kinds(schema.clone(), json!(10)),
            vec![ViolationKind::RangeViolation {
                bound: RangeBound::ExclusiveMaximum,
                limit: 10.0,
            }]
        );
        assert_eq!(
            kinds(schema, json!(-0.25)),
            vec![
                ViolationKind::RangeViolation {
                    bound: RangeBound::Minimum,
                    limit: 0.0,
                },
                ViolationKind::MultipleOfViolation { multiple_of: 0.5 },
            ]
        );
    }

    #[test]
    fn draft4_exclusive_minimum() {
        let schema = json!({ "minimum": 1, "exclusiveMinimum": true });
        let found = violations(schema, json!(1));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].schema_path(), &["minimum"]);
        assert_eq!(
            found[0].kind(),
            &ViolationKind::RangeViolation {
                bound: RangeBound::ExclusiveMinimum,
                limit: 1.0,
            }
        );
    }

    #[test]
    fn string_length_counts_code_points() {
        let schema = json!({ "minLength": 2, "maxLength": 3 });
        assert!(violations(schema.clone(), json!("日本語")).is_empty());
        assert_eq!(
            kinds(schema, json!("ü")),
            vec![ViolationKind::LengthViolation {
                bound: CountBound::Min,
                limit: 2,
            }]
        );
    }

    #[test]
    fn pattern_is_unanchored() {
        let schema = json!({ "pattern": "fix" });
        assert!(violations(schema.clone(), json!("bugfix: typo")).is_empty());
        assert_eq!(violations(schema, json!("feat: x")).len(), 1);
    }

    #[test]
    fn array_items_extend_paths() {
        let found = violations(
            json!({ "items": { "type": "string" }, "maxItems": 2 }),
            json!(["ok", 1, null]),
        );

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].schema_path(), &["maxItems"]);
        assert_eq!(found[1].instance_path(), &[PathToken::Index(1)]);
        assert_eq!(found[1].schema_path(), &["items", "type"]);
        assert_eq!(found[2].instance_path(), &[PathToken::Index(2)]);
    }

    #[test]
    fn tuple_items_and_additional_items() {
        let schema = json!({
            "items": [{ "type": "string" }, { "type": "string" }],
            "additionalItems": false,
        });

        assert!(violations(schema.clone(), json!(["qmark", "fg:#ff9d00 bold"])).is_empty());
        assert!(violations(schema.clone(), json!(["qmark"])).is_empty());

        let found = violations(schema, json!(["qmark", "bold", "extra"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), &ViolationKind::AdditionalItemNotAllowed { index: 2 });
        assert_eq!(found[0].schema_path(), &["additionalItems"]);
    }

    #[test]
    fn unique_items_uses_structural_equality() {
        let schema = json!({ "uniqueItems": true });
        assert!(violations(schema.clone(), json!([1, "1", [1]])).is_empty());
        assert_eq!(
            kinds(schema, json!([{ "a": 1 }, 2, { "a": 1.0 }])),
            vec![ViolationKind::UniqueItemsViolation { first: 0, second: 2 }]
        );
    }

    #[test]
    fn contains() {
        let schema = json!({ "contains": { "const": "cz_conventional_commits" } });
        assert!(violations(schema.clone(), json!(["a", "cz_conventional_commits"])).is_empty());
        assert_eq!(kinds(schema.clone(), json!([])), vec![ViolationKind::ContainsViolation]);
        assert_eq!(kinds(schema, json!(["a"])), vec![ViolationKind::ContainsViolation]);
    }

    #[test]
    fn required_properties() {
        let found = violations(
            json!({ "required": ["name", "version"] }),
            json!({ "version": "1.0.0" }),
        );

        assert_eq!(found.len(), 1);
        assert!(found[0].instance_path().is_empty());
        assert_eq!(found[0].schema_path(), &["required"]);
        assert_eq!(
            found[0].kind(),
            &ViolationKind::RequiredPropertyMissing {
                property_name: "name".to_owned()
            }
        );
    }

    #[test]
    fn additional_properties() {
        let schema = json!({
            "properties": { "name": { "type": "string" } },
            "patternProperties": { "^x-": {} },
            "additionalProperties": false,
        });

        assert!(violations(schema.clone(), json!({ "name": "cz", "x-editor": 1 })).is_empty());
        assert_eq!(
            kinds(schema, json!({ "name": "cz", "nmae": "typo" })),
            vec![ViolationKind::AdditionalPropertyNotAllowed {
                property_name: "nmae".to_owned()
            }]
        );
    }

    #[test]
    fn additional_properties_schema() {
        let found = violations(
            json!({
                "properties": { "name": {} },
                "additionalProperties": { "type": "string" },
            }),
            json!({ "name": 1, "feature": "MINOR", "fix": 2 }),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path(), &[PathToken::from("fix")]);
        assert_eq!(found[0].schema_path(), &["additionalProperties", "type"]);
    }

    #[test]
    fn pattern_properties_paths() {
        let found = violations(
            json!({ "patternProperties": { "^[a-z]+$": { "type": "string" } } }),
            json!({ "feature": 1, "Fix": 2 }),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path(), &[PathToken::from("feature")]);
        assert_eq!(found[0].schema_path(), &["patternProperties", "^[a-z]+$", "type"]);
    }

    #[test]
    fn property_names_and_counts() {
        let schema = json!({
            "propertyNames": { "pattern": "^[a-z_]+$" },
            "maxProperties": 1,
        });

        let found = kinds(schema, json!({ "ok_name": 1, "Bad-Name": 2 }));
        assert_eq!(
            found,
            vec![
                ViolationKind::PropertyCountViolation {
                    bound: CountBound::Max,
                    limit: 1,
                },
                ViolationKind::PatternViolation {
                    pattern: "^[a-z_]+$".to_owned()
                },
            ]
        );
    }

    #[test]
    fn dependencies() {
        let schema = json!({
            "dependencies": {
                "changelog_incremental": ["changelog_file"],
                "customize": { "properties": { "name": { "const": "cz_customize" } } },
            }
        });

        assert!(violations(schema.clone(), json!({ "changelog_file": "CHANGELOG.md" })).is_empty());
        assert_eq!(
            kinds(schema.clone(), json!({ "changelog_incremental": true })),
            vec![ViolationKind::DependencyMissing {
                property_name: "changelog_incremental".to_owned(),
                dependency: "changelog_file".to_owned(),
            }]
        );

        let found = violations(schema, json!({ "customize": {}, "name": "cz_jira" }));
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].schema_path(),
            &["dependencies", "customize", "properties", "name", "const"]
        );
    }

    #[test]
    fn any_of_reports_every_branch() {
        let found = violations(
            json!({ "anyOf": [{ "type": "string" }, { "type": "array", "minItems": 1 }] }),
            json!([]),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].schema_path(), &["anyOf"]);
        match found[0].kind() {
            ViolationKind::AnyOfViolation { branches } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0][0].schema_path(), &["anyOf", "0", "type"]);
                assert_eq!(branches[1][0].schema_path(), &["anyOf", "1", "minItems"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn all_of_aggregates_branch_violations() {
        let found = kinds(
            json!({ "allOf": [{ "type": "string" }, { "minLength": 3 }, { "pattern": "^v" }] }),
            json!("1"),
        );

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn one_of_counts_matches() {
        let schema = json!({ "oneOf": [{ "type": "integer" }, { "type": "number" }] });
        assert!(violations(schema.clone(), json!(1.5)).is_empty());
        assert_eq!(kinds(schema.clone(), json!(1)), vec![ViolationKind::OneOfViolation { matched: 2 }]);
        assert_eq!(kinds(schema, json!("1")), vec![ViolationKind::OneOfViolation { matched: 0 }]);
    }

    #[test]
    fn not() {
        let schema = json!({ "not": { "type": "null" } });
        assert!(violations(schema.clone(), json!(false)).is_empty());
        assert_eq!(kinds(schema, json!(null)), vec![ViolationKind::NotViolation]);
    }

    #[test]
    fn if_then_else() {
        let schema = json!({
            "if": { "properties": { "name": { "const": "cz_customize" } } },
            "then": { "required": ["customize"] },
            "else": { "not": { "required": ["customize"] } },
        });

        assert!(violations(schema.clone(), json!({ "name": "cz_customize", "customize": {} })).is_empty());
        assert!(violations(schema.clone(), json!({ "name": "cz_jira" })).is_empty());

        let found = violations(schema.clone(), json!({ "name": "cz_customize" }));
        assert_eq!(found[0].schema_path(), &["then", "required"]);

        let found = violations(schema, json!({ "name": "cz_jira", "customize": {} }));
        assert_eq!(found[0].schema_path(), &["else", "not"]);
    }

    #[test]
    fn false_schema() {
        assert_eq!(
            kinds(json!({ "properties": { "legacy": false } }), json!({ "legacy": 1 })),
            vec![ViolationKind::FalseSchema]
        );
    }

    #[test]
    fn ref_paths_are_relative_to_the_target() {
        let found = violations(
            json!({
                "definitions": { "hooks": { "type": "array", "items": { "type": "string" } } },
                "properties": { "pre_bump_hooks": { "$ref": "#/definitions/hooks" } },
            }),
            json!({ "pre_bump_hooks": ["echo", 1] }),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance_path(), &[PathToken::from("pre_bump_hooks"), PathToken::Index(1)]);
        assert_eq!(found[0].schema_path(), &["definitions", "hooks", "items", "type"]);
    }

    #[test]
    fn max_errors_halts_inside_composition() {
        let model = SchemaModel::compile(&json!({
            "allOf": [{ "type": "string" }, { "type": "string" }],
            "anyOf": [{ "type": "string" }],
        }))
        .unwrap();

        let mut config = Config::new();
        config.max_errors(2);
        let found = Validator::new_with_config(config).validate(&model, &json!(1));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn shared_definitions_are_evaluated_per_path() {
        let model = SchemaModel::compile(&json!({
            "definitions": {
                "d0": { "type": "string" },
                "d1": { "allOf": [{ "$ref": "#/definitions/d0" }, { "$ref": "#/definitions/d0" }] },
                "d2": { "allOf": [{ "$ref": "#/definitions/d1" }, { "$ref": "#/definitions/d1" }] },
                "d3": { "allOf": [{ "$ref": "#/definitions/d2" }, { "$ref": "#/definitions/d2" }] }
            },
            "allOf": [{ "$ref": "#/definitions/d3" }]
        }))
        .unwrap();

        // One node per definition, but every path through them reports.
        let found = Validator::new().validate(&model, &json!(1));
        assert_eq!(found.len(), 8);
        assert!(found.iter().all(|v| v.schema_path() == &["definitions", "d0", "type"]));

        let mut config = Config::new();
        config.max_errors(1);
        assert_eq!(Validator::new_with_config(config).validate(&model, &json!(1)).len(), 1);
    }
}
