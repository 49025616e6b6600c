//! Document templates.
//!
//! The generated document mirrors the forest shape with sample values
//! chosen from each node's data type. It never contains collected data;
//! it shows consumers what a filled record will look like.

use serde_json::{json, Map, Value};
use workbench_common::{walk_section, Visitor};
use workbench_model::{DataType, Forest, SchemaNode};

/// Build the nested placeholder document for a forest.
///
/// Keys keep forest order. When two siblings share a key the later
/// value wins but keeps the first key's position.
pub fn generate_document(forest: &Forest) -> Value {
    let mut builder = DocumentBuilder {
        stack: vec![Map::new()],
    };
    builder.visit_forest(forest);
    Value::Object(builder.stack.pop().unwrap_or_default())
}

/// Key under which a node appears in the document
pub fn document_key(node: &SchemaNode) -> String {
    let custom = node
        .custom_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    match custom {
        Some(name) => name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_"),
        None => node.variable_id.clone(),
    }
}

/// Sample value for a leaf node
pub fn placeholder(node: &SchemaNode) -> Value {
    match node.data_type {
        DataType::Boolean => Value::Bool(true),
        DataType::Continuous => json!(42),
        DataType::MultiSelect => json!(["option1", "option2"]),
        DataType::Grid => json!({ "row1": 1, "row2": 2 }),
        DataType::RankedMatrix => json!({ "item1": 1, "item2": 2, "item3": 3 }),
        DataType::CategoricalGrid if !node.grid_categories.is_empty() => {
            let cells = node
                .grid_items
                .iter()
                .zip(node.grid_categories.iter().cycle())
                .map(|(item, category)| (item.clone(), Value::String(category.clone())))
                .collect::<Map<_, _>>();
            Value::Object(cells)
        }
        _ => Value::String("value".to_string()),
    }
}

struct DocumentBuilder {
    stack: Vec<Map<String, Value>>,
}

impl DocumentBuilder {
    fn emit(&mut self, key: String, value: Value) {
        if let Some(object) = self.stack.last_mut() {
            object.insert(key, value);
        }
    }
}

impl Visitor for DocumentBuilder {
    fn visit_section(&mut self, forest: &Forest, section: &SchemaNode, _parent: Option<&SchemaNode>) {
        self.stack.push(Map::new());
        walk_section(self, forest, section);
        let nested = self.stack.pop().unwrap_or_default();
        self.emit(document_key(section), Value::Object(nested));
    }

    fn visit_field(&mut self, field: &SchemaNode, _parent: Option<&SchemaNode>) {
        self.emit(document_key(field), placeholder(field));
    }
}
