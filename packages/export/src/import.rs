//! Schema import.
//!
//! Accepts an exported envelope or a bare array of persisted blocks.
//! Malformed root blocks are skipped and reported; the rest are given
//! fresh ids so they can be merged into a live session without
//! collisions.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use workbench_model::{
    Category, Forest, ForestError, IdGenerator, NodeId, PersistedNode, RoleTag, SchemaNode,
};

const REQUIRED_FIELDS: [&str; 4] = ["id", "variableId", "dataType", "role"];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid format: missing schemaBlocks array or direct block array")]
    MissingBlocks,

    #[error("schemaBlocks must be an array")]
    NotAnArray,

    #[error("Schema contains no blocks")]
    Empty,

    #[error("No valid blocks: {}", .0.join("; "))]
    NoValidBlocks(Vec<String>),

    #[error("Invalid structure: {0}")]
    Structure(#[from] ForestError),
}

/// Imported forest plus the per-block problems that were skipped
#[derive(Debug)]
pub struct ImportOutcome {
    pub forest: Forest,
    pub errors: Vec<String>,
}

/// Validate and rebuild a forest from exported JSON
pub fn import_schema(json: &str, ids: &mut IdGenerator) -> Result<ImportOutcome, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let blocks = match value {
        Value::Array(blocks) => blocks,
        Value::Object(mut envelope) => match envelope.remove("schemaBlocks") {
            Some(Value::Array(blocks)) => blocks,
            Some(_) => return Err(ImportError::NotAnArray),
            None => return Err(ImportError::MissingBlocks),
        },
        _ => return Err(ImportError::MissingBlocks),
    };

    if blocks.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut errors = Vec::new();
    let mut roots = Vec::new();
    for (index, mut block) in blocks.into_iter().enumerate() {
        if let Err(reason) = check_required(&block) {
            errors.push(format!("Block {index}: {reason}"));
            continue;
        }
        normalize_category(&mut block);
        match serde_json::from_value::<PersistedNode>(block) {
            Ok(root) => roots.push(root),
            Err(err) => errors.push(format!("Block {index}: {err}")),
        }
    }

    if roots.is_empty() {
        return Err(ImportError::NoValidBlocks(errors));
    }

    let mut renamed = HashMap::new();
    for root in &mut roots {
        regenerate(root, None, ids, &mut renamed);
    }
    for root in &mut roots {
        rewrite_dependencies(root, &renamed);
    }

    let forest = Forest::from_persisted(roots)?;
    info!(
        nodes = forest.len(),
        skipped = errors.len(),
        "Imported schema"
    );
    Ok(ImportOutcome { forest, errors })
}

fn check_required(block: &Value) -> Result<(), String> {
    let Some(object) = block.as_object() else {
        return Err("Expected an object".to_string());
    };
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields ({})", missing.join(", ")))
    }
}

/// Unknown or absent categories become `Other` so inference can replace them
fn normalize_category(block: &mut Value) {
    let Some(object) = block.as_object_mut() else {
        return;
    };
    let known = object
        .get("category")
        .is_some_and(|category| serde_json::from_value::<Category>(category.clone()).is_ok());
    if !known {
        object.insert("category".to_string(), Value::String(Category::Other.to_string()));
    }
    if let Some(Value::Array(children)) = object.get_mut("children") {
        children.iter_mut().for_each(normalize_category);
    }
}

fn regenerate(
    block: &mut PersistedNode,
    parent: Option<&NodeId>,
    ids: &mut IdGenerator,
    renamed: &mut HashMap<NodeId, NodeId>,
) {
    let id = ids.new_id();
    renamed.insert(block.node.id.clone(), id.clone());
    block.node.id = id.clone();
    block.node.category = infer_category(&block.node);
    block.parent_id = parent.cloned();

    for child in block.children.iter_mut().flatten() {
        regenerate(child, Some(&id), ids, renamed);
    }
}

fn rewrite_dependencies(block: &mut PersistedNode, renamed: &HashMap<NodeId, NodeId>) {
    for dependency in &mut block.node.dependencies {
        if let Some(id) = renamed.get(dependency) {
            *dependency = id.clone();
        } else {
            debug!(node_id = %block.node.id, dependency = %dependency, "Dependency points outside import");
        }
    }
    for child in block.children.iter_mut().flatten() {
        rewrite_dependencies(child, renamed);
    }
}

fn contains_any(name: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| name.contains(needle))
}

/// Pick a category for an imported node.
///
/// Sections are always structural. A specific stored category is kept;
/// `Structural` and `Other` on a field are replaced by a guess from role,
/// endpoint tier and name, falling back to `Clinical`.
pub fn infer_category(node: &SchemaNode) -> Category {
    if node.is_section() {
        return Category::Structural;
    }
    if !matches!(node.category, Category::Structural | Category::Other) {
        return node.category;
    }
    if node.role == RoleTag::Outcome || node.endpoint_tier.is_some() {
        return Category::Endpoints;
    }

    let name = node.display_name().to_lowercase();
    let table: [(&[&str], Category); 11] = [
        (
            &["age", "sex", "gender", "race", "ethnicity", "birth", "demographic"],
            Category::Demographics,
        ),
        (
            &["treatment", "intervention", "therapy", "drug", "dose", "medication"],
            Category::Treatments,
        ),
        (
            &["lab", "blood", "serum", "urine", "hemoglobin", "creatinine", "glucose"],
            Category::Laboratory,
        ),
        (
            &[
                "vital", "pressure", "heart_rate", "pulse", "temperature", "weight", "height", "bmi",
            ],
            Category::Vitals,
        ),
        (&["adverse", "safety", "toxicity", "side_effect"], Category::Safety),
        (
            &["outcome", "endpoint", "efficacy", "response", "survival", "mortality"],
            Category::Endpoints,
        ),
        (
            &["score", "scale", "questionnaire", "survey", "assessment"],
            Category::Clinical,
        ),
        (
            &["diagnosis", "disease", "condition", "symptom", "clinical"],
            Category::Clinical,
        ),
        (&["history", "past"], Category::MedicalHistory),
        (
            &["imaging", "scan", "mri", "ct", "xray", "ultrasound"],
            Category::Imaging,
        ),
        (&["procedure", "surgery", "operation"], Category::Procedures),
    ];

    table
        .iter()
        .find(|(needles, _)| contains_any(&name, needles))
        .map(|(_, category)| *category)
        .or_else(|| contains_any(&name, &["quality", "qol", "life"]).then_some(Category::QualityOfLife))
        .unwrap_or(Category::Clinical)
}
