use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use workbench_model::{Forest, PersistedNode};

/// Envelope format version
pub const EXPORT_VERSION: &str = "1.0";

/// Downloadable schema envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaExport {
    pub version: String,

    /// RFC 3339 UTC timestamp
    pub exported_at: String,

    pub protocol_name: String,

    pub schema_blocks: Vec<PersistedNode>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Number of root blocks
    pub block_count: usize,

    /// Number of nodes at every depth, sections included
    pub total_fields: usize,
}

/// Wrap the persisted forest in a versioned envelope
pub fn export_schema(forest: &Forest, protocol_name: &str) -> SchemaExport {
    let export = SchemaExport {
        version: EXPORT_VERSION.to_string(),
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        protocol_name: protocol_name.to_string(),
        schema_blocks: forest.to_persisted(),
        metadata: ExportMetadata {
            block_count: forest.roots().len(),
            total_fields: forest.len(),
        },
    };

    info!(
        protocol = protocol_name,
        blocks = export.metadata.block_count,
        fields = export.metadata.total_fields,
        "Exported schema"
    );
    export
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use workbench_model::{DataType, NodeId, SchemaNode};

    #[test]
    fn test_envelope_shape() {
        let mut edit = Forest::new().edit();
        edit.insert(SchemaNode::section("s", Some("Labs"))).unwrap();
        edit.insert(SchemaNode::field("f", "Sodium", DataType::Continuous)).unwrap();
        edit.insert(SchemaNode::field("g", "Notes", DataType::Text)).unwrap();
        edit.attach(&NodeId::new("s"), None, None).unwrap();
        edit.attach(&NodeId::new("f"), Some(&NodeId::new("s")), None).unwrap();
        edit.attach(&NodeId::new("g"), None, None).unwrap();
        let forest = edit.finish();

        let export = export_schema(&forest, "Heart Failure Registry");
        assert_eq!(export.version, "1.0");
        assert_eq!(export.protocol_name, "Heart Failure Registry");
        assert_eq!(
            export.metadata,
            ExportMetadata {
                block_count: 2,
                total_fields: 3
            }
        );
        assert!(DateTime::parse_from_rfc3339(&export.exported_at).is_ok());

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["metadata"]["blockCount"], 2);
        assert_eq!(value["schemaBlocks"][0]["children"][0]["id"], "f");
        assert!(value.get("exportedAt").is_some());
    }

    #[test]
    fn test_empty_forest() {
        let export = export_schema(&Forest::new(), "protocol");
        assert!(export.schema_blocks.is_empty());
        assert_eq!(export.metadata.total_fields, 0);
    }
}
