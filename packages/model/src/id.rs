use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a schema node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Generate a schema seed from the protocol name using CRC32
pub fn get_schema_id(protocol_name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(protocol_name.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for schema nodes within one protocol
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(protocol_name: &str) -> Self {
        Self {
            seed: get_schema_id(protocol_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    /// Skip past every id already issued under this seed.
    ///
    /// Loaded forests may contain ids minted by an earlier session; the
    /// counter resumes after the highest one so new ids never collide.
    pub fn resume_after<'a>(&mut self, existing: impl IntoIterator<Item = &'a NodeId>) {
        let prefix = format!("{}-", self.seed);
        for id in existing {
            if let Some(n) = id
                .as_str()
                .strip_prefix(&prefix)
                .and_then(|rest| rest.parse::<u32>().ok())
            {
                self.count = self.count.max(n);
            }
        }
    }

    /// Get schema seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_id_generation() {
        let id1 = get_schema_id("Aortic Dissection Registry");
        let id2 = get_schema_id("aortic dissection registry ");

        // Case and surrounding whitespace do not change the seed
        assert_eq!(id1, id2);

        let id3 = get_schema_id("Stroke Outcomes");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("registry");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.as_str().ends_with("-1"));
        assert!(id2.as_str().ends_with("-2"));
        assert!(id1.as_str().starts_with(gen.seed()));
    }

    #[test]
    fn test_resume_after_existing_ids() {
        let mut gen = IdGenerator::from_seed("abc".to_string());
        let existing = vec![
            NodeId::new("abc-4"),
            NodeId::new("abc-12"),
            NodeId::new("other-99"),
            NodeId::new("abc-x"),
        ];

        gen.resume_after(&existing);

        assert_eq!(gen.new_id(), NodeId::new("abc-13"));
    }
}
