//! Export document shape and backup framing.
//!
//! The export document is the portable JSON form of a registry:
//!
//! ```text
//! {
//!   "components":    [Component, ...]     ordered by id
//!   "changeLog":     [ChangeRecord, ...]  append order, ids ascending
//!   "isLocked":      bool
//!   "backupCount":   int
//!   "totalSize":     number
//!   "exportedAt":    int (ms since epoch)
//!   "formatVersion": "1.0.0"
//! }
//! ```
//!
//! A backup blob wraps the same document in a small binary frame:
//!
//! ```text
//! +--------+-----------------+------------------------+
//! | "CRB1" | crc32 (u32, LE) | export document (JSON) |
//! +--------+-----------------+------------------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::registry::{ChangeLog, ChangeRecord, Component, RegistryState, Timestamp};

use super::error::SnapshotError;
use super::version::FormatVersion;

/// Magic bytes at the start of every backup blob.
pub const BACKUP_MAGIC: [u8; 4] = *b"CRB1";

const HEADER_LEN: usize = 8;

/// Allowed drift between the recorded and recomputed total size.
const SIZE_TOLERANCE: f64 = 1e-9;

/// Portable serialization of a whole registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub components: Vec<Component>,
    pub change_log: Vec<ChangeRecord>,
    pub is_locked: bool,
    pub backup_count: u64,
    pub total_size: f64,
    pub exported_at: Timestamp,
    pub format_version: String,
}

impl ExportDocument {
    /// Capture `state` as of `exported_at`.
    pub fn from_state(state: &RegistryState, exported_at: Timestamp) -> Self {
        Self {
            components: state.components().cloned().collect(),
            change_log: state.change_log().as_slice().to_vec(),
            is_locked: state.is_locked(),
            backup_count: state.backup_count(),
            total_size: state.total_size(),
            exported_at,
            format_version: FormatVersion::CURRENT.to_string(),
        }
    }

    /// Validate the document and rebuild the registry state it describes.
    pub fn into_state(self) -> Result<RegistryState, SnapshotError> {
        let version: FormatVersion = self
            .format_version
            .parse()
            .map_err(|e| SnapshotError::Import(format!("{}", e)))?;
        if !FormatVersion::CURRENT.can_read(&version) {
            return Err(SnapshotError::Import(format!(
                "unsupported format version {} (this build reads {})",
                version,
                FormatVersion::CURRENT
            )));
        }

        let change_log = ChangeLog::try_from(self.change_log)
            .map_err(|e| SnapshotError::Import(e.to_string()))?;
        let state = RegistryState::from_parts(
            self.components,
            change_log,
            self.is_locked,
            self.backup_count,
        )
        .map_err(|e| SnapshotError::Import(e.to_string()))?;

        let computed = state.total_size();
        if (computed - self.total_size).abs() > SIZE_TOLERANCE * computed.abs().max(1.0) {
            return Err(SnapshotError::Import(format!(
                "totalSize {} does not match the sum of component sizes {}",
                self.total_size, computed
            )));
        }

        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document; malformed or incomplete input is an import error.
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(input).map_err(|e| SnapshotError::Import(e.to_string()))
    }
}

/// Frame a document as a backup blob.
pub fn encode_backup(document: &ExportDocument) -> Result<Vec<u8>, SnapshotError> {
    let payload = serde_json::to_vec(document)?;
    let checksum = crc32fast::hash(&payload);

    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len());
    blob.extend_from_slice(&BACKUP_MAGIC);
    blob.extend_from_slice(&checksum.to_le_bytes());
    blob.extend_from_slice(&payload);
    Ok(blob)
}

/// Unframe and parse a backup blob. Errors are reasons, not yet tied to a key.
pub fn decode_backup(blob: &[u8]) -> Result<ExportDocument, String> {
    let (magic, rest) = blob
        .split_first_chunk::<4>()
        .ok_or_else(|| format!("blob too short: {} bytes", blob.len()))?;
    if magic != &BACKUP_MAGIC {
        return Err("bad magic bytes".to_string());
    }
    let (checksum, payload) = rest
        .split_first_chunk::<4>()
        .ok_or_else(|| format!("blob too short: {} bytes", blob.len()))?;
    let expected = u32::from_le_bytes(*checksum);
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(format!(
            "checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        ));
    }
    serde_json::from_slice(payload).map_err(|e| format!("undecodable payload: {}", e))
}
