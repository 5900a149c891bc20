use crate::error::{NavigatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field carrying the item type code
pub const TYPE_FIELD: &str = "Type";
/// Field carrying the acquisition flag
pub const ACQUIRE_FIELD: &str = "Acquire";
/// Field carrying the stage coordinates in micrometers
pub const STAGE_XYZ_FIELD: &str = "StageXYZ";

/// `Type` code of a point record
pub const POINT_TYPE: &str = "0";
/// `Acquire` value of an acquisition anchor
pub const ACQUIRE_ON: &str = "1";

/// One parsed navigator item.
///
/// The fields the association engine reads are typed slots; every other
/// `key = value` line is kept verbatim in `extra`. A record's identity is its
/// position in the parsed sequence, never any field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorRecord {
    /// Value of the header line, e.g. `12` for `[Item = 12]`
    pub item_label: String,

    /// `Type` field (`"0"` marks a point record)
    pub item_type: Option<String>,

    /// `Acquire` field (`"1"` marks an acquisition anchor)
    pub acquire: Option<String>,

    /// Raw `StageXYZ` field
    pub stage_xyz: Option<String>,

    /// All other fields, unmodified
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl NavigatorRecord {
    /// Create an empty record opened by a header carrying `item_label`
    pub fn new(item_label: impl Into<String>) -> Self {
        Self {
            item_label: item_label.into(),
            ..Default::default()
        }
    }

    /// Set a field, routing the known keys to their typed slots.
    ///
    /// A repeated key overwrites the earlier value.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            TYPE_FIELD => self.item_type = Some(value),
            ACQUIRE_FIELD => self.acquire = Some(value),
            STAGE_XYZ_FIELD => self.stage_xyz = Some(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Builder: set a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Look up any field by its navigator key
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            TYPE_FIELD => self.item_type.as_deref(),
            ACQUIRE_FIELD => self.acquire.as_deref(),
            STAGE_XYZ_FIELD => self.stage_xyz.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Number of fields set on this record
    #[must_use]
    pub fn field_count(&self) -> usize {
        [&self.item_type, &self.acquire, &self.stage_xyz]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
            + self.extra.len()
    }

    /// Whether this record is a point record (`Type = 0`)
    #[must_use]
    pub fn is_point(&self) -> bool {
        self.item_type.as_deref() == Some(POINT_TYPE)
    }

    /// Whether this record is an acquisition anchor (`Acquire = 1`)
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        self.acquire.as_deref() == Some(ACQUIRE_ON)
    }

    /// Stage X/Y of this record.
    ///
    /// `index` is the record's 0-based position, used only for error context.
    pub fn stage_position(&self, index: usize) -> Result<StagePosition> {
        let raw = self.stage_xyz.as_deref().ok_or_else(|| {
            NavigatorError::malformed(index, format!("missing {STAGE_XYZ_FIELD} field"))
        })?;
        StagePosition::parse(raw).map_err(|reason| NavigatorError::malformed(index, reason))
    }
}

/// Planar stage position in micrometers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StagePosition {
    pub x: f64,
    pub y: f64,
}

impl StagePosition {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse the first two whitespace-separated tokens of a `StageXYZ` value.
    /// Anything after Y (normally Z) is ignored.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let mut tokens = raw.split_whitespace();
        let x = parse_axis(tokens.next(), "X", raw)?;
        let y = parse_axis(tokens.next(), "Y", raw)?;
        Ok(Self { x, y })
    }

    /// Euclidean distance to another position
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &StagePosition) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

fn parse_axis(token: Option<&str>, axis: &str, raw: &str) -> std::result::Result<f64, String> {
    let token = token.ok_or_else(|| format!("{STAGE_XYZ_FIELD} '{raw}' has no {axis} coordinate"))?;
    token
        .parse::<f64>()
        .map_err(|_| format!("{STAGE_XYZ_FIELD} '{raw}' has non-numeric {axis} coordinate '{token}'"))
}
