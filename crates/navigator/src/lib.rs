//! # ArbitrEM Navigator
//!
//! Reads a microscope navigator session file and associates previously
//! marked points with the view-map templates that will image them.
//!
//! ## Architecture
//!
//! ```text
//! Navigator text
//!     │
//!     ├──> NavigatorParser → Vec<NavigatorRecord>   (file order = identity)
//!     │
//!     └──> AssociationEngine (radius = diameter / 2)
//!          ├─> for every anchor (Acquire = 1): points (Type = 0) within radius
//!          ├─> pointIndices.txt  one line of 1-based point indices per anchor
//!          └─> indexGuide.txt    running matched-point total per record
//! ```
//!
//! Two behaviours are kept exactly as existing acquisition scripts expect
//! them: the last record of a navigator file is never emitted by the parser,
//! and the guide file gets one line per record rather than per anchor.
//!
//! ## Example
//!
//! ```rust
//! use arbitrem_navigator::{AssociationConfig, AssociationEngine, NavigatorParser};
//!
//! let text = "\
//! [Item = 1]
//! Type = 2
//! Acquire = 1
//! StageXYZ = 0 0 0
//! [Item = 2]
//! Type = 0
//! StageXYZ = 1 0 0
//! [Item = 3]
//! Type = 0
//! StageXYZ = 10 0 0
//! [Item = end]
//! ";
//!
//! let records = NavigatorParser::parse_str(text);
//! let engine = AssociationEngine::new(AssociationConfig::with_diameter(4.0)).unwrap();
//! let report = engine.associate(&records).unwrap();
//!
//! assert_eq!(report.anchors[0].indices_line(), " 2");
//! assert_eq!(report.points_per_map(), 1.0);
//! ```

mod association;
mod config;
mod error;
mod output;
mod parser;
mod record;

pub use association::{AnchorAssociation, AssociationEngine, AssociationReport};
pub use config::{AssociationConfig, IndicesLayout};
pub use error::{NavigatorError, Result};
pub use output::{output_paths, FileIndexWriters, IndexWriters, GUIDE_FILE_NAME, INDICES_FILE_NAME};
pub use parser::NavigatorParser;
pub use record::{
    NavigatorRecord, StagePosition, ACQUIRE_FIELD, ACQUIRE_ON, POINT_TYPE, STAGE_XYZ_FIELD,
    TYPE_FIELD,
};
