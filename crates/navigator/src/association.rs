use crate::config::{AssociationConfig, IndicesLayout};
use crate::error::{NavigatorError, Result};
use crate::output::IndexWriters;
use crate::record::NavigatorRecord;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Points matched to one acquisition anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorAssociation {
    /// 0-based position of the anchor record
    pub record_index: usize,

    /// 1-based positions of the matched point records, in record order
    pub points: Vec<usize>,

    /// Running matched-point total once this anchor's points are counted
    pub guide_end: usize,
}

impl AnchorAssociation {
    /// Indices-file rendering: each point prefixed by a space, e.g. `" 2 5"`
    #[must_use]
    pub fn indices_line(&self) -> String {
        self.points.iter().map(|p| format!(" {p}")).collect()
    }
}

/// Outcome of a full association pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationReport {
    /// Navigator records processed
    pub records: usize,

    /// One entry per anchor, in record order
    pub anchors: Vec<AnchorAssociation>,

    /// Matched points summed over all anchors
    pub total_points: usize,

    /// Lines written to the indices file
    pub indices_lines: usize,

    /// Lines written to the guide file; always equal to `records`
    pub guide_lines: usize,
}

impl AssociationReport {
    /// Number of anchors (view-maps set to acquire)
    #[must_use]
    pub fn maps(&self) -> usize {
        self.anchors.len()
    }

    /// Average matched points per anchor, rounded to 2 decimals.
    ///
    /// Rounds the exact binary value half-to-even, so 1/8 gives 0.12 and
    /// 5/8 gives 0.62, matching the numbers operators already compare against.
    #[must_use]
    pub fn points_per_map(&self) -> f64 {
        if self.anchors.is_empty() {
            return 0.0;
        }
        let ratio = self.total_points as f64 / self.anchors.len() as f64;
        format!("{ratio:.2}").parse().unwrap_or(ratio)
    }
}

/// Matches point records to the acquisition anchors whose view-map covers them.
///
/// A single pass over the records in order. For every anchor (`Acquire = 1`)
/// each point record (`Type = 0`) within the radius is collected, in record
/// order, including the anchor itself when it is also a point.
///
/// Known quirk kept for compatibility: the guide file receives the running
/// total after *every* record, not only after anchors, so it has exactly one
/// line per navigator record. Downstream acquisition scripts index into it
/// by record position.
#[derive(Debug, Clone)]
pub struct AssociationEngine {
    config: AssociationConfig,
}

impl AssociationEngine {
    pub fn new(config: AssociationConfig) -> Result<Self> {
        config.validate().map_err(NavigatorError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &AssociationConfig {
        &self.config
    }

    /// Matching radius in micrometers
    #[must_use]
    pub fn radius_um(&self) -> f64 {
        self.config.radius_um()
    }

    /// Run the pass and stream the indices and guide lines into `out`.
    ///
    /// `out` is flushed before returning on every path, so whatever was
    /// written before a failure stays on disk. Returns
    /// [`NavigatorError::NoAnchors`] after a complete pass that found no
    /// anchor.
    pub fn run<I: Write, G: Write>(
        &self,
        records: &[NavigatorRecord],
        out: &mut IndexWriters<I, G>,
    ) -> Result<AssociationReport> {
        let outcome = self.run_pass(records, out);
        let flushed = out.flush();
        let report = outcome?;
        flushed?;

        if report.anchors.is_empty() {
            return Err(NavigatorError::NoAnchors {
                records: report.records,
            });
        }
        Ok(report)
    }

    /// Compute the associations without writing any files
    pub fn associate(&self, records: &[NavigatorRecord]) -> Result<AssociationReport> {
        let mut out = IndexWriters::new(io::sink(), io::sink());
        self.run(records, &mut out)
    }

    /// 0-based positions of the point records within the radius of the
    /// record at `anchor_index`
    pub fn points_within(
        &self,
        records: &[NavigatorRecord],
        anchor_index: usize,
    ) -> Result<Vec<usize>> {
        let points = point_indices(records);
        self.collect_matches(records, anchor_index, &points)
    }

    fn run_pass<I: Write, G: Write>(
        &self,
        records: &[NavigatorRecord],
        out: &mut IndexWriters<I, G>,
    ) -> Result<AssociationReport> {
        let points = point_indices(records);
        let mut anchors = Vec::new();
        let mut total_points = 0usize;
        let indices_start = out.indices_lines();
        let guide_start = out.guide_lines();

        log::debug!(
            "associating {} point records with anchors in {} records (radius {} um)",
            points.len(),
            records.len(),
            self.radius_um()
        );

        for (index, record) in records.iter().enumerate() {
            if record.is_anchor() {
                let matched = self.collect_matches(records, index, &points)?;
                total_points += matched.len();
                let association = AnchorAssociation {
                    record_index: index,
                    points: matched.iter().map(|j| j + 1).collect(),
                    guide_end: total_points,
                };
                log::debug!(
                    "navigator index {index} is an acquisition template with {} points",
                    association.points.len()
                );
                out.write_indices_line(&association.indices_line())?;
                anchors.push(association);
            } else if self.config.indices_layout == IndicesLayout::PerRecord {
                out.write_indices_line("")?;
            }
            out.write_guide_total(total_points)?;
        }

        let report = AssociationReport {
            records: records.len(),
            anchors,
            total_points,
            indices_lines: out.indices_lines() - indices_start,
            guide_lines: out.guide_lines() - guide_start,
        };
        log::debug!(
            "wrote {} indices lines and {} guide lines",
            report.indices_lines,
            report.guide_lines
        );
        Ok(report)
    }

    fn collect_matches(
        &self,
        records: &[NavigatorRecord],
        anchor_index: usize,
        points: &[usize],
    ) -> Result<Vec<usize>> {
        // The anchor is only measured when there is something to measure it against.
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let anchor = records
            .get(anchor_index)
            .ok_or_else(|| {
                NavigatorError::malformed(anchor_index, "no such navigator record")
            })?
            .stage_position(anchor_index)?;

        let radius = self.radius_um();
        let mut matched = Vec::new();
        for &j in points {
            let position = records[j].stage_position(j)?;
            if anchor.distance(&position) <= radius {
                matched.push(j);
            }
        }
        Ok(matched)
    }
}

fn point_indices(records: &[NavigatorRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_point())
        .map(|(index, _)| index)
        .collect()
}
