use arbitrem_navigator::AssociationReport;
use serde_json::{json, Value};
use std::path::Path;

pub fn render_summary(navigator: &Path, report: &AssociationReport) -> String {
    let mut text = String::new();
    text.push_str(&format!("Processed navigator file {}.\n", navigator.display()));
    text.push_str(&format!(
        "{} hole/area maps are set to acquire, and {} points for high-magnification acquisition were processed.\n",
        report.maps(),
        report.total_points
    ));
    text.push_str(&format!(
        "There are {:?} points per map. Please check that this makes sense by referring to information listed in the SerialEM navigator panel.",
        report.points_per_map()
    ));
    text
}

pub fn render_anchor_lines(report: &AssociationReport) -> Vec<String> {
    report
        .anchors
        .iter()
        .map(|anchor| {
            format!(
                "Navigator index {} is an acquisition template and contains {} points.",
                anchor.record_index,
                anchor.points.len()
            )
        })
        .collect()
}

/// Where the derived index files ended up, for `--verbose`
pub fn render_written_lines(output_dir: &Path, report: &AssociationReport) -> Vec<String> {
    let (indices, guide) = arbitrem_navigator::output_paths(output_dir);
    vec![
        format!("Wrote {} lines to {}.", report.indices_lines, indices.display()),
        format!("Wrote {} lines to {}.", report.guide_lines, guide.display()),
    ]
}

pub fn render_json(navigator: &Path, report: &AssociationReport) -> Value {
    json!({
        "navigator": navigator.display().to_string(),
        "records": report.records,
        "maps": report.maps(),
        "points": report.total_points,
        "points_per_map": report.points_per_map(),
        "indices_lines": report.indices_lines,
        "guide_lines": report.guide_lines,
        "anchors": report.anchors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitrem_navigator::AnchorAssociation;
    use pretty_assertions::assert_eq;

    fn report() -> AssociationReport {
        AssociationReport {
            records: 5,
            anchors: vec![
                AnchorAssociation {
                    record_index: 0,
                    points: vec![2, 3],
                    guide_end: 2,
                },
                AnchorAssociation {
                    record_index: 3,
                    points: vec![5],
                    guide_end: 3,
                },
            ],
            total_points: 3,
            indices_lines: 2,
            guide_lines: 5,
        }
    }

    #[test]
    fn summary_mentions_counts_and_average() {
        let text = render_summary(Path::new("grid.nav"), &report());
        assert!(text.starts_with("Processed navigator file grid.nav.\n"));
        assert!(text.contains("2 hole/area maps are set to acquire, and 3 points"));
        assert!(text.contains("There are 1.5 points per map."));
    }

    #[test]
    fn anchor_lines_use_zero_based_record_index() {
        assert_eq!(
            render_anchor_lines(&report()),
            vec![
                "Navigator index 0 is an acquisition template and contains 2 points.",
                "Navigator index 3 is an acquisition template and contains 1 points.",
            ]
        );
    }

    #[test]
    fn json_carries_anchor_details() {
        let value = render_json(Path::new("grid.nav"), &report());
        assert_eq!(value["maps"], 2);
        assert_eq!(value["points"], 3);
        assert_eq!(value["points_per_map"], 1.5);
        assert_eq!(value["anchors"][1]["points"], json!([5]));
        assert_eq!(value["anchors"][1]["guide_end"], 3);
        assert_eq!(value["indices_lines"], 2);
        assert_eq!(value["guide_lines"], 5);
    }

    #[test]
    fn written_lines_name_both_files() {
        let lines = render_written_lines(Path::new("out"), &report());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Wrote 2 lines to out"), "{}", lines[0]);
        assert!(lines[0].ends_with("pointIndices.txt."), "{}", lines[0]);
        assert!(lines[1].starts_with("Wrote 5 lines to out"), "{}", lines[1]);
        assert!(lines[1].ends_with("indexGuide.txt."), "{}", lines[1]);
    }
}
