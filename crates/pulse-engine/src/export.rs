//! Tabular report export.
//!
//! Serializes the top-posts table as RFC 4180 CSV. Empty data produces a
//! header-only report, never an error.

use crate::error::AnalyticsError;
use crate::ranking::RankedPost;

const HEADER: &str =
    "rank,post_id,username,content,like_count,comment_count,engagement_score,created_at";

/// Serialize ranked posts as CSV, one row per post.
pub fn export_report(rows: &[RankedPost]) -> Result<String, AnalyticsError> {
    let mut out = String::from(HEADER);
    out.push('\n');

    for row in rows {
        let fields = [
            row.rank.to_string(),
            row.post_id.to_string(),
            row.username.clone(),
            row.content.clone(),
            row.like_count.to_string(),
            row.comment_count.to_string(),
            row.engagement_score.to_string(),
            row.created_at.to_rfc3339(),
        ];
        let encoded: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&encoded.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Quote a field per RFC 4180 when it contains a comma, quote, or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
