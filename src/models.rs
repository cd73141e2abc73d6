// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A poll as stored and served: a title plus an ordered list of options.
///
/// Option identity is positional. The index of an option in `options` is
/// what the vote endpoint accepts, so order must be preserved end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollOption {
    pub label: String,
    #[serde(default)]
    pub votes: i64,
}

/// One row of the admin poll listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
}

/// Body of `POST /api/vote`. Both fields are optional so a missing field
/// surfaces as a 400 from the handler rather than a deserialization reject.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub poll_id: Option<i64>,
    pub option_index: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<PollOption>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub title: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOptionsRequest {
    pub options: Vec<PollOption>,
}

/// Derived results view: never persisted, recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResults {
    pub id: i64,
    pub title: String,
    pub total_votes: i64,
    pub results: Vec<OptionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionResult {
    pub label: String,
    pub votes: i64,
    pub percentage: i64,
}

impl Poll {
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|opt| opt.votes).sum()
    }

    /// Results breakdown with integer percentage shares.
    pub fn results(&self) -> PollResults {
        let total = self.total_votes();
        PollResults {
            id: self.id,
            title: self.title.clone(),
            total_votes: total,
            results: self
                .options
                .iter()
                .map(|opt| OptionResult {
                    label: opt.label.clone(),
                    votes: opt.votes,
                    percentage: percentage(opt.votes, total),
                })
                .collect(),
        }
    }
}

/// Percentage share of `votes` out of `total_votes`, rounded to the nearest
/// integer. Zero when the poll has no votes at all.
pub fn percentage(votes: i64, total_votes: i64) -> i64 {
    if total_votes > 0 {
        ((votes as f64 / total_votes as f64) * 100.0).round() as i64
    } else {
        0
    }
}

/// Plain-text cleanup for author-provided strings: markup tags stripped,
/// control characters dropped, whitespace runs collapsed, ends trimmed.
pub fn sanitize_text(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
            }
        } else if ch == '<' {
            in_tag = true;
        } else if ch.is_control() {
            stripped.push(' ');
        } else {
            stripped.push(ch);
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sanitizes every label, drops rows whose label comes out empty, and clamps
/// negative vote counts to zero. The surviving rows keep their order, which
/// re-indexes them implicitly.
pub fn sanitize_options(options: Vec<PollOption>) -> Vec<PollOption> {
    options
        .into_iter()
        .filter_map(|opt| {
            let label = sanitize_text(&opt.label);
            if label.is_empty() {
                None
            } else {
                Some(PollOption {
                    label,
                    votes: opt.votes.max(0),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(label: &str, votes: i64) -> PollOption {
        PollOption {
            label: label.to_string(),
            votes,
        }
    }

    #[test]
    fn sanitize_strips_markup_and_whitespace() {
        assert_eq!(sanitize_text("  Plain  label "), "Plain label");
        assert_eq!(sanitize_text("<b>Bold</b> choice"), "Bold choice");
        assert_eq!(sanitize_text("line\nbreaks\tand\u{7f}controls"), "line breaks and controls");
        assert_eq!(sanitize_text("dangling <unclosed"), "dangling");
        assert_eq!(sanitize_text("<script>alert(1)</script>"), "alert(1)");
    }

    #[test]
    fn sanitize_options_drops_empty_rows() {
        let cleaned = sanitize_options(vec![
            opt("First", 2),
            opt("   ", 5),
            opt("<i></i>", 1),
            opt("Second", 0),
        ]);
        assert_eq!(cleaned, vec![opt("First", 2), opt("Second", 0)]);
    }

    #[test]
    fn sanitize_options_clamps_negative_votes() {
        let cleaned = sanitize_options(vec![opt("A", -3)]);
        assert_eq!(cleaned[0].votes, 0);
    }

    #[test]
    fn percentage_is_zero_without_votes() {
        assert_eq!(percentage(0, 0), 0);
        let poll = Poll {
            id: 1,
            title: "Empty".to_string(),
            options: vec![opt("A", 0), opt("B", 0)],
        };
        let results = poll.results();
        assert_eq!(results.total_votes, 0);
        assert!(results.results.iter().all(|r| r.percentage == 0));
    }

    #[test]
    fn percentages_match_vote_shares() {
        let poll = Poll {
            id: 1,
            title: "Favorite".to_string(),
            options: vec![opt("A", 3), opt("B", 1)],
        };
        let results = poll.results();
        assert_eq!(results.total_votes, 4);
        let shares: Vec<i64> = results.results.iter().map(|r| r.percentage).collect();
        assert_eq!(shares, vec![75, 25]);
    }

    #[test]
    fn percentages_sum_within_rounding_bound() {
        let poll = Poll {
            id: 1,
            title: "Thirds".to_string(),
            options: vec![opt("A", 1), opt("B", 1), opt("C", 1)],
        };
        let sum: i64 = poll.results().results.iter().map(|r| r.percentage).sum();
        let bound = poll.options.len() as i64;
        assert!((sum - 100).abs() <= bound, "sum {sum} outside bound {bound}");
    }
}
