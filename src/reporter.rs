use crate::types::{Submission, VoteEstimate};

/// Human-readable progress lines on stdout, printed only when verbose.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn line(&self, line: &str) {
        if self.verbose {
            println!("{line}");
        }
    }
}

/// `[i] ID: <id> S/U/D: s/u/d Ratio: r Age: a hours Link: <short link>`
pub fn status_line(
    index: usize,
    submission: &Submission,
    estimate: VoteEstimate,
    age_hours: f64,
) -> String {
    format!(
        "[{index}] ID: {} S/U/D: {}/{}/{} Ratio: {:?} Age: {:.1} hours Link: {}",
        submission.id,
        submission.score,
        estimate.ups,
        estimate.downs,
        submission.upvote_ratio,
        age_hours,
        submission.short_link(),
    )
}

pub fn elapsed_line(hours: f64) -> String {
    format!("{hours:.1} hours passed since start of script")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_format() {
        let sub = Submission {
            id: "a1".into(),
            created_utc: 0.0,
            score: 10,
            upvote_ratio: 0.6,
            permalink: "/r/x/comments/a1/t/".into(),
        };
        let line = status_line(3, &sub, VoteEstimate { ups: 30, downs: 20 }, 1.5);
        assert_eq!(
            line,
            "[3] ID: a1 S/U/D: 10/30/20 Ratio: 0.6 Age: 1.5 hours Link: https://redd.it/a1"
        );
    }

    #[test]
    fn elapsed_one_decimal() {
        assert_eq!(elapsed_line(0.0), "0.0 hours passed since start of script");
        assert_eq!(elapsed_line(2.26), "2.3 hours passed since start of script");
    }
}
