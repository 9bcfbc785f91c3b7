use super::domain::Contributor;
use serde::{Deserialize, Serialize};

/// Result of scanning the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopContributor {
    Found { contributor: Contributor },
    NoContributor,
}

impl TopContributor {
    pub fn contributor(&self) -> Option<&Contributor> {
        match self {
            TopContributor::Found { contributor } => Some(contributor),
            TopContributor::NoContributor => None,
        }
    }
}

/// Highest score wins. On equal scores the entry that appears first in
/// `contributors` is kept, so callers control tie-breaks through ordering.
pub fn top_contributor(contributors: &[Contributor]) -> TopContributor {
    let best = contributors.iter().fold(None::<&Contributor>, |best, entry| {
        match best {
            Some(current) if current.effective_score() >= entry.effective_score() => Some(current),
            _ => Some(entry),
        }
    });

    match best {
        Some(entry) => TopContributor::Found {
            contributor: Contributor {
                score: entry.effective_score(),
                ..entry.clone()
            },
        },
        None => TopContributor::NoContributor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leaderboard_has_no_contributor() {
        assert_eq!(top_contributor(&[]), TopContributor::NoContributor);
        assert!(top_contributor(&[]).contributor().is_none());
    }

    #[test]
    fn picks_highest_score() {
        let contributors = vec![
            Contributor::new("a", "A", 10.0),
            Contributor::new("b", "B", 30.0),
            Contributor::new("c", "C", 20.0),
        ];

        let top = top_contributor(&contributors);
        let winner = top.contributor().expect("winner present");
        assert_eq!(winner.display_name, "B");
        assert_eq!(winner.score, 30.0);
    }

    #[test]
    fn first_entry_wins_ties() {
        let contributors = vec![
            Contributor::new("x", "Sari", 42.0),
            Contributor::new("y", "Budi", 42.0),
        ];

        let top = top_contributor(&contributors);
        assert_eq!(top.contributor().map(|entry| entry.id.as_str()), Some("x"));
    }

    #[test]
    fn bad_scores_count_as_zero() {
        let mut broken = Contributor::new("n", "NaN", 0.0);
        broken.score = f64::NAN;
        let contributors = vec![broken, Contributor::new("z", "Zero", 0.0)];

        let top = top_contributor(&contributors);
        let winner = top.contributor().expect("winner present");
        assert_eq!(winner.id, "n");
        assert_eq!(winner.score, 0.0);
    }
}
