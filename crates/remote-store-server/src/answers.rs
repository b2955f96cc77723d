//! Reveal/hide commands for answers.

use std::str::FromStr;

use remote_store_stores::Answer;
use thiserror::Error;

/// Answer command error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("invalid index '{0}', must be at least 1")]
    IndexTooSmall(usize),
    #[error("invalid index '{index}', must be at most {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid target '{0}', expected an index or 'all'")]
    InvalidTarget(String),
}

/// What to do with an answer's `shown` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Show,
    Hide,
    Toggle,
}

impl Visibility {
    const fn apply(self, shown: bool) -> bool {
        match self {
            Self::Show => true,
            Self::Hide => false,
            Self::Toggle => !shown,
        }
    }
}

/// Which answers a command affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerTarget {
    All,
    /// 1-based position on the board.
    Index(usize),
}

impl FromStr for AnswerTarget {
    type Err = AnswerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse()
            .map(Self::Index)
            .map_err(|_| AnswerError::InvalidTarget(s.to_string()))
    }
}

/// Apply `visibility` to the targeted answers.
///
/// Leaves `answers` untouched on error.
///
/// # Errors
/// Returns error if an index target is 0 or past the end.
pub fn apply_visibility(
    answers: &mut [Answer],
    visibility: Visibility,
    target: AnswerTarget,
) -> Result<(), AnswerError> {
    match target {
        AnswerTarget::All => {
            for answer in answers.iter_mut() {
                answer.shown = visibility.apply(answer.shown);
            }
        }
        AnswerTarget::Index(index) => {
            let answer = answer_at(answers, index)?;
            answer.shown = visibility.apply(answer.shown);
        }
    }
    Ok(())
}

fn answer_at(answers: &mut [Answer], index: usize) -> Result<&mut Answer, AnswerError> {
    if index < 1 {
        return Err(AnswerError::IndexTooSmall(index));
    }
    let len = answers.len();
    answers
        .get_mut(index - 1)
        .ok_or(AnswerError::IndexOutOfRange { index, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Vec<Answer> {
        vec![
            Answer::new(1, "Apple", 50),
            Answer::new(2, "Banana", 30),
            Answer {
                shown: true,
                ..Answer::new(3, "Cherry", 20)
            },
        ]
    }

    fn shown(answers: &[Answer]) -> Vec<bool> {
        answers.iter().map(|a| a.shown).collect()
    }

    #[test]
    fn test_parse_target() {
        assert_eq!("all".parse::<AnswerTarget>(), Ok(AnswerTarget::All));
        assert_eq!("2".parse::<AnswerTarget>(), Ok(AnswerTarget::Index(2)));
        assert_eq!(
            "second".parse::<AnswerTarget>(),
            Err(AnswerError::InvalidTarget("second".to_string()))
        );
    }

    #[test]
    fn test_show_hide_toggle_single() {
        let mut answers = board();

        apply_visibility(&mut answers, Visibility::Show, AnswerTarget::Index(1)).unwrap();
        assert_eq!(shown(&answers), vec![true, false, true]);

        apply_visibility(&mut answers, Visibility::Hide, AnswerTarget::Index(3)).unwrap();
        assert_eq!(shown(&answers), vec![true, false, false]);

        apply_visibility(&mut answers, Visibility::Toggle, AnswerTarget::Index(2)).unwrap();
        assert_eq!(shown(&answers), vec![true, true, false]);
    }

    #[test]
    fn test_all() {
        let mut answers = board();

        apply_visibility(&mut answers, Visibility::Toggle, AnswerTarget::All).unwrap();
        assert_eq!(shown(&answers), vec![true, true, false]);

        apply_visibility(&mut answers, Visibility::Hide, AnswerTarget::All).unwrap();
        assert_eq!(shown(&answers), vec![false, false, false]);
    }

    #[test]
    fn test_bad_index_leaves_board_alone() {
        let mut answers = board();

        assert_eq!(
            apply_visibility(&mut answers, Visibility::Show, AnswerTarget::Index(0)),
            Err(AnswerError::IndexTooSmall(0))
        );
        assert_eq!(
            apply_visibility(&mut answers, Visibility::Show, AnswerTarget::Index(4)),
            Err(AnswerError::IndexOutOfRange { index: 4, len: 3 })
        );
        assert_eq!(shown(&answers), shown(&board()));
    }
}
