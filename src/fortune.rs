//! Fortune draw - three owned cards dealt face-down, one of them revealed

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::FORTUNE_DRAW_SIZE;
use crate::models::FortuneCard;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FortuneError {
    #[error("A fortune draw needs at least {needed} cards (you own {owned})")]
    NotEnoughCards { owned: usize, needed: usize },
}

/// A dealt draw and the card the user flipped, if any
#[derive(Clone, Debug, PartialEq)]
pub struct FortuneDraw {
    cards: Vec<FortuneCard>,
    cursor: usize,
    revealed: Option<usize>,
}

impl FortuneDraw {
    /// Shuffle the owned cards and deal the first three
    pub fn deal<R: Rng + ?Sized>(owned: Vec<FortuneCard>, rng: &mut R) -> Result<Self, FortuneError> {
        if owned.len() < FORTUNE_DRAW_SIZE {
            return Err(FortuneError::NotEnoughCards {
                owned: owned.len(),
                needed: FORTUNE_DRAW_SIZE,
            });
        }

        let mut cards = owned;
        cards.shuffle(rng);
        cards.truncate(FORTUNE_DRAW_SIZE);

        Ok(FortuneDraw {
            cards,
            cursor: 0,
            revealed: None,
        })
    }

    pub fn cards(&self) -> &[FortuneCard] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revealed(&self) -> Option<&FortuneCard> {
        self.revealed.and_then(|i| self.cards.get(i))
    }

    pub fn revealed_index(&self) -> Option<usize> {
        self.revealed
    }

    pub fn move_left(&mut self) {
        if self.revealed.is_none() {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn move_right(&mut self) {
        if self.revealed.is_none() && self.cursor + 1 < self.cards.len() {
            self.cursor += 1;
        }
    }

    /// Flip the card under the cursor. Only the first flip counts.
    pub fn reveal(&mut self) -> Option<&FortuneCard> {
        if self.revealed.is_none() {
            self.revealed = Some(self.cursor);
        }
        self.revealed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotNumber;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn owned(n: i64) -> Vec<FortuneCard> {
        (1..=n)
            .map(|i| FortuneCard {
                slot: SlotNumber::new(i).unwrap(),
                image_url: format!("https://x/{i}.png"),
                favorite: i % 2 == 0,
            })
            .collect()
    }

    #[test]
    fn test_exactly_three_cards_all_dealt() {
        let mut rng = StdRng::seed_from_u64(7);
        let draw = FortuneDraw::deal(owned(3), &mut rng).unwrap();
        let slots: HashSet<u16> = draw.cards().iter().map(|c| c.slot.get()).collect();
        assert_eq!(slots, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_too_few_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            FortuneDraw::deal(owned(2), &mut rng),
            Err(FortuneError::NotEnoughCards { owned: 2, needed: 3 })
        );
        assert!(FortuneDraw::deal(Vec::new(), &mut rng).is_err());
    }

    #[test]
    fn test_many_cards_yield_three_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let draw = FortuneDraw::deal(owned(40), &mut rng).unwrap();
            let slots: HashSet<u16> = draw.cards().iter().map(|c| c.slot.get()).collect();
            assert_eq!(slots.len(), 3);
        }
    }

    #[test]
    fn test_reveal_locks_cursor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut draw = FortuneDraw::deal(owned(5), &mut rng).unwrap();
        draw.move_right();
        draw.move_right();
        draw.move_right();
        assert_eq!(draw.cursor(), 2);

        let flipped = draw.reveal().cloned().unwrap();
        draw.move_left();
        assert_eq!(draw.cursor(), 2);
        assert_eq!(draw.reveal(), Some(&flipped));
        assert_eq!(draw.revealed_index(), Some(2));
    }
}
