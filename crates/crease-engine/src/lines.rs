use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crease_types::{PlayerId, WicketType, BALLS_PER_OVER};

/// Per-player batting figures for one innings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingLine {
    pub player_id: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub is_out: bool,
    pub dismissal_type: Option<WicketType>,
    pub dismissed_by: Option<PlayerId>,
    pub fielder: Option<PlayerId>,
}

impl BattingLine {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            strike_rate: 0.0,
            is_out: false,
            dismissal_type: None,
            dismissed_by: None,
            fielder: None,
        }
    }

    pub(crate) fn refresh(&mut self) {
        self.strike_rate = if self.balls > 0 {
            self.runs as f64 / self.balls as f64 * 100.0
        } else {
            0.0
        };
    }

    /// Nothing recorded against this line yet.
    pub fn is_untouched(&self) -> bool {
        self.runs == 0 && self.balls == 0 && !self.is_out
    }
}

/// Overs bowled as whole overs plus spare balls ("3.2").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overs {
    pub completed: u32,
    pub balls: u32,
}

impl Overs {
    pub fn from_balls(balls: u32) -> Self {
        Self {
            completed: balls / BALLS_PER_OVER,
            balls: balls % BALLS_PER_OVER,
        }
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.completed, self.balls)
    }
}

impl Serialize for Overs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-player bowling figures for one innings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingLine {
    pub player_id: PlayerId,
    pub overs: Overs,
    pub balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
    pub economy: f64,
}

impl BowlingLine {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            overs: Overs::default(),
            balls: 0,
            runs_conceded: 0,
            wickets: 0,
            maidens: 0,
            economy: 0.0,
        }
    }

    pub(crate) fn refresh(&mut self) {
        self.overs = Overs::from_balls(self.balls);
        self.economy = if self.balls > 0 {
            self.runs_conceded as f64 / self.balls as f64 * BALLS_PER_OVER as f64
        } else {
            0.0
        };
    }
}

/// Player lines keyed by id, iterated in order of first appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBook<T> {
    lines: IndexMap<PlayerId, T>,
}

impl<T> Default for LineBook<T> {
    fn default() -> Self {
        Self {
            lines: IndexMap::new(),
        }
    }
}

impl<T> LineBook<T> {
    pub fn get(&self, player: &PlayerId) -> Option<&T> {
        self.lines.get(player)
    }

    pub(crate) fn get_mut(&mut self, player: &PlayerId) -> Option<&mut T> {
        self.lines.get_mut(player)
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.lines.contains_key(player)
    }

    /// Find or append a line; the flag reports whether it was created.
    pub(crate) fn get_or_insert_with(
        &mut self,
        player: PlayerId,
        make: impl FnOnce() -> T,
    ) -> (&mut T, bool) {
        let created = !self.lines.contains_key(&player);
        (self.lines.entry(player).or_insert_with(make), created)
    }

    /// Remove a line, keeping the order of the rest.
    pub(crate) fn remove(&mut self, player: &PlayerId) -> Option<T> {
        self.lines.shift_remove(player)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<T: Serialize> Serialize for LineBook<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lines.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strike_rate_and_economy_are_recomputed() {
        let mut bat = BattingLine::new(PlayerId::new());
        bat.runs = 30;
        bat.balls = 20;
        bat.refresh();
        assert_eq!(bat.strike_rate, 150.0);

        let mut bowl = BowlingLine::new(PlayerId::new());
        bowl.balls = 9;
        bowl.runs_conceded = 12;
        bowl.refresh();
        assert_eq!(bowl.overs, Overs { completed: 1, balls: 3 });
        assert_eq!(bowl.overs.to_string(), "1.3");
        assert_eq!(bowl.economy, 8.0);
    }

    #[test]
    fn zero_balls_leave_rates_at_zero() {
        let mut bat = BattingLine::new(PlayerId::new());
        bat.refresh();
        assert_eq!(bat.strike_rate, 0.0);
        assert!(bat.is_untouched());
    }

    #[test]
    fn line_book_keeps_first_appearance_order() {
        let ids: Vec<_> = (0..4).map(|_| PlayerId::new()).collect();
        let mut book = LineBook::default();
        for id in ids.iter().rev() {
            book.get_or_insert_with(*id, || BattingLine::new(*id));
        }

        let (_, created) = book.get_or_insert_with(ids[3], || BattingLine::new(ids[3]));
        assert!(!created);
        assert_eq!(book.len(), 4);

        book.remove(&ids[2]);
        let order: Vec<_> = book.iter().map(|l| l.player_id).collect();
        assert_eq!(order, vec![ids[3], ids[1], ids[0]]);
    }

    #[test]
    fn serializes_as_list() {
        let id = PlayerId::new();
        let mut book = LineBook::default();
        book.get_or_insert_with(id, || BowlingLine::new(id));
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["overs"], "0.0");
        assert_eq!(json[0]["runsConceded"], 0);
    }
}
