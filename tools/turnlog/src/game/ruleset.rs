use super::state::{Company, GameState, Player, PrivateCompany};
use super::{Game, GameController};
use crate::errors::TurnlogError;
use crate::report::{DefaultTextCatalog, TextCatalog};
use crate::snapshot::{OptionSet, Snapshot};
use std::sync::Arc;

pub const BASIC_RULESET: &str = "18XX-basic";
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const MIN_PAR: i64 = 67;
pub const MAX_PAR: i64 = 100;

const COMPANIES: &[&str] = &["PRR", "NYC", "B&O", "C&O"];
const PRIVATES: &[(&str, i64)] = &[("SVNRR", 20), ("C&StL", 40), ("D&H", 70), ("M&H", 110)];
const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("BankCash", "12000"),
    ("PlayerCash", "600"),
    ("TileLayCost", "20"),
    ("BaseTokenCost", "40"),
    ("Variant", "Basic"),
];

/// Where rulesets come from: default options by id, and fresh games built
/// from a snapshot.
pub trait RulesetCatalog {
    type Game: GameController;

    fn default_options(&self, ruleset_id: &str) -> Option<OptionSet>;

    fn create_game(&self, snapshot: Snapshot) -> Result<Self::Game, TurnlogError>;
}

pub struct BasicRuleset;

impl BasicRuleset {
    pub fn default_options() -> OptionSet {
        DEFAULT_OPTIONS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// A new-game snapshot with every default option resolved.
    pub fn snapshot(players: &[&str]) -> Snapshot {
        Snapshot {
            ruleset_id: BASIC_RULESET.to_string(),
            options: Self::default_options(),
            participants: players.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn initial_state(snapshot: &Snapshot) -> Result<GameState, TurnlogError> {
        if snapshot.ruleset_id != BASIC_RULESET {
            return Err(TurnlogError::UnknownRuleset(snapshot.ruleset_id.clone()));
        }
        snapshot.validate(MIN_PLAYERS, MAX_PLAYERS)?;
        let bank_cash = snapshot.option_i64("BankCash")?;
        let player_cash = snapshot.option_i64("PlayerCash")?;
        if player_cash < 0 {
            return Err(TurnlogError::InvalidSnapshot(
                "PlayerCash must not be negative".to_string(),
            ));
        }
        let funded = i64::try_from(snapshot.participants.len())
            .ok()
            .and_then(|count| player_cash.checked_mul(count))
            .ok_or_else(|| {
                TurnlogError::InvalidSnapshot(format!(
                    "PlayerCash {player_cash} overflows the starting bank"
                ))
            })?;
        if funded > bank_cash {
            return Err(TurnlogError::InvalidSnapshot(format!(
                "bank of {bank_cash} cannot fund {funded} starting cash"
            )));
        }
        Ok(GameState {
            bank_cash: bank_cash - funded,
            players: snapshot
                .participants
                .iter()
                .map(|name| Player {
                    name: name.clone(),
                    cash: player_cash,
                    privates: Vec::new(),
                })
                .collect(),
            companies: COMPANIES
                .iter()
                .map(|id| Company {
                    id: id.to_string(),
                    cash: 0,
                    floated: false,
                    closed: false,
                    president: None,
                    par_price: None,
                })
                .collect(),
            privates: PRIVATES
                .iter()
                .map(|(id, face_value)| PrivateCompany {
                    id: id.to_string(),
                    face_value: *face_value,
                    owner: None,
                    closed: false,
                })
                .collect(),
            current_player: 0,
            turn: 0,
        })
    }
}

/// Catalog holding the "18XX-basic" ruleset.
#[derive(Clone)]
pub struct BasicCatalog {
    text: Arc<dyn TextCatalog>,
}

impl BasicCatalog {
    pub fn new(text: Arc<dyn TextCatalog>) -> Self {
        Self { text }
    }
}

impl Default for BasicCatalog {
    fn default() -> Self {
        Self::new(Arc::new(DefaultTextCatalog::new()))
    }
}

impl RulesetCatalog for BasicCatalog {
    type Game = Game;

    fn default_options(&self, ruleset_id: &str) -> Option<OptionSet> {
        (ruleset_id == BASIC_RULESET).then(BasicRuleset::default_options)
    }

    fn create_game(&self, snapshot: Snapshot) -> Result<Game, TurnlogError> {
        Game::new(snapshot, Arc::clone(&self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_cash_is_funded_by_the_bank() {
        let snapshot = BasicRuleset::snapshot(&["Alice", "Bob", "Carol"]);
        let state = BasicRuleset::initial_state(&snapshot).expect("state");
        assert_eq!(state.bank_cash, 12000 - 3 * 600);
        assert_eq!(state.total_money(), 12000);
        assert!(state.players.iter().all(|p| p.cash == 600));
        assert_eq!(state.current_player_name(), "Alice");
    }

    #[test]
    fn unknown_ruleset_has_no_defaults() {
        let catalog = BasicCatalog::default();
        assert!(catalog.default_options("1830").is_none());
        assert!(catalog.default_options(BASIC_RULESET).is_some());
        let mut snapshot = BasicRuleset::snapshot(&["Alice", "Bob"]);
        snapshot.ruleset_id = "1830".to_string();
        assert!(matches!(
            BasicRuleset::initial_state(&snapshot),
            Err(TurnlogError::UnknownRuleset(id)) if id == "1830"
        ));
    }

    #[test]
    fn underfunded_bank_is_an_invalid_snapshot() {
        let snapshot = BasicRuleset::snapshot(&["Alice", "Bob"]).with_option("BankCash", "1000");
        assert!(matches!(
            BasicRuleset::initial_state(&snapshot),
            Err(TurnlogError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn oversized_player_cash_is_an_invalid_snapshot() {
        let snapshot = BasicRuleset::snapshot(&["Alice", "Bob"])
            .with_option("PlayerCash", i64::MAX.to_string());
        assert!(matches!(
            BasicRuleset::initial_state(&snapshot),
            Err(TurnlogError::InvalidSnapshot(msg)) if msg.contains("overflows")
        ));
    }
}
