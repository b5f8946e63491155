use crate::errors::TurnlogError;
use crate::types::CashHolder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub cash: i64,
    pub privates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub cash: i64,
    pub floated: bool,
    pub closed: bool,
    pub president: Option<String>,
    pub par_price: Option<i64>,
}

impl Company {
    pub fn is_operating(&self) -> bool {
        self.floated && !self.closed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateCompany {
    pub id: String,
    pub face_value: i64,
    pub owner: Option<String>,
    pub closed: bool,
}

/// Live game state owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub bank_cash: i64,
    pub players: Vec<Player>,
    pub companies: Vec<Company>,
    pub privates: Vec<PrivateCompany>,
    pub current_player: usize,
    pub turn: u32,
}

impl GameState {
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.name == name)
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|company| company.id == id)
    }

    pub fn company_mut(&mut self, id: &str) -> Option<&mut Company> {
        self.companies.iter_mut().find(|company| company.id == id)
    }

    pub fn private(&self, id: &str) -> Option<&PrivateCompany> {
        self.privates.iter().find(|private| private.id == id)
    }

    pub fn private_mut(&mut self, id: &str) -> Option<&mut PrivateCompany> {
        self.privates.iter_mut().find(|private| private.id == id)
    }

    pub fn current_player_name(&self) -> &str {
        self.players
            .get(self.current_player)
            .map(|player| player.name.as_str())
            .unwrap_or_default()
    }

    pub fn advance_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        self.current_player = (self.current_player + 1) % self.players.len();
        self.turn = self.turn.saturating_add(1);
    }

    pub fn cash_of(&self, holder: &CashHolder) -> Option<i64> {
        match holder {
            CashHolder::Player(name) => self.player(name).map(|player| player.cash),
            CashHolder::Company(id) => self
                .company(id)
                .filter(|company| company.is_operating())
                .map(|company| company.cash),
        }
    }

    /// Every holder a cash correction may target: all players, then every
    /// floated company that has not closed.
    pub fn cash_holders(&self) -> Vec<(CashHolder, i64)> {
        let players = self
            .players
            .iter()
            .map(|player| (CashHolder::Player(player.name.clone()), player.cash));
        let companies = self
            .companies
            .iter()
            .filter(|company| company.is_operating())
            .map(|company| (CashHolder::Company(company.id.clone()), company.cash));
        players.chain(companies).collect()
    }

    /// Moves `amount` from the bank to `holder` (negative moves it back).
    /// Both sides change together or not at all.
    pub fn move_cash_with_bank(
        &mut self,
        holder: &CashHolder,
        amount: i64,
    ) -> Result<(), TurnlogError> {
        let bank_after = self.bank_cash.checked_sub(amount).ok_or_else(|| {
            TurnlogError::ActionRejected(format!("bank cash overflow moving {amount}"))
        })?;
        let slot = match holder {
            CashHolder::Player(name) => self.player_mut(name).map(|player| &mut player.cash),
            CashHolder::Company(id) => self
                .company_mut(id)
                .filter(|company| company.is_operating())
                .map(|company| &mut company.cash),
        }
        .ok_or_else(|| {
            TurnlogError::ActionRejected(format!("{} {} holds no money", holder.kind(), holder))
        })?;
        let holder_after = slot.checked_add(amount).ok_or_else(|| {
            TurnlogError::ActionRejected(format!("cash overflow for {holder}"))
        })?;
        *slot = holder_after;
        self.bank_cash = bank_after;
        Ok(())
    }

    pub fn close_private(&mut self, id: &str) -> Result<Option<String>, TurnlogError> {
        let private = self
            .private_mut(id)
            .ok_or_else(|| TurnlogError::ActionRejected(format!("unknown private {id}")))?;
        private.closed = true;
        let owner = private.owner.clone();
        if let Some(owner) = &owner {
            if let Some(player) = self.player_mut(owner) {
                player.privates.retain(|held| held != id);
            }
        }
        Ok(owner)
    }

    pub fn total_money(&self) -> i64 {
        self.bank_cash
            + self.players.iter().map(|player| player.cash).sum::<i64>()
            + self.companies.iter().map(|company| company.cash).sum::<i64>()
    }
}
