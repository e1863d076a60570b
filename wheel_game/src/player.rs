use game_core::prelude::*;

/// A participant seated in a game, with what they earned in each round.
/// Index 0 of the ledger is unused so that round numbers index it directly.
#[derive(Clone, Debug, getset::Getters)]
pub struct Player {
    #[getset(get = "pub")]
    participant: Participant,
    money: Vec<u32>,
}

impl Player {
    pub fn new(participant: Participant) -> Self {
        Player {
            participant,
            money: vec![0],
        }
    }

    pub fn id(&self) -> &ParticipantId {
        self.participant.id()
    }

    pub fn mention(&self) -> String {
        self.participant.mention()
    }

    /// Winnings for one round, 0 for rounds not played yet
    pub fn money(&self, round: usize) -> u32 {
        self.money.get(round).copied().unwrap_or_default()
    }

    /// Ledger entry for a round, growing the ledger with zeros as needed
    pub fn money_mut(&mut self, round: usize) -> &mut u32 {
        if self.money.len() <= round {
            self.money.resize(round + 1, 0);
        }
        &mut self.money[round]
    }

    pub fn total(&self) -> u32 {
        self.money.iter().sum()
    }
}
