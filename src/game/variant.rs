use serde::{Deserialize, Serialize};

/// Number of input planes: one per player.
pub const PLAYER_PLANES: i64 = 2;

/// Grid games the policy network can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    #[value(name = "tictactoe")]
    TicTacToe,
    #[value(name = "connect4")]
    ConnectFour,
}

impl GameVariant {
    /// Board (rows, columns).
    pub fn board_dims(self) -> (i64, i64) {
        match self {
            GameVariant::TicTacToe => (3, 3),
            GameVariant::ConnectFour => (6, 7),
        }
    }

    /// Channels-last input shape (height, width, planes).
    pub fn input_dim(self) -> (i64, i64, i64) {
        let (rows, cols) = self.board_dims();
        (rows, cols, PLAYER_PLANES)
    }

    /// One action per cell for Tic-Tac-Toe, one per column for Connect-4.
    pub fn action_space(self) -> i64 {
        match self {
            GameVariant::TicTacToe => 9,
            GameVariant::ConnectFour => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameVariant::TicTacToe => "tictactoe",
            GameVariant::ConnectFour => "connect4",
        }
    }
}

impl std::fmt::Display for GameVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
