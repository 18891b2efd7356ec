//! WebAssembly bindings for the System Overload engine.
//!
//! This module exposes the engine to a browser orchestrator through
//! wasm-bindgen. The wrapper owns the current snapshot and the match rng;
//! pacing, the pass-the-device screen and reporting results stay in JS.

use crate::actions::Command;
use crate::bot::{Bot, BotDifficulty};
use crate::game::GameState;
use crate::player::PlayerSpec;
use crate::rules::RuleSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
    rng: StdRng,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a match from a JSON roster: `[{"name": "...", "controller": "Human"}]`
    #[wasm_bindgen(constructor)]
    pub fn new(roster_json: &str, seed: u64) -> Result<WasmGame, JsValue> {
        let roster: Vec<PlayerSpec> = serde_json::from_str(roster_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid roster: {}", e)))?;

        let mut rng = StdRng::seed_from_u64(seed);
        let state = GameState::new(roster, RuleSet::default(), &mut rng)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmGame { state, rng })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the active seat
    #[wasm_bindgen(js_name = getActivePlayer)]
    pub fn get_active_player(&self) -> usize {
        self.state.turn
    }

    /// Get valid commands for the active player as JSON array
    #[wasm_bindgen(js_name = getValidCommands)]
    pub fn get_valid_commands(&self) -> String {
        serde_json::to_string(&self.state.valid_commands()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply a command from JSON; rejected commands leave the state as it was
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, command_json: &str) -> Result<(), JsValue> {
        let command: Command = serde_json::from_str(command_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid command JSON: {}", e)))?;

        let next = self
            .state
            .try_apply(command, &mut self.rng)
            .map_err(|e| JsValue::from_str(&format!("Command rejected: {}", e)))?;
        self.state = next;
        Ok(())
    }

    /// Log lines one seat may see, as a JSON array of strings
    #[wasm_bindgen(js_name = getVisibleLog)]
    pub fn get_visible_log(&self, viewer: usize) -> String {
        let lines: Vec<String> = self
            .state
            .visible_log(viewer)
            .map(|entry| entry.event.describe(&self.state.players))
            .collect();
        serde_json::to_string(&lines).unwrap_or_else(|_| "[]".to_string())
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winner's name (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<String> {
        self.state.winner.clone()
    }

    /// Get a bot's suggested command for the active player
    /// difficulty: "Easy" or "Normal"
    #[wasm_bindgen(js_name = getBotCommand)]
    pub fn get_bot_command(&mut self, difficulty: &str) -> String {
        let diff = match difficulty {
            "Easy" => BotDifficulty::Easy,
            _ => BotDifficulty::Normal,
        };

        let mut bot = Bot::with_seed(diff, self.rng.gen());
        match bot.decide(&self.state) {
            Some(command) => serde_json::to_string(&command).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }
}
