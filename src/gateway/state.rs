use crate::provider::ModelOption;
use crate::service::{BattlegroundService, ChatService};

/// Shared services behind every route.
#[derive(Clone)]
pub struct HandlerState {
    pub chat: ChatService,

    pub battleground: BattlegroundService,
}

impl HandlerState {
    pub fn new(chat: ChatService, battleground: BattlegroundService) -> Self {
        Self { chat, battleground }
    }

    pub fn model_options(&self) -> Vec<ModelOption> {
        self.battleground.router().model_options()
    }
}
