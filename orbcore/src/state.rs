use thiserror::Error;

/// Top-level game mode. A single value owned by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

/// Requested a transition with no matching edge. The state is left unchanged
/// and the caller must not proceed as if it had changed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("invalid transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: GameState,
    pub to: GameState,
}

/// Directed edges of the allowed-transition table.
const TRANSITIONS: &[(GameState, GameState)] = &[
    (GameState::Menu, GameState::Playing),
    (GameState::Playing, GameState::Paused),
    (GameState::Paused, GameState::Playing),
    (GameState::Playing, GameState::LevelComplete),
    (GameState::Playing, GameState::GameOver),
    (GameState::LevelComplete, GameState::Menu),
    (GameState::GameOver, GameState::Menu),
    (GameState::LevelComplete, GameState::Playing),
    (GameState::GameOver, GameState::Playing),
];

/// Handle returned by [`StateMachine::on_change`], used to deregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Finite state machine over [`GameState`] with an explicit edge table.
///
/// Listeners are notified synchronously after every successful transition,
/// in registration order, with the new state.
pub struct StateMachine {
    current: GameState,
    listeners: Vec<(ListenerId, Box<dyn FnMut(GameState)>)>,
    next_id: u64,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: GameState::Menu,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> GameState {
        self.current
    }

    pub fn transition(&mut self, to: GameState) -> Result<(), InvalidTransition> {
        let allowed = TRANSITIONS
            .iter()
            .any(|&(from, target)| from == self.current && target == to);
        if !allowed {
            return Err(InvalidTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        for (_, listener) in &mut self.listeners {
            listener(to);
        }
        Ok(())
    }

    pub fn on_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(GameState) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
