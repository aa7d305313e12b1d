//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! TuiEvent ─▶ handle_event ─▶ update(app, action) ─▶ Effect ─▶ run_effect
//!                                   ▲                              │
//!                                   └──── mpsc::Receiver<Action> ◀─┘
//! ```
//!
//! The chat exchange runs on a tokio task and reports back as
//! `Action::ExchangeCompleted`; clipboard writes report back as
//! `Action::CopyCompleted`. Both go through the same channel.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (send pending, copy indicator live): draws every ~80ms so
//!   the spinner turns and the indicator clears on time.
//! - **Idle**: sleeps up to 500ms, only redraws on events.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::api::{ChatRequest, HttpDispatcher, RequestDispatcher};
use crate::core::action::{Action, Effect, update};
use crate::core::clipboard::ClipboardService;
use crate::core::config::ResolvedConfig;
use crate::core::message::Role;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::message::CopyLabel;
use crate::tui::components::{Control, InputBox, InputEvent, Message, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
        }
    }

    /// Message Tab and Ctrl+Y act on: the selection, else the latest reply.
    fn target(&self, app: &App) -> Option<usize> {
        self.message_list
            .selected_index
            .or_else(|| app.last_assistant())
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Terminals without the Kitty protocol ignore the push harmlessly
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let dispatcher: Arc<dyn RequestDispatcher> =
        Arc::new(HttpDispatcher::new(config.endpoint.clone()));
    let mut app = App::from_config(dispatcher, &config);
    let mut tui = TuiState::new();
    let mut clipboard = ClipboardService::system();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Failed to enable terminal modes: {}", e);
            None
        }
    };

    // Channel for actions from background tasks and effects
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        let had_indicator = app.ui.has_live_indicator();
        update(&mut app, Action::Tick(Instant::now()));
        if had_indicator != app.ui.has_live_indicator() {
            needs_redraw = true;
        }

        let animating = app.is_loading() || app.ui.has_live_indicator();
        if app.is_loading() {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / 120) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let frame_area = terminal.get_frame().area();
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = handle_event(&mut app, &mut tui, event, frame_area);
            if run_effect(effect, &app, &mut clipboard, &tx) {
                break 'main;
            }
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if run_effect(effect, &app, &mut clipboard, &tx) {
                break 'main;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Routes one terminal event to the component or core action it belongs to.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent, frame_area: Rect) -> Effect {
    match event {
        TuiEvent::Resize => Effect::None,
        TuiEvent::ForceQuit => update(app, Action::Quit),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            Effect::None
        }
        TuiEvent::SelectPrev => {
            tui.message_list.select_prev(app.session.messages());
            Effect::None
        }
        TuiEvent::SelectNext => {
            tui.message_list.select_next(app.session.messages());
            Effect::None
        }
        TuiEvent::ClearSelection => {
            tui.message_list.selected_index = None;
            Effect::None
        }
        TuiEvent::ToggleReasoning => match tui.target(app) {
            Some(position) => update(app, Action::ToggleReasoning(position)),
            None => Effect::None,
        },
        TuiEvent::Copy => match tui.target(app) {
            Some(position) => update(app, Action::Copy(position)),
            None => Effect::None,
        },
        TuiEvent::MouseClick(column, row) => handle_click(app, tui, column, row, frame_area),
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => update(app, Action::Submit(text)),
            _ => Effect::None,
        },
    }
}

/// Selects the assistant bubble under the pointer and presses the control
/// under it, if the click landed on the control line.
fn handle_click(
    app: &mut App,
    tui: &mut TuiState,
    column: u16,
    row: u16,
    frame_area: Rect,
) -> Effect {
    let input_height = tui.input_box.calculate_height(frame_area.width);
    let Some((position, row_in_bubble)) = ui::hit_test_message(
        row,
        frame_area,
        tui.message_list.scroll_state.offset().y,
        &tui.message_list.layout.prefix_heights,
        input_height,
    ) else {
        return Effect::None;
    };
    let Some(message) = app.session.message(position) else {
        return Effect::None;
    };
    if message.role != Role::Assistant {
        return Effect::None;
    }
    tui.message_list.selected_index = Some(position);

    // Border (1) + padding (1)
    let Some(content_column) = column.checked_sub(frame_area.x + 2) else {
        return Effect::None;
    };
    let bubble = Message::new(
        message,
        true,
        app.ui.is_expanded(position),
        CopyLabel::for_position(&app.ui, position),
    );
    let width = tui.message_list.layout.content_width();
    match bubble.control_at(row_in_bubble, content_column, width) {
        Some(Control::ToggleReasoning) => update(app, Action::ToggleReasoning(position)),
        Some(Control::Copy) => update(app, Action::Copy(position)),
        None => Effect::None,
    }
}

/// Performs an effect. Returns true when the app should quit.
fn run_effect(
    effect: Effect,
    app: &App,
    clipboard: &mut ClipboardService,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnExchange(request) => {
            spawn_exchange(app.dispatcher.clone(), request, tx.clone());
            false
        }
        Effect::WriteClipboard { position, text } => {
            let succeeded = clipboard.write(&text);
            let done = Action::CopyCompleted {
                position,
                succeeded,
                at: Instant::now(),
            };
            if tx.send(done).is_err() {
                warn!("Failed to report copy result: receiver dropped");
            }
            false
        }
    }
}

fn spawn_exchange(
    dispatcher: Arc<dyn RequestDispatcher>,
    request: ChatRequest,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning chat exchange via {}", dispatcher.name());
    tokio::spawn(async move {
        let outcome = dispatcher.exchange(&request).await;
        if tx.send(Action::ExchangeCompleted(outcome)).is_err() {
            warn!("Failed to send exchange result: receiver dropped");
        }
    });
}
