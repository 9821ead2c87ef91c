use crate::api::{logging, FrameParser, StatusClient, RETRY_DELAY};
use crate::config::Config;
use crate::overlay::{ReloadDecision, StatusOverlay};
use crate::prefs::PreferenceStore;
use crate::reload::{Reloader, ShellReloader};
use crate::terminal::{self, TerminalType};
use crate::ui::layout::split_overlay_layout;
use crate::ui::render::{render_badge, render_help, render_transitions};
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use futures::StreamExt;
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;

const TICK_INTERVAL: Duration = Duration::from_millis(120);
const TRANSITION_HISTORY_LIMIT: usize = 200;

/// What the subscriber task forwards to the event loop: one raw payload per
/// received event, or one notice per lost connection.
pub enum StreamUpdate {
    Message(String),
    Disconnected(String),
}

/// Owns the stream for the process lifetime. Reconnects after `RETRY_DELAY`
/// whenever the connection drops, the way a browser event source would; the
/// overlay controller itself never retries.
pub fn spawn_subscriber(
    client: StatusClient,
    update_tx: mpsc::UnboundedSender<StreamUpdate>,
    cancel: CancellationToken,
) -> task::JoinHandle<()> {
    task::spawn(async move {
        let mut parser = FrameParser::new();
        loop {
            let mut stream = tokio::select! {
                _ = cancel.cancelled() => return,
                connected = client.connect() => match connected {
                    Ok(stream) => stream,
                    Err(error) => {
                        if update_tx
                            .send(StreamUpdate::Disconnected(error.to_string()))
                            .is_err()
                        {
                            return;
                        }
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = tokio::time::sleep(RETRY_DELAY) => continue,
                        }
                    }
                },
            };

            parser.reset();
            loop {
                let item = tokio::select! {
                    _ = cancel.cancelled() => return,
                    item = stream.next() => item,
                };
                match item {
                    Some(Ok(chunk)) => {
                        for payload in parser.process(&chunk) {
                            if logging::debug_events_enabled() {
                                logging::emit_event_payload(&payload);
                            }
                            if update_tx.send(StreamUpdate::Message(payload)).is_err() {
                                return;
                            }
                        }
                    }
                    Some(Err(error)) => {
                        if update_tx
                            .send(StreamUpdate::Disconnected(error.to_string()))
                            .is_err()
                        {
                            return;
                        }
                        break;
                    }
                    None => {
                        if update_tx
                            .send(StreamUpdate::Disconnected(
                                "stream closed by server".to_string(),
                            ))
                            .is_err()
                        {
                            return;
                        }
                        break;
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(RETRY_DELAY) => {}
            }
        }
    })
}

/// Terminal host for the status overlay. Bridges the subscriber channel,
/// terminal input, and the controller on one event loop. Falls back to
/// printing transitions as plain lines when stdout is not a terminal.
pub struct App<R: Reloader> {
    overlay: StatusOverlay,
    prefs: PreferenceStore,
    reloader: R,
    update_rx: mpsc::UnboundedReceiver<StreamUpdate>,
    cancel: CancellationToken,
    terminal: Option<TerminalType>,
    transitions: Vec<String>,
    badge_row: u16,
    should_quit: bool,
}

impl App<ShellReloader> {
    pub fn new(config: Config) -> Result<Self> {
        let prefs = PreferenceStore::new(config.cookie_path.clone(), &config.domain);
        let overlay = StatusOverlay::new(prefs.auto_reload());
        let reloader = ShellReloader::new(config.reload_command.clone());

        let client = StatusClient::new(&config)?;
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        spawn_subscriber(client, update_tx, cancel.clone());

        let terminal = if io::stdout().is_terminal() {
            Some(terminal::setup()?)
        } else {
            None
        };

        Ok(Self {
            overlay,
            prefs,
            reloader,
            update_rx,
            cancel,
            terminal,
            transitions: Vec::new(),
            badge_row: 0,
            should_quit: false,
        })
    }
}

impl<R: Reloader> App<R> {
    pub async fn run(&mut self) -> Result<()> {
        let result = self.event_loop().await;

        self.cancel.cancel();
        if self.terminal.take().is_some() {
            if let Err(error) = terminal::restore() {
                eprintln!("terminal restore failed: {error}");
            }
        }
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        let status = if self.overlay.auto_reload() { "on" } else { "off" };
        self.push_transition(format!("watching build status (auto-reload {status})"));

        let mut tick = tokio::time::interval(TICK_INTERVAL);
        while !self.should_quit {
            self.draw_frame()?;
            tokio::select! {
                _ = tick.tick() => {
                    self.process_terminal_events()?;
                }
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
                update = self.update_rx.recv() => match update {
                    Some(update) => self.handle_stream_update(update),
                    None => self.should_quit = true,
                },
            }
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<()> {
        let badge = self.overlay.badge();
        let transitions = self.transitions.clone();
        let mut badge_row = self.badge_row;
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };

        terminal.draw(|frame| {
            let layout = split_overlay_layout(frame.area());
            badge_row = layout.badge.y;
            render_badge(frame, layout.badge, &badge);
            render_transitions(frame, layout.transitions, &transitions);
            render_help(frame, layout.help);
        })?;

        self.badge_row = badge_row;
        Ok(())
    }

    fn process_terminal_events(&mut self) -> Result<()> {
        if self.terminal.is_none() {
            return Ok(());
        }

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key)
                    if key.kind == KeyEventKind::Press || key.kind == KeyEventKind::Repeat =>
                {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            self.should_quit = true;
                        }
                        KeyCode::Char('a') => self.toggle_auto_reload(),
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                        && mouse.row == self.badge_row
                    {
                        self.toggle_auto_reload();
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_stream_update(&mut self, update: StreamUpdate) {
        match update {
            StreamUpdate::Message(payload) => {
                let previous = self.overlay.state().to_string();
                match self.overlay.observe_message(&payload) {
                    Ok(decision) => {
                        if self.overlay.state() != previous {
                            self.push_transition(format!(
                                "{previous} -> {}",
                                self.overlay.state()
                            ));
                        }
                        if decision == ReloadDecision::Reload {
                            self.trigger_reload();
                        }
                    }
                    Err(error) => {
                        logging::emit_payload_parse_error(&payload, &error);
                        self.push_transition(format!("[error] bad status payload: {error:#}"));
                    }
                }
            }
            StreamUpdate::Disconnected(reason) => {
                self.overlay.observe_stream_error();
                self.push_transition(format!("stream down: {reason}"));
            }
        }
    }

    fn toggle_auto_reload(&mut self) {
        match self.overlay.toggle_auto_reload(&self.prefs) {
            Ok(()) => {
                let status = if self.overlay.auto_reload() { "on" } else { "off" };
                self.push_transition(format!("auto-reload {status}"));
            }
            Err(error) => {
                self.push_transition(format!("[error] preference write failed: {error:#}"));
            }
        }
    }

    fn trigger_reload(&mut self) {
        self.push_transition("reload triggered".to_string());
        if let Err(error) = self.reloader.reload() {
            self.push_transition(format!("[error] reload failed: {error:#}"));
        }
    }

    fn push_transition(&mut self, line: String) {
        if self.terminal.is_none() {
            println!("{line}");
        }
        self.transitions.push(line);
        if self.transitions.len() > TRANSITION_HISTORY_LIMIT {
            let excess = self.transitions.len() - TRANSITION_HISTORY_LIMIT;
            self.transitions.drain(..excess);
        }
    }
}
